// self
use crate::{
	_prelude::*,
	obs::{OpOutcome, Operation},
};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(op: Operation, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"hospital_gateway_op_total",
			"op" => op.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (op, outcome);
	}
}

/// Records the outcome of `result` for `op`.
pub fn record_result<T>(op: Operation, result: &Result<T>) {
	match result {
		Ok(_) => record_op_outcome(op, OpOutcome::Success),
		Err(_) => record_op_outcome(op, OpOutcome::Failure),
	}
}
