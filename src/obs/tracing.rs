// self
use crate::{_prelude::*, obs::Operation, store::StoreError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by gateway operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("hospital_gateway.op", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Refresh-cycle transitions worth a debug event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshEvent {
	/// A caller became the cycle leader.
	Started,
	/// A caller joined the active cycle's queue.
	Joined {
		/// Queue length after joining.
		queued: usize,
	},
	/// The cycle resolved and released its queue.
	Released {
		/// Number of queued callers released.
		released: usize,
		/// Whether queued callers may retry.
		refreshed: bool,
	},
}

/// Emits a debug event for a refresh-cycle transition (when tracing is enabled).
pub fn record_refresh_event(event: RefreshEvent) {
	#[cfg(feature = "tracing")]
	{
		match event {
			RefreshEvent::Started => tracing::debug!("refresh cycle started"),
			RefreshEvent::Joined { queued } => {
				tracing::debug!(queued, "request joined the active refresh cycle")
			},
			RefreshEvent::Released { released, refreshed } => {
				tracing::debug!(released, refreshed, "refresh cycle released its queue")
			},
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = event;
	}
}

/// Emits a warning when the credential store fails during `op` (when tracing is enabled).
pub fn record_store_failure(op: Operation, err: &StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(op = op.as_str(), error = %err, "credential store failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (op, err);
	}
}
