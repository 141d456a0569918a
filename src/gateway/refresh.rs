//! Single-flight access-token refresh.
//!
//! The first request to hit `401` becomes the cycle leader: it loads the stored pair, calls the
//! refresh endpoint, persists the new access token (and the rotated refresh token, when the
//! backend sends one), and releases every request that queued behind it in FIFO order. On
//! failure, or when no refresh token is stored, the leader clears the store and every caller
//! receives [`Error::AuthExpired`]. If the store cannot be cleared, every caller receives the
//! same [`Error::Storage`] instead. If the leader stops before resolving the cycle, its guard
//! releases the queue and the queued callers compete for the next cycle.

mod metrics;
mod queue;

pub use metrics::RefreshMetrics;

pub(crate) use queue::RefreshState;

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	auth::{RefreshGrant, TokenSecret},
	gateway::Gateway,
	http::{ApiRequest, GatewayHttpClient},
	obs::{self, OpOutcome, OpSpan, Operation},
};
use queue::{RefreshCycle, RefreshOutcome, RefreshTicket, Released};

const REFRESH_REJECTED: &str = "Refresh token was rejected";

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Waits until the stored access token has been refreshed, leading the cycle if none is
	/// active. `rejected` is the bearer token the failed request carried.
	pub(crate) async fn await_fresh_credentials(
		&self,
		rejected: Option<&TokenSecret>,
	) -> Result<()> {
		loop {
			match RefreshState::acquire(&self.refresh_state) {
				RefreshTicket::Join(waiter) => {
					self.refresh_metrics.record_join();

					match waiter.wait().await? {
						Released::Retry => return Ok(()),
						Released::Reacquire => continue,
					}
				},
				RefreshTicket::Lead(cycle) => return self.lead_refresh(cycle, rejected).await,
			}
		}
	}

	async fn lead_refresh(
		&self,
		cycle: RefreshCycle,
		rejected: Option<&TokenSecret>,
	) -> Result<()> {
		const OP: Operation = Operation::Refresh;

		let span = OpSpan::new(OP, "lead_refresh");

		obs::record_op_outcome(OP, OpOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span.instrument(self.run_cycle(cycle, rejected)).await;

		match &result {
			Ok(()) => self.refresh_metrics.record_success(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		obs::record_result(OP, &result);

		result
	}

	async fn run_cycle(&self, cycle: RefreshCycle, rejected: Option<&TokenSecret>) -> Result<()> {
		let current = match self.store.load().await {
			Ok(current) => current,
			Err(err) => return self.expire(cycle, err.to_string()).await,
		};
		let Some(current) = current else {
			return self.expire(cycle, "No credentials are stored").await;
		};

		// The request went out before an earlier cycle rotated the token.
		if rejected.is_some_and(|sent| sent != &current.access) {
			cycle.resolve(RefreshOutcome::Refreshed);

			return Ok(());
		}

		let Some(refresh) = current.refresh_token().cloned() else {
			return self.expire(cycle, "No refresh token is stored").await;
		};
		let grant = match self.request_refresh(&refresh).await {
			Ok(grant) => grant,
			Err(err) => return self.expire(cycle, err.to_string()).await,
		};

		if let Err(err) = self.store.save(current.rotate(grant)).await {
			return self.expire(cycle, err.to_string()).await;
		}

		cycle.resolve(RefreshOutcome::Refreshed);

		Ok(())
	}

	async fn request_refresh(&self, refresh: &TokenSecret) -> Result<RefreshGrant> {
		let path = self.descriptor.paths.refresh.clone();
		let request = ApiRequest::post(path.as_str())
			.with_body(json!({ "refresh": refresh.expose() }))
			.with_error_message(REFRESH_REJECTED);
		let (response, _) = self.dispatch(&request).await?;

		if !response.is_success() {
			return Err(Error::from_rejection(
				response.status,
				&response.body,
				&request.error_message,
			));
		}

		response.json(&path)
	}

	async fn expire(&self, cycle: RefreshCycle, reason: impl Into<String>) -> Result<()> {
		let reason = reason.into().trim_end_matches('.').to_owned();

		// Nobody may be told the session expired while its tokens are still stored.
		if let Err(err) = self.store.clear().await {
			obs::record_store_failure(Operation::Refresh, &err);
			cycle.resolve(RefreshOutcome::StoreFailed(err.clone()));

			return Err(Error::Storage(err));
		}

		cycle.resolve(RefreshOutcome::Expired { reason: reason.clone() });

		Err(Error::AuthExpired { reason })
	}
}
