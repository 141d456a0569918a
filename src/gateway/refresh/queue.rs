//! Refresh flag, FIFO wait queue, and the leader's release guard.

// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	obs::{self, RefreshEvent},
	store::StoreError,
};

/// Process-wide refresh state owned by one gateway; the flag and queue change together.
#[derive(Debug, Default)]
pub(crate) struct RefreshState {
	in_progress: bool,
	pending: VecDeque<PendingRequest>,
}
impl RefreshState {
	pub(crate) fn is_active(&self) -> bool {
		self.in_progress
	}

	pub(crate) fn queued(&self) -> usize {
		self.pending.len()
	}

	/// Joins the active cycle, or starts one when none is active.
	pub(crate) fn acquire(state: &Arc<Mutex<Self>>) -> RefreshTicket {
		let mut guard = state.lock();

		if guard.in_progress {
			let (release, receiver) = oneshot::channel();

			guard.pending.push_back(PendingRequest { release });

			let queued = guard.pending.len();

			drop(guard);
			obs::record_refresh_event(RefreshEvent::Joined { queued });

			RefreshTicket::Join(RefreshWaiter(receiver))
		} else {
			guard.in_progress = true;

			drop(guard);
			obs::record_refresh_event(RefreshEvent::Started);

			RefreshTicket::Lead(RefreshCycle { state: state.clone(), resolved: false })
		}
	}

	fn release(state: &Mutex<Self>, outcome: RefreshOutcome) {
		let pending = {
			let mut guard = state.lock();

			guard.in_progress = false;

			std::mem::take(&mut guard.pending)
		};
		let released = pending.len();
		let refreshed = outcome == RefreshOutcome::Refreshed;

		for request in pending {
			// A dropped receiver means that caller went away; nothing to deliver.
			let _ = request.release.send(outcome.clone());
		}

		obs::record_refresh_event(RefreshEvent::Released { released, refreshed });
	}
}

/// A caller suspended until the active cycle resolves.
#[derive(Debug)]
struct PendingRequest {
	release: oneshot::Sender<RefreshOutcome>,
}

/// Result delivered to every queued caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum RefreshOutcome {
	/// A fresh access token is stored; retry.
	Refreshed,
	/// The session cannot be restored.
	Expired { reason: String },
	/// The store failed while the session was being torn down.
	StoreFailed(StoreError),
	/// The leader stopped before resolving the cycle.
	Abandoned,
}

/// What a queued caller does once its cycle resolves.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Released {
	/// Resend the request with the stored credentials.
	Retry,
	/// The leader went away; acquire the refresh state again.
	Reacquire,
}

/// Role handed to a caller that needs fresh credentials.
pub(crate) enum RefreshTicket {
	Lead(RefreshCycle),
	Join(RefreshWaiter),
}

/// Receiving half held by a queued caller.
pub(crate) struct RefreshWaiter(oneshot::Receiver<RefreshOutcome>);
impl RefreshWaiter {
	pub(crate) async fn wait(self) -> Result<Released> {
		match self.0.await {
			Ok(RefreshOutcome::Refreshed) => Ok(Released::Retry),
			Ok(RefreshOutcome::Expired { reason }) => Err(Error::AuthExpired { reason }),
			Ok(RefreshOutcome::StoreFailed(err)) => Err(Error::Storage(err)),
			Ok(RefreshOutcome::Abandoned) | Err(_) => Ok(Released::Reacquire),
		}
	}
}

/// Leader's handle on the active cycle; dropping it unresolved releases the queue as
/// [`RefreshOutcome::Abandoned`] so a queued caller can take over.
pub(crate) struct RefreshCycle {
	state: Arc<Mutex<RefreshState>>,
	resolved: bool,
}
impl RefreshCycle {
	pub(crate) fn resolve(mut self, outcome: RefreshOutcome) {
		self.resolved = true;

		RefreshState::release(&self.state, outcome);
	}
}
impl Drop for RefreshCycle {
	fn drop(&mut self) {
		if !self.resolved {
			RefreshState::release(&self.state, RefreshOutcome::Abandoned);
		}
	}
}
