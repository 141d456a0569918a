//! Authenticated request gateway.
//!
//! [`Gateway::send`] attaches the stored access token to every request except the
//! credential-exchange endpoints, forwards it through the configured [`GatewayHttpClient`],
//! and recovers from `401 Unauthorized` with a single-flight refresh cycle: the first failing
//! request leads the cycle, concurrent failures queue behind it, and every affected request is
//! resent exactly once after the cycle resolves. Refresh failures clear the stored credentials
//! and surface [`Error::AuthExpired`] to the leader and every queued caller.

pub mod refresh;
pub mod session;

pub use refresh::RefreshMetrics;
pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	backend::BackendDescriptor,
	error::ConfigError,
	http::{ApiRequest, ApiResponse, GatewayHttpClient, OutboundRequest},
	obs::{self, OpOutcome, OpSpan, Operation},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use refresh::RefreshState;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestHttpClient>;

/// Issues backend requests while keeping the caller authenticated.
///
/// Construct one gateway per session and share it (clones share the refresh state, so the
/// single-flight guarantee holds across all of them).
pub struct Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Transport used for every outbound request, including refresh calls.
	pub http_client: Arc<C>,
	/// Store holding the live credential pair.
	pub store: Arc<dyn CredentialStore>,
	/// Backend base URL and credential-exchange paths.
	pub descriptor: BackendDescriptor,
	/// Shared counters for refresh cycles.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_state: Arc<Mutex<RefreshState>>,
}
impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn CredentialStore>,
		descriptor: BackendDescriptor,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			descriptor,
			refresh_metrics: Default::default(),
			refresh_state: Default::default(),
		}
	}

	/// Returns `true` while a refresh cycle is active.
	pub fn refresh_in_progress(&self) -> bool {
		self.refresh_state.lock().is_active()
	}

	/// Number of requests currently waiting on the active refresh cycle.
	pub fn queued_requests(&self) -> usize {
		self.refresh_state.lock().queued()
	}

	/// Sends `request`, refreshing the access token once if the backend answers `401`.
	///
	/// Returns 2xx responses unchanged. Other statuses become [`Error::ValidationFailed`] or
	/// [`Error::NetworkOrUnknown`]; an unrecoverable session becomes [`Error::AuthExpired`].
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const OP: Operation = Operation::Send;

		let span = OpSpan::new(OP, "send");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span.instrument(self.send_with_refresh(request)).await;

		obs::record_result(OP, &result);

		result
	}

	/// Sends `request` and decodes the 2xx body as JSON.
	pub async fn send_json<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let path = request.path.clone();

		self.send(request).await?.json(&path)
	}

	async fn send_with_refresh(&self, mut request: ApiRequest) -> Result<ApiResponse> {
		loop {
			let (response, bearer) = self.dispatch(&request).await?;

			if response.is_success() {
				return Ok(response);
			}
			if !self.should_refresh(&request, &response) {
				return Err(Error::from_rejection(
					response.status,
					&response.body,
					&request.error_message,
				));
			}

			request.retried = true;

			self.await_fresh_credentials(bearer.as_ref()).await?;
		}
	}

	fn should_refresh(&self, request: &ApiRequest, response: &ApiResponse) -> bool {
		response.is_unauthorized()
			&& !request.retried
			&& !self.descriptor.kind(&request.path).is_credential_exchange()
	}

	/// Resolves and forwards one attempt, returning the bearer token it carried.
	pub(crate) async fn dispatch(
		&self,
		request: &ApiRequest,
	) -> Result<(ApiResponse, Option<TokenSecret>)> {
		let bearer = if self.descriptor.kind(&request.path).is_credential_exchange() {
			None
		} else {
			self.store.load().await?.map(|pair| pair.access).filter(|access| !access.is_blank())
		};
		let body =
			request.body.as_ref().map(serde_json::to_vec).transpose().map_err(ConfigError::from)?;
		let outbound = OutboundRequest {
			method: request.method,
			url: self.descriptor.url_for(&request.path)?,
			bearer: bearer.clone(),
			body,
		};
		let response = self.http_client.execute(outbound).await?;

		Ok((response, bearer))
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestHttpClient> {
	/// Creates a new gateway that provisions its own reqwest-backed transport.
	pub fn new(store: Arc<dyn CredentialStore>, descriptor: BackendDescriptor) -> Self {
		Self::with_http_client(store, descriptor, ReqwestHttpClient::default())
	}
}
impl<C> Clone for Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			descriptor: self.descriptor.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_state: self.refresh_state.clone(),
		}
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("descriptor", &self.descriptor)
			.field("refresh_in_progress", &self.refresh_in_progress())
			.finish()
	}
}
