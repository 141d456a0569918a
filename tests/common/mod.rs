//! Scripted in-process backend that mimics the JWT endpoints and resource collections.

#![allow(dead_code)]

// std
use std::{
	collections::{HashMap, HashSet},
	sync::Arc,
	time::Duration,
};
// crates.io
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Semaphore;
use url::Url;
// self
use hospital_gateway::{
	auth::CredentialPair,
	backend::BackendDescriptor,
	error::TransportError,
	gateway::Gateway,
	http::{ApiResponse, GatewayHttpClient, Method, OutboundRequest, TransportFuture},
	store::{CredentialStore, MemoryStore, StoreError, StoreFuture},
};

pub const USERNAME: &str = "doctor";
pub const PASSWORD: &str = "secret";

type Hook = Box<dyn FnOnce() + Send>;

/// How the refresh endpoint fails, when it does.
#[derive(Clone, Copy, Debug)]
pub enum RefreshFailure {
	/// Answer with this status and an empty body.
	Status(u16),
	/// Drop the connection.
	Unreachable,
}

#[derive(Default)]
struct FakeState {
	valid_access: String,
	valid_refresh: String,
	rotate_refresh: bool,
	issued: u32,
	refresh_calls: usize,
	offline: bool,
	refresh_failure: Option<RefreshFailure>,
	always_unauthorized: HashSet<String>,
	responses: HashMap<(Method, String), ApiResponse>,
	log: Vec<String>,
	on_unauthorized: Option<Hook>,
}

/// Fake transport; clones share state.
#[derive(Clone)]
pub struct FakeBackend {
	state: Arc<Mutex<FakeState>>,
	refresh_gate: Option<Arc<Semaphore>>,
}
impl FakeBackend {
	/// Backend that accepts `valid_access` on resources and `valid_refresh` on refresh.
	pub fn new(valid_access: &str, valid_refresh: &str) -> Self {
		let state = FakeState {
			valid_access: valid_access.into(),
			valid_refresh: valid_refresh.into(),
			..Default::default()
		};

		Self { state: Arc::new(Mutex::new(state)), refresh_gate: None }
	}

	/// Holds every refresh call until [`FakeBackend::open_refresh_gate`] is called.
	pub fn gated(mut self) -> Self {
		self.refresh_gate = Some(Arc::new(Semaphore::new(0)));

		self
	}

	pub fn open_refresh_gate(&self) {
		if let Some(gate) = &self.refresh_gate {
			gate.add_permits(Semaphore::MAX_PERMITS / 2);
		}
	}

	pub fn rotating(self) -> Self {
		self.state.lock().rotate_refresh = true;

		self
	}

	pub fn offline(self) -> Self {
		self.state.lock().offline = true;

		self
	}

	/// Makes only the refresh endpoint fail.
	pub fn failing_refresh(self, failure: RefreshFailure) -> Self {
		self.state.lock().refresh_failure = Some(failure);

		self
	}

	/// Makes `path` answer 401 whatever token it carries.
	pub fn always_unauthorized(self, path: &str) -> Self {
		self.state.lock().always_unauthorized.insert(path.into());

		self
	}

	/// Scripts the response of an authorized call.
	pub fn respond(self, method: Method, path: &str, status: u16, body: Value) -> Self {
		self.state
			.lock()
			.responses
			.insert((method, path.into()), ApiResponse::new(status, body.to_string().into_bytes()));

		self
	}

	/// Runs `hook` right before the first 401 is returned.
	pub fn on_first_unauthorized(self, hook: impl FnOnce() + Send + 'static) -> Self {
		self.state.lock().on_unauthorized = Some(Box::new(hook));

		self
	}

	pub fn refresh_calls(&self) -> usize {
		self.state.lock().refresh_calls
	}

	pub fn valid_access(&self) -> String {
		self.state.lock().valid_access.clone()
	}

	pub fn log(&self) -> Vec<String> {
		self.state.lock().log.clone()
	}

	pub fn log_count(&self, prefix: &str) -> usize {
		self.state.lock().log.iter().filter(|entry| entry.starts_with(prefix)).count()
	}

	async fn handle(&self, request: OutboundRequest) -> Result<ApiResponse, TransportError> {
		let path = request.url.path().trim_start_matches("/api/").to_owned();
		let body: Value = request
			.body
			.as_deref()
			.map(|bytes| serde_json::from_slice(bytes).expect("Gateway should send valid JSON."))
			.unwrap_or(Value::Null);

		match path.as_str() {
			"token/refresh/" => {
				assert!(request.bearer.is_none(), "Refresh calls must not carry a bearer token.");

				self.state.lock().log.push("refresh:start".into());

				if let Some(gate) = &self.refresh_gate {
					gate.acquire().await.expect("Refresh gate should stay open.").forget();
				}

				let mut state = self.state.lock();

				state.refresh_calls += 1;

				let response = if let Some(failure) = state.refresh_failure {
					state.log.push("refresh:failed".into());

					return match failure {
						RefreshFailure::Status(status) => Ok(ApiResponse::new(status, Vec::new())),
						RefreshFailure::Unreachable => Err(connection_refused()),
					};
				} else if body["refresh"] == state.valid_refresh.as_str() {
					state.issued += 1;
					state.valid_access = format!("access-{}", state.issued);

					let mut payload = json!({ "access": state.valid_access });

					if state.rotate_refresh {
						state.valid_refresh = format!("refresh-{}", state.issued + 1);
						payload["refresh"] = json!(state.valid_refresh);
					}

					ApiResponse::new(200, payload.to_string().into_bytes())
				} else {
					unauthorized("Token is invalid or expired")
				};

				state.log.push("refresh:done".into());

				Ok(response)
			},
			"token/" => {
				assert!(request.bearer.is_none(), "Login calls must not carry a bearer token.");

				let mut state = self.state.lock();

				state.log.push("login".into());

				if body["username"] == USERNAME && body["password"] == PASSWORD {
					let payload =
						json!({ "access": state.valid_access, "refresh": state.valid_refresh });

					Ok(ApiResponse::new(200, payload.to_string().into_bytes()))
				} else {
					Ok(unauthorized("No active account found with the given credentials"))
				}
			},
			_ => {
				let bearer = request.bearer.as_ref().map(|secret| secret.expose().to_owned());
				let (authorized, hook) = {
					let mut state = self.state.lock();

					state.log.push(format!(
						"{} {path} bearer={}",
						request.method,
						bearer.as_deref().unwrap_or("-")
					));

					let authorized = !state.always_unauthorized.contains(&path)
						&& bearer.as_deref() == Some(state.valid_access.as_str());
					let hook = if authorized { None } else { state.on_unauthorized.take() };

					(authorized, hook)
				};

				if let Some(hook) = hook {
					hook();
				}
				if !authorized {
					return Ok(unauthorized("Given token not valid for any token type"));
				}

				Ok(self
					.state
					.lock()
					.responses
					.get(&(request.method, path))
					.cloned()
					.unwrap_or_else(|| ApiResponse::new(200, b"[]".to_vec())))
			},
		}
	}
}
impl GatewayHttpClient for FakeBackend {
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			if self.state.lock().offline {
				return Err(connection_refused());
			}

			self.handle(request).await
		})
	}
}

fn connection_refused() -> TransportError {
	TransportError::Io(std::io::Error::new(
		std::io::ErrorKind::ConnectionRefused,
		"backend unreachable",
	))
}

fn unauthorized(detail: &str) -> ApiResponse {
	let payload = json!({ "detail": detail, "code": "token_not_valid" });

	ApiResponse::new(401, payload.to_string().into_bytes())
}

pub fn descriptor() -> BackendDescriptor {
	BackendDescriptor::builder(
		Url::parse("http://backend.test/api/").expect("Failed to parse fake backend URL."),
	)
	.build()
	.expect("Failed to build fake backend descriptor.")
}

/// Builds a gateway over `backend` with a memory store seeded by `pair`.
pub fn gateway(
	backend: &FakeBackend,
	pair: Option<CredentialPair>,
) -> (Gateway<FakeBackend>, MemoryStore) {
	let store = pair.map(MemoryStore::with_pair).unwrap_or_default();

	(gateway_with_store(backend, Arc::new(store.clone())), store)
}

pub fn gateway_with_store(
	backend: &FakeBackend,
	store: Arc<dyn CredentialStore>,
) -> Gateway<FakeBackend> {
	Gateway::with_http_client(store, descriptor(), backend.clone())
}

/// Memory store whose writes can be made to fail.
#[derive(Clone, Debug)]
pub struct FlakyStore {
	pub inner: MemoryStore,
	fail_saves: bool,
	fail_clears: bool,
}
impl FlakyStore {
	pub fn new(pair: CredentialPair) -> Self {
		Self { inner: MemoryStore::with_pair(pair), fail_saves: false, fail_clears: false }
	}

	pub fn failing_saves(mut self) -> Self {
		self.fail_saves = true;

		self
	}

	pub fn failing_clears(mut self) -> Self {
		self.fail_clears = true;

		self
	}
}
impl CredentialStore for FlakyStore {
	fn load(&self) -> StoreFuture<'_, Option<CredentialPair>> {
		self.inner.load()
	}

	fn save(&self, pair: CredentialPair) -> StoreFuture<'_, ()> {
		if self.fail_saves {
			return Box::pin(async { Err(StoreError::Backend { message: "disk full".into() }) });
		}

		self.inner.save(pair)
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		if self.fail_clears {
			return Box::pin(async {
				Err(StoreError::Backend { message: "read-only filesystem".into() })
			});
		}

		self.inner.clear()
	}
}

/// Polls `condition` until it holds or a generous deadline passes.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
	tokio::time::timeout(Duration::from_secs(5), async {
		while !condition() {
			tokio::time::sleep(Duration::from_millis(2)).await;
		}
	})
	.await
	.expect("Condition should hold before the deadline.");
}
