//! Session lifecycle: login, logout, registration, and authenticated state.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, LoginGrant},
	gateway::Gateway,
	http::{ApiRequest, GatewayHttpClient},
	obs::{self, OpOutcome, OpSpan, Operation},
};

/// Account registration payload for the register endpoint.
#[derive(Clone, Serialize)]
pub struct Registration {
	/// Desired username.
	pub username: String,
	/// Contact email.
	pub email: String,
	/// Password.
	pub password: String,
	/// Password confirmation; the backend rejects mismatches.
	pub password2: String,
}
impl Registration {
	/// Creates a registration whose confirmation matches `password`.
	pub fn new(
		username: impl Into<String>,
		email: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		let password = password.into();

		Self { username: username.into(), email: email.into(), password2: password.clone(), password }
	}
}
impl Debug for Registration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Registration")
			.field("username", &self.username)
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Created-user payload returned by the register endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
	/// Backend identifier, when the serializer exposes it.
	#[serde(default)]
	pub id: Option<u64>,
	/// Registered username.
	pub username: String,
	/// Registered email, when echoed back.
	#[serde(default)]
	pub email: Option<String>,
}

#[derive(Serialize)]
struct LoginForm<'a> {
	username: &'a str,
	password: &'a str,
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Exchanges a username/password for a credential pair and stores it.
	pub async fn login(&self, username: &str, password: &str) -> Result<CredentialPair> {
		const OP: Operation = Operation::Login;

		let span = OpSpan::new(OP, "login");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = ApiRequest::post(self.descriptor.paths.login.as_str())
					.with_json(&LoginForm { username, password })?
					.with_error_message("Login failed.");
				let grant: LoginGrant = self.send_json(request).await?;
				let pair = CredentialPair::from(grant);

				self.store.save(pair.clone()).await?;

				Ok(pair)
			})
			.await;

		obs::record_result(OP, &result);

		result
	}

	/// Clears the stored credential pair.
	pub async fn logout(&self) -> Result<()> {
		const OP: Operation = Operation::Logout;

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = self.store.clear().await.map_err(Error::from);

		obs::record_result(OP, &result);

		result
	}

	/// Registers a new account. Does not log in.
	pub async fn register(&self, registration: &Registration) -> Result<RegisteredUser> {
		const OP: Operation = Operation::Register;

		let span = OpSpan::new(OP, "register");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = ApiRequest::post(self.descriptor.paths.register.as_str())
					.with_json(registration)?
					.with_error_message("Registration failed.");

				self.send_json(request).await
			})
			.await;

		obs::record_result(OP, &result);

		result
	}

	/// Returns `true` when both tokens are stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.store.load().await?.is_some_and(|pair| pair.is_complete()))
	}
}
