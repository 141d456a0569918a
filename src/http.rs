//! Transport primitives for backend calls.
//!
//! [`GatewayHttpClient`] is the gateway's only dependency on an HTTP stack. Callers describe
//! requests with [`ApiRequest`] (a path relative to the backend base URL plus an optional JSON
//! body); the gateway resolves them into [`OutboundRequest`] values, attaches the bearer
//! credential where required, and hands them to the transport. Implementations return every
//! HTTP response as an [`ApiResponse`], whatever its status, and reserve [`TransportError`]
//! for calls that never produced a response.

pub mod body;

pub use body::*;

// std
use std::borrow::Cow;
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, TransportError},
};

const DEFAULT_ERROR_MESSAGE: &str = "Request failed.";

/// Boxed future returned by [`GatewayHttpClient::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports used by the gateway.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back a gateway shared
/// across tasks, and the returned future must be `Send` so gateway futures can hop executors.
pub trait GatewayHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes `request`, returning the response for any HTTP status.
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_>;
}

/// HTTP verbs used against the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Caller-level request addressed by a path relative to the backend base URL.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Path relative to the backend base URL, e.g. `patients/`.
	pub path: String,
	/// Optional JSON body.
	pub body: Option<Value>,
	/// Message surfaced when a rejection carries no usable message of its own.
	pub error_message: Cow<'static, str>,
	pub(crate) retried: bool,
}
impl ApiRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			body: None,
			error_message: Cow::Borrowed(DEFAULT_ERROR_MESSAGE),
			retried: false,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Attaches a raw JSON body.
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Serializes `body` and attaches it.
	pub fn with_json<T>(self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		Ok(self.with_body(serde_json::to_value(body)?))
	}

	/// Overrides the fallback message used for unstructured rejections.
	pub fn with_error_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
		self.error_message = message.into();

		self
	}

	/// Returns `true` once the gateway has spent this request's single authorization retry.
	pub fn is_retry(&self) -> bool {
		self.retried
	}
}

/// Wire-level request handed to a [`GatewayHttpClient`].
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Bearer credential to send as `Authorization: Bearer <token>`.
	pub bearer: Option<TokenSecret>,
	/// Serialized JSON body.
	pub body: Option<Vec<u8>>,
}

/// HTTP response returned by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response from a status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for `401 Unauthorized`.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Decodes the body as JSON, reporting the failing field path on error.
	pub fn json<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let de = &mut serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(de)
			.map_err(|source| Error::Decode { path: path.to_owned(), source })
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl GatewayHttpClient for ReqwestHttpClient {
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client
				.request(request.method.into(), request.url)
				.header(ACCEPT, "application/json");

			if let Some(bearer) = request.bearer.as_ref() {
				builder = builder.header(AUTHORIZATION, bearer.bearer_header());
			}
			if let Some(body) = request.body {
				builder = builder.header(CONTENT_TYPE, "application/json").body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse::new(status, body))
		})
	}
}
