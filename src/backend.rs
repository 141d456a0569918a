//! Backend descriptor: the validated base URL and the credential-exchange paths.
//!
//! Request paths are relative to the base URL (`patients/`, `token/refresh/`). The descriptor
//! classifies each path into an [`EndpointKind`] so the gateway knows which requests must go
//! out without a bearer credential and which may trigger a token refresh.

/// Builder API for assembling backend descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Default login path, relative to the base URL.
pub const DEFAULT_LOGIN_PATH: &str = "token/";
/// Default refresh path, relative to the base URL.
pub const DEFAULT_REFRESH_PATH: &str = "token/refresh/";
/// Default registration path, relative to the base URL.
pub const DEFAULT_REGISTER_PATH: &str = "register/";

/// Role of a request path within the authentication protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointKind {
	/// Username/password exchange for a credential pair.
	Login,
	/// Refresh-token exchange for a new access token.
	Refresh,
	/// Account registration.
	Register,
	/// Any other backend resource.
	Resource,
}
impl EndpointKind {
	/// Returns `true` for endpoints that must never carry a bearer credential.
	pub const fn is_credential_exchange(self) -> bool {
		matches!(self, EndpointKind::Login | EndpointKind::Refresh)
	}
}

/// Endpoint paths declared by a descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendPaths {
	/// Login path.
	pub login: String,
	/// Refresh path.
	pub refresh: String,
	/// Registration path.
	pub register: String,
}
impl Default for BackendPaths {
	fn default() -> Self {
		Self {
			login: DEFAULT_LOGIN_PATH.into(),
			refresh: DEFAULT_REFRESH_PATH.into(),
			register: DEFAULT_REGISTER_PATH.into(),
		}
	}
}

/// Immutable backend descriptor consumed by the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendDescriptor {
	/// Base URL every request path is joined onto; always ends with `/`.
	pub base_url: Url,
	/// Credential-exchange and registration paths.
	pub paths: BackendPaths,
}
impl BackendDescriptor {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> BackendDescriptorBuilder {
		BackendDescriptorBuilder::new(base_url)
	}

	/// Classifies a request path, ignoring surrounding slashes and any query or fragment.
	pub fn kind(&self, path: &str) -> EndpointKind {
		let path = endpoint_key(path);

		if path == endpoint_key(&self.paths.login) {
			EndpointKind::Login
		} else if path == endpoint_key(&self.paths.refresh) {
			EndpointKind::Refresh
		} else if path == endpoint_key(&self.paths.register) {
			EndpointKind::Register
		} else {
			EndpointKind::Resource
		}
	}

	/// Resolves a request path against the base URL.
	pub fn url_for(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(normalize_path(path))
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	}
}

/// Strips leading slashes so paths always resolve below the base URL.
pub(crate) fn normalize_path(path: &str) -> &str {
	path.trim().trim_start_matches('/')
}

fn endpoint_key(path: &str) -> &str {
	let path = normalize_path(path);
	let end = path.find(['?', '#']).unwrap_or(path.len());

	path[..end].trim_end_matches('/')
}
