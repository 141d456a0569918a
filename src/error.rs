//! Gateway-level error types shared by the transport, store, session, and resource layers.

// self
use crate::{_prelude::*, http::ErrorBody};

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Network-level failure; no response was received.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A successful response body could not be decoded.
	#[error("Response from `{path}` could not be decoded.")]
	Decode {
		/// Request path whose response failed to decode.
		path: String,
		/// Structured parsing failure, including the JSON path of the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},

	/// The session can no longer be refreshed; stored credentials have been cleared.
	#[error("Session expired: {reason}.")]
	AuthExpired {
		/// Why the refresh cycle could not restore the session.
		reason: String,
	},
	/// Backend rejected the request with a structured JSON error body.
	#[error("{message}")]
	ValidationFailed {
		/// HTTP status code of the rejection.
		status: u16,
		/// Flattened human-readable message.
		message: String,
		/// Field-level messages keyed by field name; empty when the body only had `detail`.
		fields: BTreeMap<String, Vec<String>>,
	},
	/// Backend rejected the request without a structured message.
	#[error("{message}")]
	NetworkOrUnknown {
		/// HTTP status code, when a response was received.
		status: Option<u16>,
		/// Raw body text or the caller-supplied default message.
		message: String,
	},
}
impl Error {
	/// Classifies a non-2xx response into [`Error::ValidationFailed`] or
	/// [`Error::NetworkOrUnknown`].
	pub fn from_rejection(status: u16, body: &[u8], default_message: &str) -> Self {
		match ErrorBody::parse(body) {
			ErrorBody::Structured { detail, fields } => {
				let message = ErrorBody::structured_message(detail.as_deref(), &fields)
					.unwrap_or_else(|| default_message.to_owned());

				Self::ValidationFailed { status, message, fields }
			},
			other => Self::NetworkOrUnknown {
				status: Some(status),
				message: other.message(default_message),
			},
		}
	}

	/// Returns the HTTP status attached to a backend rejection, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::ValidationFailed { status, .. } => Some(*status),
			Self::NetworkOrUnknown { status, .. } => *status,
			_ => None,
		}
	}

	/// Returns `true` when the caller must re-authenticate.
	pub fn is_auth_expired(&self) -> bool {
		matches!(self, Self::AuthExpired { .. })
	}
}

/// Configuration failures raised while preparing requests.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request path cannot be joined onto the backend base URL.
	#[error("Request path `{path}` cannot be resolved against the backend URL.")]
	InvalidPath {
		/// Offending request path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Body(#[from] serde_json::Error),
	/// Backend descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::backend::BackendDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn detail_body_becomes_validation_failure_without_fields() {
		let err = Error::from_rejection(401, br#"{"detail":"bad credentials"}"#, "Login failed.");

		match err {
			Error::ValidationFailed { status, message, fields } => {
				assert_eq!(status, 401);
				assert_eq!(message, "bad credentials");
				assert!(fields.is_empty());
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn field_errors_are_kept_and_flattened() {
		let err = Error::from_rejection(
			400,
			br#"{"username":["required"],"email":["invalid"]}"#,
			"Registration failed.",
		);
		let Error::ValidationFailed { message, fields, .. } = err else {
			panic!("Field errors should classify as a validation failure.");
		};

		assert!(message.contains("required"));
		assert!(message.contains("invalid"));
		assert_eq!(fields.get("email"), Some(&vec!["invalid".to_owned()]));
		assert_eq!(fields.len(), 2);
	}

	#[test]
	fn unstructured_bodies_fall_back_to_unknown() {
		let text = Error::from_rejection(502, b"Bad Gateway", "Failed to load patients.");

		assert!(matches!(text, Error::NetworkOrUnknown { status: Some(502), .. }));
		assert_eq!(text.to_string(), "Bad Gateway");

		let empty = Error::from_rejection(500, b"", "Failed to load patients.");

		assert_eq!(empty.to_string(), "Failed to load patients.");
		assert_eq!(empty.status(), Some(500));
	}

	#[test]
	fn auth_expired_is_flagged() {
		let err = Error::AuthExpired { reason: "No refresh token is stored".into() };

		assert!(err.is_auth_expired());
		assert_eq!(err.to_string(), "Session expired: No refresh token is stored.");
		assert_eq!(err.status(), None);
	}
}
