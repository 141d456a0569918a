// self
use crate::{
	_prelude::*,
	backend::{BackendDescriptor, BackendPaths, endpoint_key, normalize_path},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum BackendDescriptorError {
	/// Base URL must use HTTP or HTTPS.
	#[error("The backend URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry query strings or fragments.
	#[error("The backend URL must not carry a query or fragment: {url}.")]
	UnexpectedQuery {
		/// URL that failed validation.
		url: String,
	},
	/// An endpoint path was left empty.
	#[error("The {endpoint} path must not be empty.")]
	EmptyPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
	},
	/// Two endpoints resolve to the same path.
	#[error("The login and refresh endpoints must use distinct paths: {path}.")]
	DuplicatePath {
		/// Path shared by both endpoints.
		path: String,
	},
}

/// Builder for [`BackendDescriptor`] values.
#[derive(Debug)]
pub struct BackendDescriptorBuilder {
	/// Base URL for every request.
	pub base_url: Url,
	/// Endpoint paths, seeded with the defaults.
	pub paths: BackendPaths,
}
impl BackendDescriptorBuilder {
	/// Creates a new builder seeded with the default endpoint paths.
	pub fn new(base_url: Url) -> Self {
		Self { base_url, paths: BackendPaths::default() }
	}

	/// Overrides the login path.
	pub fn login_path(mut self, path: impl AsRef<str>) -> Self {
		self.paths.login = normalize_path(path.as_ref()).to_owned();

		self
	}

	/// Overrides the refresh path.
	pub fn refresh_path(mut self, path: impl AsRef<str>) -> Self {
		self.paths.refresh = normalize_path(path.as_ref()).to_owned();

		self
	}

	/// Overrides the registration path.
	pub fn register_path(mut self, path: impl AsRef<str>) -> Self {
		self.paths.register = normalize_path(path.as_ref()).to_owned();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<BackendDescriptor, BackendDescriptorError> {
		let mut base_url = self.base_url;

		if !matches!(base_url.scheme(), "http" | "https") {
			return Err(BackendDescriptorError::UnsupportedScheme { url: base_url.to_string() });
		}
		if base_url.query().is_some() || base_url.fragment().is_some() {
			return Err(BackendDescriptorError::UnexpectedQuery { url: base_url.to_string() });
		}
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		let descriptor = BackendDescriptor { base_url, paths: self.paths };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl BackendDescriptor {
	fn validate(&self) -> Result<(), BackendDescriptorError> {
		validate_path("login", &self.paths.login)?;
		validate_path("refresh", &self.paths.refresh)?;
		validate_path("register", &self.paths.register)?;

		if endpoint_key(&self.paths.login) == endpoint_key(&self.paths.refresh) {
			return Err(BackendDescriptorError::DuplicatePath { path: self.paths.login.clone() });
		}

		Ok(())
	}
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), BackendDescriptorError> {
	if path.is_empty() { Err(BackendDescriptorError::EmptyPath { endpoint }) } else { Ok(()) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test URL.")
	}

	#[test]
	fn appends_trailing_slash_to_base() {
		let descriptor = BackendDescriptor::builder(url("https://clinic.example.com/api"))
			.build()
			.expect("Descriptor should build.");

		assert_eq!(descriptor.base_url.as_str(), "https://clinic.example.com/api/");
		assert_eq!(descriptor.paths, BackendPaths::default());
	}

	#[test]
	fn custom_paths_are_normalized() {
		let descriptor = BackendDescriptor::builder(url("https://clinic.example.com/"))
			.login_path("/auth/jwt/create/")
			.refresh_path("/auth/jwt/refresh/")
			.build()
			.expect("Descriptor should build.");

		assert_eq!(descriptor.paths.login, "auth/jwt/create/");
		assert_eq!(descriptor.paths.refresh, "auth/jwt/refresh/");
	}

	#[test]
	fn rejects_invalid_configuration() {
		let err = BackendDescriptor::builder(url("ftp://clinic.example.com/"))
			.build()
			.expect_err("FTP base URLs should be rejected.");

		assert!(matches!(err, BackendDescriptorError::UnsupportedScheme { .. }));

		let err = BackendDescriptor::builder(url("https://clinic.example.com/?x=1"))
			.build()
			.expect_err("Query strings should be rejected.");

		assert!(matches!(err, BackendDescriptorError::UnexpectedQuery { .. }));

		let err = BackendDescriptor::builder(url("https://clinic.example.com/"))
			.refresh_path("/")
			.build()
			.expect_err("Empty refresh paths should be rejected.");

		assert_eq!(err, BackendDescriptorError::EmptyPath { endpoint: "refresh" });

		let err = BackendDescriptor::builder(url("https://clinic.example.com/"))
			.refresh_path("token/")
			.build()
			.expect_err("Shared login/refresh paths should be rejected.");

		assert!(matches!(err, BackendDescriptorError::DuplicatePath { .. }));
	}
}
