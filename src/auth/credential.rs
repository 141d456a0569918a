//! The live access/refresh credential pair and the backend's token payloads.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access/refresh pair persisted by a [`CredentialStore`](crate::store::CredentialStore).
///
/// Exactly one pair is live at a time; stores replace it wholesale. The serialized keys match
/// the persisted `accessToken`/`refreshToken` entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived bearer credential.
	#[serde(rename = "accessToken")]
	pub access: TokenSecret,
	/// Longer-lived credential used only to mint new access tokens.
	#[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
	pub refresh: Option<TokenSecret>,
}
impl CredentialPair {
	/// Creates a complete pair.
	pub fn new(access: impl Into<TokenSecret>, refresh: impl Into<TokenSecret>) -> Self {
		Self { access: access.into(), refresh: Some(refresh.into()) }
	}

	/// Creates a pair with no refresh token; it cannot survive an access-token expiry.
	pub fn access_only(access: impl Into<TokenSecret>) -> Self {
		Self { access: access.into(), refresh: None }
	}

	/// Returns the refresh token when one is stored and non-blank.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh.as_ref().filter(|secret| !secret.is_blank())
	}

	/// Returns `true` when both tokens are present.
	pub fn is_complete(&self) -> bool {
		!self.access.is_blank() && self.refresh_token().is_some()
	}

	/// Applies a refresh response, keeping the current refresh token unless the backend
	/// rotated it.
	pub fn rotate(&self, grant: RefreshGrant) -> Self {
		let refresh = match grant.refresh {
			Some(rotated) if !rotated.is_blank() => Some(rotated),
			_ => self.refresh.clone(),
		};

		Self { access: grant.access, refresh }
	}
}
impl From<LoginGrant> for CredentialPair {
	fn from(grant: LoginGrant) -> Self {
		Self { access: grant.access, refresh: Some(grant.refresh) }
	}
}

/// Login endpoint response: `{ access, refresh }`.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginGrant {
	/// Newly issued access token.
	pub access: TokenSecret,
	/// Newly issued refresh token.
	pub refresh: TokenSecret,
}

/// Refresh endpoint response: `{ access, refresh? }`.
#[derive(Clone, Debug, Deserialize)]
pub struct RefreshGrant {
	/// Newly issued access token.
	pub access: TokenSecret,
	/// Rotated refresh token, present only when the backend rotates refresh tokens.
	#[serde(default)]
	pub refresh: Option<TokenSecret>,
}
