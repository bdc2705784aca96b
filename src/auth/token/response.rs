//! Immutable token exchange results handed to callers after a successful callback.

// self
use crate::{_prelude::*, auth::token::secret::Secret};

/// Errors produced by [`TokenResponseBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenResponseBuilderError {
	/// Issued when no (or an empty) access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no (or an empty) token type was provided.
	#[error("Token type is required.")]
	MissingTokenType,
}
impl TokenResponseBuilderError {
	/// Name of the token endpoint field that was absent.
	pub const fn field(&self) -> &'static str {
		match self {
			Self::MissingAccessToken => "access_token",
			Self::MissingTokenType => "token_type",
		}
	}
}

/// Tokens returned by the provider's token endpoint.
///
/// The engine never stores these; they are handed to the caller once the callback completes.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Access token secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Token type as reported by the provider (usually `Bearer`).
	pub token_type: String,
	/// Lifetime relative to [`received_at`](Self::received_at), when the provider supplied one.
	pub expires_in: Option<Duration>,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<Secret>,
	/// OpenID Connect ID token, if the provider issued one.
	pub id_token: Option<Secret>,
	/// Raw `scope` string echoed by the provider.
	pub scope: Option<String>,
	/// Remaining provider-specific fields, keyed by their JSON name.
	pub extra: BTreeMap<String, JsonValue>,
	/// Instant the response was received.
	pub received_at: OffsetDateTime,
}
impl TokenResponse {
	/// Returns a builder for assembling a validated response.
	pub fn builder() -> TokenResponseBuilder {
		TokenResponseBuilder::default()
	}

	/// Absolute expiry derived from `received_at + expires_in`.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_in.map(|delta| self.received_at + delta)
	}

	/// Returns `true` if the access token is known to be expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires_at| instant >= expires_at)
	}
}
impl Debug for TokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponse")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
			.field("scope", &self.scope)
			.field("extra", &self.extra.keys().collect::<Vec<_>>())
			.field("received_at", &self.received_at)
			.finish()
	}
}

/// Builder for [`TokenResponse`].
#[derive(Clone, Debug, Default)]
pub struct TokenResponseBuilder {
	access_token: Option<Secret>,
	token_type: Option<String>,
	expires_in: Option<Duration>,
	refresh_token: Option<Secret>,
	id_token: Option<Secret>,
	scope: Option<String>,
	extra: BTreeMap<String, JsonValue>,
	received_at: Option<OffsetDateTime>,
}
impl TokenResponseBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(Secret::new(token));

		self
	}

	/// Provides the token type.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the relative lifetime of the access token.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(Secret::new(token));

		self
	}

	/// Provides the ID token value.
	pub fn id_token(mut self, token: impl Into<String>) -> Self {
		self.id_token = Some(Secret::new(token));

		self
	}

	/// Records the raw `scope` string echoed by the provider.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Adds a provider-specific field. Later values replace earlier ones with the same key.
	pub fn extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
		self.extra.insert(key.into(), value);

		self
	}

	/// Sets the instant the response was received.
	pub fn received_at(mut self, instant: OffsetDateTime) -> Self {
		self.received_at = Some(instant);

		self
	}

	/// Consumes the builder and produces a [`TokenResponse`].
	pub fn build(self) -> Result<TokenResponse, TokenResponseBuilderError> {
		let access_token = self
			.access_token
			.filter(|token| !token.expose().is_empty())
			.ok_or(TokenResponseBuilderError::MissingAccessToken)?;
		let token_type = self
			.token_type
			.filter(|value| !value.is_empty())
			.ok_or(TokenResponseBuilderError::MissingTokenType)?;

		Ok(TokenResponse {
			access_token,
			token_type,
			expires_in: self.expires_in,
			refresh_token: self.refresh_token,
			id_token: self.id_token,
			scope: self.scope,
			extra: self.extra,
			received_at: self.received_at.unwrap_or_else(OffsetDateTime::now_utc),
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn builder_requires_access_token_and_type() {
		assert_eq!(
			TokenResponse::builder().token_type("Bearer").build().map(|_| ()),
			Err(TokenResponseBuilderError::MissingAccessToken)
		);
		assert_eq!(
			TokenResponse::builder().access_token("at").token_type("").build().map(|_| ()),
			Err(TokenResponseBuilderError::MissingTokenType)
		);
		assert_eq!(TokenResponseBuilderError::MissingTokenType.field(), "token_type");
	}

	#[test]
	fn expiry_is_relative_to_receipt() {
		let received = macros::datetime!(2025-01-01 00:00 UTC);
		let response = TokenResponse::builder()
			.access_token("at")
			.token_type("Bearer")
			.expires_in(Duration::seconds(3600))
			.received_at(received)
			.build()
			.expect("Token response should build.");

		assert_eq!(response.expires_at(), Some(macros::datetime!(2025-01-01 01:00 UTC)));
		assert!(!response.is_expired_at(macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(response.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
	}

	#[test]
	fn debug_output_redacts_tokens() {
		let response = TokenResponse::builder()
			.access_token("access-secret")
			.token_type("Bearer")
			.refresh_token("refresh-secret")
			.id_token("id-secret")
			.extra("hd", JsonValue::String("example.com".into()))
			.build()
			.expect("Token response should build.");
		let rendered = format!("{response:?}");

		assert!(!rendered.contains("access-secret"));
		assert!(!rendered.contains("refresh-secret"));
		assert!(!rendered.contains("id-secret"));
		assert!(rendered.contains("hd"));
	}
}
