//! Crate-level error types shared across flows, providers, and session stores.

// self
use crate::{_prelude::*, auth::ProviderId};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;
/// JSON failure annotated with the path of the offending field.
pub type JsonPathError = serde_path_to_error::Error<serde_json::Error>;

/// Canonical error exposed by public APIs.
///
/// Every variant is terminal: the engine never retries or recovers on its own, so callers decide
/// whether to re-prompt the user or surface a message.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Anti-forgery state validation failed.
	#[error(transparent)]
	State(#[from] StateError),
	/// Callback carried neither an authorization code nor a provider error.
	#[error("Callback is missing the authorization code.")]
	MissingCode,
	/// Provider reported `error=` on the callback (the user declined, or the request was bad).
	#[error("Provider denied the authorization request: {error}.")]
	AuthorizationDenied {
		/// OAuth `error` code.
		error: String,
		/// Optional `error_description`.
		description: Option<String>,
		/// Optional `error_uri`.
		uri: Option<String>,
	},
	/// Code-for-token exchange failed.
	#[error(transparent)]
	TokenExchange(#[from] TokenExchangeError),
	/// Userinfo request failed.
	#[error(transparent)]
	ProfileFetch(#[from] ProfileFetchError),
	/// Provider returned a payload that could not be parsed or violated its schema.
	#[error(transparent)]
	MalformedResponse(#[from] MalformedResponseError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Session collaborator failure.
	#[error("{0}")]
	Session(
		#[from]
		#[source]
		crate::session::SessionStoreError,
	),
}

/// Failures raised while verifying the `state` parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum StateError {
	/// The presented value is empty, differs from the stored nonce, was already consumed, or no
	/// pending state exists.
	#[error("Authorization state mismatch.")]
	Mismatch,
	/// The pending state outlived its time-to-live.
	#[error("Authorization state expired.")]
	Expired,
}

/// Token endpoint failures.
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
	/// Token endpoint rejected the exchange, either with a non-success status or with an OAuth
	/// error payload under a success status.
	#[error("Token endpoint responded with HTTP {status}.")]
	Status {
		/// Upstream HTTP status code.
		status: u16,
		/// Upstream response body exactly as received (lossy UTF-8), provider extras included.
		body: String,
	},
	/// Request never produced a response (DNS, TCP, TLS, timeout).
	#[error("Token endpoint could not be reached.")]
	Transport(#[from] TransportError),
}

/// Userinfo endpoint failures.
#[derive(Debug, ThisError)]
pub enum ProfileFetchError {
	/// Userinfo endpoint answered with a non-success status.
	#[error("Userinfo endpoint responded with HTTP {status}.")]
	Status {
		/// Upstream HTTP status code.
		status: u16,
		/// Upstream response body (lossy UTF-8).
		body: String,
	},
	/// Request never produced a response (DNS, TCP, TLS, timeout).
	#[error("Userinfo endpoint could not be reached.")]
	Transport(#[from] TransportError),
}

/// Remote endpoints contacted by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// Token endpoint (code exchange).
	Token,
	/// Userinfo endpoint (profile fetch).
	UserInfo,
}
impl Endpoint {
	/// Returns a stable label suitable for messages and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Token => "token",
			Endpoint::UserInfo => "userinfo",
		}
	}

	/// Wraps a transport failure into the error family of this endpoint.
	pub fn transport_failure(self, err: TransportError) -> Error {
		match self {
			Endpoint::Token => TokenExchangeError::Transport(err).into(),
			Endpoint::UserInfo => ProfileFetchError::Transport(err).into(),
		}
	}

	/// Wraps a non-success HTTP status into the error family of this endpoint.
	pub fn status_failure(self, status: u16, body: impl Into<String>) -> Error {
		let body = body.into();

		match self {
			Endpoint::Token => TokenExchangeError::Status { status, body }.into(),
			Endpoint::UserInfo => ProfileFetchError::Status { status, body }.into(),
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Payloads that could not be parsed or violated the expected schema.
#[derive(Debug, ThisError)]
pub enum MalformedResponseError {
	/// Body is not valid JSON for the expected shape.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	Json {
		/// Endpoint that produced the payload.
		endpoint: Endpoint,
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
	},
	/// Response was unusable for a non-JSON reason (content type, empty body).
	#[error("The {endpoint} endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Endpoint that produced the payload.
		endpoint: Endpoint,
		/// Human-readable reason.
		message: String,
	},
	/// Body parsed but a required field was absent or empty.
	#[error("The {endpoint} endpoint response is missing `{field}`.")]
	MissingField {
		/// Endpoint that produced the payload.
		endpoint: Endpoint,
		/// Name of the absent field.
		field: &'static str,
	},
	/// Userinfo payload did not satisfy the provider's profile schema.
	#[error("Userinfo payload violates the `{provider}` profile schema.")]
	Schema {
		/// Provider whose normalizer rejected the payload.
		provider: ProviderId,
		/// Schema failure.
		#[source]
		source: SchemaError,
	},
}

/// Profile normalization failures.
#[derive(Debug, ThisError)]
pub enum SchemaError {
	/// Payload does not deserialize into the provider's typed schema.
	#[error("Payload does not match the expected schema.")]
	Invalid(#[from] JsonPathError),
	/// Payload carries an empty or unusable user identifier.
	#[error("Payload is missing a usable provider user identifier.")]
	MissingUserId,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Descriptor has no userinfo endpoint, so profiles cannot be fetched.
	#[error("Descriptor `{descriptor}` does not declare a userinfo endpoint.")]
	MissingUserInfoEndpoint {
		/// Provider identifier string.
		descriptor: String,
	},
	/// Access token cannot be carried in an `Authorization` header.
	#[error("Access token contains characters that are not valid in an HTTP header.")]
	InvalidAccessToken,
	/// Extra authorization parameter collides with a protocol parameter.
	#[error("The `{name}` authorization parameter is reserved.")]
	ReservedParameter {
		/// Offending parameter name.
		name: String,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
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
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client gave up waiting for the provider.
	#[error("Request to the provider timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Transport failed for a reason it could only describe as text.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoint_helpers_route_into_matching_families() {
		let err = Endpoint::Token.status_failure(400, "{\"error\":\"invalid_grant\"}");

		assert!(matches!(
			err,
			Error::TokenExchange(TokenExchangeError::Status { status: 400, ref body })
				if body.contains("invalid_grant")
		));

		let err = Endpoint::UserInfo.transport_failure(TransportError::Other {
			message: "connection reset".into(),
		});

		assert!(matches!(err, Error::ProfileFetch(ProfileFetchError::Transport(_))));
	}

	#[test]
	fn state_errors_are_transparent() {
		let err: Error = StateError::Expired.into();

		assert_eq!(err.to_string(), "Authorization state expired.");
		assert!(matches!(err, Error::State(StateError::Expired)));
	}
}
