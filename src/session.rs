//! Session collaborator contract for pending authorization attempts.
//!
//! The engine never owns cookies or server-side sessions. It only needs somewhere to park one
//! [`AuthorizationState`] per in-flight login, keyed by [`SessionKey`], between `initiate` and
//! `complete_callback`. [`MemorySessionStore`] is the in-process reference implementation.

pub mod memory;

pub use memory::MemorySessionStore;

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, SessionId},
	flows::AuthorizationState,
};

/// Boxed future returned by [`SessionStore`] operations.
pub type SessionFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, SessionStoreError>> + 'a + Send>>;

/// Storage contract for pending [`AuthorizationState`] values.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Stores (or replaces) the pending state for `key`.
	fn put<'a>(&'a self, key: &'a SessionKey, state: AuthorizationState) -> SessionFuture<'a, ()>;

	/// Loads the pending state for `key`, if any.
	fn get<'a>(&'a self, key: &'a SessionKey) -> SessionFuture<'a, Option<AuthorizationState>>;

	/// Removes the pending state for `key`, returning what was stored.
	///
	/// Implementations must make removal atomic: of two concurrent calls for the same key, at
	/// most one observes `Some`.
	fn remove<'a>(&'a self, key: &'a SessionKey)
	-> SessionFuture<'a, Option<AuthorizationState>>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionStoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Key identifying one pending attempt: the provider plus the caller's session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
	/// Provider the attempt targets.
	pub provider: ProviderId,
	/// Caller-owned session identifier.
	pub session: SessionId,
}
impl SessionKey {
	/// Builds a key for the provided provider/session pair.
	pub fn new(provider: ProviderId, session: SessionId) -> Self {
		Self { provider, session }
	}
}
impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "oauth2:{}:{}", self.provider, self.session)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn session_error_converts_into_crate_error_with_source() {
		let session_error = SessionStoreError::Backend { message: "redis unreachable".into() };
		let error: Error = session_error.clone().into();

		assert!(matches!(error, Error::Session(_)));
		assert!(error.to_string().contains("redis unreachable"));

		let source = StdError::source(&error)
			.expect("Crate error should expose the original session error as its source.");

		assert_eq!(source.to_string(), session_error.to_string());
	}

	#[test]
	fn session_keys_render_provider_and_session() {
		let key = SessionKey::new(
			ProviderId::new("discord").expect("Provider fixture should be valid."),
			SessionId::new("sess-1").expect("Session fixture should be valid."),
		);

		assert_eq!(key.to_string(), "oauth2:discord:sess-1");
	}
}
