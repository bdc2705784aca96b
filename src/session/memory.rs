//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	flows::AuthorizationState,
	session::{SessionFuture, SessionKey, SessionStore},
};

type SessionMap = Arc<RwLock<HashMap<SessionKey, AuthorizationState>>>;

/// Session backend that keeps pending states in-process.
///
/// Entries are removed when a callback consumes them. Abandoned attempts linger until
/// [`MemorySessionStore::purge_expired`] is called.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(SessionMap);
impl MemorySessionStore {
	/// Number of pending states.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no state is pending.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Drops every state created more than `ttl` before `now`, returning how many were removed.
	pub fn purge_expired(&self, ttl: Duration, now: OffsetDateTime) -> usize {
		let mut guard = self.0.write();
		let before = guard.len();

		guard.retain(|_, state| now - state.created_at <= ttl);

		before - guard.len()
	}
}
impl SessionStore for MemorySessionStore {
	fn put<'a>(&'a self, key: &'a SessionKey, state: AuthorizationState) -> SessionFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key.to_owned(), state);

			Ok(())
		})
	}

	fn get<'a>(&'a self, key: &'a SessionKey) -> SessionFuture<'a, Option<AuthorizationState>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn remove<'a>(
		&'a self,
		key: &'a SessionKey,
	) -> SessionFuture<'a, Option<AuthorizationState>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(key)) })
	}
}
