//! Anti-forgery state and PKCE material for one pending authorization attempt.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
// self
use crate::{_prelude::*, auth::Secret, error::StateError};

/// Time-to-live applied when none is configured.
pub const DEFAULT_STATE_TTL: Duration = Duration::minutes(10);

const NONCE_BYTES: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Pending login attempt parked in the session store between redirect and callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationState {
	/// URL-safe base64 nonce sent as the `state` parameter.
	pub nonce: String,
	/// Creation instant; the TTL counts from here.
	pub created_at: OffsetDateTime,
	/// PKCE verifier, when the attempt uses PKCE.
	pub code_verifier: Option<Secret>,
	/// Redirect URI the authorization request carried.
	pub redirect_uri: Url,
	/// Instant the nonce was accepted; a consumed state never validates again.
	#[serde(default)]
	pub consumed_at: Option<OffsetDateTime>,
}
impl AuthorizationState {
	/// Returns true once the nonce has been accepted.
	pub fn is_consumed(&self) -> bool {
		self.consumed_at.is_some()
	}

	/// PKCE challenge derived from the verifier, if any.
	pub fn code_challenge(&self) -> Option<String> {
		self.code_verifier.as_ref().map(|verifier| compute_pkce_challenge(verifier.expose()))
	}

	/// Challenge method paired with [`code_challenge`](Self::code_challenge).
	pub fn code_challenge_method(&self) -> Option<PkceCodeChallengeMethod> {
		self.code_verifier.as_ref().map(|_| PkceCodeChallengeMethod::S256)
	}
}

/// Creates and verifies [`AuthorizationState`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateManager {
	ttl: Duration,
}
impl StateManager {
	/// Creates a manager with a custom time-to-live.
	pub fn new(ttl: Duration) -> Self {
		Self { ttl }
	}

	/// Configured time-to-live.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Generates a fresh state, including a PKCE verifier when `with_pkce` is set.
	pub fn create_state(&self, redirect_uri: Url, with_pkce: bool) -> AuthorizationState {
		self.create_state_at(redirect_uri, with_pkce, OffsetDateTime::now_utc())
	}

	/// Same as [`create_state`](Self::create_state) with an explicit creation instant.
	pub fn create_state_at(
		&self,
		redirect_uri: Url,
		with_pkce: bool,
		now: OffsetDateTime,
	) -> AuthorizationState {
		AuthorizationState {
			nonce: random_nonce(),
			created_at: now,
			code_verifier: with_pkce.then(|| Secret::new(random_string(PKCE_VERIFIER_LEN))),
			redirect_uri,
			consumed_at: None,
		}
	}

	/// Checks `presented` against the stored state and consumes it on success.
	pub fn verify_state(
		&self,
		presented: &str,
		stored: Option<&mut AuthorizationState>,
	) -> Result<(), StateError> {
		self.verify_state_at(presented, stored, OffsetDateTime::now_utc())
	}

	/// Same as [`verify_state`](Self::verify_state) against an explicit clock reading.
	///
	/// Expiry is checked before the value, so a stale state reports
	/// [`StateError::Expired`] even when the presented value matches.
	pub fn verify_state_at(
		&self,
		presented: &str,
		stored: Option<&mut AuthorizationState>,
		now: OffsetDateTime,
	) -> Result<(), StateError> {
		let Some(stored) = stored else {
			return Err(StateError::Mismatch);
		};

		if now - stored.created_at > self.ttl {
			return Err(StateError::Expired);
		}
		if stored.is_consumed() || presented.is_empty() {
			return Err(StateError::Mismatch);
		}
		if !bool::from(presented.as_bytes().ct_eq(stored.nonce.as_bytes())) {
			return Err(StateError::Mismatch);
		}

		stored.consumed_at = Some(now);

		Ok(())
	}
}
impl Default for StateManager {
	fn default() -> Self {
		Self::new(DEFAULT_STATE_TTL)
	}
}

fn random_nonce() -> String {
	let mut bytes = [0_u8; NONCE_BYTES];

	rand::rng().fill(&mut bytes);

	URL_SAFE_NO_PAD.encode(bytes)
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
