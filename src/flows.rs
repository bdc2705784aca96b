//! The provider-agnostic Authorization Code engine.
//!
//! [`Strategy`] combines one [`ProviderDescriptor`], one [`StrategyConfig`], one
//! [`ProfileNormalizer`], a [`SessionStore`], and an HTTP transport. It exposes two
//! operations: [`Strategy::initiate`] produces a [`RedirectInstruction`] and
//! [`Strategy::complete_callback`] turns the provider callback into an
//! [`AuthenticatedIdentity`].

pub mod authorize;
pub mod callback;
pub mod state;

pub use authorize::*;
pub use callback::*;
pub use state::*;

// self
use crate::{
	_prelude::*,
	config::StrategyConfig,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	profile::ProfileNormalizer,
	provider::ProviderDescriptor,
	session::SessionStore,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Strategy specialized for the crate's default reqwest transport stack.
pub type ReqwestStrategy = Strategy<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Stages a login attempt moves through.
///
/// `Failed` is reachable from every non-terminal stage. Stages are reported through tracing and
/// never stored between calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// Nothing has happened yet.
	Idle,
	/// Redirect issued; waiting for the provider callback.
	AwaitingCallback,
	/// Trading the authorization code for tokens.
	Exchanging,
	/// Calling the userinfo endpoint and normalizing the payload.
	FetchingProfile,
	/// Identity verified.
	Complete,
	/// Attempt aborted with an error.
	Failed,
}
impl FlowStage {
	/// Returns a stable label suitable for span or event fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::Idle => "idle",
			FlowStage::AwaitingCallback => "awaiting_callback",
			FlowStage::Exchanging => "exchanging",
			FlowStage::FetchingProfile => "fetching_profile",
			FlowStage::Complete => "complete",
			FlowStage::Failed => "failed",
		}
	}

	/// Returns true for `Complete` and `Failed`.
	pub const fn is_terminal(self) -> bool {
		matches!(self, FlowStage::Complete | FlowStage::Failed)
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs the Authorization Code grant against a single provider.
///
/// The engine keeps no per-attempt state of its own; everything lives in the session store,
/// so one instance can be cloned and shared across request handlers.
pub struct Strategy<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Session collaborator holding pending states.
	pub sessions: Arc<dyn SessionStore>,
	/// Provider descriptor that defines endpoints and scope defaults.
	pub descriptor: ProviderDescriptor,
	/// Provider-specific profile mapping.
	pub normalizer: Arc<dyn ProfileNormalizer>,
	/// Client registration and request preferences.
	pub config: StrategyConfig,
	/// State generation and verification policy.
	pub state_manager: StateManager,
}
impl<C, M> Strategy<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a strategy that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		sessions: Arc<dyn SessionStore>,
		descriptor: ProviderDescriptor,
		normalizer: Arc<dyn ProfileNormalizer>,
		config: StrategyConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			sessions,
			descriptor,
			normalizer,
			config,
			state_manager: StateManager::default(),
		}
	}

	/// Replaces the state manager (for example to change the TTL).
	pub fn with_state_manager(mut self, state_manager: StateManager) -> Self {
		self.state_manager = state_manager;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Strategy<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a strategy backed by a default reqwest transport.
	pub fn new(
		sessions: Arc<dyn SessionStore>,
		descriptor: ProviderDescriptor,
		normalizer: Arc<dyn ProfileNormalizer>,
		config: StrategyConfig,
	) -> Self {
		Self::with_http_client(
			sessions,
			descriptor,
			normalizer,
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Clone for Strategy<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			sessions: self.sessions.clone(),
			descriptor: self.descriptor.clone(),
			normalizer: self.normalizer.clone(),
			config: self.config.clone(),
			state_manager: self.state_manager,
		}
	}
}
impl<C, M> Debug for Strategy<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Strategy")
			.field("descriptor", &self.descriptor)
			.field("config", &self.config)
			.field("state_manager", &self.state_manager)
			.finish()
	}
}
