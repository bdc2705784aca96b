//! Authorization redirect construction and the `initiate` operation.

// self
use crate::{
	_prelude::*,
	auth::SessionId,
	config::StrategyConfig,
	flows::{AuthorizationState, FlowStage, Strategy},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderDescriptor,
	session::SessionKey,
};

/// HTTP status callers should answer with when redirecting the user agent.
pub const REDIRECT_STATUS: u16 = 302;

/// Redirect the hosting application must issue after `initiate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectInstruction {
	/// Provider authorization URL for the `Location` header.
	pub location: Url,
	/// Session entry holding the pending state.
	pub session_key: SessionKey,
}
impl RedirectInstruction {
	/// Redirect status code (always `302 Found`).
	pub fn status(&self) -> u16 {
		REDIRECT_STATUS
	}
}

/// Builds the provider authorization URL.
///
/// Parameters are appended after any query already present on the endpoint, in this order:
/// `response_type`, `client_id`, `redirect_uri`, `scope`, `state`, the PKCE pair when the state
/// carries a verifier, then the config's extra parameters.
pub fn build_authorization_url(
	descriptor: &ProviderDescriptor,
	config: &StrategyConfig,
	state: &AuthorizationState,
) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", &config.client_id);
	pairs.append_pair("redirect_uri", state.redirect_uri.as_str());
	pairs.append_pair("scope", &descriptor.format_scope(config.scopes.as_ref()));
	pairs.append_pair("state", &state.nonce);

	if let (Some(challenge), Some(method)) = (state.code_challenge(), state.code_challenge_method())
	{
		pairs.append_pair("code_challenge", &challenge);
		pairs.append_pair("code_challenge_method", method.as_str());
	}

	for (name, value) in &config.extra_params {
		pairs.append_pair(name, value);
	}

	drop(pairs);

	url
}

impl<C, M> Strategy<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Starts a login attempt for `session_id`.
	///
	/// Creates a fresh state, stores it under `(provider, session_id)`, replacing any earlier
	/// pending attempt for the same session, and returns the redirect to issue.
	pub async fn initiate(&self, session_id: SessionId) -> Result<RedirectInstruction> {
		const KIND: FlowKind = FlowKind::Initiate;

		let span = FlowSpan::new(KIND, "initiate", &self.descriptor.id);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		obs::record_stage(KIND, FlowStage::Idle);

		let result = span
			.instrument(async move {
				let with_pkce = self.config.use_pkce || self.descriptor.quirks.pkce_required;
				let state = self.state_manager.create_state(self.config.redirect_uri.clone(), with_pkce);
				let location = build_authorization_url(&self.descriptor, &self.config, &state);
				let session_key = SessionKey::new(self.descriptor.id.clone(), session_id);

				self.sessions.put(&session_key, state).await?;
				obs::record_stage(KIND, FlowStage::AwaitingCallback);

				Ok(RedirectInstruction { location, session_key })
			})
			.await;

		obs::finish_flow(KIND, &result);

		result
	}

	/// Builds the authorization URL for an externally managed state.
	pub fn build_authorization_url(&self, state: &AuthorizationState) -> Url {
		build_authorization_url(&self.descriptor, &self.config, state)
	}
}
