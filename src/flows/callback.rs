//! Callback handling: state verification, code exchange, and profile normalization.

// self
use crate::{
	_prelude::*,
	auth::{SessionId, TokenResponse},
	error::{ConfigError, MalformedResponseError, StateError},
	flows::{FlowStage, Strategy},
	http::ProviderHttpClient,
	oauth::{CodeExchangeFacade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	profile::{Profile, fetch},
	session::SessionKey,
};

/// Framework-neutral view of the callback request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
	/// Caller-owned session the attempt belongs to.
	pub session_id: SessionId,
	/// Callback query parameters; the first occurrence of a name wins.
	pub query: BTreeMap<String, String>,
}
impl RequestContext {
	/// Creates a context with no query parameters.
	pub fn new(session_id: SessionId) -> Self {
		Self { session_id, query: BTreeMap::new() }
	}

	/// Adds a query parameter unless one with the same name already exists.
	pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.entry(name.into()).or_insert_with(|| value.into());

		self
	}

	/// Builds a context from the full callback URL.
	pub fn from_callback_url(session_id: SessionId, url: &Url) -> Self {
		url.query_pairs().fold(Self::new(session_id), |ctx, (name, value)| {
			ctx.with_query_param(name.into_owned(), value.into_owned())
		})
	}

	/// Extracts the OAuth callback parameters.
	pub fn callback_params(&self) -> CallbackParams {
		let take = |name: &str| self.query.get(name).cloned();

		CallbackParams {
			code: take("code"),
			state: take("state"),
			error: take("error"),
			error_description: take("error_description"),
			error_uri: take("error_uri"),
		}
	}
}

/// OAuth parameters carried by the callback.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// Echoed `state` value.
	pub state: Option<String>,
	/// OAuth error code.
	pub error: Option<String>,
	/// Human-readable error description.
	pub error_description: Option<String>,
	/// Error documentation link.
	pub error_uri: Option<String>,
}

/// Verified identity returned by a successful callback.
#[derive(Clone, Debug)]
pub struct AuthenticatedIdentity {
	/// Normalized profile.
	pub profile: Profile,
	/// Tokens issued by the provider.
	pub tokens: TokenResponse,
}

impl<C, M> Strategy<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Completes a login attempt from the provider callback.
	///
	/// State is verified and removed from the session store before the token endpoint is
	/// contacted, so a forged or replayed callback never reaches the provider. A provider denial
	/// only clears the pending state when it carries that state.
	pub async fn complete_callback(&self, ctx: RequestContext) -> Result<AuthenticatedIdentity> {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, "complete_callback", &self.descriptor.id);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		obs::record_stage(KIND, FlowStage::AwaitingCallback);

		let result = span
			.instrument(async move {
				let params = ctx.callback_params();
				let key = SessionKey::new(self.descriptor.id.clone(), ctx.session_id);

				if let Some(error) = params.error {
					let presented = params.state.unwrap_or_default();
					let mut stored = self.sessions.get(&key).await?;

					// Only a denial carrying the pending state may cancel the attempt.
					if matches!(
						self.state_manager.verify_state(&presented, stored.as_mut()),
						Ok(()) | Err(StateError::Expired)
					) {
						self.sessions.remove(&key).await?;
					}

					return Err(Error::AuthorizationDenied {
						error,
						description: params.error_description,
						uri: params.error_uri,
					});
				}

				let code = params.code.filter(|code| !code.is_empty()).ok_or(Error::MissingCode)?;
				let presented = params.state.unwrap_or_default();
				let mut stored = self.sessions.get(&key).await?;

				match self.state_manager.verify_state(&presented, stored.as_mut()) {
					Ok(()) => (),
					Err(StateError::Expired) => {
						self.sessions.remove(&key).await?;

						return Err(StateError::Expired.into());
					},
					Err(err) => return Err(err.into()),
				}

				let Some(verified) = stored else {
					return Err(StateError::Mismatch.into());
				};

				// A concurrent callback or a newer `initiate` may have replaced the entry.
				match self.sessions.remove(&key).await? {
					Some(removed) if removed.nonce == verified.nonce => (),
					_ => return Err(StateError::Mismatch.into()),
				}

				obs::record_stage(KIND, FlowStage::Exchanging);

				let tokens = self
					.exchange_code(&code, verified.code_verifier.as_ref().map(|v| v.expose()))
					.await?;

				obs::record_stage(KIND, FlowStage::FetchingProfile);

				let profile = self.fetch_profile(tokens.access_token.expose()).await?;

				obs::record_stage(KIND, FlowStage::Complete);

				Ok(AuthenticatedIdentity { profile, tokens })
			})
			.await;

		obs::finish_flow(KIND, &result);

		result
	}

	/// Exchanges an authorization code at the token endpoint.
	pub async fn exchange_code(
		&self,
		code: &str,
		code_verifier: Option<&str>,
	) -> Result<TokenResponse> {
		let facade = CodeExchangeFacade::from_descriptor(
			&self.descriptor,
			&self.config,
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
		)?;

		facade.exchange_authorization_code(code, code_verifier).await
	}

	/// Fetches the userinfo payload and normalizes it.
	///
	/// The returned profile is attributed to this engine's descriptor id.
	pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
		let userinfo = self.descriptor.endpoints.userinfo.as_ref().ok_or_else(|| {
			ConfigError::MissingUserInfoEndpoint { descriptor: self.descriptor.id.to_string() }
		})?;
		let raw = fetch::fetch_userinfo(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			userinfo,
			access_token,
		)
		.await?;
		let mut profile = self.normalizer.normalize(raw).map_err(|source| {
			MalformedResponseError::Schema { provider: self.descriptor.id.clone(), source }
		})?;

		profile.provider = self.descriptor.id.clone();

		Ok(profile)
	}
}
