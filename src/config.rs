//! Per-instance client configuration.

// self
use crate::{
	_prelude::*,
	auth::{ScopeList, Secret},
	error::ConfigError,
};

/// Authorization parameters owned by the protocol; extra parameters may not override them.
pub const RESERVED_PARAMS: [&str; 7] = [
	"response_type",
	"client_id",
	"redirect_uri",
	"scope",
	"state",
	"code_challenge",
	"code_challenge_method",
];

/// Client registration and request preferences for one engine instance.
///
/// Deserializing validates the same invariants as the builder methods, so values loaded from
/// configuration files are never weaker than hand-built ones.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawStrategyConfig")]
pub struct StrategyConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret; redacted in `Debug`.
	pub client_secret: Secret,
	/// Callback URL registered with the provider.
	pub redirect_uri: Url,
	/// Requested scopes; `None` falls back to the descriptor defaults.
	pub scopes: Option<ScopeList>,
	/// Provider-specific authorization parameters (`prompt`, `access_type`, ...).
	pub extra_params: BTreeMap<String, String>,
	/// Generates a PKCE verifier for every attempt when true.
	pub use_pkce: bool,
}
impl StrategyConfig {
	/// Creates a config with descriptor default scopes, no extra parameters, and PKCE disabled.
	pub fn new(client_id: impl Into<String>, client_secret: Secret, redirect_uri: Url) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret,
			redirect_uri,
			scopes: None,
			extra_params: BTreeMap::new(),
			use_pkce: false,
		}
	}

	/// Overrides the descriptor's default scopes.
	pub fn with_scopes<I, S>(mut self, scopes: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = Some(ScopeList::new(scopes)?);

		Ok(self)
	}

	/// Adds one provider-specific authorization parameter.
	pub fn with_extra_param(
		mut self,
		name: impl Into<String>,
		value: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let name = name.into();

		ensure_not_reserved(&name)?;
		self.extra_params.insert(name, value.into());

		Ok(self)
	}

	/// Adds several provider-specific authorization parameters.
	pub fn with_extra_params<I, K, V>(self, params: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		params.into_iter().try_fold(self, |config, (name, value)| config.with_extra_param(name, value))
	}

	/// Enables or disables PKCE.
	pub fn with_pkce(mut self, use_pkce: bool) -> Self {
		self.use_pkce = use_pkce;

		self
	}
}

#[derive(Deserialize)]
struct RawStrategyConfig {
	client_id: String,
	client_secret: Secret,
	redirect_uri: Url,
	#[serde(default)]
	scopes: Option<ScopeList>,
	#[serde(default)]
	extra_params: BTreeMap<String, String>,
	#[serde(default)]
	use_pkce: bool,
}
impl TryFrom<RawStrategyConfig> for StrategyConfig {
	type Error = ConfigError;

	fn try_from(raw: RawStrategyConfig) -> Result<Self, Self::Error> {
		let config = StrategyConfig {
			client_id: raw.client_id,
			client_secret: raw.client_secret,
			redirect_uri: raw.redirect_uri,
			scopes: raw.scopes,
			extra_params: BTreeMap::new(),
			use_pkce: raw.use_pkce,
		};

		config.with_extra_params(raw.extra_params)
	}
}

fn ensure_not_reserved(name: &str) -> Result<(), ConfigError> {
	if RESERVED_PARAMS.contains(&name) {
		Err(ConfigError::ReservedParameter { name: name.to_owned() })
	} else {
		Ok(())
	}
}
