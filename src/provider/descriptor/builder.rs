// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ScopeList},
	provider::{ClientAuthMethod, ProviderDescriptor, ProviderEndpoints, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is required.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Endpoint string could not be parsed as a URL.
	#[error("The {endpoint} endpoint is not a valid URL: {url}.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Raw value that failed to parse.
		url: String,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Reject scope separators that are empty or contain control characters.
	#[error("Scope separator must be non-empty and printable.")]
	InvalidScopeSeparator {
		/// Invalid separator that was supplied.
		separator: String,
	},
	/// Default scopes failed validation.
	#[error("Default scopes are invalid.")]
	InvalidDefaultScopes(#[from] crate::auth::ScopeValidationError),
	/// Tenant or directory segment cannot be placed in an endpoint path.
	#[error("Tenant `{tenant}` is not a valid endpoint path segment.")]
	InvalidTenant {
		/// Rejected tenant value.
		tenant: String,
	},
	/// PKCE-only public clients must have PKCE enabled.
	#[error("The none_with_pkce client authentication method requires the `pkce_required` quirk.")]
	PublicClientWithoutPkce,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Authorization endpoint users are redirected to.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for the code exchange.
	pub token_endpoint: Option<Url>,
	/// Optional userinfo endpoint.
	pub userinfo_endpoint: Option<Url>,
	/// Separator placed between scopes.
	pub scope_separator: String,
	/// Scopes requested when the config does not override them.
	pub default_scopes: ScopeList,
	/// Preferred client authentication method for the token endpoint.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			authorization_endpoint: None,
			token_endpoint: None,
			userinfo_endpoint: None,
			scope_separator: " ".into(),
			default_scopes: ScopeList::default(),
			preferred_client_auth_method: ClientAuthMethod::default(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the userinfo endpoint.
	pub fn userinfo_endpoint(mut self, url: Url) -> Self {
		self.userinfo_endpoint = Some(url);

		self
	}

	/// Overrides the scope separator (defaults to a single space).
	pub fn scope_separator(mut self, separator: impl Into<String>) -> Self {
		self.scope_separator = separator.into();

		self
	}

	/// Sets the scopes requested when the config leaves them unset.
	pub fn default_scopes(mut self, scopes: ScopeList) -> Self {
		self.default_scopes = scopes;

		self
	}

	/// Overrides the preferred client authentication method.
	pub fn preferred_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.preferred_client_auth_method = method;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let endpoints =
			ProviderEndpoints { authorization, token, userinfo: self.userinfo_endpoint };
		let descriptor = ProviderDescriptor {
			id: self.id,
			endpoints,
			scope_separator: self.scope_separator,
			default_scopes: self.default_scopes,
			preferred_client_auth_method: self.preferred_client_auth_method,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	pub(crate) fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;

		if let Some(userinfo) = self.endpoints.userinfo.as_ref() {
			validate_endpoint("userinfo", userinfo)?;
		}

		validate_scope_separator(&self.scope_separator)?;

		if matches!(self.preferred_client_auth_method, ClientAuthMethod::NoneWithPkce)
			&& !self.quirks.pkce_required
		{
			return Err(ProviderDescriptorError::PublicClientWithoutPkce);
		}

		Ok(())
	}
}

/// Parses a static endpoint string, reporting which endpoint was malformed.
pub fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw)
		.map_err(|_| ProviderDescriptorError::InvalidEndpoint { endpoint, url: raw.to_owned() })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_scope_separator(separator: &str) -> Result<(), ProviderDescriptorError> {
	if separator.is_empty() || separator.chars().any(char::is_control) {
		Err(ProviderDescriptorError::InvalidScopeSeparator { separator: separator.to_owned() })
	} else {
		Ok(())
	}
}
