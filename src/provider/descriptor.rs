//! Provider descriptor data structures shared by every flow.
//!
//! A descriptor is the static, validated description of one identity provider: where its
//! endpoints live, which scopes it requests by default, how those scopes are joined, and how
//! the client authenticates at the token endpoint.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ScopeList},
};

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	#[default]
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// Public clients that prove possession via PKCE.
	NoneWithPkce,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint users are redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// Userinfo endpoint, including any provider-required query (e.g. field lists).
	pub userinfo: Option<Url>,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProviderDescriptor")]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// String placed between scopes in the `scope` parameter.
	pub scope_separator: String,
	/// Scopes requested when the strategy config does not override them.
	pub default_scopes: ScopeList,
	/// Preferred client authentication mechanism.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Joins the provided scopes (or the defaults) with this provider's separator.
	pub fn format_scope(&self, scopes: Option<&ScopeList>) -> String {
		scopes.unwrap_or(&self.default_scopes).join(&self.scope_separator)
	}
}

// Deserialization goes through the same validation as the builder.
#[derive(Deserialize)]
struct RawProviderDescriptor {
	id: ProviderId,
	endpoints: ProviderEndpoints,
	#[serde(default = "default_scope_separator")]
	scope_separator: String,
	#[serde(default)]
	default_scopes: ScopeList,
	#[serde(default)]
	preferred_client_auth_method: ClientAuthMethod,
	#[serde(default)]
	quirks: ProviderQuirks,
}
impl TryFrom<RawProviderDescriptor> for ProviderDescriptor {
	type Error = ProviderDescriptorError;

	fn try_from(raw: RawProviderDescriptor) -> Result<Self, Self::Error> {
		let descriptor = Self {
			id: raw.id,
			endpoints: raw.endpoints,
			scope_separator: raw.scope_separator,
			default_scopes: raw.default_scopes,
			preferred_client_auth_method: raw.preferred_client_auth_method,
			quirks: raw.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

fn default_scope_separator() -> String {
	" ".into()
}
