//! Microsoft identity platform (v2.0 endpoints) sign-in.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::SchemaError,
	profile::{self, Profile},
	provider::{ProviderDescriptor, ProviderDescriptorError, parse_endpoint},
};

/// Provider identifier.
pub const ID: &str = "microsoft";
/// OpenID Connect userinfo endpoint served by Microsoft Graph.
pub const USERINFO_ENDPOINT: &str = "https://graph.microsoft.com/oidc/userinfo";
/// Scopes requested by default.
pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email"];

const LOGIN_HOST: &str = "https://login.microsoftonline.com";

/// Audience segment of the endpoint paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenant {
	/// Work, school, and personal accounts.
	#[default]
	Common,
	/// Work and school accounts only.
	Organizations,
	/// Personal accounts only.
	Consumers,
	/// A single directory, by tenant id or domain.
	Id(String),
}
impl Tenant {
	/// Path segment for the tenant.
	pub fn as_str(&self) -> &str {
		match self {
			Tenant::Common => "common",
			Tenant::Organizations => "organizations",
			Tenant::Consumers => "consumers",
			Tenant::Id(id) => id,
		}
	}
}

/// Microsoft descriptor for `tenant`.
///
/// Tenant ids must be GUIDs or domain names; anything else is rejected instead of being spliced
/// into the endpoint path.
pub fn descriptor(tenant: Tenant) -> Result<ProviderDescriptor, ProviderDescriptorError> {
	if let Tenant::Id(id) = &tenant
		&& !is_path_segment(id)
	{
		return Err(ProviderDescriptorError::InvalidTenant { tenant: id.to_owned() });
	}

	let base = format!("{LOGIN_HOST}/{}/oauth2/v2.0", tenant.as_str());
	let authorization = format!("{base}/authorize");
	let token = format!("{base}/token");

	super::builtin_descriptor(
		ID,
		&authorization,
		&token,
		parse_endpoint("userinfo", USERINFO_ENDPOINT)?,
		DEFAULT_SCOPES,
		" ",
	)
}

fn is_path_segment(id: &str) -> bool {
	!id.is_empty()
		&& id != "."
		&& id != ".."
		&& id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

#[derive(Deserialize)]
struct MicrosoftUserInfo {
	sub: String,
	name: Option<String>,
	given_name: Option<String>,
	family_name: Option<String>,
	email: Option<String>,
}

/// Maps the OpenID Connect userinfo payload into a [`Profile`].
pub fn normalize(raw: JsonValue) -> Result<Profile, SchemaError> {
	let info: MicrosoftUserInfo = profile::parse_schema(&raw)?;
	let id = profile::user_id(&info.sub)?;

	Ok(Profile::new(ProviderId::from_static(ID), id, raw)
		.with_display_name(info.name)
		.with_name(info.given_name, None, info.family_name)
		.with_email(info.email))
}
