//! GitHub OAuth app sign-in.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::SchemaError,
	profile::{self, Profile},
	provider::{ProviderDescriptor, ProviderDescriptorError, parse_endpoint},
};

/// Provider identifier.
pub const ID: &str = "github";
/// Authorization endpoint.
pub const AUTHORIZATION_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
/// Token endpoint.
pub const TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";
/// Authenticated-user endpoint.
pub const USERINFO_ENDPOINT: &str = "https://api.github.com/user";
/// Scopes requested by default.
pub const DEFAULT_SCOPES: &[&str] = &["read:user", "user:email"];

/// GitHub descriptor.
pub fn descriptor() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	super::builtin_descriptor(
		ID,
		AUTHORIZATION_ENDPOINT,
		TOKEN_ENDPOINT,
		parse_endpoint("userinfo", USERINFO_ENDPOINT)?,
		DEFAULT_SCOPES,
		" ",
	)
}

#[derive(Deserialize)]
struct GitHubUser {
	id: u64,
	login: String,
	name: Option<String>,
	email: Option<String>,
	avatar_url: Option<String>,
}

/// Maps GitHub's `/user` payload into a [`Profile`].
///
/// The numeric id becomes the user id; the display name falls back to `login`. `email` is only
/// present when the user made it public.
pub fn normalize(raw: JsonValue) -> Result<Profile, SchemaError> {
	let user: GitHubUser = profile::parse_schema(&raw)?;
	let id = profile::user_id(user.id.to_string())?;
	let display_name = user.name.filter(|name| !name.trim().is_empty()).unwrap_or(user.login);

	Ok(Profile::new(ProviderId::from_static(ID), id, raw)
		.with_display_name(Some(display_name))
		.with_email(user.email)
		.with_photo(user.avatar_url))
}
