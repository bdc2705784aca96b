//! Discord OAuth2 sign-in.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::SchemaError,
	profile::{self, Profile},
	provider::{ProviderDescriptor, ProviderDescriptorError, parse_endpoint},
};

/// Provider identifier.
pub const ID: &str = "discord";
/// Authorization endpoint.
pub const AUTHORIZATION_ENDPOINT: &str = "https://discord.com/api/oauth2/authorize";
/// Token endpoint.
pub const TOKEN_ENDPOINT: &str = "https://discord.com/api/oauth2/token";
/// Current-user endpoint.
pub const USERINFO_ENDPOINT: &str = "https://discord.com/api/users/@me";
/// Scopes requested by default.
pub const DEFAULT_SCOPES: &[&str] = &["identify", "email"];

const AVATAR_CDN: &str = "https://cdn.discordapp.com/avatars";

/// Discord descriptor.
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
struct DiscordUser {
	id: String,
	username: String,
	global_name: Option<String>,
	email: Option<String>,
	avatar: Option<String>,
}

/// Maps Discord's `/users/@me` payload into a [`Profile`].
///
/// The display name prefers `global_name` over `username`; the avatar hash becomes a CDN URL.
pub fn normalize(raw: JsonValue) -> Result<Profile, SchemaError> {
	let user: DiscordUser = profile::parse_schema(&raw)?;
	let id = profile::user_id(&user.id)?;
	let photo = user.avatar.map(|hash| format!("{AVATAR_CDN}/{}/{hash}.png", user.id));
	let display_name =
		user.global_name.filter(|name| !name.trim().is_empty()).unwrap_or(user.username);

	Ok(Profile::new(ProviderId::from_static(ID), id, raw)
		.with_display_name(Some(display_name))
		.with_email(user.email)
		.with_photo(photo))
}

/// Discord's `prompt` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
	/// Skip the consent screen when the user already authorized the application.
	None,
	/// Always show the consent screen.
	Consent,
}
impl Prompt {
	/// Wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Prompt::None => "none",
			Prompt::Consent => "consent",
		}
	}
}

/// Typed Discord authorization parameters; only set values are sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationOptions {
	/// `prompt`.
	pub prompt: Option<Prompt>,
}
impl AuthorizationOptions {
	/// Renders the set options as authorization parameters.
	pub fn params(&self) -> Vec<(&'static str, String)> {
		self.prompt.map(|prompt| ("prompt", prompt.as_str().to_owned())).into_iter().collect()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn avatar_hash_becomes_cdn_url() {
		let profile = normalize(json!({
			"id": "80351110224678912",
			"username": "nelly",
			"global_name": "Nelly",
			"email": "nelly@discord.com",
			"avatar": "8342729096ea3675442027381ff50dfe",
			"verified": true
		}))
		.expect("Discord fixture should normalize.");

		assert_eq!(profile.display_name.as_deref(), Some("Nelly"));
		assert_eq!(
			profile.photos[0].value,
			"https://cdn.discordapp.com/avatars/80351110224678912/8342729096ea3675442027381ff50dfe.png"
		);
		assert_eq!(profile.primary_email(), Some("nelly@discord.com"));
	}

	#[test]
	fn username_backs_missing_global_name() {
		let profile = normalize(json!({ "id": "1", "username": "nelly", "avatar": null }))
			.expect("Minimal Discord fixture should normalize.");

		assert_eq!(profile.display_name.as_deref(), Some("nelly"));
		assert!(profile.photos.is_empty());
		assert_eq!(AuthorizationOptions { prompt: Some(Prompt::None) }.params(), [(
			"prompt",
			"none".to_owned()
		)]);
	}
}
