//! Google (OpenID Connect) sign-in.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::SchemaError,
	profile::{self, Profile},
	provider::{ProviderDescriptor, ProviderDescriptorError, parse_endpoint},
};

/// Provider identifier.
pub const ID: &str = "google";
/// Authorization endpoint.
pub const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Token endpoint.
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
/// OpenID Connect userinfo endpoint.
pub const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
/// Scopes requested by default.
pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email"];

/// Google descriptor.
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
struct GoogleUserInfo {
	sub: String,
	name: Option<String>,
	given_name: Option<String>,
	family_name: Option<String>,
	email: Option<String>,
	picture: Option<String>,
}

/// Maps Google's userinfo payload into a [`Profile`].
pub fn normalize(raw: JsonValue) -> Result<Profile, SchemaError> {
	let info: GoogleUserInfo = profile::parse_schema(&raw)?;
	let id = profile::user_id(&info.sub)?;

	Ok(Profile::new(ProviderId::from_static(ID), id, raw)
		.with_display_name(info.name)
		.with_name(info.given_name, None, info.family_name)
		.with_email(info.email)
		.with_photo(info.picture))
}

/// Whether Google should issue a refresh token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
	/// Access only while the user is present.
	Online,
	/// Also issue a refresh token.
	Offline,
}
impl AccessType {
	/// Wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			AccessType::Online => "online",
			AccessType::Offline => "offline",
		}
	}
}

/// Google's `prompt` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
	/// Never show a screen; fail if interaction is required.
	None,
	/// Always ask for consent.
	Consent,
	/// Always show the account chooser.
	SelectAccount,
}
impl Prompt {
	/// Wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Prompt::None => "none",
			Prompt::Consent => "consent",
			Prompt::SelectAccount => "select_account",
		}
	}
}

/// Typed Google authorization parameters; only set values are sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationOptions {
	/// `access_type`.
	pub access_type: Option<AccessType>,
	/// `include_granted_scopes`.
	pub include_granted_scopes: Option<bool>,
	/// `prompt`.
	pub prompt: Option<Prompt>,
}
impl AuthorizationOptions {
	/// Renders the set options as authorization parameters.
	pub fn params(&self) -> Vec<(&'static str, String)> {
		let mut params = Vec::new();

		if let Some(access_type) = self.access_type {
			params.push(("access_type", access_type.as_str().to_owned()));
		}
		if let Some(include) = self.include_granted_scopes {
			params.push(("include_granted_scopes", include.to_string()));
		}
		if let Some(prompt) = self.prompt {
			params.push(("prompt", prompt.as_str().to_owned()));
		}

		params
	}
}
