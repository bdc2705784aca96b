//! Facebook Login through the Graph API.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::SchemaError,
	profile::{self, Profile},
	provider::{ProviderDescriptor, ProviderDescriptorError, parse_endpoint},
};

/// Provider identifier.
pub const ID: &str = "facebook";
/// Graph API version pinned by the endpoints below.
pub const GRAPH_API_VERSION: &str = "v14.0";
/// Authorization endpoint.
pub const AUTHORIZATION_ENDPOINT: &str = "https://facebook.com/v14.0/dialog/oauth";
/// Token endpoint.
pub const TOKEN_ENDPOINT: &str = "https://graph.facebook.com/v14.0/oauth/access_token";
/// Userinfo endpoint, before the `fields` query is appended.
pub const USERINFO_ENDPOINT: &str = "https://graph.facebook.com/v14.0/me";
/// Scopes requested by default.
pub const DEFAULT_SCOPES: &[&str] = &["public_profile", "email"];
/// Profile fields always requested from `/me`.
pub const BASE_PROFILE_FIELDS: &[&str] =
	&["id", "email", "name", "first_name", "middle_name", "last_name"];

/// Facebook descriptor requesting the base profile fields.
pub fn descriptor() -> Result<ProviderDescriptor, ProviderDescriptorError> {
	descriptor_with_fields::<&str>(&[])
}

/// Facebook descriptor requesting `extra_fields` on top of the base fields.
///
/// Fields keep their order and repeats are dropped. Add `picture` to populate profile photos.
pub fn descriptor_with_fields<S>(
	extra_fields: &[S],
) -> Result<ProviderDescriptor, ProviderDescriptorError>
where
	S: AsRef<str>,
{
	let mut userinfo = parse_endpoint("userinfo", USERINFO_ENDPOINT)?;

	userinfo.query_pairs_mut().append_pair("fields", &profile_fields(extra_fields).join(","));

	super::builtin_descriptor(
		ID,
		AUTHORIZATION_ENDPOINT,
		TOKEN_ENDPOINT,
		userinfo,
		DEFAULT_SCOPES,
		",",
	)
}

fn profile_fields<S>(extra_fields: &[S]) -> Vec<&str>
where
	S: AsRef<str>,
{
	let mut fields = BASE_PROFILE_FIELDS.to_vec();

	for field in extra_fields.iter().map(|field| field.as_ref().trim()) {
		if !field.is_empty() && !fields.contains(&field) {
			fields.push(field);
		}
	}

	fields
}

#[derive(Deserialize)]
struct FacebookUser {
	id: String,
	name: Option<String>,
	first_name: Option<String>,
	middle_name: Option<String>,
	last_name: Option<String>,
	email: Option<String>,
	picture: Option<FacebookPicture>,
}

#[derive(Deserialize)]
struct FacebookPicture {
	data: FacebookPictureData,
}

#[derive(Deserialize)]
struct FacebookPictureData {
	url: Option<String>,
}

/// Maps Facebook's `/me` payload into a [`Profile`].
pub fn normalize(raw: JsonValue) -> Result<Profile, SchemaError> {
	let user: FacebookUser = profile::parse_schema(&raw)?;
	let id = profile::user_id(&user.id)?;

	Ok(Profile::new(ProviderId::from_static(ID), id, raw)
		.with_display_name(user.name)
		.with_name(user.first_name, user.middle_name, user.last_name)
		.with_email(user.email)
		.with_photo(user.picture.and_then(|picture| picture.data.url)))
}
