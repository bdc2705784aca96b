//! Canonical identity profile and the per-provider normalization seam.
//!
//! Providers describe users with unrelated JSON shapes (`sub` vs `id`, nested picture objects,
//! numeric identifiers). Each provider contributes one [`ProfileNormalizer`], usually a plain
//! function, that validates its payload against a typed schema and maps it into [`Profile`].

pub(crate) mod fetch;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ProviderUserId},
	error::SchemaError,
};

/// Maps a provider's raw userinfo payload into a [`Profile`].
///
/// Implementations must be pure: the same payload always yields the same profile, and no I/O
/// happens inside. Any `Fn(JsonValue) -> Result<Profile, SchemaError>` qualifies.
pub trait ProfileNormalizer
where
	Self: Send + Sync,
{
	/// Validates and maps the payload.
	fn normalize(&self, raw: JsonValue) -> Result<Profile, SchemaError>;
}
impl<F> ProfileNormalizer for F
where
	F: Send + Sync + Fn(JsonValue) -> Result<Profile, SchemaError>,
{
	fn normalize(&self, raw: JsonValue) -> Result<Profile, SchemaError> {
		self(raw)
	}
}

/// Single `{ value }` entry used for e-mail addresses and photo URLs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileValue {
	/// Entry payload.
	pub value: String,
}
impl ProfileValue {
	/// Wraps a value.
	pub fn new(value: impl Into<String>) -> Self {
		Self { value: value.into() }
	}
}

/// Structured personal name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileName {
	/// Given (first) name.
	pub given_name: Option<String>,
	/// Middle name, for providers that expose one.
	pub middle_name: Option<String>,
	/// Family (last) name.
	pub family_name: Option<String>,
}

/// Normalized identity returned once a callback completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	/// Provider that vouched for the identity.
	pub provider: ProviderId,
	/// Provider-scoped stable user identifier; never empty.
	pub provider_user_id: ProviderUserId,
	/// Human-readable name.
	pub display_name: Option<String>,
	/// Structured name parts.
	pub name: ProfileName,
	/// E-mail addresses in provider order.
	pub emails: Vec<ProfileValue>,
	/// Photo URLs in provider order.
	pub photos: Vec<ProfileValue>,
	/// Provider payload exactly as received, kept for auditing.
	pub raw: JsonValue,
}
impl Profile {
	/// Creates a profile with only the mandatory fields populated.
	pub fn new(provider: ProviderId, provider_user_id: ProviderUserId, raw: JsonValue) -> Self {
		Self {
			provider,
			provider_user_id,
			display_name: None,
			name: ProfileName::default(),
			emails: Vec::new(),
			photos: Vec::new(),
			raw,
		}
	}

	/// Sets the display name, ignoring empty values.
	pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
		self.display_name = non_empty(display_name);

		self
	}

	/// Sets the structured name, ignoring empty parts.
	pub fn with_name(
		mut self,
		given_name: Option<String>,
		middle_name: Option<String>,
		family_name: Option<String>,
	) -> Self {
		self.name = ProfileName {
			given_name: non_empty(given_name),
			middle_name: non_empty(middle_name),
			family_name: non_empty(family_name),
		};

		self
	}

	/// Appends an e-mail address when present.
	pub fn with_email(mut self, email: Option<String>) -> Self {
		if let Some(email) = non_empty(email) {
			self.emails.push(ProfileValue::new(email));
		}

		self
	}

	/// Appends a photo URL when present.
	pub fn with_photo(mut self, photo: Option<String>) -> Self {
		if let Some(photo) = non_empty(photo) {
			self.photos.push(ProfileValue::new(photo));
		}

		self
	}

	/// First e-mail address, if any.
	pub fn primary_email(&self) -> Option<&str> {
		self.emails.first().map(|entry| entry.value.as_str())
	}
}

/// Deserializes a payload into a provider schema, keeping the failing field path.
pub fn parse_schema<T>(raw: &JsonValue) -> Result<T, SchemaError>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(raw).map_err(SchemaError::from)
}

/// Validates a provider-issued user identifier.
pub fn user_id(value: impl AsRef<str>) -> Result<ProviderUserId, SchemaError> {
	ProviderUserId::new(value).map_err(|_| SchemaError::MissingUserId)
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|inner| !inner.trim().is_empty())
}
