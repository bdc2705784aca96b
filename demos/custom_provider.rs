//! Demonstrates registering a provider that is not built in.
//!
//! 1. Describe the endpoints with [`ProviderDescriptor::builder`].
//! 2. Write a normalizer that validates the userinfo payload with a typed schema.
//! 3. Register both in a [`ProviderRegistry`] and build the authorization URL.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;
// self
use oauth2_identity::{
	auth::{ProviderId, ScopeList, Secret},
	config::StrategyConfig,
	error::SchemaError,
	flows::{StateManager, build_authorization_url},
	profile::{self, Profile, ProfileNormalizer},
	provider::{ProviderDescriptor, ProviderRegistry},
};

#[derive(Deserialize)]
struct GitLabUser {
	id: u64,
	username: String,
	name: Option<String>,
	email: Option<String>,
	avatar_url: Option<String>,
}

fn normalize_gitlab(provider: &ProviderId, raw: Value) -> Result<Profile, SchemaError> {
	let user: GitLabUser = profile::parse_schema(&raw)?;
	let id = profile::user_id(user.id.to_string())?;

	Ok(Profile::new(provider.clone(), id, raw)
		.with_display_name(user.name.or(Some(user.username)))
		.with_email(user.email)
		.with_photo(user.avatar_url))
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let provider = ProviderId::new("gitlab")?;
	let descriptor = ProviderDescriptor::builder(provider.clone())
		.authorization_endpoint(Url::parse("https://gitlab.com/oauth/authorize")?)
		.token_endpoint(Url::parse("https://gitlab.com/oauth/token")?)
		.userinfo_endpoint(Url::parse("https://gitlab.com/api/v4/user")?)
		.default_scopes(ScopeList::new(["read_user"])?)
		.build()?;
	let mut registry = ProviderRegistry::builtin()?;

	registry.register(
		descriptor,
		Arc::new(move |raw: Value| normalize_gitlab(&provider, raw)),
	);

	let gitlab = registry.get("gitlab").ok_or_else(|| color_eyre::eyre::eyre!("Missing GitLab."))?;
	let config = StrategyConfig::new(
		"demo-client",
		Secret::new("demo-secret"),
		Url::parse("https://app.example.com/auth/gitlab/callback")?,
	);
	let state = StateManager::default().create_state(config.redirect_uri.clone(), false);
	let url = build_authorization_url(&gitlab.descriptor, &config, &state);

	println!("Registered providers: {:?}.", registry.ids().collect::<Vec<_>>());
	println!("Send your user to {url}.");

	let sample = json!({
		"id": 1,
		"username": "root",
		"name": "Administrator",
		"email": "admin@example.com",
		"avatar_url": null
	});
	let profile = gitlab.normalizer.normalize(sample)?;

	println!(
		"Normalized {} user {} ({:?}).",
		profile.provider,
		profile.provider_user_id,
		profile.display_name
	);

	Ok(())
}
