//! Walks through starting a Google sign-in and rejecting a forged callback before any token
//! request leaves the process.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_identity::{
	auth::{Secret, SessionId},
	config::StrategyConfig,
	error::Error,
	flows::{RequestContext, Strategy},
	provider::{
		ProviderRegistry,
		builtin::google::{AccessType, AuthorizationOptions, Prompt},
	},
	session::{MemorySessionStore, SessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let registry = ProviderRegistry::builtin()?;
	let google = registry.get("google").ok_or_else(|| color_eyre::eyre::eyre!("Missing Google."))?;
	let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::default());
	let options = AuthorizationOptions {
		access_type: Some(AccessType::Offline),
		prompt: Some(Prompt::Consent),
		..Default::default()
	};
	let config = StrategyConfig::new(
		"demo-client.apps.googleusercontent.com",
		Secret::new("demo-secret"),
		Url::parse("https://app.example.com/auth/google/callback")?,
	)
	.with_extra_params(options.params())?
	.with_pkce(true);
	let strategy = Strategy::new(
		sessions,
		google.descriptor.clone(),
		google.normalizer.clone(),
		config,
	);
	let session_id = SessionId::new("browser-session-1")?;
	let redirect = strategy.initiate(session_id.clone()).await?;

	println!("Respond with HTTP {} to {}.", redirect.status(), redirect.location);
	println!("Pending attempt stored under {}.", redirect.session_key);

	// Simulate an attacker replaying the callback URL with their own state.
	let forged = Url::parse(
		"https://app.example.com/auth/google/callback?code=stolen&state=attacker-chosen",
	)?;

	match strategy.complete_callback(RequestContext::from_callback_url(session_id, &forged)).await
	{
		Err(Error::State(err)) => println!("Forged callback rejected: {err}"),
		other => eprintln!("Unexpected outcome: {other:?}."),
	}

	println!("Route the genuine redirect to Strategy::complete_callback to finish the sign-in.");

	Ok(())
}
