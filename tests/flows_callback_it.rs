#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_identity::{
	_preludet::*,
	auth::{ProviderId, ScopeList, Secret, SessionId},
	config::StrategyConfig,
	error::{
		ConfigError, MalformedResponseError, ProfileFetchError, SchemaError, StateError,
		TokenExchangeError,
	},
	flows::{RedirectInstruction, RequestContext, StateManager},
	provider::{ProviderDescriptor, builtin::google},
	session::SessionStore,
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id = ProviderId::new("mock-http")
		.expect("Provider identifier should be valid for callback tests.");

	ProviderDescriptor::builder(provider_id)
		.authorization_endpoint(
			Url::parse(&server.url("/authorize"))
				.expect("Mock authorization endpoint should parse successfully."),
		)
		.token_endpoint(
			Url::parse(&server.url("/token")).expect("Mock token endpoint should parse successfully."),
		)
		.userinfo_endpoint(
			Url::parse(&server.url("/userinfo"))
				.expect("Mock userinfo endpoint should parse successfully."),
		)
		.default_scopes(
			ScopeList::new(["openid", "profile", "email"])
				.expect("Default scopes should be valid for callback tests."),
		)
		.build()
		.expect("Provider descriptor should build successfully.")
}

fn build_config() -> StrategyConfig {
	StrategyConfig::new(
		CLIENT_ID,
		Secret::new(CLIENT_SECRET),
		Url::parse("https://app.example.com/auth/callback")
			.expect("Redirect URI should parse successfully."),
	)
}

fn session(value: &str) -> SessionId {
	SessionId::new(value).expect("Session identifier should be valid for callback tests.")
}

fn state_of(redirect: &RedirectInstruction) -> String {
	redirect
		.location
		.query_pairs()
		.find(|(name, _)| name == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Authorization URL should carry a state parameter.")
}

fn callback(session_id: &str, query: &[(&str, &str)]) -> RequestContext {
	query.iter().fold(RequestContext::new(session(session_id)), |ctx, (name, value)| {
		ctx.with_query_param(*name, *value)
	})
}

fn google_fixture() -> JsonValue {
	json!({
		"sub": "42",
		"name": "A B",
		"given_name": "A",
		"family_name": "B",
		"email": "a@b.com",
		"picture": "http://x"
	})
}

#[tokio::test]
async fn initiate_then_callback_reaches_complete() {
	let server = MockServer::start_async().await;
	let (strategy, sessions) = build_reqwest_test_strategy(
		build_descriptor(&server),
		Arc::new(google::normalize),
		build_config(),
	);
	let redirect = strategy
		.initiate(session("browser-1"))
		.await
		.expect("Initiate should store state and build the redirect.");

	assert_eq!(redirect.status(), 302);
	assert_eq!(redirect.location.path(), "/authorize");
	assert_eq!(sessions.len(), 1);

	let pairs: HashMap<_, _> = redirect.location.query_pairs().into_owned().collect();

	assert_eq!(pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(pairs.get("client_id"), Some(&CLIENT_ID.into()));
	assert_eq!(pairs.get("scope"), Some(&"openid profile email".into()));
	assert!(!pairs.contains_key("code_challenge"));

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "good-code")
				.form_urlencoded_tuple("client_secret", CLIENT_SECRET);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-1\",\"token_type\":\"Bearer\",\"expires_in\":3600,\"id_token\":\"id-1\"}",
			);
		})
		.await;
	let userinfo_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/userinfo")
				.header("authorization", "Bearer access-1")
				.header("accept", "application/json")
				.header_exists("user-agent");
			then.status(200).header("content-type", "application/json").json_body(google_fixture());
		})
		.await;
	let state = state_of(&redirect);
	let identity = strategy
		.complete_callback(callback("browser-1", &[("code", "good-code"), ("state", &state)]))
		.await
		.expect("Callback with matching state should complete.");

	token_mock.assert_async().await;
	userinfo_mock.assert_async().await;

	assert_eq!(identity.profile.provider_user_id.as_ref(), "42");
	assert_eq!(identity.profile.provider.as_ref(), "mock-http");
	assert_eq!(identity.profile.primary_email(), Some("a@b.com"));
	assert_eq!(identity.tokens.access_token.expose(), "access-1");
	assert_eq!(identity.tokens.id_token.as_ref().map(|token| token.expose()), Some("id-1"));
	assert!(sessions.is_empty(), "Consumed state must leave the session store.");

	let err = strategy
		.complete_callback(callback("browser-1", &[("code", "good-code"), ("state", &state)]))
		.await
		.expect_err("Replayed callbacks must fail.");

	assert!(matches!(err, Error::State(StateError::Mismatch)));
	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn pkce_verifier_travels_to_the_token_endpoint() {
	let server = MockServer::start_async().await;
	let (strategy, sessions) = build_reqwest_test_strategy(
		build_descriptor(&server),
		Arc::new(google::normalize),
		build_config().with_pkce(true),
	);
	let redirect =
		strategy.initiate(session("browser-pkce")).await.expect("Initiate should succeed.");
	let pairs: HashMap<_, _> = redirect.location.query_pairs().into_owned().collect();

	assert_eq!(pairs.get("code_challenge_method"), Some(&"S256".into()));

	let stored = sessions
		.get(&redirect.session_key)
		.await
		.expect("Session lookup should succeed.")
		.expect("Pending state should be stored.");
	let verifier = stored
		.code_verifier
		.as_ref()
		.expect("PKCE attempts should store a verifier.")
		.expose()
		.to_owned();

	assert_eq!(pairs.get("code_challenge"), stored.code_challenge().as_ref());

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").form_urlencoded_tuple("code_verifier", &verifier);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-pkce\",\"token_type\":\"bearer\"}");
		})
		.await;
	let userinfo_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200).header("content-type", "application/json").json_body(google_fixture());
		})
		.await;
	let state = state_of(&redirect);

	strategy
		.complete_callback(callback("browser-pkce", &[("code", "c"), ("state", &state)]))
		.await
		.expect("PKCE callback should complete.");

	token_mock.assert_async().await;
	userinfo_mock.assert_async().await;
}

#[tokio::test]
async fn token_endpoint_rejections_surface_status_and_body() {
	let server = MockServer::start_async().await;
	let (strategy, sessions) = build_reqwest_test_strategy(
		build_descriptor(&server),
		Arc::new(google::normalize),
		build_config(),
	);
	let redirect = strategy.initiate(session("browser-2")).await.expect("Initiate should succeed.");
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body(
					"{\"error\":\"invalid_grant\",\"error_description\":\"already used\",\"error_hint\":\"restart sign-in\"}",
				);
		})
		.await;
	let userinfo_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200).json_body(google_fixture());
		})
		.await;
	let state = state_of(&redirect);
	let err = strategy
		.complete_callback(callback("browser-2", &[("code", "stale"), ("state", &state)]))
		.await
		.expect_err("Token endpoint rejections should fail the callback.");

	match err {
		Error::TokenExchange(TokenExchangeError::Status { status, body }) => {
			assert_eq!(status, 400);
			assert!(body.contains("invalid_grant"));
			assert!(body.contains("restart sign-in"), "Provider extras must survive verbatim.");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	token_mock.assert_calls_async(1).await;
	userinfo_mock.assert_calls_async(0).await;
	assert!(sessions.is_empty(), "State is consumed before the exchange.");
}

#[tokio::test]
async fn token_payload_without_access_token_is_malformed() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(
		build_descriptor(&server),
		Arc::new(google::normalize),
		build_config(),
	);
	let redirect = strategy.initiate(session("browser-3")).await.expect("Initiate should succeed.");

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token_type\":\"bearer\"}");
		})
		.await;

	let state = state_of(&redirect);
	let err = strategy
		.complete_callback(callback("browser-3", &[("code", "c"), ("state", &state)]))
		.await
		.expect_err("Token payloads without an access token are malformed.");

	assert!(matches!(err, Error::MalformedResponse(MalformedResponseError::Json { .. })));
}

#[tokio::test]
async fn userinfo_failures_are_classified() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(
		build_descriptor(&server),
		Arc::new(google::normalize),
		build_config(),
	);
	let mut userinfo_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(401).body("{\"error\":\"invalid_token\"}");
		})
		.await;
	let err = strategy
		.fetch_profile("revoked")
		.await
		.expect_err("Unauthorized userinfo responses should fail.");

	assert!(matches!(
		err,
		Error::ProfileFetch(ProfileFetchError::Status { status: 401, ref body })
			if body.contains("invalid_token")
	));

	userinfo_mock.delete_async().await;
	userinfo_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200).body("<html>not json</html>");
		})
		.await;

	let err = strategy.fetch_profile("token").await.expect_err("HTML bodies are not JSON.");

	assert!(matches!(err, Error::MalformedResponse(MalformedResponseError::Json { .. })));

	userinfo_mock.delete_async().await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200).json_body(json!({ "sub": "", "email": "a@b.com" }));
		})
		.await;

	let err = strategy.fetch_profile("token").await.expect_err("Empty user ids are rejected.");

	assert!(matches!(
		err,
		Error::MalformedResponse(MalformedResponseError::Schema {
			source: SchemaError::MissingUserId,
			..
		})
	));
}

#[tokio::test]
async fn provider_denials_clear_pending_state() {
	let server = MockServer::start_async().await;
	let (strategy, sessions) = build_reqwest_test_strategy(
		build_descriptor(&server),
		Arc::new(google::normalize),
		build_config(),
	);

	let redirect = strategy.initiate(session("browser-4")).await.expect("Initiate should succeed.");
	let state = state_of(&redirect);
	let err = strategy
		.complete_callback(callback("browser-4", &[
			("error", "access_denied"),
			("error_description", "The user declined."),
			("state", &state),
		]))
		.await
		.expect_err("Provider denials should fail the callback.");

	match err {
		Error::AuthorizationDenied { error, description, uri } => {
			assert_eq!(error, "access_denied");
			assert_eq!(description.as_deref(), Some("The user declined."));
			assert_eq!(uri, None);
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(sessions.is_empty());
}

#[tokio::test]
async fn denials_without_the_pending_state_leave_it_in_place() {
	let server = MockServer::start_async().await;
	let (strategy, sessions) = build_reqwest_test_strategy(
		build_descriptor(&server),
		Arc::new(google::normalize),
		build_config(),
	);
	let redirect = strategy.initiate(session("browser-6")).await.expect("Initiate should succeed.");

	for query in [
		&[("error", "access_denied")][..],
		&[("error", "access_denied"), ("state", "attacker-chosen")][..],
	] {
		let err = strategy
			.complete_callback(callback("browser-6", query))
			.await
			.expect_err("Denials always fail the callback.");

		assert!(matches!(err, Error::AuthorizationDenied { .. }));
		assert_eq!(sessions.len(), 1, "Unverified denials must not cancel the pending login.");
	}

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-6\",\"token_type\":\"bearer\"}");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200).header("content-type", "application/json").json_body(google_fixture());
		})
		.await;

	let state = state_of(&redirect);
	let identity = strategy
		.complete_callback(callback("browser-6", &[("code", "real"), ("state", &state)]))
		.await
		.expect("The genuine callback should still complete.");

	assert_eq!(identity.profile.provider_user_id.as_ref(), "42");
	token_mock.assert_calls_async(1).await;
	assert!(sessions.is_empty());
}

#[tokio::test]
async fn expired_states_fail_and_are_removed() {
	let server = MockServer::start_async().await;
	let (strategy, sessions) = build_reqwest_test_strategy(
		build_descriptor(&server),
		Arc::new(google::normalize),
		build_config(),
	);
	let strategy = strategy.with_state_manager(StateManager::new(Duration::ZERO));
	let redirect = strategy.initiate(session("browser-5")).await.expect("Initiate should succeed.");

	tokio::time::sleep(std::time::Duration::from_millis(20)).await;

	let state = state_of(&redirect);
	let err = strategy
		.complete_callback(callback("browser-5", &[("code", "c"), ("state", &state)]))
		.await
		.expect_err("States older than the TTL must fail.");

	assert!(matches!(err, Error::State(StateError::Expired)));
	assert!(sessions.is_empty(), "Expired states are removed.");
}

#[tokio::test]
async fn descriptors_without_userinfo_cannot_fetch_profiles() {
	let descriptor = ProviderDescriptor::builder(
		ProviderId::new("no-userinfo").expect("Provider identifier should be valid."),
	)
	.authorization_endpoint(
		Url::parse("https://idp.example.com/authorize").expect("Endpoint should parse."),
	)
	.token_endpoint(Url::parse("https://idp.example.com/token").expect("Endpoint should parse."))
	.build()
	.expect("Descriptor without userinfo should still build.");
	let (strategy, _) =
		build_reqwest_test_strategy(descriptor, Arc::new(google::normalize), build_config());
	let err = strategy.fetch_profile("token").await.expect_err("Fetching requires userinfo.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::MissingUserInfoEndpoint { ref descriptor })
			if descriptor == "no-userinfo"
	));
}
