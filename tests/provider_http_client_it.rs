// std
use std::collections::VecDeque;
// self
use oauth2_identity::{
	_preludet::*,
	auth::{ProviderId, Secret, SessionId},
	config::StrategyConfig,
	error::{Endpoint, ProfileFetchError, StateError, TokenExchangeError},
	flows::{RequestContext, Strategy},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		TransportErrorMapper, map_generic_client_error,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http},
	},
	provider::{ProviderDescriptor, builtin::github},
	session::{MemorySessionStore, SessionStore},
};

#[derive(Debug)]
enum FakeTransportError {
	Reset,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Reset => write!(f, "Connection reset by fake transport."),
		}
	}
}
impl StdError for FakeTransportError {}

enum Scripted {
	Respond(u16, &'static str),
	FailAfterStatus(u16),
}

#[derive(Clone, Default)]
struct FakeHttpClient {
	script: Arc<Mutex<VecDeque<Scripted>>>,
	requests: Arc<Mutex<Vec<HttpRequest>>>,
}
impl FakeHttpClient {
	fn push(&self, step: Scripted) {
		self.script.lock().push_back(step);
	}

	fn requests(&self) -> usize {
		self.requests.lock().len()
	}
}
impl ProviderHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, client: self.clone() }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	client: FakeHttpClient,
}
impl<'c> AsyncHttpClient<'c> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let step = self.client.script.lock().pop_front();

		self.client.requests.lock().push(request);

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			match step {
				Some(Scripted::Respond(status, body)) => {
					slot.store(ResponseMetadata { status: Some(status) });

					http::Response::builder()
						.status(status)
						.header("content-type", "application/json")
						.body(body.as_bytes().to_vec())
						.map_err(HttpClientError::Http)
				},
				Some(Scripted::FailAfterStatus(status)) => {
					slot.store(ResponseMetadata { status: Some(status) });

					Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Reset)))
				},
				None => Err(HttpClientError::Other("unscripted request".into())),
			}
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	seen: Arc<Mutex<Vec<(Endpoint, Option<u16>)>>>,
}
impl RecordingTransportErrorMapper {
	fn recorded(&self) -> Vec<(Endpoint, Option<u16>)> {
		self.seen.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		self.seen.lock().push((endpoint, meta.and_then(|value| value.status)));

		map_generic_client_error(endpoint, err)
	}
}

type FakeStrategy = Strategy<FakeHttpClient, RecordingTransportErrorMapper>;

type FakeFixture =
	(FakeStrategy, FakeHttpClient, RecordingTransportErrorMapper, Arc<MemorySessionStore>);

fn build_strategy() -> FakeFixture {
	let descriptor = ProviderDescriptor::builder(
		ProviderId::new("fake").expect("Provider identifier should be valid for fake transport."),
	)
	.authorization_endpoint(
		Url::parse("https://idp.example.com/authorize").expect("Endpoint should parse."),
	)
	.token_endpoint(Url::parse("https://idp.example.com/token").expect("Endpoint should parse."))
	.userinfo_endpoint(Url::parse("https://api.example.com/user").expect("Endpoint should parse."))
	.build()
	.expect("Fake descriptor should build successfully.");
	let config = StrategyConfig::new(
		"client-fake",
		Secret::new("secret-fake"),
		Url::parse("https://app.example.com/callback").expect("Redirect URI should parse."),
	);
	let http_client = FakeHttpClient::default();
	let mapper = RecordingTransportErrorMapper::default();
	let session_backend = Arc::new(MemorySessionStore::default());
	let sessions: Arc<dyn SessionStore> = session_backend.clone();
	let strategy = Strategy::with_http_client(
		sessions,
		descriptor,
		Arc::new(github::normalize),
		config,
		http_client.clone(),
		mapper.clone(),
	);

	(strategy, http_client, mapper, session_backend)
}

fn session(value: &str) -> SessionId {
	SessionId::new(value).expect("Session identifier should be valid for fake transport.")
}

#[tokio::test]
async fn forged_callbacks_never_reach_the_transport() {
	let (strategy, http_client, _, sessions) = build_strategy();
	let redirect = strategy.initiate(session("browser")).await.expect("Initiate should succeed.");
	let state = redirect
		.location
		.query_pairs()
		.find(|(name, _)| name == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Authorization URL should carry a state parameter.");
	let err = strategy
		.complete_callback(
			RequestContext::new(session("browser"))
				.with_query_param("code", "forged")
				.with_query_param("state", "attacker-chosen"),
		)
		.await
		.expect_err("Forged state must be rejected.");

	assert!(matches!(err, Error::State(StateError::Mismatch)));

	let err = strategy
		.complete_callback(
			RequestContext::new(session("browser")).with_query_param("state", state.clone()),
		)
		.await
		.expect_err("Callbacks without a code must be rejected.");

	assert!(matches!(err, Error::MissingCode));

	let err = strategy
		.complete_callback(
			RequestContext::new(session("other-browser"))
				.with_query_param("code", "c")
				.with_query_param("state", state.clone()),
		)
		.await
		.expect_err("State from another session must be rejected.");

	assert!(matches!(err, Error::State(StateError::Mismatch)));
	assert_eq!(http_client.requests(), 0);
	assert_eq!(sessions.len(), 1, "Rejected callbacks leave the genuine attempt pending.");

	http_client.push(Scripted::Respond(
		200,
		"{\"access_token\":\"fake-access\",\"token_type\":\"bearer\"}",
	));
	http_client.push(Scripted::Respond(200, "{\"id\":42,\"login\":\"octo\",\"email\":null}"));

	let identity = strategy
		.complete_callback(
			RequestContext::new(session("browser"))
				.with_query_param("code", "real")
				.with_query_param("state", state),
		)
		.await
		.expect("The genuine callback should still complete.");

	assert_eq!(identity.profile.provider_user_id.as_ref(), "42");
	assert_eq!(identity.profile.display_name.as_deref(), Some("octo"));
	assert_eq!(identity.profile.provider.as_ref(), "fake");

	let requests = http_client.requests.lock();

	assert_eq!(requests.len(), 2);
	assert_eq!(requests[0].method(), http::Method::POST);
	assert_eq!(requests[0].uri(), "https://idp.example.com/token");
	assert!(String::from_utf8_lossy(requests[0].body()).contains("code=real"));
	assert_eq!(requests[1].method(), http::Method::GET);
	assert_eq!(requests[1].uri(), "https://api.example.com/user");
	assert_eq!(
		requests[1].headers().get(http::header::AUTHORIZATION).map(|value| value.as_bytes()),
		Some(b"Bearer fake-access".as_slice())
	);
	assert!(requests[1].headers().contains_key(http::header::USER_AGENT));
}

#[tokio::test]
async fn transport_failures_reach_the_mapper_with_their_endpoint() {
	let (strategy, http_client, mapper, _) = build_strategy();

	http_client.push(Scripted::FailAfterStatus(502));

	let err = strategy.exchange_code("code", None).await.expect_err("Token transport fails.");

	assert!(matches!(err, Error::TokenExchange(TokenExchangeError::Transport(_))));

	http_client.push(Scripted::FailAfterStatus(503));

	let err = strategy.fetch_profile("access").await.expect_err("Userinfo transport fails.");

	assert!(matches!(err, Error::ProfileFetch(ProfileFetchError::Transport(_))));
	assert_eq!(mapper.recorded(), vec![
		(Endpoint::Token, Some(502)),
		(Endpoint::UserInfo, Some(503))
	]);
}

#[tokio::test]
async fn oauth_errors_under_success_status_are_rejections() {
	let (strategy, http_client, mapper, _) = build_strategy();

	http_client.push(Scripted::Respond(
		200,
		"{\"error\":\"bad_verification_code\",\"error_description\":\"The code passed is incorrect or expired.\"}",
	));

	let err = strategy.exchange_code("stale", None).await.expect_err("Error payloads must fail.");

	match err {
		Error::TokenExchange(TokenExchangeError::Status { status, body }) => {
			assert_eq!(status, 200);
			assert!(body.contains("bad_verification_code"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(mapper.recorded().is_empty(), "Provider rejections are not transport failures.");
}
