//! Code-for-token exchange built on the `oauth2` crate, plus transport error mapping.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret,
	EndpointNotSet, EndpointSet, ExtraTokenFields, HttpClientError, HttpRequest, HttpResponse,
	PkceCodeVerifier, RedirectUrl,
	RequestTokenError, StandardRevocableToken, StandardTokenResponse, TokenResponse as _,
	TokenUrl,
	basic::{
		BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
		BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::TokenResponse,
	config::StrategyConfig,
	error::{ConfigError, Endpoint, MalformedResponseError, TransportError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{ClientAuthMethod, ProviderDescriptor},
};

type IdentityTokenResponse = StandardTokenResponse<IdentityTokenFields, BasicTokenType>;
type IdentityClient = Client<
	BasicErrorResponse,
	IdentityTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;
type IdentityRequestTokenError<E> = RequestTokenError<HttpClientError<E>, BasicErrorResponse>;

/// Maps HTTP transport failures into crate [`Error`] values.
///
/// The same mapper serves both remote endpoints; `endpoint` selects whether the failure lands in
/// [`TokenExchangeError`](crate::error::TokenExchangeError) or
/// [`ProfileFetchError`](crate::error::ProfileFetchError).
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		_meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) if inner.is_builder() =>
				ConfigError::from(*inner).into(),
			HttpClientError::Reqwest(inner) =>
				endpoint.transport_failure(TransportError::from(*inner)),
			other => map_generic_client_error(endpoint, other),
		}
	}
}

/// Maps the transport-agnostic [`HttpClientError`] variants.
///
/// Custom mappers can delegate here after handling their own transport variant.
pub fn map_generic_client_error<E>(endpoint: Endpoint, err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => endpoint.transport_failure(TransportError::Io(inner)),
		HttpClientError::Other(message) =>
			endpoint.transport_failure(TransportError::Other { message }),
		HttpClientError::Reqwest(inner) => endpoint.transport_failure(TransportError::network(*inner)),
		_ => endpoint.transport_failure(TransportError::Other {
			message: "unrecognized HTTP client failure".into(),
		}),
	}
}

/// Token endpoint fields beyond the standard set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdentityTokenFields {
	/// OpenID Connect ID token, when the provider issues one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_token: Option<String>,
	/// Every other provider field.
	#[serde(flatten)]
	pub extra: BTreeMap<String, JsonValue>,
}
impl ExtraTokenFields for IdentityTokenFields {}

/// Authorization code exchange bound to one descriptor and client configuration.
pub(crate) struct CodeExchangeFacade<'a, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: IdentityClient,
	http_client: &'a C,
	error_mapper: &'a M,
}
impl<'a, C, M> CodeExchangeFacade<'a, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		config: &StrategyConfig,
		http_client: &'a C,
		error_mapper: &'a M,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let redirect_url = RedirectUrl::new(config.redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let mut oauth_client: IdentityClient = Client::new(ClientId::new(config.client_id.clone()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		match descriptor.preferred_client_auth_method {
			ClientAuthMethod::ClientSecretBasic => {
				oauth_client = oauth_client
					.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
					.set_auth_type(AuthType::BasicAuth);
			},
			ClientAuthMethod::ClientSecretPost => {
				oauth_client = oauth_client
					.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
					.set_auth_type(AuthType::RequestBody);
			},
			ClientAuthMethod::NoneWithPkce => {
				oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
			},
		}

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	/// Performs the single `authorization_code` POST.
	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
		code_verifier: Option<&str>,
	) -> Result<TokenResponse> {
		let meta = ResponseMetadataSlot::default();
		let capturing = BodyCapturingHandle {
			inner: self.http_client.with_metadata(meta.clone()),
			body: Default::default(),
		};
		let mut request = self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		if let Some(verifier) = code_verifier {
			request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
		}

		let response = request
			.request_async(&capturing)
			.await
			.map_err(|err| {
				map_request_error(meta.take(), capturing.body.lock().take(), err, self.error_mapper)
			})?;

		map_token_response(response, OffsetDateTime::now_utc())
	}
}

// Keeps the raw token endpoint body so rejections can be reported verbatim.
struct BodyCapturingHandle<H> {
	inner: H,
	body: Arc<Mutex<Option<Vec<u8>>>>,
}
impl<'c, H> AsyncHttpClient<'c> for BodyCapturingHandle<H>
where
	H: for<'a> AsyncHttpClient<'a, Future: 'a + Send>,
{
	type Error = <H as AsyncHttpClient<'c>>::Error;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let body = self.body.clone();
		let response = self.inner.call(request);

		Box::pin(async move {
			let response = response.await?;

			*body.lock() = Some(response.body().to_owned());

			Ok(response)
		})
	}
}

fn map_token_response(
	response: IdentityTokenResponse,
	received_at: OffsetDateTime,
) -> Result<TokenResponse> {
	let mut builder = TokenResponse::builder()
		.access_token(response.access_token().secret().to_owned())
		.token_type(response.token_type().as_ref().to_owned())
		.received_at(received_at);

	if let Some(expires_in) = response.expires_in().and_then(|value| Duration::try_from(value).ok())
	{
		builder = builder.expires_in(expires_in);
	}
	if let Some(refresh) = response.refresh_token() {
		builder = builder.refresh_token(refresh.secret().to_owned());
	}
	if let Some(scopes) = response.scopes() {
		let raw = scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ");

		builder = builder.scope(raw);
	}

	let fields = response.extra_fields();

	if let Some(id_token) = fields.id_token.as_ref() {
		builder = builder.id_token(id_token.to_owned());
	}
	for (key, value) in &fields.extra {
		builder = builder.extra(key.to_owned(), value.to_owned());
	}

	builder.build().map_err(|err| {
		MalformedResponseError::MissingField { endpoint: Endpoint::Token, field: err.field() }
			.into()
	})
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	raw_body: Option<Vec<u8>>,
	err: IdentityRequestTokenError<E>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let status = meta.as_ref().and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let body = match raw_body {
				Some(raw) => String::from_utf8_lossy(&raw).into_owned(),
				None => serde_json::to_string(&response).unwrap_or_default(),
			};

			Endpoint::Token.status_failure(status.unwrap_or(400), body)
		},
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(Endpoint::Token, meta.as_ref(), error),
		RequestTokenError::Parse(source, body) => match status {
			Some(status) if !is_success(status) =>
				Endpoint::Token.status_failure(status, String::from_utf8_lossy(&body)),
			// Some providers (GitHub) report OAuth errors with a 200 status.
			_ if serde_json::from_slice::<BasicErrorResponse>(&body).is_ok() => Endpoint::Token
				.status_failure(status.unwrap_or(200), String::from_utf8_lossy(&body)),
			_ => MalformedResponseError::Json { endpoint: Endpoint::Token, source }.into(),
		},
		RequestTokenError::Other(message) => match status {
			Some(status) if !is_success(status) => Endpoint::Token.status_failure(status, ""),
			_ => MalformedResponseError::Unexpected { endpoint: Endpoint::Token, message }.into(),
		},
	}
}

pub(crate) fn is_success(status: u16) -> bool {
	(200..300).contains(&status)
}
