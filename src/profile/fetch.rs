//! Userinfo retrieval through a [`ProviderHttpClient`] handle.

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{HeaderValue, Method, Request, header},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, Endpoint, MalformedResponseError},
	http::{ProviderHttpClient, ResponseMetadataSlot, USER_AGENT},
	oauth::{TransportErrorMapper, is_success},
};

/// Issues the bearer-authenticated GET and parses the body as JSON.
pub(crate) async fn fetch_userinfo<C, M>(
	http_client: &C,
	error_mapper: &M,
	userinfo: &Url,
	access_token: &str,
) -> Result<JsonValue>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let authorization = HeaderValue::from_str(&format!("Bearer {access_token}"))
		.map_err(|_| ConfigError::InvalidAccessToken)?;
	let request = Request::builder()
		.method(Method::GET)
		.uri(userinfo.as_str())
		.header(header::AUTHORIZATION, authorization)
		.header(header::ACCEPT, "application/json")
		.header(header::USER_AGENT, USER_AGENT)
		.body(Vec::new())
		.map_err(ConfigError::from)?;
	let meta = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(meta.clone());
	let response = handle.call(request).await.map_err(|err| {
		error_mapper.map_transport_error(Endpoint::UserInfo, meta.take().as_ref(), err)
	})?;
	let status = response.status().as_u16();
	let body = response.body();

	if !is_success(status) {
		return Err(Endpoint::UserInfo.status_failure(status, String::from_utf8_lossy(body)));
	}

	serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(body)).map_err(
		|source| MalformedResponseError::Json { endpoint: Endpoint::UserInfo, source }.into(),
	)
}
