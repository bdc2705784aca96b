//! Provider-agnostic OAuth 2.0 Authorization Code sign-in: CSRF-safe state, token exchange, and
//! normalized profiles for Google, Facebook, Microsoft, Discord, and GitHub.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod profile;
pub mod provider;
pub mod session;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for unit and integration tests.

	pub use crate::_prelude::*;

	// self
	#[cfg(feature = "reqwest")]
	use crate::{
		config::StrategyConfig,
		flows::Strategy,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		profile::ProfileNormalizer,
		provider::ProviderDescriptor,
		session::{MemorySessionStore, SessionStore},
	};

	/// Strategy type alias used by reqwest-backed integration tests.
	#[cfg(feature = "reqwest")]
	pub type ReqwestTestStrategy = Strategy<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`Strategy`] backed by an in-memory session store and the reqwest transport
	/// used across integration tests.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_strategy(
		descriptor: ProviderDescriptor,
		normalizer: Arc<dyn ProfileNormalizer>,
		config: StrategyConfig,
	) -> (ReqwestTestStrategy, Arc<MemorySessionStore>) {
		let session_backend = Arc::new(MemorySessionStore::default());
		let sessions: Arc<dyn SessionStore> = session_backend.clone();
		let http_client = test_reqwest_http_client();
		let mapper = Arc::new(ReqwestTransportErrorMapper);
		let strategy = Strategy::with_http_client(
			sessions,
			descriptor,
			normalizer,
			config,
			http_client,
			mapper,
		);

		(strategy, session_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
