//! Built-in provider catalogue.
//!
//! Every module exposes the provider's endpoint constants, a `descriptor()` constructor, and a
//! pure `normalize()` function usable as a [`ProfileNormalizer`](crate::profile::ProfileNormalizer).

pub mod discord;
pub mod facebook;
pub mod github;
pub mod google;
pub mod microsoft;

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ScopeList},
	provider::{ProviderDescriptor, ProviderDescriptorError, parse_endpoint},
};

fn builtin_descriptor(
	id: &'static str,
	authorization: &str,
	token: &str,
	userinfo: Url,
	default_scopes: &[&str],
	scope_separator: &str,
) -> Result<ProviderDescriptor, ProviderDescriptorError> {
	ProviderDescriptor::builder(ProviderId::from_static(id))
		.authorization_endpoint(parse_endpoint("authorization", authorization)?)
		.token_endpoint(parse_endpoint("token", token)?)
		.userinfo_endpoint(userinfo)
		.default_scopes(ScopeList::try_from(default_scopes)?)
		.scope_separator(scope_separator)
		.build()
}
