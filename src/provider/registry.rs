//! Provider registry populated at startup.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	profile::ProfileNormalizer,
	provider::{ProviderDescriptor, ProviderDescriptorError, builtin},
};

/// Descriptor plus the normalizer that understands its userinfo payload.
#[derive(Clone)]
pub struct RegisteredProvider {
	/// Provider descriptor.
	pub descriptor: ProviderDescriptor,
	/// Profile mapping for the provider.
	pub normalizer: Arc<dyn ProfileNormalizer>,
}
impl Debug for RegisteredProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RegisteredProvider").field("descriptor", &self.descriptor).finish()
	}
}

/// Mapping from provider id to descriptor and normalizer.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
	providers: BTreeMap<ProviderId, RegisteredProvider>,
}
impl ProviderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding every built-in provider (Microsoft with the `common` tenant).
	pub fn builtin() -> Result<Self, ProviderDescriptorError> {
		let mut registry = Self::new();

		registry.register(builtin::google::descriptor()?, Arc::new(builtin::google::normalize));
		registry.register(builtin::facebook::descriptor()?, Arc::new(builtin::facebook::normalize));
		registry.register(
			builtin::microsoft::descriptor(builtin::microsoft::Tenant::Common)?,
			Arc::new(builtin::microsoft::normalize),
		);
		registry.register(builtin::discord::descriptor()?, Arc::new(builtin::discord::normalize));
		registry.register(builtin::github::descriptor()?, Arc::new(builtin::github::normalize));

		Ok(registry)
	}

	/// Adds or replaces a provider, returning the previous entry for the same id.
	pub fn register(
		&mut self,
		descriptor: ProviderDescriptor,
		normalizer: Arc<dyn ProfileNormalizer>,
	) -> Option<RegisteredProvider> {
		self.providers
			.insert(descriptor.id.clone(), RegisteredProvider { descriptor, normalizer })
	}

	/// Looks up a provider.
	pub fn get(&self, id: &str) -> Option<&RegisteredProvider> {
		self.providers.get(id)
	}

	/// Looks up a descriptor.
	pub fn descriptor(&self, id: &str) -> Option<&ProviderDescriptor> {
		self.get(id).map(|provider| &provider.descriptor)
	}

	/// Registered ids in sorted order.
	pub fn ids(&self) -> impl Iterator<Item = &ProviderId> {
		self.providers.keys()
	}

	/// Number of registered providers.
	pub fn len(&self) -> usize {
		self.providers.len()
	}

	/// Returns true when nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}
}
