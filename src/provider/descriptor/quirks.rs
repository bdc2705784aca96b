// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how flows behave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Indicates whether PKCE must be supplied even for confidential clients.
	pub pkce_required: bool,
}
