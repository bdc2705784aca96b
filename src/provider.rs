//! Provider-facing descriptors (data), the provider registry, and the built-in catalogue.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering HTTPS-only
//! endpoints, default scopes plus their separator, client authentication preferences, and
//! provider quirks. `registry` maps provider identifiers to descriptors and their profile
//! normalizers. `builtin` ships ready-made entries for Google, Facebook, Microsoft, Discord, and
//! GitHub.

pub mod builtin;
pub mod descriptor;
pub mod registry;

pub use descriptor::*;
pub use registry::*;
