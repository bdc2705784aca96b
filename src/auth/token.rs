//! Token exchange results and the redacted secret wrapper they are built from.

pub mod response;
pub mod secret;
