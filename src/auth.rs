//! Identity-domain identifiers, scope lists, secrets, and token responses.

pub mod id;
pub mod scope;
pub mod token;

pub use id::*;
pub use scope::*;
pub use token::{response::*, secret::*};
