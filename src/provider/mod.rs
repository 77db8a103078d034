//! Provider identifiers and the HTTP plumbing shared by recovered calls.

pub mod http;
pub mod key;

pub use key::ProviderKey;
