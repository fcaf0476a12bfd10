//! Azure provider implementation.
//!
//! The secret key is compared against a configured value. Only a masked
//! hint of the key is kept as a session identifier.

mod authenticator;
mod descriptor;

pub use authenticator::{
    AzureAuthenticator, INVALID_SECRET_MESSAGE, MISSING_SECRET_MESSAGE, key_hint,
};
pub use descriptor::azure_descriptor;
