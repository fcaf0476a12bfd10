//! AWS provider implementation.
//!
//! Access key pairs are accepted after a simulated verification delay.
//! Only the access key id is kept as a session identifier.

mod authenticator;
mod descriptor;

pub use authenticator::{AwsAuthenticator, MISSING_KEYS_MESSAGE};
pub use descriptor::aws_descriptor;
