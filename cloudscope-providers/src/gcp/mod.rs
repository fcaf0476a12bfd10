//! GCP provider implementation.
//!
//! Uploaded service-account files are forwarded to the backend, which
//! resolves the project they belong to.

mod authenticator;
mod descriptor;

pub use authenticator::{AUTH_FAILED_MESSAGE, GcpAuthenticator, MISSING_FILE_MESSAGE};
pub use descriptor::gcp_descriptor;
