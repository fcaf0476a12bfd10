//! Host APIs for `CloudScope` collaborators.
//!
//! - [`http`] - HTTP client with tracing and domain allowlist

pub mod http;

pub use http::HttpClient;
