// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `CloudScope` Fetch
//!
//! Backend collaborators and HTTP transport for `CloudScope`.
//!
//! ## Collaborators
//!
//! The [`backend`] module defines one trait per backend concern:
//!
//! - [`AuthBackend`] - Exchanges a service-account file for a project id
//! - [`CatalogBackend`] - Lists enabled APIs
//! - [`TelemetryBackend`] - Fetches billing and utilization for an API
//!
//! [`RemoteBackend`] implements all three over HTTP; [`FakeBackend`]
//! implements them from canned answers.
//!
//! ## Example
//!
//! ```ignore
//! use cloudscope_fetch::{FetchContext, FetchSettings, TelemetryRequest};
//!
//! let ctx = FetchContext::with_settings(FetchSettings::default())?;
//! let details = ctx
//!     .telemetry
//!     .api_details(&TelemetryRequest::new("compute.googleapis.com", "proj-123"))
//!     .await?;
//! ```

pub mod backend;
pub mod context;
pub mod error;
pub mod fake;
pub mod host;
pub mod remote;
pub mod wire;

pub use backend::{AuthBackend, CatalogBackend, TelemetryBackend};
pub use context::{
    DEFAULT_AZURE_SECRET, DEFAULT_BACKEND_URL, FetchContext, FetchContextBuilder, FetchSettings,
};
pub use error::{FetchError, HttpError};
pub use fake::{FakeBackend, FakeFailure};
pub use host::HttpClient;
pub use remote::RemoteBackend;
pub use wire::{TelemetryRequest, TelemetryResponse};
