// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `CloudScope` Providers
//!
//! Provider-specific authenticators and the services that run on top of
//! an authenticated session.
//!
//! ## Supported Providers
//!
//! | Provider | Credential | Identifier | Verification |
//! |----------|------------|------------|--------------|
//! | AWS | Access key pair | `access_key_id` | Simulated delay |
//! | GCP | Service-account file | `project_id` | Backend exchange |
//! | Azure | Secret key | `key_hint` | Configured secret |
//!
//! ## Services
//!
//! - [`ApiCatalogService`] - Lists enabled APIs with display names
//! - [`TelemetryAggregator`] - Billing and utilization, with a synthetic
//!   series when the backend has none
//!
//! ## Usage
//!
//! ```ignore
//! use cloudscope_core::{CredentialInput, ProviderAuthenticator, ProviderKind};
//! use cloudscope_fetch::FetchContext;
//! use cloudscope_providers::ProviderRegistry;
//!
//! let ctx = FetchContext::new()?;
//! let auth = ProviderRegistry::build_authenticator(ProviderKind::Azure, &ctx);
//! let ids = auth.authenticate(CredentialInput::azure("valid-key")).await?;
//! ```

pub mod authenticator;
pub mod catalog;
pub mod descriptor;
pub mod registry;
pub mod telemetry;

// Provider modules
pub mod aws;
pub mod azure;
pub mod gcp;

pub use authenticator::Authenticator;
pub use catalog::{ApiCatalogService, CATALOG_FAILED_MESSAGE};
pub use descriptor::{CliConfig, CredentialForm, ProviderDescriptor, ProviderDescriptorBuilder};
pub use registry::ProviderRegistry;
pub use telemetry::{TELEMETRY_FAILED_MESSAGE, TelemetryAggregator};

pub use aws::{AwsAuthenticator, aws_descriptor};
pub use azure::{AzureAuthenticator, azure_descriptor};
pub use gcp::{GcpAuthenticator, gcp_descriptor};
