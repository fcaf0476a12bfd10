// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # CloudScope App
//!
//! The facade a presentation layer talks to.
//!
//! - [`CloudConsole`] owns sessions, the API catalog and telemetry
//! - [`ApiDetailsView`] loads telemetry for a view that may close early
//! - [`logging::init_tracing`] installs the tracing subscriber
//!
//! ## Usage
//!
//! ```ignore
//! use cloudscope_app::{CloudConsole, logging};
//! use cloudscope_core::{CredentialInput, ProviderKind, ServiceAccountFile};
//! use cloudscope_store::Settings;
//!
//! let settings = Settings::load_default().await?;
//! logging::init_tracing(settings.log_level);
//!
//! let console = CloudConsole::from_settings(&settings).await?;
//! let file = ServiceAccountFile::from_path("sa.json".as_ref())?;
//! console.authenticate(CredentialInput::gcp(file)).await?;
//!
//! for api in console.list_enabled_apis(ProviderKind::Gcp).await? {
//!     let report = console.fetch_report(ProviderKind::Gcp, &api.canonical_id).await?;
//!     println!("{}: ${:.2}", api.display_name, report.record.billing.cost);
//! }
//! ```

pub mod error;
pub mod logging;
pub mod state;
pub mod views;

pub use error::ConsoleError;
pub use state::{CloudConsole, ProviderOverview};
pub use views::{ApiDetailsView, DetailsState, LoadOutcome};
