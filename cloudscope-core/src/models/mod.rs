//! Domain models for CloudScope.
//!
//! ## Submodules
//!
//! - [`provider`] - Provider types (ProviderKind, CredentialKind, Metadata)
//! - [`session`] - Session types (ProviderSession, SessionStatus, SessionIdentifiers)
//! - [`credentials`] - Raw credential input
//! - [`api`] - Managed API identifiers and display names
//! - [`telemetry`] - Billing/utilization records and reports
//! - [`synthetic`] - Deterministic synthetic series

pub mod api;
mod credentials;
mod provider;
pub mod session;
pub mod synthetic;
mod telemetry;

// Re-export everything at the models level
pub use api::{ApiResource, display_name};
pub use credentials::{CredentialInput, ServiceAccountFile};
pub use provider::{CredentialKind, ProviderKind, ProviderMetadata};
pub use session::{ProviderSession, SessionIdentifiers, SessionStatus};
pub use synthetic::{DAY_LABELS, DayPoint, StatusBreakdown, SyntheticSeries, seed_for, synthesize};
pub use telemetry::{BillingInfo, SeriesSource, TelemetryRecord, TelemetryReport, UtilizationInfo};
