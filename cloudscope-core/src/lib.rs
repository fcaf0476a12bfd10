// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `CloudScope` Core
//!
//! Core types, models, and traits for `CloudScope`.
//!
//! This crate provides the foundational abstractions used across all other
//! `CloudScope` crates, including:
//!
//! - Domain models (providers, sessions, APIs, telemetry)
//! - Error types
//! - The [`ProviderAuthenticator`] trait
//! - The pure [`synthesize`] series generator
//!
//! ## Key Types
//!
//! ### Provider & Session Types
//! - [`ProviderKind`] - AWS, GCP or Azure
//! - [`ProviderSession`] - One provider's session and its identifiers
//! - [`CredentialInput`] - Raw credential input (secrets redacted in `Debug`)
//!
//! ### API & Telemetry Types
//! - [`ApiResource`] - Canonical API id plus display name
//! - [`TelemetryRecord`] - Billing and utilization for one API
//! - [`TelemetryReport`] - Record plus a seven-day series
//! - [`SyntheticSeries`] - Deterministic placeholder series

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::{AuthError, CatalogError, CoreError, FetchErrorCode, SessionError, TelemetryError};

// Re-export all model types
pub use models::{
    // Provider types
    CredentialKind,
    ProviderKind,
    ProviderMetadata,
    // Session types
    CredentialInput,
    ProviderSession,
    ServiceAccountFile,
    SessionIdentifiers,
    SessionStatus,
    // API & telemetry
    ApiResource,
    BillingInfo,
    DAY_LABELS,
    DayPoint,
    SeriesSource,
    StatusBreakdown,
    SyntheticSeries,
    TelemetryRecord,
    TelemetryReport,
    UtilizationInfo,
    display_name,
    seed_for,
    synthesize,
};

// Re-export traits
pub use traits::ProviderAuthenticator;
