//! Billing and utilization telemetry types.
//!
//! - [`TelemetryRecord`] - Billing + utilization for one API
//! - [`TelemetryReport`] - A record plus a chartable series
//! - [`SeriesSource`] - Whether the series came from the backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::synthetic::{SyntheticSeries, synthesize};

// ============================================================================
// Telemetry Record
// ============================================================================

/// Billing information for one API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingInfo {
    /// Cost in the billing account's currency.
    pub cost: f64,
    /// Usage amount in the service's unit.
    pub usage: f64,
    /// Billing service name, if reported.
    pub service_name: Option<String>,
    /// Billing account, if reported.
    pub billing_account: Option<String>,
}

/// Resource utilization for one API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationInfo {
    /// CPU usage, percent.
    pub cpu_usage: f64,
    /// Memory usage, percent.
    pub memory_usage: f64,
    /// Request count, if reported.
    pub request_count: Option<u64>,
    /// Average latency in milliseconds, if reported.
    pub avg_latency: Option<f64>,
    /// Backend-reported freshness timestamp, verbatim.
    pub last_updated: Option<String>,
}

/// Billing and utilization for one API, produced per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Canonical API identifier.
    pub api_id: String,
    /// Billing data.
    pub billing: BillingInfo,
    /// Utilization data.
    pub utilization: UtilizationInfo,
}

// ============================================================================
// Telemetry Report
// ============================================================================

/// Where a report's series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesSource {
    /// Supplied by the billing/monitoring backend.
    Backend,
    /// Generated by [`synthesize`].
    Synthetic,
}

impl SeriesSource {
    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Backend => "Live",
            Self::Synthetic => "Estimated",
        }
    }
}

impl fmt::Display for SeriesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A telemetry record with a chartable seven-day series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReport {
    /// Billing and utilization.
    pub record: TelemetryRecord,
    /// Seven-day series.
    pub series: SyntheticSeries,
    /// Origin of `series`.
    pub series_source: SeriesSource,
    /// When the record was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl TelemetryReport {
    /// Builds a report, keeping `series` only if it is complete and
    /// synthesizing one otherwise.
    pub fn assemble(record: TelemetryRecord, series: Option<SyntheticSeries>) -> Self {
        let (series, series_source) = match series {
            Some(series) if series.is_complete() => (series, SeriesSource::Backend),
            _ => (synthesize(&record.api_id), SeriesSource::Synthetic),
        };
        Self {
            record,
            series,
            series_source,
            fetched_at: Utc::now(),
        }
    }

    /// Returns true if the series was synthesized.
    pub fn is_synthetic(&self) -> bool {
        self.series_source == SeriesSource::Synthetic
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::synthetic::{DayPoint, StatusBreakdown};

    fn record(api_id: &str) -> TelemetryRecord {
        TelemetryRecord {
            api_id: api_id.to_string(),
            billing: BillingInfo {
                cost: 12.5,
                usage: 300.0,
                service_name: None,
                billing_account: None,
            },
            utilization: UtilizationInfo {
                cpu_usage: 41.0,
                memory_usage: 63.0,
                request_count: None,
                avg_latency: None,
                last_updated: None,
            },
        }
    }

    #[test]
    fn test_assemble_synthesizes_missing_series() {
        let report = TelemetryReport::assemble(record("compute.googleapis.com"), None);
        assert!(report.is_synthetic());
        assert_eq!(report.series, synthesize("compute.googleapis.com"));
    }

    #[test]
    fn test_assemble_replaces_partial_series() {
        let partial = SyntheticSeries {
            days: vec![DayPoint {
                label: "Mon".to_string(),
                cpu: 1,
                memory: 2,
                cost: 3,
                requests: 4,
                errors: 5,
            }],
            status: StatusBreakdown::from_error_tenths(10),
        };
        let report = TelemetryReport::assemble(record("run.googleapis.com"), Some(partial));
        assert_eq!(report.series_source, SeriesSource::Synthetic);
        assert!(report.series.is_complete());
    }

    #[test]
    fn test_assemble_keeps_backend_series() {
        let live = synthesize("other-id");
        let report = TelemetryReport::assemble(record("run.googleapis.com"), Some(live.clone()));
        assert_eq!(report.series_source, SeriesSource::Backend);
        assert_eq!(report.series, live);
    }
}
