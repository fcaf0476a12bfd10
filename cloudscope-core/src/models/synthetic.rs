//! Deterministic synthetic telemetry series.
//!
//! Used when the billing/monitoring backend does not supply a time series,
//! so repeated views of the same API render the same chart. The output is
//! a pure function of the API identifier: no clock, no randomness, no
//! hidden state.

use serde::{Deserialize, Serialize};

/// Ordered day labels of a series.
pub const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Successful share of requests, in tenths of a percent.
const SUCCESSFUL_TENTHS: u16 = 977;

/// Error share of requests, in tenths of a percent.
const ERROR_TENTHS: u16 = 23;

// ============================================================================
// Day Point
// ============================================================================

/// One labeled day of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPoint {
    /// Day label (`Mon`..`Sun`).
    pub label: String,
    /// CPU utilization, percent.
    pub cpu: u32,
    /// Memory utilization, percent.
    pub memory: u32,
    /// Cost for the day.
    pub cost: u32,
    /// Request count.
    pub requests: u32,
    /// Error count.
    pub errors: u32,
}

// ============================================================================
// Status Breakdown
// ============================================================================

/// Two-category request status split.
///
/// Stored in tenths of a percent so the two parts always sum to exactly
/// 1000 (100%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    /// Successful requests, tenths of a percent.
    pub successful_tenths: u16,
    /// Failed requests, tenths of a percent.
    pub error_tenths: u16,
}

impl StatusBreakdown {
    /// The fixed split used by synthetic series (97.7% / 2.3%).
    pub const SYNTHETIC: Self = Self {
        successful_tenths: SUCCESSFUL_TENTHS,
        error_tenths: ERROR_TENTHS,
    };

    /// Creates a breakdown from an error share in tenths of a percent.
    ///
    /// Values above 1000 are clamped.
    pub fn from_error_tenths(error_tenths: u16) -> Self {
        let error_tenths = error_tenths.min(1000);
        Self {
            successful_tenths: 1000 - error_tenths,
            error_tenths,
        }
    }

    /// Successful share as a percentage.
    pub fn successful_percent(&self) -> f64 {
        f64::from(self.successful_tenths) / 10.0
    }

    /// Error share as a percentage.
    pub fn error_percent(&self) -> f64 {
        f64::from(self.error_tenths) / 10.0
    }

    /// Sum of both shares as a percentage.
    pub fn total_percent(&self) -> f64 {
        f64::from(self.successful_tenths + self.error_tenths) / 10.0
    }
}

impl Default for StatusBreakdown {
    fn default() -> Self {
        Self::SYNTHETIC
    }
}

// ============================================================================
// Synthetic Series
// ============================================================================

/// Seven labeled days plus a status breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticSeries {
    /// Days in `Mon..Sun` order.
    pub days: Vec<DayPoint>,
    /// Request status split.
    pub status: StatusBreakdown,
}

impl SyntheticSeries {
    /// Returns true if the series has one point per day label.
    pub fn is_complete(&self) -> bool {
        self.days.len() == DAY_LABELS.len()
    }

    /// Total cost across all days.
    pub fn total_cost(&self) -> u64 {
        self.days.iter().map(|d| u64::from(d.cost)).sum()
    }

    /// Total requests across all days.
    pub fn total_requests(&self) -> u64 {
        self.days.iter().map(|d| u64::from(d.requests)).sum()
    }
}

/// Computes the seed of an API identifier.
///
/// The seed is the sum of the identifier's UTF-16 code units, which matches
/// a `charCodeAt` sum on non-ASCII input too.
pub fn seed_for(api_id: &str) -> u64 {
    api_id.encode_utf16().map(u64::from).sum()
}

/// Generates the synthetic series for an API identifier.
pub fn synthesize(api_id: &str) -> SyntheticSeries {
    let seed = seed_for(api_id);
    let days = DAY_LABELS
        .iter()
        .zip(0u64..)
        .map(|(label, index)| {
            // Always < 100, so the narrowing below cannot truncate.
            let offset = ((seed + index) % 100) as u32;
            DayPoint {
                label: (*label).to_string(),
                cpu: 30 + offset % 50,
                memory: 40 + (offset + 10) % 45,
                cost: 50 + offset % 150,
                requests: 1000 + offset * 10,
                errors: 20 + offset % 30,
            }
        })
        .collect();

    SyntheticSeries {
        days,
        status: StatusBreakdown::SYNTHETIC,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_char_sum() {
        assert_eq!(seed_for(""), 0);
        assert_eq!(seed_for("ab"), 97 + 98);
        assert_eq!(seed_for("compute.googleapis.com"), 2242);
    }

    #[test]
    fn test_seed_counts_utf16_units() {
        // U+1F600 is a surrogate pair: 0xD83D + 0xDE00.
        assert_eq!(seed_for("\u{1F600}"), 0xD83D + 0xDE00);
    }

    #[test]
    fn test_synthesize_golden_compute() {
        let series = synthesize("compute.googleapis.com");
        let labels: Vec<_> = series.days.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, DAY_LABELS);

        let cpu: Vec<_> = series.days.iter().map(|d| d.cpu).collect();
        let memory: Vec<_> = series.days.iter().map(|d| d.memory).collect();
        let cost: Vec<_> = series.days.iter().map(|d| d.cost).collect();
        let requests: Vec<_> = series.days.iter().map(|d| d.requests).collect();
        let errors: Vec<_> = series.days.iter().map(|d| d.errors).collect();

        assert_eq!(cpu, [72, 73, 74, 75, 76, 77, 78]);
        assert_eq!(memory, [47, 48, 49, 50, 51, 52, 53]);
        assert_eq!(cost, [92, 93, 94, 95, 96, 97, 98]);
        assert_eq!(requests, [1420, 1430, 1440, 1450, 1460, 1470, 1480]);
        assert_eq!(errors, [32, 33, 34, 35, 36, 37, 38]);
    }

    #[test]
    fn test_synthesize_golden_bigquery_wraps_cpu() {
        let series = synthesize("bigquery.googleapis.com");
        let cpu: Vec<_> = series.days.iter().map(|d| d.cpu).collect();
        let cost: Vec<_> = series.days.iter().map(|d| d.cost).collect();
        assert_eq!(cpu, [79, 30, 31, 32, 33, 34, 35]);
        assert_eq!(cost, [99, 100, 101, 102, 103, 104, 105]);
    }

    #[test]
    fn test_day_offset_wraps_at_100() {
        // seed 195 -> offsets 95..99, 0, 1
        let series = synthesize("ab");
        let requests: Vec<_> = series.days.iter().map(|d| d.requests).collect();
        assert_eq!(requests, [1950, 1960, 1970, 1980, 1990, 1000, 1010]);
        assert_eq!(series.days[5].cpu, 30);
        assert_eq!(series.days[5].memory, 50);
        assert_eq!(series.days[5].errors, 20);
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        assert_eq!(synthesize("run.googleapis.com"), synthesize("run.googleapis.com"));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = synthesize("compute.googleapis.com");
        let b = synthesize("bigquery.googleapis.com");
        assert_ne!(a.days, b.days);
    }

    #[test]
    fn test_status_breakdown_sums_to_100() {
        let series = synthesize("anything");
        assert_eq!(series.status.successful_tenths + series.status.error_tenths, 1000);
        assert!((series.status.successful_percent() - 97.7).abs() < f64::EPSILON);
        assert!((series.status.error_percent() - 2.3).abs() < f64::EPSILON);
        assert!((series.status.total_percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_breakdown_from_error_tenths_clamps() {
        let b = StatusBreakdown::from_error_tenths(1500);
        assert_eq!(b.error_tenths, 1000);
        assert_eq!(b.successful_tenths, 0);
    }

    #[test]
    fn test_series_totals() {
        let series = synthesize("compute.googleapis.com");
        assert!(series.is_complete());
        assert_eq!(series.total_cost(), (92..=98).sum::<u64>());
        assert_eq!(series.total_requests(), 10_150);
    }
}
