//! Request and response bodies exchanged with the backend.
//!
//! Numeric fields are parsed leniently: the billing backend reports some
//! figures as strings (`"12.50"`, `"$12.50"`, `"41%"`), others as numbers.

use cloudscope_core::{
    BillingInfo, DAY_LABELS, DayPoint, ProviderKind, StatusBreakdown, SyntheticSeries,
    TelemetryRecord, UtilizationInfo,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Error Body
// ============================================================================

/// Body of a failed response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Message to display, verbatim.
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// GCP Authentication
// ============================================================================

/// Response of `POST /authenticate-gcp`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GcpAuthResponse {
    /// Project the service account belongs to.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Failure message.
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Enabled APIs
// ============================================================================

/// Body of `POST /enabled-apis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnabledApisRequest {
    /// Provider to list.
    pub provider: ProviderKind,
    /// Scope the listing applies to.
    #[serde(rename = "projectId")]
    pub project_id: String,
}

/// Response of `POST /enabled-apis`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnabledApisResponse {
    /// Canonical API identifiers.
    #[serde(default)]
    pub apis: Vec<String>,
}

// ============================================================================
// API Details
// ============================================================================

/// Body of `POST /api-details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRequest {
    /// Canonical API identifier.
    #[serde(rename = "apiName")]
    pub api_id: String,
    /// Project the API belongs to.
    #[serde(rename = "projectId")]
    pub project_id: String,
}

impl TelemetryRequest {
    /// Creates a request.
    pub fn new(api_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_id: api_id.into(),
            project_id: project_id.into(),
        }
    }
}

/// Billing block of an API details response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingBody {
    /// Cost.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost: f64,
    /// Usage amount.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub usage: f64,
    /// Billing service name.
    #[serde(default, alias = "serviceName")]
    pub service_name: Option<String>,
    /// Billing account.
    #[serde(default, alias = "billingAccount")]
    pub billing_account: Option<String>,
}

/// Utilization block of an API details response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UtilizationBody {
    /// CPU usage, percent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cpu_usage: f64,
    /// Memory usage, percent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub memory_usage: f64,
    /// Request count.
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub request_count: Option<u64>,
    /// Average latency, milliseconds.
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub avg_latency: Option<f64>,
    /// Freshness timestamp, verbatim.
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// One point of a backend-supplied daily series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPointBody {
    /// Day label; positional labels are used when absent.
    #[serde(default, alias = "name")]
    pub day: Option<String>,
    /// CPU, percent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cpu: f64,
    /// Memory, percent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub memory: f64,
    /// Cost.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost: f64,
    /// Requests.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub requests: f64,
    /// Errors.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub errors: f64,
}

/// Status split reported by the backend, in percent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusBreakdownBody {
    /// Successful share.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub successful: f64,
    /// Error share.
    #[serde(default, alias = "errors", deserialize_with = "lenient_f64")]
    pub error: f64,
}

impl From<StatusBreakdownBody> for StatusBreakdown {
    fn from(body: StatusBreakdownBody) -> Self {
        StatusBreakdown::from_error_tenths(to_u16_tenths(body.error))
    }
}

/// Response of `POST /api-details`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryResponse {
    /// Billing block.
    #[serde(default, alias = "billingInfo")]
    pub billing_info: BillingBody,
    /// Utilization block.
    #[serde(default, alias = "cpuUtilization")]
    pub cpu_utilization: UtilizationBody,
    /// Seven-day series, if the backend has one.
    #[serde(default)]
    pub daily_series: Option<Vec<DailyPointBody>>,
    /// Status split, if the backend has one.
    #[serde(default)]
    pub status_breakdown: Option<StatusBreakdownBody>,
}

impl TelemetryResponse {
    /// Splits the response into a record and an optional series.
    ///
    /// A series is returned only when the backend supplied daily points;
    /// a missing status split then falls back to the fixed synthetic one.
    pub fn into_parts(self, api_id: &str) -> (TelemetryRecord, Option<SyntheticSeries>) {
        let record = TelemetryRecord {
            api_id: api_id.to_string(),
            billing: BillingInfo {
                cost: self.billing_info.cost,
                usage: self.billing_info.usage,
                service_name: self.billing_info.service_name,
                billing_account: self.billing_info.billing_account,
            },
            utilization: UtilizationInfo {
                cpu_usage: self.cpu_utilization.cpu_usage,
                memory_usage: self.cpu_utilization.memory_usage,
                request_count: self.cpu_utilization.request_count,
                avg_latency: self.cpu_utilization.avg_latency,
                last_updated: self.cpu_utilization.last_updated,
            },
        };

        let series = self.daily_series.map(|points| SyntheticSeries {
            days: points
                .into_iter()
                .enumerate()
                .map(|(i, p)| DayPoint {
                    label: p
                        .day
                        .unwrap_or_else(|| DAY_LABELS.get(i).copied().unwrap_or("?").to_string()),
                    cpu: to_u32(p.cpu),
                    memory: to_u32(p.memory),
                    cost: to_u32(p.cost),
                    requests: to_u32(p.requests),
                    errors: to_u32(p.errors),
                })
                .collect(),
            status: self
                .status_breakdown
                .map_or(StatusBreakdown::SYNTHETIC, StatusBreakdown::from),
        });

        (record, series)
    }
}

// ============================================================================
// Lenient Number Parsing
// ============================================================================

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('$')
            .trim_end_matches('%')
            .replace(',', "")
            .parse()
            .ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_number(&value).unwrap_or_default())
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_number(&value))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_number(&value)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.round() as u64))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u32(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u16_tenths(percent: f64) -> u16 {
    if percent.is_finite() && percent > 0.0 {
        (percent * 10.0).round().min(1000.0) as u16
    } else {
        0
    }
}

// ============================================================================
// Tests
// ============================================================================
