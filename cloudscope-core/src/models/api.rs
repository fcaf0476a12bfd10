//! Managed API identifiers.

use serde::{Deserialize, Serialize};

use super::provider::ProviderKind;

/// An enabled managed API in a provider account or project.
///
/// Immutable once produced; `display_name` is a pure function of
/// `canonical_id` and the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiResource {
    /// Provider that owns the API.
    pub provider: ProviderKind,
    /// Fully-qualified service name (e.g., `compute.googleapis.com`).
    pub canonical_id: String,
    /// Short name for display (e.g., `Compute`).
    pub display_name: String,
}

impl ApiResource {
    /// Creates a resource from a canonical identifier.
    pub fn from_canonical(provider: ProviderKind, canonical_id: impl Into<String>) -> Self {
        let canonical_id = canonical_id.into();
        let display_name = display_name(&canonical_id, provider.service_domain_suffix());
        Self {
            provider,
            canonical_id,
            display_name,
        }
    }
}

/// Derives a display name from a canonical API identifier.
///
/// Strips `suffix` when the identifier ends with it, then uppercases the
/// first character. Callers pass canonical identifiers only; the result of
/// feeding an already-derived name back in is not meaningful.
pub fn display_name(canonical_id: &str, suffix: &str) -> String {
    let stem = canonical_id.strip_suffix(suffix).unwrap_or(canonical_id);
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
