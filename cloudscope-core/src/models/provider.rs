//! Provider-related types.
//!
//! This module contains types related to cloud providers:
//! - [`ProviderKind`] - Enum of supported providers
//! - [`CredentialKind`] - What a provider accepts as credential input
//! - [`ProviderMetadata`] - Provider capabilities and display info

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Provider Kind
// ============================================================================

/// Supported cloud provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Amazon Web Services
    Aws,
    /// Google Cloud Platform
    Gcp,
    /// Microsoft Azure
    Azure,
}

impl ProviderKind {
    /// Returns the display name for this provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Aws => "AWS",
            Self::Gcp => "GCP",
            Self::Azure => "Azure",
        }
    }

    /// Returns the long marketing name for this provider.
    pub fn long_name(&self) -> &'static str {
        match self {
            Self::Aws => "Amazon Web Services",
            Self::Gcp => "Google Cloud Platform",
            Self::Azure => "Microsoft Azure Platform",
        }
    }

    /// Returns all available provider kinds, in dashboard order.
    pub fn all() -> &'static [ProviderKind] {
        &[Self::Aws, Self::Gcp, Self::Azure]
    }

    /// Returns the CLI name for this provider (lowercase, no spaces).
    ///
    /// This is also the prefix of every persisted flag for the provider.
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Gcp => "gcp",
            Self::Azure => "azure",
        }
    }

    /// Returns the domain suffix of this provider's canonical API identifiers.
    pub fn service_domain_suffix(&self) -> &'static str {
        match self {
            Self::Aws => ".amazonaws.com",
            Self::Gcp => ".googleapis.com",
            Self::Azure => ".azure.com",
        }
    }

    /// Returns the kind of credential this provider accepts.
    pub fn credential_kind(&self) -> CredentialKind {
        match self {
            Self::Aws => CredentialKind::AccessKeyPair,
            Self::Gcp => CredentialKind::ServiceAccountFile,
            Self::Azure => CredentialKind::SecretKey,
        }
    }

    /// Returns the identifier key that scopes backend requests
    /// (sent as `projectId`).
    pub fn scope_identifier(&self) -> &'static str {
        match self {
            Self::Aws => "access_key_id",
            Self::Gcp => "project_id",
            Self::Azure => "key_hint",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "gcp" => Ok(Self::Gcp),
            "azure" => Ok(Self::Azure),
            other => Err(CoreError::ProviderNotFound(other.to_string())),
        }
    }
}

// ============================================================================
// Credential Kind
// ============================================================================

/// The shape of raw credential input a provider accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// Access key id plus secret access key.
    AccessKeyPair,
    /// An uploaded service-account JSON file.
    ServiceAccountFile,
    /// A single secret string.
    SecretKey,
}

impl CredentialKind {
    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AccessKeyPair => "Access key pair",
            Self::ServiceAccountFile => "Service account file",
            Self::SecretKey => "Secret key",
        }
    }
}

// ============================================================================
// Provider Metadata
// ============================================================================

/// Metadata describing a provider's credential shape and display info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// The provider this metadata describes.
    pub id: ProviderKind,
    /// Short display name in UI.
    pub display_name: String,
    /// Long name shown under the provider card.
    pub long_name: String,
    /// Title of the provider's "select" button.
    pub select_title: String,
    /// CLI name, also the storage key prefix.
    pub cli_name: String,
    /// What the user must supply to sign in.
    pub credential_kind: CredentialKind,
    /// Domain suffix stripped from canonical API identifiers.
    pub service_domain_suffix: String,
    /// Identifier keys persisted for an authenticated session.
    pub identifier_keys: Vec<String>,
}

impl ProviderMetadata {
    /// Creates default metadata for a provider kind.
    pub fn for_provider(kind: ProviderKind) -> Self {
        let name = kind.display_name();
        Self {
            id: kind,
            display_name: name.to_string(),
            long_name: kind.long_name().to_string(),
            select_title: format!("Select {name}"),
            cli_name: kind.cli_name().to_string(),
            credential_kind: kind.credential_kind(),
            service_domain_suffix: kind.service_domain_suffix().to_string(),
            identifier_keys: vec![kind.scope_identifier().to_string()],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
