//! Raw credential input.
//!
//! Secrets held here are redacted from `Debug` output so they never end up
//! in logs.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use super::provider::ProviderKind;
use crate::error::CoreError;

// ============================================================================
// Service Account File
// ============================================================================

/// An uploaded GCP service-account credential file.
#[derive(Clone)]
pub struct ServiceAccountFile {
    /// File name as uploaded.
    pub file_name: String,
    /// Raw file contents, forwarded verbatim.
    pub contents: Vec<u8>,
}

impl ServiceAccountFile {
    /// Creates a file from in-memory bytes.
    pub fn new(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    /// Reads a credential file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "credentials.json".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, contents))
    }

    /// Returns true if the file has no content.
    pub fn is_empty(&self) -> bool {
        self.contents.iter().all(u8::is_ascii_whitespace)
    }

    /// Peeks at the `project_id` field without validating the file.
    ///
    /// Only used for diagnostics; the authentication collaborator is the
    /// source of truth.
    pub fn declared_project_id(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct Peek {
            project_id: Option<String>,
        }
        serde_json::from_slice::<Peek>(&self.contents)
            .ok()
            .and_then(|p| p.project_id)
    }
}

impl fmt::Debug for ServiceAccountFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountFile")
            .field("file_name", &self.file_name)
            .field("len", &self.contents.len())
            .finish()
    }
}

// ============================================================================
// Credential Input
// ============================================================================

/// Raw credential input submitted by the user.
#[derive(Clone)]
pub enum CredentialInput {
    /// AWS access key pair.
    Aws {
        /// Access key id (e.g., `AKIA...`).
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
    },
    /// GCP service-account file.
    Gcp(ServiceAccountFile),
    /// Azure secret key.
    Azure {
        /// The secret.
        secret: String,
    },
}

impl CredentialInput {
    /// Creates AWS input.
    pub fn aws(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self::Aws {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Creates GCP input.
    pub fn gcp(file: ServiceAccountFile) -> Self {
        Self::Gcp(file)
    }

    /// Creates Azure input.
    pub fn azure(secret: impl Into<String>) -> Self {
        Self::Azure {
            secret: secret.into(),
        }
    }

    /// Returns the provider this input is meant for.
    pub fn provider(&self) -> ProviderKind {
        match self {
            Self::Aws { .. } => ProviderKind::Aws,
            Self::Gcp(_) => ProviderKind::Gcp,
            Self::Azure { .. } => ProviderKind::Azure,
        }
    }
}

impl fmt::Debug for CredentialInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aws { access_key_id, .. } => f
                .debug_struct("Aws")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .finish(),
            Self::Gcp(file) => f.debug_tuple("Gcp").field(file).finish(),
            Self::Azure { .. } => f
                .debug_struct("Azure")
                .field("secret", &"<redacted>")
                .finish(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
