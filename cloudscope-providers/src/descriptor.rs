//! Provider descriptor system.
//!
//! A descriptor contains all the static configuration for a provider:
//! - Metadata (display names, service-domain suffix, identifier keys)
//! - Credential form (field labels, missing-field message)
//! - CLI names and aliases

use cloudscope_core::{ProviderKind, ProviderMetadata};
use cloudscope_fetch::FetchContext;

use crate::authenticator::Authenticator;

// ============================================================================
// Provider Descriptor
// ============================================================================

/// Complete descriptor for a provider.
pub struct ProviderDescriptor {
    /// Provider identifier.
    pub id: ProviderKind,
    /// Display metadata.
    pub metadata: ProviderMetadata,
    /// Credential form.
    pub form: CredentialForm,
    /// CLI names.
    pub cli: CliConfig,
}

impl ProviderDescriptor {
    /// Creates a new descriptor builder.
    pub fn builder(id: ProviderKind) -> ProviderDescriptorBuilder {
        ProviderDescriptorBuilder::new(id)
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        &self.metadata.display_name
    }

    /// Returns the CLI name.
    pub fn cli_name(&self) -> &str {
        self.cli.name
    }

    /// Returns the suffix stripped from canonical API ids for display.
    pub fn service_domain_suffix(&self) -> &str {
        &self.metadata.service_domain_suffix
    }

    /// Builds the authenticator for this provider.
    pub fn build_authenticator(&self, ctx: &FetchContext) -> Authenticator {
        Authenticator::for_provider(self.id, ctx)
    }
}

impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("cli", &self.cli.name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Credential Form
// ============================================================================

/// The credential form shown for a provider.
#[derive(Debug, Clone, Copy)]
pub struct CredentialForm {
    /// Field labels, in display order.
    pub fields: &'static [&'static str],
    /// Message shown when a required field is empty.
    pub missing_message: &'static str,
}

impl Default for CredentialForm {
    fn default() -> Self {
        Self {
            fields: &[],
            missing_message: "All fields are required",
        }
    }
}

// ============================================================================
// CLI Config
// ============================================================================

/// Names a provider can be looked up by.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliConfig {
    /// Primary name.
    pub name: &'static str,
    /// Alternative names.
    pub aliases: &'static [&'static str],
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for `ProviderDescriptor`.
pub struct ProviderDescriptorBuilder {
    id: ProviderKind,
    metadata: Option<ProviderMetadata>,
    form: CredentialForm,
    cli: Option<CliConfig>,
}

impl ProviderDescriptorBuilder {
    /// Creates a new builder for the given provider.
    pub fn new(id: ProviderKind) -> Self {
        Self {
            id,
            metadata: None,
            form: CredentialForm::default(),
            cli: None,
        }
    }

    /// Sets the metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: ProviderMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets the credential form.
    #[must_use]
    pub fn form(mut self, form: CredentialForm) -> Self {
        self.form = form;
        self
    }

    /// Sets the CLI configuration.
    #[must_use]
    pub fn cli(mut self, cli: CliConfig) -> Self {
        self.cli = Some(cli);
        self
    }

    /// Builds the descriptor.
    ///
    /// Unset parts default to the provider's standard metadata and its
    /// CLI name.
    pub fn build(self) -> ProviderDescriptor {
        let id = self.id;
        ProviderDescriptor {
            id,
            metadata: self
                .metadata
                .unwrap_or_else(|| ProviderMetadata::for_provider(id)),
            form: self.form,
            cli: self.cli.unwrap_or(CliConfig {
                name: id.cli_name(),
                aliases: &[],
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
