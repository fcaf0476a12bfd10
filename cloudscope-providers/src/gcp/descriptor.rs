//! GCP provider descriptor.

use cloudscope_core::ProviderKind;

use super::authenticator::MISSING_FILE_MESSAGE;
use crate::descriptor::{CliConfig, CredentialForm, ProviderDescriptor};

/// Returns the GCP descriptor.
pub fn gcp_descriptor() -> ProviderDescriptor {
    ProviderDescriptor::builder(ProviderKind::Gcp)
        .form(CredentialForm {
            fields: &["Service Account File"],
            missing_message: MISSING_FILE_MESSAGE,
        })
        .cli(CliConfig {
            name: "gcp",
            aliases: &["google", "gcloud"],
        })
        .build()
}
