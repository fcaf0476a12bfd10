//! Azure provider descriptor.

use cloudscope_core::ProviderKind;

use super::authenticator::MISSING_SECRET_MESSAGE;
use crate::descriptor::{CliConfig, CredentialForm, ProviderDescriptor};

/// Returns the Azure descriptor.
pub fn azure_descriptor() -> ProviderDescriptor {
    ProviderDescriptor::builder(ProviderKind::Azure)
        .form(CredentialForm {
            fields: &["Secret Key"],
            missing_message: MISSING_SECRET_MESSAGE,
        })
        .cli(CliConfig {
            name: "azure",
            aliases: &["microsoft", "az"],
        })
        .build()
}
