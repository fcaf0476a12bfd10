//! AWS provider descriptor.

use cloudscope_core::ProviderKind;

use super::authenticator::MISSING_KEYS_MESSAGE;
use crate::descriptor::{CliConfig, CredentialForm, ProviderDescriptor};

/// Returns the AWS descriptor.
pub fn aws_descriptor() -> ProviderDescriptor {
    ProviderDescriptor::builder(ProviderKind::Aws)
        .form(CredentialForm {
            fields: &["Access Key", "Secret Access Key"],
            missing_message: MISSING_KEYS_MESSAGE,
        })
        .cli(CliConfig {
            name: "aws",
            aliases: &["amazon", "amazonaws"],
        })
        .build()
}
