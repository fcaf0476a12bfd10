//! Console setup errors.

use cloudscope_fetch::FetchError;
use cloudscope_store::StoreError;
use thiserror::Error;

/// Failure while assembling a [`CloudConsole`](crate::CloudConsole).
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The HTTP collaborators could not be built.
    #[error("Backend setup failed: {0}")]
    Fetch(#[from] FetchError),

    /// Settings or storage could not be loaded.
    #[error("Storage setup failed: {0}")]
    Store(#[from] StoreError),
}
