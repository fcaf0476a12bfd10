//! View-scoped telemetry.
//!
//! A details view may be closed, or switched to another API, while its
//! fetch is still running. Every `open` and `close` starts a new
//! generation; a fetch only lands if its generation is still current when
//! it completes. The request itself is never aborted.

use std::sync::Arc;

use cloudscope_core::{ProviderKind, TelemetryError, TelemetryReport};
use tokio::sync::Mutex;
use tracing::debug;

use crate::state::CloudConsole;

// ============================================================================
// View State
// ============================================================================

/// What a details view currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailsState {
    /// No API selected.
    #[default]
    Closed,
    /// Fetch pending for `api_id`.
    Loading {
        /// Selected API.
        api_id: String,
    },
    /// Report received.
    Ready {
        /// Selected API.
        api_id: String,
        /// The report.
        report: Box<TelemetryReport>,
    },
    /// Fetch failed.
    Failed {
        /// Selected API.
        api_id: String,
        /// Why.
        error: TelemetryError,
    },
}

impl DetailsState {
    /// Returns the selected API, if any.
    pub fn api_id(&self) -> Option<&str> {
        match self {
            Self::Closed => None,
            Self::Loading { api_id } | Self::Ready { api_id, .. } | Self::Failed { api_id, .. } => {
                Some(api_id.as_str())
            }
        }
    }
}

/// Result of [`ApiDetailsView::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result was applied to the view.
    Applied,
    /// The view moved on while fetching; the result was dropped.
    Discarded,
    /// Nothing is open.
    Closed,
}

#[derive(Debug, Default)]
struct ViewInner {
    generation: u64,
    state: DetailsState,
}

// ============================================================================
// Details View
// ============================================================================

/// Details panel for one provider's APIs.
#[derive(Clone)]
pub struct ApiDetailsView {
    console: CloudConsole,
    provider: ProviderKind,
    inner: Arc<Mutex<ViewInner>>,
}

impl ApiDetailsView {
    /// Creates a closed view.
    pub fn new(console: CloudConsole, provider: ProviderKind) -> Self {
        Self {
            console,
            provider,
            inner: Arc::new(Mutex::new(ViewInner::default())),
        }
    }

    /// Returns the provider this view reads from.
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Selects `api_id` and returns the new generation.
    pub async fn open(&self, api_id: impl Into<String>) -> u64 {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.state = DetailsState::Loading {
            api_id: api_id.into(),
        };
        inner.generation
    }

    /// Fetches the report for the selected API.
    pub async fn load(&self) -> LoadOutcome {
        let (generation, api_id) = {
            let inner = self.inner.lock().await;
            match inner.state.api_id() {
                Some(id) => (inner.generation, id.to_string()),
                None => return LoadOutcome::Closed,
            }
        };

        let result = self.console.fetch_report(self.provider, &api_id).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!(provider = %self.provider, api_id, "Dropping stale details result");
            return LoadOutcome::Discarded;
        }
        inner.state = match result {
            Ok(report) => DetailsState::Ready {
                api_id,
                report: Box::new(report),
            },
            Err(error) => DetailsState::Failed { api_id, error },
        };
        LoadOutcome::Applied
    }

    /// Selects `api_id` and loads it.
    pub async fn show(&self, api_id: impl Into<String>) -> LoadOutcome {
        self.open(api_id).await;
        self.load().await
    }

    /// Closes the view. Pending results are dropped.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.state = DetailsState::Closed;
    }

    /// Returns what the view shows.
    pub async fn current(&self) -> DetailsState {
        self.inner.lock().await.state.clone()
    }

    /// Returns the current generation.
    pub async fn generation(&self) -> u64 {
        self.inner.lock().await.generation
    }
}

impl std::fmt::Debug for ApiDetailsView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiDetailsView")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
