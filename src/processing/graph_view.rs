//! Show/hide lifecycle of the knowledge-graph panel.
//!
//! Valid transitions:
//!
//! ```text
//! Hidden -> Loading -> Shown | Failed
//! Shown  -> Loading            (repeat show, refetch)
//! any    -> Hidden             (hide)
//! ```
//!
//! A fetch begun by `begin_show` carries the generation token current at
//! that moment; `finish_show` applies the result only if the token still
//! matches. `hide` bumps the generation, so a fetch resolving after the
//! panel was closed settles into the void instead of resurrecting it.

use crate::processing::StateHandle;
use crate::services::agent::{AgentBackend, BackendError, GraphSnapshot};

#[derive(Clone, Debug, PartialEq, Default)]
pub enum GraphVisibility {
    #[default]
    Hidden,
    Loading,
    Shown(GraphSnapshot),
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphViewState {
    visibility: GraphVisibility,
    generation: u64,
}

impl GraphViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visibility(&self) -> &GraphVisibility {
        &self.visibility
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self.visibility, GraphVisibility::Hidden)
    }

    /// Starts a fetch. No-op while one is already in flight (a single
    /// logical fetch at a time) and after a failure (the panel offers
    /// close, not retry-in-place). The previous snapshot is discarded
    /// here, before the new one is known, so two generations of data are
    /// never held at once.
    pub fn begin_show(&mut self) -> Option<u64> {
        match self.visibility {
            GraphVisibility::Loading => {
                tracing::warn!("'show' ignored: graph fetch already in flight");
                None
            }
            GraphVisibility::Failed(_) => None,
            GraphVisibility::Hidden | GraphVisibility::Shown(_) => {
                self.visibility = GraphVisibility::Loading;
                self.generation += 1;
                Some(self.generation)
            }
        }
    }

    /// Applies a fetch outcome, unless the panel moved on since the fetch
    /// began. Stale completions are logged and dropped.
    pub fn finish_show(&mut self, token: u64, outcome: Result<GraphSnapshot, BackendError>) {
        if token != self.generation || !matches!(self.visibility, GraphVisibility::Loading) {
            tracing::info!("discarding stale graph fetch result");
            return;
        }
        self.visibility = match outcome {
            Ok(snapshot) => GraphVisibility::Shown(snapshot),
            Err(err) => GraphVisibility::Failed(err.to_string()),
        };
    }

    /// Closes the panel and discards whatever it held. Idempotent.
    pub fn hide(&mut self) {
        if self.is_hidden() {
            return;
        }
        self.visibility = GraphVisibility::Hidden;
        self.generation += 1;
    }
}

/// Runs a full show: transition to loading, fetch, settle. The token
/// check inside `finish_show` makes a superseded fetch harmless.
pub async fn show<B, H>(backend: &B, mut view: H)
where
    B: AgentBackend + ?Sized,
    H: StateHandle<GraphViewState>,
{
    let Some(token) = view.apply(|g| g.begin_show()) else {
        return;
    };

    let outcome = backend.graph_data().await;
    if let Err(e) = &outcome {
        tracing::warn!("graph fetch settled with an error: {}", e);
    }
    view.apply(|g| g.finish_show(token, outcome));
}
