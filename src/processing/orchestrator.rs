//! One request/response cycle per submitted prompt.
//!
//! The sync halves of the lifecycle (`begin_submit` / `finish_submit`)
//! live on [`SessionState`]; this module supplies the async glue between
//! them. The settle call sits on both arms of the backend `Result`, so a
//! failing request can never leave the pending flag raised.

use crate::processing::StateHandle;
use crate::services::agent::AgentBackend;
use crate::session::SessionState;

/// Runs a full submit: append the user message, call the agent endpoint,
/// append the outcome. Whitespace-only input and submits issued while a
/// request is already pending are rejected inside `begin_submit` and
/// cause no state change and no request.
pub async fn submit<B, H>(backend: &B, mut session: H, text: &str, is_suggested: bool)
where
    B: AgentBackend + ?Sized,
    H: StateHandle<SessionState>,
{
    let Some(prompt) = session.apply(|s| s.begin_submit(text, is_suggested)) else {
        return;
    };

    let outcome = backend.query(&prompt).await;
    if let Err(e) = &outcome {
        tracing::warn!("agent request settled with an error: {}", e);
    }
    session.apply(|s| s.finish_submit(outcome));
}
