use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::agent::{AgentReply, BackendError};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Agent,
    Error,
}

/// Diagnostic payload carried by agent messages. Each field is forwarded
/// only when the backend actually sent it, so "absent" stays
/// distinguishable from "present but empty".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct AgentDetails {
    pub generated_query: Option<String>,
    pub raw_results: Option<Vec<serde_json::Value>>,
    pub added_facts: Option<String>,
}

impl AgentDetails {
    pub fn is_empty(&self) -> bool {
        self.generated_query.is_none() && self.raw_results.is_none() && self.added_facts.is_none()
    }
}

/// One entry in the transcript. Immutable once appended: a failed request
/// produces a new `Error` message, it never touches the `User` message
/// that preceded it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub kind: MessageKind,
    pub text: String,
    pub timestamp: String,
    pub is_suggested: bool,
    pub details: Option<AgentDetails>,
}

fn timestamp_label() -> String {
    Local::now().format("%H:%M").to_string()
}

impl Message {
    pub fn user(text: impl Into<String>, is_suggested: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MessageKind::User,
            text: text.into(),
            timestamp: timestamp_label(),
            is_suggested,
            details: None,
        }
    }

    pub fn agent(reply: AgentReply) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MessageKind::Agent,
            text: reply.agent_response,
            timestamp: timestamp_label(),
            is_suggested: false,
            details: Some(AgentDetails {
                generated_query: reply.sparql_query,
                raw_results: reply.raw_query_results,
                added_facts: reply.added_triples,
            }),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MessageKind::Error,
            text: text.into(),
            timestamp: timestamp_label(),
            is_suggested: false,
            details: None,
        }
    }
}

/// Page-lifetime chat state: the transcript, the single-request pending
/// flag, and the uncommitted draft input. Not persisted; a fresh launch
/// starts a fresh conversation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    transcript: Vec<Message>,
    pending: bool,
    pub draft: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// The only way entries enter the transcript. Append-only: existing
    /// entries are never reordered or removed.
    pub fn append_message(&mut self, message: Message) {
        self.transcript.push(message);
    }

    /// Empties the transcript. No-op while a request is in flight: the
    /// settling agent message must not appear without the user message
    /// that caused it.
    pub fn clear(&mut self) {
        if self.pending {
            tracing::warn!("'clear' blocked: a request is still pending");
            return;
        }
        self.transcript.clear();
    }

    /// First half of a submit. Rejects whitespace-only input and concurrent
    /// submits here, not in the UI: disabling a button is an affordance,
    /// not a guard. On acceptance appends the user message verbatim, clears
    /// the draft, raises `pending`, and returns the trimmed prompt to send.
    pub fn begin_submit(&mut self, text: &str, is_suggested: bool) -> Option<String> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return None;
        }
        if self.pending {
            tracing::warn!("'submit' blocked: already sending");
            return None;
        }
        self.append_message(Message::user(text, is_suggested));
        self.draft.clear();
        self.pending = true;
        Some(prompt.to_string())
    }

    /// Second half of a submit. Called exactly once per accepted
    /// `begin_submit`, on both arms, so `pending` can never stay stuck.
    pub fn finish_submit(&mut self, outcome: Result<AgentReply, BackendError>) {
        let message = match outcome {
            Ok(reply) => Message::agent(reply),
            Err(err) => Message::error(err.to_string()),
        };
        self.append_message(message);
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(answer: &str) -> AgentReply {
        AgentReply {
            user_prompt: None,
            sparql_query: None,
            raw_query_results: None,
            agent_response: answer.to_string(),
            added_triples: None,
        }
    }

    #[test]
    fn empty_and_whitespace_submits_are_rejected() {
        let mut state = SessionState::new();
        assert_eq!(state.begin_submit("", false), None);
        assert_eq!(state.begin_submit("   ", false), None);
        assert!(state.transcript().is_empty());
        assert!(!state.is_pending());
    }

    #[test]
    fn begin_submit_appends_user_message_and_clears_draft() {
        let mut state = SessionState::new();
        state.draft = "Who wrote 1984?".to_string();
        let prompt = state.begin_submit("Who wrote 1984?", false);
        assert_eq!(prompt.as_deref(), Some("Who wrote 1984?"));
        assert!(state.is_pending());
        assert!(state.draft.is_empty());

        let transcript = state.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].kind, MessageKind::User);
        assert_eq!(transcript[0].text, "Who wrote 1984?");
        assert!(!transcript[0].is_suggested);
    }

    #[test]
    fn user_message_keeps_verbatim_text_while_the_payload_is_trimmed() {
        let mut state = SessionState::new();
        let prompt = state.begin_submit("  Who wrote 1984?  ", false);

        // The backend gets the trimmed prompt; the bubble shows what the
        // user actually typed.
        assert_eq!(prompt.as_deref(), Some("Who wrote 1984?"));
        assert_eq!(state.transcript()[0].text, "  Who wrote 1984?  ");
    }

    #[test]
    fn second_submit_while_pending_is_rejected_without_side_effects() {
        let mut state = SessionState::new();
        assert!(state.begin_submit("first", false).is_some());
        assert_eq!(state.begin_submit("second", false), None);
        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.transcript()[0].text, "first");
    }

    #[test]
    fn submit_accepted_again_after_settlement() {
        let mut state = SessionState::new();
        state.begin_submit("first", false).unwrap();
        state.finish_submit(Ok(reply("answer one")));
        assert!(!state.is_pending());

        assert!(state.begin_submit("second", false).is_some());
        let kinds: Vec<_> = state.transcript().iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![MessageKind::User, MessageKind::Agent, MessageKind::User]
        );
    }

    #[test]
    fn finish_submit_success_carries_optional_fields_through() {
        let mut state = SessionState::new();
        state.begin_submit("Who wrote 1984?", false).unwrap();
        state.finish_submit(Ok(AgentReply {
            user_prompt: Some("Who wrote 1984?".to_string()),
            sparql_query: Some("SELECT ...".to_string()),
            raw_query_results: Some(vec![json!({"author": "Orwell"})]),
            agent_response: "George Orwell wrote 1984.".to_string(),
            added_triples: None,
        }));

        let last = state.transcript().last().unwrap();
        assert_eq!(last.kind, MessageKind::Agent);
        assert_eq!(last.text, "George Orwell wrote 1984.");
        let details = last.details.as_ref().unwrap();
        assert_eq!(details.generated_query.as_deref(), Some("SELECT ..."));
        assert_eq!(details.raw_results, Some(vec![json!({"author": "Orwell"})]));
        assert_eq!(details.added_facts, None);
        assert!(!state.is_pending());
    }

    #[test]
    fn finish_submit_without_optional_fields_leaves_them_absent() {
        let mut state = SessionState::new();
        state.begin_submit("hello", false).unwrap();
        state.finish_submit(Ok(reply("hi")));

        let details = state.transcript().last().unwrap().details.as_ref().unwrap();
        assert_eq!(details.generated_query, None);
        assert_eq!(details.raw_results, None);
        assert_eq!(details.added_facts, None);
        assert!(details.is_empty());
    }

    #[test]
    fn finish_submit_error_appends_error_message_and_releases_pending() {
        let mut state = SessionState::new();
        state.begin_submit("anything", false).unwrap();
        state.finish_submit(Err(BackendError::Endpoint(
            "Knowledge graph unavailable".to_string(),
        )));

        let last = state.transcript().last().unwrap();
        assert_eq!(last.kind, MessageKind::Error);
        assert_eq!(last.text, "Knowledge graph unavailable");
        assert!(!state.is_pending());
    }

    #[test]
    fn user_message_always_precedes_its_outcome() {
        let mut state = SessionState::new();
        state.begin_submit("q", false).unwrap();
        state.finish_submit(Err(BackendError::Transport("boom".to_string())));
        let kinds: Vec<_> = state.transcript().iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MessageKind::User, MessageKind::Error]);
    }

    #[test]
    fn clear_empties_transcript_but_not_mid_flight() {
        let mut state = SessionState::new();
        state.begin_submit("q", false).unwrap();
        state.clear();
        assert_eq!(state.transcript().len(), 1);

        state.finish_submit(Ok(reply("a")));
        state.clear();
        assert!(state.transcript().is_empty());
        state.clear();
        assert!(state.transcript().is_empty());
    }

    #[test]
    fn suggested_flag_is_recorded_on_user_messages() {
        let mut state = SessionState::new();
        state.begin_submit("List all authors.", true).unwrap();
        assert!(state.transcript()[0].is_suggested);
    }
}
