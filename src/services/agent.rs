//! HTTP boundary to the knowledge-graph agent service.
//!
//! Two endpoints make up the whole contract: `POST /query` turns a
//! natural-language prompt into a synthesized answer (plus optional
//! diagnostics), and `POST /get_graph_data` returns a node/link snapshot
//! of the graph for visualization. Everything behind them (query
//! generation, SPARQL execution, storage) is the backend's business.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// Structured failure reported by the agent service itself.
    #[error("{0}")]
    Endpoint(String),
    /// The request never produced a response (connection refused, DNS,
    /// timeout, ...).
    #[error("The agent service could not be reached: {0}")]
    Transport(String),
    /// A response arrived but its body did not match the contract.
    #[error("The agent service returned an unreadable response: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    prompt: &'a str,
}

/// Success body of `POST /query`. Only `agent_response` is required;
/// the diagnostic fields show up when the backend chose to include them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparql_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_query_results: Option<Vec<serde_json::Value>>,
    pub agent_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_triples: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "isLiteral")]
    pub is_literal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphEdge>,
}

impl GraphSnapshot {
    /// Node ids must be unique and every link endpoint must resolve to a
    /// node. A snapshot violating either is treated as malformed rather
    /// than silently repaired.
    pub fn validate(&self) -> Result<(), String> {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(format!("duplicate node id '{}'", node.id));
            }
        }
        for link in &self.links {
            if !ids.contains(link.source.as_str()) {
                return Err(format!("link references unknown node '{}'", link.source));
            }
            if !ids.contains(link.target.as_str()) {
                return Err(format!("link references unknown node '{}'", link.target));
            }
        }
        Ok(())
    }
}

/// Seam between the controllers and the network, so the request lifecycle
/// can be exercised in tests without a server.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn query(&self, prompt: &str) -> Result<AgentReply, BackendError>;
    async fn graph_data(&self) -> Result<GraphSnapshot, BackendError>;
}

/// `reqwest`-backed implementation of [`AgentBackend`].
pub struct AgentClient {
    http: reqwest::Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("failed to configure http client, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Maps a non-success response to [`BackendError::Endpoint`]: the
    /// server's `error` field verbatim when the body carries one, else a
    /// generic description derived from the status.
    async fn endpoint_error(response: reqwest::Response) -> BackendError {
        let status = response.status();
        let fallback = format!("The agent request failed ({status}).");
        let body = response.text().await.unwrap_or_default();
        let described = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or(fallback);
        BackendError::Endpoint(described)
    }
}

#[async_trait]
impl AgentBackend for AgentClient {
    async fn query(&self, prompt: &str) -> Result<AgentReply, BackendError> {
        tracing::info!("sending prompt to agent endpoint");
        let response = self
            .http
            .post(self.endpoint("/query"))
            .json(&QueryRequest { prompt })
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::endpoint_error(response).await);
        }
        response
            .json::<AgentReply>()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))
    }

    async fn graph_data(&self) -> Result<GraphSnapshot, BackendError> {
        tracing::info!("fetching graph snapshot");
        let response = self
            .http
            .post(self.endpoint("/get_graph_data"))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::endpoint_error(response).await);
        }
        let snapshot = response
            .json::<GraphSnapshot>()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        snapshot.validate().map_err(BackendError::Malformed)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_parses_with_all_diagnostic_fields() {
        let reply: AgentReply = serde_json::from_value(json!({
            "user_prompt": "Who wrote 1984?",
            "sparql_query": "SELECT ?authorName WHERE { ... }",
            "raw_query_results": [{"authorName": "George Orwell"}],
            "agent_response": "George Orwell wrote 1984.",
            "added_triples": "@prefix : <http://example.org/ontology/> ."
        }))
        .unwrap();

        assert_eq!(reply.agent_response, "George Orwell wrote 1984.");
        assert!(reply.sparql_query.is_some());
        assert_eq!(reply.raw_query_results.as_ref().unwrap().len(), 1);
        assert!(reply.added_triples.is_some());
    }

    #[test]
    fn reply_parses_with_answer_only() {
        let reply: AgentReply = serde_json::from_value(json!({
            "user_prompt": "gibberish",
            "agent_response": "I couldn't understand your request to form a query."
        }))
        .unwrap();

        assert_eq!(reply.sparql_query, None);
        assert_eq!(reply.raw_query_results, None);
        assert_eq!(reply.added_triples, None);
    }

    #[test]
    fn reply_without_required_answer_is_rejected() {
        let parsed = serde_json::from_value::<AgentReply>(json!({
            "sparql_query": "SELECT ..."
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn node_is_literal_defaults_to_false() {
        let node: GraphNode =
            serde_json::from_value(json!({"id": "book_1984", "name": "1984"})).unwrap();
        assert!(!node.is_literal);
    }

    #[test]
    fn snapshot_with_dangling_link_fails_validation() {
        let snapshot: GraphSnapshot = serde_json::from_value(json!({
            "nodes": [{"id": "a", "name": "A"}],
            "links": [{"source": "a", "target": "missing", "label": "rel"}]
        }))
        .unwrap();
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn snapshot_with_duplicate_node_id_fails_validation() {
        let snapshot = GraphSnapshot {
            nodes: vec![
                GraphNode {
                    id: "a".to_string(),
                    name: "A".to_string(),
                    is_literal: false,
                },
                GraphNode {
                    id: "a".to_string(),
                    name: "A again".to_string(),
                    is_literal: true,
                },
            ],
            links: vec![],
        };
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn well_formed_snapshot_passes_validation() {
        let snapshot: GraphSnapshot = serde_json::from_value(json!({
            "nodes": [
                {"id": "book_1984", "name": "1984"},
                {"id": "author_orwell", "name": "George Orwell"},
                {"id": "lit_0", "name": "1949", "isLiteral": true}
            ],
            "links": [
                {"source": "book_1984", "target": "author_orwell", "label": "author"},
                {"source": "book_1984", "target": "lit_0", "label": "publicationYear"}
            ]
        }))
        .unwrap();
        assert!(snapshot.validate().is_ok());
    }
}
