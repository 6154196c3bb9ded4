#![allow(non_snake_case)]
use dioxus::prelude::*;
use dioxus_free_icons::{icons::fi_icons, Icon};
use std::sync::Arc;

use super::chat::CodeBlock;
use super::graph_panel::GraphViewContext;
use crate::services::agent::AgentClient;
use crate::session::AgentDetails;

#[derive(Props, Clone, PartialEq)]
pub struct QueryDetailsProps {
    pub details: AgentDetails,
}

/// Collapsible diagnostics under an agent answer: the generated SPARQL
/// query, the raw query results, and any facts the agent added to the
/// graph, plus the side-action that opens the graph view.
#[component]
pub fn QueryDetails(props: QueryDetailsProps) -> Element {
    let mut show_query = use_signal(|| false);
    let mut show_results = use_signal(|| false);
    let mut show_facts = use_signal(|| false);

    let graph = use_context::<GraphViewContext>();
    let client = use_context::<Arc<AgentClient>>();

    let details = props.details;
    if details.is_empty() {
        return rsx! {};
    }

    let results_json = details.raw_results.as_ref().map(|rows| {
        serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string())
    });

    rsx! {
        div {
            class: "flex flex-col mt-1 p-2 border border-gray-700 rounded-lg bg-gray-800 text-sm space-y-1",
            if let Some(query) = details.generated_query.clone() {
                div {
                    class: "flex flex-col",
                    button {
                        class: "flex items-center gap-1 text-sm font-semibold text-gray-400 hover:text-gray-200",
                        onclick: move |_| show_query.toggle(),
                        if *show_query.read() {
                            Icon { width: 16, height: 16, icon: fi_icons::FiChevronDown }
                        } else {
                            Icon { width: 16, height: 16, icon: fi_icons::FiChevronRight }
                        }
                        "Generated query"
                    }
                    if *show_query.read() {
                        CodeBlock {
                            code: query,
                            lang: "sparql".to_string()
                        }
                    }
                }
            }
            if let Some(json) = results_json {
                div {
                    class: "flex flex-col",
                    button {
                        class: "flex items-center gap-1 text-sm font-semibold text-gray-400 hover:text-gray-200",
                        onclick: move |_| show_results.toggle(),
                        if *show_results.read() {
                            Icon { width: 16, height: 16, icon: fi_icons::FiChevronDown }
                        } else {
                            Icon { width: 16, height: 16, icon: fi_icons::FiChevronRight }
                        }
                        "Raw results"
                    }
                    if *show_results.read() {
                        CodeBlock {
                            code: json,
                            lang: "json".to_string()
                        }
                    }
                }
            }
            if let Some(facts) = details.added_facts.clone() {
                div {
                    class: "flex flex-col",
                    button {
                        class: "flex items-center gap-1 text-sm font-semibold text-gray-400 hover:text-gray-200",
                        onclick: move |_| show_facts.toggle(),
                        if *show_facts.read() {
                            Icon { width: 16, height: 16, icon: fi_icons::FiChevronDown }
                        } else {
                            Icon { width: 16, height: 16, icon: fi_icons::FiChevronRight }
                        }
                        "Added facts"
                    }
                    if *show_facts.read() {
                        CodeBlock {
                            code: facts,
                            lang: "turtle".to_string()
                        }
                    }
                }
            }
            button {
                class: "flex items-center gap-1 text-sm font-semibold text-purple-400 hover:text-purple-300",
                onclick: move |_| graph.show(client.clone()),
                Icon { width: 16, height: 16, icon: fi_icons::FiShare2 }
                "View knowledge graph"
            }
        }
    }
}
