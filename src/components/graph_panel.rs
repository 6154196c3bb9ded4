#![allow(non_snake_case)]
use dioxus::prelude::*;
use dioxus_free_icons::{icons::fi_icons, Icon};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::processing::graph_view::{self, GraphViewState, GraphVisibility};
use crate::services::agent::AgentClient;

/// Fits the snapshot into the panel's canvas: a few hundred iterations of
/// a plain repulsion/spring pass, then a single draw. Layout is purely
/// presentational; the data on screen is exactly the validated snapshot.
const FORCE_LAYOUT_JS: &str = r#"
    const data = __GRAPH_DATA__;
    const canvas = document.getElementById('graph-canvas');
    if (canvas) {
        const ctx = canvas.getContext('2d');
        const w = canvas.width = canvas.clientWidth;
        const h = canvas.height = canvas.clientHeight;
        const nodes = data.nodes.map((n, i) => ({
            ...n,
            x: w / 2 + Math.cos(i * 2.4) * w / 4,
            y: h / 2 + Math.sin(i * 2.4) * h / 4,
            vx: 0, vy: 0,
        }));
        const byId = Object.fromEntries(nodes.map(n => [n.id, n]));
        for (let iter = 0; iter < 300; iter++) {
            for (const a of nodes) {
                for (const b of nodes) {
                    if (a === b) continue;
                    const dx = a.x - b.x, dy = a.y - b.y;
                    const d2 = dx * dx + dy * dy + 0.01;
                    const f = 800 / d2;
                    a.vx += dx * f; a.vy += dy * f;
                }
            }
            for (const l of data.links) {
                const s = byId[l.source], t = byId[l.target];
                const dx = t.x - s.x, dy = t.y - s.y;
                const d = Math.sqrt(dx * dx + dy * dy) + 0.01;
                const f = (d - 90) * 0.02;
                s.vx += dx / d * f; s.vy += dy / d * f;
                t.vx -= dx / d * f; t.vy -= dy / d * f;
            }
            for (const n of nodes) {
                n.vx += (w / 2 - n.x) * 0.002;
                n.vy += (h / 2 - n.y) * 0.002;
                n.x += n.vx * 0.5; n.y += n.vy * 0.5;
                n.vx *= 0.6; n.vy *= 0.6;
                n.x = Math.max(20, Math.min(w - 20, n.x));
                n.y = Math.max(20, Math.min(h - 20, n.y));
            }
        }
        ctx.clearRect(0, 0, w, h);
        ctx.font = '10px sans-serif';
        for (const l of data.links) {
            const s = byId[l.source], t = byId[l.target];
            ctx.strokeStyle = '#4b5563';
            ctx.beginPath();
            ctx.moveTo(s.x, s.y);
            ctx.lineTo(t.x, t.y);
            ctx.stroke();
            ctx.fillStyle = '#9ca3af';
            ctx.fillText(l.label, (s.x + t.x) / 2, (s.y + t.y) / 2);
        }
        for (const n of nodes) {
            ctx.beginPath();
            ctx.arc(n.x, n.y, 8, 0, Math.PI * 2);
            ctx.fillStyle = n.isLiteral ? '#f59e0b' : '#8b5cf6';
            ctx.fill();
            ctx.fillStyle = '#e5e7eb';
            ctx.fillText(n.name, n.x + 10, n.y + 3);
        }
    }
"#;

/// Owns the graph panel's state machine and runs its fetches. Handed out
/// through context so the side-action on agent messages and the header
/// toggle drive the same panel.
#[derive(Clone, Copy)]
pub struct GraphViewContext {
    state: Signal<GraphViewState>,
}

impl GraphViewContext {
    pub fn state(&self) -> Signal<GraphViewState> {
        self.state
    }

    pub fn is_open(&self) -> bool {
        !self.state.read().is_hidden()
    }

    /// Fetches a fresh snapshot. Re-entrancy and staleness are handled by
    /// the state machine, so firing this from anywhere is safe.
    pub fn show(self, backend: Arc<AgentClient>) {
        spawn(async move {
            graph_view::show(backend.as_ref(), self.state).await;
        });
    }

    pub fn hide(mut self) {
        self.state.write().hide();
    }
}

#[derive(Props, PartialEq, Clone)]
pub struct GraphViewProviderProps {
    children: Element,
}

#[component]
pub fn GraphViewProvider(props: GraphViewProviderProps) -> Element {
    let context = use_hook(|| GraphViewContext {
        state: Signal::new(GraphViewState::new()),
    });
    use_context_provider(|| context);
    rsx! { {props.children} }
}

#[component]
pub fn GraphPanel() -> Element {
    let graph = use_context::<GraphViewContext>();
    let client = use_context::<Arc<AgentClient>>();
    let state = graph.state();

    // Redraw the canvas whenever a new snapshot lands. The short delay
    // lets the DOM mount the canvas before the script looks it up.
    use_effect(move || {
        let snapshot_json = match state.read().visibility() {
            GraphVisibility::Shown(snapshot) => serde_json::to_string(snapshot).ok(),
            _ => None,
        };
        if let Some(json) = snapshot_json {
            spawn(async move {
                sleep(Duration::from_millis(20)).await;
                let _ = document::eval(&FORCE_LAYOUT_JS.replace("__GRAPH_DATA__", &json)).await;
            });
        }
    });

    let visibility = state.read().visibility().clone();
    if matches!(visibility, GraphVisibility::Hidden) {
        return rsx! {};
    }
    // A failed panel only closes; the state machine ignores show() from
    // Failed, so offering refresh there would be a dead control.
    let can_refresh = !matches!(visibility, GraphVisibility::Failed(_));

    rsx! {
        div {
            class: "flex flex-col w-96 h-full border-l border-gray-700 bg-gray-900 text-gray-100 flex-shrink-0",
            div {
                class: "flex items-center justify-between p-4 border-b border-gray-700",
                span { class: "text-lg font-semibold", "Knowledge Graph" }
                div {
                    class: "flex items-center space-x-2",
                    if can_refresh {
                        button {
                            class: "p-2 rounded-full text-gray-400 hover:bg-gray-700 hover:text-white focus:outline-none",
                            title: "Refresh graph",
                            onclick: move |_| graph.show(client.clone()),
                            Icon { width: 18, height: 18, icon: fi_icons::FiRefreshCw }
                        }
                    }
                    button {
                        class: "p-2 rounded-full text-gray-400 hover:bg-gray-700 hover:text-white focus:outline-none",
                        title: "Close graph",
                        onclick: move |_| graph.hide(),
                        Icon { width: 18, height: 18, icon: fi_icons::FiX }
                    }
                }
            }
            {match visibility {
                GraphVisibility::Loading => rsx! {
                    div {
                        class: "flex flex-1 items-center justify-center text-gray-500",
                        "Loading graph..."
                    }
                },
                GraphVisibility::Failed(description) => rsx! {
                    div {
                        class: "flex flex-col flex-1 items-center justify-center text-red-300 p-4 space-y-2",
                        Icon { width: 32, height: 32, icon: fi_icons::FiAlertTriangle }
                        p { class: "text-sm text-center", "{description}" }
                    }
                },
                GraphVisibility::Shown(_) => rsx! {
                    canvas {
                        id: "graph-canvas",
                        class: "flex-1 w-full min-h-0",
                    }
                },
                GraphVisibility::Hidden => rsx! {},
            }}
        }
    }
}
