use dioxus::prelude::*;
use dioxus_free_icons::{icons::fi_icons, Icon};
use futures_util::StreamExt;
use lazy_static::lazy_static;
use pulldown_cmark::{html, Options, Parser};
use std::sync::Arc;
use std::time::Duration;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use tokio::time::sleep;

use crate::clipboard::copy_to_clipboard;
use crate::components::graph_panel::GraphViewContext;
use crate::components::query_details::QueryDetails;
use crate::processing::orchestrator;
use crate::services::agent::AgentClient;
use crate::session::{Message, MessageKind, SessionState};
use crate::settings::Settings;

lazy_static! {
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
    static ref THEME: &'static Theme = &THEME_SET.themes["base16-ocean.dark"];
}

#[derive(Clone)]
enum ChatAction {
    Submit { text: String, is_suggested: bool },
}

// The main ChatWindow component
#[component]
pub fn ChatWindow() -> Element {
    let mut session_state = use_context::<Signal<SessionState>>();
    let client = use_context::<Arc<AgentClient>>();
    let graph = use_context::<GraphViewContext>();

    let client_for_graph = client.clone();

    let chat_coroutine = use_coroutine(move |mut rx: UnboundedReceiver<ChatAction>| {
        let client = client.clone();

        async move {
            while let Some(action) = rx.next().await {
                match action {
                    ChatAction::Submit { text, is_suggested } => {
                        orchestrator::submit(client.as_ref(), session_state, &text, is_suggested)
                            .await;
                    }
                }
            }
        }
    });

    // Keep the newest message in view once the DOM has rendered it.
    use_effect(move || {
        let _ = session_state.read();
        spawn(async move {
            sleep(Duration::from_millis(20)).await;
            let _ = document::eval(
                r#"
                const el = document.getElementById('message-list');
                if (el) { el.scrollTop = el.scrollHeight; }
            "#,
            )
            .await;
        });
    });

    let is_pending = session_state.read().is_pending();
    let draft = session_state.read().draft.clone();

    let submit_draft = move || {
        let text = session_state.read().draft.clone();
        if !text.trim().is_empty() {
            chat_coroutine.send(ChatAction::Submit {
                text,
                is_suggested: false,
            });
        }
    };
    let submit_on_click = submit_draft.clone();
    let submit_on_enter = submit_draft;

    rsx! {
        div {
            class: "flex flex-col bg-gray-900 text-gray-100 h-full w-full",
            div {
                class: "flex items-center justify-between p-4 border-b border-gray-700 flex-shrink-0",
                span { class: "text-lg font-semibold", "Knowledge Graph Agent" }
                div {
                    class: "flex items-center space-x-2",
                    button {
                        class: "p-2 rounded-full text-gray-400 hover:bg-gray-700 hover:text-white focus:outline-none",
                        title: "Toggle graph view",
                        onclick: move |_| {
                            if graph.is_open() {
                                graph.hide();
                            } else {
                                graph.show(client_for_graph.clone());
                            }
                        },
                        Icon { width: 20, height: 20, icon: fi_icons::FiShare2 }
                    }
                    button {
                        class: "p-2 rounded-full text-gray-400 hover:bg-gray-700 hover:text-white focus:outline-none",
                        title: "New conversation",
                        onclick: move |_| {
                            session_state.write().clear();
                        },
                        Icon { width: 20, height: 20, icon: fi_icons::FiPlus }
                    }
                }
            }
            div {
                id: "message-list",
                class: "flex-1 overflow-y-auto p-4 space-y-4 min-h-0",
                {
                    let state = session_state.read();
                    if state.transcript().is_empty() {
                        rsx! {
                            WelcomeMessage {
                                on_suggest: move |prompt: String| {
                                    chat_coroutine.send(ChatAction::Submit {
                                        text: prompt,
                                        is_suggested: true,
                                    });
                                }
                            }
                        }
                    } else {
                        rsx! {
                            for message in state.transcript().iter() {
                                MessageBubble {
                                    key: "{message.id}",
                                    message: message.clone()
                                }
                            }
                        }
                    }
                }
                if is_pending {
                    div {
                        class: "flex justify-start",
                        div {
                            class: "px-4 py-2 rounded-2xl bg-gray-700 text-gray-200",
                            ThinkingIndicator {}
                        }
                    }
                }
            }
            div {
                class: "p-4 border-t border-gray-700 flex-shrink-0",
                div {
                    class: "flex items-center space-x-3",
                    textarea {
                        id: "chat-textarea",
                        class: "flex-1 py-2 px-4 rounded-xl bg-gray-800 border border-gray-700 text-gray-100 placeholder-gray-500 focus:outline-none resize-none",
                        rows: "1",
                        placeholder: "Ask the knowledge graph...",
                        value: "{draft}",
                        oninput: move |event| {
                            session_state.write().draft = event.value();
                        },
                        onkeydown: move |event| {
                            let modifiers = event.data.modifiers();
                            if modifiers.contains(Modifiers::SUPER)
                                || modifiers.contains(Modifiers::CONTROL)
                                || modifiers.contains(Modifiers::ALT)
                            {
                                return;
                            }
                            // Plain Enter submits; Shift+Enter inserts a newline.
                            if event.key() == Key::Enter && !modifiers.contains(Modifiers::SHIFT) {
                                event.prevent_default();
                                submit_on_enter();
                            }
                        },
                    }
                    button {
                        class: "px-5 py-2 bg-purple-600 rounded-full text-white font-semibold hover:bg-purple-700 focus:outline-none disabled:opacity-50",
                        disabled: is_pending,
                        onclick: move |_| submit_on_click(),
                        "Send"
                    }
                }
            }
        }
    }
}

#[component]
pub fn CodeBlock(code: String, lang: String) -> Element {
    let mut copied = use_signal(|| false);

    let code_to_copy = code.clone();
    let copy_onclick = move |_| {
        let code_to_copy = code_to_copy.clone();
        spawn(async move {
            match copy_to_clipboard(&code_to_copy) {
                Ok(_) => {
                    copied.set(true);
                    sleep(Duration::from_secs(2)).await;
                    copied.set(false);
                }
                Err(e) => {
                    tracing::error!("CodeBlock copy failed: {}", e);
                }
            }
        });
    };

    let lang_for_memo = lang.clone();
    let highlighted_html = use_memo(move || {
        let syntax = SYNTAX_SET
            .find_syntax_by_token(&lang_for_memo)
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &THEME);
        let mut out = String::new();
        for line in code.lines() {
            let regions = highlighter
                .highlight_line(line, &SYNTAX_SET)
                .unwrap_or_default();
            match styled_line_to_highlighted_html(&regions, IncludeBackground::No) {
                Ok(html_line) => out.push_str(&html_line),
                Err(_) => out.push_str(line),
            }
            out.push('\n');
        }
        if out.ends_with('\n') {
            out.pop();
        }
        out
    });

    rsx! {
        div {
            class: "relative bg-gray-800 rounded-lg my-2",
            button {
                class: "absolute top-2 right-2 p-1 rounded text-gray-400 hover:bg-gray-700 hover:text-white",
                onclick: copy_onclick,
                if *copied.read() {
                    Icon { width: 16, height: 16, icon: fi_icons::FiCheck }
                } else {
                    Icon { width: 16, height: 16, icon: fi_icons::FiClipboard }
                }
            }
            pre {
                class: "p-4 overflow-x-auto text-sm",
                code {
                    class: "language-{lang}",
                    dangerous_inner_html: "{highlighted_html}"
                }
            }
        }
    }
}

// Sub-component for styling individual messages
#[component]
fn MessageBubble(message: Message) -> Element {
    let is_user = message.kind == MessageKind::User;
    let is_error = message.kind == MessageKind::Error;

    let bubble_classes = match message.kind {
        MessageKind::User => "bg-purple-600 text-white self-end ml-auto",
        MessageKind::Agent => "bg-gray-700 text-gray-200 self-start mr-auto",
        MessageKind::Error => "bg-red-900 text-red-200 self-start mr-auto",
    };
    let container_classes = if is_user { "flex justify-end" } else { "flex justify-start" };
    let author = match message.kind {
        MessageKind::User => {
            if message.is_suggested {
                "You (suggested)"
            } else {
                "You"
            }
        }
        MessageKind::Agent => "Agent",
        MessageKind::Error => "Error",
    };
    let author_classes = format!(
        "text-xs text-gray-500 mt-1 px-2 {}",
        if is_user { "text-right" } else { "text-left" }
    );

    let rendered_answer = use_memo({
        let message = message.clone();
        move || {
            if message.kind != MessageKind::Agent {
                return String::new();
            }
            let mut options = Options::empty();
            options.insert(Options::ENABLE_STRIKETHROUGH);
            let parser = Parser::new_ext(&message.text, options);
            let mut out = String::new();
            html::push_html(&mut out, parser);
            out
        }
    });

    rsx! {
        div {
            class: "{container_classes}",
            div {
                class: "flex flex-col max-w-md",
                div {
                    class: "px-4 py-2 rounded-2xl {bubble_classes}",
                    if message.kind == MessageKind::Agent {
                        div {
                            class: "prose max-w-none",
                            dangerous_inner_html: "{rendered_answer}"
                        }
                    } else {
                        "{message.text}"
                    }
                    if is_error {
                        div {
                            class: "flex items-center space-x-2 text-xs mt-1",
                            Icon { width: 14, height: 14, icon: fi_icons::FiAlertTriangle }
                            span { "The conversation can continue." }
                        }
                    }
                }
                if let Some(details) = message.details.clone() {
                    QueryDetails { details }
                }
                div {
                    class: "{author_classes}",
                    "{author} · {message.timestamp}"
                }
            }
        }
    }
}

#[component]
fn ThinkingIndicator() -> Element {
    rsx! {
        div {
            class: "flex items-center justify-center space-x-1",
            span { class: "w-2 h-2 bg-white rounded-full animate-pulse-fast" },
            span { class: "w-2 h-2 bg-white rounded-full animate-pulse-medium" },
            span { class: "w-2 h-2 bg-white rounded-full animate-pulse-slow" },
        }
    }
}

#[component]
fn WelcomeMessage(on_suggest: EventHandler<String>) -> Element {
    let settings = use_context::<Signal<Settings>>();
    let suggestions = settings.read().suggested_prompts.clone();

    rsx! {
        div {
            class: "flex flex-col items-center justify-center h-full text-gray-500 space-y-4",
            Icon { width: 64, height: 64, icon: fi_icons::FiMessageCircle }
            p {
                class: "text-lg",
                "Ask the knowledge graph anything"
            }
            div {
                class: "flex flex-col items-center space-y-2",
                for suggestion in suggestions {
                    button {
                        class: "px-4 py-2 rounded-full border border-gray-700 text-gray-300 hover:bg-gray-700 hover:text-white text-sm",
                        onclick: {
                            let suggestion = suggestion.clone();
                            move |_| on_suggest.call(suggestion.clone())
                        },
                        "{suggestion}"
                    }
                }
            }
        }
    }
}
