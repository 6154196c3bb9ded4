#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use dioxus::desktop::tao::dpi::PhysicalSize;
use dioxus::desktop::tao::event::{Event, WindowEvent};
use dioxus::desktop::{use_window, use_wry_event_handler, Config, WindowBuilder};
use dioxus::prelude::*;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use graphchat::components::chat::ChatWindow;
use graphchat::components::graph_panel::{GraphPanel, GraphViewProvider};
use graphchat::services::agent::AgentClient;
use graphchat::session::SessionState;
use graphchat::settings::SettingsManager;

fn get_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_default()
        .join("com.graphchat.app")
        .join("settings.json")
}

fn main() {
    dotenv().ok();
    dioxus_logger::init(tracing::Level::INFO).expect("failed to init logger");

    // Window size comes from the persisted settings.
    let settings = SettingsManager::new(get_settings_path()).load();
    let initial_width = settings.window_width;
    let initial_height = settings.window_height;

    LaunchBuilder::new()
        .with_cfg(
            Config::new()
                .with_window(
                    WindowBuilder::new()
                        .with_title("GraphChat")
                        .with_resizable(true)
                        .with_inner_size(dioxus::desktop::tao::dpi::LogicalSize::new(
                            initial_width,
                            initial_height,
                        )),
                )
                .with_custom_head(
                    r#"<style>"#.to_string() + include_str!("../assets/style.css") + r#"</style>"#,
                ),
        )
        .launch(app);
}

fn app() -> Element {
    let window = use_window();
    let mut settings = use_context_provider(|| {
        Signal::new(SettingsManager::new(get_settings_path()).load())
    });
    use_context_provider(|| Signal::new(SessionState::new()));
    use_context_provider(move || {
        let settings = settings.read();
        Arc::new(AgentClient::new(
            settings.backend_url.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        ))
    });

    // This handler continuously updates the last known size during a resize.
    let mut last_known_size = use_signal(|| PhysicalSize::new(0u32, 0u32));
    use_wry_event_handler(move |event, _| {
        if let Event::WindowEvent { event, .. } = event {
            if let WindowEvent::Resized(new_size) = event {
                last_known_size.set(*new_size);
            }
        }
    });

    // When the user releases the mouse, persist the last known size.
    let persist_window_size = {
        let window = window.clone();
        move || {
            let physical_size = *last_known_size.read();
            if physical_size.width == 0 || physical_size.height == 0 {
                return;
            }
            let logical_size = physical_size.to_logical::<f64>(window.scale_factor());
            let mut settings = settings.write();
            if settings.window_width != logical_size.width
                || settings.window_height != logical_size.height
            {
                settings.window_width = logical_size.width;
                settings.window_height = logical_size.height;
                if let Err(e) = SettingsManager::new(get_settings_path()).save(&settings) {
                    tracing::error!("Failed to save settings after resize: {}", e);
                }
            }
        }
    };
    let mut persist_on_mouseup = persist_window_size.clone();
    let mut persist_on_mouseleave = persist_window_size;

    rsx! {
        GraphViewProvider {
            div {
                class: "flex h-full w-full bg-gray-900",
                onmouseup: move |_| persist_on_mouseup(),
                onmouseleave: move |_| persist_on_mouseleave(),
                div {
                    class: "flex-1 min-w-0 h-full",
                    ChatWindow {}
                }
                GraphPanel {}
            }
        }
    }
}
