use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_backend_url() -> String {
    std::env::var("GRAPHCHAT_BACKEND_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string())
}

fn default_suggestions() -> Vec<String> {
    vec![
        "Who wrote the book '1984'?".to_string(),
        "List all authors and their nationalities.".to_string(),
        "Which books were written by British authors?".to_string(),
        "What are the genres of books published in 1945?".to_string(),
    ]
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub backend_url: String,
    pub request_timeout_secs: u64,
    pub suggested_prompts: Vec<String>,
    pub window_width: f64,
    pub window_height: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: 120,
            suggested_prompts: default_suggestions(),
            window_width: 960.0,
            window_height: 720.0,
        }
    }
}

pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    pub fn new(settings_path: PathBuf) -> Self {
        Self { settings_path }
    }

    pub fn load(&self) -> Settings {
        if !self.settings_path.exists() {
            return Settings::default();
        }

        fs::read_to_string(&self.settings_path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, settings: &Settings) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(settings)?;
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.settings_path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(dir.path().join("settings.json"));
        let settings = manager.load();
        assert_eq!(settings.request_timeout_secs, 120);
        assert!(!settings.suggested_prompts.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(dir.path().join("nested").join("settings.json"));

        let mut settings = Settings::default();
        settings.backend_url = "http://10.0.0.2:5000".to_string();
        settings.window_width = 1280.0;
        manager.save(&settings).unwrap();

        assert_eq!(manager.load(), settings);
    }

    #[test]
    fn resized_window_dimensions_survive_a_reload() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(dir.path().join("settings.json"));

        let mut settings = manager.load();
        manager.save(&settings).unwrap();

        // The user drags the window to a new size; the next launch must
        // open at that size, not the default.
        settings.window_width = 1440.0;
        settings.window_height = 900.0;
        manager.save(&settings).unwrap();

        let reloaded = manager.load();
        assert_eq!(reloaded.window_width, 1440.0);
        assert_eq!(reloaded.window_height, 900.0);
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json at all").unwrap();
        let manager = SettingsManager::new(path);
        assert_eq!(manager.load(), Settings::default());
    }
}
