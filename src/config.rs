use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Which request shape is sent upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Single instruction string against the legacy `/completions` endpoint.
    Completion,
    /// System + user messages against `/chat/completions`.
    #[default]
    Chat,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub style: PromptStyle,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Name of the environment variable holding the bearer credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            model: default_model(),
            style: PromptStyle::default(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 900,
            height: 700,
            min_width: 500,
            min_height: 400,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = Self::get_config_path();

        if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match Self::parse(&contents) {
                    Ok(config) => return config,
                    Err(e) => warn!("Error parsing {}: {}. Using defaults.", config_path.display(), e),
                },
                Err(e) => warn!("Error reading {}: {}. Using defaults.", config_path.display(), e),
            }
        } else if let Some(parent) = config_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        Config::default()
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The bearer credential, read from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn get_config_path() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/pitchpage/config.toml")
        } else {
            PathBuf::from("config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.base_url, "https://api.openai.com/v1");
        assert_eq!(config.api.model, "gpt-4o-mini");
        assert_eq!(config.api.style, PromptStyle::Chat);
        assert_eq!(config.api.max_tokens, 1024);
        assert!((config.api.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.window.width, 900);
    }

    #[test]
    fn test_partial_api_section() {
        let config = Config::parse(
            r#"
            [api]
            style = "completion"
            model = "gpt-3.5-turbo-instruct"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.style, PromptStyle::Completion);
        assert_eq!(config.api.model, "gpt-3.5-turbo-instruct");
        assert_eq!(config.api.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_partial_window_section_keeps_api_settings() {
        let config = Config::parse("[api]\nstyle = \"completion\"\n[window]\nwidth = 1200\n").unwrap();
        assert_eq!(config.api.style, PromptStyle::Completion);
        assert_eq!(config.window.width, 1200);
        assert_eq!(config.window.height, 700);
        assert_eq!(config.window.min_width, 500);
    }

    #[test]
    fn test_unknown_style_is_rejected() {
        assert!(Config::parse("[api]\nstyle = \"edit\"\n").is_err());
    }

    #[test]
    fn test_api_key_from_env() {
        let mut config = Config::default();
        config.api.api_key_env = "PITCHPAGE_TEST_KEY_PRESENT".to_string();
        std::env::set_var("PITCHPAGE_TEST_KEY_PRESENT", "sk-test");
        assert_eq!(config.api_key().as_deref(), Some("sk-test"));

        config.api.api_key_env = "PITCHPAGE_TEST_KEY_BLANK".to_string();
        std::env::set_var("PITCHPAGE_TEST_KEY_BLANK", "  ");
        assert_eq!(config.api_key(), None);

        config.api.api_key_env = "PITCHPAGE_TEST_KEY_MISSING".to_string();
        assert_eq!(config.api_key(), None);
    }
}
