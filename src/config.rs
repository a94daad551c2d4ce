//! Configuration management for navi-guide.
//!
//! Loads config from YAML files in standard locations. Every section has
//! defaults, so a missing file or missing keys fall back to the values
//! the guide was designed around (Groq llama3-70b, Canadian English).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{NaviError, NaviResult};
use crate::locale::{Language, Region};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".into(),
            model: "llama3-70b-8192".into(),
            api_key_env: "GROQ_API_KEY".into(),
            temperature: 1.0,
            max_tokens: 1024,
            top_p: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Top-level domain selecting the accent of the Google voice.
    pub tld: String,
    pub pitch_ratio: f32,
    /// Override for the TTS host. Empty means `https://translate.google.{tld}`.
    pub tts_host: String,
    pub chunk_chars: usize,
    /// Where rendered WAV files go. Unset means the system temp directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            tld: "ca".into(),
            pitch_ratio: 0.95,
            tts_host: String::new(),
            chunk_chars: 100,
            output_dir: None,
        }
    }
}

impl SpeechConfig {
    pub fn host(&self) -> String {
        if self.tts_host.is_empty() {
            format!("https://translate.google.{}", self.tld)
        } else {
            self.tts_host.trim_end_matches('/').to_string()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 7860,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub enabled: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub language: Language,
    pub region: Region,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub completion: CompletionConfig,
    pub speech: SpeechConfig,
    pub server: ServerConfig,
    pub playback: PlaybackConfig,
    pub locale: LocaleConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/navi-guide/config.yaml
    /// 3. /etc/navi-guide/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/navi-guide/config.yaml")),
                Some(PathBuf::from("/etc/navi-guide/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(contents)
    }

    /// Read the completion API key from the configured environment variable.
    ///
    /// Called once at startup; a missing or blank key stops the service
    /// before any model call can be attempted.
    pub fn api_key(&self) -> NaviResult<String> {
        let var = &self.completion.api_key_env;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            Ok(_) => Err(NaviError::Configuration(format!("{var} is set but empty"))),
            Err(_) => Err(NaviError::Configuration(format!("{var} is not set"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::parse("{}").unwrap();
        assert_eq!(config.completion.model, "llama3-70b-8192");
        assert_eq!(config.completion.max_tokens, 1024);
        assert_eq!(config.completion.temperature, 1.0);
        assert_eq!(config.completion.top_p, 1.0);
        assert_eq!(config.speech.tld, "ca");
        assert_eq!(config.locale.language, Language::English);
        assert_eq!(config.locale.region, Region::Canada);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let yaml = "completion:\n  model: llama-3.3-70b-versatile\nlocale:\n  region: USA\n  language: French\n";
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.completion.model, "llama-3.3-70b-versatile");
        assert_eq!(config.completion.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.locale.region, Region::Usa);
        assert_eq!(config.locale.language, Language::French);
        assert_eq!(config.server.port, 7860);
    }

    #[test]
    fn speech_host_defaults_to_tld() {
        let mut speech = SpeechConfig::default();
        assert_eq!(speech.host(), "https://translate.google.ca");
        speech.tts_host = "http://127.0.0.1:9000/".into();
        assert_eq!(speech.host(), "http://127.0.0.1:9000");
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let mut config = Config::default();
        config.completion.api_key_env = "NAVI_GUIDE_TEST_KEY_THAT_IS_NEVER_SET".into();
        let err = config.api_key().unwrap_err();
        assert!(matches!(err, NaviError::Configuration(_)));
    }

    #[test]
    fn blank_api_key_is_a_configuration_error() {
        let mut config = Config::default();
        config.completion.api_key_env = "NAVI_GUIDE_TEST_BLANK_KEY".into();
        std::env::set_var("NAVI_GUIDE_TEST_BLANK_KEY", "   ");
        let err = config.api_key().unwrap_err();
        assert!(matches!(&err, NaviError::Configuration(m) if m.contains("set but empty")));

        std::env::set_var("NAVI_GUIDE_TEST_BLANK_KEY", "  gsk_test \n");
        assert_eq!(config.api_key().unwrap(), "gsk_test");
        std::env::remove_var("NAVI_GUIDE_TEST_BLANK_KEY");
    }
}
