pub mod safety;

use crate::core::error::{GemtermError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use safety::{HarmCategory, SafetySettingEntry, SafetyThreshold};

/// API key value shipped in the sample config; startup refuses to run with it.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_GEMINI_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const CONFIG_FILE_NAME: &str = "keys.json";
const APP_DIR_NAME: &str = "gemterm";
const LOCAL_CONFIG_DIR: &str = "Gemini_Ai_Config";

/// Sampling and output parameters forwarded to `generationConfig`.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<i32>,
    pub max_output_tokens: Option<i32>,
    pub response_mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "GEMINI_API_KEY")]
    pub api_key: String,
    #[serde(rename = "GEMINI_MODEL")]
    pub model: String,
    #[serde(rename = "SYSTEM_INSTRUCTION", default)]
    pub system_instruction: Option<String>,
    #[serde(rename = "GENERATION_CONFIG", default)]
    pub generation: GenerationSettings,
    #[serde(rename = "SAFETY_SETTINGS", default)]
    pub safety_settings: Vec<SafetySettingEntry>,
    #[serde(rename = "API_BASE_URL", default)]
    pub base_url: Option<String>,
}

impl Config {
    /// Finds the config file, reads it and validates it.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let path = locate(explicit)?;
        let config = Self::load_from(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| {
            GemtermError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let mut config = serde_json::from_str::<Config>(&contents)
            .map_err(|e| GemtermError::Config(format!("Parse {}: {}", path.display(), e)))?;
        // Stray whitespace around pasted values would end up in the request URL
        config.api_key = config.api_key.trim().to_string();
        config.model = config.model.trim().to_string();
        debug!(path = %path.display(), model = %config.model, "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() || self.api_key == PLACEHOLDER_API_KEY {
            return Err(GemtermError::Config(
                "GEMINI_API_KEY is not set, put your API key in the config file".to_string(),
            ));
        }
        if self.model.is_empty() {
            return Err(GemtermError::Config("GEMINI_MODEL is empty".to_string()));
        }
        Ok(())
    }

    /// The system instruction, if one is configured and not blank.
    pub fn system_instruction(&self) -> Option<&str> {
        self.system_instruction
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn thresholds(&self) -> [SafetyThreshold; 4] {
        safety::resolve_thresholds(&self.safety_settings)
    }
}

fn system_config_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var_os("ProgramData")
            .map(|dir| PathBuf::from(dir).join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }
    #[cfg(not(windows))]
    {
        Some(
            PathBuf::from("/etc")
                .join(APP_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        )
    }
}

/// Paths searched for the config file, in priority order: system-wide,
/// per-user, then relative to the working directory.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = system_config_path() {
        paths.push(path);
    }
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME));
    paths
}

pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(GemtermError::Config(format!(
            "Config file {} does not exist",
            path.display()
        ))),
        None => first_existing(&search_paths()),
    }
}

fn first_existing(candidates: &[PathBuf]) -> Result<PathBuf> {
    candidates
        .iter()
        .find(|path| path.is_file())
        .cloned()
        .ok_or_else(|| {
            let tried: Vec<String> = candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            GemtermError::Config(format!("No config file found (tried {})", tried.join(", ")))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const FULL_CONFIG: &str = r#"{
        "GEMINI_API_KEY": "k",
        "GEMINI_MODEL": "m",
        "SYSTEM_INSTRUCTION": "Answer in haiku.",
        "GENERATION_CONFIG": {
            "temperature": 0.5,
            "top_p": 0.9,
            "top_k": 10,
            "max_output_tokens": 2048,
            "response_mime_type": "text/plain"
        },
        "SAFETY_SETTINGS": [
            { "threshold": "BLOCK_ONLY_HIGH" },
            { "threshold": "BLOCK_NONE" },
            { "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
            { "threshold": "HARM_BLOCK_THRESHOLD_UNSPECIFIED" }
        ]
    }"#;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_full_config() {
        let file = write_config(FULL_CONFIG);
        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.api_key, "k");
        assert_eq!(config.model, "m");
        assert_eq!(config.system_instruction(), Some("Answer in haiku."));
        assert_eq!(config.generation.temperature, Some(0.5));
        assert_eq!(config.generation.top_p, Some(0.9));
        assert_eq!(config.generation.top_k, Some(10));
        assert_eq!(config.generation.max_output_tokens, Some(2048));
        assert_eq!(
            config.generation.response_mime_type.as_deref(),
            Some("text/plain")
        );
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);

        let ordinals: Vec<u8> = config.thresholds().iter().map(|t| t.ordinal()).collect();
        assert_eq!(ordinals, vec![3, 4, 2, 0]);
    }

    #[test]
    fn optional_sections_may_be_missing() {
        let file = write_config(
            r#"{ "GEMINI_API_KEY": "k", "GEMINI_MODEL": "m",
                 "GENERATION_CONFIG": { "temperature": 0.5, "top_p": 0.9, "top_k": 10 } }"#,
        );
        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.system_instruction(), None);
        assert_eq!(config.generation.max_output_tokens, None);
        assert_eq!(config.generation.response_mime_type, None);
        assert_eq!(config.thresholds(), [SafetyThreshold::MediumAndAbove; 4]);
    }

    #[test]
    fn blank_system_instruction_is_ignored() {
        let file = write_config(
            r#"{ "GEMINI_API_KEY": "k", "GEMINI_MODEL": "m", "SYSTEM_INSTRUCTION": "  " }"#,
        );
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.system_instruction(), None);
    }

    #[test]
    fn placeholder_key_is_rejected() {
        let file = write_config(
            r#"{ "GEMINI_API_KEY": "YOUR_GEMINI_API_KEY", "GEMINI_MODEL": "gemini-1.5-flash" }"#,
        );
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, GemtermError::Config(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn key_and_model_are_trimmed_on_load() {
        let file = write_config(
            r#"{ "GEMINI_API_KEY": "  abc123\n", "GEMINI_MODEL": " gemini-1.5-flash " }"#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.model, "gemini-1.5-flash");
    }

    #[test]
    fn whitespace_only_key_is_rejected() {
        let file = write_config(r#"{ "GEMINI_API_KEY": "   ", "GEMINI_MODEL": "m" }"#);
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let file = write_config("{ \"GEMINI_API_KEY\": ");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, GemtermError::Config(_)));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        let err = locate(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn search_takes_the_first_existing_path() {
        let dir = TempDir::new().unwrap();
        let system = dir.path().join("system.json");
        let local = dir.path().join("local.json");
        fs::write(&local, FULL_CONFIG).unwrap();

        let found = first_existing(&[system.clone(), local.clone()]).unwrap();
        assert_eq!(found, local);

        fs::write(&system, FULL_CONFIG).unwrap();
        let found = first_existing(&[system.clone(), local]).unwrap();
        assert_eq!(found, system);
    }

    #[test]
    fn search_failure_lists_every_path() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        let err = first_existing(&[a, b]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("a.json"));
        assert!(message.contains("b.json"));
    }

    #[test]
    fn local_path_is_searched_last() {
        let paths = search_paths();
        assert_eq!(
            paths.last().unwrap(),
            &PathBuf::from("Gemini_Ai_Config").join("keys.json")
        );
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let file = write_config(
            r#"{ "GEMINI_API_KEY": "k", "GEMINI_MODEL": "m", "API_BASE_URL": "http://localhost:8080/" }"#,
        );
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080");
    }
}
