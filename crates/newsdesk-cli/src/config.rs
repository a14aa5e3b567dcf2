//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use newsdesk_content::ContentConfig;
use newsdesk_domain::ProviderKind;
use newsdesk_extractor::ExtractorConfig;
use newsdesk_llm::ProviderSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const REDACTED: &str = "********";

/// CLI configuration, stored at `~/.newsdesk/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// LLM backends
    #[serde(default)]
    pub providers: ProviderSettings,

    /// Extraction pipeline
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Article page fetching
    #[serde(default)]
    pub content: ContentConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Backend used when `--provider` is not given
    #[serde(default = "default_provider")]
    pub default_provider: ProviderKind,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".newsdesk").join("config.toml"))
    }

    /// Load configuration from `path`, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Check values the TOML types cannot express.
    pub fn validate(&self) -> Result<()> {
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(format!("[extractor] {}", e)))?;
        if self.content.timeout_secs == 0 {
            return Err(CliError::Config("[content] timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Copy with API keys masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.providers.openai.api_key.is_some() {
            config.providers.openai.api_key = Some(REDACTED.to_string());
        }
        if config.providers.gemini.api_key.is_some() {
            config.providers.gemini.api_key = Some(REDACTED.to_string());
        }
        config
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            default_provider: ProviderKind::OpenAi,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_provider() -> ProviderKind {
    ProviderKind::OpenAi
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.settings.default_provider, ProviderKind::OpenAi);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.settings.default_provider = ProviderKind::Ollama;
        config.extractor.fuzzy_match_threshold = 0.9;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[settings]").unwrap();
        writeln!(file, "format = \"json\"").unwrap();
        writeln!(file, "default_provider = \"gemini\"").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "[providers.gemini]").unwrap();
        writeln!(file, "model = \"gemini-1.5-pro\"").unwrap();

        let loaded = Config::load_from(file.path()).unwrap();
        assert_eq!(loaded.settings.format, OutputFormat::Json);
        assert_eq!(loaded.settings.default_provider, ProviderKind::Gemini);
        assert!(loaded.settings.color);
        assert_eq!(loaded.providers.gemini.model, "gemini-1.5-pro");
        assert_eq!(loaded.extractor, ExtractorConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[extractor]").unwrap();
        writeln!(file, "fuzzy_match_threshold = 2.0").unwrap();

        let result = Config::load_from(file.path());
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[settings").unwrap();

        let result = Config::load_from(file.path());
        assert!(matches!(result, Err(CliError::Toml(_))));
    }

    #[test]
    fn test_redacted_hides_keys() {
        let mut config = Config::default();
        config.providers.openai.api_key = Some("sk-secret".to_string());

        let shown = config.redacted().to_toml().unwrap();
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains(REDACTED));
    }
}
