//! TOML Configuration File Support
//!
//! Centralized configuration loading for the viewer, supporting a TOML file at
//! `~/.config/chuleta/config.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [corpus]
//! path = "/home/me/chuleta/corpus.json"
//!
//! [storage]
//! path = "/home/me/.local/share/chuleta/store.json"
//!
//! [speech]
//! program = "espeak-ng"
//! language = "en-GB"
//!
//! [quiz]
//! default_count = 15
//! sources = ["vocab", "phrasal", "idioms"]
//!
//! [presentation]
//! favorites_silent = ["adverbs", "connectors"]
//!
//! [presentation.speak_columns]
//! my_section = [0, 1]
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::PresentationPolicy;
use crate::speech::DEFAULT_LANGUAGE;
use crate::state::{DEFAULT_QUIZ_COUNT, DEFAULT_QUIZ_SOURCES, MAX_QUIZ_COUNT, MIN_QUIZ_COUNT};

/// Default speech program
pub const DEFAULT_SPEECH_PROGRAM: &str = "espeak-ng";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Corpus section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusToml {
    /// Corpus JSON file; the built-in corpus is used when absent
    pub path: Option<PathBuf>,
}

/// Storage section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageToml {
    /// Key-value store file
    pub path: Option<PathBuf>,
}

/// Speech section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechToml {
    /// Speech synthesizer program
    pub program: Option<String>,

    /// Language used when no voice is chosen
    pub language: Option<String>,
}

/// Quiz section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizToml {
    /// Initial question count in the quiz form
    pub default_count: Option<usize>,

    /// Sections offered as quiz sources
    pub sources: Option<Vec<String>>,
}

/// Presentation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationToml {
    /// Speak-column overrides keyed by section id
    pub speak_columns: BTreeMap<String, Vec<usize>>,
    /// Sections whose favorited terms get no speak affordance
    pub favorites_silent: Option<Vec<String>>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChuletaToml {
    /// Corpus configuration section
    pub corpus: CorpusToml,

    /// Storage configuration section
    pub storage: StorageToml,

    /// Speech configuration section
    pub speech: SpeechToml,

    /// Quiz configuration section
    pub quiz: QuizToml,

    /// Presentation configuration section
    pub presentation: PresentationToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved viewer configuration
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// Corpus file, `None` for the built-in corpus
    pub corpus_path: Option<PathBuf>,

    /// Key-value store file, `None` when no data directory is known
    pub store_path: Option<PathBuf>,

    /// Speech synthesizer program
    pub speech_program: String,

    /// Language used when no voice is chosen
    pub fallback_language: String,

    /// Initial question count
    pub quiz_count: usize,

    /// Offered quiz source sections
    pub quiz_sources: Vec<String>,

    /// Speak columns per section
    pub policy: PresentationPolicy,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            corpus_path: None,
            store_path: default_store_path(),
            speech_program: DEFAULT_SPEECH_PROGRAM.to_string(),
            fallback_language: DEFAULT_LANGUAGE.to_string(),
            quiz_count: DEFAULT_QUIZ_COUNT,
            quiz_sources: DEFAULT_QUIZ_SOURCES.iter().map(ToString::to_string).collect(),
            policy: PresentationPolicy::default(),
            config_file_path: None,
        }
    }
}

impl ViewerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_QUIZ_COUNT..=MAX_QUIZ_COUNT).contains(&self.quiz_count) {
            return Err(ConfigError::Validation(format!(
                "quiz.default_count must be between {MIN_QUIZ_COUNT} and {MAX_QUIZ_COUNT}, got {}",
                self.quiz_count
            )));
        }
        if self.quiz_sources.is_empty() {
            return Err(ConfigError::Validation(
                "quiz.sources must name at least one section".to_string(),
            ));
        }
        if self.speech_program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "speech.program must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/chuleta/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("chuleta").join("config.toml"))
}

/// Default key-value store file under the user data directory
#[must_use]
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("chuleta").join("store.json"))
}

/// Default log file under the user data directory
#[must_use]
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("chuleta").join("chuleta.log"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or a
/// value is out of range. A missing config file is not an error.
pub fn load_config() -> Result<ViewerConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ViewerConfig, ConfigError> {
    let mut config = ViewerConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::Read {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ChuletaToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, toml_config);
            config.config_file_path = Some(config_path.clone());

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ViewerConfig, toml: ChuletaToml) {
    if toml.corpus.path.is_some() {
        config.corpus_path = toml.corpus.path;
    }
    if toml.storage.path.is_some() {
        config.store_path = toml.storage.path;
    }
    if let Some(program) = toml.speech.program {
        config.speech_program = program;
    }
    if let Some(language) = toml.speech.language {
        config.fallback_language = language;
    }
    if let Some(count) = toml.quiz.default_count {
        config.quiz_count = count;
    }
    if let Some(sources) = toml.quiz.sources {
        config.quiz_sources = sources;
    }
    if !toml.presentation.speak_columns.is_empty() {
        config.policy = std::mem::take(&mut config.policy)
            .with_speak_columns(toml.presentation.speak_columns);
    }
    if let Some(silent) = toml.presentation.favorites_silent {
        config.policy = std::mem::take(&mut config.policy).with_favorites_silent(silent);
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut ViewerConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(path) = var("CHULETA_CORPUS").filter(|v| !v.is_empty()) {
        config.corpus_path = Some(PathBuf::from(path));
    }
    if let Some(path) = var("CHULETA_STORE").filter(|v| !v.is_empty()) {
        config.store_path = Some(PathBuf::from(path));
    }
    if let Some(program) = var("CHULETA_TTS_PROGRAM").filter(|v| !v.is_empty()) {
        config.speech_program = program;
    }
    if let Some(language) = var("CHULETA_TTS_LANG").filter(|v| !v.is_empty()) {
        config.fallback_language = language;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ViewerConfig::default();
        assert_eq!(config.corpus_path, None);
        assert_eq!(config.speech_program, "espeak-ng");
        assert_eq!(config.fallback_language, "en-GB");
        assert_eq!(config.quiz_count, 15);
        assert_eq!(config.quiz_sources, vec!["vocab", "phrasal", "idioms"]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            load_config_from_path(Some(PathBuf::from("/nonexistent/chuleta.toml"))).unwrap();
        assert!(config.config_file_path.is_none());
        assert_eq!(config.quiz_count, DEFAULT_QUIZ_COUNT);
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[corpus]
path = "/tmp/corpus.json"

[speech]
program = "espeak"
language = "en-US"

[quiz]
default_count = 20
sources = ["vocab"]

[presentation]
favorites_silent = ["tenses"]

[presentation.speak_columns]
tenses = [1, 0]
"#,
        );
        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.corpus_path, Some(PathBuf::from("/tmp/corpus.json")));
        assert_eq!(config.speech_program, "espeak");
        assert_eq!(config.fallback_language, "en-US");
        assert_eq!(config.quiz_count, 20);
        assert_eq!(config.quiz_sources, vec!["vocab"]);
        assert_eq!(config.policy.speak_columns("tenses"), &[0, 1]);
        assert_eq!(config.policy.speak_columns("vocab"), &[0]);
        assert!(!config.policy.favorite_term_speaks("tenses"));
        assert!(config.policy.favorite_term_speaks("adverbs"));
        assert_eq!(config.config_file_path, Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_partial_file() {
        let file = write_config("[speech]\nlanguage = \"en-US\"\n");
        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.fallback_language, "en-US");
        assert_eq!(config.speech_program, DEFAULT_SPEECH_PROGRAM);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let file = write_config("[quiz\ndefault_count = ");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_out_of_range_count_is_error() {
        let file = write_config("[quiz]\ndefault_count = 0\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_empty_sources_is_error() {
        let file = write_config("[quiz]\nsources = []\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = ViewerConfig::default();
        apply_toml_config(
            &mut config,
            toml::from_str("[speech]\nprogram = \"espeak\"\n").unwrap(),
        );
        apply_env_config(&mut config, |key| match key {
            "CHULETA_TTS_PROGRAM" => Some("say".to_string()),
            "CHULETA_CORPUS" => Some("/data/corpus.json".to_string()),
            "CHULETA_STORE" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.speech_program, "say");
        assert_eq!(config.corpus_path, Some(PathBuf::from("/data/corpus.json")));
        assert_eq!(config.store_path, default_store_path());
    }
}
