use crate::checker::tokenizer::DEFAULT_WORD_BREAKERS;
use crate::document::DEFAULT_HISTORY_LIMIT;
use crate::parser::SpanClass;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: String,
    pub personal_dictionary: Option<PathBuf>,
    pub ignore_patterns: Vec<String>,
    pub max_suggestions: usize,
    pub case_sensitive: bool,

    /// Delay between reconciliation ticks.
    pub tick_interval_ms: u64,
    pub word_breakers: String,
    /// Classes whose text is spell-checked.
    pub natural_language: Vec<SpanClass>,
    /// Document versions kept for translating old ranges.
    pub history_limit: usize,
    pub recheck_on_classification_change: bool,
}

/// The keys one config file sets. Unset keys keep the value of the layer below.
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    language: Option<String>,
    personal_dictionary: Option<PathBuf>,
    ignore_patterns: Option<Vec<String>>,
    max_suggestions: Option<usize>,
    case_sensitive: Option<bool>,
    tick_interval_ms: Option<u64>,
    word_breakers: Option<String>,
    natural_language: Option<Vec<SpanClass>>,
    history_limit: Option<usize>,
    recheck_on_classification_change: Option<bool>,
}

impl ConfigLayer {
    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

fn default_max_suggestions() -> usize {
    5
}

fn default_tick_interval_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en_US".to_string(),
            personal_dictionary: None,
            ignore_patterns: vec![
                r"\b[A-Z0-9_]{2,}\b".to_string(),    // ALL_CAPS
                r"https?://\S+".to_string(),         // URLs
                r"\b[a-fA-F0-9]{32,}\b".to_string(), // Hashes
                r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}".to_string(), // Emails
            ],
            max_suggestions: default_max_suggestions(),
            case_sensitive: false,
            tick_interval_ms: default_tick_interval_ms(),
            word_breakers: DEFAULT_WORD_BREAKERS.to_string(),
            natural_language: vec![SpanClass::Comment, SpanClass::String],
            history_limit: DEFAULT_HISTORY_LIMIT,
            recheck_on_classification_change: false,
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        language: Option<String>,
        personal_dict: Option<PathBuf>,
        cli_patterns: Vec<String>,
    ) -> Result<Self> {
        let global = Self::global_config_path().filter(|path| path.exists());
        let local = Some(PathBuf::from(".livespell.toml")).filter(|path| path.exists());
        let mut config = Self::layered(global.as_deref(), local.as_deref())?;

        if let Some(language) = language {
            config.language = language;
        }
        if let Some(dict) = personal_dict {
            config.personal_dictionary = Some(dict);
        }
        if !cli_patterns.is_empty() {
            config.ignore_patterns.extend(cli_patterns);
        }

        if config.personal_dictionary.is_none() {
            config.personal_dictionary = Self::default_personal_dict_path();
        }

        if let Some(path) = &config.personal_dictionary {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .context("Failed to create personal dictionary directory")?;
            }
            if !path.exists() {
                fs::write(path, "").context("Failed to create personal dictionary file")?;
            }
        }

        Ok(config)
    }

    /// Defaults, then the global file, then the local file.
    fn layered(global: Option<&Path>, local: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        for path in [global, local].into_iter().flatten() {
            tracing::debug!(path = %path.display(), "applying config file");
            config = config.merge(ConfigLayer::read(path)?);
        }
        Ok(config)
    }

    /// A single file laid over the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::layered(Some(path), None)
    }

    fn merge(mut self, layer: ConfigLayer) -> Self {
        if let Some(language) = layer.language {
            self.language = language;
        }
        if let Some(dict) = layer.personal_dictionary {
            self.personal_dictionary = Some(dict);
        }
        if let Some(patterns) = layer.ignore_patterns {
            self.ignore_patterns = patterns;
        }
        if let Some(max) = layer.max_suggestions {
            self.max_suggestions = max;
        }
        if let Some(case_sensitive) = layer.case_sensitive {
            self.case_sensitive = case_sensitive;
        }
        if let Some(ms) = layer.tick_interval_ms {
            self.tick_interval_ms = ms;
        }
        if let Some(breakers) = layer.word_breakers {
            self.word_breakers = breakers;
        }
        if let Some(classes) = layer.natural_language {
            self.natural_language = classes;
        }
        if let Some(limit) = layer.history_limit {
            self.history_limit = limit;
        }
        if let Some(recheck) = layer.recheck_on_classification_change {
            self.recheck_on_classification_change = recheck;
        }
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "livespell").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_personal_dict_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "livespell").map(|dirs| dirs.config_dir().join("personal.txt"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "livespell").map(|dirs| dirs.data_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.language, "en_US");
        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.natural_language, vec![SpanClass::Comment, SpanClass::String]);
        assert!(!config.case_sensitive);
    }

    #[test]
    fn test_merge_keeps_unset_keys() {
        let base = Config {
            case_sensitive: true,
            recheck_on_classification_change: true,
            max_suggestions: 9,
            ..Config::default()
        };
        let layer = ConfigLayer {
            language: Some("en_GB".to_string()),
            tick_interval_ms: Some(50),
            max_suggestions: Some(5),
            ..Default::default()
        };

        let merged = base.merge(layer);
        assert_eq!(merged.language, "en_GB");
        assert_eq!(merged.tick_interval_ms, 50);
        assert_eq!(merged.max_suggestions, 5);
        assert!(merged.case_sensitive);
        assert!(merged.recheck_on_classification_change);
    }

    #[test]
    fn test_local_overrides_global() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");
        fs::write(&global, "language = \"en_GB\"\ncase_sensitive = true\nmax_suggestions = 3\n").unwrap();
        fs::write(&local, "max_suggestions = 7\n").unwrap();

        let config = Config::layered(Some(&global), Some(&local)).unwrap();
        assert_eq!(config.language, "en_GB");
        assert!(config.case_sensitive);
        assert_eq!(config.max_suggestions, 7);

        let config = Config::layered(None, Some(&local)).unwrap();
        assert_eq!(config.language, "en_US");
        assert!(!config.case_sensitive);
    }

    #[test]
    fn test_partial_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "tick_interval_ms = 250\nnatural_language = [\"comment\"]\nword_breakers = \" .\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.natural_language, vec![SpanClass::Comment]);
        assert_eq!(config.word_breakers, " .");
        assert_eq!(config.language, "en_US");
    }
}
