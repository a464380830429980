//! Runtime configuration file parsing.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runner::dispatch::DefaultsMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Call-site dispatch tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Distinct receiver shapes a call site caches before going megamorphic.
    pub inline_cache_limit: usize,
    /// How omitted defaulted arguments are handled.
    pub defaults: DefaultsMode,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            inline_cache_limit: 3,
            defaults: DefaultsMode::Execute,
        }
    }
}

/// Embedded guest language settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolyglotConfig {
    pub default_language: String,
    /// Extra language id aliases, e.g. `r = "R"`.
    pub aliases: BTreeMap<String, String>,
}

impl Default for PolyglotConfig {
    fn default() -> Self {
        PolyglotConfig {
            default_language: "calc".to_string(),
            aliases: BTreeMap::new(),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub dispatch: DispatchConfig,
    pub polyglot: PolyglotConfig,
}

impl RuntimeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Expected format:
    /// ```toml
    /// [dispatch]
    /// inline_cache_limit = 3
    /// defaults = "execute"
    ///
    /// [polyglot]
    /// default_language = "calc"
    /// [polyglot.aliases]
    /// r = "R"
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.inline_cache_limit == 0 {
            return Err(ConfigError::Invalid(
                "dispatch.inline_cache_limit must be at least 1".to_string(),
            ));
        }
        if self.polyglot.default_language.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "polyglot.default_language must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
