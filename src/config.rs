//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/archdsl/archdsl.toml`
//! 3. Local config: `<dir>/.archdsl.toml`
//! 4. Environment variables: `ARCHDSL_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::eval::EvalError;

/// Evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of nested bodies (properties bodies included)
    pub max_depth: usize,
    /// Accept relative URI references such as `/docs/system`
    pub allow_relative_urls: bool,
    /// Fail the build on any diagnostic, not only on a missing workspace
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: 64,
            allow_relative_urls: true,
            strict: true,
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub max_depth: Option<usize>,
    pub allow_relative_urls: Option<bool>,
    pub strict: Option<bool>,
}

/// Get the XDG config directory for archdsl.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "archdsl").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("archdsl.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".archdsl.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, EvalError> {
    let content = std::fs::read_to_string(path).map_err(|e| EvalError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| EvalError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> EvalError {
    EvalError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins where specified.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
            allow_relative_urls: overlay
                .allow_relative_urls
                .unwrap_or(self.allow_relative_urls),
            strict: overlay.strict.unwrap_or(self.strict),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.archdsl.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, EvalError> {
        Self::load_layers(global_config_path().as_deref(), local_dir, None)
    }

    /// Load settings from explicit layers.
    ///
    /// # Arguments
    /// * `global_path` - Global config file, skipped when absent
    /// * `local_dir` - Optional directory holding a `.archdsl.toml`
    /// * `env` - Variables for the `ARCHDSL_*` layer; `None` reads the process environment
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, EvalError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!(path = %local_path.display(), "loading local config");
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current, env)?;
        current.validate()?;
        Ok(current)
    }

    /// Load a single file on top of the defaults, ignoring other layers.
    pub fn load_file(path: &Path) -> Result<Self, EvalError> {
        let settings = Self::default().merge_with(&load_raw_settings(path)?);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply ARCHDSL_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<Map<String, String>>,
    ) -> Result<Self, EvalError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ARCHDSL")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("max_depth") {
            settings.max_depth = val;
        }
        if let Ok(val) = config.get_bool("allow_relative_urls") {
            settings.allow_relative_urls = val;
        }
        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), EvalError> {
        if self.max_depth == 0 {
            return Err(EvalError::Config {
                message: "max_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, EvalError> {
        toml::to_string_pretty(self).map_err(|e| EvalError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# archdsl configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/archdsl/archdsl.toml
#   Local:  <dir>/.archdsl.toml
#   Env:    ARCHDSL_* environment variables

# Maximum nesting of DSL bodies
# max_depth = 64

# Accept relative URLs such as "/docs/system"
# allow_relative_urls = true

# Fail builds on any diagnostic
# strict = true
"#
        .to_string()
    }
}
