//! Configuration for stubble (`stubble.toml`) and `tracing` setup.

use std::path::{Path, PathBuf};
use std::sync::Once;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod schema;

pub use schema::json_schema;

/// Tracing target used by the reflection engine.
pub const REFLECT_TARGET: &str = "stubble.reflect";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct StubbleConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reflection: ReflectionConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level for all stubble crates.
    ///
    /// Either a simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When disabled no subscriber is installed.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            // Anything else is treated as an `EnvFilter` directive string.
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: `level` merged with `RUST_LOG` when that is set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

/// Names of the types the reflection engine treats specially.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct ReflectionConfig {
    /// Universal root type. Ancestor walks stop before it.
    #[serde(default = "ReflectionConfig::default_root_type")]
    pub root_type: String,

    /// Type of the synthetic leading context parameter. An empty name disables the convention.
    #[serde(default = "ReflectionConfig::default_context_type")]
    pub context_type: Option<String>,

    /// Marker interface of delegate objects (affects diagnostics wording only).
    #[serde(default = "ReflectionConfig::default_delegate_type")]
    pub delegate_type: String,

    /// Package prefix removed from type names in diagnostics.
    #[serde(default = "ReflectionConfig::default_trimmed_package_prefix")]
    pub trimmed_package_prefix: String,

    /// Stack frames whose class name starts with one of these prefixes are dropped from
    /// argument-binding failures.
    #[serde(default = "ReflectionConfig::default_internal_frame_prefixes")]
    pub internal_frame_prefixes: Vec<String>,
}

impl ReflectionConfig {
    fn default_root_type() -> String {
        "java.lang.Object".to_owned()
    }

    fn default_context_type() -> Option<String> {
        Some("stubble.Invocation".to_owned())
    }

    fn default_delegate_type() -> String {
        "stubble.Delegate".to_owned()
    }

    fn default_trimmed_package_prefix() -> String {
        "java.lang.".to_owned()
    }

    fn default_internal_frame_prefixes() -> Vec<String> {
        vec![
            "stubble.internal.".to_owned(),
            "java.lang.reflect.".to_owned(),
            "jdk.internal.reflect.".to_owned(),
            "sun.reflect.".to_owned(),
        ]
    }
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            root_type: Self::default_root_type(),
            context_type: Self::default_context_type(),
            delegate_type: Self::default_delegate_type(),
            trimmed_package_prefix: Self::default_trimmed_package_prefix(),
            internal_frame_prefixes: Self::default_internal_frame_prefixes(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

impl StubbleConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }
}

/// Config file used for `workspace_root`, if any.
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    ["stubble.toml", ".stubble/config.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
}

/// Load the configuration for a workspace root.
///
/// If no config is present, returns [`StubbleConfig::default`] and `None`.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(StubbleConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        return Ok((StubbleConfig::default(), None));
    };

    let config = StubbleConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}

static TRACING_INIT: Once = Once::new();

/// Installs a global `tracing` subscriber.
///
/// Safe to call multiple times; only the first call has an effect. Installation failures (another
/// subscriber already set by the host) are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    if !config.stderr {
        return;
    }

    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true);

        let installed = if config.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        if installed.is_ok() {
            tracing::debug!(target: "stubble.config", level = %config.level, "tracing initialized");
        }
    });
}
