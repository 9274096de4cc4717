//! Config file loading, environment overrides and source tracking.

use super::env::{EnvError, EnvParser};
use super::policy::CheckPolicy;
use super::source::ConfigSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid environment overrides: {}", format_env_errors(.0))]
    Environment(Vec<EnvError>),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn format_env_errors(errors: &[EnvError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

/// repocheck configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepocheckConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub policy: CheckPolicy,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Deadline for one whole validation run, in seconds.
    #[serde(default = "default_run_deadline")]
    pub run_deadline_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Text,
            run_deadline_secs: default_run_deadline(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout for remote documents, in seconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Address the check endpoint listens on.
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_run_deadline() -> u64 {
    120
}

fn default_http_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("repocheck/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

/// Default config file location (`<config dir>/repocheck/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "repocheck")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Keys reported by `config show`, in display order.
const KEYS: &[&str] = &[
    "general.log_level",
    "general.log_format",
    "general.run_deadline_secs",
    "policy.namespace",
    "policy.brand_name",
    "policy.forge_host",
    "policy.raw_content_host",
    "policy.default_branch",
    "policy.registry_listing_url",
    "policy.collaborators_marker",
    "policy.collaborators",
    "policy.extra_categories",
    "http.timeout_secs",
    "http.user_agent",
    "daemon.listen",
];

/// Effective configuration plus where every value came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RepocheckConfig,
    /// Config file that was read, if any.
    pub path: Option<PathBuf>,
    sources: BTreeMap<&'static str, ConfigSource>,
}

impl LoadedConfig {
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.sources
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }

    /// `(key, value, source)` triples for every known key.
    pub fn entries(&self) -> Vec<(&'static str, String, ConfigSource)> {
        let c = &self.config;
        KEYS.iter()
            .map(|key| {
                let value = match *key {
                    "general.log_level" => c.general.log_level.clone(),
                    "general.log_format" => c.general.log_format.as_str().to_string(),
                    "general.run_deadline_secs" => c.general.run_deadline_secs.to_string(),
                    "policy.namespace" => c.policy.namespace.clone(),
                    "policy.brand_name" => c.policy.brand_name.clone(),
                    "policy.forge_host" => c.policy.forge_host.clone(),
                    "policy.raw_content_host" => c.policy.raw_content_host.clone(),
                    "policy.default_branch" => c.policy.default_branch.clone(),
                    "policy.registry_listing_url" => c.policy.registry_listing_url.clone(),
                    "policy.collaborators_marker" => c.policy.collaborators_marker.clone(),
                    "policy.collaborators" => c.policy.collaborators.join(", "),
                    "policy.extra_categories" => c.policy.extra_categories.join(", "),
                    "http.timeout_secs" => c.http.timeout_secs.to_string(),
                    "http.user_agent" => c.http.user_agent.clone(),
                    "daemon.listen" => c.daemon.listen.clone(),
                    _ => String::new(),
                };
                (*key, value, self.source_of(key))
            })
            .collect()
    }
}

impl RepocheckConfig {
    /// Load configuration.
    ///
    /// Resolution order: `explicit`, then `REPOCHECK_CONFIG`, then the default
    /// location. An explicitly named file must exist; a missing default file
    /// falls back to built-in defaults. Environment overrides apply last.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let mut parser = EnvParser::new();
        let from_env = parser.get_optional_string("CONFIG").value.map(PathBuf::from);

        let path = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) if path.exists() => Some(path),
            Some(path) => return Err(ConfigError::NotFound(path)),
            None => default_config_path().filter(|p| p.exists()),
        };

        let mut loaded = match path {
            Some(path) => Self::load_file(&path)?,
            None => LoadedConfig {
                config: RepocheckConfig::default(),
                path: None,
                sources: BTreeMap::new(),
            },
        };

        apply_env_overrides(&mut loaded)?;
        loaded
            .config
            .policy
            .validate()
            .map_err(ConfigError::Invalid)?;
        if loaded.config.http.timeout_secs == 0 || loaded.config.general.run_deadline_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeouts and deadlines must be at least one second".to_string(),
            ));
        }

        debug!(
            path = ?loaded.path,
            namespace = %loaded.config.policy.namespace,
            "configuration loaded"
        );
        Ok(loaded)
    }

    /// Read and parse one config file without environment overrides.
    pub fn load_file(path: &Path) -> Result<LoadedConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let table = toml::from_str::<toml::Table>(&contents).map_err(parse_err)?;
        let config = toml::from_str::<RepocheckConfig>(&contents).map_err(parse_err)?;

        let mut sources = BTreeMap::new();
        for key in KEYS {
            let Some((section, field)) = key.split_once('.') else {
                continue;
            };
            let present = table
                .get(section)
                .and_then(|s| s.as_table())
                .is_some_and(|s| s.contains_key(field));
            if present {
                sources.insert(*key, ConfigSource::File);
            }
        }

        Ok(LoadedConfig {
            config,
            path: Some(path.to_path_buf()),
            sources,
        })
    }
}

fn apply_env_overrides(loaded: &mut LoadedConfig) -> Result<(), ConfigError> {
    let mut parser = EnvParser::new();
    let config = &mut loaded.config;
    let sources = &mut loaded.sources;

    let level = parser.get_log_level("LOG_LEVEL", &config.general.log_level);
    if level.is_from_env() {
        config.general.log_level = level.value;
        sources.insert("general.log_level", ConfigSource::Environment);
    }

    let format = parser.get_choice(
        "LOG_FORMAT",
        config.general.log_format.as_str(),
        &["text", "json"],
    );
    if format.is_from_env() {
        config.general.log_format = if format.value == "json" {
            LogFormat::Json
        } else {
            LogFormat::Text
        };
        sources.insert("general.log_format", ConfigSource::Environment);
    }

    let deadline = parser.get_u64_range(
        "RUN_DEADLINE_SECS",
        config.general.run_deadline_secs,
        1,
        3600,
    );
    if deadline.is_from_env() {
        config.general.run_deadline_secs = deadline.value;
        sources.insert("general.run_deadline_secs", ConfigSource::Environment);
    }

    if let Some(namespace) = parser.get_optional_string("NAMESPACE").value {
        config.policy.namespace = namespace;
        sources.insert("policy.namespace", ConfigSource::Environment);
    }

    if let Some(branch) = parser.get_optional_string("DEFAULT_BRANCH").value {
        config.policy.default_branch = branch;
        sources.insert("policy.default_branch", ConfigSource::Environment);
    }

    if let Some(url) = parser.get_optional_string("REGISTRY_URL").value {
        config.policy.registry_listing_url = url;
        sources.insert("policy.registry_listing_url", ConfigSource::Environment);
    }

    let collaborators =
        parser.get_string_list("COLLABORATORS", config.policy.collaborators.clone());
    if collaborators.is_from_env() {
        config.policy.collaborators = collaborators.value;
        sources.insert("policy.collaborators", ConfigSource::Environment);
    }

    let timeout = parser.get_u64_range("HTTP_TIMEOUT_SECS", config.http.timeout_secs, 1, 600);
    if timeout.is_from_env() {
        config.http.timeout_secs = timeout.value;
        sources.insert("http.timeout_secs", ConfigSource::Environment);
    }

    if let Some(listen) = parser.get_optional_string("LISTEN").value {
        config.daemon.listen = listen;
        sources.insert("daemon.listen", ConfigSource::Environment);
    }

    if parser.has_errors() {
        return Err(ConfigError::Environment(parser.take_errors()));
    }
    Ok(())
}
