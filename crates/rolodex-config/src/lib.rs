use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rolodex_codec::extract::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use rolodex_codec::generative::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use rolodex_core::{ExportFormat, NameDecoration};
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "rolodex";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_API_KEY_ENV: &str = "ROLODEX_API_KEY";
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub default_formats: Vec<ExportFormat>,
    pub decoration: NameDecoration,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl ExtractionConfig {
    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_formats: vec![ExportFormat::Tabular],
            decoration: NameDecoration::default(),
            extraction: ExtractionConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                model: DEFAULT_MODEL.to_string(),
                api_key_env: DEFAULT_API_KEY_ENV.to_string(),
                max_attempts: DEFAULT_MAX_ATTEMPTS,
                base_delay: DEFAULT_BASE_DELAY,
                timeout: DEFAULT_TIMEOUT,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid default format: {0}")]
    InvalidFormat(String),
    #[error("invalid extraction.{field}: {message}")]
    InvalidExtractionField { field: &'static str, message: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    default_formats: Option<Vec<String>>,
    decoration: Option<DecorationFile>,
    extraction: Option<ExtractionFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DecorationFile {
    prefix: Option<String>,
    suffix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractionFile {
    endpoint: Option<String>,
    model: Option<String>,
    api_key_env: Option<String>,
    max_attempts: Option<u32>,
    base_delay_ms: Option<u64>,
    timeout_secs: Option<u64>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(formats) = parsed.default_formats {
        let mut resolved = Vec::with_capacity(formats.len());
        for raw in formats {
            let format = raw
                .parse::<ExportFormat>()
                .map_err(|_| ConfigError::InvalidFormat(raw.clone()))?;
            if !resolved.contains(&format) {
                resolved.push(format);
            }
        }
        if resolved.is_empty() {
            return Err(ConfigError::InvalidFormat("empty list".to_string()));
        }
        config.default_formats = resolved;
    }

    if let Some(decoration) = parsed.decoration {
        if let Some(prefix) = decoration.prefix {
            config.decoration.prefix = prefix.trim().to_string();
        }
        if let Some(suffix) = decoration.suffix {
            config.decoration.suffix = suffix.trim().to_string();
        }
    }

    if let Some(extraction) = parsed.extraction {
        let target = &mut config.extraction;
        if let Some(endpoint) = extraction.endpoint {
            target.endpoint = non_empty("endpoint", endpoint)?;
        }
        if let Some(model) = extraction.model {
            target.model = non_empty("model", model)?;
        }
        if let Some(api_key_env) = extraction.api_key_env {
            target.api_key_env = non_empty("api_key_env", api_key_env)?;
        }
        if let Some(max_attempts) = extraction.max_attempts {
            if max_attempts == 0 || max_attempts > MAX_ATTEMPTS_LIMIT {
                return Err(ConfigError::InvalidExtractionField {
                    field: "max_attempts",
                    message: format!("{max_attempts} is outside 1..={MAX_ATTEMPTS_LIMIT}"),
                });
            }
            target.max_attempts = max_attempts;
        }
        if let Some(delay) = extraction.base_delay_ms {
            target.base_delay = Duration::from_millis(delay);
        }
        if let Some(timeout) = extraction.timeout_secs {
            if timeout == 0 {
                return Err(ConfigError::InvalidExtractionField {
                    field: "timeout_secs",
                    message: "must be positive".to_string(),
                });
            }
            target.timeout = Duration::from_secs(timeout);
        }
    }

    Ok(config)
}

fn non_empty(field: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidExtractionField {
            field,
            message: "cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
