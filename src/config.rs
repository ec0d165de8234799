use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "MedGuard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_CONNECTIONS: usize = 8;
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_LLM_MODEL: &str = "medgemma";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

const ENV_DB_PATH: &str = "MEDGUARD_DB_PATH";
const ENV_MASTER_KEY: &str = "MEDGUARD_MASTER_KEY";
const ENV_BIND_ADDR: &str = "MEDGUARD_BIND_ADDR";
const ENV_MAX_CONNECTIONS: &str = "MEDGUARD_MAX_CONNECTIONS";
const ENV_STORAGE_TIMEOUT: &str = "MEDGUARD_STORAGE_TIMEOUT_SECS";
const ENV_OLLAMA_URL: &str = "OLLAMA_URL";
const ENV_LLM_MODEL: &str = "MEDGUARD_LLM_MODEL";
const ENV_LLM_TEMPERATURE: &str = "MEDGUARD_LLM_TEMPERATURE";
const ENV_LLM_TIMEOUT: &str = "MEDGUARD_LLM_TIMEOUT_SECS";

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medguard_lib=info,medguard=info,tower_http=warn"
}

/// Get the application data directory
/// Falls back to the working directory when the platform has no data dir.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("medguard")
}

/// Default location of the record database
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("medguard.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Storage settings consumed by `RecordStore::init`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// Base64 AES-256 key. `None` means an ephemeral key is generated.
    pub master_key: Option<String>,
    pub max_connections: usize,
    pub operation_timeout: Duration,
}

impl StoreConfig {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            master_key: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            operation_timeout: Duration::from_secs(DEFAULT_STORAGE_TIMEOUT_SECS),
        }
    }
}

/// Text-generation settings for the assistant.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: DEFAULT_LLM_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub generator: GeneratorConfig,
}

impl AppConfig {
    /// Build configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or(&lookup, ENV_BIND_ADDR, || {
            SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
        })?;

        let db_path = lookup(ENV_DB_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let max_connections: usize =
            parse_or(&lookup, ENV_MAX_CONNECTIONS, || DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: ENV_MAX_CONNECTIONS,
                value: "0".into(),
            });
        }

        let storage_timeout: u64 =
            parse_or(&lookup, ENV_STORAGE_TIMEOUT, || DEFAULT_STORAGE_TIMEOUT_SECS)?;
        let llm_timeout: u64 = parse_or(&lookup, ENV_LLM_TIMEOUT, || DEFAULT_LLM_TIMEOUT_SECS)?;
        let temperature: f32 =
            parse_or(&lookup, ENV_LLM_TEMPERATURE, || DEFAULT_LLM_TEMPERATURE)?;

        Ok(Self {
            bind_addr,
            store: StoreConfig {
                db_path,
                master_key: lookup(ENV_MASTER_KEY).filter(|v| !v.trim().is_empty()),
                max_connections,
                operation_timeout: Duration::from_secs(storage_timeout),
            },
            generator: GeneratorConfig {
                base_url: lookup(ENV_OLLAMA_URL)
                    .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
                model: lookup(ENV_LLM_MODEL).unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                temperature,
                timeout: Duration::from_secs(llm_timeout),
            },
        })
    }
}

fn parse_or<F, T, D>(lookup: &F, name: &'static str, default: D) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    D: FnOnce() -> T,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name, value: raw })
        }
        _ => Ok(default()),
    }
}
