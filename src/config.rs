use crate::llm_client::{BackendKind, SamplingParams};
use anyhow::{anyhow, bail, Result};
use dirs::home_dir;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Exit code used by the binaries when configuration cannot be loaded.
pub const CONFIG_ERROR_EXIT_CODE: i32 = 9;

const KEY_SERVICE: &str = "llm_service";
const KEY_MODEL: &str = "llm_model";
const KEY_TEMPERATURE: &str = "llm_temperature";
const KEY_SEED: &str = "llm_seed";
const KEY_BASE_URL: &str = "api_baseurl";
const KEY_TOKEN: &str = "api_token";

const KEYS: [&str; 6] = [
    KEY_SERVICE,
    KEY_MODEL,
    KEY_TEMPERATURE,
    KEY_SEED,
    KEY_BASE_URL,
    KEY_TOKEN,
];

#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: String,
}

/// Validated settings, loaded once at startup and never mutated.
#[derive(Clone)]
pub struct Config {
    pub backend: BackendKind,
    pub model: String,
    pub temperature: f64,
    pub seed: i64,
    pub api: ApiConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("backend", &self.backend)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("seed", &self.seed)
            .field("base_url", &self.api.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from `~/.cai.json`, with `CAI_*` environment
    /// variables overriding individual keys.
    pub fn load() -> Result<Self> {
        let file = Self::load_file()?;
        Self::from_sources(file, |name| std::env::var(name).ok())
    }

    fn load_file() -> Result<Option<Map<String, Value>>> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}", config_path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Error on read '{}': {}", config_path.display(), e))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Error on read '{}': {}", config_path.display(), e))?;

        match value {
            Value::Object(map) => {
                info!("Loaded config from: {}", config_path.display());
                Ok(Some(map))
            }
            _ => Err(anyhow!(
                "Error on read '{}': expected a JSON object",
                config_path.display()
            )),
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".cai.json"))
    }

    /// Name of the environment variable that overrides `key`.
    pub fn env_var_name(key: &str) -> String {
        format!("CAI_{}", key.to_uppercase())
    }

    /// Build and validate a configuration from an optional file object and an
    /// environment lookup. Environment values take precedence.
    pub fn from_sources<F>(file: Option<Map<String, Value>>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = file.unwrap_or_default();
        for key in KEYS {
            if let Some(value) = env(&Self::env_var_name(key)) {
                values.insert(key.to_string(), Value::String(value));
            }
        }

        let service = require_string(&values, KEY_SERVICE)?;
        let backend = service.parse::<BackendKind>().map_err(|_| {
            anyhow!(
                "Config key \"{}\" should be one of: {}",
                KEY_SERVICE,
                BackendKind::NAMES.join(",")
            )
        })?;

        Ok(Self {
            backend,
            model: require_string(&values, KEY_MODEL)?,
            temperature: require_number(&values, KEY_TEMPERATURE)?,
            seed: require_integer(&values, KEY_SEED)?,
            api: ApiConfig {
                base_url: require_string(&values, KEY_BASE_URL)?,
                token: require_string(&values, KEY_TOKEN)?,
            },
        })
    }

    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            model: self.model.clone(),
            temperature: self.temperature,
            seed: self.seed,
        }
    }
}

fn require<'a>(values: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    match values.get(key) {
        None | Some(Value::Null) => bail!("Config key \"{}\" is required!", key),
        Some(value) => Ok(value),
    }
}

fn require_string(values: &Map<String, Value>, key: &str) -> Result<String> {
    match require(values, key)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => bail!("Config key \"{}\" should be a string", key),
    }
}

fn require_number(values: &Map<String, Value>, key: &str) -> Result<f64> {
    let parsed = match require(values, key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => bail!("Config key \"{}\" should be a number", key),
    }
}

fn require_integer(values: &Map<String, Value>, key: &str) -> Result<i64> {
    let parsed = match require(values, key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };
    parsed.ok_or_else(|| anyhow!("Config key \"{}\" should be an integer", key))
}

/// Accepts whole floats such as `42.0` that fit in an `i64`.
fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}
