use std::{
    env,
    fmt::Display,
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};

use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_PORT: &str = "5000";
const DEFAULT_DATABASE_URL: &str = "sqlite://orders.db?mode=rwc";
const DEFAULT_STAFF_KEY: &str = "admin_secret_123";
const SECRETS_DIR: &str = "/run/secrets";

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub staff_key: String,
    pub menu_path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&|key: &str| env::var(key).ok(), Path::new(SECRETS_DIR))
    }

    fn load_from(lookup: Lookup, secrets_dir: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(lookup, "PORT", DEFAULT_PORT)?,
            database_url: try_load(lookup, "DATABASE_URL", DEFAULT_DATABASE_URL)?,
            staff_key: load_staff_key(lookup, secrets_dir),
            menu_path: var(lookup, "MENU_PATH"),
        })
    }
}

fn var(lookup: Lookup, key: &str) -> Option<String> {
    let value = lookup(key);
    if value.is_none() {
        info!("Environment variable {key} not found");
    }

    value
}

fn try_load<T: FromStr>(lookup: Lookup, key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(lookup, key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })
}

/// Secret file first, then the environment, then the insecure default.
fn load_staff_key(lookup: Lookup, secrets_dir: &Path) -> String {
    if let Some(secret) = read_secret(secrets_dir, "STAFF_KEY") {
        return secret;
    }

    match var(lookup, "STAFF_KEY") {
        Some(key) if !key.is_empty() => key,
        _ => {
            warn!("STAFF_KEY not set, using the insecure default; override it in any real deployment");
            DEFAULT_STAFF_KEY.to_string()
        }
    }
}

fn read_secret(secrets_dir: &Path, secret_name: &str) -> Option<String> {
    let path: PathBuf = secrets_dir.join(secret_name);

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
}
