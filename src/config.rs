use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::model::MODEL_FILE_NAME;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BODY_LIMIT_MB: usize = 16;

/// Startup settings. Read once; request handling never consults the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub body_limit_bytes: usize,
    pub model_path: PathBuf,
    /// Where to fetch the model from when it is missing locally.
    pub model_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_or_default(&lookup, "PORT", DEFAULT_PORT);
        let body_limit_mb = parse_or_default(&lookup, "BODY_LIMIT_MB", DEFAULT_BODY_LIMIT_MB);
        let body_limit_bytes = body_limit_mb.checked_mul(1024 * 1024).unwrap_or_else(|| {
            warn!(
                "Ignoring BODY_LIMIT_MB={} (too large), using {}",
                body_limit_mb, DEFAULT_BODY_LIMIT_MB
            );
            DEFAULT_BODY_LIMIT_MB * 1024 * 1024
        });

        let model_path = lookup("MODEL_PATH")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_model_path);

        let model_url = lookup("MODEL_URL").filter(|url| !url.is_empty());

        Config {
            port,
            body_limit_bytes,
            model_path,
            model_url,
        }
    }
}

fn parse_or_default<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
    }
}

/// The model lives next to the running executable.
pub fn default_model_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(MODEL_FILE_NAME)
}
