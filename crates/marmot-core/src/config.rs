use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// Typed configuration for the bot process.
///
/// Everything comes from the environment (with `.env` support); the logging
/// sink layout itself is declared statically in `logging::registry`.
#[derive(Clone, Debug)]
pub struct Config {
    // Core credentials
    pub telegram_bot_token: String,
    pub telegram_allowed_users: Vec<i64>,

    // Logging
    pub log_environment: String,
    pub log_dir: PathBuf,
    /// Byte budget when reading logs back for the introspection command.
    pub log_tail_bytes: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        // Required env vars
        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        let telegram_allowed_users = parse_csv_i64(env_str("TELEGRAM_ALLOWED_USERS"));

        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }
        if telegram_allowed_users.is_empty() {
            return Err(Error::Config(
                "TELEGRAM_ALLOWED_USERS environment variable is required".to_string(),
            ));
        }

        let (log_environment, log_dir) = Self::logging_env();
        let log_tail_bytes = env_u64("LOG_TAIL_BYTES").unwrap_or(4000);

        Ok(Self {
            telegram_bot_token,
            telegram_allowed_users,
            log_environment,
            log_dir,
            log_tail_bytes,
        })
    }

    /// Logging settings only, with defaults.
    ///
    /// Split out so `main` can bring the log sinks up before full config
    /// validation: a missing credential must land in the log, not just on
    /// stderr.
    pub fn logging_env() -> (String, PathBuf) {
        load_dotenv_if_present(Path::new(".env"));
        let environment = env_str("LOG_ENVIRONMENT")
            .and_then(non_empty)
            .unwrap_or_else(|| "production".to_string());
        let log_dir = env_path("LOG_DIR").unwrap_or_else(|| PathBuf::from("data/logs"));
        (environment, log_dir)
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
