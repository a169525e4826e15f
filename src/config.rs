use std::net::SocketAddr;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "AbsorpGen";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_ADVISORY_MODEL: &str = "medgemma";
const DEFAULT_ADVISORY_TIMEOUT_SECS: u64 = 20;
const MAX_ADVISORY_TIMEOUT_SECS: u64 = 120;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "absorpgen=info,absorpgen_lib=info"
}

/// Settings for the optional model-based advisory step.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub advisory: AdvisoryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.parse().unwrap_or_else(|_| {
                SocketAddr::from(([127, 0, 0, 1], 5000))
            }),
            advisory: AdvisoryConfig {
                enabled: false,
                base_url: DEFAULT_OLLAMA_URL.to_string(),
                model: DEFAULT_ADVISORY_MODEL.to_string(),
                timeout: Duration::from_secs(DEFAULT_ADVISORY_TIMEOUT_SECS),
            },
        }
    }
}

impl AppConfig {
    /// Build the configuration from `ABSORPGEN_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    /// Unparseable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("ABSORPGEN_BIND") {
            match raw.trim().parse::<SocketAddr>() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => tracing::warn!(value = %raw, error = %e, "Ignoring invalid ABSORPGEN_BIND"),
            }
        }

        if let Some(raw) = lookup("ABSORPGEN_ADVISORY_ENABLED") {
            match parse_flag(&raw) {
                Some(flag) => config.advisory.enabled = flag,
                None => tracing::warn!(value = %raw, "Ignoring invalid ABSORPGEN_ADVISORY_ENABLED"),
            }
        }

        if let Some(raw) = lookup("ABSORPGEN_OLLAMA_URL") {
            let url = raw.trim().trim_end_matches('/');
            if !url.is_empty() {
                config.advisory.base_url = url.to_string();
            }
        }

        if let Some(raw) = lookup("ABSORPGEN_ADVISORY_MODEL") {
            if !raw.trim().is_empty() {
                config.advisory.model = raw.trim().to_string();
            }
        }

        if let Some(raw) = lookup("ABSORPGEN_ADVISORY_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => {
                    config.advisory.timeout =
                        Duration::from_secs(secs.clamp(1, MAX_ADVISORY_TIMEOUT_SECS));
                }
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    "Ignoring invalid ABSORPGEN_ADVISORY_TIMEOUT_SECS"
                ),
            }
        }

        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
