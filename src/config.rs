//! Search defaults loaded from `config/config.toml` or environment variables.
//!
//! ```toml
//! [search]
//! default_take = 25
//! max_take = 200
//! ```
//!
//! Environment variables use the `PAGESEARCH` prefix and `__` as separator,
//! e.g. `PAGESEARCH__SEARCH__MAX_TAKE=200`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "PAGESEARCH";

/// Defaults applied by `QueryInputBuilder::with_config`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchConfig {
    /// Page size when none is requested.
    #[serde(default = "default_take")]
    pub default_take: u64,
    /// Upper bound on the page size; larger requests are clamped.
    #[serde(default)]
    pub max_take: Option<u64>,
    #[serde(default = "default_order_ascending")]
    pub order_ascending: bool,
    #[serde(default)]
    pub skip_count: bool,
    #[serde(default)]
    pub in_memory_projection: bool,
}

fn default_take() -> u64 {
    20
}

fn default_order_ascending() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_take: default_take(),
            max_take: None,
            order_ascending: default_order_ascending(),
            skip_count: false,
            in_memory_projection: false,
        }
    }
}

impl SearchConfig {
    /// Load the `[search]` section from `config/config.toml`, falling back to
    /// env vars. A missing section yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!("failed to load {}, falling back to env: {}", CONFIG_FILE, err);
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        Self::from_settings(&settings)
    }

    fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        match settings.get::<SearchConfig>("search") {
            Ok(search) => Ok(search),
            Err(ConfigError::NotFound(_)) => {
                log::debug!("no [search] configuration found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Message(format!(
                "Search configuration could not be loaded from file or environment: {}",
                e
            ))),
        }
    }
}
