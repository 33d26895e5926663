// In crates/app-config/src/lib.rs

use std::path::Path;

use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, BacktestDefaults, CacheSettings, MarketDataSettings, ServerSettings, Settings};

/// Loads the application settings from the `config/` directory of the
/// working directory.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new("config"))
}

/// Same as [`load_settings`], reading the TOML files from `dir`.
pub fn load_settings_from(dir: &Path) -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        // 1. Load the base configuration file.
        .add_source(File::from(dir.join("base")))
        // 2. Load the environment-specific configuration file.
        .add_source(File::from(dir.join(&environment)).required(false))
        // 3. Load settings from environment variables (e.g., `APP_SERVER__PORT=9000`).
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = settings.try_deserialize()?;
    validate(&settings)?;

    Ok(settings)
}

fn validate(settings: &Settings) -> Result<()> {
    let defaults = &settings.backtest;
    if defaults.short_period == 0 || defaults.short_period >= defaults.long_period {
        return Err(Error::Invalid(format!(
            "backtest.short_period ({}) must be positive and below backtest.long_period ({})",
            defaults.short_period, defaults.long_period
        )));
    }
    defaults
        .simulation()
        .validate()
        .map_err(|e| Error::Invalid(e.to_string()))?;
    if settings.cache.capacity == 0 {
        return Err(Error::Invalid("cache.capacity must be at least 1".to_string()));
    }
    Ok(())
}
