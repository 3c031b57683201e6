use designstron_catalog::PriceCatalog;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub payment: PaymentConfig,
    pub catalog: PriceCatalog,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    /// Base URL of the hosted checkout pages
    pub checkout_base_url: String,
    /// Where the customer lands after paying; `{order_id}` is substituted
    pub success_url: String,
    pub cancel_url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Price table, server and payment defaults
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `DESIGNSTRON_SERVER__PORT=8080`
            .add_source(
                config::Environment::with_prefix("DESIGNSTRON")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Parse a single TOML document, without environment overrides.
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
