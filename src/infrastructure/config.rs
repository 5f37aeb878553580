use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("DICE").separator("__"));
        let cfg = builder.build()?;
        let mut config: Config = cfg.try_deserialize()?;

        // Hosting platforms commonly inject a bare PORT variable.
        if env::var("DICE__APP__PORT").is_err() {
            if let Ok(port) = env::var("PORT") {
                if !port.trim().is_empty() {
                    config.app.port = port.trim().parse().map_err(|_| {
                        config::ConfigError::Message(format!(
                            "PORT must be a number between 0 and 65535, got {port:?}."
                        ))
                    })?;
                }
            }
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4004
}
