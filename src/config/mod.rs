pub mod toml_config;

use crate::core::decoder::DEFAULT_MAX_RECORD_BYTES;
use crate::utils::error::ConfigResult;
use crate::utils::validation::{validate_positive_number, validate_socket_addr, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "ports-api")]
#[command(about = "HTTP API for synchronizing and looking up port records")]
pub struct ServerConfig {
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: String,

    #[arg(long, default_value_t = DEFAULT_MAX_RECORD_BYTES, help = "Largest single port record accepted, in bytes")]
    pub max_record_bytes: usize,

    #[arg(long, default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_SECS, help = "Grace period for in-flight requests on shutdown")]
    pub shutdown_timeout_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "TOML file overriding the defaults above")]
    pub config: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            verbose: false,
            json_logs: false,
            config: None,
        }
    }
}

impl ServerConfig {
    /// 若有指定 `--config`，以檔案內容覆蓋對應的欄位
    pub fn load(mut self) -> ConfigResult<Self> {
        if let Some(path) = self.config.clone() {
            let file = TomlConfig::from_file(&path)?;
            file.apply(&mut self);
        }
        Ok(self)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_socket_addr("bind", &self.bind)?;
        validate_positive_number("max_record_bytes", self.max_record_bytes, 64)?;
        validate_positive_number("shutdown_timeout_secs", self.shutdown_timeout_secs, 1)?;
        Ok(())
    }
}
