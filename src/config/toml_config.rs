use crate::config::ServerConfig;
use crate::utils::error::ConfigResult;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub sync: Option<SyncSection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub shutdown_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncSection {
    pub max_record_bytes: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let processed_content = substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 檔案中有設定的欄位才覆蓋
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(server) = &self.server {
            if let Some(bind) = &server.bind {
                config.bind = bind.clone();
            }
            if let Some(timeout) = server.shutdown_timeout_secs {
                config.shutdown_timeout_secs = timeout;
            }
        }
        if let Some(max_record_bytes) = self.sync.as_ref().and_then(|s| s.max_record_bytes) {
            config.max_record_bytes = max_record_bytes;
        }
        if let Some(logging) = &self.logging {
            config.verbose |= logging.verbose.unwrap_or(false);
            config.json_logs |= logging.json.unwrap_or(false);
        }
    }
}

/// 替換環境變數 (例如 ${PORTS_BIND})；未設定的變數保持原樣
fn substitute_env_vars(content: &str) -> String {
    let re = match Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };

    re.replace_all(content, |caps: &Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
bind = "127.0.0.1:8081"
shutdown_timeout_secs = 5

[sync]
max_record_bytes = 65536

[logging]
verbose = true
json = true
"#;

        let file = TomlConfig::from_toml_str(toml_content).unwrap();
        let mut config = ServerConfig::default();
        file.apply(&mut config);

        assert_eq!(config.bind, "127.0.0.1:8081");
        assert_eq!(config.shutdown_timeout_secs, 5);
        assert_eq!(config.max_record_bytes, 65536);
        assert!(config.verbose);
        assert!(config.json_logs);
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let file = TomlConfig::from_toml_str("").unwrap();
        let mut config = ServerConfig::default();
        file.apply(&mut config);

        assert_eq!(config.bind, ServerConfig::default().bind);
        assert!(!config.verbose);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PORTS_API_TEST_BIND", "127.0.0.1:6060");

        let file = TomlConfig::from_toml_str(
            r#"
[server]
bind = "${PORTS_API_TEST_BIND}"
"#,
        )
        .unwrap();
        assert_eq!(
            file.server.unwrap().bind.as_deref(),
            Some("127.0.0.1:6060")
        );

        std::env::remove_var("PORTS_API_TEST_BIND");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(TomlConfig::from_toml_str("[server\nbind = 1").is_err());
        assert!(TomlConfig::from_toml_str("[sync]\nmax_record_bytes = \"big\"").is_err());
    }
}
