use crate::utils::error::{ConfigError, ConfigResult};
use std::fmt::Display;
use std::net::SocketAddr;

pub trait Validate {
    fn validate(&self) -> ConfigResult<()>;
}

pub fn validate_socket_addr(field_name: &str, addr: &str) -> ConfigResult<()> {
    if addr.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field_name.to_string(),
            value: addr.to_string(),
            reason: "Address cannot be empty".to_string(),
        });
    }

    addr.parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue {
            field: field_name.to_string(),
            value: addr.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

pub fn validate_positive_number<T: PartialOrd + Display>(
    field_name: &str,
    value: T,
    min_value: T,
) -> ConfigResult<()> {
    if value < min_value {
        return Err(ConfigError::InvalidValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_socket_addr() {
        assert!(validate_socket_addr("bind", "0.0.0.0:8080").is_ok());
        assert!(validate_socket_addr("bind", "127.0.0.1:0").is_ok());
        assert!(validate_socket_addr("bind", "[::1]:9000").is_ok());
        assert!(validate_socket_addr("bind", "").is_err());
        assert!(validate_socket_addr("bind", "localhost").is_err());
        assert!(validate_socket_addr("bind", "0.0.0.0:99999").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("max_record_bytes", 1024, 64).is_ok());
        assert!(validate_positive_number("max_record_bytes", 10, 64).is_err());
    }

    #[test]
    fn test_validate_positive_number_keeps_u64_range() {
        // 在 32 位元平台上轉成 usize 會截斷成 0
        assert!(validate_positive_number("shutdown_timeout_secs", 1u64 << 32, 1).is_ok());
        assert!(validate_positive_number("shutdown_timeout_secs", 0u64, 1).is_err());
    }
}
