use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 港口資料；同一筆資料可以用 `unlocs` 內的多個代碼索引
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Port {
    pub name: String,
    pub city: String,
    pub country: String,
    pub alias: Vec<String>,
    pub regions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub province: String,
    pub timezone: String,
    pub unlocs: Vec<String>,
    pub code: String,
}

/// `[longitude, latitude]`，以十進位精確保存
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates(
    #[serde(with = "rust_decimal::serde::arbitrary_precision")] pub Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")] pub Decimal,
);

impl Coordinates {
    pub fn longitude(&self) -> Decimal {
        self.0
    }

    pub fn latitude(&self) -> Decimal {
        self.1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
}

impl SyncReport {
    pub fn applied(&self) -> usize {
        self.created + self.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_decode_full_port() {
        let json = r#"{
            "name": "Ajman",
            "city": "Ajman",
            "country": "United Arab Emirates",
            "alias": [],
            "regions": [],
            "coordinates": [55.5136433, 25.4052165],
            "province": "Ajman",
            "timezone": "Asia/Dubai",
            "unlocs": ["AEAJM"],
            "code": "52000"
        }"#;

        let port: Port = serde_json::from_str(json).unwrap();

        assert_eq!(port.name, "Ajman");
        assert_eq!(port.timezone, "Asia/Dubai");
        assert_eq!(port.unlocs, vec!["AEAJM".to_string()]);
        let coordinates = port.coordinates.unwrap();
        assert_eq!(coordinates.longitude(), Decimal::from_str("55.5136433").unwrap());
        assert_eq!(coordinates.latitude(), Decimal::from_str("25.4052165").unwrap());
    }

    #[test]
    fn test_missing_fields_default() {
        let port: Port = serde_json::from_str(r#"{"name": "Ajman"}"#).unwrap();

        assert_eq!(port.name, "Ajman");
        assert!(port.city.is_empty());
        assert!(port.unlocs.is_empty());
        assert!(port.coordinates.is_none());
    }

    #[test]
    fn test_coordinates_keep_decimal_digits() {
        let json = r#"{"coordinates":[55.5136433000000000001,25.40]}"#;
        let port: Port = serde_json::from_str(json).unwrap();

        let encoded = serde_json::to_string(&port.coordinates).unwrap();
        assert_eq!(encoded, "[55.5136433000000000001,25.40]");
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        assert!(serde_json::from_str::<Port>(r#""""#).is_err());
        assert!(serde_json::from_str::<Port>(r#"{"unlocs": "AEAJM"}"#).is_err());
        assert!(serde_json::from_str::<Port>(r#"{"coordinates": [1.0]}"#).is_err());
    }
}
