//! Configuration loader

use config::{Config, Environment, File, FileFormat};
use serde_json::Value;
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{BotError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP__, e.g. APP__VENUE__WALLET_ADDRESS)
/// 2. Configuration file (TOML or JSON, chosen by extension)
/// 3. Default values
///
/// A JSON file may also be a bare array of strategy rows; venue and settings
/// then come from the environment and defaults.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if !Path::new(path).exists() {
            return Err(BotError::Configuration(format!(
                "Config file not found: {}",
                path
            )));
        }
        builder = match strategy_rows_only(path)? {
            Some(wrapped) => builder.add_source(File::from_str(&wrapped, FileFormat::Json)),
            None => builder.add_source(File::with_name(path)),
        };
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| BotError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| BotError::Configuration(e.to_string()))
}

/// Wrap a `.json` file holding a bare array of rows as `{"strategies": [...]}`
///
/// Numeric row fields become strings with their exact digits.
fn strategy_rows_only(path: &str) -> Result<Option<String>> {
    let is_json = Path::new(path)
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| BotError::Configuration(format!("Cannot read {}: {}", path, e)))?;
    let rows = match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Array(rows)) => rows,
        _ => return Ok(None),
    };

    let rows: Vec<Value> = rows
        .into_iter()
        .map(|row| match row {
            Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| match value {
                        Value::Number(n) => (key, Value::String(n.to_string())),
                        other => (key, other),
                    })
                    .collect(),
            ),
            other => other,
        })
        .collect();

    let mut wrapped = serde_json::Map::new();
    wrapped.insert("strategies".to_string(), Value::Array(rows));
    Ok(Some(Value::Object(wrapped).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("pricewatch-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_toml_file() {
        let path = write_temp(
            "bot.toml",
            r#"
            [venue]
            wallet_address = "0x1111111111111111111111111111111111111111"

            [settings]
            poll_delay_seconds = 15

            [[strategies]]
            token = "0xac55641cbb734bdf6510d1bbd62e240c2409040f"
            blockchain = "ETC"
            action = "buy"
            price = "0.002"
            houretherlimit = "10"
            "#,
        );

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.settings.poll_delay_seconds, 15);
        assert_eq!(config.strategies.len(), 1);
        assert_eq!(config.strategies[0].price, "0.002");
        assert!(config.validate().is_ok());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_json_strategy_rows() {
        let path = write_temp(
            "bot.json",
            r#"{
                "venue": { "wallet_address": "0x1111111111111111111111111111111111111111" },
                "strategies": [
                    { "token": "0xac55641cbb734bdf6510d1bbd62e240c2409040f", "blockchain": "ETC",
                      "action": "sell", "price": "0.0025", "hourly_ether_limit": "3" }
                ]
            }"#,
        );

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.strategies[0].action, "sell");
        assert_eq!(config.strategies[0].houretherlimit, "3");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_bare_array_of_rows() {
        let path = write_temp(
            "rows.json",
            r#"[
                { "token": "0xac55641cbb734bdf6510d1bbd62e240c2409040f", "blockchain": "ETC",
                  "action": "buy", "price": 0.0000123456789012345678, "houretherlimit": 10 },
                { "token": "0xac55641cbb734bdf6510d1bbd62e240c2409040f", "blockchain": "ETH",
                  "action": "sell", "price": "0.004", "houretherlimit": "2.5" }
            ]"#,
        );

        let mut config = load_config(path.to_str()).unwrap();
        assert_eq!(config.strategies.len(), 2);
        assert_eq!(config.strategies[0].price, "0.0000123456789012345678");
        assert_eq!(config.strategies[0].houretherlimit, "10");
        assert_eq!(config.strategies[1].blockchain, "ETH");

        config.venue.wallet_address = "0x1111111111111111111111111111111111111111".to_string();
        let strategies = config.validate().unwrap();
        assert_eq!(
            strategies[0].price_threshold,
            "0.0000123456789012345678".parse::<rust_decimal::Decimal>().unwrap()
        );

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = load_config(Some("/definitely/not/here.toml"));
        assert!(matches!(result, Err(BotError::Configuration(_))));
    }
}
