//! Saturn ticker API response types

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::common::errors::{BotError, Result};
use crate::common::types::TradeRecord;

/// A numeric field the API sends either as a JSON string or a JSON number
///
/// Holds the field's exact text. JSON numbers are read with serde_json's
/// `arbitrary_precision`, so no digit ever passes through an `f64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ApiNumber(String);

impl ApiNumber {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into an exact decimal
    pub fn to_decimal(&self, field: &str) -> Result<Decimal> {
        self.0
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&self.0))
            .map_err(|e| BotError::VenueQuery(format!("Invalid {} {:?}: {}", field, self.0, e)))
    }

    /// Parse into an unsigned integer (token decimals)
    pub fn to_u32(&self, field: &str) -> Result<u32> {
        self.0
            .parse::<u32>()
            .map_err(|e| BotError::VenueQuery(format!("Invalid {} {:?}: {}", field, self.0, e)))
    }

    /// Parse a timestamp given as unix seconds or as RFC 3339 text
    pub fn to_timestamp(&self, field: &str) -> Result<DateTime<Utc>> {
        if let Ok(seconds) = self.0.parse::<i64>() {
            return Utc
                .timestamp_opt(seconds, 0)
                .single()
                .ok_or_else(|| BotError::VenueQuery(format!("Invalid {} {}", field, self.0)));
        }
        DateTime::parse_from_rfc3339(&self.0)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| BotError::VenueQuery(format!("Invalid {} {:?}: {}", field, self.0, e)))
    }
}

impl<'de> Deserialize<'de> for ApiNumber {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(text) => Ok(Self::new(text)),
            Value::Number(number) => Ok(Self::new(number.to_string())),
            other => Err(de::Error::custom(format!(
                "expected a number or a numeric string, got {}",
                other
            ))),
        }
    }
}

/// Response of `/tokens/show/{chain}/{token}.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfoResponse {
    #[serde(default)]
    pub best_buy_price: Option<ApiNumber>,
    #[serde(default)]
    pub best_sell_price: Option<ApiNumber>,
    #[serde(default)]
    pub best_buy_order_tx: Option<String>,
    #[serde(default)]
    pub best_sell_order_tx: Option<String>,
    pub decimals: ApiNumber,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Response of `/trades/by_timestamp/...`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradesResponse {
    #[serde(default)]
    pub buys: Vec<TradeMessage>,
    #[serde(default)]
    pub sells: Vec<TradeMessage>,
}

/// A single fill as reported by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeMessage {
    #[serde(default)]
    pub tx: Option<String>,
    pub buyer: String,
    pub seller: String,
    pub buytokenamount: ApiNumber,
    pub selltokenamount: ApiNumber,
    pub timestamp: ApiNumber,
}

impl TradeMessage {
    pub fn into_record(self) -> Result<TradeRecord> {
        Ok(TradeRecord {
            buy_token_amount: self.buytokenamount.to_decimal("buytokenamount")?,
            sell_token_amount: self.selltokenamount.to_decimal("selltokenamount")?,
            timestamp: self.timestamp.to_timestamp("timestamp")?,
            buyer: self.buyer,
            seller: self.seller,
        })
    }
}

/// Response of `/orders/by_tx/{chain}/{tx}.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub price: ApiNumber,
    pub balance: ApiNumber,
}

/// Response of `/tokens/balances/{chain}/{wallet}/{token}.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancesResponse {
    pub balances: WalletBalances,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalances {
    pub walletbalance: ApiNumber,
}

/// JSON-RPC request envelope
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Vec<&'a str>,
}

/// JSON-RPC response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// The part of `eth_getTransactionReceipt` the confirmation wait needs
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionReceipt {
    /// `0x1` on success, `0x0` when reverted; absent before Byzantium
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn reverted(&self) -> bool {
        matches!(self.status.as_deref(), Some("0x0") | Some("0x00"))
    }
}
