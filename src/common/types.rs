//! Venue-level types shared by the REST adapter and the trading engine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::errors::BotError;

/// Address the venue uses to denote the chain's native ether
pub const ETHER_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Blockchain a strategy trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Blockchain {
    /// Ethereum Classic
    Etc,
    /// Ethereum mainnet
    Eth,
}

impl Blockchain {
    /// Ticker symbol as used in venue URLs
    pub fn symbol(&self) -> &'static str {
        match self {
            Blockchain::Etc => "ETC",
            Blockchain::Eth => "ETH",
        }
    }

    /// EIP-155 chain id
    pub fn chain_id(&self) -> u64 {
        match self {
            Blockchain::Etc => 61,
            Blockchain::Eth => 1,
        }
    }

    /// Public RPC node used for signing and broadcasting
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Blockchain::Etc => "https://www.ethercluster.com/etc",
            Blockchain::Eth => "https://cloudflare-eth.com",
        }
    }
}

impl std::fmt::Display for Blockchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Blockchain {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ETC" => Ok(Blockchain::Etc),
            "ETH" => Ok(Blockchain::Eth),
            other => Err(BotError::InvalidStrategy(format!("unknown blockchain {}", other))),
        }
    }
}

impl TryFrom<String> for Blockchain {
    type Error = BotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Blockchain> for String {
    fn from(chain: Blockchain) -> Self {
        chain.symbol().to_string()
    }
}

/// Direction a strategy trades in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for Action {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Action::Buy),
            "sell" => Ok(Action::Sell),
            other => Err(BotError::InvalidStrategy(format!("unknown action {}", other))),
        }
    }
}

/// Top of book for a token, as reported by the venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Highest price a buyer is currently bidding
    pub best_buy_price: Option<Decimal>,
    /// Lowest price a seller is currently asking
    pub best_sell_price: Option<Decimal>,
    /// Transaction hash of the best buy order
    pub best_buy_order_tx: Option<String>,
    /// Transaction hash of the best sell order
    pub best_sell_order_tx: Option<String>,
    /// Token's declared decimal precision
    pub decimals: u32,
}

/// Live state of a single resting order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    /// Price per token in ether
    pub price: Decimal,
    /// Tokens still available on the order
    pub token_balance: Decimal,
    /// Ether value of the remaining tokens
    pub ether_balance: Decimal,
}

impl OrderDetail {
    /// Fails when the ether value of the order does not fit in a `Decimal`
    pub fn new(price: Decimal, token_balance: Decimal) -> super::errors::Result<Self> {
        let ether_balance = price.checked_mul(token_balance).ok_or_else(|| {
            BotError::VenueQuery(format!(
                "Order value overflows: {} tokens at {}",
                token_balance, price
            ))
        })?;
        Ok(Self {
            price,
            token_balance,
            ether_balance,
        })
    }
}

/// A historical fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub buyer: String,
    pub seller: String,
    pub buy_token_amount: Decimal,
    pub sell_token_amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl TradeRecord {
    /// Whether `wallet` took either side of this trade
    pub fn involves(&self, wallet: &str) -> bool {
        self.buyer.eq_ignore_ascii_case(wallet) || self.seller.eq_ignore_ascii_case(wallet)
    }

    /// Ether amount this trade counts towards the hourly volume for `action`
    pub fn volume_for(&self, action: Action) -> Decimal {
        match action {
            Action::Buy => self.buy_token_amount,
            Action::Sell => self.sell_token_amount,
        }
    }
}

/// Handle for a submitted trade transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHandle {
    pub blockchain: Blockchain,
    pub tx_hash: String,
    /// Set for trades that were never broadcast (paper trading)
    #[serde(default)]
    pub simulated: bool,
}

impl std::fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.simulated {
            write!(f, "{}:{} (simulated)", self.blockchain, self.tx_hash)
        } else {
            write!(f, "{}:{}", self.blockchain, self.tx_hash)
        }
    }
}

/// Terminal state of a submitted trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalStatus {
    /// The fill is indexed by the venue
    Confirmed,
    /// The transaction was mined but reverted
    Failed(String),
}
