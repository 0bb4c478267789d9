//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pricewatch::{
    Action, Blockchain, BotError, OrderDetail, Quote, Result, StrategyConfig, TerminalStatus,
    TradeRecord, TransactionHandle, Venue,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const WALLET: &str = "0x1111111111111111111111111111111111111111";
pub const COUNTERPARTY: &str = "0x2222222222222222222222222222222222222222";
pub const TOKEN: &str = "0xac55641cbb734bdf6510d1bbd62e240c2409040f";

/// Build a strategy for `token`
pub fn strategy(token: &str, action: Action, threshold: Decimal, limit: Decimal) -> StrategyConfig {
    StrategyConfig {
        token: token.to_string(),
        blockchain: Blockchain::Etc,
        action,
        price_threshold: threshold,
        hourly_ether_limit: limit,
    }
}

/// Quote with one resting order on each side
pub fn quote(best_buy: Decimal, best_sell: Decimal, decimals: u32) -> Quote {
    Quote {
        best_buy_price: Some(best_buy),
        best_sell_price: Some(best_sell),
        best_buy_order_tx: Some("0xbestbuyorder".to_string()),
        best_sell_order_tx: Some("0xbestsellorder".to_string()),
        decimals,
    }
}

/// A fill the trading wallet took part in, `age` ago
pub fn own_trade(amount: Decimal, age: chrono::Duration) -> TradeRecord {
    TradeRecord {
        buyer: WALLET.to_string(),
        seller: COUNTERPARTY.to_string(),
        buy_token_amount: amount,
        sell_token_amount: amount,
        timestamp: Utc::now() - age,
    }
}

/// In-memory venue that records every call in order
///
/// Quotes are keyed by token; everything else is shared across tokens.
pub struct RecordingVenue {
    pub quotes: HashMap<String, Quote>,
    pub trades: Vec<TradeRecord>,
    pub order: OrderDetail,
    pub ether_balance: Decimal,
    pub token_balance: Decimal,
    /// How long each confirmation takes
    pub confirmation_delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl RecordingVenue {
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
            trades: Vec::new(),
            order: OrderDetail::new(dec!(0.0018), dec!(1000)).unwrap(),
            ether_balance: dec!(1),
            token_balance: dec!(1000),
            confirmation_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_quote(mut self, token: &str, quote: Quote) -> Self {
        self.quotes.insert(token.to_string(), quote);
        self
    }

    /// Every call so far, e.g. `submit:0xorder` or `confirm:0xtx`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that move funds
    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("submit:"))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Venue for RecordingVenue {
    async fn get_quote(&self, token: &str, _blockchain: Blockchain) -> Result<Quote> {
        self.record(format!("quote:{}", token));
        self.quotes
            .get(token)
            .cloned()
            .ok_or_else(|| BotError::VenueQuery(format!("unknown token {}", token)))
    }

    async fn get_trade_history(
        &self,
        token: &str,
        _blockchain: Blockchain,
        action: Action,
        since: DateTime<Utc>,
    ) -> Result<Vec<TradeRecord>> {
        self.record(format!("history:{}:{}", token, action));
        // Ignores the window; the accountant filters
        let _ = since;
        Ok(self.trades.clone())
    }

    async fn get_order_detail(&self, _blockchain: Blockchain, order_tx: &str) -> Result<OrderDetail> {
        self.record(format!("order:{}", order_tx));
        Ok(self.order.clone())
    }

    async fn get_ether_balance(&self, _blockchain: Blockchain, _wallet: &str) -> Result<Decimal> {
        self.record("ether_balance".to_string());
        Ok(self.ether_balance)
    }

    async fn get_token_balance(
        &self,
        _blockchain: Blockchain,
        token: &str,
        _wallet: &str,
    ) -> Result<Decimal> {
        self.record(format!("token_balance:{}", token));
        Ok(self.token_balance)
    }

    async fn submit_trade(
        &self,
        blockchain: Blockchain,
        token_amount: Decimal,
        order_tx: &str,
    ) -> Result<TransactionHandle> {
        self.record(format!("submit:{}:{}", order_tx, token_amount));
        Ok(TransactionHandle {
            blockchain,
            tx_hash: format!("tx-{}", order_tx),
            simulated: false,
        })
    }

    async fn await_confirmation(&self, handle: &TransactionHandle) -> Result<TerminalStatus> {
        tokio::time::sleep(self.confirmation_delay).await;
        self.record(format!("confirm:{}", handle.tx_hash));
        Ok(TerminalStatus::Confirmed)
    }
}

/// Sample API responses for testing
pub mod api_responses {
    /// Token info with both sides of the book
    pub const TOKEN_INFO: &str = r#"{
        "symbol": "SATURN",
        "decimals": 4,
        "best_buy_price": "0.0017",
        "best_sell_price": "0.0018",
        "best_buy_order_tx": "0xbuyordertx",
        "best_sell_order_tx": "0xsellordertx"
    }"#;

    /// Order detail
    pub const ORDER: &str = r#"{
        "price": "0.0018",
        "balance": "2777.7777"
    }"#;

    /// Wallet balance
    pub const BALANCE: &str = r#"{
        "balances": { "walletbalance": "1.25" }
    }"#;
}
