//! Trait definitions for venue access

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[cfg(test)]
use mockall::automock;

use super::errors::Result;
use super::types::{
    Action, Blockchain, OrderDetail, Quote, TerminalStatus, TradeRecord, TransactionHandle,
};

/// Everything the trading engine needs from the remote venue
///
/// Reads are side-effect free and may be issued concurrently. The two
/// write operations move funds out of the single trading wallet, so callers
/// must never overlap them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Venue: Send + Sync {
    /// Current top of book for a token
    async fn get_quote(&self, token: &str, blockchain: Blockchain) -> Result<Quote>;

    /// Fills on one side of a token's book since `since`
    async fn get_trade_history(
        &self,
        token: &str,
        blockchain: Blockchain,
        action: Action,
        since: DateTime<Utc>,
    ) -> Result<Vec<TradeRecord>>;

    /// Live state of the order created by `order_tx`
    async fn get_order_detail(&self, blockchain: Blockchain, order_tx: &str) -> Result<OrderDetail>;

    /// Native ether balance of `wallet`
    async fn get_ether_balance(&self, blockchain: Blockchain, wallet: &str) -> Result<Decimal>;

    /// Token balance of `wallet`
    async fn get_token_balance(
        &self,
        blockchain: Blockchain,
        token: &str,
        wallet: &str,
    ) -> Result<Decimal>;

    /// Fill `token_amount` tokens of the order created by `order_tx`
    async fn submit_trade(
        &self,
        blockchain: Blockchain,
        token_amount: Decimal,
        order_tx: &str,
    ) -> Result<TransactionHandle>;

    /// Wait until the submitted trade reaches a terminal state
    ///
    /// Giving up on a trade that never settles is an error, not `Failed`.
    async fn await_confirmation(&self, handle: &TransactionHandle) -> Result<TerminalStatus>;
}

/// Signs and broadcasts trade transactions for the trading wallet
///
/// Key handling lives behind this seam; the engine only ever sees the
/// resulting transaction handle.
#[async_trait]
pub trait TradeSigner: Send + Sync {
    /// Address of the wallet this signer controls
    fn address(&self) -> &str;

    /// Sign and broadcast a trade against an existing order
    async fn new_trade(
        &self,
        blockchain: Blockchain,
        token_amount: Decimal,
        order_tx: &str,
    ) -> Result<TransactionHandle>;
}
