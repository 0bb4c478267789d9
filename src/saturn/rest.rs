//! REST API client for the Saturn Network ticker

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use super::messages::*;
use crate::common::errors::{BotError, Result};
use crate::common::types::{Action, Blockchain, OrderDetail, Quote, TradeRecord, ETHER_ADDRESS};

/// REST API client for the Saturn ticker
#[derive(Debug, Clone)]
pub struct SaturnRestClient {
    /// HTTP client
    client: Client,
    /// Base URL for the ticker API
    base_url: String,
}

impl SaturnRestClient {
    /// Create a new REST client
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Quote for a token: best prices, best orders and decimals
    #[instrument(skip(self))]
    pub async fn get_token_info(&self, token: &str, blockchain: Blockchain) -> Result<Quote> {
        let url = format!(
            "{}/tokens/show/{}/{}.json",
            self.base_url,
            blockchain,
            token.to_lowercase()
        );
        let info: TokenInfoResponse = self.get_json(&url, "token info").await?;

        Ok(Quote {
            best_buy_price: info
                .best_buy_price
                .as_ref()
                .map(|p| p.to_decimal("best_buy_price"))
                .transpose()?,
            best_sell_price: info
                .best_sell_price
                .as_ref()
                .map(|p| p.to_decimal("best_sell_price"))
                .transpose()?,
            best_buy_order_tx: info.best_buy_order_tx.filter(|tx| !tx.is_empty()),
            best_sell_order_tx: info.best_sell_order_tx.filter(|tx| !tx.is_empty()),
            decimals: info.decimals.to_u32("decimals")?,
        })
    }

    /// Trades on one side of a token's book since `since`
    #[instrument(skip(self))]
    pub async fn get_trades_since(
        &self,
        token: &str,
        blockchain: Blockchain,
        action: Action,
        since: DateTime<Utc>,
    ) -> Result<Vec<TradeRecord>> {
        let url = format!(
            "{}/trades/by_timestamp/{}/{}/{}/{}.json",
            self.base_url,
            blockchain,
            ETHER_ADDRESS,
            token.to_lowercase(),
            since.timestamp()
        );
        let trades: TradesResponse = self.get_json(&url, "trade history").await?;

        let subset = match action {
            Action::Buy => trades.buys,
            Action::Sell => trades.sells,
        };
        subset.into_iter().map(TradeMessage::into_record).collect()
    }

    /// Live state of the order created by `order_tx`
    #[instrument(skip(self))]
    pub async fn get_order(&self, blockchain: Blockchain, order_tx: &str) -> Result<OrderDetail> {
        let url = format!("{}/orders/by_tx/{}/{}.json", self.base_url, blockchain, order_tx);
        let order: OrderResponse = self.get_json(&url, "order info").await?;

        OrderDetail::new(
            order.price.to_decimal("price")?,
            order.balance.to_decimal("balance")?,
        )
    }

    /// Wallet balance of a token, or of ether when `token` is the zero address
    #[instrument(skip(self))]
    pub async fn get_wallet_balance(
        &self,
        blockchain: Blockchain,
        wallet: &str,
        token: &str,
    ) -> Result<Decimal> {
        let url = format!(
            "{}/tokens/balances/{}/{}/{}.json",
            self.base_url, blockchain, wallet, token
        );
        let response: BalancesResponse = self.get_json(&url, "wallet balance").await?;
        response.balances.walletbalance.to_decimal("walletbalance")
    }

    /// Look up the fill produced by a trade transaction
    ///
    /// Returns `Ok(None)` while the venue has not indexed it yet.
    #[instrument(skip(self))]
    pub async fn get_trade_by_tx(
        &self,
        blockchain: Blockchain,
        tx_hash: &str,
    ) -> Result<Option<TradeRecord>> {
        let url = format!("{}/trades/by_tx/{}/{}.json", self.base_url, blockchain, tx_hash);
        debug!("Fetching trade from: {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::VenueQuery(format!(
                "Trade lookup returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        if body.trim().is_empty() || body.trim() == "null" || body.trim() == "{}" {
            return Ok(None);
        }
        let trade: TradeMessage = serde_json::from_str(&body)?;
        trade.into_record().map(Some)
    }

    /// Receipt of a mined transaction, from the JSON-RPC node at `rpc_url`
    ///
    /// Returns `Ok(None)` while the transaction is still unmined.
    #[instrument(skip(self))]
    pub async fn get_transaction_receipt(
        &self,
        rpc_url: &str,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_getTransactionReceipt",
            params: vec![tx_hash],
        };
        debug!("Fetching receipt from: {}", rpc_url);

        let response = self.client.post(rpc_url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::VenueQuery(format!(
                "RPC node returned status {}: {}",
                status, body
            )));
        }

        let envelope: JsonRpcResponse<TransactionReceipt> = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(BotError::VenueQuery(format!(
                "RPC error {}: {}",
                error.code, error.message
            )));
        }
        Ok(envelope.result)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        debug!("Fetching {} from: {}", what, url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::VenueQuery(format!(
                "API error while fetching {}. Status {}: {}",
                what, status, body
            )));
        }

        Ok(response.json().await?)
    }
}
