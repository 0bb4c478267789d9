//! Saturn venue: REST reads, signed writes and confirmation polling

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

use super::rest::SaturnRestClient;
use crate::common::errors::{BotError, Result};
use crate::common::traits::{TradeSigner, Venue};
use crate::common::types::{
    Action, Blockchain, OrderDetail, Quote, TerminalStatus, TradeRecord, TransactionHandle,
    ETHER_ADDRESS,
};
use crate::config::types::AppSettings;

/// Venue implementation backed by the Saturn ticker API and a trade signer
pub struct SaturnVenue {
    /// REST API client
    rest_client: SaturnRestClient,
    /// Signs and broadcasts trades
    signer: Arc<dyn TradeSigner>,
    /// Upper bound on waiting for a trade to be indexed
    confirmation_timeout: Duration,
    /// Delay between confirmation lookups
    poll_interval: Duration,
    /// Replaces the chain's default JSON-RPC node when set
    rpc_url: Option<String>,
}

impl SaturnVenue {
    pub fn new(
        rest_client: SaturnRestClient,
        signer: Arc<dyn TradeSigner>,
        settings: &AppSettings,
    ) -> Self {
        Self {
            rest_client,
            signer,
            confirmation_timeout: settings.confirmation_timeout(),
            poll_interval: settings.confirmation_poll_interval(),
            rpc_url: None,
        }
    }

    /// Check receipts against `rpc_url` instead of the chain's default node
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = Some(rpc_url.into());
        self
    }

    fn rpc_url(&self, blockchain: Blockchain) -> &str {
        self.rpc_url.as_deref().unwrap_or(blockchain.rpc_url())
    }

    /// `Some(reason)` once the node reports the transaction as reverted
    async fn reverted(&self, handle: &TransactionHandle) -> Option<String> {
        match self
            .rest_client
            .get_transaction_receipt(self.rpc_url(handle.blockchain), &handle.tx_hash)
            .await
        {
            Ok(Some(receipt)) if receipt.reverted() => {
                Some(format!("transaction {} reverted", handle.tx_hash))
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Receipt lookup failed, retrying");
                None
            }
        }
    }
}

#[async_trait]
impl Venue for SaturnVenue {
    async fn get_quote(&self, token: &str, blockchain: Blockchain) -> Result<Quote> {
        self.rest_client.get_token_info(token, blockchain).await
    }

    async fn get_trade_history(
        &self,
        token: &str,
        blockchain: Blockchain,
        action: Action,
        since: DateTime<Utc>,
    ) -> Result<Vec<TradeRecord>> {
        self.rest_client
            .get_trades_since(token, blockchain, action, since)
            .await
    }

    async fn get_order_detail(&self, blockchain: Blockchain, order_tx: &str) -> Result<OrderDetail> {
        self.rest_client.get_order(blockchain, order_tx).await
    }

    async fn get_ether_balance(&self, blockchain: Blockchain, wallet: &str) -> Result<Decimal> {
        self.rest_client
            .get_wallet_balance(blockchain, wallet, ETHER_ADDRESS)
            .await
    }

    async fn get_token_balance(
        &self,
        blockchain: Blockchain,
        token: &str,
        wallet: &str,
    ) -> Result<Decimal> {
        self.rest_client
            .get_wallet_balance(blockchain, wallet, &token.to_lowercase())
            .await
    }

    #[instrument(skip(self))]
    async fn submit_trade(
        &self,
        blockchain: Blockchain,
        token_amount: Decimal,
        order_tx: &str,
    ) -> Result<TransactionHandle> {
        self.signer
            .new_trade(blockchain, token_amount, order_tx)
            .await
            .map_err(|e| match e {
                BotError::Submission(_) => e,
                other => BotError::Submission(other.to_string()),
            })
    }

    #[instrument(skip(self), fields(tx = %handle))]
    async fn await_confirmation(&self, handle: &TransactionHandle) -> Result<TerminalStatus> {
        if handle.simulated {
            return Ok(TerminalStatus::Confirmed);
        }

        let deadline = Instant::now() + self.confirmation_timeout;
        loop {
            match self
                .rest_client
                .get_trade_by_tx(handle.blockchain, &handle.tx_hash)
                .await
            {
                Ok(Some(_)) => {
                    info!("Trade confirmed");
                    return Ok(TerminalStatus::Confirmed);
                }
                Ok(None) => debug!("Trade not indexed yet"),
                Err(e) => warn!(error = %e, "Confirmation lookup failed, retrying"),
            }

            if let Some(reason) = self.reverted(handle).await {
                warn!(%reason, "Trade failed on chain");
                return Ok(TerminalStatus::Failed(reason));
            }

            if Instant::now() + self.poll_interval > deadline {
                return Err(BotError::Confirmation(format!(
                    "{} not confirmed within {:?}",
                    handle, self.confirmation_timeout
                )));
            }
            sleep(self.poll_interval).await;
        }
    }
}
