//! Paper trading signer
//!
//! Records the trades the agent would have made without signing or
//! broadcasting anything. Quotes, orders and balances still come from the
//! live venue. Paper trades never reach the venue's trade history, so they
//! do not use up the hourly allowance: every cycle that finds an
//! opportunity sizes against the full remaining limit again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::common::errors::Result;
use crate::common::traits::TradeSigner;
use crate::common::types::{Blockchain, TransactionHandle};

/// A trade that would have been broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct PaperTrade {
    pub blockchain: Blockchain,
    pub order_tx: String,
    pub token_amount: Decimal,
    pub tx_hash: String,
    pub recorded_at: DateTime<Utc>,
}

/// Signer that only records trades
#[derive(Debug, Clone)]
pub struct PaperSigner {
    address: String,
    counter: Arc<AtomicU64>,
    trades: Arc<RwLock<Vec<PaperTrade>>>,
}

impl PaperSigner {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            counter: Arc::new(AtomicU64::new(0)),
            trades: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Every trade recorded so far, oldest first
    pub async fn trades(&self) -> Vec<PaperTrade> {
        self.trades.read().await.clone()
    }
}

#[async_trait]
impl TradeSigner for PaperSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn new_trade(
        &self,
        blockchain: Blockchain,
        token_amount: Decimal,
        order_tx: &str,
    ) -> Result<TransactionHandle> {
        let sequence = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let tx_hash = format!("0x{:064x}", sequence);

        self.trades.write().await.push(PaperTrade {
            blockchain,
            order_tx: order_tx.to_string(),
            token_amount,
            tx_hash: tx_hash.clone(),
            recorded_at: Utc::now(),
        });

        info!(
            chain = %blockchain,
            order_tx,
            %token_amount,
            "Paper trade recorded"
        );

        Ok(TransactionHandle {
            blockchain,
            tx_hash,
            simulated: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_records_trades_with_unique_hashes() {
        let signer = PaperSigner::new("0x1111111111111111111111111111111111111111");

        let first = signer.new_trade(Blockchain::Etc, dec!(1.5), "0xaaa").await.unwrap();
        let second = signer.new_trade(Blockchain::Eth, dec!(2), "0xbbb").await.unwrap();

        assert!(first.simulated);
        assert_ne!(first.tx_hash, second.tx_hash);
        assert_eq!(first.tx_hash.len(), 66);

        let trades = signer.trades().await;
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].order_tx, "0xaaa");
        assert_eq!(trades[1].token_amount, dec!(2));
    }

    #[test]
    fn test_reports_the_configured_wallet() {
        let signer = PaperSigner::new("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd");
        assert_eq!(signer.address(), "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd");
    }
}
