//! Opportunity detection

use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::common::errors::Result;
use crate::common::traits::Venue;
use crate::common::types::{Action, Quote};
use crate::strategy::types::{PendingAction, StrategyConfig};

/// Checks each strategy's threshold against a fresh quote
#[derive(Clone)]
pub struct OpportunityDetector {
    venue: Arc<dyn Venue>,
}

/// Pending actions found in one detection pass
#[derive(Debug, Default)]
pub struct Detection {
    /// In configuration order
    pub pending: Vec<PendingAction>,
    /// Strategies whose quote could not be fetched
    pub failures: usize,
}

impl OpportunityDetector {
    pub fn new(venue: Arc<dyn Venue>) -> Self {
        Self { venue }
    }

    /// Fetch the quote for one strategy and evaluate it
    #[instrument(skip(self, strategy), fields(strategy = %strategy.label()))]
    pub async fn detect(&self, strategy: &Arc<StrategyConfig>) -> Result<Option<PendingAction>> {
        let quote = self
            .venue
            .get_quote(&strategy.token, strategy.blockchain)
            .await?;
        debug!(
            best_buy = ?quote.best_buy_price,
            best_sell = ?quote.best_sell_price,
            "Quote"
        );
        Ok(evaluate(strategy, quote))
    }

    /// Run detection for every strategy concurrently
    ///
    /// A failed quote skips only that strategy.
    pub async fn detect_all(&self, strategies: &[Arc<StrategyConfig>]) -> Detection {
        let results = join_all(strategies.iter().map(|s| self.detect(s))).await;

        let mut detection = Detection::default();
        for (strategy, result) in strategies.iter().zip(results) {
            match result {
                Ok(Some(action)) => detection.pending.push(action),
                Ok(None) => {}
                Err(e) => {
                    warn!(strategy = %strategy.label(), error = %e, "Failed to fetch quote");
                    detection.failures += 1;
                }
            }
        }
        detection
    }
}

/// Decide whether `quote` satisfies the strategy's threshold
///
/// Buys fill the best sell order when it is at or below the threshold;
/// sells fill the best buy order when it is at or above it. A side with no
/// resting order is never an opportunity.
pub fn evaluate(strategy: &Arc<StrategyConfig>, quote: Quote) -> Option<PendingAction> {
    let (price, order_tx) = match strategy.action {
        Action::Buy => {
            let price = quote.best_sell_price?;
            if price > strategy.price_threshold {
                return None;
            }
            (price, quote.best_sell_order_tx.clone()?)
        }
        Action::Sell => {
            let price = quote.best_buy_price?;
            if price < strategy.price_threshold {
                return None;
            }
            (price, quote.best_buy_order_tx.clone()?)
        }
    };

    Some(PendingAction {
        strategy: Arc::clone(strategy),
        quote,
        order_tx,
        quoted_price: price,
    })
}
