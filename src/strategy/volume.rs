//! Trailing-hour volume accounting

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::common::errors::{BotError, Result};
use crate::common::traits::Venue;
use crate::common::types::{Action, Blockchain, TradeRecord};

/// Length of the trailing volume window
pub const VOLUME_WINDOW_SECONDS: i64 = 3600;

/// Computes how much ether volume a wallet may still trade this hour
#[derive(Clone)]
pub struct VolumeAccountant {
    venue: Arc<dyn Venue>,
}

impl VolumeAccountant {
    pub fn new(venue: Arc<dyn Venue>) -> Self {
        Self { venue }
    }

    /// Remaining allowance for the trailing hour ending now
    ///
    /// May be negative when the limit was lowered or overshot.
    pub async fn allowed_remaining(
        &self,
        token: &str,
        blockchain: Blockchain,
        action: Action,
        wallet: &str,
        limit: Decimal,
    ) -> Result<Decimal> {
        self.allowed_remaining_at(Utc::now(), token, blockchain, action, wallet, limit)
            .await
    }

    /// Remaining allowance for the trailing hour ending at `now`
    #[instrument(skip(self))]
    pub async fn allowed_remaining_at(
        &self,
        now: DateTime<Utc>,
        token: &str,
        blockchain: Blockchain,
        action: Action,
        wallet: &str,
        limit: Decimal,
    ) -> Result<Decimal> {
        let since = now - Duration::seconds(VOLUME_WINDOW_SECONDS);
        let trades = self
            .venue
            .get_trade_history(token, blockchain, action, since)
            .await?;

        let consumed = consumed_volume(&trades, wallet, action, since)?;
        debug!(%consumed, %limit, trades = trades.len(), "Hourly volume");

        limit.checked_sub(consumed).ok_or_else(|| {
            BotError::VenueQuery(format!("Hourly volume {} overflows against {}", consumed, limit))
        })
    }
}

/// Ether volume `wallet` traded on `action`'s side at or after `since`
///
/// Fails instead of overflowing when the venue reports absurd amounts.
pub fn consumed_volume(
    trades: &[TradeRecord],
    wallet: &str,
    action: Action,
    since: DateTime<Utc>,
) -> Result<Decimal> {
    trades
        .iter()
        .filter(|trade| trade.timestamp >= since && trade.involves(wallet))
        .try_fold(Decimal::ZERO, |total, trade| {
            total.checked_add(trade.volume_for(action)).ok_or_else(|| {
                BotError::VenueQuery(format!(
                    "Trade volume overflows after {} ether",
                    total
                ))
            })
        })
}
