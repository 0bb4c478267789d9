use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::common::errors::BotError;
use crate::common::types::{Action, Blockchain, Quote, TransactionHandle};
use crate::config::types::StrategyRow;

/// Balances and allowances at or below this are treated as exhausted
pub const EPSILON: Decimal = dec!(0.00005);

/// A validated strategy row
///
/// Immutable once loaded; shared by reference for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Token contract address, lowercased
    pub token: String,
    pub blockchain: Blockchain,
    pub action: Action,
    /// Buy at or below / sell at or above this price (ether per token)
    pub price_threshold: Decimal,
    /// Maximum ether volume traded per trailing hour
    pub hourly_ether_limit: Decimal,
}

impl StrategyConfig {
    /// Short human-readable label, e.g. `ETC::0xabc… buy`
    pub fn label(&self) -> String {
        format!("{}::{} {}", self.blockchain, self.token, self.action)
    }
}

impl TryFrom<&StrategyRow> for StrategyConfig {
    type Error = BotError;

    fn try_from(row: &StrategyRow) -> Result<Self, Self::Error> {
        let token = row.token.trim().to_lowercase();
        if token.is_empty() {
            return Err(BotError::InvalidStrategy("token address is empty".to_string()));
        }

        let price_threshold: Decimal = row.price.trim().parse().map_err(|e| {
            BotError::InvalidStrategy(format!("invalid price {:?}: {}", row.price, e))
        })?;
        if price_threshold <= Decimal::ZERO {
            return Err(BotError::InvalidStrategy(format!(
                "price must be positive, got {}",
                price_threshold
            )));
        }

        let hourly_ether_limit: Decimal = row.houretherlimit.trim().parse().map_err(|e| {
            BotError::InvalidStrategy(format!(
                "invalid hourly ether limit {:?}: {}",
                row.houretherlimit, e
            ))
        })?;
        if hourly_ether_limit < Decimal::ZERO {
            return Err(BotError::InvalidStrategy(format!(
                "hourly ether limit must not be negative, got {}",
                hourly_ether_limit
            )));
        }

        Ok(Self {
            token,
            blockchain: row.blockchain.parse()?,
            action: row.action.parse()?,
            price_threshold,
            hourly_ether_limit,
        })
    }
}

/// A detected opportunity waiting to be sized and executed
///
/// Consumed by value when executed, so it can run at most once.
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub strategy: Arc<StrategyConfig>,
    /// Quote snapshot the opportunity was detected on
    pub quote: Quote,
    /// Order to fill
    pub order_tx: String,
    /// Price that crossed the threshold
    pub quoted_price: Decimal,
}

impl PendingAction {
    pub fn label(&self) -> String {
        self.strategy.label()
    }
}

/// Why a pending action ended without a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Hourly ether allowance is used up
    LimitReached { allowance: Decimal },
    /// Wallet holds no usable ether (buy) or tokens (sell)
    InsufficientFunds { balance: Decimal },
    /// Sized amount truncates to zero at the token's precision
    BelowPrecision,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::LimitReached { allowance } => {
                write!(f, "hourly trade limit reached (remaining {})", allowance)
            }
            SkipReason::InsufficientFunds { balance } => {
                write!(f, "not enough funds in wallet (balance {})", balance)
            }
            SkipReason::BelowPrecision => write!(f, "trade size rounds down to zero"),
        }
    }
}

/// A trade ready to submit, with the bounds it was sized against
#[derive(Debug, Clone, PartialEq)]
pub struct SizedTrade {
    pub token_amount: Decimal,
    /// Order price the amount was converted at
    pub price: Decimal,
    pub allowance: Decimal,
    pub order_ether_balance: Decimal,
    /// Ether (buy) or token (sell) balance of the wallet at sizing time
    pub wallet_balance: Decimal,
}

impl SizedTrade {
    /// Ether value of the sized amount at the order price
    pub fn ether_amount(&self) -> Decimal {
        self.token_amount * self.price
    }
}

/// Result of sizing a pending action
#[derive(Debug, Clone, PartialEq)]
pub enum Sizing {
    Trade(SizedTrade),
    Skip(SkipReason),
}

/// How a pending action ended
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Submitted and confirmed
    Executed {
        handle: TransactionHandle,
        trade: SizedTrade,
    },
    /// Nothing submitted
    Skipped(SkipReason),
    /// Sizing, submission or confirmation failed
    Failed(String),
}

impl ActionOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }
}

/// Outcome of one pending action, tagged with its strategy
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub strategy: String,
    pub outcome: ActionOutcome,
}

/// Summary of one poll cycle
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Strategies whose quote could not be fetched
    pub failed_detections: usize,
    pub actions: Vec<ActionReport>,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn executed(&self) -> usize {
        self.actions.iter().filter(|a| a.outcome.is_executed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a.outcome, ActionOutcome::Skipped(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a.outcome, ActionOutcome::Failed(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> StrategyRow {
        StrategyRow {
            token: "0xAC55641CBB734BDF6510D1BBD62E240C2409040F".to_string(),
            blockchain: "etc".to_string(),
            action: "buy".to_string(),
            price: "0.002".to_string(),
            houretherlimit: "10".to_string(),
        }
    }

    #[test]
    fn test_strategy_from_row() {
        let strategy = StrategyConfig::try_from(&row()).unwrap();

        assert_eq!(strategy.token, "0xac55641cbb734bdf6510d1bbd62e240c2409040f");
        assert_eq!(strategy.blockchain, Blockchain::Etc);
        assert_eq!(strategy.action, Action::Buy);
        assert_eq!(strategy.price_threshold, dec!(0.002));
        assert_eq!(strategy.hourly_ether_limit, dec!(10));
    }

    #[test]
    fn test_strategy_rejects_bad_values() {
        let mut bad_price = row();
        bad_price.price = "cheap".to_string();
        assert!(StrategyConfig::try_from(&bad_price).is_err());

        let mut zero_price = row();
        zero_price.price = "0".to_string();
        assert!(StrategyConfig::try_from(&zero_price).is_err());

        let mut negative_limit = row();
        negative_limit.houretherlimit = "-1".to_string();
        assert!(StrategyConfig::try_from(&negative_limit).is_err());

        let mut bad_action = row();
        bad_action.action = "short".to_string();
        assert!(matches!(
            StrategyConfig::try_from(&bad_action),
            Err(BotError::InvalidStrategy(_))
        ));
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::LimitReached { allowance: dec!(0.00004) };
        assert!(reason.to_string().contains("limit reached"));
    }
}
