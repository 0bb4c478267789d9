use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::common::errors::{BotError, Result};
use crate::common::traits::Venue;
use crate::common::types::Action;
use crate::strategy::types::{PendingAction, SizedTrade, Sizing, SkipReason, EPSILON};
use crate::strategy::volume::VolumeAccountant;

/// Largest scale a `Decimal` can carry
const MAX_SCALE: u32 = 28;

/// Truncate `value` toward zero at `decimals` places
///
/// Never rounds up, so a truncated amount can't exceed the balance or
/// liquidity it was derived from.
pub fn round_down(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals.min(MAX_SCALE), RoundingStrategy::ToZero)
}

/// Convert an ether amount to tokens at `price`, truncated to `decimals`
///
/// The result times `price` never exceeds `ether`.
pub fn ether_to_tokens(ether: Decimal, price: Decimal, decimals: u32) -> Result<Decimal> {
    if price <= Decimal::ZERO {
        return Err(BotError::VenueQuery(format!("Invalid order price {}", price)));
    }
    if ether <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let quotient = ether
        .checked_div(price)
        .ok_or_else(|| BotError::Internal(format!("Overflow dividing {} by {}", ether, price)))?;
    let scale = decimals.min(MAX_SCALE);
    let mut amount = round_down(quotient, scale);

    // The quotient's last digit may have been rounded up by the division
    // itself; step back one unit when that leaks past truncation.
    let overshoots = amount
        .checked_mul(price)
        .map(|value| value > ether)
        .unwrap_or(true);
    if overshoots && amount > Decimal::ZERO {
        amount -= Decimal::new(1, scale);
    }

    Ok(amount.max(Decimal::ZERO))
}

/// Sizes a pending action against the three live constraints
///
/// The trade is bounded by, in this order: the remaining hourly allowance,
/// the counterparty order's remaining ether value, and the wallet's own
/// balance. Every input is fetched at sizing time.
#[derive(Clone)]
pub struct TradeSizer {
    venue: Arc<dyn Venue>,
    accountant: VolumeAccountant,
    wallet: String,
}

impl TradeSizer {
    pub fn new(venue: Arc<dyn Venue>, wallet: impl Into<String>) -> Self {
        Self {
            accountant: VolumeAccountant::new(Arc::clone(&venue)),
            venue,
            wallet: wallet.into(),
        }
    }

    #[instrument(skip(self, action), fields(strategy = %action.label(), order = %action.order_tx))]
    pub async fn size(&self, action: &PendingAction) -> Result<Sizing> {
        let strategy = &action.strategy;
        let decimals = action.quote.decimals;

        let allowance = self
            .accountant
            .allowed_remaining(
                &strategy.token,
                strategy.blockchain,
                strategy.action,
                &self.wallet,
                strategy.hourly_ether_limit,
            )
            .await?;
        if allowance <= EPSILON {
            return Ok(Sizing::Skip(SkipReason::LimitReached { allowance }));
        }

        let order = self
            .venue
            .get_order_detail(strategy.blockchain, &action.order_tx)
            .await?;
        if order.price <= Decimal::ZERO {
            return Err(BotError::VenueQuery(format!(
                "Order {} has invalid price {}",
                action.order_tx, order.price
            )));
        }
        let capped = allowance.min(order.ether_balance);
        debug!(%allowance, order_ether = %order.ether_balance, %capped, "Capped by order");

        let (token_amount, wallet_balance) = match strategy.action {
            Action::Buy => {
                let balance = self
                    .venue
                    .get_ether_balance(strategy.blockchain, &self.wallet)
                    .await?;
                if balance <= EPSILON {
                    return Ok(Sizing::Skip(SkipReason::InsufficientFunds { balance }));
                }
                let trade_ether = capped.min(balance);
                (ether_to_tokens(trade_ether, order.price, decimals)?, balance)
            }
            Action::Sell => {
                let amount = ether_to_tokens(capped, order.price, decimals)?;
                let balance = self
                    .venue
                    .get_token_balance(strategy.blockchain, &strategy.token, &self.wallet)
                    .await?;
                if balance <= EPSILON {
                    return Ok(Sizing::Skip(SkipReason::InsufficientFunds { balance }));
                }
                (amount.min(round_down(balance, decimals)), balance)
            }
        };

        if token_amount <= Decimal::ZERO {
            return Ok(Sizing::Skip(SkipReason::BelowPrecision));
        }

        Ok(Sizing::Trade(SizedTrade {
            token_amount,
            price: order.price,
            allowance,
            order_ether_balance: order.ether_balance,
            wallet_balance,
        }))
    }
}
