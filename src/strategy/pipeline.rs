//! Serial execution of pending actions
//!
//! Every action shares the one trading wallet, so trades are sized,
//! submitted and confirmed strictly one at a time: action *k+1* is not
//! sized before action *k*'s confirmation (or failure) is observed. This
//! keeps nonces ordered and stops two actions from spending the same
//! balance snapshot.

use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::common::traits::Venue;
use crate::common::types::TerminalStatus;
use crate::strategy::size_calculator::TradeSizer;
use crate::strategy::types::{ActionOutcome, ActionReport, PendingAction, Sizing};

/// Runs a queue of pending actions to completion
#[derive(Clone)]
pub struct ExecutionPipeline {
    venue: Arc<dyn Venue>,
    sizer: TradeSizer,
}

impl ExecutionPipeline {
    pub fn new(venue: Arc<dyn Venue>, sizer: TradeSizer) -> Self {
        Self { venue, sizer }
    }

    /// Execute every action in order and report each outcome
    ///
    /// Always drains the queue; a failed action never stops the ones
    /// behind it.
    pub async fn run(&self, actions: Vec<PendingAction>) -> Vec<ActionReport> {
        let mut queue: VecDeque<PendingAction> = actions.into();
        let mut reports = Vec::with_capacity(queue.len());

        while let Some(action) = queue.pop_front() {
            let strategy = action.label();
            let outcome = self.execute(action).await;
            reports.push(ActionReport { strategy, outcome });
        }

        reports
    }

    /// Size, submit and confirm a single action
    pub async fn execute(&self, action: PendingAction) -> ActionOutcome {
        let strategy = Arc::clone(&action.strategy);
        info!(
            "{} opportunity for {}::{} @ {}",
            strategy.action, strategy.blockchain, strategy.token, action.quoted_price
        );

        let trade = match self.sizer.size(&action).await {
            Ok(Sizing::Trade(trade)) => trade,
            Ok(Sizing::Skip(reason)) => {
                info!(strategy = %strategy.label(), "Skipping: {}", reason);
                return ActionOutcome::Skipped(reason);
            }
            Err(e) => {
                warn!(strategy = %strategy.label(), error = %e, "Failed to size trade");
                return ActionOutcome::Failed(e.to_string());
            }
        };

        let handle = match self
            .venue
            .submit_trade(strategy.blockchain, trade.token_amount, &action.order_tx)
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                error!(strategy = %strategy.label(), error = %e, "Trade submission failed");
                return ActionOutcome::Failed(e.to_string());
            }
        };

        info!(
            tx = %handle,
            "Attempting to {} {} tokens",
            strategy.action, trade.token_amount
        );

        match self.venue.await_confirmation(&handle).await {
            Ok(TerminalStatus::Confirmed) => {
                info!(tx = %handle, ether = %trade.ether_amount(), "Trade confirmed");
                ActionOutcome::Executed { handle, trade }
            }
            Ok(TerminalStatus::Failed(reason)) => {
                error!(tx = %handle, %reason, "Trade failed on chain");
                ActionOutcome::Failed(reason)
            }
            Err(e) => {
                error!(tx = %handle, error = %e, "Trade confirmation failed");
                ActionOutcome::Failed(e.to_string())
            }
        }
    }
}
