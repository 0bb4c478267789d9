//! Pricewatch Library
//!
//! Watches quoted prices for token/blockchain pairs on the Saturn Network
//! order book and automatically buys or sells when a configured threshold
//! is crossed, within an hourly ether volume cap and the wallet's balance.

pub mod common;
pub mod config;
pub mod saturn;
pub mod strategy;

// Re-export commonly used types
pub use common::errors::{BotError, Result};
pub use common::traits::{TradeSigner, Venue};
pub use common::types::{
    Action, Blockchain, OrderDetail, Quote, TerminalStatus, TradeRecord, TransactionHandle,
};
pub use config::types::AppConfig;
pub use saturn::{PaperSigner, SaturnRestClient, SaturnVenue};

// Strategy types
pub use strategy::{
    ActionOutcome, ActionReport, CycleReport, ExecutionPipeline, OpportunityDetector,
    PendingAction, PollScheduler, SizedTrade, Sizing, SkipReason, StrategyConfig, TradeSizer,
    TradingEngine, VolumeAccountant, EPSILON,
};
