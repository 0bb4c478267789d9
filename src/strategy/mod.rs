//! Strategy module: threshold detection, trade sizing and execution
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 DETECTION (concurrent)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PollScheduler tick                                         │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  OpportunityDetector, one quote per strategy                │
//! │    - buy:  best sell price <= threshold                     │
//! │    - sell: best buy price  >= threshold                     │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  PendingActions, in configuration order                     │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 EXECUTION (strictly serial)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ExecutionPipeline pops one action                          │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  TradeSizer                                                 │
//! │    - hourly allowance      (VolumeAccountant)               │
//! │    - counterparty order ether balance                       │
//! │    - wallet balance                                         │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  submit_trade → await_confirmation → next action            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`OpportunityDetector`]: turns fresh quotes into [`PendingAction`]s
//! - [`VolumeAccountant`]: ether volume left in the trailing hour
//! - [`TradeSizer`]: three-way minimum, truncated to token precision
//! - [`ExecutionPipeline`]: serial queue runner with per-action outcomes
//! - [`PollScheduler`]: fixed-delay loop isolating each cycle's failures

mod detector;
mod pipeline;
mod scheduler;
mod size_calculator;
mod types;
mod volume;

pub use types::{
    ActionOutcome,
    ActionReport,
    CycleReport,
    PendingAction,
    SizedTrade,
    Sizing,
    SkipReason,
    StrategyConfig,
    EPSILON,
};

pub use detector::{evaluate, Detection, OpportunityDetector};

pub use volume::{consumed_volume, VolumeAccountant, VOLUME_WINDOW_SECONDS};

pub use size_calculator::{ether_to_tokens, round_down, TradeSizer};

pub use pipeline::ExecutionPipeline;

pub use scheduler::{PollScheduler, TradingEngine};
