//! Poll loop driving detection and execution

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

use crate::common::traits::Venue;
use crate::strategy::detector::OpportunityDetector;
use crate::strategy::pipeline::ExecutionPipeline;
use crate::strategy::size_calculator::TradeSizer;
use crate::strategy::types::{CycleReport, StrategyConfig};

/// One full detect-then-execute pass over every strategy
pub struct TradingEngine {
    strategies: Vec<Arc<StrategyConfig>>,
    detector: OpportunityDetector,
    pipeline: ExecutionPipeline,
}

impl TradingEngine {
    pub fn new(
        venue: Arc<dyn Venue>,
        wallet: impl Into<String>,
        strategies: Vec<StrategyConfig>,
    ) -> Self {
        let sizer = TradeSizer::new(Arc::clone(&venue), wallet);
        Self {
            strategies: strategies.into_iter().map(Arc::new).collect(),
            detector: OpportunityDetector::new(Arc::clone(&venue)),
            pipeline: ExecutionPipeline::new(venue, sizer),
        }
    }

    /// Detect across all strategies, then drain the resulting actions
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();

        let detection = self.detector.detect_all(&self.strategies).await;
        if detection.pending.is_empty() {
            debug!("No opportunities this cycle");
        }
        let actions = self.pipeline.run(detection.pending).await;

        CycleReport {
            failed_detections: detection.failures,
            actions,
            elapsed: started.elapsed(),
        }
    }
}

/// Re-runs the trading cycle on a fixed delay
///
/// Cycles never overlap: the delay starts once the previous cycle has fully
/// drained, whatever its outcome.
pub struct PollScheduler {
    engine: Arc<TradingEngine>,
    delay: Duration,
}

impl PollScheduler {
    pub fn new(engine: Arc<TradingEngine>, delay: Duration) -> Self {
        Self { engine, delay }
    }

    fn spawn_cycle(&self) -> JoinHandle<CycleReport> {
        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move { engine.run_cycle().await })
    }

    fn finish(result: std::result::Result<CycleReport, JoinError>) -> Option<CycleReport> {
        match result {
            Ok(report) => {
                info!(
                    executed = report.executed(),
                    skipped = report.skipped(),
                    failed = report.failed(),
                    failed_detections = report.failed_detections,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "Poll cycle finished"
                );
                Some(report)
            }
            Err(e) => {
                error!(error = %e, "Poll cycle aborted");
                None
            }
        }
    }

    /// Run one cycle on its own task
    ///
    /// Returns `None` when the cycle panicked; the panic is logged and
    /// goes no further.
    pub async fn tick(&self) -> Option<CycleReport> {
        Self::finish(self.spawn_cycle().await)
    }

    /// Poll until `shutdown` resolves
    ///
    /// A shutdown during a cycle aborts it at its next suspension point;
    /// a trade already broadcast is not recalled.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(delay_secs = self.delay.as_secs_f64(), "Starting poll loop");

        loop {
            let mut cycle = self.spawn_cycle();
            tokio::select! {
                result = &mut cycle => {
                    Self::finish(result);
                }
                _ = &mut shutdown => {
                    cycle.abort();
                    break;
                }
            }
            tokio::select! {
                _ = sleep(self.delay) => {}
                _ = &mut shutdown => break,
            }
        }

        info!("Poll loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::{BotError, Result};
    use crate::common::traits::MockVenue;
    use crate::common::types::{
        Action, Blockchain, OrderDetail, Quote, TerminalStatus, TradeRecord, TransactionHandle,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn strategy(token: &str) -> StrategyConfig {
        StrategyConfig {
            token: token.to_string(),
            blockchain: Blockchain::Etc,
            action: Action::Sell,
            price_threshold: dec!(0.002),
            hourly_ether_limit: dec!(10),
        }
    }

    fn quiet_quote() -> Quote {
        Quote {
            best_buy_price: Some(dec!(0.0015)),
            best_sell_price: Some(dec!(0.0018)),
            best_buy_order_tx: Some("0xbuy".to_string()),
            best_sell_order_tx: Some("0xsell".to_string()),
            decimals: 4,
        }
    }

    #[tokio::test]
    async fn test_cycle_without_opportunities_writes_nothing() {
        let mut venue = MockVenue::new();
        venue
            .expect_get_quote()
            .times(2)
            .returning(|_, _| Ok(quiet_quote()));
        venue.expect_submit_trade().never();

        let engine = TradingEngine::new(
            Arc::new(venue),
            "0x1111111111111111111111111111111111111111",
            vec![strategy("0xa"), strategy("0xb")],
        );
        let report = engine.run_cycle().await;

        assert!(report.actions.is_empty());
        assert_eq!(report.failed_detections, 0);
    }

    /// Panics on the first quote, fails every later one
    struct PanickyVenue {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Venue for PanickyVenue {
        async fn get_quote(&self, _token: &str, _blockchain: Blockchain) -> Result<Quote> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("venue client blew up");
            }
            Err(BotError::VenueQuery("status 503".to_string()))
        }

        async fn get_trade_history(
            &self,
            _token: &str,
            _blockchain: Blockchain,
            _action: Action,
            _since: DateTime<Utc>,
        ) -> Result<Vec<TradeRecord>> {
            unreachable!()
        }

        async fn get_order_detail(&self, _: Blockchain, _: &str) -> Result<OrderDetail> {
            unreachable!()
        }

        async fn get_ether_balance(&self, _: Blockchain, _: &str) -> Result<Decimal> {
            unreachable!()
        }

        async fn get_token_balance(&self, _: Blockchain, _: &str, _: &str) -> Result<Decimal> {
            unreachable!()
        }

        async fn submit_trade(
            &self,
            _: Blockchain,
            _: Decimal,
            _: &str,
        ) -> Result<TransactionHandle> {
            unreachable!()
        }

        async fn await_confirmation(&self, _: &TransactionHandle) -> Result<TerminalStatus> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_panicking_cycle_does_not_stop_the_loop() {
        let venue = PanickyVenue {
            calls: AtomicUsize::new(0),
        };
        let engine = Arc::new(TradingEngine::new(
            Arc::new(venue),
            "0x1111111111111111111111111111111111111111",
            vec![strategy("0xa")],
        ));
        let scheduler = PollScheduler::new(engine, Duration::from_millis(10));

        assert!(scheduler.tick().await.is_none());
        let report = scheduler.tick().await.unwrap();
        assert_eq!(report.failed_detections, 1);
    }

    #[tokio::test]
    async fn test_run_repeats_until_shutdown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut venue = MockVenue::new();
        venue.expect_get_quote().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(quiet_quote())
        });

        let engine = Arc::new(TradingEngine::new(
            Arc::new(venue),
            "0x1111111111111111111111111111111111111111",
            vec![strategy("0xa")],
        ));
        let scheduler = PollScheduler::new(engine, Duration::from_millis(20));

        scheduler.run(sleep(Duration::from_millis(150))).await;

        let cycles = calls.load(Ordering::SeqCst);
        assert!(cycles >= 2, "expected repeated cycles, got {}", cycles);
        assert!(cycles <= 10, "cycles overlapped or ignored the delay: {}", cycles);
    }
}
