// src/scheduler.rs
//! Fixed-period polling with a single-flight guard.
//!
//! At most one cycle is in flight. Ticks stay on the fixed `period` grid
//! measured from startup. A tick whose deadline falls before the previous
//! cycle finished is dropped, not run late, so after a long cycle the next
//! run starts on the first grid point past its end. An explicit trigger
//! (`POST /refresh`) that arrives while a cycle runs is refused.

use chrono::Utc;
use metrics::counter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::aggregate::Aggregator;
use crate::present::{MeterPresenter, MeterReading};

pub struct CycleRunner {
    aggregator: Aggregator,
    presenter: Arc<dyn MeterPresenter>,
    busy: AtomicBool,
}

/// Clears the busy flag on drop, including when the cycle future is cancelled.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CycleRunner {
    pub fn new(aggregator: Aggregator, presenter: Arc<dyn MeterPresenter>) -> Self {
        Self {
            aggregator,
            presenter,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one cycle and render it, unless one is already running (`None`).
    pub async fn try_run(&self) -> Option<MeterReading> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            counter!("meter_cycles_skipped_total").increment(1);
            tracing::debug!(target: "meter", "cycle already in flight; skipped");
            return None;
        }
        let _guard = BusyGuard(&self.busy);

        let result = self.aggregator.run_cycle().await;
        let reading = MeterReading::from_cycle(&result, Utc::now());
        self.presenter.render(&reading);
        Some(reading)
    }
}

/// Spawn the polling loop. The first cycle starts immediately.
pub fn spawn_scheduler(runner: Arc<CycleRunner>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(target: "meter", period_secs = period.as_secs_f64(), "scheduler started");
        let mut last_end: Option<Instant> = None;
        loop {
            let deadline = ticker.tick().await;
            // `Skip` still fires the first missed tick immediately
            if last_end.is_some_and(|end| deadline < end) {
                counter!("meter_ticks_dropped_total").increment(1);
                tracing::debug!(target: "meter", "tick elapsed during previous cycle; dropped");
                continue;
            }
            runner.try_run().await;
            last_end = Some(Instant::now());
        }
    })
}
