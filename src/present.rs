// src/present.rs
//! Presentation boundary. The core hands a [`MeterReading`] to a
//! [`MeterPresenter`] once per cycle and knows nothing about how it is shown.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock};

use crate::aggregate::CycleResult;

/// Suggested length of the update pulse on the gauge.
pub const FLASH_MS: u64 = 100;

/// Gauge needle sweep: index 0 → -110°, index 100 → +110°.
pub fn gauge_angle(index: f64) -> f64 {
    (index / 100.0) * 220.0 - 110.0
}

/// Index rounded half-up to a whole percent.
pub fn percent(index: f64) -> i64 {
    (index + 0.5).floor() as i64
}

pub fn percent_label(index: f64) -> String {
    format!("{}%", percent(index))
}

/// One cycle as the presentation layer sees it. Feed failures are not part
/// of it; they only reach logs and metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterReading {
    pub index: f64,
    pub evidence: Vec<String>,
    pub total_entries: u64,
    pub raw_score: f64,
    pub computed_at: DateTime<Utc>,
}

impl MeterReading {
    pub fn from_cycle(result: &CycleResult, computed_at: DateTime<Utc>) -> Self {
        Self {
            index: result.index(),
            evidence: result.evidence_lines(),
            total_entries: result.total_entries,
            raw_score: result.raw_score,
            computed_at,
        }
    }

    pub fn gauge(&self) -> GaugeView {
        GaugeView {
            index: self.index,
            percent: percent(self.index),
            label: percent_label(self.index),
            angle_deg: gauge_angle(self.index),
            flash_ms: FLASH_MS,
            evidence: self.evidence.clone(),
            total_entries: self.total_entries,
            computed_at: self.computed_at,
        }
    }
}

/// What a gauge page needs to draw one update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeView {
    pub index: f64,
    pub percent: i64,
    pub label: String,
    pub angle_deg: f64,
    pub flash_ms: u64,
    pub evidence: Vec<String>,
    pub total_entries: u64,
    pub computed_at: DateTime<Utc>,
}

pub trait MeterPresenter: Send + Sync {
    fn render(&self, reading: &MeterReading);
}

/// Writes each reading to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl MeterPresenter for LogPresenter {
    fn render(&self, reading: &MeterReading) {
        tracing::info!(
            target: "meter",
            label = %percent_label(reading.index),
            angle_deg = gauge_angle(reading.index),
            evidence = reading.evidence.len(),
            "meter updated"
        );
        for line in reading.evidence.iter().take(10) {
            tracing::debug!(target: "meter", %line, "evidence");
        }
    }
}

/// Keeps the latest reading for pull-style consumers (HTTP API).
#[derive(Debug, Default)]
pub struct SnapshotPresenter {
    latest: RwLock<Option<MeterReading>>,
}

impl SnapshotPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<MeterReading> {
        self.latest
            .read()
            .expect("snapshot lock poisoned")
            .clone()
    }
}

impl MeterPresenter for SnapshotPresenter {
    fn render(&self, reading: &MeterReading) {
        *self.latest.write().expect("snapshot lock poisoned") = Some(reading.clone());
    }
}

/// Forwards every reading to each presenter, in order.
#[derive(Default, Clone)]
pub struct FanoutPresenter {
    sinks: Vec<Arc<dyn MeterPresenter>>,
}

impl FanoutPresenter {
    pub fn new(sinks: Vec<Arc<dyn MeterPresenter>>) -> Self {
        Self { sinks }
    }
}

impl MeterPresenter for FanoutPresenter {
    fn render(&self, reading: &MeterReading) {
        for s in &self.sinks {
            s.render(reading);
        }
    }
}
