//! Pivot point support and resistance levels
//!
//! Classic floor-trader pivots, averaged over every observation fed so far:
//! - Pivot = (High + Low + Close) / 3
//! - R1 = 2 * Pivot - Low,  S1 = 2 * Pivot - High
//! - R2 = Pivot + R1 - S1,  S2 = Pivot - R1 - S1
//!
//! High and Low are the extremes across all observations, Pivot is the mean
//! of the per-observation pivots.

use serde::{Deserialize, Serialize};

use crate::models::Quote;

/// Anything that exposes the three prices a pivot is built from
pub trait PivotInput {
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
}

impl PivotInput for Quote {
    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }
}

/// Explicit (high, low, close) triple for callers without a full quote
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTriple {
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceTriple {
    pub fn new(high: f64, low: f64, close: f64) -> Self {
        Self { high, low, close }
    }

    /// Degenerate triple where a single representative price stands in for
    /// high, low and close alike
    pub fn flat(price: f64) -> Self {
        Self::new(price, price, price)
    }
}

impl PivotInput for PriceTriple {
    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }
}

/// Snapshot of the derived levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PivotLevels {
    pub pivot: f64,
    pub resistance_1: f64,
    pub support_1: f64,
    pub resistance_2: f64,
    pub support_2: f64,
    pub max: f64,
    pub min: f64,
}

/// Running pivot aggregator
///
/// Built fresh per query and dropped once the levels are read. Before the
/// first feed max is 0, min is +inf and every level is 0.
#[derive(Debug, Clone)]
pub struct PivotAccumulator {
    max: f64,
    min: f64,
    pivots: Vec<f64>,
    resistance_1: f64,
    support_1: f64,
    resistance_2: f64,
    support_2: f64,
}

impl Default for PivotAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl PivotAccumulator {
    pub fn new() -> Self {
        Self {
            max: 0.0,
            min: f64::INFINITY,
            pivots: Vec::new(),
            resistance_1: 0.0,
            support_1: 0.0,
            resistance_2: 0.0,
            support_2: 0.0,
        }
    }

    /// Ingest one observation and recompute all four levels
    pub fn feed<P: PivotInput + ?Sized>(&mut self, input: &P) {
        let pivot = (input.high() + input.low() + input.close()) / 3.0;
        self.max = self.max.max(input.high());
        self.min = self.min.min(input.low());
        self.pivots.push(pivot);

        let mean = self.pivots.iter().sum::<f64>() / self.pivots.len() as f64;
        self.resistance_1 = mean * 2.0 - self.min;
        self.support_1 = mean * 2.0 - self.max;
        self.resistance_2 = mean + self.resistance_1 - self.support_1;
        self.support_2 = mean - self.resistance_1 - self.support_1;
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn r1(&self) -> f64 {
        self.resistance_1
    }

    pub fn s1(&self) -> f64 {
        self.support_1
    }

    pub fn r2(&self) -> f64 {
        self.resistance_2
    }

    pub fn s2(&self) -> f64 {
        self.support_2
    }

    /// Per-observation pivots in feed order
    pub fn pivots(&self) -> &[f64] {
        &self.pivots
    }

    pub fn len(&self) -> usize {
        self.pivots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pivots.is_empty()
    }

    pub fn mean_pivot(&self) -> Option<f64> {
        if self.pivots.is_empty() {
            return None;
        }
        Some(self.pivots.iter().sum::<f64>() / self.pivots.len() as f64)
    }

    /// Current levels, or None if nothing has been fed yet
    pub fn levels(&self) -> Option<PivotLevels> {
        let pivot = self.mean_pivot()?;
        Some(PivotLevels {
            pivot,
            resistance_1: self.resistance_1,
            support_1: self.support_1,
            resistance_2: self.resistance_2,
            support_2: self.support_2,
            max: self.max,
            min: self.min,
        })
    }
}
