//! Hammer candlestick detection
//!
//! A hammer has a small body and one long wick. When the upper wick is the
//! long one it is reported as an inverted hammer.

use serde::{Deserialize, Serialize};

use crate::models::Quote;

/// Ceiling for wick / body ratios when the body is zero or tiny
pub const MAX_WICK_RATIO: f64 = 100.0;

/// How the candle body is measured
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BodyMode {
    /// `|close - open|`. A zero wick counts as ratio 0 and ratios are capped
    /// at `MAX_WICK_RATIO`, so a doji with one long wick still qualifies and
    /// a flat candle reports strength 0.
    #[default]
    OpenClose,
    /// `|close - close|`, always zero. Every ratio divides by zero, so no
    /// candle ever qualifies. Kept to reproduce historical signal output.
    Literal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HammerConfig {
    /// Maximum short-wick / body ratio
    pub body_tolerance: f64,
    /// Minimum long-wick / body ratio
    pub wick_tolerance: f64,
    pub body_mode: BodyMode,
}

impl Default for HammerConfig {
    fn default() -> Self {
        Self {
            body_tolerance: 0.4,
            wick_tolerance: 2.0,
            body_mode: BodyMode::OpenClose,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HammerSignal {
    pub is_hammer: bool,
    pub is_inverted: bool,
    /// Long-wick / body ratio
    pub strength: f64,
}

impl HammerSignal {
    pub fn none() -> Self {
        Self {
            is_hammer: false,
            is_inverted: false,
            strength: 0.0,
        }
    }
}

/// Classify `today` given the previous day's quote
///
/// Returns `HammerSignal::none()` when the previous close is below today's
/// open.
pub fn detect_hammer(previous: &Quote, today: &Quote, config: &HammerConfig) -> HammerSignal {
    if previous.close < today.open {
        return HammerSignal::none();
    }

    let body = match config.body_mode {
        BodyMode::OpenClose => (today.close - today.open).abs(),
        BodyMode::Literal => (today.close - today.close).abs(),
    };

    let (lower_wick, upper_wick) = if today.open > today.close {
        (today.close - today.low, today.high - today.open)
    } else {
        (today.open - today.low, today.high - today.close)
    };

    let ratio = |wick: f64| match config.body_mode {
        BodyMode::OpenClose => wick_ratio(wick, body),
        BodyMode::Literal => wick / body,
    };

    let (strength, secondary, is_inverted) = if upper_wick > lower_wick {
        (ratio(upper_wick), ratio(lower_wick), true)
    } else {
        (ratio(lower_wick), ratio(upper_wick), false)
    };

    let is_hammer = strength > config.wick_tolerance && secondary < config.body_tolerance;

    tracing::debug!(
        "Hammer check: body={:.4}, lower_wick={:.4}, upper_wick={:.4}, strength={:.2}, secondary={:.2}, inverted={}, hammer={}",
        body,
        lower_wick,
        upper_wick,
        strength,
        secondary,
        is_inverted,
        is_hammer
    );

    HammerSignal {
        is_hammer,
        is_inverted,
        strength,
    }
}

fn wick_ratio(wick: f64, body: f64) -> f64 {
    if wick <= 0.0 {
        0.0
    } else if body <= 0.0 {
        MAX_WICK_RATIO
    } else {
        (wick / body).min(MAX_WICK_RATIO)
    }
}
