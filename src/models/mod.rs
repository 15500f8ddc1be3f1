use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TraderError;
use crate::Result;

/// Daily OHLC quote for one instrument
///
/// Values are trusted as given by `Quote::new`; use `Quote::checked` when the
/// source is not known to respect `low <= open, close <= high`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}

impl Quote {
    pub fn new(open: f64, close: f64, high: f64, low: f64) -> Self {
        Self {
            open,
            close,
            high,
            low,
        }
    }

    /// Build a quote, rejecting non-finite values and inverted extremes
    pub fn checked(open: f64, close: f64, high: f64, low: f64) -> Result<Self> {
        let quote = Self::new(open, close, high, low);
        if quote.is_consistent() {
            Ok(quote)
        } else {
            Err(TraderError::InvalidQuote {
                open,
                close,
                high,
                low,
            })
        }
    }

    /// high >= max(open, close, low) and low <= min(open, close, high)
    pub fn is_consistent(&self) -> bool {
        let finite = [self.open, self.close, self.high, self.low]
            .iter()
            .all(|v| v.is_finite());

        finite
            && self.high >= self.open.max(self.close).max(self.low)
            && self.low <= self.open.min(self.close).min(self.high)
    }

    /// Unweighted mean of open, close, high and low
    pub fn average_price(&self) -> f64 {
        (self.open + self.close + self.high + self.low) / 4.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Position transition announced by the trader
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeEvent {
    pub id: Uuid,
    pub instrument: String,
    pub side: TradeSide,
    pub date: NaiveDate,
    /// Entry average for buys, exit target for sells
    pub price: f64,
    pub entry_price: f64,
}

impl TradeEvent {
    pub fn new(
        instrument: &str,
        side: TradeSide,
        date: NaiveDate,
        price: f64,
        entry_price: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument: instrument.to_string(),
            side,
            date,
            price,
            entry_price,
        }
    }
}
