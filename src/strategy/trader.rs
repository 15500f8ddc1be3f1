use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::TraderError;
use crate::instrument::Instrument;
use crate::models::{TradeEvent, TradeSide};
use crate::strategy::observer::{LogObserver, TradeObserver};
use crate::Result;

/// Length of the dividend cycle used when the dividend day has passed
const DIVIDEND_CYCLE_DAYS: i64 = 30;

/// Which position state the sell check runs in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SellGuard {
    /// Evaluate the target only while holding, and close the position on a hit
    #[default]
    WhenHolding,
    /// Evaluate the target only while flat, against whatever entry price is
    /// left over, without touching the position. Reproduces legacy output.
    Literal,
}

/// Dividend-window entry policy
///
/// Entry conditions (ALL must be true):
/// - No position is open
/// - The dividend day is at most `lead_days` away
/// - Today's average price is within `entry_margin` of the lowest average of
///   the last `lookback_days` days
///
/// Exit condition:
/// - Today's high exceeds entry price by more than `target_gain`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TraderConfig {
    /// Gain fraction that triggers a sell (e.g. 0.03 = 3%)
    pub target_gain: f64,

    /// Maximum days before the dividend day to consider buying
    pub lead_days: u32,

    /// Days of history the recent-low comparison looks back over
    pub lookback_days: usize,

    /// Tolerance above the recent low still counted as low (e.g. 0.03 = 3%)
    pub entry_margin: f64,

    pub sell_guard: SellGuard,
}

impl Default for TraderConfig {
    fn default() -> Self {
        Self {
            target_gain: 0.03,
            lead_days: 10,
            lookback_days: 10,
            entry_margin: 0.03,
            sell_guard: SellGuard::WhenHolding,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Flat,
    Long {
        entry_price: f64,
        entry_date: NaiveDate,
    },
}

/// Single-position trader for one instrument at a time
///
/// Buys and sells are announced to the observer `O`.
pub struct Trader<O: TradeObserver = LogObserver> {
    config: TraderConfig,
    instrument: Option<Instrument>,
    holding: bool,
    entry_price: f64,
    entry_date: Option<NaiveDate>,
    observer: O,
}

impl Trader<LogObserver> {
    pub fn new(config: TraderConfig) -> Self {
        Self::with_observer(config, LogObserver)
    }
}

impl Default for Trader<LogObserver> {
    fn default() -> Self {
        Self::new(TraderConfig::default())
    }
}

impl<O: TradeObserver> Trader<O> {
    pub fn with_observer(config: TraderConfig, observer: O) -> Self {
        Self {
            config,
            instrument: None,
            holding: false,
            entry_price: 0.0,
            entry_date: None,
            observer,
        }
    }

    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Start tracking `instrument`, returning the previously tracked one
    ///
    /// The position resets to flat.
    pub fn track(&mut self, instrument: Instrument) -> Option<Instrument> {
        tracing::info!("Tracking {}", instrument.name());
        self.reset_position();
        self.instrument.replace(instrument)
    }

    /// Stop tracking, returning the instrument; the position resets to flat
    pub fn release(&mut self) -> Option<Instrument> {
        self.reset_position();
        self.instrument.take()
    }

    fn reset_position(&mut self) {
        self.holding = false;
        self.entry_price = 0.0;
        self.entry_date = None;
    }

    pub fn instrument(&self) -> Option<&Instrument> {
        self.instrument.as_ref()
    }

    /// Mutable access for feeding new quotes into the tracked instrument
    pub fn instrument_mut(&mut self) -> Option<&mut Instrument> {
        self.instrument.as_mut()
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    pub fn position(&self) -> Position {
        match (self.holding, self.entry_date) {
            (true, Some(entry_date)) => Position::Long {
                entry_price: self.entry_price,
                entry_date,
            },
            _ => Position::Flat,
        }
    }

    fn tracked(&self) -> Result<&Instrument> {
        self.instrument.as_ref().ok_or(TraderError::NoInstrument)
    }

    /// Days from `date` to the tracked instrument's dividend day, wrapping
    /// over a 30 day cycle once the day has passed this month
    pub fn days_until_dividend(&self, date: NaiveDate) -> Result<u32> {
        let instrument = self.tracked()?;
        let mut days = instrument.dividend_day() as i64 - date.day() as i64;
        if days < 0 {
            days += DIVIDEND_CYCLE_DAYS;
        }
        Ok(days as u32)
    }

    /// Open a position on `date` if the entry conditions hold
    pub fn decide_buy(&mut self, date: NaiveDate) -> Result<bool> {
        if self.holding {
            return Ok(false);
        }

        let days_to_dividend = self.days_until_dividend(date)?;
        if days_to_dividend > self.config.lead_days {
            tracing::debug!(
                "Skip buy on {}: dividend {} days away (window {})",
                date,
                days_to_dividend,
                self.config.lead_days
            );
            return Ok(false);
        }

        let instrument = self.tracked()?;
        if !instrument.is_low_relative_to_recent(
            date,
            self.config.lookback_days,
            self.config.entry_margin,
        )? {
            return Ok(false);
        }

        let entry_price = instrument.quote(date)?.average_price();
        let event = TradeEvent::new(
            instrument.name(),
            TradeSide::Buy,
            date,
            entry_price,
            entry_price,
        );

        self.holding = true;
        self.entry_price = entry_price;
        self.entry_date = Some(date);
        self.observer.on_trade(&event);

        Ok(true)
    }

    /// Check the gain target on `date` under the configured `SellGuard`
    pub fn decide_sell(&mut self, date: NaiveDate) -> Result<bool> {
        let evaluate = match self.config.sell_guard {
            SellGuard::WhenHolding => self.holding,
            SellGuard::Literal => !self.holding,
        };
        if !evaluate {
            return Ok(false);
        }

        let instrument = self.tracked()?;
        let target = self.entry_price * (1.0 + self.config.target_gain);
        let high = instrument.quote(date)?.high;

        if target >= high {
            tracing::debug!(
                "Hold on {}: high {:.2} has not passed target {:.2}",
                date,
                high,
                target
            );
            return Ok(false);
        }

        let event = TradeEvent::new(
            instrument.name(),
            TradeSide::Sell,
            date,
            target,
            self.entry_price,
        );

        if self.config.sell_guard == SellGuard::WhenHolding {
            self.holding = false;
            self.entry_date = None;
        }
        self.observer.on_trade(&event);

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quote;
    use crate::strategy::observer::RecordingObserver;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn flat_quote(price: f64) -> Quote {
        Quote::new(price, price, price, price)
    }

    fn instrument(dividend_day: u32) -> Instrument {
        let mut instrument = Instrument::new("TAEE11")
            .with_dividend_day(dividend_day)
            .unwrap();
        for d in 1..=20 {
            instrument.record_quote(day(d), flat_quote(100.0));
        }
        instrument
    }

    fn trader(config: TraderConfig, dividend_day: u32) -> Trader<RecordingObserver> {
        let mut trader = Trader::with_observer(config, RecordingObserver::new());
        trader.track(instrument(dividend_day));
        trader
    }

    #[test]
    fn test_default_config() {
        let config = TraderConfig::default();
        assert_eq!(config.target_gain, 0.03);
        assert_eq!(config.lead_days, 10);
        assert_eq!(config.lookback_days, 10);
        assert_eq!(config.sell_guard, SellGuard::WhenHolding);
    }

    #[test]
    fn test_days_until_dividend() {
        let trader = trader(TraderConfig::default(), 15);
        assert_eq!(trader.days_until_dividend(day(11)).unwrap(), 4);
        assert_eq!(trader.days_until_dividend(day(15)).unwrap(), 0);
        // passed this month: 15 - 20 + 30
        assert_eq!(trader.days_until_dividend(day(20)).unwrap(), 25);
    }

    #[test]
    fn test_buy_in_dividend_window() {
        let mut trader = trader(TraderConfig::default(), 15);

        assert!(trader.decide_buy(day(11)).unwrap());
        assert!(trader.is_holding());
        assert_eq!(
            trader.position(),
            Position::Long {
                entry_price: 100.0,
                entry_date: day(11)
            }
        );

        let events = trader.observer().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].side, TradeSide::Buy);
        assert_eq!(events[0].price, 100.0);
    }

    #[test]
    fn test_no_second_buy_while_long() {
        let mut trader = trader(TraderConfig::default(), 15);

        assert!(trader.decide_buy(day(11)).unwrap());
        assert!(!trader.decide_buy(day(12)).unwrap());
        assert_eq!(trader.observer().events().len(), 1);
    }

    #[test]
    fn test_no_buy_outside_dividend_window() {
        let mut trader = trader(TraderConfig::default(), 28);

        assert!(!trader.decide_buy(day(11)).unwrap());
        assert_eq!(trader.position(), Position::Flat);
    }

    #[test]
    fn test_window_checked_before_history() {
        // day 3 has too little history, but the dividend is 25 days away
        let mut trader = trader(TraderConfig::default(), 28);
        assert!(!trader.decide_buy(day(3)).unwrap());
    }

    #[test]
    fn test_buy_propagates_missing_history() {
        let mut trader = trader(TraderConfig::default(), 5);
        let err = trader.decide_buy(day(3)).unwrap_err();

        assert!(err.is_missing_quote());
        assert!(!trader.is_holding());
    }

    #[test]
    fn test_no_buy_above_recent_low() {
        let mut trader = trader(TraderConfig::default(), 15);
        trader
            .instrument_mut()
            .unwrap()
            .record_quote(day(11), flat_quote(110.0));

        assert!(!trader.decide_buy(day(11)).unwrap());
    }

    #[test]
    fn test_decide_without_instrument() {
        let mut trader = Trader::with_observer(TraderConfig::default(), RecordingObserver::new());
        assert!(matches!(
            trader.decide_buy(day(11)),
            Err(TraderError::NoInstrument)
        ));
    }

    #[test]
    fn test_sell_when_target_passed() {
        let mut trader = trader(TraderConfig::default(), 15);
        assert!(trader.decide_buy(day(11)).unwrap());

        let instrument = trader.instrument_mut().unwrap();
        instrument.record_quote(day(12), Quote::new(100.0, 101.0, 102.0, 99.0));
        instrument.record_quote(day(13), Quote::new(101.0, 103.0, 104.0, 100.5));

        assert!(!trader.decide_sell(day(12)).unwrap());
        assert!(trader.is_holding());

        assert!(trader.decide_sell(day(13)).unwrap());
        assert_eq!(trader.position(), Position::Flat);

        let events = trader.observer().events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].side, TradeSide::Sell);
        assert!((events[1].price - 103.0).abs() < 1e-9);
        assert_eq!(events[1].entry_price, 100.0);
    }

    #[test]
    fn test_sell_ignored_while_flat() {
        let mut trader = trader(TraderConfig::default(), 15);
        assert!(!trader.decide_sell(day(11)).unwrap());
        assert!(trader.observer().events().is_empty());
    }

    #[test]
    fn test_can_rebuy_after_sell() {
        let mut trader = trader(TraderConfig::default(), 15);
        assert!(trader.decide_buy(day(11)).unwrap());
        trader
            .instrument_mut()
            .unwrap()
            .record_quote(day(12), Quote::new(100.0, 100.0, 104.0, 99.0));
        assert!(trader.decide_sell(day(12)).unwrap());

        assert!(trader.decide_buy(day(13)).unwrap());
        assert_eq!(trader.observer().events().len(), 3);
    }

    #[test]
    fn test_literal_guard_never_sells_while_long() {
        let config = TraderConfig {
            sell_guard: SellGuard::Literal,
            ..Default::default()
        };
        let mut trader = trader(config, 15);
        assert!(trader.decide_buy(day(11)).unwrap());

        trader
            .instrument_mut()
            .unwrap()
            .record_quote(day(12), Quote::new(150.0, 150.0, 200.0, 150.0));

        assert!(!trader.decide_sell(day(12)).unwrap());
        assert!(trader.is_holding());
    }

    #[test]
    fn test_literal_guard_fires_while_flat() {
        let config = TraderConfig {
            sell_guard: SellGuard::Literal,
            ..Default::default()
        };
        let mut trader = trader(config, 15);

        // entry price is still 0, any positive high passes the target
        assert!(trader.decide_sell(day(11)).unwrap());
        assert!(!trader.is_holding());
        assert_eq!(trader.observer().events()[0].side, TradeSide::Sell);
    }

    #[test]
    fn test_track_resets_position() {
        let mut trader = trader(TraderConfig::default(), 15);
        assert!(trader.decide_buy(day(11)).unwrap());

        let previous = trader.track(instrument(20));
        assert_eq!(previous.map(|i| i.dividend_day()), Some(15));
        assert_eq!(trader.position(), Position::Flat);
    }

    #[test]
    fn test_release_resets_position() {
        let mut trader = trader(TraderConfig::default(), 15);
        assert!(trader.decide_buy(day(11)).unwrap());
        assert_eq!(trader.entry_price, 100.0);

        let released = trader.release();
        assert_eq!(released.map(|i| i.dividend_day()), Some(15));
        assert!(trader.instrument().is_none());
        assert_eq!(trader.position(), Position::Flat);
        assert_eq!(trader.entry_price, 0.0);
        assert!(trader.entry_date.is_none());
    }
}
