use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::TraderError;
use crate::indicators::{self, HammerConfig, HammerSignal, PivotAccumulator, PriceTriple};
use crate::models::Quote;
use crate::Result;

/// How to step back from one quote date to the previous one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayStep {
    /// Every calendar day, weekends included. History must have no holes.
    #[default]
    Calendar,
    /// Skip Saturdays and Sundays
    Weekdays,
}

impl DayStep {
    pub fn previous(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut prev = date.checked_sub_days(Days::new(1))?;
        if *self == DayStep::Weekdays {
            while matches!(prev.weekday(), Weekday::Sat | Weekday::Sun) {
                prev = prev.checked_sub_days(Days::new(1))?;
            }
        }
        Some(prev)
    }
}

/// A tradable name with its date-keyed daily quote history
#[derive(Debug, Clone)]
pub struct Instrument {
    name: String,
    dividend_day: u32,
    current_price: f64,
    calendar: DayStep,
    quotes: BTreeMap<NaiveDate, Quote>,
}

impl Instrument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dividend_day: 1,
            current_price: 0.0,
            calendar: DayStep::Calendar,
            quotes: BTreeMap::new(),
        }
    }

    /// Set the day of month dividends are paid (1..=31)
    pub fn with_dividend_day(mut self, day: u32) -> Result<Self> {
        if !(1..=31).contains(&day) {
            return Err(TraderError::InvalidDividendDay(day));
        }
        self.dividend_day = day;
        Ok(self)
    }

    pub fn with_calendar(mut self, calendar: DayStep) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dividend_day(&self) -> u32 {
        self.dividend_day
    }

    pub fn calendar(&self) -> DayStep {
        self.calendar
    }

    /// Last known quoted price
    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn set_current_price(&mut self, price: f64) {
        self.current_price = price;
    }

    /// Insert the quote for `date`, returning the quote it replaced
    pub fn record_quote(&mut self, date: NaiveDate, quote: Quote) -> Option<Quote> {
        self.quotes.insert(date, quote)
    }

    pub fn quote(&self, date: NaiveDate) -> Result<&Quote> {
        self.quotes
            .get(&date)
            .ok_or_else(|| TraderError::missing_quote(&self.name, date))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.quotes.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.quotes.keys().next_back().copied()
    }

    /// Recorded dates in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.quotes.keys().copied()
    }

    /// The day before `date` under this instrument's calendar
    pub fn trading_day_before(&self, date: NaiveDate) -> Result<NaiveDate> {
        self.calendar
            .previous(date)
            .ok_or_else(|| TraderError::missing_quote(&self.name, date))
    }

    /// Quotes of the `days` trading days strictly before `date`, most recent first
    fn prior_quotes(&self, date: NaiveDate, days: usize) -> Result<Vec<&Quote>> {
        let mut quotes = Vec::with_capacity(days);
        let mut day = date;
        for _ in 0..days {
            day = self.trading_day_before(day)?;
            quotes.push(self.quote(day)?);
        }
        Ok(quotes)
    }

    /// Whether the average price on `date` is below the lowest average of the
    /// previous `lookback_days` days, widened by `margin`
    ///
    /// With `lookback_days == 0` the lowest average is +inf and the check
    /// always passes.
    pub fn is_low_relative_to_recent(
        &self,
        date: NaiveDate,
        lookback_days: usize,
        margin: f64,
    ) -> Result<bool> {
        let price = self.quote(date)?.average_price();
        let lowest = self
            .prior_quotes(date, lookback_days)?
            .iter()
            .map(|q| q.average_price())
            .fold(f64::INFINITY, f64::min);

        let is_low = price < lowest * (1.0 + margin);

        tracing::debug!(
            "{} recent-low check on {}: avg={:.4}, lowest({}d)={:.4}, margin={:.2}% -> {}",
            self.name,
            date,
            price,
            lookback_days,
            lowest,
            margin * 100.0,
            is_low
        );

        Ok(is_low)
    }

    /// Hammer classification of the candle on `date` against the day before
    pub fn detect_hammer(&self, date: NaiveDate, config: &HammerConfig) -> Result<HammerSignal> {
        let today = self.quote(date)?;
        let previous = self.quote(self.trading_day_before(date)?)?;
        Ok(indicators::detect_hammer(previous, today, config))
    }

    /// Pivot levels over the `days` days before `date`
    ///
    /// Each day contributes only its average price, fed as a flat
    /// high/low/close triple.
    pub fn support_for_period(&self, date: NaiveDate, days: usize) -> Result<PivotAccumulator> {
        let mut pivot = PivotAccumulator::new();
        for quote in self.prior_quotes(date, days)? {
            pivot.feed(&PriceTriple::flat(quote.average_price()));
        }
        Ok(pivot)
    }
}
