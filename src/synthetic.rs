use crate::instrument::{DayStep, Instrument};
use crate::models::Quote;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Market scenario types for synthetic quote histories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketScenario {
    /// Steady uptrend with noise (+0.5% daily average)
    Uptrend,
    /// Steady downtrend with noise (-0.5% daily average)
    Downtrend,
    /// Mean-reverting around the base price (±1% daily noise)
    Sideways,
    /// Large swings (±3% daily)
    Volatile,
}

/// Generates seeded daily quote histories
pub struct SyntheticQuoteGenerator {
    rng: StdRng,
    base_price: f64,
}

impl SyntheticQuoteGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 100.0,
        }
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    /// Generate `num_days` consecutive quotes starting at `start`
    ///
    /// With `DayStep::Weekdays` no quotes are produced for Saturdays and
    /// Sundays.
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        start: NaiveDate,
        num_days: usize,
        calendar: DayStep,
    ) -> Vec<(NaiveDate, Quote)> {
        let mut quotes = Vec::with_capacity(num_days);
        let mut close = self.base_price;
        let mut date = start;

        while quotes.len() < num_days {
            let skip = calendar == DayStep::Weekdays
                && matches!(date.weekday(), Weekday::Sat | Weekday::Sun);

            if !skip {
                let open = close * (1.0 + self.rng.gen_range(-0.003..0.003));
                close = self.next_close(scenario, close);
                quotes.push((date, self.create_quote(open, close)));
            }

            date = match date.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }

        quotes
    }

    /// Generate a history and record it into `instrument`
    pub fn fill(
        &mut self,
        instrument: &mut Instrument,
        scenario: MarketScenario,
        start: NaiveDate,
        num_days: usize,
    ) {
        let quotes = self.generate(scenario, start, num_days, instrument.calendar());
        if let Some((_, last)) = quotes.last() {
            instrument.set_current_price(last.close);
        }
        for (date, quote) in quotes {
            instrument.record_quote(date, quote);
        }
    }

    fn next_close(&mut self, scenario: MarketScenario, close: f64) -> f64 {
        let next = match scenario {
            MarketScenario::Uptrend => {
                close * (1.0 + 0.005 + self.rng.gen_range(-0.004..0.004))
            }
            MarketScenario::Downtrend => {
                close * (1.0 - 0.005 + self.rng.gen_range(-0.004..0.004))
            }
            MarketScenario::Sideways => {
                // 10% pull back to the base price
                let reversion = (self.base_price - close) * 0.1;
                close + reversion + close * self.rng.gen_range(-0.01..0.01)
            }
            MarketScenario::Volatile => close * (1.0 + self.rng.gen_range(-0.03..0.03)),
        };

        // Prevent price from going too low
        next.max(self.base_price * 0.1)
    }

    /// Wrap open and close with intraday extremes
    fn create_quote(&mut self, open: f64, close: f64) -> Quote {
        let wick_pct = 0.01;
        let high = open.max(close) * (1.0 + self.rng.gen_range(0.0..wick_pct));
        let low = open.min(close) * (1.0 - self.rng.gen_range(0.0..wick_pct));

        Quote::new(open, close, high, low)
    }
}
