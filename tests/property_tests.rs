//! Property tests for pivot and recent-low invariants.
//!
//! Uses proptest to verify:
//! 1. Feed order does not change max, min, mean pivot or the derived levels
//! 2. Two accumulators fed the same sequence agree exactly
//! 3. Average price is the arithmetic mean of the four prices
//! 4. A constant history is always within any non-negative margin of its low

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use quotetrader::indicators::PivotAccumulator;
use quotetrader::{Instrument, Quote};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_quote() -> impl Strategy<Value = Quote> {
    (10.0..500.0_f64, 0.0..0.1_f64, 0.0..0.1_f64, -0.05..0.05_f64).prop_map(
        |(open, up, down, change)| {
            let close = open * (1.0 + change);
            let high = open.max(close) * (1.0 + up);
            let low = open.min(close) * (1.0 - down);
            Quote::new(open, close, high, low)
        },
    )
}

fn close_enough(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn pivot_levels_are_order_invariant(
        quotes in prop::collection::vec(arb_quote(), 1..30),
    ) {
        let mut forward = PivotAccumulator::new();
        for q in &quotes {
            forward.feed(q);
        }

        let mut backward = PivotAccumulator::new();
        for q in quotes.iter().rev() {
            backward.feed(q);
        }

        prop_assert_eq!(forward.max(), backward.max());
        prop_assert_eq!(forward.min(), backward.min());
        prop_assert!(close_enough(forward.mean_pivot().unwrap(), backward.mean_pivot().unwrap()));
        prop_assert!(close_enough(forward.r1(), backward.r1()));
        prop_assert!(close_enough(forward.s1(), backward.s1()));
        prop_assert!(close_enough(forward.r2(), backward.r2()));
        prop_assert!(close_enough(forward.s2(), backward.s2()));
    }

    #[test]
    fn pivot_accumulation_is_deterministic(
        quotes in prop::collection::vec(arb_quote(), 1..30),
    ) {
        let mut a = PivotAccumulator::new();
        let mut b = PivotAccumulator::new();
        for q in &quotes {
            a.feed(q);
            b.feed(q);
        }

        prop_assert_eq!(a.levels(), b.levels());
        prop_assert_eq!(a.pivots(), b.pivots());
    }

    #[test]
    fn average_price_is_mean(q in arb_quote()) {
        let expected = (q.open + q.close + q.high + q.low) / 4.0;
        prop_assert_eq!(q.average_price(), expected);
    }

    #[test]
    fn constant_history_is_always_low(
        price in 1.0..1000.0_f64,
        lookback in 1usize..20,
        margin in 0.001..0.2_f64,
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut instrument = Instrument::new("FLAT");
        for offset in 0..=lookback as u64 {
            let date = start.checked_add_days(Days::new(offset)).unwrap();
            instrument.record_quote(date, Quote::new(price, price, price, price));
        }

        let last = instrument.last_date().unwrap();
        prop_assert!(instrument.is_low_relative_to_recent(last, lookback, margin).unwrap());
        prop_assert!(instrument.is_low_relative_to_recent(last, lookback + 1, margin).is_err());
    }
}
