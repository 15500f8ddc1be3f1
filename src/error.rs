use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by quote lookups, policy decisions and settings loading
#[derive(Debug, Error)]
pub enum TraderError {
    /// A query needed a date that is not in the instrument's history
    #[error("no quote for {instrument} on {date}")]
    MissingQuote { instrument: String, date: NaiveDate },

    #[error("inconsistent quote: open={open} close={close} high={high} low={low}")]
    InvalidQuote {
        open: f64,
        close: f64,
        high: f64,
        low: f64,
    },

    #[error("dividend day must be within 1..=31, got {0}")]
    InvalidDividendDay(u32),

    #[error("trader has no instrument to decide on")]
    NoInstrument,

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl TraderError {
    pub fn missing_quote(instrument: &str, date: NaiveDate) -> Self {
        Self::MissingQuote {
            instrument: instrument.to_string(),
            date,
        }
    }

    /// True for the lookup failure callers are expected to handle
    pub fn is_missing_quote(&self) -> bool {
        matches!(self, Self::MissingQuote { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_quote_message() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let err = TraderError::missing_quote("PETR4", date);

        assert!(err.is_missing_quote());
        assert_eq!(err.to_string(), "no quote for PETR4 on 2024-03-05");
    }

    #[test]
    fn test_other_errors_are_not_lookups() {
        assert!(!TraderError::NoInstrument.is_missing_quote());
        assert!(!TraderError::InvalidDividendDay(32).is_missing_quote());
    }
}
