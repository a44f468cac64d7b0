//! Currency normalization. Every component that aggregates money across
//! currencies converts to EUR through a [`RateTable`] first.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::errors::EngineError;

/// Built-in fallback rates, expressed as EUR per one unit of the currency.
static DEFAULT_RATES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("EUR", 1.0),
        ("USD", 0.92),
        ("GBP", 1.17),
        ("CHF", 1.04),
        ("JPY", 0.0062),
        ("CAD", 0.68),
        ("AUD", 0.61),
        ("SEK", 0.088),
        ("NOK", 0.087),
        ("DKK", 0.134),
        ("PLN", 0.23),
        ("CZK", 0.04),
        ("RON", 0.20),
    ])
});

/// Static, pluggable table mapping currency codes to their EUR rate.
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// Empty table; every non-EUR lookup fails until rates are added.
    pub fn empty() -> Self {
        Self {
            rates: HashMap::from([("EUR".to_string(), 1.0)]),
        }
    }

    pub fn with_rate(mut self, code: impl Into<String>, eur_per_unit: f64) -> Self {
        self.rates.insert(code.into().to_uppercase(), eur_per_unit);
        self
    }

    /// EUR per one unit of `code`.
    pub fn rate(&self, code: &str) -> Result<f64, EngineError> {
        let code = code.to_uppercase();
        if let Some(rate) = self.rates.get(code.as_str()) {
            return Ok(*rate);
        }
        Err(EngineError::UnknownCurrency(code))
    }

    /// Converts an amount to EUR, rounded to cents. Unknown currencies are a
    /// data error, never a silent 1:1.
    pub fn to_eur(&self, amount: f64, code: &str) -> Result<f64, EngineError> {
        if code.eq_ignore_ascii_case("EUR") {
            return Ok(round_cents(amount));
        }
        let rate = self.rate(code)?;
        Ok(round_cents(amount * rate))
    }

    /// Converts between two arbitrary currencies through EUR.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, EngineError> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(amount);
        }
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        Ok(round_cents(amount * from_rate / to_rate))
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: DEFAULT_RATES
                .iter()
                .map(|(code, rate)| ((*code).to_string(), *rate))
                .collect(),
        }
    }
}

/// Rounds a money amount to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eur_is_identity() {
        let table = RateTable::empty();
        assert_eq!(table.to_eur(12.345, "eur").unwrap(), 12.35);
    }

    #[test]
    fn converts_through_configured_rate() {
        let table = RateTable::empty().with_rate("USD", 0.5);
        assert_eq!(table.to_eur(10.0, "USD").unwrap(), 5.0);
    }

    #[test]
    fn unknown_currency_is_an_error() {
        let table = RateTable::empty();
        let err = table.to_eur(10.0, "XXX").unwrap_err();
        assert_eq!(err, EngineError::UnknownCurrency("XXX".to_string()));
    }

    #[test]
    fn default_table_covers_majors() {
        let table = RateTable::default();
        assert!(table.rate("USD").is_ok());
        assert!(table.rate("GBP").is_ok());
        assert_eq!(table.rate("EUR").unwrap(), 1.0);
    }

    #[test]
    fn round_cents_to_two_places() {
        assert_eq!(round_cents(2.344), 2.34);
        assert_eq!(round_cents(2.346), 2.35);
        assert_eq!(round_cents(-2.346), -2.35);
    }
}
