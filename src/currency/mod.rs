//! Currency conversion and locale formatting.
//!
//! Amounts are stored in USD everywhere. A [`CurrencyConverter`] turns a USD
//! amount into the figure shown to the user for one currency at one
//! exchange rate (local units per USD), and back.

pub mod countries;

use crate::error::ValidationError;

pub use countries::{lookup_country, CountryCurrency, ProjectCurrency};

/// (code, symbol, decimals, group separator, decimal separator)
const CURRENCIES: &[(&str, &str, u8, char, char)] = &[
    ("USD", "$", 2, ',', '.'),
    ("COP", "$", 0, ',', '.'),
    ("MXN", "$", 2, ',', '.'),
    ("CLP", "$", 0, '.', ','),
    ("PEN", "S/", 2, ',', '.'),
    ("BRL", "R$", 2, '.', ','),
    ("EUR", "€", 2, '.', ','),
];

/// Presentation rules for one currency
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyInfo {
    pub code: String,
    pub symbol: String,
    pub decimals: u8,
    pub group_separator: char,
    pub decimal_separator: char,
}

impl CurrencyInfo {
    /// Look up a currency by ISO code.
    ///
    /// Unknown codes still produce usable rules: the code doubles as the
    /// symbol and amounts get two decimals with `1,234.56` grouping.
    pub fn lookup(code: &str) -> Self {
        let code = code.trim().to_ascii_uppercase();
        match CURRENCIES.iter().find(|(c, ..)| *c == code) {
            Some(&(c, symbol, decimals, group, decimal)) => Self {
                code: c.to_string(),
                symbol: symbol.to_string(),
                decimals,
                group_separator: group,
                decimal_separator: decimal,
            },
            None => {
                tracing::debug!(code = %code, "unknown currency code, using generic formatting");
                Self {
                    symbol: code.clone(),
                    code,
                    decimals: 2,
                    group_separator: ',',
                    decimal_separator: '.',
                }
            }
        }
    }

    pub fn is_known(&self) -> bool {
        CURRENCIES.iter().any(|(c, ..)| *c == self.code)
    }

    /// Round `value` to this currency's precision
    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.decimals as i32);
        (value * factor).round() / factor
    }

    /// Format `value` (already in this currency) with grouping and precision
    pub fn format(&self, value: f64) -> String {
        let rounded = self.round(value);
        let negative = rounded < 0.0;
        let digits = format!("{:.*}", self.decimals as usize, rounded.abs());

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
        if negative {
            grouped.push('-');
        }
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(ch);
        }
        if let Some(frac) = frac_part {
            grouped.push(self.decimal_separator);
            grouped.push_str(frac);
        }

        grouped
    }

    /// Read an amount written in this currency's format.
    ///
    /// The currency's own symbol and code and any whitespace are skipped.
    /// Anything else that is not a digit, a sign or a separator is an error.
    pub fn parse(&self, text: &str) -> Result<f64, ValidationError> {
        let unparsable = || ValidationError::UnparsableAmount(text.to_string());

        let stripped = text.replace(self.code.as_str(), "").replace(self.symbol.as_str(), "");
        let mut normalized = String::with_capacity(stripped.len());
        for ch in stripped.chars() {
            if ch.is_ascii_digit() || (ch == '-' && normalized.is_empty()) {
                normalized.push(ch);
            } else if ch == self.decimal_separator {
                normalized.push('.');
            } else if ch == self.group_separator || ch.is_whitespace() {
                continue;
            } else {
                return Err(unparsable());
            }
        }

        normalized
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(unparsable)
    }
}

/// Converts between USD and one display currency at a fixed rate
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyConverter {
    currency: CurrencyInfo,
    exchange_rate: f64,
}

impl CurrencyConverter {
    /// Build a converter, rejecting rates that are zero, negative or not finite
    pub fn new(code: &str, exchange_rate: f64) -> Result<Self, ValidationError> {
        if !exchange_rate.is_finite() || exchange_rate <= 0.0 {
            return Err(ValidationError::InvalidExchangeRate(exchange_rate));
        }

        Ok(Self {
            currency: CurrencyInfo::lookup(code),
            exchange_rate,
        })
    }

    pub fn usd() -> Self {
        Self {
            currency: CurrencyInfo::lookup("USD"),
            exchange_rate: 1.0,
        }
    }

    pub fn currency(&self) -> &CurrencyInfo {
        &self.currency
    }

    pub fn code(&self) -> &str {
        &self.currency.code
    }

    pub fn exchange_rate(&self) -> f64 {
        self.exchange_rate
    }

    /// Local amount for `usd`, rounded to the currency's precision
    pub fn to_display_amount(&self, usd: f64) -> f64 {
        self.currency.round(usd * self.exchange_rate)
    }

    /// Formatted local amount for `usd`, without symbol
    pub fn to_display(&self, usd: f64) -> String {
        self.currency.format(usd * self.exchange_rate)
    }

    /// Formatted local amount with symbol and code, e.g. `$400,000 COP`
    pub fn label(&self, usd: f64) -> String {
        format!("{}{} {}", self.currency.symbol, self.to_display(usd), self.currency.code)
    }

    /// Convert a local amount back to USD
    pub fn to_usd(&self, local: f64) -> f64 {
        local / self.exchange_rate
    }

    /// Read an amount typed in this currency's display format
    pub fn parse_display(&self, text: &str) -> Result<f64, ValidationError> {
        self.currency.parse(text)
    }

    /// Parse a locally formatted amount and convert it to USD
    pub fn parse_to_usd(&self, text: &str) -> Result<f64, ValidationError> {
        Ok(self.to_usd(self.parse_display(text)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cop_shows_whole_pesos() {
        let cop = CurrencyConverter::new("COP", 4000.0).unwrap();
        assert_eq!(cop.to_display(100.0), "400,000");
        assert_eq!(cop.label(100.0), "$400,000 COP");
    }

    #[test]
    fn usd_shows_cents() {
        let usd = CurrencyConverter::usd();
        assert_eq!(usd.to_display(100.0), "100.00");
        assert_eq!(usd.to_display(1234567.891), "1,234,567.89");
        assert_eq!(usd.to_display(0.5), "0.50");
    }

    #[test]
    fn european_grouping() {
        let eur = CurrencyConverter::new("EUR", 0.5).unwrap();
        assert_eq!(eur.to_display(2469.0), "1.234,50");
    }

    #[test]
    fn negative_amounts_keep_sign() {
        let usd = CurrencyConverter::usd();
        assert_eq!(usd.to_display(-1500.0), "-1,500.00");
        assert_eq!(usd.to_display(-0.001), "0.00");
    }

    #[test]
    fn rejects_non_positive_rates() {
        assert_eq!(
            CurrencyConverter::new("COP", 0.0),
            Err(ValidationError::InvalidExchangeRate(0.0))
        );
        assert!(CurrencyConverter::new("COP", -3.0).is_err());
        assert!(CurrencyConverter::new("COP", f64::NAN).is_err());
        assert!(CurrencyConverter::new("COP", f64::INFINITY).is_err());
    }

    #[test]
    fn unknown_code_uses_code_as_symbol() {
        let info = CurrencyInfo::lookup("xyz");
        assert!(!info.is_known());
        assert_eq!(info.symbol, "XYZ");
        assert_eq!(info.decimals, 2);

        let conv = CurrencyConverter::new("XYZ", 2.0).unwrap();
        assert_eq!(conv.label(1000.0), "XYZ2,000.00 XYZ");
    }

    #[test]
    fn round_trip_within_currency_precision() {
        let cases = [("USD", 1.0), ("COP", 4000.0), ("EUR", 0.92), ("CLP", 950.0)];
        for (code, rate) in cases {
            let conv = CurrencyConverter::new(code, rate).unwrap();
            let slack = 0.5 * 10f64.powi(-(conv.currency().decimals as i32)) / rate + 1e-9;
            for x in [0.01, 1.0, 99.99, 3000.0, 123456.78] {
                let back = conv.to_usd(conv.to_display_amount(x));
                assert!((back - x).abs() <= slack, "{code}: {x} came back as {back}");
            }
        }
    }

    #[test]
    fn parses_formatted_text() {
        let cop = CurrencyConverter::new("COP", 4000.0).unwrap();
        assert_eq!(cop.parse_to_usd("$400,000 COP").unwrap(), 100.0);

        let eur = CurrencyInfo::lookup("EUR");
        assert_eq!(eur.parse("€1.234,50").unwrap(), 1234.5);

        assert!(CurrencyInfo::lookup("USD").parse("n/a").is_err());
    }

    #[test]
    fn stray_characters_are_rejected() {
        let usd = CurrencyInfo::lookup("USD");
        for text in ["12abc3", "1e6", "100 EUR", "1-2", "12%"] {
            assert_eq!(usd.parse(text), Err(ValidationError::UnparsableAmount(text.to_string())));
        }
        assert_eq!(usd.parse("-$1,250.50 USD").unwrap(), -1250.5);

        let cop = CurrencyConverter::new("COP", 4000.0).unwrap();
        assert_eq!(cop.parse_display("$400,000 COP").unwrap(), 400_000.0);
        assert!(cop.parse_to_usd("400.000x").is_err());
    }
}
