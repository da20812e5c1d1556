use crate::error::ValidationError;

use super::CurrencyConverter;

/// Country, ISO alpha-2, currency code, local units per USD
const COUNTRY_RATES: &[(&str, &str, &str, f64)] = &[
    ("Colombia", "CO", "COP", 4000.0),
    ("Mexico", "MX", "MXN", 17.0),
    ("United States", "US", "USD", 1.0),
    ("Chile", "CL", "CLP", 950.0),
    ("Peru", "PE", "PEN", 3.75),
    ("Brazil", "BR", "BRL", 5.0),
    ("Spain", "ES", "EUR", 0.92),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryCurrency {
    pub country: &'static str,
    pub iso: &'static str,
    pub currency: &'static str,
    pub exchange_rate: f64,
}

/// Find a country by name or ISO alpha-2 code, ignoring case
pub fn lookup_country(name: &str) -> Result<CountryCurrency, ValidationError> {
    let needle = name.trim();
    COUNTRY_RATES
        .iter()
        .find(|(country, iso, ..)| country.eq_ignore_ascii_case(needle) || iso.eq_ignore_ascii_case(needle))
        .map(|&(country, iso, currency, exchange_rate)| CountryCurrency {
            country,
            iso,
            currency,
            exchange_rate,
        })
        .ok_or_else(|| ValidationError::UnknownCountry(needle.to_string()))
}

pub fn countries() -> impl Iterator<Item = CountryCurrency> {
    COUNTRY_RATES
        .iter()
        .map(|&(country, iso, currency, exchange_rate)| CountryCurrency {
            country,
            iso,
            currency,
            exchange_rate,
        })
}

/// Currency settings frozen onto a project when it is created.
///
/// Later changes to the lookup table do not touch existing projects.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectCurrency {
    pub country: String,
    pub currency: String,
    pub exchange_rate: f64,
}

impl ProjectCurrency {
    pub fn from_country(name: &str) -> Result<Self, ValidationError> {
        let found = lookup_country(name)?;
        Ok(Self {
            country: found.country.to_string(),
            currency: found.currency.to_string(),
            exchange_rate: found.exchange_rate,
        })
    }

    /// Same as [`from_country`](Self::from_country) with a negotiated rate
    pub fn with_rate(name: &str, exchange_rate: f64) -> Result<Self, ValidationError> {
        let mut captured = Self::from_country(name)?;
        CurrencyConverter::new(&captured.currency, exchange_rate)?;
        captured.exchange_rate = exchange_rate;
        Ok(captured)
    }

    pub fn converter(&self) -> Result<CurrencyConverter, ValidationError> {
        CurrencyConverter::new(&self.currency, self.exchange_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_or_iso() {
        let co = lookup_country("colombia").unwrap();
        assert_eq!(co.currency, "COP");
        assert_eq!(co.exchange_rate, 4000.0);

        assert_eq!(lookup_country("mx").unwrap().currency, "MXN");
        assert_eq!(
            lookup_country("Atlantis"),
            Err(ValidationError::UnknownCountry("Atlantis".into()))
        );
    }

    #[test]
    fn every_country_has_a_valid_converter() {
        for c in countries() {
            let conv = CurrencyConverter::new(c.currency, c.exchange_rate).unwrap();
            assert!(conv.currency().is_known(), "{} has no formatting rules", c.currency);
        }
    }

    #[test]
    fn negotiated_rate_is_validated() {
        let pc = ProjectCurrency::with_rate("Colombia", 3900.0).unwrap();
        assert_eq!(pc.exchange_rate, 3900.0);
        assert!(ProjectCurrency::with_rate("Colombia", 0.0).is_err());
    }
}
