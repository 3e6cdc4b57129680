//! ISO 4217 fiat currencies offered as the default display currency

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fiat currency, persisted by its alpha code
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyCode {
    /// Australian dollar
    #[serde(rename = "AUD")]
    Aud,
    /// Brazilian real
    #[serde(rename = "BRL")]
    Brl,
    /// Canadian dollar
    #[serde(rename = "CAD")]
    Cad,
    /// Swiss franc
    #[serde(rename = "CHF")]
    Chf,
    /// Chinese yuan
    #[serde(rename = "CNY")]
    Cny,
    /// Euro
    #[serde(rename = "EUR")]
    Eur,
    /// Pound sterling
    #[serde(rename = "GBP")]
    Gbp,
    /// Hong Kong dollar
    #[serde(rename = "HKD")]
    Hkd,
    /// Japanese yen
    #[serde(rename = "JPY")]
    Jpy,
    /// Mexican peso
    #[serde(rename = "MXN")]
    Mxn,
    /// New Zealand dollar
    #[serde(rename = "NZD")]
    Nzd,
    /// Philippine peso
    #[serde(rename = "PHP")]
    Php,
    /// Russian ruble
    #[serde(rename = "RUB")]
    Rub,
    /// Singapore dollar
    #[serde(rename = "SGD")]
    Sgd,
    /// United States dollar (default)
    #[default]
    #[serde(rename = "USD")]
    Usd,
}

impl CurrencyCode {
    /// ISO 4217 alpha code
    pub fn alpha(&self) -> &'static str {
        match self {
            CurrencyCode::Aud => "AUD",
            CurrencyCode::Brl => "BRL",
            CurrencyCode::Cad => "CAD",
            CurrencyCode::Chf => "CHF",
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Hkd => "HKD",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Mxn => "MXN",
            CurrencyCode::Nzd => "NZD",
            CurrencyCode::Php => "PHP",
            CurrencyCode::Rub => "RUB",
            CurrencyCode::Sgd => "SGD",
            CurrencyCode::Usd => "USD",
        }
    }

    /// ISO 4217 numeric code
    pub fn numeric(&self) -> u16 {
        match self {
            CurrencyCode::Aud => 36,
            CurrencyCode::Brl => 986,
            CurrencyCode::Cad => 124,
            CurrencyCode::Chf => 756,
            CurrencyCode::Cny => 156,
            CurrencyCode::Eur => 978,
            CurrencyCode::Gbp => 826,
            CurrencyCode::Hkd => 344,
            CurrencyCode::Jpy => 392,
            CurrencyCode::Mxn => 484,
            CurrencyCode::Nzd => 554,
            CurrencyCode::Php => 608,
            CurrencyCode::Rub => 643,
            CurrencyCode::Sgd => 702,
            CurrencyCode::Usd => 840,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            CurrencyCode::Aud => "Australian Dollar",
            CurrencyCode::Brl => "Brazilian Real",
            CurrencyCode::Cad => "Canadian Dollar",
            CurrencyCode::Chf => "Swiss Franc",
            CurrencyCode::Cny => "Chinese Yuan",
            CurrencyCode::Eur => "Euro",
            CurrencyCode::Gbp => "Pound Sterling",
            CurrencyCode::Hkd => "Hong Kong Dollar",
            CurrencyCode::Jpy => "Japanese Yen",
            CurrencyCode::Mxn => "Mexican Peso",
            CurrencyCode::Nzd => "New Zealand Dollar",
            CurrencyCode::Php => "Philippine Peso",
            CurrencyCode::Rub => "Russian Ruble",
            CurrencyCode::Sgd => "Singapore Dollar",
            CurrencyCode::Usd => "US Dollar",
        }
    }

    /// Look up by alpha code (case-insensitive)
    pub fn from_alpha(code: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.alpha().eq_ignore_ascii_case(code.trim()))
    }

    /// Look up by ISO numeric code
    pub fn from_numeric(code: u16) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.numeric() == code)
    }

    /// Get all supported currencies
    pub fn all() -> &'static [CurrencyCode] {
        &[
            CurrencyCode::Aud,
            CurrencyCode::Brl,
            CurrencyCode::Cad,
            CurrencyCode::Chf,
            CurrencyCode::Cny,
            CurrencyCode::Eur,
            CurrencyCode::Gbp,
            CurrencyCode::Hkd,
            CurrencyCode::Jpy,
            CurrencyCode::Mxn,
            CurrencyCode::Nzd,
            CurrencyCode::Php,
            CurrencyCode::Rub,
            CurrencyCode::Sgd,
            CurrencyCode::Usd,
        ]
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alpha())
    }
}
