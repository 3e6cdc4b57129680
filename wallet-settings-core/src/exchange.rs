//! Exchange-rate providers a user may pick for fiat conversion

use std::fmt;

/// Fixed set of supported exchange-rate providers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeRateSource {
    /// Bitstamp (default)
    #[default]
    Bitstamp,
    /// BraveNewCoin
    BraveNewCoin,
    /// Coinbase
    Coinbase,
    /// CleverCoin
    CleverCoin,
}

impl ExchangeRateSource {
    /// Identifier stored in the settings record
    pub const fn id(&self) -> &'static str {
        match self {
            ExchangeRateSource::Bitstamp => "Bitstamp",
            ExchangeRateSource::BraveNewCoin => "BraveNewCoin",
            ExchangeRateSource::Coinbase => "Coinbase",
            ExchangeRateSource::CleverCoin => "CleverCoin",
        }
    }

    /// Resolve a stored identifier (exact match)
    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|source| source.id() == id)
    }

    /// Get all providers
    pub fn all() -> &'static [ExchangeRateSource] {
        &[
            ExchangeRateSource::Bitstamp,
            ExchangeRateSource::BraveNewCoin,
            ExchangeRateSource::Coinbase,
            ExchangeRateSource::CleverCoin,
        ]
    }
}

impl fmt::Display for ExchangeRateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
