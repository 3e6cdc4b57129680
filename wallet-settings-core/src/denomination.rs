//! Balance display denominations
//!
//! Amounts are always stored in the smallest unit (1e-8 of a coin); the
//! denomination only controls how they are rendered.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest units per whole coin
pub const UNITS_PER_COIN: i64 = 100_000_000;

/// Display denomination
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenominationKind {
    /// Whole coins
    #[default]
    Full,
    /// Thousandths of a coin
    Milli,
    /// Millionths of a coin ("bits")
    Micro,
}

impl DenominationKind {
    /// Smallest-unit multiplier for one displayed unit
    pub const fn units(&self) -> i64 {
        match self {
            DenominationKind::Full => UNITS_PER_COIN,
            DenominationKind::Milli => 100_000,
            DenominationKind::Micro => 100,
        }
    }

    /// Conventional label
    pub const fn label(&self) -> &'static str {
        match self {
            DenominationKind::Full => "BTC",
            DenominationKind::Milli => "mBTC",
            DenominationKind::Micro => "bits",
        }
    }

    /// Conventional symbol
    pub const fn short_label(&self) -> &'static str {
        match self {
            DenominationKind::Full => "Ƀ",
            DenominationKind::Milli => "mɃ",
            DenominationKind::Micro => "ƀ",
        }
    }

    /// Number of decimal places shown in this denomination
    pub const fn decimals(&self) -> usize {
        match self {
            DenominationKind::Full => 8,
            DenominationKind::Milli => 5,
            DenominationKind::Micro => 2,
        }
    }

    /// Parse from its persisted name (`full`, `milli`, `micro`) or label
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all().iter().copied().find(|kind| {
            kind.name().eq_ignore_ascii_case(name) || kind.label().eq_ignore_ascii_case(name)
        })
    }

    /// Persisted name
    pub const fn name(&self) -> &'static str {
        match self {
            DenominationKind::Full => "full",
            DenominationKind::Milli => "milli",
            DenominationKind::Micro => "micro",
        }
    }

    /// Get all denominations
    pub fn all() -> &'static [DenominationKind] {
        &[
            DenominationKind::Full,
            DenominationKind::Milli,
            DenominationKind::Micro,
        ]
    }

    /// Render an amount given in smallest units, trailing zeros trimmed
    pub fn format_amount(&self, amount: i64) -> String {
        let units = self.units().unsigned_abs();
        let magnitude = amount.unsigned_abs();
        let whole = magnitude / units;
        let frac = magnitude % units;
        let sign = if amount < 0 { "-" } else { "" };

        if frac == 0 {
            return format!("{}{}", sign, whole);
        }

        let digits = format!("{:0width$}", frac, width = self.decimals());
        format!("{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

impl fmt::Display for DenominationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_values() {
        assert_eq!(DenominationKind::Full.units(), 100_000_000);
        assert_eq!(DenominationKind::Milli.units(), 100_000);
        assert_eq!(DenominationKind::Micro.units(), 100);
        assert_eq!(DenominationKind::Milli.label(), "mBTC");
        assert_eq!(DenominationKind::Micro.label(), "bits");
    }

    #[test]
    fn test_decimals_match_units() {
        for kind in DenominationKind::all() {
            assert_eq!(10_i64.pow(kind.decimals() as u32), kind.units());
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(DenominationKind::from_name("milli"), Some(DenominationKind::Milli));
        assert_eq!(DenominationKind::from_name("BITS"), Some(DenominationKind::Micro));
        assert_eq!(DenominationKind::from_name("BTC"), Some(DenominationKind::Full));
        assert_eq!(DenominationKind::from_name("satoshi"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(DenominationKind::Full.format_amount(150_000_000), "1.5");
        assert_eq!(DenominationKind::Full.format_amount(100_000_000), "1");
        assert_eq!(DenominationKind::Full.format_amount(1), "0.00000001");
        assert_eq!(DenominationKind::Milli.format_amount(5_000_000), "50");
        assert_eq!(DenominationKind::Micro.format_amount(12_345), "123.45");
        assert_eq!(DenominationKind::Micro.format_amount(-250), "-2.5");
        assert_eq!(DenominationKind::Full.format_amount(0), "0");
    }

    #[test]
    fn test_format_extreme_amounts() {
        let rendered = DenominationKind::Full.format_amount(i64::MIN);
        assert!(rendered.starts_with('-'));
    }

    #[test]
    fn test_serialized_lowercase() {
        let json = serde_json::to_string(&DenominationKind::Micro).unwrap();
        assert_eq!(json, "\"micro\"");
    }
}
