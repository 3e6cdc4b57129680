//! Default settings table
//!
//! Every default of the persisted schema lives here. Decoding fills missing
//! keys from this table and first-run users start from it.

use crate::currency::CurrencyCode;
use crate::denomination::DenominationKind;
use crate::exchange::ExchangeRateSource;

/// Default values for a settings record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsDefaults {
    /// Minutes in background before auto logout
    pub auto_logout_minutes: u32,
    /// Display currency
    pub currency: CurrencyCode,
    /// Display denomination
    pub denomination: DenominationKind,
    /// Exchange-rate provider
    pub exchange_rate_source: ExchangeRateSource,
    /// Show the user's name on payment requests
    pub show_name_on_payments: bool,
    /// Require PIN for spends
    pub spend_requires_pin: bool,
    /// Spend threshold above which the PIN is asked (smallest units)
    pub pin_required_above_amount: i64,
    /// PIN login disabled
    pub pin_login_disabled: bool,
}

/// The defaults table
pub const DEFAULTS: SettingsDefaults = SettingsDefaults {
    auto_logout_minutes: 60,
    currency: CurrencyCode::Usd,
    denomination: DenominationKind::Full,
    exchange_rate_source: ExchangeRateSource::Bitstamp,
    show_name_on_payments: false,
    spend_requires_pin: false,
    pin_required_above_amount: 5_000_000,
    pin_login_disabled: false,
};

/// Maximum length of a display-name field, in characters
pub const MAX_NAME_LENGTH: usize = 100;
