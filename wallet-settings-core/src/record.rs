//! The per-user settings record and its invariants

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::CurrencyCode;
use crate::defaults::{DEFAULTS, MAX_NAME_LENGTH};
use crate::denomination::DenominationKind;
use crate::error::{Result, SettingsError};
use crate::exchange::ExchangeRateSource;
use crate::user::UserContext;

/// User settings
///
/// Field names in the persisted form are the camelCase names below; missing
/// keys decode to [`DEFAULTS`]. Biometric unlock state is deliberately absent:
/// it belongs to the secure store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsRecord {
    /// Minutes in background before auto logout
    pub auto_logout_minutes: u32,
    /// Default currency for new wallets and account totals
    pub default_currency_code: CurrencyCode,
    /// Smallest-unit multiplier of the display denomination
    pub denomination_units: i64,
    /// Denomination label (e.g. `mBTC`)
    pub denomination_label: String,
    /// Denomination symbol (e.g. `mɃ`)
    pub denomination_label_short: String,
    /// Denomination kind
    pub denomination_kind: DenominationKind,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Nickname
    pub nick_name: Option<String>,
    /// Full name
    pub full_name: Option<String>,
    /// Spending/login PIN (format checked by the user context)
    pub pin: Option<String>,
    /// Exchange-rate provider identifier
    pub exchange_rate_source_id: String,
    /// Show name on payment requests
    pub show_name_on_payments: bool,
    /// Require PIN for spends above the threshold
    pub spend_requires_pin: bool,
    /// Spend threshold in smallest units; only meaningful with `spend_requires_pin`
    pub pin_required_above_amount: Option<i64>,
    /// PIN login disabled
    pub pin_login_disabled: bool,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        let kind = DEFAULTS.denomination;
        Self {
            auto_logout_minutes: DEFAULTS.auto_logout_minutes,
            default_currency_code: DEFAULTS.currency,
            denomination_units: kind.units(),
            denomination_label: kind.label().to_string(),
            denomination_label_short: kind.short_label().to_string(),
            denomination_kind: kind,
            first_name: None,
            last_name: None,
            nick_name: None,
            full_name: None,
            pin: None,
            exchange_rate_source_id: DEFAULTS.exchange_rate_source.id().to_string(),
            show_name_on_payments: DEFAULTS.show_name_on_payments,
            spend_requires_pin: DEFAULTS.spend_requires_pin,
            pin_required_above_amount: Some(DEFAULTS.pin_required_above_amount),
            pin_login_disabled: DEFAULTS.pin_login_disabled,
        }
    }
}

impl fmt::Debug for SettingsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsRecord")
            .field("auto_logout_minutes", &self.auto_logout_minutes)
            .field("default_currency_code", &self.default_currency_code)
            .field("denomination_units", &self.denomination_units)
            .field("denomination_label", &self.denomination_label)
            .field("denomination_label_short", &self.denomination_label_short)
            .field("denomination_kind", &self.denomination_kind)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("nick_name", &self.nick_name)
            .field("full_name", &self.full_name)
            .field("pin", &self.pin.as_ref().map(|_| "<redacted>"))
            .field("exchange_rate_source_id", &self.exchange_rate_source_id)
            .field("show_name_on_payments", &self.show_name_on_payments)
            .field("spend_requires_pin", &self.spend_requires_pin)
            .field("pin_required_above_amount", &self.pin_required_above_amount)
            .field("pin_login_disabled", &self.pin_login_disabled)
            .finish()
    }
}

impl SettingsRecord {
    /// Switch denomination, keeping units and labels consistent with the kind
    pub fn set_denomination(&mut self, kind: DenominationKind) {
        self.denomination_kind = kind;
        self.denomination_units = kind.units();
        self.denomination_label = kind.label().to_string();
        self.denomination_label_short = kind.short_label().to_string();
    }

    /// Require the PIN for spends above `threshold` smallest units
    pub fn require_pin_above(&mut self, threshold: i64) {
        self.spend_requires_pin = true;
        self.pin_required_above_amount = Some(threshold);
    }

    /// Stop asking for the PIN on spends
    pub fn disable_spend_pin(&mut self) {
        self.spend_requires_pin = false;
    }

    /// Whether a spend of `amount` smallest units needs the PIN
    pub fn spend_needs_pin(&self, amount: i64) -> bool {
        match (self.spend_requires_pin, self.pin_required_above_amount) {
            (true, Some(threshold)) => amount > threshold,
            (true, None) => true,
            (false, _) => false,
        }
    }

    /// Selected exchange-rate provider, if the stored id is known
    pub fn exchange_rate_source(&self) -> Option<ExchangeRateSource> {
        ExchangeRateSource::from_id(&self.exchange_rate_source_id)
    }

    /// Select an exchange-rate provider
    pub fn set_exchange_rate_source(&mut self, source: ExchangeRateSource) {
        self.exchange_rate_source_id = source.id().to_string();
    }

    /// Best display name: full name, else first + last, else nickname
    pub fn display_name(&self) -> Option<String> {
        if let Some(full) = non_empty(&self.full_name) {
            return Some(full.to_string());
        }
        match (non_empty(&self.first_name), non_empty(&self.last_name)) {
            (Some(first), Some(last)) => return Some(format!("{} {}", first, last)),
            (Some(first), None) => return Some(first.to_string()),
            (None, Some(last)) => return Some(last.to_string()),
            (None, None) => {}
        }
        non_empty(&self.nick_name).map(str::to_string)
    }

    /// Name to attach to payment requests, if the user opted in
    pub fn payment_name(&self) -> Option<String> {
        if self.show_name_on_payments {
            self.display_name()
        } else {
            None
        }
    }

    /// Render an amount in the selected denomination
    pub fn format_amount(&self, amount: i64) -> String {
        format!(
            "{} {}",
            self.denomination_kind.format_amount(amount),
            self.denomination_label
        )
    }

    /// Check record invariants
    pub fn validate(&self) -> Result<()> {
        let kind = self.denomination_kind;
        if self.denomination_units != kind.units() {
            return Err(SettingsError::invalid(
                SettingsField::DenominationUnits,
                format!(
                    "{} does not match {} ({})",
                    self.denomination_units,
                    kind.name(),
                    kind.units()
                ),
            ));
        }
        if self.denomination_label != kind.label() {
            return Err(SettingsError::invalid(
                SettingsField::DenominationLabel,
                format!("'{}' does not match {}", self.denomination_label, kind.name()),
            ));
        }
        if self.denomination_label_short != kind.short_label() {
            return Err(SettingsError::invalid(
                SettingsField::DenominationLabelShort,
                format!(
                    "'{}' does not match {}",
                    self.denomination_label_short,
                    kind.name()
                ),
            ));
        }

        if self.spend_requires_pin {
            match self.pin_required_above_amount {
                None => {
                    return Err(SettingsError::invalid(
                        SettingsField::PinRequiredAboveAmount,
                        "threshold is required when spends require a PIN",
                    ))
                }
                Some(amount) if amount < 0 => {
                    return Err(SettingsError::invalid(
                        SettingsField::PinRequiredAboveAmount,
                        format!("threshold must not be negative, got {}", amount),
                    ))
                }
                Some(_) => {}
            }
        }

        if self.exchange_rate_source().is_none() {
            return Err(SettingsError::invalid(
                SettingsField::ExchangeRateSourceId,
                format!("unknown provider '{}'", self.exchange_rate_source_id),
            ));
        }

        for (field, value) in [
            (SettingsField::FirstName, &self.first_name),
            (SettingsField::LastName, &self.last_name),
            (SettingsField::NickName, &self.nick_name),
            (SettingsField::FullName, &self.full_name),
        ] {
            if let Some(value) = value {
                if value.chars().count() > MAX_NAME_LENGTH {
                    return Err(SettingsError::invalid(
                        field,
                        format!("longer than {} characters", MAX_NAME_LENGTH),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Assign a field from its textual form
    ///
    /// Optional fields are cleared by an empty value. Denomination kind
    /// assignment also updates units and labels.
    pub fn set_from_str(&mut self, field: SettingsField, value: &str) -> Result<()> {
        let value = value.trim();
        match field {
            SettingsField::AutoLogoutMinutes => {
                self.auto_logout_minutes = parse_number(field, value)?;
            }
            SettingsField::DefaultCurrencyCode => {
                self.default_currency_code = CurrencyCode::from_alpha(value)
                    .ok_or_else(|| SettingsError::invalid(field, format!("unknown currency '{}'", value)))?;
            }
            SettingsField::DenominationUnits => {
                self.denomination_units = parse_number(field, value)?;
            }
            SettingsField::DenominationLabel => self.denomination_label = value.to_string(),
            SettingsField::DenominationLabelShort => {
                self.denomination_label_short = value.to_string()
            }
            SettingsField::DenominationKind => {
                let kind = DenominationKind::from_name(value).ok_or_else(|| {
                    SettingsError::invalid(field, format!("unknown denomination '{}'", value))
                })?;
                self.set_denomination(kind);
            }
            SettingsField::FirstName => self.first_name = optional(value),
            SettingsField::LastName => self.last_name = optional(value),
            SettingsField::NickName => self.nick_name = optional(value),
            SettingsField::FullName => self.full_name = optional(value),
            SettingsField::Pin => {
                if !value.is_empty() {
                    UserContext::check_pin_format(value)?;
                }
                self.pin = optional(value);
            }
            SettingsField::ExchangeRateSourceId => {
                self.exchange_rate_source_id = value.to_string()
            }
            SettingsField::ShowNameOnPayments => {
                self.show_name_on_payments = parse_bool(field, value)?
            }
            SettingsField::SpendRequiresPin => self.spend_requires_pin = parse_bool(field, value)?,
            SettingsField::PinRequiredAboveAmount => {
                self.pin_required_above_amount = if value.is_empty() {
                    None
                } else {
                    Some(parse_number(field, value)?)
                };
            }
            SettingsField::PinLoginDisabled => self.pin_login_disabled = parse_bool(field, value)?,
        }
        Ok(())
    }
}

/// Settings record fields, named by their persisted key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    /// `autoLogoutMinutes`
    AutoLogoutMinutes,
    /// `defaultCurrencyCode`
    DefaultCurrencyCode,
    /// `denominationUnits`
    DenominationUnits,
    /// `denominationLabel`
    DenominationLabel,
    /// `denominationLabelShort`
    DenominationLabelShort,
    /// `denominationKind`
    DenominationKind,
    /// `firstName`
    FirstName,
    /// `lastName`
    LastName,
    /// `nickName`
    NickName,
    /// `fullName`
    FullName,
    /// `pin`
    Pin,
    /// `exchangeRateSourceId`
    ExchangeRateSourceId,
    /// `showNameOnPayments`
    ShowNameOnPayments,
    /// `spendRequiresPin`
    SpendRequiresPin,
    /// `pinRequiredAboveAmount`
    PinRequiredAboveAmount,
    /// `pinLoginDisabled`
    PinLoginDisabled,
}

impl SettingsField {
    /// Persisted key
    pub const fn key(&self) -> &'static str {
        match self {
            SettingsField::AutoLogoutMinutes => "autoLogoutMinutes",
            SettingsField::DefaultCurrencyCode => "defaultCurrencyCode",
            SettingsField::DenominationUnits => "denominationUnits",
            SettingsField::DenominationLabel => "denominationLabel",
            SettingsField::DenominationLabelShort => "denominationLabelShort",
            SettingsField::DenominationKind => "denominationKind",
            SettingsField::FirstName => "firstName",
            SettingsField::LastName => "lastName",
            SettingsField::NickName => "nickName",
            SettingsField::FullName => "fullName",
            SettingsField::Pin => "pin",
            SettingsField::ExchangeRateSourceId => "exchangeRateSourceId",
            SettingsField::ShowNameOnPayments => "showNameOnPayments",
            SettingsField::SpendRequiresPin => "spendRequiresPin",
            SettingsField::PinRequiredAboveAmount => "pinRequiredAboveAmount",
            SettingsField::PinLoginDisabled => "pinLoginDisabled",
        }
    }

    /// Look up a field by its persisted key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|field| field.key() == key)
    }

    /// Get all fields
    pub fn all() -> &'static [SettingsField] {
        &[
            SettingsField::AutoLogoutMinutes,
            SettingsField::DefaultCurrencyCode,
            SettingsField::DenominationUnits,
            SettingsField::DenominationLabel,
            SettingsField::DenominationLabelShort,
            SettingsField::DenominationKind,
            SettingsField::FirstName,
            SettingsField::LastName,
            SettingsField::NickName,
            SettingsField::FullName,
            SettingsField::Pin,
            SettingsField::ExchangeRateSourceId,
            SettingsField::ShowNameOnPayments,
            SettingsField::SpendRequiresPin,
            SettingsField::PinRequiredAboveAmount,
            SettingsField::PinLoginDisabled,
        ]
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_bool(field: SettingsField, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(SettingsError::invalid(field, format!("expected a boolean, got '{}'", value))),
    }
}

fn parse_number<T: std::str::FromStr>(field: SettingsField, value: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| SettingsError::invalid(field, format!("'{}': {}", value, e)))
}
