//! Per-user wallet settings
//!
//! A settings record (currency, denomination, PIN policy, logout timeout,
//! display names, exchange-rate source) owned by one authenticated user,
//! loaded from and saved to a local store, with biometric unlock managed
//! through a secure store.
//!
//! Storage and keystore backends plug in through [`LocalStore`] and
//! [`SecureStore`]; the record itself is encoded by pure functions in
//! [`codec`] so it can be tested without I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod currency;
pub mod defaults;
pub mod denomination;
pub mod error;
pub mod exchange;
pub mod memory;
pub mod record;
pub mod settings_store;
pub mod store;
pub mod user;

pub use currency::CurrencyCode;
pub use defaults::{SettingsDefaults, DEFAULTS, MAX_NAME_LENGTH};
pub use denomination::{DenominationKind, UNITS_PER_COIN};
pub use error::{ErrorCategory, Result, SettingsError};
pub use exchange::ExchangeRateSource;
pub use memory::{MemoryLocalStore, MemorySecureStore};
pub use record::{SettingsField, SettingsRecord};
pub use settings_store::{SettingsStore, StoreState};
pub use store::{LocalStore, LocalStoreError, SecureStore, SecureStoreError};
pub use user::{UserContext, UserId, PIN_LENGTH};
