//! CLI harness for inspecting and editing per-user wallet settings
//!
//! Settings live in an encrypted SQLite database. Biometric commands use the
//! mock platform keystore, so sealed secrets only unlock within one process;
//! enable/disable/status still exercise the full persistence path.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use wallet_settings_core::{
    DenominationKind, SettingsError, SettingsField, SettingsStore, UserContext, UserId,
};
use wallet_settings_sqlite::{
    generate_salt, Database, EncryptionAlgorithm, EncryptionKey, KeystoreSecureStore, MasterKey,
    MockKeystore, SqliteLocalStore,
};

#[derive(Parser)]
#[command(name = "settings-harness")]
#[command(about = "Wallet settings inspection harness", long_about = None)]
struct Cli {
    /// Settings database path (defaults to the platform data directory)
    #[arg(long, env = "SETTINGS_DB")]
    db: Option<PathBuf>,

    /// User whose settings to operate on
    #[arg(short, long)]
    user: String,

    /// Database passphrase
    #[arg(long, env = "SETTINGS_PASSPHRASE", hide_env_values = true)]
    passphrase: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the user's settings as JSON
    Show,

    /// Set one field by its persisted key (e.g. autoLogoutMinutes)
    Set {
        /// Field key
        key: String,
        /// New value; an empty string clears optional fields
        value: String,
    },

    /// Switch the display denomination
    Denomination {
        /// full, milli or micro
        kind: String,
    },

    /// Query or change biometric unlock (mock keystore: a secret enabled here
    /// unseals only within the same process, later runs see status only)
    Biometric {
        #[arg(value_enum)]
        action: BiometricAction,
    },

    /// Restore defaults and save (also recovers corrupt settings)
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum BiometricAction {
    Status,
    Enable,
    Disable,
}

/// Salts for the database key and the blob key
#[derive(Serialize, Deserialize)]
struct SaltFile {
    database: String,
    blob: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = match cli.db {
        Some(path) => path,
        None => default_db_path()?,
    };
    let mut store = open_store(&db_path, &cli.user, &cli.passphrase)?;

    match cli.command {
        Commands::Show => {
            load(&mut store)?;
            show(&store)?;
        }
        Commands::Set { key, value } => {
            let field = SettingsField::from_key(&key).ok_or_else(|| {
                let keys: Vec<&str> = SettingsField::all().iter().map(|f| f.key()).collect();
                anyhow!("unknown field '{}', expected one of: {}", key, keys.join(", "))
            })?;
            load(&mut store)?;
            store.settings_mut()?.set_from_str(field, &value)?;
            save(&mut store)?;
            info!("Set {}", field);
        }
        Commands::Denomination { kind } => {
            let kind = DenominationKind::from_name(&kind)
                .ok_or_else(|| anyhow!("unknown denomination '{}'", kind))?;
            load(&mut store)?;
            store.settings_mut()?.set_denomination(kind);
            save(&mut store)?;
            info!("Denomination set to {}", kind.label());
        }
        Commands::Biometric { action } => match action {
            BiometricAction::Status => {
                let status = if store.touch_id_enabled() { "enabled" } else { "disabled" };
                println!("{}", status);
            }
            BiometricAction::Enable => {
                store.enable_touch_id()?;
                info!("Biometric unlock enabled");
            }
            BiometricAction::Disable => {
                store.disable_touch_id()?;
                info!("Biometric unlock disabled");
            }
        },
        Commands::Reset => {
            if let Err(e) = store.load() {
                warn!("Discarding stored settings: {}", e);
            }
            store.reset_to_defaults()?;
            save(&mut store)?;
            info!("Settings reset to defaults");
        }
    }

    Ok(())
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("org", "WalletSettings", "wallet-settings")
        .ok_or_else(|| anyhow!("no home directory; pass --db"))?;
    Ok(dirs.data_dir().join("settings.db"))
}

fn open_store(db_path: &Path, user: &str, passphrase: &str) -> anyhow::Result<SettingsStore> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let salts = load_or_create_salts(&salt_path(db_path))?;
    let db_salt = hex::decode(&salts.database).context("malformed database salt")?;
    let blob_salt = hex::decode(&salts.blob).context("malformed blob salt")?;

    let key = EncryptionKey::from_passphrase(passphrase, &db_salt)?;
    let master_key =
        MasterKey::from_passphrase(passphrase, &blob_salt, EncryptionAlgorithm::ChaCha20Poly1305)?;
    let db = Database::open_shared(db_path, &key, master_key)
        .with_context(|| format!("opening {}", db_path.display()))?;

    let local = Arc::new(SqliteLocalStore::new(db.clone()));
    let secure = Arc::new(KeystoreSecureStore::new(
        Arc::new(MockKeystore::with_biometrics()),
        db,
    ));
    let user = UserContext::new(UserId::new(user)?, passphrase);
    Ok(SettingsStore::new(user, local, secure))
}

fn salt_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_owned();
    name.push(".salt");
    PathBuf::from(name)
}

fn load_or_create_salts(path: &Path) -> anyhow::Result<SaltFile> {
    if path.exists() {
        let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        return serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()));
    }

    let salts = SaltFile {
        database: hex::encode(generate_salt()),
        blob: hex::encode(generate_salt()),
    };
    std::fs::write(path, serde_json::to_vec_pretty(&salts)?)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Created salt file {}", path.display());
    Ok(salts)
}

fn load(store: &mut SettingsStore) -> anyhow::Result<()> {
    match store.load() {
        Ok(_) => Ok(()),
        Err(SettingsError::NotFound(_)) => {
            info!("No saved settings, using defaults");
            Ok(())
        }
        Err(e @ SettingsError::CorruptData(_)) => {
            bail!("{} (run `reset` to start over)", e.user_message())
        }
        Err(e) => Err(e.into()),
    }
}

fn save(store: &mut SettingsStore) -> anyhow::Result<()> {
    store.save().map_err(|e| anyhow!("{}", e.user_message()))
}

fn show(store: &SettingsStore) -> anyhow::Result<()> {
    let record = store.settings()?;
    let mut value = serde_json::to_value(record)?;
    if let Some(pin) = value.get_mut("pin") {
        if !pin.is_null() {
            *pin = serde_json::Value::String("****".to_string());
        }
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    println!("balance preview: {}", record.format_amount(123_456_789));
    Ok(())
}
