//! # Runtime Configuration
//!
//! Loaded from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `C2_CRYPTO_MODE` | `symmetric` | `symmetric` or `pubkey` |
//! | `C2_PASSPHRASE` | empty | operator passphrase the KEK is derived from |
//! | `C2_KEK_SALT` | built-in | salt for the KEK derivation |
//! | `C2_C2_KEY_PATH` | `./data/c2.key` | C2 private key file (PubKey mode) |
//! | `C2_DB_PATH` | `./data/c2db` | RocksDB directory |
//! | `C2_LOG_LEVEL` / `RUST_LOG` | `info` | tracing filter |
//! | `C2_JSON_LOGS` | `false` | JSON log lines |
//!
//! ## Security Requirements
//!
//! - The passphrase MUST be set in production
//! - The KEK salt MUST NOT be the built-in default in production

use shared_crypto::KdfParams;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use zeroize::Zeroizing;

/// Salt used when `C2_KEK_SALT` is unset. Refused by `validate_for_production`.
pub const DEFAULT_KEK_SALT: &str = "e4-c2-default-kek-salt";

/// Key-protection mode selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CryptoMode {
    #[default]
    Symmetric,
    PubKey,
}

impl FromStr for CryptoMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "symmetric" | "symkey" => Ok(CryptoMode::Symmetric),
            "pubkey" => Ok(CryptoMode::PubKey),
            other => Err(ConfigError::InvalidCryptoMode(other.to_string())),
        }
    }
}

impl fmt::Display for CryptoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoMode::Symmetric => f.write_str("symmetric"),
            CryptoMode::PubKey => f.write_str("pubkey"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown crypto mode '{0}', expected 'symmetric' or 'pubkey'")]
    InvalidCryptoMode(String),

    #[error("SECURITY VIOLATION: C2_PASSPHRASE is empty")]
    EmptyPassphrase,

    #[error("SECURITY VIOLATION: C2_KEK_SALT is the built-in default")]
    DefaultKekSalt,
}

/// Complete runtime configuration.
#[derive(Clone)]
pub struct RuntimeConfig {
    pub crypto_mode: CryptoMode,
    pub passphrase: Zeroizing<String>,
    pub kek_salt: String,
    pub c2_key_path: PathBuf,
    pub db_path: PathBuf,
    pub log_level: String,
    pub json_logs: bool,
    /// Argon2id parameters for the KEK. Not read from the environment.
    pub kdf: KdfParams,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            crypto_mode: CryptoMode::default(),
            passphrase: Zeroizing::new(String::new()),
            kek_salt: DEFAULT_KEK_SALT.to_string(),
            c2_key_path: PathBuf::from("./data/c2.key"),
            db_path: PathBuf::from("./data/c2db"),
            log_level: "info".to_string(),
            json_logs: false,
            kdf: KdfParams::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any variable source. Unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(mode) = lookup("C2_CRYPTO_MODE") {
            config.crypto_mode = mode.parse()?;
        }
        if let Some(passphrase) = lookup("C2_PASSPHRASE") {
            config.passphrase = Zeroizing::new(passphrase);
        }
        if let Some(salt) = lookup("C2_KEK_SALT") {
            config.kek_salt = salt;
        }
        if let Some(path) = lookup("C2_C2_KEY_PATH") {
            config.c2_key_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("C2_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = lookup("C2_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.log_level = level;
        }
        if let Some(json) = lookup("C2_JSON_LOGS") {
            config.json_logs = json.eq_ignore_ascii_case("true") || json == "1";
        }

        Ok(config)
    }

    /// Validate configuration for production readiness.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.passphrase.is_empty() {
            return Err(ConfigError::EmptyPassphrase);
        }
        if self.kek_salt == DEFAULT_KEK_SALT {
            return Err(ConfigError::DefaultKekSalt);
        }
        Ok(())
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("crypto_mode", &self.crypto_mode)
            .field("passphrase", &"<redacted>")
            .field("kek_salt", &self.kek_salt)
            .field("c2_key_path", &self.c2_key_path)
            .field("db_path", &self.db_path)
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}
