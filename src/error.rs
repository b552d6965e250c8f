//! Unified error type for the showcase firmware.
//!
//! Port-level errors stay typed where they originate ([`ConfigError`],
//! [`StorageError`], [`NfcError`], [`MenuError`]); anything that has to cross
//! into `main` converts into [`Error`] so boot code can use `anyhow` and `?`.

use core::fmt;

pub use crate::app::menu::MenuError;
pub use crate::app::ports::{ConfigError, NfcError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Settings could not be loaded or persisted.
    Config(ConfigError),
    /// Key-value storage failed.
    Storage(StorageError),
    /// NFC reader or tag failure.
    Nfc(NfcError),
    /// Menu could not be built.
    Menu(MenuError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Nfc(e) => write!(f, "nfc: {e}"),
            Self::Menu(e) => write!(f, "menu: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<NfcError> for Error {
    fn from(e: NfcError) -> Self {
        Self::Nfc(e)
    }
}

impl From<MenuError> for Error {
    fn from(e: MenuError) -> Self {
        Self::Menu(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
