//! # Engine Error Types
//!
//! Errors returned by admin and purchase requests. The mining path itself
//! never fails: anything odd it meets is logged and absorbed.

use thiserror::Error;

use crate::collaborators::Currency;
use crate::enchantment::EnchantmentId;
use crate::profile::PlayerId;

/// Errors that can occur in the enchantment engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnchantError {
    /// An enchantment id string did not match any known enchantment.
    #[error("unknown enchantment: {0}")]
    UnknownEnchantment(String),

    /// A level above the enchantment's maximum was requested.
    #[error("level {level} exceeds maximum {max} for {id}")]
    LevelAboveMaximum {
        /// The enchantment.
        id: EnchantmentId,
        /// The requested level.
        level: u32,
        /// The configured maximum.
        max: u32,
    },

    /// The enchantment is already at its maximum level.
    #[error("{0} is already at its maximum level")]
    MaxLevelReached(EnchantmentId),

    /// The enchantment cannot be used as a book.
    #[error("{0} is not a book enchantment")]
    NotABook(EnchantmentId),

    /// The player has not applied this book yet.
    #[error("book {0} has not been unlocked")]
    BookNotOwned(EnchantmentId),

    /// The player already has the maximum number of active books.
    #[error("too many active books: at most {max} may be active")]
    TooManyActiveBooks {
        /// The active-book cap.
        max: usize,
    },

    /// The player cannot pay for the request.
    #[error("insufficient {currency:?}: need {required}, have {available}")]
    InsufficientFunds {
        /// Currency that was short.
        currency: Currency,
        /// Amount required.
        required: u64,
        /// Amount available.
        available: u64,
    },

    /// The player already has a tornado running.
    #[error("player {0} already has an active tornado")]
    TornadoAlreadyActive(PlayerId),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type EnchantResult<T> = Result<T, EnchantError>;
