use thiserror::Error;

use crate::models::product::ProductId;

/// Unified error type for the entire storefront-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Every variant is recoverable: callers either surface it to the user
/// or fall back to an empty/default state.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Cart / Checkout ─────────────────────────────────────────────
    #[error("Item not in cart: {0}")]
    ItemNotFound(ProductId),

    #[error("Invalid promo code: {0}")]
    InvalidPromoCode(String),

    // ── Persistence ─────────────────────────────────────────────────
    #[error("Failed to read '{key}' from storage: {message}")]
    PersistenceRead { key: String, message: String },

    #[error("Failed to write '{key}' to storage: {message}")]
    PersistenceWrite { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Validation ──────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// Wrap a low-level error as a read failure for `key`.
    pub fn read(key: &str, cause: impl std::fmt::Display) -> Self {
        CoreError::PersistenceRead {
            key: key.to_string(),
            message: cause.to_string(),
        }
    }

    /// Wrap a low-level error as a write failure for `key`.
    pub fn write(key: &str, cause: impl std::fmt::Display) -> Self {
        CoreError::PersistenceWrite {
            key: key.to_string(),
            message: cause.to_string(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            CoreError::Deserialization(e.to_string())
        } else {
            CoreError::Serialization(e.to_string())
        }
    }
}
