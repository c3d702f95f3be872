//! Persisted local fallback slot.
//!
//! A single client-local key-value slot holding the JSON-serialized line
//! array. It is written after every settled mutation and read back only
//! when the authoritative cart is unreachable or empty at startup.

use crate::error::CartError;
use crate::line::CartLine;
use std::sync::Mutex;
use thiserror::Error;

/// Failures of the local slot.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing storage could not be used.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A client-local slot for the serialized cart.
pub trait CartStore: Send + Sync {
    /// Read the stored payload, `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Overwrite the stored payload.
    fn save(&self, payload: &str) -> Result<(), StoreError>;

    /// Drop the stored payload.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Serialize cart lines for the slot.
pub fn encode_lines(lines: &[CartLine]) -> Result<String, CartError> {
    Ok(serde_json::to_string(lines)?)
}

/// Deserialize cart lines from the slot.
pub fn decode_lines(payload: &str) -> Result<Vec<CartLine>, CartError> {
    Ok(serde_json::from_str(payload)?)
}

/// In-memory slot; the default when no persistence is wired in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("slot poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, payload: &str) -> Result<(), StoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("slot poisoned".to_string()))?;
        *slot = Some(payload.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("slot poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}
