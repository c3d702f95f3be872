//! Cart reconciliation engine for Stokada.
//!
//! The cart has two copies: the authoritative one behind the remote cart
//! service and a local copy that keeps working when the service is
//! unreachable. This crate owns both sides of that duality:
//!
//! - **Line items**: merge-by-identity cart lines with box/piece totals
//!   and a pure summary fold
//! - **Remote**: the async interface of the authoritative cart service
//! - **Store**: the persisted local fallback slot
//! - **Engine**: the reconciliation state machine that attempts the remote
//!   first, adopts the authoritative cart on success, mutates locally on
//!   failure and heals with a periodic resync
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stokada_cart::{CartEngine, CartEngineConfig, MemoryStore};
//!
//! let engine = Arc::new(CartEngine::new(service, Arc::new(MemoryStore::new()),
//!     CartEngineConfig::default()));
//! engine.init().await;
//! let resync = engine.spawn_resync();
//!
//! let outcome = engine.add_item(&group, "BLACK", "42", 2).await;
//! if outcome.source == SourceOfTruth::Local {
//!     println!("warning: {}", outcome.message);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod line;
pub mod remote;
pub mod store;

pub use config::{CartEngineConfig, MAX_QUANTITY_PER_LINE};
pub use engine::{CartEngine, CartOutcome};
pub use error::CartError;
pub use line::{CartLine, CartState, CartSummary, LineKey, SourceOfTruth};
pub use remote::{
    AddItemAck, AddItemRequest, CartService, CartServiceError, MutationAck, RemoteCart, RemoteLine,
};
pub use store::{CartStore, MemoryStore, StoreError};
