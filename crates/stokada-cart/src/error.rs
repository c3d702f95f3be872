//! Cart error types.

use stokada_commerce::CommerceError;
use thiserror::Error;

/// Errors that can occur in cart operations.
///
/// Public engine operations never surface these directly; they are folded
/// into a [`crate::CartOutcome`] with a success flag and message.
#[derive(Error, Debug)]
pub enum CartError {
    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds the per-line cap.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// No variant with this color under the product.
    #[error("Variant not found: {product_code} / {color}")]
    VariantNotFound {
        product_code: String,
        color: String,
    },

    /// The variant does not stock this size.
    #[error("Size {size} not available for {product_code} / {color}")]
    SizeUnavailable {
        product_code: String,
        color: String,
        size: String,
    },

    /// Line not present in the cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in cart calculation")]
    Overflow,

    /// Error bubbled up from the catalog domain.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CartError {
    fn from(e: serde_json::Error) -> Self {
        CartError::Serialization(e.to_string())
    }
}
