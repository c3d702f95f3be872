//! Remote cart service interface.
//!
//! The authoritative cart lives behind this trait; the backend that
//! implements it is outside this workspace. Line identity on the server
//! side is the server-assigned [`CartLineId`], not the local merge key, so
//! retries are idempotent from the caller's perspective. Every ack carries
//! a `success` flag and a human-readable message; absence of connectivity
//! is reported as [`CartServiceError::Network`] and treated by the engine
//! exactly like `success == false`.

use crate::line::{CartLine, LineKey};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stokada_commerce::{CartLineId, Money, ProductCode};
use thiserror::Error;

/// Transport-level failures of the cart service.
#[derive(Error, Debug, Clone)]
pub enum CartServiceError {
    /// The service could not be reached.
    #[error("Cart service unreachable: {0}")]
    Network(String),

    /// The caller has no usable identity; the operation must not fall back
    /// to the local copy.
    #[error("Not authorized: {0}")]
    Unauthorized(String),
}

/// Request payload for adding a line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_code: ProductCode,
    pub color: String,
    pub size: String,
    pub quantity: i64,
}

/// Ack for update/remove/clear operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MutationAck {
    pub success: bool,
    pub message: String,
}

/// Ack for an add operation; carries the created or merged server line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddItemAck {
    pub success: bool,
    pub message: String,
    pub item: Option<RemoteLine>,
}

/// One line of the authoritative cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLine {
    pub cart_id: CartLineId,
    pub product_code: ProductCode,
    pub color: String,
    pub size: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_pieces: i64,
    pub is_assorted: bool,
    pub price_per_box: Money,
    pub list_price_per_box: Option<Money>,
    pub total_price: Money,
    pub total_pieces_ordered: i64,
    pub weight_grams: i64,
}

impl From<RemoteLine> for CartLine {
    fn from(line: RemoteLine) -> Self {
        CartLine {
            key: LineKey::new(line.product_code, line.color, line.size),
            remote_id: Some(line.cart_id),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_pieces: line.total_pieces,
            is_assorted: line.is_assorted,
            price_per_box: line.price_per_box,
            list_price_per_box: line.list_price_per_box,
            total_price: line.total_price,
            total_pieces_ordered: line.total_pieces_ordered,
            weight_grams: line.weight_grams,
        }
    }
}

/// The full authoritative cart with server-derived totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    pub success: bool,
    pub items: Vec<RemoteLine>,
    pub total_items: i64,
    pub total_quantity: i64,
    pub total_pieces: i64,
    pub sub_total: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub total_weight: i64,
}

/// The authoritative cart service.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Add a line; the server merges by its own identity rules.
    async fn add_item(&self, request: &AddItemRequest) -> Result<AddItemAck, CartServiceError>;

    /// Fetch the full authoritative cart.
    async fn get_cart(&self) -> Result<RemoteCart, CartServiceError>;

    /// Set the quantity of a server line.
    async fn update_item(
        &self,
        cart_id: &CartLineId,
        quantity: i64,
    ) -> Result<MutationAck, CartServiceError>;

    /// Remove a server line.
    async fn remove_item(&self, cart_id: &CartLineId) -> Result<MutationAck, CartServiceError>;

    /// Empty the cart.
    async fn clear_cart(&self) -> Result<MutationAck, CartServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use stokada_commerce::Currency;

    #[test]
    fn test_remote_line_into_cart_line() {
        let remote = RemoteLine {
            cart_id: CartLineId::new("srv-7"),
            product_code: ProductCode::new("3000-1"),
            color: "BLACK".to_string(),
            size: "42".to_string(),
            quantity: 2,
            unit_price: Money::new(500, Currency::TRY),
            total_pieces: 8,
            is_assorted: true,
            price_per_box: Money::new(4000, Currency::TRY),
            list_price_per_box: None,
            total_price: Money::new(8000, Currency::TRY),
            total_pieces_ordered: 16,
            weight_grams: 1200,
        };

        let line: CartLine = remote.into();
        assert_eq!(line.key, LineKey::new("3000-1", "BLACK", "42"));
        assert_eq!(line.remote_id, Some(CartLineId::new("srv-7")));
        assert_eq!(line.total_price.amount_cents, 8000);
    }

    #[test]
    fn test_protocol_field_names_are_camel_case() {
        let ack = MutationAck {
            success: false,
            message: "Item not found".to_string(),
        };
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Item not found");

        let request = AddItemRequest {
            product_code: ProductCode::new("3000-1"),
            color: "BLACK".to_string(),
            size: "42".to_string(),
            quantity: 2,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("productCode").is_some());
    }
}
