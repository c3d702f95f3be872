//! Cart line items and the local cart state.

use crate::error::CartError;
use serde::{Deserialize, Serialize};
use std::fmt;
use stokada_commerce::pricing::PriceQuote;
use stokada_commerce::{CartLineId, Currency, Money, ProductCode};

/// Identity of a cart line: one product code, colorway and size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_code: ProductCode,
    pub color: String,
    pub size: String,
}

impl LineKey {
    pub fn new(
        product_code: impl Into<ProductCode>,
        color: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            color: color.into(),
            size: size.into(),
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.product_code, self.color, self.size)
    }
}

/// A line in the cart. Quantity counts boxes, the transacted unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Merge identity.
    pub key: LineKey,
    /// Server-assigned line id; `None` for lines created while offline.
    pub remote_id: Option<CartLineId>,
    /// Boxes ordered.
    pub quantity: i64,
    /// Effective price per catalog unit, fixed when the line was created.
    pub unit_price: Money,
    /// Physical pieces per box.
    pub total_pieces: i64,
    /// Whether the box holds a fixed mix of sizes.
    pub is_assorted: bool,
    /// Price of one box.
    pub price_per_box: Money,
    /// Pre-discount box price, kept for discount reporting.
    pub list_price_per_box: Option<Money>,
    /// quantity * price_per_box.
    pub total_price: Money,
    /// quantity * total_pieces.
    pub total_pieces_ordered: i64,
    /// Shipping weight of one box, in grams.
    pub weight_grams: i64,
}

impl CartLine {
    /// Create a line from a pricing quote.
    pub fn new(
        key: LineKey,
        quantity: i64,
        quote: PriceQuote,
        total_pieces: i64,
        is_assorted: bool,
        list_price_per_box: Option<Money>,
        weight_grams: i64,
    ) -> Result<Self, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let mut line = Self {
            key,
            remote_id: None,
            quantity,
            unit_price: quote.unit_price,
            total_pieces,
            is_assorted,
            price_per_box: quote.price_per_box,
            list_price_per_box,
            total_price: Money::zero(quote.price_per_box.currency),
            total_pieces_ordered: 0,
            weight_grams,
        };
        line.update_totals()?;
        Ok(line)
    }

    /// Recompute the derived totals from the stored per-box price.
    pub fn update_totals(&mut self) -> Result<(), CartError> {
        self.total_price = self
            .price_per_box
            .try_multiply(self.quantity)
            .ok_or(CartError::Overflow)?;
        self.total_pieces_ordered = self
            .quantity
            .checked_mul(self.total_pieces)
            .ok_or(CartError::Overflow)?;
        Ok(())
    }

    /// Increase the quantity, keeping the price fixed at creation time.
    pub fn add_quantity(&mut self, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        self.quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or(CartError::Overflow)?;
        self.update_totals()
    }

    /// Set the quantity outright.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        self.quantity = quantity;
        self.update_totals()
    }
}

/// Which cart copy the current state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceOfTruth {
    /// Last successful reconciliation came from the remote cart.
    #[default]
    Server,
    /// Last mutation was applied to the local fallback copy.
    Local,
}

impl SourceOfTruth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceOfTruth::Server => "server",
            SourceOfTruth::Local => "local",
        }
    }
}

impl fmt::Display for SourceOfTruth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The local cart: ordered lines, provenance and a mutation counter.
///
/// `revision` increments on every applied state change; a background resync
/// adopts a fetched cart only if the revision it observed before the fetch
/// is still current, so user mutations always win races.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub lines: Vec<CartLine>,
    pub source: SourceOfTruth,
    pub revision: u64,
}

impl CartState {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a line by identity.
    pub fn find(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.key == key)
    }

    /// Look up a line mutably.
    pub fn find_mut(&mut self, key: &LineKey) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| &l.key == key)
    }

    /// Merge a line into the cart by identity.
    ///
    /// An existing line keeps its unit price and only grows its quantity;
    /// the cart is never re-priced from a catalog snapshot mid-session.
    pub fn merge_add(&mut self, line: CartLine, max_quantity: i64) -> Result<(), CartError> {
        match self.lines.iter().position(|l| l.key == line.key) {
            Some(idx) => {
                let existing = &mut self.lines[idx];
                let new_quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or(CartError::Overflow)?;
                if new_quantity > max_quantity {
                    return Err(CartError::QuantityExceedsLimit(new_quantity, max_quantity));
                }
                existing.add_quantity(line.quantity)
            }
            None => {
                if line.quantity > max_quantity {
                    return Err(CartError::QuantityExceedsLimit(line.quantity, max_quantity));
                }
                self.lines.push(line);
                Ok(())
            }
        }
    }

    /// Remove a line by identity.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.key != key);
        self.lines.len() < before
    }

    /// Drop all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Check if the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Derive the summary as a pure fold over the current lines.
    pub fn summary(&self, currency: Currency) -> CartSummary {
        CartSummary::from_lines(&self.lines, currency)
    }
}

/// Derived cart totals. Never cached; recomputed after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Distinct lines.
    pub total_items: i64,
    /// Boxes across all lines.
    pub total_quantity: i64,
    /// Physical pieces across all lines.
    pub total_pieces: i64,
    /// Pre-discount total.
    pub sub_total: Money,
    /// Savings against the pre-discount total.
    pub discount_amount: Money,
    /// Amount payable.
    pub total_amount: Money,
    /// Shipping weight in grams.
    pub total_weight_grams: i64,
}

impl CartSummary {
    /// Fold the summary from a set of lines.
    pub fn from_lines(lines: &[CartLine], currency: Currency) -> Self {
        let mut total_quantity = 0i64;
        let mut total_pieces = 0i64;
        let mut sub_cents = 0i64;
        let mut total_cents = 0i64;
        let mut weight = 0i64;

        for line in lines {
            total_quantity = total_quantity.saturating_add(line.quantity);
            total_pieces = total_pieces.saturating_add(line.total_pieces_ordered);
            total_cents = total_cents.saturating_add(line.total_price.amount_cents);
            let list_per_box = line
                .list_price_per_box
                .unwrap_or(line.price_per_box)
                .amount_cents;
            sub_cents = sub_cents.saturating_add(list_per_box.saturating_mul(line.quantity));
            weight = weight.saturating_add(line.weight_grams.saturating_mul(line.quantity));
        }

        Self {
            total_items: lines.len() as i64,
            total_quantity,
            total_pieces,
            sub_total: Money::new(sub_cents, currency),
            discount_amount: Money::new(sub_cents.saturating_sub(total_cents), currency),
            total_amount: Money::new(total_cents, currency),
            total_weight_grams: weight,
        }
    }
}
