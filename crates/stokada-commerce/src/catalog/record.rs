//! Catalog record parsing.
//!
//! The wholesale feed delivers per-color stock records as loosely typed
//! JSON: numbers arrive as numbers or numeric strings, booleans are
//! sometimes missing, sizes come as a `size -> count` object. Everything is
//! coerced and defaulted exactly once, here at the boundary, so downstream
//! code only ever sees a typed [`VariantRecord`].

use crate::error::CommerceError;
use crate::ids::ProductCode;
use crate::money::{Currency, Money};
use crate::pricing;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single per-color stock record from the catalog feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantRecord {
    /// Product code shared by all colorways of one model.
    pub product_code: ProductCode,
    /// Colorway name (e.g., "BLACK").
    pub color: String,
    /// List price per sellable unit.
    pub price: Money,
    /// Campaign price; only honored when positive and below the list price.
    pub campaign_price: Money,
    /// Pre-resolved final price; wins over everything when positive.
    pub final_price: Money,
    /// Boxes bundled per shipping parcel.
    pub box_quantity: i64,
    /// Boxes currently in stock.
    pub actual_stock: i64,
    /// Physical pieces per box.
    pub total_pieces: i64,
    /// Whether one box holds a fixed mix of sizes.
    pub is_assorted: bool,
    /// Size -> piece count inside one box.
    pub sizes: BTreeMap<String, i64>,
    /// Upper material.
    pub outer_material: String,
    /// Lining material.
    pub inner_material: String,
    /// Sole material.
    pub sole: String,
    /// Merchandising group (e.g., "SANDALS").
    pub product_group: String,
    /// Target gender.
    pub gender: String,
    /// Shipping weight of one box, in grams.
    pub weight_grams: i64,
}

impl VariantRecord {
    /// Parse a single raw record.
    ///
    /// A record without a product code is malformed; every other field
    /// falls back to its documented default.
    pub fn from_value(value: &Value, currency: Currency) -> Result<Self, CommerceError> {
        let obj = value
            .as_object()
            .ok_or_else(|| CommerceError::MalformedRecord("not an object".to_string()))?;

        let product_code = coerce_string(obj.get("productCode"));
        if product_code.is_empty() {
            return Err(CommerceError::MalformedRecord(
                "missing productCode".to_string(),
            ));
        }

        let sizes = coerce_sizes(obj.get("sizes"));
        let explicit_pieces = coerce_i64(obj.get("totalPieces"));
        let total_pieces = resolve_total_pieces(explicit_pieces, &sizes);

        Ok(Self {
            product_code: ProductCode::new(product_code),
            color: coerce_string(obj.get("color")),
            price: coerce_money(obj.get("price"), currency),
            campaign_price: coerce_money(obj.get("campaignPrice"), currency),
            final_price: coerce_money(obj.get("finalPrice"), currency),
            box_quantity: coerce_i64(obj.get("boxQuantity")).max(0),
            actual_stock: coerce_i64(obj.get("actualStock")).max(0),
            total_pieces,
            is_assorted: coerce_bool(obj.get("isAssorted")),
            sizes,
            outer_material: coerce_string(obj.get("outerMaterial")),
            inner_material: coerce_string(obj.get("innerMaterial")),
            sole: coerce_string(obj.get("sole")),
            product_group: coerce_string(obj.get("productGroup")),
            gender: coerce_string(obj.get("gender")),
            weight_grams: coerce_i64(obj.get("weightGrams")).max(0),
        })
    }

    /// Effective selling price for this record.
    ///
    /// Delegates to the shared precedence routine so the grouping path and
    /// the cart path always agree.
    pub fn effective_price(&self) -> Money {
        pricing::resolve_effective_price(self.price, self.campaign_price, self.final_price)
    }
}

/// Parse a batch of raw records.
///
/// Malformed records are logged and skipped; a bad entry never aborts the
/// whole load.
pub fn parse_records(values: &[Value], currency: Currency) -> Vec<VariantRecord> {
    let mut records = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        match VariantRecord::from_value(value, currency) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("skipping catalog record {}: {}", idx, e);
            }
        }
    }
    records
}

/// Pieces-per-box resolution: explicit positive value first, then the sum of
/// positive size counts, then 1.
fn resolve_total_pieces(explicit: i64, sizes: &BTreeMap<String, i64>) -> i64 {
    if explicit > 0 {
        return explicit;
    }
    let from_sizes: i64 = sizes.values().filter(|&&count| count > 0).sum();
    if from_sizes > 0 {
        return from_sizes;
    }
    1
}

fn coerce_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn coerce_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn coerce_money(value: Option<&Value>, currency: Currency) -> Money {
    Money::from_decimal(coerce_f64(value), currency)
}

fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn coerce_sizes(value: Option<&Value>) -> BTreeMap<String, i64> {
    let mut sizes = BTreeMap::new();
    if let Some(Value::Object(map)) = value {
        for (size, count) in map {
            sizes.insert(size.clone(), coerce_i64(Some(count)).max(0));
        }
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> VariantRecord {
        VariantRecord::from_value(&value, Currency::TRY).unwrap()
    }

    #[test]
    fn test_numeric_string_coercion() {
        let record = parse(json!({
            "productCode": "3000-1",
            "color": "BLACK",
            "price": "40",
            "actualStock": "15",
            "boxQuantity": 2,
        }));

        assert_eq!(record.price.amount_cents, 4000);
        assert_eq!(record.actual_stock, 15);
        assert_eq!(record.box_quantity, 2);
    }

    #[test]
    fn test_unparseable_numbers_default_to_zero() {
        let record = parse(json!({
            "productCode": "3000-1",
            "price": "n/a",
            "actualStock": null,
        }));

        assert!(record.price.is_zero());
        assert_eq!(record.actual_stock, 0);
    }

    #[test]
    fn test_total_pieces_explicit_wins_over_sizes() {
        let record = parse(json!({
            "productCode": "3000-1",
            "totalPieces": 5,
            "sizes": {"40": 2, "41": 2},
        }));
        assert_eq!(record.total_pieces, 5);
    }

    #[test]
    fn test_total_pieces_falls_back_to_size_sum() {
        let record = parse(json!({
            "productCode": "3000-1",
            "totalPieces": 0,
            "sizes": {"40": 2, "41": "2"},
        }));
        assert_eq!(record.total_pieces, 4);
    }

    #[test]
    fn test_total_pieces_defaults_to_one() {
        let record = parse(json!({"productCode": "3000-1"}));
        assert_eq!(record.total_pieces, 1);
    }

    #[test]
    fn test_missing_bool_defaults_to_false() {
        let record = parse(json!({"productCode": "3000-1"}));
        assert!(!record.is_assorted);

        let record = parse(json!({"productCode": "3000-1", "isAssorted": "1"}));
        assert!(record.is_assorted);
    }

    #[test]
    fn test_negative_stock_clamped() {
        let record = parse(json!({"productCode": "3000-1", "actualStock": -3}));
        assert_eq!(record.actual_stock, 0);
    }

    #[test]
    fn test_malformed_record_is_skipped_not_fatal() {
        let values = vec![
            json!({"productCode": "3000-1", "color": "BLACK"}),
            json!({"color": "BROWN"}),
            json!("not an object"),
            json!({"productCode": "3000-2", "color": "TAN"}),
        ];

        let records = parse_records(&values, Currency::TRY);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_code.as_str(), "3000-1");
        assert_eq!(records[1].product_code.as_str(), "3000-2");
    }

    #[test]
    fn test_effective_price_uses_shared_precedence() {
        let record = parse(json!({
            "productCode": "3000-1",
            "price": 40,
            "campaignPrice": 35,
            "finalPrice": 0,
        }));
        assert_eq!(record.effective_price().amount_cents, 3500);
    }
}
