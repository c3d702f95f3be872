//! Box and piece pricing.
//!
//! Assorted products are the error-prone case: the catalog's per-unit price
//! is a price *per piece*, while the box (the sellable unit) holds
//! `total_pieces` of them. Non-assorted products sell box == piece. Every
//! consumer goes through [`quote`] rather than re-deriving the asymmetry.

use crate::catalog::Variant;
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Resolve the effective selling price.
///
/// Precedence: explicit final price when positive, then a qualifying
/// campaign price (positive and strictly below the list price), then the
/// list price. The grouping path and the cart path both use this routine.
pub fn resolve_effective_price(price: Money, campaign_price: Money, final_price: Money) -> Money {
    if final_price.is_positive() {
        return final_price;
    }
    if is_discounted(price, campaign_price) {
        return campaign_price;
    }
    price
}

/// Check whether the campaign price qualifies as a discount.
pub fn is_discounted(price: Money, campaign_price: Money) -> bool {
    campaign_price.is_positive() && campaign_price.amount_cents < price.amount_cents
}

/// Rounded discount percentage, 0 when the campaign price does not qualify.
pub fn discount_percent(price: Money, campaign_price: Money) -> i64 {
    if !is_discounted(price, campaign_price) {
        return 0;
    }
    let savings = (price.amount_cents - campaign_price.amount_cents) as f64;
    (savings / price.amount_cents as f64 * 100.0).round() as i64
}

/// Resolved pricing figures for one variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    /// Effective price per catalog unit.
    pub unit_price: Money,
    /// Price of one box, the transacted unit.
    pub price_per_box: Money,
    /// Price of one physical piece.
    pub price_per_piece: Money,
    /// Rounded discount percentage.
    pub discount_percent: i64,
}

/// Quote a variant.
///
/// For assorted products the unit price is per piece and the box price is
/// `unit_price * total_pieces`; otherwise box and piece coincide.
pub fn quote(variant: &Variant, assorted: bool) -> Result<PriceQuote, CommerceError> {
    let unit_price = variant.unit_price;
    let price_per_box = if assorted {
        unit_price
            .try_multiply(variant.total_pieces)
            .ok_or(CommerceError::Overflow)?
    } else {
        unit_price
    };

    Ok(PriceQuote {
        unit_price,
        price_per_box,
        price_per_piece: unit_price,
        discount_percent: discount_percent(variant.price, variant.campaign_price),
    })
}

/// Quote the variant that also carries a pre-discount box price, for
/// strike-through display and discount reporting.
pub fn list_price_per_box(variant: &Variant, assorted: bool) -> Option<Money> {
    if !variant.is_on_sale() {
        return None;
    }
    if assorted {
        variant.price.try_multiply(variant.total_pieces)
    } else {
        Some(variant.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use std::collections::BTreeMap;

    fn lira(v: f64) -> Money {
        Money::from_decimal(v, Currency::TRY)
    }

    fn variant(price: f64, campaign: f64, final_price: f64, pieces: i64) -> Variant {
        let price = lira(price);
        let campaign_price = lira(campaign);
        Variant {
            color: "BLACK".to_string(),
            stock: 10,
            price,
            campaign_price,
            unit_price: resolve_effective_price(price, campaign_price, lira(final_price)),
            total_pieces: pieces,
            sizes: BTreeMap::new(),
            weight_grams: 0,
        }
    }

    #[test]
    fn test_final_price_wins() {
        let effective = resolve_effective_price(lira(40.0), lira(35.0), lira(30.0));
        assert_eq!(effective.amount_cents, 3000);
    }

    #[test]
    fn test_campaign_price_wins_when_below_list() {
        let effective = resolve_effective_price(lira(40.0), lira(35.0), Money::zero(Currency::TRY));
        assert_eq!(effective.amount_cents, 3500);
    }

    #[test]
    fn test_campaign_at_or_above_list_is_ignored() {
        let effective = resolve_effective_price(lira(40.0), lira(45.0), Money::zero(Currency::TRY));
        assert_eq!(effective.amount_cents, 4000);

        let effective = resolve_effective_price(lira(40.0), lira(40.0), Money::zero(Currency::TRY));
        assert_eq!(effective.amount_cents, 4000);
    }

    #[test]
    fn test_assorted_box_price_multiplies_pieces() {
        let v = variant(0.0, 0.0, 5.0, 8);
        let q = quote(&v, true).unwrap();
        assert_eq!(q.price_per_box.amount_cents, 4000);
        assert_eq!(q.price_per_piece.amount_cents, 500);
        assert_eq!(q.unit_price.amount_cents, 500);
    }

    #[test]
    fn test_plain_box_price_equals_piece_price() {
        let v = variant(40.0, 0.0, 0.0, 8);
        let q = quote(&v, false).unwrap();
        assert_eq!(q.price_per_box.amount_cents, 4000);
        assert_eq!(q.price_per_piece.amount_cents, 4000);
    }

    #[test]
    fn test_discount_percent_rounds() {
        assert_eq!(discount_percent(lira(40.0), lira(35.0)), 13);
        assert_eq!(discount_percent(lira(100.0), lira(75.0)), 25);
        assert_eq!(discount_percent(lira(40.0), lira(45.0)), 0);
        assert_eq!(discount_percent(lira(40.0), Money::zero(Currency::TRY)), 0);
    }

    #[test]
    fn test_quote_carries_discount_percent() {
        let v = variant(40.0, 35.0, 0.0, 8);
        let q = quote(&v, true).unwrap();
        assert_eq!(q.discount_percent, 13);
        assert_eq!(q.unit_price.amount_cents, 3500);
    }

    #[test]
    fn test_list_price_per_box() {
        let v = variant(40.0, 35.0, 0.0, 8);
        assert_eq!(list_price_per_box(&v, true).unwrap().amount_cents, 32000);
        assert_eq!(list_price_per_box(&v, false).unwrap().amount_cents, 4000);

        let plain = variant(40.0, 0.0, 0.0, 8);
        assert!(list_price_per_box(&plain, false).is_none());
    }
}
