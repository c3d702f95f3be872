//! Product grouping.
//!
//! Folds flat per-color stock records into [`ProductGroup`]s keyed by
//! product code, deriving the aggregate facts the storefront displays:
//! total stock, price range, color and size facets, discount flag and the
//! card-display variant. The whole [`Catalog`] is rebuilt on every feed
//! load; it is never patched incrementally.

use crate::catalog::record::VariantRecord;
use crate::ids::ProductCode;
use crate::money::Money;
use crate::pricing;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single colorway under a product group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Colorway name.
    pub color: String,
    /// Boxes in stock.
    pub stock: i64,
    /// List price per sellable unit.
    pub price: Money,
    /// Campaign price as delivered by the feed.
    pub campaign_price: Money,
    /// Resolved effective price.
    pub unit_price: Money,
    /// Physical pieces per box.
    pub total_pieces: i64,
    /// Size -> piece count inside one box.
    pub sizes: BTreeMap<String, i64>,
    /// Shipping weight of one box, in grams.
    pub weight_grams: i64,
}

impl Variant {
    /// Derive a variant from a parsed record.
    pub fn from_record(record: &VariantRecord) -> Self {
        Self {
            color: record.color.clone(),
            stock: record.actual_stock,
            price: record.price,
            campaign_price: record.campaign_price,
            unit_price: record.effective_price(),
            total_pieces: record.total_pieces,
            sizes: record.sizes.clone(),
            weight_grams: record.weight_grams,
        }
    }

    /// Check if this variant carries a qualifying campaign price.
    pub fn is_on_sale(&self) -> bool {
        pricing::is_discounted(self.price, self.campaign_price)
    }

    /// Rounded discount percentage, 0 when not on sale.
    pub fn discount_percent(&self) -> i64 {
        pricing::discount_percent(self.price, self.campaign_price)
    }

    /// Check if this variant has boxes in stock.
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Facts copied from the first variant seen for a product code.
///
/// Later variants with differing materials do not overwrite these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupBaseInfo {
    pub outer_material: String,
    pub inner_material: String,
    pub sole: String,
    pub product_group: String,
    pub gender: String,
    pub is_assorted: bool,
}

impl GroupBaseInfo {
    fn from_record(record: &VariantRecord) -> Self {
        Self {
            outer_material: record.outer_material.clone(),
            inner_material: record.inner_material.clone(),
            sole: record.sole.clone(),
            product_group: record.product_group.clone(),
            gender: record.gender.clone(),
            is_assorted: record.is_assorted,
        }
    }
}

/// Min/max over the positive effective prices of a group's variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

impl PriceRange {
    /// Expand the range to cover a price. Non-positive prices are ignored.
    pub fn expand(&mut self, price: Money) {
        if !price.is_positive() {
            return;
        }
        if self.min.is_zero() && self.max.is_zero() {
            self.min = price;
            self.max = price;
            return;
        }
        if price.amount_cents < self.min.amount_cents {
            self.min = price;
        }
        if price.amount_cents > self.max.amount_cents {
            self.max = price;
        }
    }

    /// Overlap test against an optional `[min, max]` window.
    ///
    /// Rejects only when the ranges are disjoint; containment is not
    /// required.
    pub fn overlaps(&self, min: Option<Money>, max: Option<Money>) -> bool {
        if let Some(max) = max {
            if self.min.amount_cents > max.amount_cents {
                return false;
            }
        }
        if let Some(min) = min {
            if self.max.amount_cents < min.amount_cents {
                return false;
            }
        }
        true
    }
}

/// The aggregation of all variants sharing one product code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductGroup {
    /// Group identity.
    pub product_code: ProductCode,
    /// First-seen materials/gender/assortment facts.
    pub base: GroupBaseInfo,
    /// Variants in feed order.
    pub variants: Vec<Variant>,
    /// Sum of variant stock, in boxes.
    pub total_stock: i64,
    /// Range over positive effective prices; `{0, 0}` when none.
    pub price_range: PriceRange,
    /// Colors in first-seen order, deduplicated.
    pub available_colors: Vec<String>,
    /// Numerically sorted sizes with positive stock in any variant.
    pub available_sizes: Vec<String>,
    /// Whether any variant carries a qualifying campaign price.
    pub has_discount: bool,
    /// Index of the highest-stock variant, for card display.
    primary_idx: usize,
}

impl ProductGroup {
    fn new(record: &VariantRecord) -> Self {
        Self {
            product_code: record.product_code.clone(),
            base: GroupBaseInfo::from_record(record),
            variants: Vec::new(),
            total_stock: 0,
            price_range: PriceRange::default(),
            available_colors: Vec::new(),
            available_sizes: Vec::new(),
            has_discount: false,
            primary_idx: 0,
        }
    }

    fn push_variant(&mut self, variant: Variant) {
        self.total_stock += variant.stock;
        if !self.available_colors.contains(&variant.color) {
            self.available_colors.push(variant.color.clone());
        }
        self.price_range.expand(variant.unit_price);
        self.has_discount = self.has_discount || variant.is_on_sale();

        self.variants.push(variant);
        // Strict comparison keeps the earlier variant on ties.
        let idx = self.variants.len() - 1;
        if self.variants[idx].stock > self.variants[self.primary_idx].stock {
            self.primary_idx = idx;
        }
    }

    fn finalize_sizes(&mut self) {
        let mut sizes: Vec<String> = Vec::new();
        for variant in &self.variants {
            for (size, &count) in &variant.sizes {
                if count > 0 && !sizes.contains(size) {
                    sizes.push(size.clone());
                }
            }
        }
        sizes.sort_by(|a, b| match (a.parse::<i64>(), b.parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });
        self.available_sizes = sizes;
    }

    /// The variant shown on the catalog card: highest stock, earlier wins
    /// on ties.
    pub fn primary_variant(&self) -> &Variant {
        &self.variants[self.primary_idx]
    }

    /// Look up a variant by color.
    pub fn variant(&self, color: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.color == color)
    }

    /// Check if any variant has boxes in stock.
    pub fn is_in_stock(&self) -> bool {
        self.total_stock > 0
    }
}

/// The grouped catalog: product groups in feed order plus a code index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    groups: Vec<ProductGroup>,
    index: HashMap<ProductCode, usize>,
}

impl Catalog {
    /// Build the catalog from parsed records in a single pass.
    ///
    /// Groups are created on first sight of a product code; base info is
    /// taken from that first record and treated as ground truth for the
    /// whole group.
    pub fn from_records(records: &[VariantRecord]) -> Self {
        let mut catalog = Self::default();
        for record in records {
            let idx = match catalog.index.get(&record.product_code).copied() {
                Some(idx) => idx,
                None => {
                    catalog.groups.push(ProductGroup::new(record));
                    let idx = catalog.groups.len() - 1;
                    catalog.index.insert(record.product_code.clone(), idx);
                    idx
                }
            };
            catalog.groups[idx].push_variant(Variant::from_record(record));
        }

        // Every group holds at least one variant; prune any that do not.
        catalog.groups.retain(|g| !g.variants.is_empty());
        catalog.index = catalog
            .groups
            .iter()
            .enumerate()
            .map(|(idx, g)| (g.product_code.clone(), idx))
            .collect();

        for group in &mut catalog.groups {
            group.finalize_sizes();
        }
        catalog
    }

    /// Look up a group by product code.
    pub fn get(&self, code: &ProductCode) -> Option<&ProductGroup> {
        self.index.get(code).map(|&idx| &self.groups[idx])
    }

    /// Iterate groups in feed order.
    pub fn iter(&self) -> impl Iterator<Item = &ProductGroup> {
        self.groups.iter()
    }

    /// Number of product groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if the catalog holds no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record::parse_records;
    use crate::money::Currency;
    use serde_json::json;

    fn sample_records() -> Vec<VariantRecord> {
        let values = vec![
            json!({
                "productCode": "3000-1",
                "color": "BLACK",
                "actualStock": 15,
                "isAssorted": true,
                "totalPieces": 8,
                "finalPrice": 5,
                "outerMaterial": "LEATHER",
                "gender": "WOMEN",
                "productGroup": "SANDALS",
                "sizes": {"40": 2, "41": 3, "42": 3},
            }),
            json!({
                "productCode": "3000-1",
                "color": "BROWN",
                "actualStock": 8,
                "isAssorted": true,
                "totalPieces": 8,
                "price": 40,
                "campaignPrice": 35,
                "sizes": {"41": 4, "43": 4},
            }),
            json!({
                "productCode": "4100-2",
                "color": "WHITE",
                "actualStock": 0,
                "price": 60,
                "outerMaterial": "TEXTILE",
                "gender": "MEN",
                "productGroup": "SNEAKERS",
                "sizes": {"42": 1},
            }),
        ];
        parse_records(&values, Currency::TRY)
    }

    #[test]
    fn test_grouping_scenario() {
        let catalog = Catalog::from_records(&sample_records());
        assert_eq!(catalog.len(), 2);

        let group = catalog.get(&ProductCode::new("3000-1")).unwrap();
        assert_eq!(group.total_stock, 23);
        assert!(group.has_discount);
        assert_eq!(group.available_colors, vec!["BLACK", "BROWN"]);
        // Effective prices: 5 (final) and 35 (campaign).
        assert_eq!(group.price_range.min.amount_cents, 500);
        assert_eq!(group.price_range.max.amount_cents, 3500);
    }

    #[test]
    fn test_base_info_from_first_variant() {
        let catalog = Catalog::from_records(&sample_records());
        let group = catalog.get(&ProductCode::new("3000-1")).unwrap();

        // The BROWN record carries no materials; the BLACK record's facts
        // stand for the whole group.
        assert_eq!(group.base.outer_material, "LEATHER");
        assert_eq!(group.base.gender, "WOMEN");
        assert!(group.base.is_assorted);
    }

    #[test]
    fn test_primary_variant_highest_stock() {
        let catalog = Catalog::from_records(&sample_records());
        let group = catalog.get(&ProductCode::new("3000-1")).unwrap();
        assert_eq!(group.primary_variant().color, "BLACK");
    }

    #[test]
    fn test_primary_variant_tie_keeps_earlier() {
        let values = vec![
            json!({"productCode": "P1", "color": "RED", "actualStock": 5}),
            json!({"productCode": "P1", "color": "BLUE", "actualStock": 5}),
        ];
        let catalog = Catalog::from_records(&parse_records(&values, Currency::TRY));
        let group = catalog.get(&ProductCode::new("P1")).unwrap();
        assert_eq!(group.primary_variant().color, "RED");
    }

    #[test]
    fn test_available_sizes_union_sorted_positive_only() {
        let catalog = Catalog::from_records(&sample_records());
        let group = catalog.get(&ProductCode::new("3000-1")).unwrap();
        assert_eq!(group.available_sizes, vec!["40", "41", "42", "43"]);
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let records = sample_records();
        let first = Catalog::from_records(&records);
        let second = Catalog::from_records(&records);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_price_range_defaults_to_zero_without_positive_prices() {
        let values = vec![json!({"productCode": "P1", "color": "RED"})];
        let catalog = Catalog::from_records(&parse_records(&values, Currency::TRY));
        let group = catalog.get(&ProductCode::new("P1")).unwrap();
        assert!(group.price_range.min.is_zero());
        assert!(group.price_range.max.is_zero());
    }

    #[test]
    fn test_price_range_overlap() {
        let mut range = PriceRange::default();
        range.expand(Money::from_decimal(30.0, Currency::TRY));
        range.expand(Money::from_decimal(50.0, Currency::TRY));

        let lira = |v: f64| Some(Money::from_decimal(v, Currency::TRY));
        assert!(range.overlaps(lira(40.0), lira(60.0)));
        assert!(!range.overlaps(lira(60.0), lira(80.0)));
        assert!(range.overlaps(None, None));
    }
}
