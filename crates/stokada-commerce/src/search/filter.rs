//! Catalog facet filters.
//!
//! A filter is a set of independent facet constraints evaluated against
//! grouped catalog data: facets combine with AND, selections inside one
//! facet combine with OR, and an empty facet imposes no constraint.

use crate::catalog::{Catalog, ProductGroup};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Facet constraints over product groups.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogFilter {
    /// Free-text substring match over code, materials, gender, group and
    /// colors.
    pub text: Option<String>,
    /// Selected colors.
    pub colors: Vec<String>,
    /// Selected upper materials.
    pub outer_materials: Vec<String>,
    /// Selected merchandising groups.
    pub product_groups: Vec<String>,
    /// Selected genders.
    pub genders: Vec<String>,
    /// Selected sizes.
    pub sizes: Vec<String>,
    /// Lower bound of the price window.
    pub min_price: Option<Money>,
    /// Upper bound of the price window.
    pub max_price: Option<Money>,
    /// Only groups with stock.
    pub in_stock: bool,
    /// Only assorted-box products.
    pub assorted: bool,
    /// Only discounted groups.
    pub on_sale: bool,
}

impl CatalogFilter {
    /// Create an unconstrained filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text query.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.text = Some(text);
        }
        self
    }

    /// Add a color selection.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.colors.push(color.into());
        self
    }

    /// Add an upper-material selection.
    pub fn with_outer_material(mut self, material: impl Into<String>) -> Self {
        self.outer_materials.push(material.into());
        self
    }

    /// Add a merchandising-group selection.
    pub fn with_product_group(mut self, group: impl Into<String>) -> Self {
        self.product_groups.push(group.into());
        self
    }

    /// Add a gender selection.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.genders.push(gender.into());
        self
    }

    /// Add a size selection.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.sizes.push(size.into());
        self
    }

    /// Set the price window. Either bound may be open.
    pub fn with_price_range(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Require stock.
    pub fn in_stock_only(mut self) -> Self {
        self.in_stock = true;
        self
    }

    /// Require assorted boxes.
    pub fn assorted_only(mut self) -> Self {
        self.assorted = true;
        self
    }

    /// Require a discount.
    pub fn on_sale_only(mut self) -> Self {
        self.on_sale = true;
        self
    }

    /// Evaluate all facets against one group.
    pub fn matches(&self, group: &ProductGroup) -> bool {
        if let Some(text) = &self.text {
            if !text_matches(text, group) {
                return false;
            }
        }
        if !selection_matches(&self.colors, &group.available_colors) {
            return false;
        }
        if !self.outer_materials.is_empty()
            && !contains_ignore_case(&self.outer_materials, &group.base.outer_material)
        {
            return false;
        }
        if !self.product_groups.is_empty()
            && !contains_ignore_case(&self.product_groups, &group.base.product_group)
        {
            return false;
        }
        if !self.genders.is_empty() && !contains_ignore_case(&self.genders, &group.base.gender) {
            return false;
        }
        if !selection_matches(&self.sizes, &group.available_sizes) {
            return false;
        }
        if !group.price_range.overlaps(self.min_price, self.max_price) {
            return false;
        }
        if self.in_stock && !group.is_in_stock() {
            return false;
        }
        if self.assorted && !group.base.is_assorted {
            return false;
        }
        if self.on_sale && !group.has_discount {
            return false;
        }
        true
    }

    /// Filter a catalog, preserving feed order.
    pub fn apply<'a>(&self, catalog: &'a Catalog) -> Vec<&'a ProductGroup> {
        catalog.iter().filter(|g| self.matches(g)).collect()
    }
}

/// OR within a facet: any selected value present among the group's values.
fn selection_matches(selected: &[String], available: &[String]) -> bool {
    if selected.is_empty() {
        return true;
    }
    selected
        .iter()
        .any(|s| contains_ignore_case(available, s))
}

fn contains_ignore_case(haystack: &[String], needle: &str) -> bool {
    haystack.iter().any(|h| h.eq_ignore_ascii_case(needle))
}

fn text_matches(text: &str, group: &ProductGroup) -> bool {
    let needle = text.trim().to_lowercase();
    let mut haystack = format!(
        "{} {} {} {} {} {}",
        group.product_code.as_str(),
        group.base.outer_material,
        group.base.inner_material,
        group.base.sole,
        group.base.gender,
        group.base.product_group,
    );
    for color in &group.available_colors {
        haystack.push(' ');
        haystack.push_str(color);
    }
    haystack.to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{parse_records, Catalog};
    use crate::money::Currency;
    use serde_json::json;

    fn sample_catalog() -> Catalog {
        let values = vec![
            json!({
                "productCode": "3000-1",
                "color": "BLACK",
                "actualStock": 15,
                "isAssorted": true,
                "price": 40,
                "campaignPrice": 35,
                "outerMaterial": "LEATHER",
                "gender": "WOMEN",
                "productGroup": "SANDALS",
                "sizes": {"40": 2, "41": 2},
            }),
            json!({
                "productCode": "4100-2",
                "color": "WHITE",
                "actualStock": 0,
                "price": 60,
                "outerMaterial": "TEXTILE",
                "gender": "MEN",
                "productGroup": "SNEAKERS",
                "sizes": {"42": 1, "43": 1},
            }),
        ];
        Catalog::from_records(&parse_records(&values, Currency::TRY))
    }

    fn lira(v: f64) -> Option<Money> {
        Some(Money::from_decimal(v, Currency::TRY))
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        let catalog = sample_catalog();
        assert_eq!(CatalogFilter::new().apply(&catalog).len(), 2);
    }

    #[test]
    fn test_text_match_is_case_insensitive() {
        let catalog = sample_catalog();
        let hits = CatalogFilter::new().with_text("leather").apply(&catalog);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product_code.as_str(), "3000-1");

        let hits = CatalogFilter::new().with_text("white").apply(&catalog);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product_code.as_str(), "4100-2");
    }

    #[test]
    fn test_facets_and_together() {
        let catalog = sample_catalog();
        let hits = CatalogFilter::new()
            .with_gender("WOMEN")
            .with_product_group("SNEAKERS")
            .apply(&catalog);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_multi_select_facet_ors_within() {
        let catalog = sample_catalog();
        let hits = CatalogFilter::new()
            .with_color("BLACK")
            .with_color("WHITE")
            .apply(&catalog);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_price_window_overlap_not_containment() {
        let catalog = sample_catalog();

        // Group 3000-1 has range {35, 35}: the window [30, 60] overlaps.
        let hits = CatalogFilter::new()
            .with_price_range(lira(30.0), lira(60.0))
            .apply(&catalog);
        assert_eq!(hits.len(), 2);

        let hits = CatalogFilter::new()
            .with_price_range(lira(61.0), lira(80.0))
            .apply(&catalog);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_stock_sale_and_assorted_switches() {
        let catalog = sample_catalog();

        let hits = CatalogFilter::new().in_stock_only().apply(&catalog);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product_code.as_str(), "3000-1");

        let hits = CatalogFilter::new().on_sale_only().apply(&catalog);
        assert_eq!(hits.len(), 1);

        let hits = CatalogFilter::new().assorted_only().apply(&catalog);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_size_facet_uses_group_union() {
        let catalog = sample_catalog();
        let hits = CatalogFilter::new()
            .with_size("41")
            .with_size("43")
            .apply(&catalog);
        assert_eq!(hits.len(), 2);

        let hits = CatalogFilter::new().with_size("45").apply(&catalog);
        assert!(hits.is_empty());
    }
}
