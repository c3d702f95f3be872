//! Sort options for filtered catalog views.

use crate::catalog::ProductGroup;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort keys for a filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOption {
    /// Catalog order by product code.
    #[default]
    ProductCode,
    /// Price, low to high.
    PriceAsc,
    /// Price, high to low.
    PriceDesc,
    /// First available color, A-Z.
    Color,
    /// Total stock, high to low.
    StockDesc,
}

impl SortOption {
    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::ProductCode => "Product Code",
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::Color => "Color",
            SortOption::StockDesc => "Stock",
        }
    }

    /// Compare two groups under this sort key.
    ///
    /// Ties fall back to product code so the ordering is deterministic.
    pub fn compare(&self, a: &ProductGroup, b: &ProductGroup) -> Ordering {
        let primary = match self {
            SortOption::ProductCode => Ordering::Equal,
            SortOption::PriceAsc => a
                .price_range
                .min
                .amount_cents
                .cmp(&b.price_range.min.amount_cents),
            SortOption::PriceDesc => b
                .price_range
                .max
                .amount_cents
                .cmp(&a.price_range.max.amount_cents),
            SortOption::Color => first_color(a).cmp(first_color(b)),
            SortOption::StockDesc => b.total_stock.cmp(&a.total_stock),
        };
        primary.then_with(|| a.product_code.cmp(&b.product_code))
    }
}

fn first_color(group: &ProductGroup) -> &str {
    group
        .available_colors
        .first()
        .map(String::as_str)
        .unwrap_or("")
}

/// Sort a filtered view in place.
pub fn sort_groups(groups: &mut [&ProductGroup], sort: SortOption) {
    groups.sort_by(|a, b| sort.compare(a, b));
}
