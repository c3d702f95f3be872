//! Wholesale footwear catalog domain for Stokada.
//!
//! This crate turns a flat per-color stock feed into the grouped, priced
//! catalog the storefront displays:
//!
//! - **Catalog**: boundary parsing with explicit defaulting, product
//!   grouping with derived stock/price/facet facts
//! - **Pricing**: effective-price precedence and box-vs-piece quoting for
//!   assorted products
//! - **Search**: facet filters and sort options over the grouped view
//!
//! # Example
//!
//! ```rust,ignore
//! use stokada_commerce::prelude::*;
//!
//! let records = parse_records(&feed, Currency::TRY);
//! let catalog = Catalog::from_records(&records);
//!
//! let view = CatalogFilter::new()
//!     .with_gender("WOMEN")
//!     .in_stock_only()
//!     .apply(&catalog);
//!
//! for group in view {
//!     let quote = pricing::quote(group.primary_variant(), group.base.is_assorted)?;
//!     println!("{}: {}", group.product_code, quote.price_per_box);
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod ids;
pub mod money;
pub mod pricing;
pub mod search;

pub use error::CommerceError;
pub use ids::{CartLineId, ProductCode};
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::{CartLineId, ProductCode};
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        parse_records, Catalog, GroupBaseInfo, PriceRange, ProductGroup, Variant, VariantRecord,
    };

    // Pricing
    pub use crate::pricing::{self, PriceQuote};

    // Search
    pub use crate::search::{sort_groups, CatalogFilter, SortOption};
}
