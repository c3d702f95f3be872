//! Wholesale catalog module.
//!
//! Contains the feed record parser and the product grouping pass.

mod group;
mod record;

pub use group::{Catalog, GroupBaseInfo, PriceRange, ProductGroup, Variant};
pub use record::{parse_records, VariantRecord};
