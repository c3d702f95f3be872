//! Catalog filtering and sorting.

mod filter;
mod sort;

pub use filter::CatalogFilter;
pub use sort::{sort_groups, SortOption};
