//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a ProductCode where a server cart line id is expected.
//! Both identities originate outside this workspace (the catalog feed and
//! the remote cart service), so there is no generation here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Check if the ID is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// The product code groups variants in the catalog (e.g., "3000-1").
define_id!(ProductCode);
// Server-assigned id of a remote cart line.
define_id!(CartLineId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let code = ProductCode::new("3000-1");
        assert_eq!(code.as_str(), "3000-1");
        assert!(!code.is_empty());
    }

    #[test]
    fn test_id_from_string() {
        let code: ProductCode = "4100-2".into();
        assert_eq!(code.as_str(), "4100-2");
    }

    #[test]
    fn test_id_display() {
        let id = CartLineId::new("srv-42");
        assert_eq!(format!("{}", id), "srv-42");
    }

    #[test]
    fn test_id_equality() {
        assert_eq!(ProductCode::new("same"), ProductCode::new("same"));
        assert_ne!(ProductCode::new("a"), ProductCode::new("b"));
    }
}
