//! Cart engine configuration.

use std::time::Duration;
use stokada_commerce::Currency;

/// Maximum quantity allowed per cart line, in boxes.
pub const MAX_QUANTITY_PER_LINE: i64 = 9999;

/// Configuration for the cart reconciliation engine.
#[derive(Debug, Clone)]
pub struct CartEngineConfig {
    /// Currency of all cart amounts.
    pub currency: Currency,
    /// Period of the background server resync.
    pub resync_interval: Duration,
    /// Per-line quantity cap.
    pub max_quantity_per_line: i64,
}

impl Default for CartEngineConfig {
    fn default() -> Self {
        Self {
            currency: Currency::TRY,
            resync_interval: Duration::from_secs(30),
            max_quantity_per_line: MAX_QUANTITY_PER_LINE,
        }
    }
}

impl CartEngineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cart currency.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Set the background resync period.
    pub fn with_resync_interval(mut self, interval: Duration) -> Self {
        self.resync_interval = interval;
        self
    }

    /// Set the per-line quantity cap.
    pub fn with_max_quantity(mut self, max: i64) -> Self {
        self.max_quantity_per_line = max;
        self
    }
}
