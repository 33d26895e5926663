// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MACrossoverSettings {
    /// Window of the fast average (e.g., 50 days).
    pub short_period: u32,
    /// Window of the slow average (e.g., 200 days).
    pub long_period: u32,
}

impl Default for MACrossoverSettings {
    fn default() -> Self {
        Self {
            short_period: 50,
            long_period: 200,
        }
    }
}
