//! Planner configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::Projection;

/// Fallback order used when index selection cannot tell candidates apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOrder {
    /// Schema declaration order.
    #[default]
    Declared,
    /// Lexicographic by index name.
    Lexicographic,
}

/// Policy knobs for the access planner.
///
/// Scans are refused by default: a condition set no key or index serves fails
/// with `UnsupportedAccessPattern` until the caller enables scanning for that
/// terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub scan_enabled: bool,
    pub scan_count_enabled: bool,
    pub index_order: IndexOrder,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            scan_enabled: false,
            scan_count_enabled: false,
            index_order: IndexOrder::Declared,
        }
    }
}

impl PlannerConfig {
    /// Default configuration with scans enabled for both terminals.
    pub fn with_scans() -> Self {
        Self {
            scan_enabled: true,
            scan_count_enabled: true,
            ..Self::default()
        }
    }

    /// Whether a Scan plan may be returned for the given terminal.
    pub fn allows_scan(&self, projection: Projection) -> bool {
        match projection {
            Projection::Items => self.scan_enabled,
            Projection::Count => self.scan_count_enabled,
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(std::io::Error::other)
    }
}
