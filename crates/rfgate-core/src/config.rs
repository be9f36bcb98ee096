// ── Runtime store configuration ──
//
// Layout constants for the canonical tray and cabinet orderings. Core
// never reads config files; the CLI (via rfgate-config) builds a
// `StoreConfig` and hands it in.

use serde::{Deserialize, Serialize};

/// Canvas geometry used when re-laying out ordered collections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// x of the first tray slot.
    pub tray_x0: f64,
    /// Horizontal distance between tray slots.
    pub tray_step: f64,
    /// y of the first cabinet row.
    pub cabinet_y0: f64,
    pub cabinet_row_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tray_x0: 20.0,
            tray_step: 60.0,
            cabinet_y0: 40.0,
            cabinet_row_height: 30.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreConfig {
    pub layout: LayoutConfig,
}
