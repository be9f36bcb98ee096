// ── Selection and transient UI state ──

use serde::{Deserialize, Serialize};

use super::ids::ObjectType;
use super::link::Point;

/// The device the user currently has selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selected {
    pub selected_device_type: ObjectType,
    pub selected_dotid: String,
}

impl Selected {
    pub fn new(device_type: ObjectType, dotid: impl Into<String>) -> Self {
        Self {
            selected_device_type: device_type,
            selected_dotid: dotid.into(),
        }
    }
}

/// View flags that never go through undo history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiState {
    pub show_rf_links: bool,
    pub show_cc_links: bool,
    pub zoom: f64,
    pub pan: Point,
    /// Waiting for the first full sync from the gateway.
    pub awaiting_sync: bool,
    pub config_changed_since_save: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_rf_links: true,
            show_cc_links: true,
            zoom: 1.0,
            pan: Point::default(),
            awaiting_sync: true,
            config_changed_since_save: false,
        }
    }
}
