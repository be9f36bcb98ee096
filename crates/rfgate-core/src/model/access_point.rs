// ── Access point (gateway) configuration ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::cc_card::CcMode;
use super::device::HardwareStatus;

/// Fixed id of the singleton access point record.
pub const AP_ID: &str = "AP";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorCodeMode {
    #[default]
    Auto,
    Manual,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApInfo {
    pub hostname: String,
    pub ip_addr: String,
    pub netmask: String,
    pub gateway: String,
    pub ntp_host: String,
    pub time_zone: String,
    pub color_code_mode: ColorCodeMode,
    /// Hex text, e.g. `"0x1A"`; only meaningful in manual mode.
    pub manual_color_code: String,
    pub cc_mode: CcMode,
    pub units: Units,
    pub map_image_index: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessPoint {
    pub id: String,
    pub info: ApInfo,
    #[serde(flatten)]
    pub hw: HardwareStatus,
}
