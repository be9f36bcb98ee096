// ── Field device domain types ──
//
// Every device splits into two halves: `info`, which the user edits and
// Actions own, and hardware status, which only the live feed writes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::link::{CcLink, Point, RfLink};

/// Hardware-reported status shared by all field devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HardwareStatus {
    pub firmware: Option<String>,
    pub hw_version: Option<String>,
    pub voltage: Option<f64>,
    pub rssi: Option<i32>,
}

// ── Radio ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadioInfo {
    pub location: String,
    pub position: Point,
    pub channel: u8,
    pub desired_channel: Option<u8>,
}

/// RF root node (fixed ids such as `SPP0`/`SPP1`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Radio {
    pub id: String,
    pub info: RadioInfo,
    #[serde(flatten)]
    pub hw: HardwareStatus,
    /// Hardware stopped reporting but links still reference it.
    pub unheard: bool,
}

// ── Repeater ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepeaterInfo {
    pub location: String,
    pub position: Point,
    pub rf_link: Option<RfLink>,
    pub downstream_channel: Option<u8>,
}

/// RF relay placed on the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Repeater {
    pub id: String,
    pub info: RepeaterInfo,
    #[serde(flatten)]
    pub hw: HardwareStatus,
    pub unheard: bool,
}

// ── Sensor ──────────────────────────────────────────────────────────

/// User-editable sensor settings. Numeric fields hold the text the user
/// typed so the field validator can report malformed input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensorInfo {
    pub location: String,
    pub position: Point,
    pub rf_link: Option<RfLink>,
    pub cc_links: Vec<CcLink>,
    pub cc_extension_ms: String,
    pub cc_delay_ms: String,
}

/// Leaf detection device placed on the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sensor {
    pub id: String,
    pub info: SensorInfo,
    #[serde(flatten)]
    pub hw: HardwareStatus,
    pub unheard: bool,
}

// ── Tray ────────────────────────────────────────────────────────────

/// Kind of an unplaced device waiting in the tray.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TrayKind {
    Repeater,
    #[default]
    Sensor,
}

impl TrayKind {
    /// Display rank inside the tray: Repeaters come first.
    pub fn rank(self) -> u8 {
        match self {
            Self::Repeater => 0,
            Self::Sensor => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrayInfo {
    pub position: Point,
}

/// Device discovered by the gateway but not yet placed on the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrayDevice {
    pub id: String,
    pub kind: TrayKind,
    pub info: TrayInfo,
    #[serde(flatten)]
    pub hw: HardwareStatus,
    pub unheard: bool,
}
