// ── Sensor zones ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::link::Point;

/// Prefix of ids assigned on the client before the server confirms a zone.
pub const CLIENT_ZONE_PREFIX: &str = "clientSz";

/// Most sensors a zone may group (lead, middle, trail).
pub const MAX_ZONE_SENSORS: usize = 3;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneType {
    #[default]
    Stopbar,
    Count,
    Speed,
}

impl ZoneType {
    /// Inclusive range of sensor counts this usage supports.
    pub fn sensor_count_range(self) -> (usize, usize) {
        match self {
            Self::Stopbar | Self::Count => (1, 1),
            Self::Speed => (2, MAX_ZONE_SENSORS),
        }
    }

    pub fn allows(self, n_sensors: usize) -> bool {
        let (lo, hi) = self.sensor_count_range();
        (lo..=hi).contains(&n_sensors)
    }
}

/// Logical detection zone of 1 to 3 sensors in lead/middle/trail order.
///
/// `spacings_mm` and `length_corrections_mm` hold one entry per adjacent
/// sensor pair, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensorZone {
    pub id: String,
    pub name: String,
    pub zone_type: ZoneType,
    pub sensor_ids: Vec<String>,
    pub spacings_mm: Vec<String>,
    pub length_corrections_mm: Vec<String>,
    pub position: Point,
    /// Temporary client id this zone was created under, when an ADD
    /// promotes it to a server-assigned id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl SensorZone {
    /// Fresh temporary id for a zone created on the client.
    pub fn new_client_id() -> String {
        let uuid = Uuid::new_v4().simple().to_string();
        format!("{CLIENT_ZONE_PREFIX}-{}", &uuid[..8])
    }
}

pub fn is_client_zone_id(id: &str) -> bool {
    id.starts_with(CLIENT_ZONE_PREFIX)
}
