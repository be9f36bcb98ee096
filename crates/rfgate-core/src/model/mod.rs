// ── Topology domain model ──
//
// Canonical records for everything on the gateway map. Field names
// serialize in camelCase so Action payloads merge straight onto them.

pub mod access_point;
pub mod cc_card;
pub mod device;
pub mod ids;
pub mod link;
pub mod ui;
pub mod zone;

use serde::Serialize;
use serde::de::DeserializeOwned;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use rfgate_core::model::*` gives you everything.

pub use access_point::{AP_ID, AccessPoint, ApInfo, ColorCodeMode, Units};
pub use cc_card::{
    CcCard, CcCardInfo, CcMode, Channel, EX_CHANNEL_SUFFIX_LEN, SensorFailSafe, StsAddr,
    ex_card_id_of_channel, parse_shelf_slot,
};
pub use device::{
    HardwareStatus, Radio, RadioInfo, Repeater, RepeaterInfo, Sensor, SensorInfo, TrayDevice,
    TrayInfo, TrayKind,
};
pub use ids::{DotId, ObjectType};
pub use link::{CcLink, Line, Point, RfLink};
pub use ui::{Selected, UiState};
pub use zone::{CLIENT_ZONE_PREFIX, MAX_ZONE_SENSORS, SensorZone, ZoneType, is_client_zone_id};

/// A record stored in an id-keyed collection.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> &str;
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Entity for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_entity!(AccessPoint, Radio, Repeater, Sensor, TrayDevice, SensorZone, CcCard);
