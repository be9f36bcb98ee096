// ── Validators ──
//
// Pure functions of committed state. The store never calls them; the
// undo manager (or any other orchestrator) runs one pass per Action group
// via `run_validators`.

mod field;
mod patterns;
mod topology;

pub use field::{
    CC_TIMING_MAX_MS, COLOR_CODE_MAX, COLOR_CODE_MIN, LENGTH_CORRECTION_LIMIT_MM,
    SPACING_MAX_MM, SPACING_MIN_MM, STS_PORT_MAX, validate_ap, validate_map_sensor,
    validate_object, validate_sensor_zone, validate_sts_addr_map,
};
pub use patterns::{FieldClass, parse_hex};
pub use topology::{
    MAX_CC_LINKS, MAX_REPEATER_HOPS, RfTreeReport, SENSOR_CAPACITY_BY_LEVEL, analyze_radio,
    validate_topology,
};

use tracing::debug;

use crate::model::ObjectType;
use crate::store::Store;

/// Validate every target in the given order, then the whole topology, and
/// publish both error maps.
///
/// An AP change re-validates every zone, since zone lengths are checked
/// in the AP's display units.
pub fn run_validators<'a>(store: &mut Store, targets: impl IntoIterator<Item = &'a (ObjectType, String)>) {
    let state = store.state();
    let mut actions = Vec::new();
    let mut units_may_have_changed = false;

    for (object_type, id) in targets {
        units_may_have_changed |= *object_type == ObjectType::Ap;
        actions.extend(validate_object(state, *object_type, id));
    }
    if units_may_have_changed {
        for zone_id in state.sensor_zones.keys() {
            actions.extend(validate_object(state, ObjectType::SensorZone, zone_id));
        }
    }

    let global = validate_topology(state);
    debug!(
        field_actions = actions.len(),
        global_errors = global.message_count(),
        "validation pass"
    );
    store.publish_validation(&actions, global);
}
