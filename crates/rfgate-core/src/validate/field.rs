// ── Per-object field validation ──
//
// Each validator first clears every error keyed to its object, then
// re-checks the user-editable fields. The result is a list of
// `ValidationAction`s for `Store::apply_validation`.

use crate::action::ValidationAction;
use crate::model::{
    AccessPoint, CcCard, ColorCodeMode, ObjectType, Sensor, SensorZone, Units, ZoneType,
};
use crate::store::{TopState, field_key};

use super::patterns::{FieldClass, parse_hex};

pub const CC_TIMING_MAX_MS: i64 = 15_000;
pub const SPACING_MIN_MM: f64 = 100.0;
pub const SPACING_MAX_MM: f64 = 10_000.0;
pub const LENGTH_CORRECTION_LIMIT_MM: f64 = 3_000.0;
pub const COLOR_CODE_MIN: u32 = 0x01;
pub const COLOR_CODE_MAX: u32 = 0x7C;
pub const STS_PORT_MAX: i64 = 65_535;

const MM_PER_INCH: f64 = 25.4;

/// Where a failure is reported, and how the field is named to the user.
#[derive(Debug, Clone, Copy)]
struct Field<'a> {
    name: &'a str,
    index: Option<usize>,
    label: &'a str,
}

impl<'a> Field<'a> {
    fn new(name: &'a str, label: &'a str) -> Self {
        Self {
            name,
            index: None,
            label,
        }
    }

    fn at(self, index: usize) -> Self {
        Self {
            index: Some(index),
            ..self
        }
    }
}

/// Collects failures for one object.
struct Report {
    object_type: ObjectType,
    object_id: String,
    actions: Vec<ValidationAction>,
}

impl Report {
    fn new(object_type: ObjectType, object_id: &str) -> Self {
        Self {
            object_type,
            object_id: object_id.to_owned(),
            actions: vec![ValidationAction::clear_object(object_type, object_id)],
        }
    }

    fn fail(&mut self, field: Field<'_>, message: impl Into<String>) {
        let key = field_key(self.object_type, &self.object_id, field.name, field.index);
        self.actions
            .push(ValidationAction::add(self.object_type, key, message));
    }

    /// Check `value` against `class`. Empty text passes unless `required`.
    fn class(&mut self, field: Field<'_>, value: &str, class: FieldClass, required: bool) -> bool {
        let value = value.trim();
        if value.is_empty() {
            if required {
                self.fail(field, format!("{} is required", field.label));
            }
            return false;
        }
        if !class.matches(value) {
            self.fail(field, format!("{} must be {}", field.label, class.describe()));
            return false;
        }
        true
    }

    /// Integer text within `[lo, hi]`.
    fn int_range(&mut self, field: Field<'_>, value: &str, (lo, hi): (i64, i64), required: bool) {
        let class = if lo >= 0 {
            FieldClass::NonNegInteger
        } else {
            FieldClass::Integer
        };
        if !self.class(field, value, class, required) {
            return;
        }
        let in_range = value.trim().parse::<i64>().is_ok_and(|n| (lo..=hi).contains(&n));
        if !in_range {
            self.fail(field, format!("{} must be between {lo} and {hi}", field.label));
        }
    }

    /// Length text in display units, checked in millimetres.
    fn length_range(
        &mut self,
        field: Field<'_>,
        value: &str,
        (lo_mm, hi_mm): (f64, f64),
        units: Units,
        required: bool,
    ) {
        if !self.class(field, value, FieldClass::Float, required) {
            return;
        }
        let Ok(shown) = value.trim().parse::<f64>() else {
            self.fail(field, format!("{} must be a number", field.label));
            return;
        };
        let mm = match units {
            Units::Metric => shown,
            Units::Imperial => shown * MM_PER_INCH,
        };
        if !(lo_mm..=hi_mm).contains(&mm) {
            let bounds = match units {
                Units::Metric => format!("{lo_mm:.0} and {hi_mm:.0} mm"),
                Units::Imperial => {
                    format!("{:.2} and {:.2} in", lo_mm / MM_PER_INCH, hi_mm / MM_PER_INCH)
                }
            };
            self.fail(field, format!("{} must be between {bounds}", field.label));
        }
    }

    fn finish(self) -> Vec<ValidationAction> {
        self.actions
    }
}

// ── Validators ──────────────────────────────────────────────────────

pub fn validate_ap(ap: &AccessPoint) -> Vec<ValidationAction> {
    let mut r = Report::new(ObjectType::Ap, &ap.id);
    let info = &ap.info;
    let host = FieldClass::HostnameOrDottedQuad;
    r.class(Field::new("hostname", "Hostname"), &info.hostname, host, true);
    r.class(Field::new("ipAddr", "IP address"), &info.ip_addr, FieldClass::DottedQuad, true);
    r.class(Field::new("netmask", "Netmask"), &info.netmask, FieldClass::DottedQuad, true);
    r.class(Field::new("gateway", "Gateway"), &info.gateway, FieldClass::DottedQuad, true);
    r.class(Field::new("ntpHost", "NTP server"), &info.ntp_host, host, false);
    r.class(Field::new("timeZone", "Time zone"), &info.time_zone, FieldClass::FreeText, false);

    let color = Field::new("manualColorCode", "Color code");
    if info.color_code_mode == ColorCodeMode::Manual
        && r.class(color, &info.manual_color_code, FieldClass::Hex, true)
    {
        let ok = parse_hex(info.manual_color_code.trim())
            .is_some_and(|n| (COLOR_CODE_MIN..=COLOR_CODE_MAX).contains(&n));
        if !ok {
            r.fail(
                color,
                format!("Color code must be between 0x{COLOR_CODE_MIN:02X} and 0x{COLOR_CODE_MAX:02X}"),
            );
        }
    }
    r.finish()
}

pub fn validate_map_sensor(sensor: &Sensor) -> Vec<ValidationAction> {
    let mut r = Report::new(ObjectType::MapSensor, &sensor.id);
    let info = &sensor.info;
    let location = Field::new("location", "Location");
    r.class(location, &info.location, FieldClass::NameWithBlanks, false);
    let range = (0, CC_TIMING_MAX_MS);
    r.int_range(Field::new("ccExtensionMs", "Extension time"), &info.cc_extension_ms, range, false);
    r.int_range(Field::new("ccDelayMs", "Delay time"), &info.cc_delay_ms, range, false);
    r.finish()
}

pub fn validate_sensor_zone(zone: &SensorZone, units: Units) -> Vec<ValidationAction> {
    let mut r = Report::new(ObjectType::SensorZone, &zone.id);
    r.class(Field::new("name", "Name"), &zone.name, FieldClass::NameWithBlanks, true);

    let n = zone.sensor_ids.len();
    if !zone.zone_type.allows(n) {
        let message = match zone.zone_type {
            ZoneType::Speed => "A speed zone needs 2 or 3 sensors".to_owned(),
            other => format!("A {} zone needs exactly 1 sensor", other.to_string().to_lowercase()),
        };
        r.fail(Field::new("zoneType", "Zone type"), message);
    }

    // One spacing and one optional correction per adjacent sensor pair.
    let spacing = Field::new("spacingsMm", "Spacing");
    let correction = Field::new("lengthCorrectionsMm", "Length correction");
    for i in 0..n.saturating_sub(1) {
        let value = zone.spacings_mm.get(i).map_or("", String::as_str);
        r.length_range(spacing.at(i), value, (SPACING_MIN_MM, SPACING_MAX_MM), units, true);

        let value = zone.length_corrections_mm.get(i).map_or("", String::as_str);
        let limit = (-LENGTH_CORRECTION_LIMIT_MM, LENGTH_CORRECTION_LIMIT_MM);
        r.length_range(correction.at(i), value, limit, units, false);
    }
    r.finish()
}

/// Rows of an STS card's address map. Keys are
/// `STS_ADDR_MAP-<cardId>-<ip|port>-<row>`.
pub fn validate_sts_addr_map(card: &CcCard) -> Vec<ValidationAction> {
    let mut r = Report::new(ObjectType::StsAddrMap, &card.id);
    for (pos, (key, row)) in card.addr_map.iter().enumerate() {
        if row.ip.trim().is_empty() && row.port.trim().is_empty() {
            continue;
        }
        let index = key.parse::<usize>().unwrap_or(pos);
        r.class(Field::new("ip", "IP address").at(index), &row.ip, FieldClass::DottedQuad, true);
        r.int_range(Field::new("port", "Port").at(index), &row.port, (1, STS_PORT_MAX), true);
    }
    r.finish()
}

/// Re-run the validator that owns `(object_type, id)`.
///
/// A missing object only has its stale errors cleared. Kinds without
/// editable fields yield nothing.
pub fn validate_object(state: &TopState, object_type: ObjectType, id: &str) -> Vec<ValidationAction> {
    let units = state.ap.as_ref().map(|ap| ap.info.units).unwrap_or_default();
    let found = match object_type {
        ObjectType::Ap => state.ap.as_deref().filter(|ap| ap.id == id).map(validate_ap),
        ObjectType::MapSensor => state.map_sensors.get(id).map(validate_map_sensor),
        ObjectType::SensorZone => state
            .sensor_zones
            .get(id)
            .map(|zone| validate_sensor_zone(zone, units)),
        ObjectType::StsCard | ObjectType::StsAddrMap => {
            state.sts_cards.get(id).map(validate_sts_addr_map)
        }
        _ => return Vec::new(),
    };
    found.unwrap_or_else(|| {
        let owner = match object_type {
            ObjectType::StsCard => ObjectType::StsAddrMap,
            other => other,
        };
        vec![ValidationAction::clear_object(owner, id)]
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::action::UpdateType;
    use crate::model::StsAddr;

    fn keys(actions: &[ValidationAction]) -> Vec<&str> {
        actions
            .iter()
            .filter(|a| a.update_type == UpdateType::Add)
            .map(|a| a.field_id.as_str())
            .collect()
    }

    fn good_ap() -> AccessPoint {
        let mut ap = AccessPoint {
            id: "AP".into(),
            ..AccessPoint::default()
        };
        ap.info.hostname = "gateway".into();
        ap.info.ip_addr = "10.0.0.2".into();
        ap.info.netmask = "255.255.255.0".into();
        ap.info.gateway = "10.0.0.1".into();
        ap
    }

    #[test]
    fn clear_comes_first() {
        let actions = validate_ap(&good_ap());
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].update_type, UpdateType::Delete);
        assert_eq!(actions[0].error_on_id.as_deref(), Some("AP"));
    }

    #[test]
    fn ap_network_fields() {
        let mut ap = good_ap();
        ap.info.ip_addr = "10.0.0.300".into();
        ap.info.hostname = String::new();
        let actions = validate_ap(&ap);
        assert_eq!(keys(&actions), vec!["AP-AP-hostname", "AP-AP-ipAddr"]);
    }

    #[test]
    fn manual_color_code_range() {
        let mut ap = good_ap();
        ap.info.color_code_mode = ColorCodeMode::Manual;
        for (code, ok) in [("0x01", true), ("0x7C", true), ("0x00", false), ("0x7D", false), ("zz", false)] {
            ap.info.manual_color_code = code.into();
            assert_eq!(keys(&validate_ap(&ap)).is_empty(), ok, "code {code}");
        }

        ap.info.color_code_mode = ColorCodeMode::Auto;
        ap.info.manual_color_code = "garbage".into();
        assert!(keys(&validate_ap(&ap)).is_empty());
    }

    #[test]
    fn sensor_cc_timing_bounds() {
        let mut s = Sensor {
            id: "0001".into(),
            ..Sensor::default()
        };
        s.info.cc_extension_ms = "15000".into();
        s.info.cc_delay_ms = "15001".into();
        let actions = validate_map_sensor(&s);
        assert_eq!(keys(&actions), vec!["MAP_SENSOR-0001-ccDelayMs"]);

        s.info.cc_delay_ms = "-1".into();
        let actions = validate_map_sensor(&s);
        assert_eq!(keys(&actions), vec!["MAP_SENSOR-0001-ccDelayMs"]);
    }

    fn speed_zone(spacings: &[&str]) -> SensorZone {
        SensorZone {
            id: "sz1".into(),
            name: "Zone A".into(),
            zone_type: ZoneType::Speed,
            sensor_ids: vec!["0001".into(), "0002".into(), "0003".into()],
            spacings_mm: spacings.iter().map(|s| (*s).to_owned()).collect(),
            ..SensorZone::default()
        }
    }

    #[test]
    fn zone_spacing_metric() {
        let actions = validate_sensor_zone(&speed_zone(&["100", "99.9"]), Units::Metric);
        assert_eq!(keys(&actions), vec!["SENSOR_ZONE-sz1-spacingsMm-1"]);

        let actions = validate_sensor_zone(&speed_zone(&["10000"]), Units::Metric);
        assert_eq!(keys(&actions), vec!["SENSOR_ZONE-sz1-spacingsMm-1"]);
    }

    #[test]
    fn zone_spacing_imperial_converts() {
        // 4 in = 101.6 mm passes; 3.9 in = 99.06 mm does not.
        let actions = validate_sensor_zone(&speed_zone(&["4", "3.9"]), Units::Imperial);
        assert_eq!(keys(&actions), vec!["SENSOR_ZONE-sz1-spacingsMm-1"]);
        let msg = &actions.last().unwrap().err_msg;
        assert!(msg.ends_with(" in"), "{msg}");
    }

    #[test]
    fn zone_type_vs_sensor_count() {
        let mut zone = speed_zone(&[]);
        zone.zone_type = ZoneType::Stopbar;
        zone.sensor_ids.truncate(1);
        assert!(keys(&validate_sensor_zone(&zone, Units::Metric)).is_empty());

        zone.zone_type = ZoneType::Speed;
        assert_eq!(
            keys(&validate_sensor_zone(&zone, Units::Metric)),
            vec!["SENSOR_ZONE-sz1-zoneType"]
        );
    }

    #[test]
    fn sts_rows_indexed() {
        let mut card = CcCard {
            id: "STS".into(),
            ..CcCard::default()
        };
        card.addr_map.insert(
            "0".into(),
            StsAddr {
                ip: "10.0.0.9".into(),
                port: "502".into(),
            },
        );
        card.addr_map.insert(
            "1".into(),
            StsAddr {
                ip: "10.0.0".into(),
                port: "70000".into(),
            },
        );
        card.addr_map.insert("2".into(), StsAddr::default());

        let actions = validate_sts_addr_map(&card);
        assert_eq!(
            keys(&actions),
            vec!["STS_ADDR_MAP-STS-ip-1", "STS_ADDR_MAP-STS-port-1"]
        );
    }

    #[test]
    fn missing_object_only_clears() {
        let state = TopState::default();
        let actions = validate_object(&state, ObjectType::MapSensor, "0009");
        assert_eq!(actions, vec![ValidationAction::clear_object(ObjectType::MapSensor, "0009")]);
        assert!(validate_object(&state, ObjectType::Radio, "SPP0").is_empty());
    }
}
