// ── Global topology checks ──
//
// Pure function of the committed state, re-run in full after every
// Action group. Produces the info-panel error map keyed
// `"<objectType>-<objectId>"`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::model::{ObjectType, RfLink};
use crate::store::{TopState, ValidationErrors, object_key};

/// Repeaters allowed between a device and its Radio.
pub const MAX_REPEATER_HOPS: usize = 3;

/// Sensors allowed behind all devices at each level of an RF tree.
/// Level 0 is the Radio itself.
pub const SENSOR_CAPACITY_BY_LEVEL: [usize; 4] = [54, 20, 12, 4];

pub const MAX_CC_LINKS: usize = 4;

/// Sensor and repeater children of every RF target.
struct RfGraph<'a> {
    sensors_by_dst: HashMap<&'a str, usize>,
    repeaters_by_dst: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> RfGraph<'a> {
    fn of(state: &'a TopState) -> Self {
        let dst = |link: Option<&'a RfLink>| link.map(|l| l.dst_id.as_str()).filter(|d| !d.is_empty());

        let mut sensors_by_dst = HashMap::new();
        for sensor in state.map_sensors.values() {
            if let Some(d) = dst(sensor.info.rf_link.as_ref()) {
                *sensors_by_dst.entry(d).or_insert(0) += 1;
            }
        }

        let mut repeaters_by_dst: HashMap<&str, Vec<&str>> = HashMap::new();
        for repeater in state.map_repeaters.values() {
            if let Some(d) = dst(repeater.info.rf_link.as_ref()) {
                repeaters_by_dst.entry(d).or_default().push(repeater.id.as_str());
            }
        }

        Self {
            sensors_by_dst,
            repeaters_by_dst,
        }
    }
}

/// Shape of one Radio's RF tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RfTreeReport {
    pub radio_id: String,
    /// Node ids per hop level; level 0 holds only the Radio.
    pub devices_by_level: Vec<Vec<String>>,
    /// Sensors behind all nodes of each level.
    pub sum_by_level: Vec<usize>,
    pub n_sensors_behind: BTreeMap<String, usize>,
    pub repeaters_reachable: BTreeSet<String>,
    /// First repeater beyond the hop limit on each path.
    pub too_deep: Vec<String>,
}

impl RfTreeReport {
    fn enter(&mut self, node: &str, level: usize) {
        while self.devices_by_level.len() <= level {
            self.devices_by_level.push(Vec::new());
            self.sum_by_level.push(0);
        }
        if let Some(nodes) = self.devices_by_level.get_mut(level) {
            nodes.push(node.to_owned());
        }
    }

    fn leave(&mut self, node: &str, level: usize, behind: usize) {
        if let Some(sum) = self.sum_by_level.get_mut(level) {
            *sum += behind;
        }
        self.n_sensors_behind.insert(node.to_owned(), behind);
    }
}

/// Walk the RF tree rooted at `radio_id`.
pub fn analyze_radio(state: &TopState, radio_id: &str) -> RfTreeReport {
    analyze(&RfGraph::of(state), radio_id)
}

fn analyze(graph: &RfGraph<'_>, radio_id: &str) -> RfTreeReport {
    let mut report = RfTreeReport {
        radio_id: radio_id.to_owned(),
        ..RfTreeReport::default()
    };
    let mut visited = HashSet::from([radio_id.to_owned()]);
    walk(graph, radio_id, 0, false, &mut visited, &mut report);
    report
}

/// Returns the number of sensors behind `node`.
fn walk(
    graph: &RfGraph<'_>,
    node: &str,
    level: usize,
    flagged: bool,
    visited: &mut HashSet<String>,
    report: &mut RfTreeReport,
) -> usize {
    report.enter(node, level);
    let mut behind = graph.sensors_by_dst.get(node).copied().unwrap_or(0);

    for &child in graph.repeaters_by_dst.get(node).into_iter().flatten() {
        // A repeater seen twice means a loop; its subtree is already counted.
        if !visited.insert(child.to_owned()) {
            continue;
        }
        report.repeaters_reachable.insert(child.to_owned());
        let child_level = level + 1;
        let too_deep = !flagged && child_level > MAX_REPEATER_HOPS;
        if too_deep {
            report.too_deep.push(child.to_owned());
        }
        // Keep descending so the level sums stay complete.
        behind += walk(graph, child, child_level, flagged || too_deep, visited, report);
    }

    report.leave(node, level, behind);
    behind
}

fn excess_message(total: usize, cap: usize) -> String {
    format!("Must not have more than {cap} ({} too many)", total - cap)
}

fn check_capacity(report: &RfTreeReport, errors: &mut ValidationErrors) {
    for (level, (&cap, &total)) in SENSOR_CAPACITY_BY_LEVEL
        .iter()
        .zip(&report.sum_by_level)
        .enumerate()
    {
        if total <= cap {
            continue;
        }
        if level == 0 {
            errors.push(
                object_key(ObjectType::Radio, &report.radio_id),
                format!(
                    "Radio {} has {total} Sensors in its RF tree. {}",
                    report.radio_id,
                    excess_message(total, cap)
                ),
            );
            continue;
        }
        let Some(devices) = report.devices_by_level.get(level) else {
            continue;
        };
        let names = devices.join(", ");
        let message = format!(
            "Repeaters at hop {level} from Radio {} ({names}) have {total} Sensors behind them. {}",
            report.radio_id,
            excess_message(total, cap)
        );
        for device in devices {
            errors.push(object_key(ObjectType::MapRepeater, device), message.clone());
        }
    }
}

fn check_zone_names(state: &TopState, errors: &mut ValidationErrors) {
    let mut by_name: HashMap<String, Vec<&str>> = HashMap::new();
    for zone in state.sensor_zones.values() {
        let name = zone.name.trim().to_lowercase();
        if !name.is_empty() {
            by_name.entry(name).or_default().push(zone.id.as_str());
        }
    }
    for ids in by_name.values().filter(|ids| ids.len() > 1) {
        for id in ids {
            errors.push(
                object_key(ObjectType::SensorZone, id),
                "Sensor Zone name must be unique",
            );
        }
    }
}

fn check_rf_links(state: &TopState, errors: &mut ValidationErrors) {
    let undrawn = |link: Option<&RfLink>| !link.is_some_and(RfLink::is_drawn);
    for sensor in state.map_sensors.values() {
        if undrawn(sensor.info.rf_link.as_ref()) {
            errors.push(
                object_key(ObjectType::MapSensor, &sensor.id),
                format!("Sensor {} needs an RF link", sensor.id),
            );
        }
    }
    for repeater in state.map_repeaters.values() {
        if undrawn(repeater.info.rf_link.as_ref()) {
            errors.push(
                object_key(ObjectType::MapRepeater, &repeater.id),
                format!("Repeater {} needs an RF link", repeater.id),
            );
        }
    }
}

fn check_cc_links(state: &TopState, errors: &mut ValidationErrors) {
    for sensor in state.map_sensors.values() {
        let n = sensor.info.cc_links.len();
        if n > MAX_CC_LINKS {
            errors.push(
                object_key(ObjectType::MapSensor, &sensor.id),
                format!(
                    "Sensor {} has {n} CC links. Must not have more than {MAX_CC_LINKS}",
                    sensor.id
                ),
            );
        }
    }
}

fn check_rf_trees(state: &TopState, errors: &mut ValidationErrors) {
    let graph = RfGraph::of(state);
    let mut reachable = BTreeSet::new();

    for radio in state.radios.values() {
        let report = analyze(&graph, &radio.id);
        for id in &report.too_deep {
            errors.push(
                object_key(ObjectType::MapRepeater, id),
                format!(
                    "Repeater {id} has too many Repeaters between it and the Radio \
                     (at most {MAX_REPEATER_HOPS} allowed)"
                ),
            );
        }
        check_capacity(&report, errors);
        reachable.extend(report.repeaters_reachable);
    }

    for repeater in state.map_repeaters.values() {
        if !reachable.contains(&repeater.id) {
            errors.push(
                object_key(ObjectType::MapRepeater, &repeater.id),
                format!(
                    "Repeater {} has no RF connection to a Radio, whether direct or indirect.",
                    repeater.id
                ),
            );
        }
    }
}

/// Build the global error map from scratch.
pub fn validate_topology(state: &TopState) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_zone_names(state, &mut errors);
    check_rf_links(state, &mut errors);
    check_cc_links(state, &mut errors);
    check_rf_trees(state, &mut errors);
    errors
}
