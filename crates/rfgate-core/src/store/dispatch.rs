// ── Per-kind Action handlers ──
//
// ADD builds a record from `{}`, UPDATE merges onto the live record, and
// DELETE removes it (or flags it `unheard` when hardware still references
// it). Every write that can strand a link is followed by integrity repair;
// tray and cabinet writes re-derive display order.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::collection::EntityCollection;
use super::integrity;
use super::ordering;
use super::{Applied, Phase, Store};
use crate::action::{Action, DispatchMode, UpdateType, merge_patch, resolve_dynamic};
use crate::error::{StoreError, StoreResult};
use crate::model::{
    AccessPoint, CcCard, Entity, ObjectType, Radio, Repeater, Selected, Sensor, SensorZone,
    TrayDevice,
};

/// What a write merges onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    /// ADD: start from an empty record.
    Fresh,
    /// UPDATE or restore: start from the live record, if any.
    Existing,
}

impl Base {
    fn pick<T>(self, live: Option<T>) -> Option<T> {
        match self {
            Self::Fresh => None,
            Self::Existing => live,
        }
    }
}

/// Merge `patch` onto `base` (or `{}`) and rebuild the typed record.
fn merged<T: Entity>(
    object_type: ObjectType,
    id: &str,
    base: Option<&T>,
    patch: &Value,
) -> StoreResult<T> {
    if !patch.is_object() {
        return Err(StoreError::invariant(
            object_type,
            id,
            "payload must be a JSON object",
        ));
    }
    let mut value = match base {
        Some(record) => serde_json::to_value(record)
            .map_err(|e| StoreError::invariant(object_type, id, e.to_string()))?,
        None => Value::Object(Map::new()),
    };
    merge_patch(&mut value, patch);
    if let Value::Object(fields) = &mut value {
        fields.insert("id".to_owned(), Value::String(id.to_owned()));
    }
    serde_json::from_value(value).map_err(|e| {
        StoreError::invariant(object_type, id, format!("payload does not fit the record: {e}"))
    })
}

impl Store {
    /// Payload an Action applies with in `phase`, resolving dynamic
    /// sources against the current state.
    pub(super) fn prepare(&self, action: &Action, phase: Phase) -> StoreResult<Value> {
        let (payload, source) = match phase {
            Phase::Forward(mode) => (
                &action.new_data,
                action.new_data_dynamic_from.filter(|_| {
                    mode == DispatchMode::Redo && action.update_type == UpdateType::Add
                }),
            ),
            Phase::Reverse => (
                &action.orig_data,
                action
                    .orig_data_dynamic_from
                    .filter(|_| action.update_type == UpdateType::Delete),
            ),
        };

        let Some(source) = source else {
            return Ok(payload.clone());
        };
        let live = self
            .state
            .record_value(source, &action.object_id)
            .ok_or_else(|| StoreError::stale(source, &action.object_id, "live record is gone"))?;
        debug!(source = %source, id = %action.object_id, "resolving dynamic payload");
        resolve_dynamic(source, &live, payload)
    }

    pub(super) fn apply(&mut self, action: &Action, payload: &Value) -> StoreResult<Applied> {
        let (ot, id) = (action.object_type, action.object_id.as_str());
        check_target(ot, id)?;
        match action.update_type {
            UpdateType::Add => self.write(ot, id, payload, Base::Fresh),
            UpdateType::Update => {
                self.require(ot, id, "update")?;
                self.write(ot, id, payload, Base::Existing)
            }
            UpdateType::Delete => {
                self.require(ot, id, "delete")?;
                self.delete(ot, id, action.force_delete)
            }
        }
    }

    pub(super) fn apply_reverse(&mut self, action: &Action, payload: &Value) -> StoreResult<Applied> {
        let (ot, id) = (action.object_type, action.object_id.as_str());
        check_target(ot, id)?;
        match action.update_type {
            UpdateType::Add if ot == ObjectType::Selected => {
                self.write(ot, id, payload, Base::Existing)
            }
            UpdateType::Add => {
                self.require(ot, id, "remove")?;
                self.remove(ot, id)
            }
            UpdateType::Update => {
                self.require(ot, id, "revert")?;
                self.write(ot, id, payload, Base::Existing)
            }
            UpdateType::Delete => self.write(ot, id, payload, Base::Existing),
        }
    }

    fn require(&self, ot: ObjectType, id: &str, verb: &str) -> StoreResult<()> {
        if ot == ObjectType::Selected || self.state.contains(ot, id) {
            Ok(())
        } else {
            Err(StoreError::stale(ot, id, format!("cannot {verb}: no such record")))
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    fn write(&mut self, ot: ObjectType, id: &str, payload: &Value, base: Base) -> StoreResult<Applied> {
        match ot {
            ObjectType::Ap => {
                let ap: AccessPoint = merged(ot, id, base.pick(self.state.ap.as_deref()), payload)?;
                self.state.ap = Some(Arc::new(ap));
                // The CC mode may have changed under existing links.
                integrity::sweep(&mut self.state);
            }
            ObjectType::Radio => {
                let radio: Radio = merged(ot, id, base.pick(self.state.radios.get(id)), payload)?;
                self.state.radios.upsert(id, radio);
            }
            ObjectType::MapRepeater => {
                let mut repeater: Repeater =
                    merged(ot, id, base.pick(self.state.map_repeaters.get(id)), payload)?;
                integrity::remove_repeater_links_with_invalid_dst_id(&self.state, &mut repeater);
                self.state.map_repeaters.upsert(id, repeater);
            }
            ObjectType::MapSensor => {
                let mut sensor: Sensor =
                    merged(ot, id, base.pick(self.state.map_sensors.get(id)), payload)?;
                integrity::remove_links_with_invalid_dst_id(&self.state, &mut sensor);
                self.state.map_sensors.upsert(id, sensor);
            }
            ObjectType::TrayDevice => {
                let device: TrayDevice =
                    merged(ot, id, base.pick(self.state.tray_devices.get(id)), payload)?;
                self.state.tray_devices.upsert(id, device);
                ordering::sort_tray(&mut self.state.tray_devices, &self.config.layout);
            }
            ObjectType::SensorZone => return self.write_zone(id, payload, base),
            ObjectType::Selected => {
                let selected = if payload.is_null() {
                    None
                } else {
                    let selected: Selected = serde_json::from_value(payload.clone())
                        .map_err(|e| StoreError::invariant(ot, id, e.to_string()))?;
                    Some(selected)
                };
                // A selection whose device is gone collapses to none.
                self.state.selected = selected.filter(|s| {
                    let live = self.state.contains(s.selected_device_type, &s.selected_dotid);
                    if !live {
                        debug!(
                            kind = %s.selected_device_type,
                            id = %s.selected_dotid,
                            "dropping selection of a missing device"
                        );
                    }
                    live
                });
            }
            _ => self.write_card(ot, id, payload, base)?,
        }
        Ok(Applied::default())
    }

    fn write_card(&mut self, ot: ObjectType, id: &str, payload: &Value, base: Base) -> StoreResult<()> {
        let live = base.pick(self.state.cards(ot).and_then(|cards| cards.get(id)));
        let card: CcCard = merged(ot, id, live, payload)?;
        let cards = self
            .state
            .cards_mut(ot)
            .ok_or_else(|| StoreError::invariant(ot, id, "not a storable kind"))?;
        // SDLC, APGI and STS each hold exactly one card.
        if ot.is_singleton_card() {
            cards.clear();
        }
        cards.upsert(id, card);
        if ot == ObjectType::ExCard {
            ordering::sort_cabinet(&mut self.state.ex_cards, &self.config.layout);
        }
        integrity::sweep(&mut self.state);
        Ok(())
    }

    fn write_zone(&mut self, id: &str, payload: &Value, base: Base) -> StoreResult<Applied> {
        let ot = ObjectType::SensorZone;
        let promote_from = match base {
            Base::Fresh => payload
                .get("clientId")
                .and_then(Value::as_str)
                .filter(|temp| *temp != id && self.state.sensor_zones.contains(temp))
                .map(str::to_owned),
            Base::Existing => None,
        };

        let Some(temp) = promote_from else {
            let zone: SensorZone =
                merged(ot, id, base.pick(self.state.sensor_zones.get(id)), payload)?;
            self.index_zone(None, &zone);
            self.state.sensor_zones.upsert(id, zone);
            return Ok(Applied::default());
        };

        let zone: SensorZone = merged(ot, id, self.state.sensor_zones.get(&temp), payload)?;
        self.index_zone(Some(&temp), &zone);
        self.state.sensor_zones.rekey(&temp, id, zone);
        if let Some(selected) = self.state.selected.as_mut() {
            if selected.selected_device_type == ot && selected.selected_dotid == temp {
                selected.selected_dotid = id.to_owned();
            }
        }
        info!(from = %temp, to = id, "sensor zone promoted to server id");
        Ok(Applied {
            promoted: vec![(temp, id.to_owned())],
            ..Applied::default()
        })
    }

    /// Point every member sensor of `zone` at it, dropping entries for
    /// its previous id. Sensors the zone let go of fall back to any other
    /// zone that still lists them.
    fn index_zone(&mut self, previous: Option<&str>, zone: &SensorZone) {
        let index = Arc::make_mut(&mut self.state.sensor_dotid_to_sz_id);
        index.retain(|_, z| *z != zone.id && Some(z.as_str()) != previous);
        for sensor_id in &zone.sensor_ids {
            if let Some(other) = index.insert(sensor_id.clone(), zone.id.clone()) {
                warn!(sensor = %sensor_id, zone = %zone.id, other = %other, "sensor claimed by two zones");
            }
        }
        let skip = [Some(zone.id.as_str()), previous];
        backfill_zone_index(index, &self.state.sensor_zones, &skip);
    }

    // ── Removal ──────────────────────────────────────────────────────

    fn delete(&mut self, ot: ObjectType, id: &str, force: bool) -> StoreResult<Applied> {
        match ot {
            ObjectType::Radio => Ok(self.delete_radio(id)),
            ObjectType::Selected => {
                self.state.selected = None;
                Ok(Applied::default())
            }
            ot if ot.is_cc_card() => Ok(self.delete_card(ot, id, force)),
            _ => self.remove(ot, id),
        }
    }

    fn delete_radio(&mut self, id: &str) -> Applied {
        let ot = ObjectType::Radio;
        if self.state.has_rf_dependents(id) {
            self.state.radios.modify(id, |r| r.unheard = true);
            info!(radio = id, "radio unheard, kept while devices still link to it");
            return Applied {
                soft_deleted: vec![(ot, id.to_owned())],
                ..Applied::default()
            };
        }
        self.erase(ot, id);
        info!(radio = id, "radio removed");
        Applied {
            hard_deleted: vec![(ot, id.to_owned())],
            ..Applied::default()
        }
    }

    fn delete_card(&mut self, ot: ObjectType, id: &str, force: bool) -> Applied {
        let linked = self
            .state
            .cards(ot)
            .and_then(|cards| cards.get(id))
            .is_some_and(|card| self.state.has_cc_dependents(card));

        if force {
            integrity::clear_all_cc_links(&mut self.state);
            info!(card = id, kind = %ot, "force-deleting card, all CC links cleared");
        } else if linked {
            if let Some(cards) = self.state.cards_mut(ot) {
                cards.modify(id, |c| c.unheard = true);
            }
            info!(card = id, kind = %ot, "card unheard, kept while sensors still link to it");
            return Applied {
                soft_deleted: vec![(ot, id.to_owned())],
                ..Applied::default()
            };
        }

        self.erase(ot, id);
        info!(card = id, kind = %ot, "card removed");
        Applied {
            hard_deleted: vec![(ot, id.to_owned())],
            ..Applied::default()
        }
    }

    /// Unconditional removal, as used by DELETE of plain records and by
    /// the reverse of ADD.
    fn remove(&mut self, ot: ObjectType, id: &str) -> StoreResult<Applied> {
        match ot {
            ObjectType::Selected => self.state.selected = None,
            ObjectType::StsAddrMap => {
                return Err(StoreError::invariant(ot, id, "not a storable kind"));
            }
            _ => self.erase(ot, id),
        }
        Ok(Applied::default())
    }

    fn erase(&mut self, ot: ObjectType, id: &str) {
        match ot {
            ObjectType::Ap => {
                self.state.ap = None;
                integrity::sweep(&mut self.state);
            }
            ObjectType::Radio => {
                self.state.radios.remove(id);
                integrity::sweep(&mut self.state);
            }
            ObjectType::MapRepeater => {
                self.state.map_repeaters.remove(id);
                integrity::sweep(&mut self.state);
            }
            ObjectType::MapSensor => {
                self.state.map_sensors.remove(id);
            }
            ObjectType::TrayDevice => {
                self.state.tray_devices.remove(id);
                ordering::sort_tray(&mut self.state.tray_devices, &self.config.layout);
            }
            ObjectType::SensorZone => {
                self.state.sensor_zones.remove(id);
                let index = Arc::make_mut(&mut self.state.sensor_dotid_to_sz_id);
                index.retain(|_, z| z.as_str() != id);
                backfill_zone_index(index, &self.state.sensor_zones, &[]);
            }
            ot if ot.is_cc_card() => {
                if let Some(cards) = self.state.cards_mut(ot) {
                    cards.remove(id);
                }
                if ot == ObjectType::ExCard {
                    ordering::sort_cabinet(&mut self.state.ex_cards, &self.config.layout);
                }
                integrity::sweep(&mut self.state);
            }
            _ => {}
        }
        self.clear_selected(ot, id);
    }

    fn clear_selected(&mut self, ot: ObjectType, id: &str) {
        let matches = self
            .state
            .selected
            .as_ref()
            .is_some_and(|s| s.selected_device_type == ot && s.selected_dotid == id);
        if matches {
            self.state.selected = None;
        }
    }
}

/// Give every sensor listed by a zone outside `skip` an index entry if it
/// has none.
fn backfill_zone_index(
    index: &mut BTreeMap<String, String>,
    zones: &EntityCollection<SensorZone>,
    skip: &[Option<&str>],
) {
    for zone in zones.values() {
        if skip.contains(&Some(zone.id.as_str())) {
            continue;
        }
        for sensor_id in &zone.sensor_ids {
            index
                .entry(sensor_id.clone())
                .or_insert_with(|| zone.id.clone());
        }
    }
}

fn check_target(ot: ObjectType, id: &str) -> StoreResult<()> {
    if ot == ObjectType::StsAddrMap {
        return Err(StoreError::invariant(
            ot,
            id,
            "address maps are edited through their STS card",
        ));
    }
    if ot != ObjectType::Selected && id.trim().is_empty() {
        return Err(StoreError::invariant(ot, id, "object id is empty"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn merged_starts_fresh_and_forces_id() {
        let radio: Radio =
            merged(ObjectType::Radio, "SPP0", None, &json!({"id": "bogus", "info": {"channel": 3}}))
                .unwrap();
        assert_eq!(radio.id, "SPP0");
        assert_eq!(radio.info.channel, 3);
    }

    #[test]
    fn merged_keeps_unpatched_fields() {
        let mut base = Sensor {
            id: "0001".into(),
            ..Sensor::default()
        };
        base.info.location = "Main St".into();
        base.info.cc_delay_ms = "100".into();

        let out: Sensor = merged(
            ObjectType::MapSensor,
            "0001",
            Some(&base),
            &json!({"info": {"ccDelayMs": "250"}}),
        )
        .unwrap();
        assert_eq!(out.info.location, "Main St");
        assert_eq!(out.info.cc_delay_ms, "250");
    }

    #[test]
    fn non_object_payload_is_an_invariant_error() {
        let err = merged::<Radio>(ObjectType::Radio, "SPP0", None, &json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
    }

    #[test]
    fn mistyped_payload_is_an_invariant_error() {
        let err = merged::<Radio>(ObjectType::Radio, "SPP0", None, &json!({"info": {"channel": "x"}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
    }

    #[test]
    fn address_map_is_not_a_target() {
        assert!(check_target(ObjectType::StsAddrMap, "STS").is_err());
        assert!(check_target(ObjectType::Radio, " ").is_err());
        assert!(check_target(ObjectType::Selected, "").is_ok());
    }
}
