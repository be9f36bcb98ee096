// ── Denormalized top-level state ──

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::collection::EntityCollection;
use super::errors::ValidationErrors;
use super::modal::ModalStack;
use crate::model::{
    AccessPoint, CcCard, CcMode, Entity, ObjectType, Radio, Repeater, Selected, Sensor,
    SensorZone, TrayDevice, UiState,
};

/// Full snapshot of everything the UI reads.
///
/// Cloning is cheap: every collection shares its storage until written.
/// Callers never mutate a snapshot; all writes go through the
/// [`Store`](super::Store).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopState {
    pub ap: Option<Arc<AccessPoint>>,
    pub radios: EntityCollection<Radio>,
    pub map_repeaters: EntityCollection<Repeater>,
    pub map_sensors: EntityCollection<Sensor>,
    pub tray_devices: EntityCollection<TrayDevice>,
    pub sensor_zones: EntityCollection<SensorZone>,
    pub sdlc_banks: EntityCollection<CcCard>,
    pub apgi_cards: EntityCollection<CcCard>,
    pub sts_cards: EntityCollection<CcCard>,
    pub ex_cards: EntityCollection<CcCard>,
    pub sensor_dotid_to_sz_id: Arc<BTreeMap<String, String>>,
    pub selected: Option<Selected>,
    pub validation_errors: ValidationErrors,
    pub validation_global_errors: ValidationErrors,
    pub modals: ModalStack,
    pub ui: UiState,
}

impl TopState {
    /// Card collection for a CC card kind.
    pub fn cards(&self, object_type: ObjectType) -> Option<&EntityCollection<CcCard>> {
        match object_type {
            ObjectType::SdlcBank => Some(&self.sdlc_banks),
            ObjectType::ApgiCard => Some(&self.apgi_cards),
            ObjectType::StsCard => Some(&self.sts_cards),
            ObjectType::ExCard => Some(&self.ex_cards),
            _ => None,
        }
    }

    pub(crate) fn cards_mut(
        &mut self,
        object_type: ObjectType,
    ) -> Option<&mut EntityCollection<CcCard>> {
        match object_type {
            ObjectType::SdlcBank => Some(&mut self.sdlc_banks),
            ObjectType::ApgiCard => Some(&mut self.apgi_cards),
            ObjectType::StsCard => Some(&mut self.sts_cards),
            ObjectType::ExCard => Some(&mut self.ex_cards),
            _ => None,
        }
    }

    /// Card family CC links currently target.
    ///
    /// The AP's configured mode wins; before the AP has synced, fall back
    /// to whichever singleton card is present, else EX.
    pub fn cc_mode(&self) -> CcMode {
        if let Some(ap) = &self.ap {
            return ap.info.cc_mode;
        }
        if !self.sdlc_banks.is_empty() {
            CcMode::Sdlc
        } else if !self.apgi_cards.is_empty() {
            CcMode::Apgi
        } else if !self.sts_cards.is_empty() {
            CcMode::Sts
        } else {
            CcMode::Ex
        }
    }

    /// True when `id` names a live Radio or map Repeater.
    pub fn is_rf_target(&self, id: &str) -> bool {
        self.radios.contains(id) || self.map_repeaters.contains(id)
    }

    /// Does any map Sensor or Repeater RF-link to `id`?
    pub fn has_rf_dependents(&self, id: &str) -> bool {
        let links_to = |link: Option<&crate::model::RfLink>| link.is_some_and(|l| l.dst_id == id);
        self.map_sensors
            .values()
            .any(|s| links_to(s.info.rf_link.as_ref()))
            || self
                .map_repeaters
                .values()
                .any(|r| links_to(r.info.rf_link.as_ref()))
    }

    /// Does any map Sensor CC-link to a channel of `card`?
    pub fn has_cc_dependents(&self, card: &CcCard) -> bool {
        self.map_sensors
            .values()
            .flat_map(|s| &s.info.cc_links)
            .any(|l| card.has_channel(&l.dst_id))
    }

    pub fn zone_of_sensor(&self, sensor_id: &str) -> Option<&SensorZone> {
        let zone_id = self.sensor_dotid_to_sz_id.get(sensor_id)?;
        self.sensor_zones.get(zone_id)
    }

    /// Live record for `(kind, id)` as a JSON value.
    pub fn record_value(&self, object_type: ObjectType, id: &str) -> Option<Value> {
        fn to_value<T: Entity>(record: Option<&T>) -> Option<Value> {
            record.and_then(|r| serde_json::to_value(r).ok())
        }

        match object_type {
            ObjectType::Ap => to_value(self.ap.as_deref().filter(|ap| ap.id == id)),
            ObjectType::Radio => to_value(self.radios.get(id)),
            ObjectType::MapRepeater => to_value(self.map_repeaters.get(id)),
            ObjectType::MapSensor => to_value(self.map_sensors.get(id)),
            ObjectType::TrayDevice => to_value(self.tray_devices.get(id)),
            ObjectType::SensorZone => to_value(self.sensor_zones.get(id)),
            ot if ot.is_cc_card() => to_value(self.cards(ot).and_then(|c| c.get(id))),
            _ => None,
        }
    }

    pub fn contains(&self, object_type: ObjectType, id: &str) -> bool {
        match object_type {
            ObjectType::Ap => self.ap.as_ref().is_some_and(|ap| ap.id == id),
            ObjectType::Radio => self.radios.contains(id),
            ObjectType::MapRepeater => self.map_repeaters.contains(id),
            ObjectType::MapSensor => self.map_sensors.contains(id),
            ObjectType::TrayDevice => self.tray_devices.contains(id),
            ObjectType::SensorZone => self.sensor_zones.contains(id),
            ot if ot.is_cc_card() => self.cards(ot).is_some_and(|c| c.contains(id)),
            _ => false,
        }
    }
}
