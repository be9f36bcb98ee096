// ── Integrity repair ──
//
// Purges RF and CC links whose target no longer exists. Runs on every
// Sensor/Repeater write, and as a full sweep after any Radio, Repeater
// or CC card leaves the store.

use tracing::debug;

use super::collection::EntityCollection;
use super::state::TopState;
use crate::model::{CcCard, CcLink, CcMode, Repeater, RfLink, Sensor, ex_card_id_of_channel};

/// Where CC links may currently land.
enum CcTargets<'a> {
    /// No card of the active family exists.
    Nothing,
    /// EX mode: the owning card is derived from each channel id.
    Cabinet(&'a EntityCollection<CcCard>),
    /// SDLC/APGI/STS: one fixed card owns every channel.
    Single(&'a CcCard),
}

impl<'a> CcTargets<'a> {
    fn of(state: &'a TopState) -> Self {
        match state.cc_mode() {
            CcMode::Ex if state.ex_cards.is_empty() => Self::Nothing,
            CcMode::Ex => Self::Cabinet(&state.ex_cards),
            mode => state
                .cards(mode.object_type())
                .and_then(EntityCollection::first)
                .map_or(Self::Nothing, Self::Single),
        }
    }

    fn has_channel(&self, channel_id: &str) -> bool {
        match self {
            Self::Nothing => false,
            Self::Cabinet(cards) => ex_card_id_of_channel(channel_id)
                .and_then(|card_id| cards.get(card_id))
                .is_some_and(|card| card.has_channel(channel_id)),
            Self::Single(card) => card.has_channel(channel_id),
        }
    }
}

/// Drop an RF link whose target is not a live Radio or Repeater.
fn repair_rf_link(state: &TopState, link: &mut Option<RfLink>) -> bool {
    match link {
        Some(l) if !state.is_rf_target(&l.dst_id) => {
            debug!(dst = %l.dst_id, "dropping dangling RF link");
            *link = None;
            true
        }
        _ => false,
    }
}

/// Keep only CC links whose channel still exists.
fn repair_cc_links(state: &TopState, links: &mut Vec<CcLink>) -> bool {
    if links.is_empty() {
        return false;
    }
    let before = links.len();
    match CcTargets::of(state) {
        CcTargets::Nothing => links.clear(),
        targets => links.retain(|l| targets.has_channel(&l.dst_id)),
    }
    let dropped = before - links.len();
    if dropped > 0 {
        debug!(dropped, "dropping dangling CC links");
    }
    dropped > 0
}

/// Repair one Sensor in place. Returns `true` if anything was removed.
pub fn remove_links_with_invalid_dst_id(state: &TopState, sensor: &mut Sensor) -> bool {
    let rf = repair_rf_link(state, &mut sensor.info.rf_link);
    let cc = repair_cc_links(state, &mut sensor.info.cc_links);
    rf || cc
}

/// Repair one Repeater in place. Repeaters carry no CC links.
pub fn remove_repeater_links_with_invalid_dst_id(state: &TopState, repeater: &mut Repeater) -> bool {
    repair_rf_link(state, &mut repeater.info.rf_link)
}

/// Repair every map Sensor and Repeater.
pub(crate) fn sweep(state: &mut TopState) {
    let mut sensors = Vec::new();
    for sensor in state.map_sensors.values() {
        let mut fixed = sensor.clone();
        if remove_links_with_invalid_dst_id(state, &mut fixed) {
            sensors.push(fixed);
        }
    }

    let mut repeaters = Vec::new();
    for repeater in state.map_repeaters.values() {
        let mut fixed = repeater.clone();
        if remove_repeater_links_with_invalid_dst_id(state, &mut fixed) {
            repeaters.push(fixed);
        }
    }

    for sensor in sensors {
        let id = sensor.id.clone();
        state.map_sensors.upsert(&id, sensor);
    }
    for repeater in repeaters {
        let id = repeater.id.clone();
        state.map_repeaters.upsert(&id, repeater);
    }
}

/// Remove every CC link from every map Sensor.
pub(crate) fn clear_all_cc_links(state: &mut TopState) {
    let ids: Vec<String> = state
        .map_sensors
        .values()
        .filter(|s| !s.info.cc_links.is_empty())
        .map(|s| s.id.clone())
        .collect();
    for id in ids {
        state.map_sensors.modify(&id, |s| s.info.cc_links.clear());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{AccessPoint, Channel, Radio};
    use std::sync::Arc;

    fn card(id: &str, channels: &[&str]) -> CcCard {
        CcCard {
            id: id.into(),
            channels: channels
                .iter()
                .map(|c| ((*c).to_owned(), Channel { id: (*c).to_owned(), ..Channel::default() }))
                .collect(),
            ..CcCard::default()
        }
    }

    fn sensor(rf: Option<&str>, cc: &[&str]) -> Sensor {
        let mut s = Sensor {
            id: "0001".into(),
            ..Sensor::default()
        };
        s.info.rf_link = rf.map(|d| RfLink::new(d, Vec::new()));
        s.info.cc_links = cc.iter().map(|d| CcLink::new(*d)).collect();
        s
    }

    #[test]
    fn rf_link_to_missing_radio_is_dropped() {
        let mut state = TopState::default();
        state.radios.upsert("SPP0", Radio { id: "SPP0".into(), ..Radio::default() });

        let mut ok = sensor(Some("SPP0"), &[]);
        assert!(!remove_links_with_invalid_dst_id(&state, &mut ok));
        assert!(ok.info.rf_link.is_some());

        let mut dangling = sensor(Some("SPP1"), &[]);
        assert!(remove_links_with_invalid_dst_id(&state, &mut dangling));
        assert!(dangling.info.rf_link.is_none());
    }

    #[test]
    fn ex_links_checked_against_owning_card() {
        let mut state = TopState::default();
        state.ex_cards.upsert("S1-S2", card("S1-S2", &["S1-S2-CH01", "S1-S2-CH02"]));

        // Adjacent dangling links must both go; no element skipped.
        let mut s = sensor(None, &["S1-S2-CH01", "S1-S2-CH09", "S4-S4-CH01", "S1-S2-CH02"]);
        assert!(remove_links_with_invalid_dst_id(&state, &mut s));
        let kept: Vec<_> = s.info.cc_links.iter().map(|l| l.dst_id.as_str()).collect();
        assert_eq!(kept, vec!["S1-S2-CH01", "S1-S2-CH02"]);
    }

    #[test]
    fn singleton_mode_uses_fixed_card() {
        let mut state = TopState::default();
        let mut ap = AccessPoint::default();
        ap.info.cc_mode = CcMode::Sdlc;
        state.ap = Some(Arc::new(ap));
        state.sdlc_banks.upsert("SDLC", card("SDLC", &["B1-CH01"]));

        let mut s = sensor(None, &["B1-CH01", "B1-CH02"]);
        remove_links_with_invalid_dst_id(&state, &mut s);
        assert_eq!(s.info.cc_links.len(), 1);
    }

    #[test]
    fn no_cards_clears_all_cc_links() {
        let state = TopState::default();
        let mut s = sensor(None, &["S1-S2-CH01", "S1-S2-CH02"]);
        assert!(remove_links_with_invalid_dst_id(&state, &mut s));
        assert!(s.info.cc_links.is_empty());
    }

    #[test]
    fn sweep_repairs_only_broken_devices() {
        let mut state = TopState::default();
        state.radios.upsert("SPP0", Radio { id: "SPP0".into(), ..Radio::default() });
        let mut good = sensor(Some("SPP0"), &[]);
        good.id = "0001".into();
        let mut bad = sensor(Some("gone"), &[]);
        bad.id = "0002".into();
        state.map_sensors.upsert("0001", good);
        state.map_sensors.upsert("0002", bad);

        sweep(&mut state);
        assert!(state.map_sensors.get("0001").unwrap().info.rf_link.is_some());
        assert!(state.map_sensors.get("0002").unwrap().info.rf_link.is_none());
    }
}
