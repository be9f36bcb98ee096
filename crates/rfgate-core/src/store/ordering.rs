// ── Canonical display order ──
//
// The tray lists Repeaters before Sensors, each group by numeric dotid.
// The cabinet lists EX cards by (shelf, slot). Positions are re-derived
// from rank after every sort so the canvas never shows gaps.

use std::cmp::Ordering;

use super::collection::EntityCollection;
use crate::config::LayoutConfig;
use crate::model::{CcCard, DotId, TrayDevice, parse_shelf_slot};

fn tray_key(device: &TrayDevice) -> (u8, u32) {
    let numeric = DotId::from(device.id.as_str())
        .numeric()
        .unwrap_or(u32::MAX);
    (device.kind.rank(), numeric)
}

fn cabinet_key(card: &CcCard) -> (u32, u32) {
    parse_shelf_slot(&card.id).unwrap_or((u32::MAX, u32::MAX))
}

fn compare_by<T>(key: impl Fn(&T) -> (u32, u32), id: impl Fn(&T) -> &str) -> impl Fn(&T, &T) -> Ordering {
    move |a, b| key(a).cmp(&key(b)).then_with(|| id(a).cmp(id(b)))
}

#[allow(clippy::cast_precision_loss)]
fn slot_offset(origin: f64, step: f64, rank: usize) -> f64 {
    origin + step * rank as f64
}

pub(crate) fn sort_tray(tray: &mut EntityCollection<TrayDevice>, layout: &LayoutConfig) {
    let cmp = compare_by(
        |d: &TrayDevice| {
            let (rank, n) = tray_key(d);
            (u32::from(rank), n)
        },
        |d| d.id.as_str(),
    );
    tray.sort_by(cmp);

    let ids: Vec<String> = tray.keys().map(str::to_owned).collect();
    for (rank, id) in ids.iter().enumerate() {
        let x = slot_offset(layout.tray_x0, layout.tray_step, rank);
        if tray.get(id).is_some_and(|d| (d.info.position.x - x).abs() > f64::EPSILON) {
            tray.modify(id, |d| d.info.position.x = x);
        }
    }
}

pub(crate) fn sort_cabinet(cards: &mut EntityCollection<CcCard>, layout: &LayoutConfig) {
    cards.sort_by(compare_by(cabinet_key, |c: &CcCard| c.id.as_str()));

    let ids: Vec<String> = cards.keys().map(str::to_owned).collect();
    for (rank, id) in ids.iter().enumerate() {
        let y = slot_offset(layout.cabinet_y0, layout.cabinet_row_height, rank);
        if cards.get(id).is_some_and(|c| (c.info.position.y - y).abs() > f64::EPSILON) {
            cards.modify(id, |c| c.info.position.y = y);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::TrayKind;

    fn tray_device(id: &str, kind: TrayKind) -> TrayDevice {
        TrayDevice {
            id: id.into(),
            kind,
            ..TrayDevice::default()
        }
    }

    #[test]
    fn repeaters_lead_the_tray_regardless_of_id() {
        let layout = LayoutConfig::default();
        let mut tray = EntityCollection::new();
        tray.upsert("0001", tray_device("0001", TrayKind::Sensor));
        tray.upsert("00AB", tray_device("00AB", TrayKind::Repeater));
        tray.upsert("000F", tray_device("000F", TrayKind::Sensor));

        sort_tray(&mut tray, &layout);
        assert_eq!(tray.keys().collect::<Vec<_>>(), vec!["00AB", "0001", "000F"]);
        assert_eq!(tray.get("00AB").unwrap().info.position.x, layout.tray_x0);
        assert_eq!(
            tray.get("000F").unwrap().info.position.x,
            layout.tray_x0 + 2.0 * layout.tray_step
        );
    }

    #[test]
    fn hex_ids_sort_numerically() {
        let mut tray = EntityCollection::new();
        tray.upsert("00A0", tray_device("00A0", TrayKind::Sensor));
        tray.upsert("0009", tray_device("0009", TrayKind::Sensor));
        sort_tray(&mut tray, &LayoutConfig::default());
        assert_eq!(tray.keys().collect::<Vec<_>>(), vec!["0009", "00A0"]);
    }

    #[test]
    fn cabinet_orders_by_shelf_then_slot() {
        let layout = LayoutConfig::default();
        let mut cards = EntityCollection::new();
        for id in ["S3-S12", "S1-S20", "S3-S2"] {
            cards.upsert(id, CcCard { id: id.into(), ..CcCard::default() });
        }

        sort_cabinet(&mut cards, &layout);
        assert_eq!(cards.keys().collect::<Vec<_>>(), vec!["S1-S20", "S3-S2", "S3-S12"]);
        assert_eq!(
            cards.get("S3-S12").unwrap().info.position.y,
            layout.cabinet_y0 + 2.0 * layout.cabinet_row_height
        );
    }
}
