// ── Contact-closure interface cards ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ids::ObjectType;
use super::link::Point;

/// Length of the suffix that turns an EX card id into a channel id
/// (`"S3-S12"` + `"-CH07"`).
pub const EX_CHANNEL_SUFFIX_LEN: usize = 5;

/// Which card family CC links target (the gateway's virtual CC mode).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CcMode {
    #[default]
    Ex,
    Sdlc,
    Apgi,
    Sts,
}

impl CcMode {
    pub fn object_type(self) -> ObjectType {
        match self {
            Self::Ex => ObjectType::ExCard,
            Self::Sdlc => ObjectType::SdlcBank,
            Self::Apgi => ObjectType::ApgiCard,
            Self::Sts => ObjectType::StsCard,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensorFailSafe {
    pub enabled: bool,
    pub hold_secs: u32,
}

/// One detector output on a CC card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub enabled: bool,
    pub sensor_fail_safe: SensorFailSafe,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CcCardInfo {
    pub location: String,
    pub position: Point,
}

/// One row of the STS card's controller address map. Values are the text
/// the user typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StsAddr {
    pub ip: String,
    pub port: String,
}

/// SDLC bank, APGI card, STS card or EX expansion card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CcCard {
    pub id: String,
    pub info: CcCardInfo,
    pub channels: BTreeMap<String, Channel>,
    /// Only populated on STS cards; keyed by row index.
    pub addr_map: BTreeMap<String, StsAddr>,
    pub unheard: bool,
}

impl CcCard {
    pub fn has_channel(&self, channel_id: &str) -> bool {
        self.channels.contains_key(channel_id)
    }
}

/// Card id owning an EX channel id, or `None` when the id is too short.
pub fn ex_card_id_of_channel(channel_id: &str) -> Option<&str> {
    let cut = channel_id.len().checked_sub(EX_CHANNEL_SUFFIX_LEN)?;
    if cut == 0 {
        return None;
    }
    channel_id.get(..cut)
}

/// Parse a cabinet slot id of the form `S<shelf>-S<slot>`.
pub fn parse_shelf_slot(card_id: &str) -> Option<(u32, u32)> {
    let (shelf, slot) = card_id.split_once('-')?;
    let shelf = shelf.strip_prefix('S')?.parse().ok()?;
    let slot = slot.strip_prefix('S')?.parse().ok()?;
    Some((shelf, slot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ex_channel_maps_back_to_card() {
        assert_eq!(ex_card_id_of_channel("S3-S12-CH07"), Some("S3-S12"));
        assert_eq!(ex_card_id_of_channel("-CH07"), None);
        assert_eq!(ex_card_id_of_channel("CH7"), None);
    }

    #[test]
    fn shelf_slot_parsing() {
        assert_eq!(parse_shelf_slot("S3-S12"), Some((3, 12)));
        assert_eq!(parse_shelf_slot("S1-S20"), Some((1, 20)));
        assert_eq!(parse_shelf_slot("SDLC"), None);
        assert_eq!(parse_shelf_slot("X1-S2"), None);
    }
}
