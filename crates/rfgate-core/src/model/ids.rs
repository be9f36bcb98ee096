// ── Core identity types ──
//
// ObjectType tags every record kind the store knows about. Its string
// form doubles as the prefix of validation-error keys, so it must stay
// stable across releases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ── ObjectType ──────────────────────────────────────────────────────

/// Kind tag carried by every [`Action`](crate::Action) and error key.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Ap,
    Radio,
    MapRepeater,
    MapSensor,
    TrayDevice,
    SensorZone,
    SdlcBank,
    ApgiCard,
    StsCard,
    ExCard,
    StsAddrMap,
    Selected,
}

impl ObjectType {
    /// Contact-closure card kinds that may exist at most once.
    pub fn is_singleton_card(self) -> bool {
        matches!(self, Self::SdlcBank | Self::ApgiCard | Self::StsCard)
    }

    pub fn is_cc_card(self) -> bool {
        self.is_singleton_card() || self == Self::ExCard
    }

    /// Kinds whose records carry an RF link to a Radio or Repeater.
    pub fn has_rf_link(self) -> bool {
        matches!(self, Self::MapRepeater | Self::MapSensor)
    }

    /// Human label used in validation messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ap => "Access Point",
            Self::Radio => "Radio",
            Self::MapRepeater | Self::TrayDevice => "Repeater",
            Self::MapSensor => "Sensor",
            Self::SensorZone => "Sensor Zone",
            Self::SdlcBank => "SDLC Bank",
            Self::ApgiCard => "APGI Card",
            Self::StsCard => "STS Card",
            Self::ExCard => "Expansion Card",
            Self::StsAddrMap => "STS Address Map",
            Self::Selected => "Selection",
        }
    }
}

// ── DotId ───────────────────────────────────────────────────────────

/// Four-character hex hardware id of a field device (e.g. `"00AB"`).
///
/// Stored as given; comparisons and ordering go through [`DotId::numeric`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DotId(String);

impl DotId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the hex id, or `None` when it is not valid hex.
    pub fn numeric(&self) -> Option<u32> {
        u32::from_str_radix(&self.0, 16).ok()
    }
}

impl fmt::Display for DotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DotId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for DotId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn object_type_string_form_is_screaming_snake() {
        assert_eq!(ObjectType::Ap.to_string(), "AP");
        assert_eq!(ObjectType::MapSensor.as_ref(), "MAP_SENSOR");
        assert_eq!(ObjectType::StsAddrMap.to_string(), "STS_ADDR_MAP");
    }

    #[test]
    fn object_type_parses_from_key_prefix() {
        let ot: ObjectType = "SENSOR_ZONE".parse().unwrap();
        assert_eq!(ot, ObjectType::SensorZone);
    }

    #[test]
    fn object_type_serde_matches_display() {
        let json = serde_json::to_string(&ObjectType::ExCard).unwrap();
        assert_eq!(json, "\"EX_CARD\"");
    }

    #[test]
    fn singleton_card_kinds() {
        assert!(ObjectType::SdlcBank.is_singleton_card());
        assert!(ObjectType::StsCard.is_singleton_card());
        assert!(!ObjectType::ExCard.is_singleton_card());
        assert!(ObjectType::ExCard.is_cc_card());
    }

    #[test]
    fn dotid_numeric_value() {
        assert_eq!(DotId::from("00AB").numeric(), Some(0xAB));
        assert_eq!(DotId::from("zz").numeric(), None);
    }
}
