// ── Action API ──
//
// Every write to the store is an `Action`: a kind tag, a target id, and
// JSON payloads for the new value and the pre-image. Payloads are partial
// records that merge onto the typed model, so the UI can send just the
// fields it changed.

mod dynamic;
mod merge;

pub use dynamic::resolve_dynamic;
pub use merge::merge_patch;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::model::ObjectType;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateType {
    Add,
    Update,
    Delete,
}

/// Whether an Action is applied for the first time or replayed by redo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    #[default]
    Enact,
    Redo,
}

/// One structural change to the device graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub object_type: ObjectType,
    pub object_id: String,
    pub update_type: UpdateType,
    #[serde(default)]
    pub new_data: Value,
    /// Pre-image; `reverse` merges this back.
    #[serde(default)]
    pub orig_data: Value,
    /// Collection holding the live record `new_data` is re-derived from on redo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_data_dynamic_from: Option<ObjectType>,
    /// Collection holding the live record `orig_data` is re-derived from on undo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_data_dynamic_from: Option<ObjectType>,
    /// CC card deletes only: drop the card and clear every sensor CC link
    /// even while links still point at it.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force_delete: bool,
}

impl Action {
    fn new(object_type: ObjectType, object_id: &str, update_type: UpdateType) -> Self {
        Self {
            object_type,
            object_id: object_id.to_owned(),
            update_type,
            new_data: Value::Null,
            orig_data: Value::Null,
            new_data_dynamic_from: None,
            orig_data_dynamic_from: None,
            force_delete: false,
        }
    }

    pub fn add(object_type: ObjectType, object_id: &str, new_data: Value) -> Self {
        Self {
            new_data,
            ..Self::new(object_type, object_id, UpdateType::Add)
        }
    }

    pub fn update(
        object_type: ObjectType,
        object_id: &str,
        new_data: Value,
        orig_data: Value,
    ) -> Self {
        Self {
            new_data,
            orig_data,
            ..Self::new(object_type, object_id, UpdateType::Update)
        }
    }

    pub fn delete(object_type: ObjectType, object_id: &str, orig_data: Value) -> Self {
        Self {
            orig_data,
            ..Self::new(object_type, object_id, UpdateType::Delete)
        }
    }

    pub fn with_new_data_dynamic_from(mut self, source: ObjectType) -> Self {
        self.new_data_dynamic_from = Some(source);
        self
    }

    pub fn with_orig_data_dynamic_from(mut self, source: ObjectType) -> Self {
        self.orig_data_dynamic_from = Some(source);
        self
    }

    pub fn forced(mut self) -> Self {
        self.force_delete = true;
        self
    }
}

/// An ordered batch applied and validated as one user or server operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionGroup {
    pub description: String,
    pub actions: Vec<Action>,
}

impl ActionGroup {
    pub fn new(description: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            description: description.into(),
            actions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Distinct `(kind, id)` targets in application order.
    pub fn targets(&self) -> Vec<(ObjectType, String)> {
        let mut out: Vec<(ObjectType, String)> = Vec::new();
        for a in &self.actions {
            if !out
                .iter()
                .any(|(ot, id)| *ot == a.object_type && *id == a.object_id)
            {
                out.push((a.object_type, a.object_id.clone()));
            }
        }
        out
    }
}

/// One change to a validation-error map.
///
/// A `Delete` carrying `error_on_type`/`error_on_id` clears every error
/// keyed to that object instead of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationAction {
    pub field_id: String,
    pub object_type: ObjectType,
    pub err_msg: String,
    pub update_type: UpdateType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_on_type: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_on_id: Option<String>,
}

impl ValidationAction {
    pub fn add(object_type: ObjectType, field_id: String, err_msg: impl Into<String>) -> Self {
        Self {
            field_id,
            object_type,
            err_msg: err_msg.into(),
            update_type: UpdateType::Add,
            error_on_type: None,
            error_on_id: None,
        }
    }

    /// Clear all errors recorded against one object.
    pub fn clear_object(object_type: ObjectType, object_id: &str) -> Self {
        Self {
            field_id: String::new(),
            object_type,
            err_msg: String::new(),
            update_type: UpdateType::Delete,
            error_on_type: Some(object_type),
            error_on_id: Some(object_id.to_owned()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_wire_shape_is_camel_case() {
        let a = Action::add(ObjectType::MapSensor, "0001", json!({"info": {}}))
            .with_new_data_dynamic_from(ObjectType::TrayDevice);
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["objectType"], "MAP_SENSOR");
        assert_eq!(v["updateType"], "ADD");
        assert_eq!(v["newDataDynamicFrom"], "TRAY_DEVICE");
        assert!(v.get("forceDelete").is_none());
    }

    #[test]
    fn action_parses_with_missing_optionals() {
        let a: Action = serde_json::from_value(json!({
            "objectType": "RADIO",
            "objectId": "SPP0",
            "updateType": "DELETE",
        }))
        .unwrap();
        assert_eq!(a.update_type, UpdateType::Delete);
        assert!(a.orig_data.is_null());
        assert!(!a.force_delete);
    }

    #[test]
    fn group_targets_are_distinct_and_ordered() {
        let g = ActionGroup::new(
            "move",
            vec![
                Action::delete(ObjectType::TrayDevice, "0001", json!({})),
                Action::add(ObjectType::MapSensor, "0001", json!({})),
                Action::update(ObjectType::MapSensor, "0001", json!({}), json!({})),
            ],
        );
        assert_eq!(
            g.targets(),
            vec![
                (ObjectType::TrayDevice, "0001".to_owned()),
                (ObjectType::MapSensor, "0001".to_owned()),
            ]
        );
    }
}
