// ── Validation error maps ──
//
// Keyed message lists the UI renders next to fields (field map) or in
// the info panel (global map). Plain data, never exceptions.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::action::{UpdateType, ValidationAction};
use crate::model::ObjectType;

/// `"<objectType>-<objectId>-<fieldName>[-<index>]"`.
pub fn field_key(
    object_type: ObjectType,
    object_id: &str,
    field: &str,
    index: Option<usize>,
) -> String {
    match index {
        Some(i) => format!("{object_type}-{object_id}-{field}-{i}"),
        None => format!("{object_type}-{object_id}-{field}"),
    }
}

/// `"<objectType>-<objectId>"`, used by the global map.
pub fn object_key(object_type: ObjectType, object_id: &str) -> String {
    format!("{object_type}-{object_id}")
}

/// Map from error key to its ordered messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Arc<BTreeMap<String, Vec<String>>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of messages across all keys.
    pub fn message_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Append a message under `key`, skipping exact duplicates.
    pub fn push(&mut self, key: String, message: impl Into<String>) {
        let message = message.into();
        let list = Arc::make_mut(&mut self.0).entry(key).or_default();
        if !list.contains(&message) {
            list.push(message);
        }
    }

    /// Drop every key belonging to one object, field keys included.
    pub fn clear_object(&mut self, object_type: ObjectType, object_id: &str) {
        let exact = object_key(object_type, object_id);
        let prefix = format!("{exact}-");
        if self.0.keys().any(|k| *k == exact || k.starts_with(&prefix)) {
            Arc::make_mut(&mut self.0).retain(|k, _| *k != exact && !k.starts_with(&prefix));
        }
    }

    pub fn apply(&mut self, action: &ValidationAction) {
        match action.update_type {
            UpdateType::Add => self.push(action.field_id.clone(), action.err_msg.clone()),
            UpdateType::Update => {
                Arc::make_mut(&mut self.0)
                    .insert(action.field_id.clone(), vec![action.err_msg.clone()]);
            }
            UpdateType::Delete => match (action.error_on_type, action.error_on_id.as_deref()) {
                (Some(ot), Some(id)) => self.clear_object(ot, id),
                _ => {
                    if self.0.contains_key(&action.field_id) {
                        Arc::make_mut(&mut self.0).remove(&action.field_id);
                    }
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_the_documented_shape() {
        assert_eq!(
            field_key(ObjectType::SensorZone, "sz1", "spacingsMm", Some(1)),
            "SENSOR_ZONE-sz1-spacingsMm-1"
        );
        assert_eq!(field_key(ObjectType::Ap, "AP", "hostname", None), "AP-AP-hostname");
        assert_eq!(object_key(ObjectType::Radio, "SPP0"), "RADIO-SPP0");
    }

    #[test]
    fn clear_object_only_touches_that_object() {
        let mut errs = ValidationErrors::new();
        errs.push(field_key(ObjectType::ExCard, "S3-S1", "location", None), "bad");
        errs.push(field_key(ObjectType::ExCard, "S3-S12", "location", None), "bad");
        errs.push(object_key(ObjectType::ExCard, "S3-S1"), "global");

        errs.apply(&ValidationAction::clear_object(ObjectType::ExCard, "S3-S1"));
        assert_eq!(errs.len(), 1);
        assert!(errs.contains_key("EX_CARD-S3-S12-location"));
    }

    #[test]
    fn add_update_and_single_delete() {
        let key = field_key(ObjectType::MapSensor, "0001", "ccDelayMs", None);
        let mut errs = ValidationErrors::new();
        errs.apply(&ValidationAction::add(ObjectType::MapSensor, key.clone(), "a"));
        errs.apply(&ValidationAction::add(ObjectType::MapSensor, key.clone(), "b"));
        errs.apply(&ValidationAction::add(ObjectType::MapSensor, key.clone(), "b"));
        assert_eq!(errs.get(&key).unwrap(), ["a", "b"]);

        let mut update = ValidationAction::add(ObjectType::MapSensor, key.clone(), "c");
        update.update_type = UpdateType::Update;
        errs.apply(&update);
        assert_eq!(errs.get(&key).unwrap(), ["c"]);

        let mut delete = ValidationAction::add(ObjectType::MapSensor, key.clone(), "");
        delete.update_type = UpdateType::Delete;
        errs.apply(&delete);
        assert!(errs.is_empty());
    }
}
