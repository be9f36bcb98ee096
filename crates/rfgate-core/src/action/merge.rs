use serde_json::Value;

/// Merge a partial payload onto a record (JSON merge-patch rules).
///
/// Objects merge key by key and recurse into nested objects such as
/// `info`; a `null` removes the key; anything else replaces the value
/// wholesale, arrays included.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(
                    target_map.entry(key.clone()).or_insert(Value::Null),
                    value,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_info_merges_instead_of_replacing() {
        let mut rec = json!({"id": "0001", "info": {"location": "N", "ccDelayMs": "10"}});
        merge_patch(&mut rec, &json!({"info": {"location": "S"}}));
        assert_eq!(
            rec,
            json!({"id": "0001", "info": {"location": "S", "ccDelayMs": "10"}})
        );
    }

    #[test]
    fn null_removes_and_arrays_replace() {
        let mut rec = json!({"info": {"rfLink": {"dstId": "SPP0"}, "ccLinks": [1, 2]}});
        merge_patch(&mut rec, &json!({"info": {"rfLink": null, "ccLinks": [3]}}));
        assert_eq!(rec, json!({"info": {"ccLinks": [3]}}));
    }

    #[test]
    fn patch_onto_non_object_starts_fresh() {
        let mut rec = Value::Null;
        merge_patch(&mut rec, &json!({"id": "SPP1"}));
        assert_eq!(rec, json!({"id": "SPP1"}));
    }
}
