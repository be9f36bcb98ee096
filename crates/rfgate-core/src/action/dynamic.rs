// ── Live-record reconciliation for undo/redo ──
//
// Hardware fields keep changing after an Action is recorded. Replaying a
// stale snapshot would roll firmware/voltage back, so before redoing an
// ADD (or undoing a DELETE) the payload is rebuilt from the live record
// with only the Action-owned `info` spliced in.

use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::model::ObjectType;

/// Splice the Action-owned `info` of `payload` onto a copy of `live`.
///
/// Fails with a `Stale` error when the live record has no usable id.
pub fn resolve_dynamic(
    object_type: ObjectType,
    live: &Value,
    payload: &Value,
) -> StoreResult<Value> {
    let id = live.get("id").and_then(Value::as_str).unwrap_or_default();
    if id.trim().is_empty() {
        return Err(StoreError::stale(
            object_type,
            id,
            "live record has no id to reconcile against",
        ));
    }

    let mut resolved = live.clone();
    if let (Value::Object(out), Some(info)) = (&mut resolved, payload.get("info")) {
        out.insert("info".to_owned(), info.clone());
    }
    Ok(resolved)
}
