// ── Undo/redo orchestration ──
//
// Applies Action groups through the store, runs one validation pass per
// group after it commits, and keeps the undo and redo stacks. Hardware
// deletes are purged from both stacks; zone id promotions are rewritten
// into them.

use tracing::{debug, info};

use crate::action::{ActionGroup, DispatchMode};
use crate::error::StoreResult;
use crate::model::ObjectType;
use crate::store::{Applied, Store};
use crate::validate::run_validators;

pub const DEFAULT_UNDO_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: Vec<ActionGroup>,
    redo_stack: Vec<ActionGroup>,
    limit: usize,
}

impl UndoManager {
    /// `limit` caps the undo stack; the oldest group falls off first.
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Apply a user group, validate it, and make it undoable.
    pub fn enact(&mut self, store: &mut Store, group: ActionGroup) -> StoreResult<Applied> {
        let applied = store.enact(&group)?;
        run_validators(store, &group.targets());

        if !group.is_empty() {
            debug!(description = %group.description, "recording group");
            self.undo_stack.push(group);
            if self.undo_stack.len() > self.limit {
                self.undo_stack.remove(0);
            }
            self.redo_stack.clear();
        }
        self.settle(&applied);
        Ok(applied)
    }

    /// Apply a server-origin group. Validated, never recorded.
    pub fn apply_server(&mut self, store: &mut Store, group: &ActionGroup) -> StoreResult<Applied> {
        let applied = store.enact(group)?;
        run_validators(store, &group.targets());
        self.settle(&applied);
        Ok(applied)
    }

    /// Reverse the newest group. Returns `false` when there is none.
    pub fn undo(&mut self, store: &mut Store) -> StoreResult<bool> {
        let Some(group) = self.undo_stack.pop() else {
            return Ok(false);
        };
        let applied = match store.retract(&group) {
            Ok(applied) => applied,
            Err(err) => {
                self.undo_stack.push(group);
                return Err(err);
            }
        };
        let mut targets = group.targets();
        targets.reverse();
        run_validators(store, &targets);

        debug!(description = %group.description, "undone");
        self.redo_stack.push(group);
        self.settle(&applied);
        Ok(true)
    }

    /// Re-apply the newest undone group. Returns `false` when there is none.
    pub fn redo(&mut self, store: &mut Store) -> StoreResult<bool> {
        let Some(group) = self.redo_stack.pop() else {
            return Ok(false);
        };
        let applied = match store.dispatch_all(&group.actions, DispatchMode::Redo) {
            Ok(applied) => applied,
            Err(err) => {
                self.redo_stack.push(group);
                return Err(err);
            }
        };
        run_validators(store, &group.targets());

        debug!(description = %group.description, "redone");
        self.undo_stack.push(group);
        self.settle(&applied);
        Ok(true)
    }

    /// Drop every recorded Action on `(object_type, id)`. Groups left
    /// empty are dropped too.
    pub fn purge_object(&mut self, object_type: ObjectType, id: &str) {
        let mut dropped = 0;
        for stack in [&mut self.undo_stack, &mut self.redo_stack] {
            for group in stack.iter_mut() {
                let before = group.actions.len();
                group
                    .actions
                    .retain(|a| !(a.object_type == object_type && a.object_id == id));
                dropped += before - group.actions.len();
            }
            stack.retain(|g| !g.is_empty());
        }
        if dropped > 0 {
            info!(kind = %object_type, id, dropped, "purged hardware-deleted object from history");
        }
    }

    /// Rewrite recorded Actions from `from` to `to`.
    pub fn rekey_object(&mut self, object_type: ObjectType, from: &str, to: &str) {
        let actions = self
            .undo_stack
            .iter_mut()
            .chain(self.redo_stack.iter_mut())
            .flat_map(|g| g.actions.iter_mut());
        for action in actions {
            if action.object_type == object_type && action.object_id == from {
                to.clone_into(&mut action.object_id);
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|g| g.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|g| g.description.as_str())
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn settle(&mut self, applied: &Applied) {
        for (object_type, id) in &applied.hard_deleted {
            self.purge_object(*object_type, id);
        }
        for (from, to) in &applied.promoted {
            self.rekey_object(ObjectType::SensorZone, from, to);
        }
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}
