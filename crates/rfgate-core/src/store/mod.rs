// ── Action store ──
//
// Owns the denormalized device graph. All writes arrive as Actions; each
// one is applied atomically (copy-on-write collections, integrity repair,
// canonical re-ordering) and committed snapshots are broadcast through a
// `watch` channel. Validators are never run from here.

mod collection;
mod dispatch;
mod errors;
mod integrity;
mod modal;
mod ordering;
mod state;

pub use collection::EntityCollection;
pub use errors::{ValidationErrors, field_key, object_key};
pub use integrity::{remove_links_with_invalid_dst_id, remove_repeater_links_with_invalid_dst_id};
pub use modal::{Modal, ModalClass, ModalHandler, ModalStack, ModalType};
pub use state::TopState;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::action::{Action, ActionGroup, DispatchMode, ValidationAction};
use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::model::{ObjectType, Selected, UiState};
use crate::stream::StateStream;

/// What an applied Action did beyond the obvious write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    /// Records erased because the hardware is gone. Never undoable.
    pub hard_deleted: Vec<(ObjectType, String)>,
    /// Records kept but flagged `unheard`.
    pub soft_deleted: Vec<(ObjectType, String)>,
    /// Sensor zones moved from a client id to a server id (`from`, `to`).
    pub promoted: Vec<(String, String)>,
}

impl Applied {
    pub(crate) fn absorb(&mut self, other: Self) {
        self.hard_deleted.extend(other.hard_deleted);
        self.soft_deleted.extend(other.soft_deleted);
        self.promoted.extend(other.promoted);
    }
}

/// Which way a group runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Forward(DispatchMode),
    Reverse,
}

/// The device graph store. One per client session, owned by the
/// application root and passed by reference to whoever needs it.
pub struct Store {
    state: TopState,
    config: StoreConfig,
    snapshot: watch::Sender<Arc<TopState>>,
    version: u64,
    last_commit: Option<DateTime<Utc>>,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        let state = TopState::default();
        let (snapshot, _) = watch::channel(Arc::new(state.clone()));
        Self {
            state,
            config,
            snapshot,
            version: 0,
            last_commit: None,
        }
    }

    /// Close the snapshot channel. Subscribers see the stream end.
    pub fn shutdown(self) {
        info!(version = self.version, "store shut down");
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Live state, including writes not yet committed by a running group.
    pub fn state(&self) -> &TopState {
        &self.state
    }

    /// Last committed snapshot.
    pub fn top_state(&self) -> Arc<TopState> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.snapshot.subscribe())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of commits so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_commit(&self) -> Option<DateTime<Utc>> {
        self.last_commit
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Apply one Action and commit. A `Stale` Action changes nothing and
    /// is returned as the error.
    pub fn dispatch(&mut self, action: &Action, mode: DispatchMode) -> StoreResult<Applied> {
        self.run_one(action, Phase::Forward(mode))
    }

    pub fn dispatch_with(
        &mut self,
        action: &Action,
        mode: DispatchMode,
        callback: impl FnOnce(&mut Self),
    ) -> StoreResult<Applied> {
        let applied = self.dispatch(action, mode)?;
        callback(self);
        Ok(applied)
    }

    /// Apply the structural inverse of one Action and commit.
    pub fn reverse(&mut self, action: &Action) -> StoreResult<Applied> {
        self.run_one(action, Phase::Reverse)
    }

    pub fn reverse_with(
        &mut self,
        action: &Action,
        callback: impl FnOnce(&mut Self),
    ) -> StoreResult<Applied> {
        let applied = self.reverse(action)?;
        callback(self);
        Ok(applied)
    }

    /// Apply a sequence in order and commit once, after the last Action.
    pub fn dispatch_all(&mut self, actions: &[Action], mode: DispatchMode) -> StoreResult<Applied> {
        self.run_group(actions.iter(), Phase::Forward(mode))
    }

    pub fn enact(&mut self, group: &ActionGroup) -> StoreResult<Applied> {
        self.dispatch_all(&group.actions, DispatchMode::Enact)
    }

    /// `enact` followed by `callback`, which sees only the final state.
    pub fn enact_with(
        &mut self,
        group: &ActionGroup,
        callback: impl FnOnce(&mut Self),
    ) -> StoreResult<Applied> {
        let applied = self.enact(group)?;
        callback(self);
        Ok(applied)
    }

    /// Reverse every Action of a group, last first, and commit once.
    pub fn retract(&mut self, group: &ActionGroup) -> StoreResult<Applied> {
        self.run_group(group.actions.iter().rev(), Phase::Reverse)
    }

    fn step(&mut self, action: &Action, phase: Phase) -> StoreResult<Applied> {
        let payload = self.prepare(action, phase)?;
        match phase {
            Phase::Forward(_) => self.apply(action, &payload),
            Phase::Reverse => self.apply_reverse(action, &payload),
        }
    }

    fn run_one(&mut self, action: &Action, phase: Phase) -> StoreResult<Applied> {
        match self.step(action, phase) {
            Ok(applied) => {
                self.commit();
                Ok(applied)
            }
            Err(err) => {
                if err.is_stale() {
                    warn!(
                        object_type = %action.object_type,
                        object_id = %action.object_id,
                        error = %err,
                        "stale action ignored"
                    );
                }
                Err(err)
            }
        }
    }

    fn run_group<'a>(
        &mut self,
        actions: impl Iterator<Item = &'a Action>,
        phase: Phase,
    ) -> StoreResult<Applied> {
        // Dynamic payloads resolve against the state before the group runs,
        // so a record the group itself moves is still found.
        let prepared: Vec<_> = actions
            .map(|action| (action, self.prepare(action, phase)))
            .collect();

        let mut total = Applied::default();
        for (action, payload) in prepared {
            let result = payload.and_then(|payload| match phase {
                Phase::Forward(_) => self.apply(action, &payload),
                Phase::Reverse => self.apply_reverse(action, &payload),
            });
            match result {
                Ok(applied) => total.absorb(applied),
                Err(err) if err.is_stale() => {
                    warn!(
                        object_type = %action.object_type,
                        object_id = %action.object_id,
                        error = %err,
                        "skipping stale action"
                    );
                }
                Err(err) => {
                    self.commit();
                    return Err(err);
                }
            }
        }
        self.commit();
        Ok(total)
    }

    // ── Validation error maps ────────────────────────────────────────

    pub fn apply_validation(&mut self, actions: &[ValidationAction]) {
        for action in actions {
            self.state.validation_errors.apply(action);
        }
        self.commit();
    }

    pub fn replace_global_errors(&mut self, errors: ValidationErrors) {
        self.state.validation_global_errors = errors;
        self.commit();
    }

    /// Field and global results of one validation pass, in one commit.
    pub fn publish_validation(&mut self, field: &[ValidationAction], global: ValidationErrors) {
        for action in field {
            self.state.validation_errors.apply(action);
        }
        self.state.validation_global_errors = global;
        self.commit();
    }

    // ── Transient UI state ───────────────────────────────────────────

    /// Set the selection directly (not recorded in history).
    pub fn select(&mut self, selected: Option<Selected>) {
        self.state.selected = selected.filter(|s| {
            self.state
                .contains(s.selected_device_type, &s.selected_dotid)
        });
        self.commit();
    }

    pub fn set_ui_state(&mut self, ui: UiState) {
        self.state.ui = ui;
        self.commit();
    }

    // ── Modals ───────────────────────────────────────────────────────

    pub fn show_modal(&mut self, modal: Modal) {
        self.state.modals.push(modal);
        self.commit();
    }

    pub fn dismiss_modal(&mut self, class: Option<ModalClass>) -> Option<Modal> {
        let dismissed = self.state.modals.dismiss(class);
        if dismissed.is_some() {
            self.commit();
        }
        dismissed
    }

    pub fn dismiss_any_modal(&mut self, class: ModalClass) -> usize {
        let n = self.state.modals.dismiss_any(class);
        if n > 0 {
            self.commit();
        }
        n
    }

    pub fn is_any_modal(&self, class: ModalClass) -> bool {
        self.state.modals.is_any(class)
    }

    pub fn dismiss_all_modals(&mut self) {
        self.state.modals.clear();
        self.commit();
    }

    pub fn current_modal(&self) -> Option<&Modal> {
        self.state.modals.current()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn commit(&mut self) {
        self.version += 1;
        self.last_commit = Some(Utc::now());
        self.snapshot.send_replace(Arc::new(self.state.clone()));
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
