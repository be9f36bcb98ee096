//! Device graph store and topology validation for traffic-sensor gateways.
//!
//! This crate owns the domain model and the write path for everything on
//! the gateway map: the access point, radios, repeaters, sensors, sensor
//! zones and contact-closure (CC) cards.
//!
//! - **[`Store`]**: the single writer. Every change arrives as an
//!   [`Action`] (`ADD`/`UPDATE`/`DELETE` with new and pre-image payloads)
//!   and is applied atomically: copy-on-write collections, integrity repair
//!   of dangling RF/CC links, canonical tray and cabinet ordering. Committed
//!   snapshots are published as [`TopState`].
//!
//! - **[`StateStream`]**: subscription handle vended by the store, with
//!   `current()` / `latest()` / `changed()` and a `Stream` adapter.
//!
//! - **[`validate`]**: per-object field validators and the global topology
//!   validator (RF tree capacity, hop depth, reachability, zone names).
//!   Pure functions of state, never run by the store itself.
//!
//! - **[`UndoManager`]**: applies groups, runs one validation pass per
//!   group, and keeps undo/redo history free of hardware-deleted objects.
//!
//! - **Domain model** ([`model`]): serde records whose camelCase field
//!   names match Action payloads, tagged by [`ObjectType`].

pub mod action;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;
pub mod undo;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::{Action, ActionGroup, DispatchMode, UpdateType, ValidationAction};
pub use config::{LayoutConfig, StoreConfig};
pub use error::{ErrorKind, StoreError, StoreResult};
pub use store::{Applied, Modal, ModalClass, ModalType, Store, TopState, ValidationErrors};
pub use stream::StateStream;
pub use undo::UndoManager;

// Re-export the most used model types at the crate root.
pub use model::{
    AccessPoint, CcCard, CcLink, CcMode, ObjectType, Radio, Repeater, RfLink, Selected, Sensor,
    SensorZone, TrayDevice, UiState,
};
