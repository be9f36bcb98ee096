// ── Store error types ──
//
// Two kinds only. `Invariant` means the caller broke the Action contract
// and the group must abort. `Stale` means the Action no longer matches
// live state (the gateway changed it underneath us); the store leaves
// state untouched and the caller logs and moves on.

use thiserror::Error;

use crate::model::ObjectType;

/// Which tier an error belongs to, for assertions that ignore wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Invariant,
    Stale,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invariant violated on {object_type} '{object_id}': {message}")]
    Invariant {
        object_type: ObjectType,
        object_id: String,
        message: String,
    },

    #[error("stale action on {object_type} '{object_id}': {reason}")]
    Stale {
        object_type: ObjectType,
        object_id: String,
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn invariant(
        object_type: ObjectType,
        object_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Invariant {
            object_type,
            object_id: object_id.into(),
            message: message.into(),
        }
    }

    pub(crate) fn stale(
        object_type: ObjectType,
        object_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Stale {
            object_type,
            object_id: object_id.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invariant { .. } => ErrorKind::Invariant,
            Self::Stale { .. } => ErrorKind::Stale,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.kind() == ErrorKind::Stale
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
