// ── State subscriptions ──
//
// Observers hold a `StateStream` and see one snapshot per committed Action
// group, never an intermediate state.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::TopState;

/// A subscription to committed store snapshots.
///
/// Gives point-in-time access through [`StateStream::current`] and change
/// notification through [`StateStream::changed`] or as a `Stream`.
pub struct StateStream {
    current: Arc<TopState>,
    receiver: watch::Receiver<Arc<TopState>>,
}

impl StateStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<TopState>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// Snapshot as of the last `changed()` (or subscription).
    pub fn current(&self) -> &Arc<TopState> {
        &self.current
    }

    /// Newest committed snapshot, without marking it seen.
    pub fn latest(&self) -> Arc<TopState> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next commit. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<TopState>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::from_changes(self.receiver),
        }
    }
}

/// `Stream` adapter yielding each committed snapshot after subscription.
pub struct StateWatchStream {
    inner: WatchStream<Arc<TopState>>,
}

impl Stream for StateWatchStream {
    type Item = Arc<TopState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
