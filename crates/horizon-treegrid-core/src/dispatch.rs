//! Deferred, in-order processing of change notifications.
//!
//! A [`ChangeQueue`] lets an engine accept a change while it is already in the
//! middle of handling another one. The outermost caller drains the queue; any
//! change pushed by a re-entrant call is appended and handled after the
//! current one completes, so changes are always applied one at a time and in
//! arrival order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::logging::targets;

/// A FIFO of pending changes with a single active drainer.
pub struct ChangeQueue<T> {
    pending: Mutex<VecDeque<T>>,
    processing: AtomicBool,
}

impl<T> Default for ChangeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ChangeQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeQueue")
            .field("pending", &self.len())
            .field("processing", &self.is_processing())
            .finish()
    }
}

/// Clears the processing flag even if the handler panics.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<T> ChangeQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            processing: AtomicBool::new(false),
        }
    }

    /// Append a change to the back of the queue.
    pub fn push(&self, item: T) {
        self.pending.lock().push_back(item);
    }

    /// Number of changes waiting to be handled.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Check if no changes are waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Check whether a drain is currently in progress.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Handle every pending change, including changes pushed by `handler`.
    ///
    /// Returns `false` without doing anything if another drain is already in
    /// progress; that drain will pick up whatever is pending. The queue lock is
    /// never held while `handler` runs.
    pub fn drain<F>(&self, mut handler: F) -> bool
    where
        F: FnMut(T),
    {
        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::trace!(target: targets::DISPATCH, "drain already active, change deferred");
            return false;
        }
        let _guard = ProcessingGuard(&self.processing);

        let mut handled = 0usize;
        loop {
            let next = self.pending.lock().pop_front();
            match next {
                Some(item) => {
                    handler(item);
                    handled += 1;
                }
                None => break,
            }
        }
        tracing::trace!(target: targets::DISPATCH, handled, "change queue drained");
        true
    }
}

static_assertions::assert_impl_all!(ChangeQueue<usize>: Send, Sync);
