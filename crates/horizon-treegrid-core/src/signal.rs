//! Change notification for the tree grid engines.
//!
//! Every engine announces its changes through a [`Signal`]. Listeners are
//! closures that run synchronously on the thread calling
//! [`emit`](Signal::emit). [`SlotPriority::High`] listeners run first, then
//! the rest; within one priority, listeners run in the order they were
//! connected.
//!
//! - [`Signal<Args>`] - a list of listeners for one kind of change
//! - [`ConnectionId`] - handle for detaching a listener again
//! - [`SlotPriority`] - which listeners see a change first
//!
//! # Re-entrancy
//!
//! Slots are invoked without holding the connection lock. A slot may connect,
//! disconnect, or emit on the same signal while it runs. Connections made
//! during an emission are not invoked by that emission, and a slot that is
//! disconnected mid-emission is skipped if it has not run yet.
//!
//! # Example
//!
//! ```
//! use horizon_treegrid_core::Signal;
//!
//! let expanded = Signal::<String>::new();
//!
//! let id = expanded.connect(|label| {
//!     println!("expanded {}", label);
//! });
//!
//! expanded.emit("Documents".to_string());
//! assert!(expanded.disconnect(id));
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifies one listener on one [`Signal`].
    ///
    /// Engines keep these to detach from the lists they observe once the
    /// observed level is disposed.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Which listeners of a signal run first.
///
/// State that other listeners derive from (a selection that follows source
/// indices, say) connects at `High` so it is up to date before anyone reacts
/// to the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SlotPriority {
    /// Runs after every `High` listener.
    #[default]
    Normal,
    /// Runs before every `Normal` listener.
    High,
}

struct Connection<Args> {
    slot: Slot<Args>,
    priority: SlotPriority,
    sequence: u64,
}

struct Slots<Args> {
    connections: SlotMap<ConnectionId, Connection<Args>>,
    next_sequence: u64,
}

/// Listeners for one kind of change, invoked with `&Args`.
///
/// `Signal` is `Send + Sync`; slots run on whichever thread emits.
pub struct Signal<Args> {
    slots: Mutex<Slots<Args>>,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.lock().connections.len())
            .finish()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// A signal nobody listens to yet.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots {
                connections: SlotMap::with_key(),
                next_sequence: 0,
            }),
        }
    }

    /// Adds a listener and returns the handle that detaches it.
    ///
    /// ```
    /// use horizon_treegrid_core::Signal;
    ///
    /// let inserted = Signal::<usize>::new();
    /// let id = inserted.connect(|index| println!("row {} inserted", index));
    /// inserted.emit(7);
    /// inserted.disconnect(id);
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect_with_priority(slot, SlotPriority::Normal)
    }

    /// Adds a listener that runs with `priority`.
    pub fn connect_with_priority<F>(&self, slot: F, priority: SlotPriority) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let mut slots = self.slots.lock();
        let sequence = slots.next_sequence;
        slots.next_sequence += 1;
        slots.connections.insert(Connection {
            slot: Arc::new(slot),
            priority,
            sequence,
        })
    }

    /// Detaches the listener `id`. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().connections.remove(id).is_some()
    }

    /// Detaches every listener.
    pub fn disconnect_all(&self) {
        self.slots.lock().connections.clear();
    }

    /// Number of attached listeners.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().connections.len()
    }

    /// Returns `true` while `id` is attached.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.slots.lock().connections.contains_key(id)
    }

    /// Runs every attached listener with `args`.
    #[tracing::instrument(skip_all, target = "horizon_treegrid_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let mut snapshot: Vec<(SlotPriority, u64, ConnectionId, Slot<Args>)> = self
            .slots
            .lock()
            .connections
            .iter()
            .map(|(id, c)| (c.priority, c.sequence, id, Arc::clone(&c.slot)))
            .collect();
        if snapshot.is_empty() {
            return;
        }
        // Freed slot map entries are reused, so iteration order is not
        // connection order.
        snapshot.sort_unstable_by_key(|(priority, sequence, _, _)| (std::cmp::Reverse(*priority), *sequence));
        tracing::trace!(target: targets::SIGNAL, listeners = snapshot.len(), "emit");

        for (_, _, id, slot) in snapshot {
            // Detached by an earlier listener of this emission.
            if !self.is_connected(id) {
                continue;
            }
            slot(&args);
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(Signal<Vec<usize>>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn recorder<T: Clone + Send + 'static>(signal: &Signal<T>) -> (ConnectionId, Arc<Mutex<Vec<T>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = signal.connect(move |value: &T| sink.lock().push(value.clone()));
        (id, seen)
    }

    #[test]
    fn test_emit_reaches_listener() {
        let removed = Signal::<(usize, usize)>::new();
        let (_, seen) = recorder(&removed);

        removed.emit((3, 2));
        removed.emit((0, 1));
        assert_eq!(*seen.lock(), vec![(3, 2), (0, 1)]);
    }

    #[test]
    fn test_disconnected_listener_stays_silent() {
        let moved = Signal::<usize>::new();
        let (id, seen) = recorder(&moved);

        moved.emit(4);
        assert!(moved.disconnect(id));
        assert!(!moved.disconnect(id));
        assert!(!moved.is_connected(id));
        moved.emit(5);
        assert_eq!(*seen.lock(), vec![4]);
    }

    #[test]
    fn test_slots_run_in_connection_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for n in 0..3 {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(n));
        }

        assert_eq!(signal.connection_count(), 3);
        signal.emit(());
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_reconnect_after_disconnect_runs_last() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let push = |n: u32| {
            let order = order.clone();
            move |_: &()| order.lock().push(n)
        };

        let first = signal.connect(push(0));
        signal.connect(push(1));
        signal.disconnect(first);
        signal.connect(push(2));

        signal.emit(());
        assert_eq!(*order.lock(), vec![1, 2]);
    }

    #[test]
    fn test_high_priority_runs_first() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let priorities = [
            SlotPriority::Normal,
            SlotPriority::High,
            SlotPriority::Normal,
            SlotPriority::High,
        ];
        for (n, priority) in priorities.into_iter().enumerate() {
            let order = order.clone();
            signal.connect_with_priority(move |_| order.lock().push(n), priority);
        }

        signal.emit(());
        assert_eq!(*order.lock(), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_disconnect_all_detaches_levels() {
        let changed = Signal::<String>::new();
        let ids: Vec<_> = (0..4).map(|_| recorder(&changed).0).collect();

        changed.disconnect_all();
        assert_eq!(changed.connection_count(), 0);
        assert!(ids.iter().all(|id| !changed.is_connected(*id)));
    }

    #[test]
    fn test_reentrant_emit_from_slot() {
        let signal = Arc::new(Signal::<u32>::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&signal);
        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
            if value > 0 {
                if let Some(signal) = weak.upgrade() {
                    signal.emit(value - 1);
                }
            }
        });

        signal.emit(2);
        assert_eq!(*received.lock(), vec![2, 1, 0]);
    }

    #[test]
    fn test_disconnect_during_emit_skips_later_slot() {
        let signal = Arc::new(Signal::<()>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let victim = Arc::new(Mutex::new(None::<ConnectionId>));

        let weak = Arc::downgrade(&signal);
        let victim_clone = victim.clone();
        signal.connect(move |_| {
            if let (Some(signal), Some(id)) = (weak.upgrade(), *victim_clone.lock()) {
                signal.disconnect(id);
            }
        });

        let calls_clone = calls.clone();
        let id = signal.connect(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        *victim.lock() = Some(id);

        signal.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(signal.connection_count(), 1);
    }

    #[test]
    fn test_connect_during_emit_not_invoked_until_next_emit() {
        let signal = Arc::new(Signal::<()>::new());
        let late_calls = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&signal);
        let late_clone = late_calls.clone();
        let connected = Arc::new(AtomicBool::new(false));
        signal.connect(move |_| {
            if connected.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(signal) = weak.upgrade() {
                let late = late_clone.clone();
                signal.connect(move |_| {
                    late.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        signal.emit(());
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
        signal.emit(());
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }
}
