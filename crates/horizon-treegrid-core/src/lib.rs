//! Core systems for Horizon TreeGrid.
//!
//! This crate provides the infrastructure the tree grid engines are built on:
//!
//! - **Signal/Slot System**: Type-safe change notification between engines
//! - **Change Queue**: Re-entrancy safe, in-order processing of deferred changes
//! - **Logging**: `tracing` targets and debug outlines for flattened trees
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_treegrid_core::Signal;
//!
//! let rows_changed = Signal::<usize>::new();
//!
//! let conn_id = rows_changed.connect(|count| {
//!     println!("{} rows changed", count);
//! });
//!
//! rows_changed.emit(3);
//! rows_changed.disconnect(conn_id);
//! ```
//!
//! # Change Queue Example
//!
//! ```
//! use horizon_treegrid_core::ChangeQueue;
//!
//! let queue = ChangeQueue::new();
//! queue.push(1);
//! queue.push(2);
//!
//! let mut seen = Vec::new();
//! assert!(queue.drain(|item| seen.push(item)));
//! assert_eq!(seen, vec![1, 2]);
//! ```

pub mod dispatch;
pub mod logging;
pub mod signal;

pub use dispatch::ChangeQueue;
pub use logging::{format_outline, TreeStyle};
pub use signal::{ConnectionId, Signal, SlotPriority};
