//! Generic fan-out/fan-in transform engine
//!
//! This module applies a per-element transform to every index of an input
//! concurrently and funnels the results through a single consumer into a
//! caller-supplied sink.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  next index  ┌──────────────────┐  bounded   ┌──────────────┐
//! │ Transformer  │─────────────▶│ worker pool:     │──channel──▶│ merge loop   │──▶ sink
//! │ len()        │  (one task   │  transform(i)    │ (max in    │ (caller's    │
//! │ transform(i) │  per index)  │  check, send     │  flight)   │  thread)     │
//! └──────────────┘              └──────────────────┘            └──────────────┘
//!                                        │ first error                   ▲
//!                                        ▼                               │
//!                                 cancel context ──▶ waiter ──completion─┘
//! ```
//!
//! ## What This Module Does:
//! - **Fan-out**: exactly one task per input index, no index skipped or repeated.
//!   Tasks run on a pool of at most `max_workers` scoped threads, so inputs
//!   with hundreds of thousands of indices never need as many OS threads
//! - **Bounded buffering**: at most `max_in_flight` produced values wait in the
//!   rendezvous channel
//! - **Fail-fast**: the first error wins and cancels the shared [`Context`]
//! - **Fan-in**: a single merge loop owns the sink, so sinks need no locking
//!
//! ## What This Module Does NOT Do:
//! - Interrupt a transform that is already running; cancellation is only
//!   checked right before a value is emitted
//! - Reorder tasks: workers claim indices in ascending order, but they finish
//!   and deliver in whatever order the transforms complete
//! - Retry failed elements or aggregate multiple errors
//!
//! # Sinks
//!
//! | entry point | sink | placement |
//! |---|---|---|
//! | [`TransformGroup::run_unordered`] | [`Appender`] | arrival order |
//! | [`TransformGroup::run_unordered_batches`] | [`Appender`] | every batch item, arrival order |
//! | [`TransformGroup::run_ordered`] | [`Injector`] | position = delivery counter |
//! | [`TransformGroup::run_ordered_batches`] | [`Injector`] | first batch item, delivery counter |
//! | [`TransformGroup::run_indexed`] | [`Injector`] | position = source index |
//!
//! `run_ordered` fills a pre-sized sink in the order values *arrive*, so
//! position `i` does not necessarily hold the value for input `i`.
//!
//! # Example Usage
//!
//! ```rust
//! use fanmerge::parallel::{transform_fn, GroupConfig, TransformGroup};
//!
//! let group = TransformGroup::new(GroupConfig::default());
//! let inputs = [2u64, 3, 4];
//! let squares = transform_fn(inputs.len(), |i| Ok(inputs[i] * inputs[i]));
//!
//! let mut sink = Vec::new();
//! group.run_unordered(&squares, &mut sink).unwrap();
//! sink.sort();
//! assert_eq!(sink, vec![4, 9, 16]);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod group;
mod merge;
pub mod traits;

#[cfg(test)]
mod tests;

// Re-export main types for easier access
pub use config::{GroupConfig, DEFAULT_MAX_IN_FLIGHT};
pub use context::Context;
pub use error::TransformError;
pub use group::{TransformGroup, TransformSummary};
pub use traits::{transform_fn, Appender, Injector, TransformFn, Transformer};
