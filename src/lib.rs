//! # fanmerge - bounded fan-out/fan-in transforms
//!
//! Applies a transform to every element of an indexable input concurrently,
//! bounds how many results wait for delivery, stops on the first error, and
//! hands results to a caller-supplied sink from a single consumer.
//!
//! ## Features
//!
//! - **One task per element**: each index is transformed exactly once
//! - **Bounded rendezvous buffer**: at most `max_in_flight` buffered results,
//!   tasks run on a bounded pool of worker threads
//! - **First error wins**: the first failure cancels the shared context
//! - **Typed sinks**: appending, delivery-order injection, or index injection
//!
//! ## Quick Start
//!
//! ```bash
//! # Find hello/world sentences in a file, 20 lines per page
//! fanmerge scan --page-lines 20 book.txt
//! ```

pub mod cli;
pub mod config;
pub mod parallel;
pub mod scanner;

pub use cli::{Cli, Output};
pub use config::FanmergeConfig;
pub use parallel::{TransformError, TransformGroup};
