//! Regex sentence scanner built on the transform engine
//!
//! A [`Book`] is split into pages and each page is scanned by its own
//! transform task. The parser shows the three sink shapes: unordered
//! appending when the number of matches is unknown, delivery-order injection
//! into a page-sized notepad, and page-indexed injection.

pub mod core;
pub mod patterns;
pub mod types;

// Re-export main types for easier access
pub use self::core::{BookParser, PageScan, ParseResult};
pub use patterns::{SentenceMatcher, DEFAULT_SENTENCE_PATTERN};
pub use types::{Book, Page, Sentence};
