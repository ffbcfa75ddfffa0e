//! Command implementations for the fanmerge CLI

pub mod config;
pub mod scan;
