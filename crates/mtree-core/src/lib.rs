//! # mtree-core
//! Foundation types and traits for the Merge Trees engine.

pub mod config;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
