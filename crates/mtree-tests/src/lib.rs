//! # mtree-tests
//! Shared fixtures for cross-crate scenario tests. The tests themselves live
//! under `tests/`.

pub mod helpers;
