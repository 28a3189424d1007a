//! # mtree-growth
//! Pure projection of a tree's rendered length from recorded state and the
//! current block height.

pub mod engine;

pub use engine::{next_segments, project, GrowthPhase, Projection};
