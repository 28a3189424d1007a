//! # mtree-token
//! The collection state machine: ownership ledger, open mint, the transfer
//! hook that ages trees, the stag/hare hunt game, claims, palette and marker
//! administration, and the rendering entry points.

pub mod collection;
pub mod service;

pub use collection::TreeCollection;
pub use service::TreeService;
