//! Trait interfaces for the Merge Trees engine.
//!
//! These traits define the contracts between crates:
//! - [`TreeSeeder`] — deterministic genome derivation (mtree-seeder implements)
//! - [`ComposableOracle`] — external-ownership lookups for composable
//!   markers (the embedding application implements; tests use canned fakes)

use std::sync::Arc;

use crate::types::{Address, TokenId, TreeGenome};

/// Deterministic derivation of tree genomes.
///
/// `generate` must be a pure function of its inputs: identical
/// `(token_id, entropy)` pairs always yield identical genomes, and the token
/// id is folded into every field digest so distinct ids cannot collide even
/// under an identical entropy source.
///
/// The seeder is a swappable component of the collection until the owner
/// locks it.
pub trait TreeSeeder: Send + Sync {
    /// Derive the structural genome for a new token.
    fn generate(&self, token_id: TokenId, entropy: u64) -> TreeGenome;

    /// Clone a genome for a hare-hunt offspring.
    ///
    /// Structural fields (`init_length`, `diameter`, `d`, `delta`) are copied
    /// verbatim; display fields normalize to the base bucket (`angle` 30,
    /// `branches` 2).
    fn clone_genome(&self, source: &TreeGenome) -> TreeGenome;
}

/// Read-only view of an external token contract's ownership.
///
/// Queried synchronously at every render to re-validate a composable marker;
/// the result is never cached, so marker validity silently tracks external
/// ownership changes. Implementations must be side-effect-free.
pub trait ComposableOracle: Send + Sync {
    /// Current owner of `token_id` on `contract`, or `None` if it does not
    /// exist there.
    fn owner_of(&self, contract: Address, token_id: TokenId) -> Option<Address>;

    /// Number of `contract` tokens held by `owner`.
    fn balance_of(&self, contract: Address, owner: Address) -> u64;

    /// SVG glyph fragment of `token_id` on `contract`, drawn at branch tips
    /// in place of the default circle.
    fn glyph_of(&self, contract: Address, token_id: TokenId) -> Option<String>;
}

/// Shared oracle handles query through to the inner oracle, so a caller can
/// keep an `Arc` to an oracle after handing a clone to the collection.
impl<T: ComposableOracle + ?Sized> ComposableOracle for Arc<T> {
    fn owner_of(&self, contract: Address, token_id: TokenId) -> Option<Address> {
        self.as_ref().owner_of(contract, token_id)
    }

    fn balance_of(&self, contract: Address, owner: Address) -> u64 {
        self.as_ref().balance_of(contract, owner)
    }

    fn glyph_of(&self, contract: Address, token_id: TokenId) -> Option<String> {
        self.as_ref().glyph_of(contract, token_id)
    }
}

/// Oracle that knows no external contracts. Every marker falls back to the
/// default glyph.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOracle;

impl ComposableOracle for NullOracle {
    fn owner_of(&self, _contract: Address, _token_id: TokenId) -> Option<Address> {
        None
    }

    fn balance_of(&self, _contract: Address, _owner: Address) -> u64 {
        0
    }

    fn glyph_of(&self, _contract: Address, _token_id: TokenId) -> Option<String> {
        None
    }
}
