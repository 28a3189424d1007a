//! Thread-safe facade over [`TreeCollection`].
//!
//! One writer lock around the whole collection. Every mutation is a short
//! in-memory state transition, so a single `parking_lot::RwLock` is cheaper
//! than finer-grained locking and keeps the game's invariants trivially
//! atomic.

use parking_lot::RwLock;

use mtree_core::error::TreeError;
use mtree_core::types::{Address, BlockHeight, Marker, TokenId, TreeState, Wei};
use mtree_growth::Projection;

use crate::collection::TreeCollection;

pub struct TreeService {
    inner: RwLock<TreeCollection>,
}

impl TreeService {
    pub fn new(collection: TreeCollection) -> Self {
        Self {
            inner: RwLock::new(collection),
        }
    }

    // --- reads ---

    pub fn owner_of(&self, token_id: TokenId) -> Result<Address, TreeError> {
        self.inner.read().owner_of(token_id)
    }

    pub fn balance_of(&self, holder: Address) -> u64 {
        self.inner.read().balance_of(holder)
    }

    pub fn total_supply(&self) -> u64 {
        self.inner.read().total_supply()
    }

    pub fn state_of(&self, token_id: TokenId) -> Result<TreeState, TreeError> {
        self.inner.read().state_of(token_id)
    }

    pub fn cooperation_bps(&self) -> u64 {
        self.inner.read().cooperation_bps()
    }

    pub fn stag_hunt_started(&self) -> bool {
        self.inner.read().stag_hunt_started()
    }

    pub fn hare_price(&self) -> Wei {
        self.inner.read().hare_price()
    }

    pub fn pending_claim(&self, claimant: Address) -> u64 {
        self.inner.read().pending_claim(claimant)
    }

    pub fn total_pending_claim(&self) -> u64 {
        self.inner.read().total_pending_claim()
    }

    pub fn contract_uri(&self) -> String {
        self.inner.read().contract_uri()
    }

    pub fn projection(
        &self,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<Projection, TreeError> {
        self.inner.read().projection(token_id, current_block)
    }

    pub fn render_token(
        &self,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<String, TreeError> {
        self.inner.read().render_token(token_id, current_block)
    }

    pub fn token_metadata(
        &self,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<String, TreeError> {
        self.inner.read().token_metadata(token_id, current_block)
    }

    pub fn token_uri(
        &self,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<String, TreeError> {
        self.inner.read().token_uri(token_id, current_block)
    }

    // --- writes ---

    pub fn mint(
        &self,
        caller: Address,
        value: Wei,
        current_block: BlockHeight,
    ) -> Result<TokenId, TreeError> {
        self.inner.write().mint(caller, value, current_block)
    }

    pub fn transfer(
        &self,
        caller: Address,
        to: Address,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<(), TreeError> {
        self.inner.write().transfer(caller, to, token_id, current_block)
    }

    pub fn burn(&self, caller: Address, token_id: TokenId) -> Result<(), TreeError> {
        self.inner.write().burn(caller, token_id)
    }

    pub fn hunt_stag(
        &self,
        caller: Address,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<Vec<TokenId>, TreeError> {
        self.inner.write().hunt_stag(caller, token_id, current_block)
    }

    pub fn hunt_hare(
        &self,
        caller: Address,
        token_id: TokenId,
        value: Wei,
        current_block: BlockHeight,
    ) -> Result<TokenId, TreeError> {
        self.inner
            .write()
            .hunt_hare(caller, token_id, value, current_block)
    }

    pub fn claim(
        &self,
        caller: Address,
        count: u64,
        current_block: BlockHeight,
    ) -> Result<Vec<TokenId>, TreeError> {
        self.inner.write().claim(caller, count, current_block)
    }

    pub fn toggle_color(&self, caller: Address, token_id: TokenId) -> Result<bool, TreeError> {
        self.inner.write().toggle_color(caller, token_id)
    }

    pub fn set_founders(&self, caller: Address, founders: Address) -> Result<(), TreeError> {
        self.inner.write().set_founders(caller, founders)
    }

    pub fn set_marker(
        &self,
        caller: Address,
        token_id: TokenId,
        marker: Marker,
    ) -> Result<(), TreeError> {
        self.inner.write().set_marker(caller, token_id, marker)
    }

    pub fn set_marker_approval(
        &self,
        caller: Address,
        contract: Address,
        approved: bool,
    ) -> Result<(), TreeError> {
        self.inner
            .write()
            .set_marker_approval(caller, contract, approved)
    }

    pub fn withdraw(&self, caller: Address) -> Result<Wei, TreeError> {
        self.inner.write().withdraw(caller)
    }

    /// Run any closure against the locked collection. Escape hatch for
    /// callers that need operations without a dedicated delegate.
    pub fn with_collection<R>(&self, f: impl FnOnce(&mut TreeCollection) -> R) -> R {
        f(&mut self.inner.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtree_core::constants::OPEN_MINT_PRICE;
    use mtree_core::traits::NullOracle;
    use mtree_seeder::GenomeSeeder;
    use std::sync::Arc;

    fn service() -> TreeService {
        TreeService::new(TreeCollection::new(
            Address([100; 20]),
            Address([101; 20]),
            0,
            7,
            Box::new(GenomeSeeder),
            Box::new(NullOracle),
        ))
    }

    #[test]
    fn delegates_reads_and_writes() {
        let svc = service();
        let minter = Address([1; 20]);
        let id = svc.mint(minter, OPEN_MINT_PRICE, 10).unwrap();
        assert_eq!(svc.owner_of(id).unwrap(), minter);
        assert_eq!(svc.total_supply(), 4);
    }

    #[test]
    fn shared_across_threads() {
        let svc = Arc::new(service());
        let handles: Vec<_> = (1..=4u8)
            .map(|n| {
                let svc = Arc::clone(&svc);
                std::thread::spawn(move || {
                    svc.mint(Address([n; 20]), OPEN_MINT_PRICE, 10).unwrap();
                    svc.render_token(0, 100).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(svc.total_supply(), 3 + 4);
    }
}
