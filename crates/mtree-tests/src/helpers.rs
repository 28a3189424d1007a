//! Test fixtures: deterministic wallets, a canned external-token oracle, and
//! shortcuts for driving the collection through its phases.

use std::collections::HashMap;

use parking_lot::Mutex;

use mtree_core::constants::OPEN_MINT_PRICE;
use mtree_core::traits::{ComposableOracle, NullOracle};
use mtree_core::types::{Address, BlockHeight, TokenId};
use mtree_seeder::GenomeSeeder;
use mtree_token::TreeCollection;

pub const OWNER: Address = Address([100; 20]);
pub const FOUNDERS: Address = Address([101; 20]);
pub const INIT_BLOCK: BlockHeight = 1_000;

pub fn addr(n: u8) -> Address {
    Address([n; 20])
}

/// A collection opened at [`INIT_BLOCK`] with the production seeder and no
/// external contracts.
pub fn collection() -> TreeCollection {
    TreeCollection::new(
        OWNER,
        FOUNDERS,
        INIT_BLOCK,
        0x5EED_5EED,
        Box::new(GenomeSeeder),
        Box::new(NullOracle),
    )
}

pub fn collection_with_oracle(oracle: Box<dyn ComposableOracle>) -> TreeCollection {
    TreeCollection::new(
        OWNER,
        FOUNDERS,
        INIT_BLOCK,
        0x5EED_5EED,
        Box::new(GenomeSeeder),
        oracle,
    )
}

/// Mint out the open supply across throwaway wallets so the hunt phase opens.
pub fn close_mint(c: &mut TreeCollection, block: BlockHeight) {
    let mut wallet = 1u8;
    while !c.stag_hunt_started() {
        if c.mint(addr(wallet), OPEN_MINT_PRICE, block).is_err() {
            wallet = wallet.checked_add(1).expect("ran out of test wallets");
        }
    }
}

/// Bounce a token between two ring wallets until it reaches maturity.
pub fn mature(c: &mut TreeCollection, token_id: TokenId, block: BlockHeight) {
    let mut holder = c.owner_of(token_id).unwrap();
    while !c.is_mature(token_id) {
        let next = if holder == addr(200) { addr(201) } else { addr(200) };
        c.transfer(holder, next, token_id, block).unwrap();
        holder = next;
    }
}

/// Mature enough trees (from id 0 upward) to clear the cooperation bar, then
/// return a wallet that owns a mature tree and can fire the stag hunt.
pub fn cooperate(c: &mut TreeCollection, count: u64, block: BlockHeight) -> Address {
    for id in 0..count {
        mature(c, id, block);
    }
    c.owner_of(0).unwrap()
}

/// In-memory stand-in for external token contracts: scripted owners, glyphs
/// and founder balances, with interior mutability so a test can move an
/// external token mid-scenario.
#[derive(Default)]
pub struct CannedOracle {
    owners: Mutex<HashMap<(Address, TokenId), Address>>,
    glyphs: Mutex<HashMap<(Address, TokenId), String>>,
    balances: Mutex<HashMap<(Address, Address), u64>>,
}

impl CannedOracle {
    pub fn set_owner(&self, contract: Address, token_id: TokenId, owner: Address) {
        self.owners.lock().insert((contract, token_id), owner);
    }

    pub fn set_glyph(&self, contract: Address, token_id: TokenId, glyph: &str) {
        self.glyphs
            .lock()
            .insert((contract, token_id), glyph.to_owned());
    }

    pub fn set_balance(&self, contract: Address, holder: Address, balance: u64) {
        self.balances.lock().insert((contract, holder), balance);
    }
}

impl ComposableOracle for CannedOracle {
    fn owner_of(&self, contract: Address, token_id: TokenId) -> Option<Address> {
        self.owners.lock().get(&(contract, token_id)).copied()
    }

    fn balance_of(&self, contract: Address, owner: Address) -> u64 {
        self.balances
            .lock()
            .get(&(contract, owner))
            .copied()
            .unwrap_or(0)
    }

    fn glyph_of(&self, contract: Address, token_id: TokenId) -> Option<String> {
        self.glyphs.lock().get(&(contract, token_id)).cloned()
    }
}
