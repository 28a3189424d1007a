//! Collection lifecycle: premine, open mint, growth over blocks, cosmetics,
//! composable markers through a scripted oracle.

use std::sync::Arc;

use mtree_core::constants::{
    BEFORE_HUNT_SUPPLY, FOUNDERS_PREMINE, MAX_LENGTH, OPEN_MINT_PRICE,
};
use mtree_core::error::{MarkerError, TokenError, TreeError};
use mtree_core::types::Marker;
use mtree_growth::GrowthPhase;
use mtree_tests::helpers::{
    addr, close_mint, collection, collection_with_oracle, CannedOracle, FOUNDERS, INIT_BLOCK,
    OWNER,
};

#[test]
fn premine_then_open_mint_then_close() {
    let mut c = collection();
    assert_eq!(c.total_supply(), FOUNDERS_PREMINE);
    assert_eq!(c.balance_of(FOUNDERS), FOUNDERS_PREMINE);

    let id = c.mint(addr(1), OPEN_MINT_PRICE, INIT_BLOCK + 5).unwrap();
    assert_eq!(id, FOUNDERS_PREMINE);
    assert!(!c.stag_hunt_started());

    close_mint(&mut c, INIT_BLOCK + 5);
    assert_eq!(c.total_supply(), BEFORE_HUNT_SUPPLY);
    assert!(c.stag_hunt_started());
}

#[test]
fn trees_grow_with_the_chain() {
    let c = collection();
    let divider = c.config().growth_divider();
    let early = c.projection(0, INIT_BLOCK).unwrap();
    let later = c.projection(0, INIT_BLOCK + 40 * divider).unwrap();
    assert_eq!(early.phase, GrowthPhase::Growing);
    assert_eq!(later.length, (early.length + 40).min(MAX_LENGTH));

    let far = c.projection(0, INIT_BLOCK + 10_000_000 * divider).unwrap();
    assert_eq!(far.length, MAX_LENGTH);
}

#[test]
fn render_reflects_growth() {
    let c = collection();
    let divider = c.config().growth_divider();
    let young = c.render_token(0, INIT_BLOCK).unwrap();
    let old = c.render_token(0, INIT_BLOCK + 100 * divider).unwrap();
    assert!(young.starts_with("<svg"));
    assert_ne!(young, old);
    let p = c.projection(0, INIT_BLOCK + 100 * divider).unwrap();
    assert!(old.contains(&format!("translate(512, 1000) scale({})", p.length)));
}

#[test]
fn token_uri_envelope_is_nested_base64() {
    let c = collection();
    let uri = c.token_uri(1, INIT_BLOCK + 10).unwrap();
    assert!(uri.starts_with("data:application/json;base64,"));
    let json = c.token_metadata(1, INIT_BLOCK + 10).unwrap();
    assert!(json.contains("\"name\":\"Merge Tree #1\""));
    assert!(json.contains("data:image/svg+xml;base64,"));
}

#[test]
fn marker_approval_requires_thanking_the_founders() {
    let oracle = Arc::new(CannedOracle::default());
    let mut c = collection_with_oracle(Box::new(Arc::clone(&oracle)));
    let external = addr(77);

    let err = c.set_marker_approval(OWNER, external, true).unwrap_err();
    assert_eq!(err, MarkerError::FoundersNotThanked { held: 0 }.into());

    oracle.set_balance(external, FOUNDERS, 2);
    let err = c.set_marker_approval(OWNER, external, true).unwrap_err();
    assert_eq!(err, MarkerError::FoundersNotThanked { held: 2 }.into());

    oracle.set_balance(external, FOUNDERS, 3);
    c.set_marker_approval(OWNER, external, true).unwrap();
    // Revocation never needs the thanks.
    c.set_marker_approval(OWNER, external, false).unwrap();
}

#[test]
fn marker_glyph_tracks_external_ownership() {
    let oracle = Arc::new(CannedOracle::default());
    let mut c = collection_with_oracle(Box::new(Arc::clone(&oracle)));
    let external = addr(77);
    let glyph = "<path d=\"M 0 0 L 10 5 L 0 10 z\" />";

    oracle.set_balance(external, FOUNDERS, 3);
    c.set_marker_approval(OWNER, external, true).unwrap();

    let holder = addr(1);
    let id = c.mint(holder, OPEN_MINT_PRICE, INIT_BLOCK + 1).unwrap();
    oracle.set_owner(external, 9, holder);
    oracle.set_glyph(external, 9, glyph);
    c.set_marker(holder, id, Marker { contract: external, token_id: 9 })
        .unwrap();

    let svg = c.render_token(id, INIT_BLOCK + 2).unwrap();
    assert!(svg.contains(glyph));

    // The external token moves away; the very next render falls back.
    oracle.set_owner(external, 9, addr(2));
    let svg = c.render_token(id, INIT_BLOCK + 2).unwrap();
    assert!(!svg.contains(glyph));
    assert!(svg.contains("<circle cx=\"1\" cy=\"1\" r=\"1\""));

    // And it comes back just as silently.
    oracle.set_owner(external, 9, holder);
    assert!(c.render_token(id, INIT_BLOCK + 2).unwrap().contains(glyph));

    // Revoking the contract kills the glyph without touching the marker.
    c.set_marker_approval(OWNER, external, false).unwrap();
    assert!(!c.render_token(id, INIT_BLOCK + 2).unwrap().contains(glyph));
}

#[test]
fn unapproved_contract_cannot_be_a_marker() {
    let mut c = collection();
    let holder = addr(1);
    let id = c.mint(holder, OPEN_MINT_PRICE, INIT_BLOCK + 1).unwrap();
    let err = c
        .set_marker(holder, id, Marker { contract: addr(77), token_id: 0 })
        .unwrap_err();
    assert_eq!(err, MarkerError::UnapprovedContract.into());
}

#[test]
fn marker_attaches_only_by_the_holder() {
    let oracle = Arc::new(CannedOracle::default());
    let mut c = collection_with_oracle(Box::new(Arc::clone(&oracle)));
    let external = addr(77);
    oracle.set_balance(external, FOUNDERS, 3);
    c.set_marker_approval(OWNER, external, true).unwrap();

    let err = c
        .set_marker(addr(9), 0, Marker { contract: external, token_id: 1 })
        .unwrap_err();
    assert_eq!(err, TreeError::from(TokenError::NotNftOwner));
}

#[test]
fn treasury_accumulates_and_withdraws() {
    let mut c = collection();
    c.mint(addr(1), OPEN_MINT_PRICE, INIT_BLOCK + 1).unwrap();
    c.mint(addr(2), OPEN_MINT_PRICE, INIT_BLOCK + 1).unwrap();
    assert_eq!(c.treasury(), 2 * OPEN_MINT_PRICE);
    assert_eq!(c.withdraw(OWNER).unwrap(), 2 * OPEN_MINT_PRICE);
    assert_eq!(c.treasury(), 0);
}

#[test]
fn later_mints_project_from_their_own_block() {
    let mut c = collection();
    let divider = c.config().growth_divider();
    let id = c.mint(addr(1), OPEN_MINT_PRICE, INIT_BLOCK + 50 * divider).unwrap();
    // At its own mint block the new tree is at base length while the premine
    // has been growing for fifty units.
    let fresh = c.projection(id, INIT_BLOCK + 50 * divider).unwrap();
    let old = c.projection(0, INIT_BLOCK + 50 * divider).unwrap();
    let genome = c.genome_of(id).unwrap();
    assert_eq!(fresh.length, genome.init_length);
    assert_eq!(old.length, c.genome_of(0).unwrap().init_length + 50);
}
