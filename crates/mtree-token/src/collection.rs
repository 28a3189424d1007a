//! Single-writer collection state.
//!
//! Every rule of the game lives here; the projection and rendering crates
//! stay pure and are only called with snapshots of this state. All entry
//! points take the caller address and the current block height explicitly,
//! so the whole machine is replayable from a call log. Validation happens
//! before any mutation: a failed call leaves the books untouched.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info};

use mtree_core::config::GrowthConfig;
use mtree_core::constants::{
    BEFORE_HUNT_SUPPLY, BPS_PRECISION, COLOR_BUCKET, COOPERATION_THRESHOLD_BPS,
    DEFAULT_BEFORE_HUNT_LIMIT_PER_ADDRESS, DEFAULT_CONTRACT_URI_HASH, FOUNDERS_PREMINE,
    HARE_BASE_PRICE, HARE_PRICE_STEP, MATURITY_TRANSFERS, OPEN_MINT_PRICE,
};
use mtree_core::error::{
    AdminError, ClaimError, HuntError, MarkerError, MintError, TokenError, TreeError,
};
use mtree_core::traits::{ComposableOracle, TreeSeeder};
use mtree_core::types::{Address, BlockHeight, Marker, TokenId, TreeGenome, TreeState, Wei};
use mtree_growth::{next_segments, project, Projection};
use mtree_render::{metadata_json, render_svg, token_uri, MarkerGlyph};

/// The whole collection: books, game state, and pluggable components.
pub struct TreeCollection {
    owner: Address,
    founders: Address,
    init_block: BlockHeight,
    entropy_salt: u64,
    config: GrowthConfig,

    seeder: Box<dyn TreeSeeder>,
    seeder_locked: bool,
    oracle: Box<dyn ComposableOracle>,

    // Ownership books.
    owners: HashMap<TokenId, Address>,
    balances: HashMap<Address, u64>,
    genomes: HashMap<TokenId, TreeGenome>,
    states: HashMap<TokenId, TreeState>,
    transfer_counts: HashMap<TokenId, u32>,
    /// Monotonic. Never reused, so a clone minted after a burn still gets a
    /// fresh id.
    next_token_id: TokenId,
    before_hunt_limit_per_address: u64,

    // Hunt game. The mature set holds trees eligible for stag consumption;
    // a hare hunt strikes its target from it until further transfers earn
    // the tree back in.
    mature: BTreeSet<TokenId>,
    decline_until: BlockHeight,
    hare_hunts: u64,
    pending_claims: HashMap<Address, u64>,
    total_pending_claim: u64,

    // Cosmetics.
    alt_palette: HashSet<u64>,
    markers: HashMap<TokenId, Marker>,
    approved_marker_contracts: HashSet<Address>,

    treasury: Wei,
    contract_uri_hash: String,
}

impl TreeCollection {
    /// Open a collection at `init_block` and premine the founders' trees
    /// (ids `0..FOUNDERS_PREMINE`).
    pub fn new(
        owner: Address,
        founders: Address,
        init_block: BlockHeight,
        entropy_salt: u64,
        seeder: Box<dyn TreeSeeder>,
        oracle: Box<dyn ComposableOracle>,
    ) -> Self {
        let mut collection = Self {
            owner,
            founders,
            init_block,
            entropy_salt,
            config: GrowthConfig::default(),
            seeder,
            seeder_locked: false,
            oracle,
            owners: HashMap::new(),
            balances: HashMap::new(),
            genomes: HashMap::new(),
            states: HashMap::new(),
            transfer_counts: HashMap::new(),
            next_token_id: 0,
            before_hunt_limit_per_address: DEFAULT_BEFORE_HUNT_LIMIT_PER_ADDRESS,
            mature: BTreeSet::new(),
            decline_until: 0,
            hare_hunts: 0,
            pending_claims: HashMap::new(),
            total_pending_claim: 0,
            alt_palette: HashSet::new(),
            markers: HashMap::new(),
            approved_marker_contracts: HashSet::new(),
            treasury: 0,
            contract_uri_hash: DEFAULT_CONTRACT_URI_HASH.to_owned(),
        };
        for _ in 0..FOUNDERS_PREMINE {
            collection.seed_to(founders, init_block);
        }
        collection
    }

    /// Override the open-phase per-address holding cap. Construction-time
    /// only.
    pub fn with_mint_limit(mut self, limit: u64) -> Self {
        self.before_hunt_limit_per_address = limit;
        self
    }

    // --- views ---

    pub fn owner_of(&self, token_id: TokenId) -> Result<Address, TreeError> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or_else(|| TokenError::Nonexistent(token_id).into())
    }

    pub fn balance_of(&self, holder: Address) -> u64 {
        self.balances.get(&holder).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u64 {
        self.owners.len() as u64
    }

    pub fn transfer_count(&self, token_id: TokenId) -> Result<u32, TreeError> {
        self.transfer_counts
            .get(&token_id)
            .copied()
            .ok_or_else(|| TokenError::Nonexistent(token_id).into())
    }

    pub fn state_of(&self, token_id: TokenId) -> Result<TreeState, TreeError> {
        self.states
            .get(&token_id)
            .copied()
            .ok_or_else(|| TokenError::Nonexistent(token_id).into())
    }

    pub fn genome_of(&self, token_id: TokenId) -> Result<TreeGenome, TreeError> {
        self.genomes
            .get(&token_id)
            .copied()
            .ok_or_else(|| TokenError::Nonexistent(token_id).into())
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    pub fn decline_until(&self) -> BlockHeight {
        self.decline_until
    }

    pub fn treasury(&self) -> Wei {
        self.treasury
    }

    pub fn pending_claim(&self, claimant: Address) -> u64 {
        self.pending_claims.get(&claimant).copied().unwrap_or(0)
    }

    /// Sum of all outstanding claims across claimants.
    pub fn total_pending_claim(&self) -> u64 {
        self.total_pending_claim
    }

    pub fn is_mature(&self, token_id: TokenId) -> bool {
        self.mature.contains(&token_id)
    }

    pub fn contract_uri(&self) -> String {
        format!("ipfs://{}", self.contract_uri_hash)
    }

    /// Minting closes (and the hunt opens) once the monotonic mint counter
    /// reaches the open-supply cap. Burns never reopen it.
    pub fn stag_hunt_started(&self) -> bool {
        self.next_token_id >= BEFORE_HUNT_SUPPLY
    }

    /// Price of the next hare hunt. Climbs with every hunt collection-wide.
    pub fn hare_price(&self) -> Wei {
        HARE_BASE_PRICE + self.hare_hunts as Wei * HARE_PRICE_STEP
    }

    fn decline_active(&self, current_block: BlockHeight) -> bool {
        self.decline_until > 0 && current_block <= self.decline_until
    }

    /// Fraction of the collection standing ready for the stag hunt, in basis
    /// points. Outstanding claims dilute it: a claimed-but-unminted tree
    /// counts against cooperation until it is redeemed.
    pub fn cooperation_bps(&self) -> u64 {
        let denominator = self.total_supply() + self.total_pending_claim;
        if denominator == 0 {
            return 0;
        }
        self.mature.len() as u64 * BPS_PRECISION / denominator
    }

    // --- mint / transfer / burn ---

    /// Mint one tree during the open phase.
    pub fn mint(
        &mut self,
        caller: Address,
        value: Wei,
        current_block: BlockHeight,
    ) -> Result<TokenId, TreeError> {
        if self.stag_hunt_started() {
            return Err(MintError::StagHuntStarted.into());
        }
        if value < OPEN_MINT_PRICE {
            return Err(MintError::BelowMinPrice {
                sent: value,
                min: OPEN_MINT_PRICE,
            }
            .into());
        }
        let held = self.balance_of(caller);
        if held >= self.before_hunt_limit_per_address {
            return Err(MintError::AboveMaxBalancePerAddress {
                held,
                limit: self.before_hunt_limit_per_address,
            }
            .into());
        }
        self.treasury += value;
        let id = self.seed_to(caller, current_block);
        info!(token_id = id, to = %caller, "minted");
        Ok(id)
    }

    /// Move a tree between holders and run the aging hook.
    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<(), TreeError> {
        let holder = self.owner_of(token_id)?;
        if holder != caller {
            return Err(TokenError::NotNftOwner.into());
        }
        self.owners.insert(token_id, to);
        *self.balances.entry(holder).or_insert(1) -= 1;
        *self.balances.entry(to).or_insert(0) += 1;
        self.after_transfer(token_id, current_block);
        debug!(token_id, from = %holder, to = %to, "transferred");
        Ok(())
    }

    /// Burn a tree. The id is never reissued.
    pub fn burn(&mut self, caller: Address, token_id: TokenId) -> Result<(), TreeError> {
        let holder = self.owner_of(token_id)?;
        if holder != caller {
            return Err(TokenError::NotNftOwner.into());
        }
        self.owners.remove(&token_id);
        self.genomes.remove(&token_id);
        self.states.remove(&token_id);
        self.transfer_counts.remove(&token_id);
        self.markers.remove(&token_id);
        self.mature.remove(&token_id);
        *self.balances.entry(holder).or_insert(1) -= 1;
        info!(token_id, from = %holder, "burned");
        Ok(())
    }

    /// Seed a brand-new tree to `to` and run the mint-time transfer hook.
    fn seed_to(&mut self, to: Address, current_block: BlockHeight) -> TokenId {
        let id = self.next_token_id;
        self.next_token_id += 1;
        let genome = self.seeder.generate(id, self.entropy_salt ^ current_block);
        self.insert_token(id, to, genome, current_block)
    }

    fn insert_token(
        &mut self,
        id: TokenId,
        to: Address,
        genome: TreeGenome,
        current_block: BlockHeight,
    ) -> TokenId {
        let minted_since = current_block.saturating_sub(self.init_block).min(u32::MAX as u64) as u32;
        self.genomes.insert(id, genome);
        self.states.insert(id, TreeState::fresh(minted_since));
        self.transfer_counts.insert(id, 0);
        self.owners.insert(id, to);
        *self.balances.entry(to).or_insert(0) += 1;
        self.after_transfer(id, current_block);
        id
    }

    /// The one place trees age: every ownership change (mint and clone
    /// included) bumps the transfer count, nudges segments, and admits the
    /// tree to the mature set once it has been passed around enough.
    fn after_transfer(&mut self, token_id: TokenId, current_block: BlockHeight) {
        let declining = self.decline_active(current_block);
        let count = self.transfer_counts.entry(token_id).or_insert(0);
        *count += 1;
        if *count >= MATURITY_TRANSFERS {
            self.mature.insert(token_id);
        }
        if let Some(state) = self.states.get_mut(&token_id) {
            state.segments = next_segments(state.segments, declining);
        }
    }

    // --- hunts and claims ---

    /// Cooperate: consume every mature tree back to its sapling stage and
    /// credit the hunter one claim per tree consumed. Returns the consumed
    /// ids in ascending order.
    pub fn hunt_stag(
        &mut self,
        caller: Address,
        token_id: TokenId,
        _current_block: BlockHeight,
    ) -> Result<Vec<TokenId>, TreeError> {
        if !self.stag_hunt_started() {
            return Err(HuntError::StagHuntNotStarted.into());
        }
        let holder = self.owner_of(token_id)?;
        if holder != caller {
            return Err(TokenError::NotNftOwner.into());
        }
        if !self.mature.contains(&token_id) {
            return Err(HuntError::NotMatureTree.into());
        }
        let cooperation = self.cooperation_bps();
        if cooperation < COOPERATION_THRESHOLD_BPS {
            return Err(HuntError::NotEnoughCooperation(cooperation).into());
        }

        let consumed: Vec<TokenId> = std::mem::take(&mut self.mature).into_iter().collect();
        for &id in &consumed {
            self.transfer_counts.insert(id, 0);
            if let Some(state) = self.states.get_mut(&id) {
                state.segments = 1;
                state.stags += 1;
            }
        }
        // A successful hunt heals the forest: the shared decline horizon and
        // every sway flag are cleared.
        self.decline_until = 0;
        for state in self.states.values_mut() {
            state.animated = false;
        }
        let count = consumed.len() as u64;
        *self.pending_claims.entry(caller).or_insert(0) += count;
        self.total_pending_claim += count;
        info!(hunter = %caller, consumed = count, cooperation, "stag hunt");
        Ok(consumed)
    }

    /// Defect: pay the ladder price to clone one of your trees and push the
    /// whole forest's decline horizon out by one window.
    pub fn hunt_hare(
        &mut self,
        caller: Address,
        token_id: TokenId,
        value: Wei,
        current_block: BlockHeight,
    ) -> Result<TokenId, TreeError> {
        if !self.stag_hunt_started() {
            return Err(HuntError::StagHuntNotStarted.into());
        }
        let holder = self.owner_of(token_id)?;
        if holder != caller {
            return Err(TokenError::NotNftOwner.into());
        }
        let price = self.hare_price();
        if value < price {
            return Err(HuntError::BelowMinPrice {
                sent: value,
                min: price,
            }
            .into());
        }
        let source_genome = self.genome_of(token_id)?;
        self.treasury += value;
        self.hare_hunts += 1;

        // Extend first so the clone is minted under an active decline and
        // lands at zero segments. The hunted tree forfeits its seat at the
        // stag hunt until it is transferred again.
        self.decline_until =
            self.decline_until.max(current_block) + self.config.growth_decline_blocks();
        self.mature.remove(&token_id);
        if let Some(state) = self.states.get_mut(&token_id) {
            state.animated = true;
            state.hares += 1;
        }
        let source_state = self.state_of(token_id)?;

        // The clone inherits the hunt tallies but not the sway: only the
        // hunted tree itself mourns in animation.
        let clone_id = self.next_token_id;
        self.next_token_id += 1;
        let clone_genome = self.seeder.clone_genome(&source_genome);
        self.insert_token(clone_id, caller, clone_genome, current_block);
        if let Some(state) = self.states.get_mut(&clone_id) {
            state.stags = source_state.stags;
            state.hares = source_state.hares;
        }
        info!(hunter = %caller, source = token_id, clone = clone_id, price, "hare hunt");
        Ok(clone_id)
    }

    /// Redeem up to `count` of the caller's pending claims as freshly seeded
    /// trees.
    pub fn claim(
        &mut self,
        caller: Address,
        count: u64,
        current_block: BlockHeight,
    ) -> Result<Vec<TokenId>, TreeError> {
        let pending = self.pending_claim(caller);
        if count == 0 || count > pending {
            return Err(ClaimError::NothingToClaim.into());
        }
        if pending == count {
            self.pending_claims.remove(&caller);
        } else {
            self.pending_claims.insert(caller, pending - count);
        }
        self.total_pending_claim -= count;
        let minted: Vec<TokenId> = (0..count)
            .map(|_| self.seed_to(caller, current_block))
            .collect();
        info!(claimant = %caller, count, "claims redeemed");
        Ok(minted)
    }

    // --- cosmetics ---

    /// Flip the alternate palette of a token's color bucket. The caller must
    /// hold both the token and the bucket's base token (the id divisible by
    /// the bucket size).
    pub fn toggle_color(&mut self, caller: Address, token_id: TokenId) -> Result<bool, TreeError> {
        let holder = self.owner_of(token_id)?;
        if holder != caller {
            return Err(TokenError::NotNftOwner.into());
        }
        let bucket = token_id / COLOR_BUCKET;
        let base = bucket * COLOR_BUCKET;
        let picker = self
            .owners
            .get(&base)
            .copied()
            .ok_or(TokenError::NotColorPicker)?;
        if picker != caller {
            return Err(TokenError::NotColorPicker.into());
        }
        let enabled = if self.alt_palette.remove(&bucket) {
            false
        } else {
            self.alt_palette.insert(bucket);
            true
        };
        debug!(bucket, enabled, "palette toggled");
        Ok(enabled)
    }

    /// Contract owner wipes every palette override.
    pub fn reset_colors(&mut self, caller: Address) -> Result<(), TreeError> {
        self.only_owner(caller)?;
        self.alt_palette.clear();
        Ok(())
    }

    /// Approve or revoke an external contract as a marker source. Approval
    /// requires the candidate to have thanked the founders: they hold at
    /// least three of its tokens. Revocation is unconditional.
    pub fn set_marker_approval(
        &mut self,
        caller: Address,
        contract: Address,
        approved: bool,
    ) -> Result<(), TreeError> {
        self.only_owner(caller)?;
        if approved {
            let held = self.oracle.balance_of(contract, self.founders);
            if held < 3 {
                return Err(MarkerError::FoundersNotThanked { held }.into());
            }
            self.approved_marker_contracts.insert(contract);
        } else {
            self.approved_marker_contracts.remove(&contract);
        }
        Ok(())
    }

    /// Attach an external token's glyph to a tree's branch tips.
    pub fn set_marker(
        &mut self,
        caller: Address,
        token_id: TokenId,
        marker: Marker,
    ) -> Result<(), TreeError> {
        let holder = self.owner_of(token_id)?;
        if holder != caller {
            return Err(TokenError::NotNftOwner.into());
        }
        if !self.approved_marker_contracts.contains(&marker.contract) {
            return Err(MarkerError::UnapprovedContract.into());
        }
        self.markers.insert(token_id, marker);
        Ok(())
    }

    pub fn clear_marker(&mut self, caller: Address, token_id: TokenId) -> Result<(), TreeError> {
        let holder = self.owner_of(token_id)?;
        if holder != caller {
            return Err(TokenError::NotNftOwner.into());
        }
        self.markers.remove(&token_id);
        Ok(())
    }

    // --- admin ---

    fn only_owner(&self, caller: Address) -> Result<(), TreeError> {
        if caller != self.owner {
            return Err(TokenError::NotContractOwner.into());
        }
        Ok(())
    }

    /// Hand the founders role to another address. Only the sitting founders
    /// may pass it on.
    pub fn set_founders(&mut self, caller: Address, founders: Address) -> Result<(), TreeError> {
        if caller != self.founders {
            return Err(TokenError::NotFounders.into());
        }
        self.founders = founders;
        Ok(())
    }

    pub fn set_seeder(
        &mut self,
        caller: Address,
        seeder: Box<dyn TreeSeeder>,
    ) -> Result<(), TreeError> {
        self.only_owner(caller)?;
        if self.seeder_locked {
            return Err(AdminError::SeederAlreadyLocked.into());
        }
        self.seeder = seeder;
        Ok(())
    }

    /// Permanently freeze the seeder. Irreversible.
    pub fn lock_seeder(&mut self, caller: Address) -> Result<(), TreeError> {
        self.only_owner(caller)?;
        self.seeder_locked = true;
        Ok(())
    }

    pub fn set_growth_divider(&mut self, caller: Address, divider: u64) -> Result<(), TreeError> {
        self.only_owner(caller)?;
        self.config.set_growth_divider(divider)?;
        Ok(())
    }

    pub fn set_growth_decline_blocks(
        &mut self,
        caller: Address,
        blocks: u64,
    ) -> Result<(), TreeError> {
        self.only_owner(caller)?;
        self.config.set_growth_decline_blocks(blocks)?;
        Ok(())
    }

    pub fn set_contract_uri_hash(
        &mut self,
        caller: Address,
        hash: String,
    ) -> Result<(), TreeError> {
        self.only_owner(caller)?;
        self.contract_uri_hash = hash;
        Ok(())
    }

    /// Drain the treasury. Owner or founders only; the proceeds go to the
    /// founders either way.
    pub fn withdraw(&mut self, caller: Address) -> Result<Wei, TreeError> {
        if caller != self.owner && caller != self.founders {
            return Err(TokenError::NotFounders.into());
        }
        let amount = self.treasury;
        self.treasury = 0;
        info!(amount, to = %self.founders, "treasury withdrawn");
        Ok(amount)
    }

    // --- rendering ---

    pub fn projection(
        &self,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<Projection, TreeError> {
        let genome = self.genome_of(token_id)?;
        let state = self.state_of(token_id)?;
        Ok(project(
            &genome,
            state.minted_since,
            self.init_block,
            self.decline_until,
            current_block,
            &self.config,
        ))
    }

    /// Resolve a tree's branch-tip glyph. External ownership is re-checked
    /// against the oracle on every call; a marker whose token moved away
    /// silently falls back to the default.
    fn marker_glyph(&self, token_id: TokenId) -> MarkerGlyph {
        let Some(marker) = self.markers.get(&token_id) else {
            return MarkerGlyph::Default;
        };
        if !self.approved_marker_contracts.contains(&marker.contract) {
            return MarkerGlyph::Default;
        }
        let holder = self.owners.get(&token_id).copied();
        if self.oracle.owner_of(marker.contract, marker.token_id) != holder {
            return MarkerGlyph::Default;
        }
        match self.oracle.glyph_of(marker.contract, marker.token_id) {
            Some(fragment) => MarkerGlyph::Custom(fragment),
            None => MarkerGlyph::Default,
        }
    }

    /// Render a token's SVG document at a block height.
    pub fn render_token(
        &self,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<String, TreeError> {
        let genome = self.genome_of(token_id)?;
        let state = self.state_of(token_id)?;
        let projection = self.projection(token_id, current_block)?;
        let glyph = self.marker_glyph(token_id);
        let alt = self.alt_palette.contains(&(token_id / COLOR_BUCKET));
        Ok(render_svg(&genome, &state, &projection, &glyph, alt))
    }

    /// The token's metadata document, with the SVG embedded.
    pub fn token_metadata(
        &self,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<String, TreeError> {
        let genome = self.genome_of(token_id)?;
        let state = self.state_of(token_id)?;
        let projection = self.projection(token_id, current_block)?;
        let svg = self.render_token(token_id, current_block)?;
        Ok(metadata_json(token_id, &genome, &state, &projection, &svg))
    }

    /// The full base64 data URI for a token.
    pub fn token_uri(
        &self,
        token_id: TokenId,
        current_block: BlockHeight,
    ) -> Result<String, TreeError> {
        let genome = self.genome_of(token_id)?;
        let state = self.state_of(token_id)?;
        let projection = self.projection(token_id, current_block)?;
        let svg = self.render_token(token_id, current_block)?;
        Ok(token_uri(token_id, &genome, &state, &projection, &svg))
    }

    /// True while the shared decline window covers `current_block`.
    pub fn is_declining(&self, current_block: BlockHeight) -> bool {
        self.decline_active(current_block)
    }
}
