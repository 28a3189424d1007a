//! mtree — Command-line explorer for the Merge Trees engine.
//!
//! Seeds genomes, renders trees to SVG at arbitrary block heights, and runs
//! a scripted hunt-cycle simulation against an in-memory collection.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use mtree_core::constants::{COOPERATION_THRESHOLD_BPS, OPEN_MINT_PRICE};
use mtree_core::traits::{NullOracle, TreeSeeder};
use mtree_core::types::Address;
use mtree_seeder::GenomeSeeder;
use mtree_token::TreeCollection;

/// Merge Trees command-line explorer.
#[derive(Parser)]
#[command(name = "mtree")]
#[command(version, about = "Grow a forest, hunt a stag.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive and print a tree genome.
    Seed(SeedArgs),
    /// Render one tree of a fresh collection to an SVG file.
    Render(RenderArgs),
    /// Print a tree's full metadata URI.
    Uri(UriArgs),
    /// Run a scripted mint / hare / stag cycle and report each step.
    Simulate(SimulateArgs),
}

#[derive(Args)]
struct SeedArgs {
    /// Token id to seed.
    token_id: u64,

    /// Entropy word mixed into the derivation.
    #[arg(short, long, default_value_t = 0)]
    entropy: u64,
}

#[derive(Args)]
struct RenderArgs {
    /// Token id within the demo collection (0..=2 are the premine).
    token_id: u64,

    /// Block height to render at.
    #[arg(short, long, default_value_t = 1)]
    block: u64,

    /// Entropy word for the demo collection's seeder.
    #[arg(short, long, default_value_t = 0)]
    entropy: u64,

    /// Output file.
    #[arg(short, long, default_value = "tree.svg")]
    out: PathBuf,
}

#[derive(Args)]
struct UriArgs {
    /// Token id within the demo collection.
    token_id: u64,

    /// Block height to render at.
    #[arg(short, long, default_value_t = 1)]
    block: u64,

    /// Entropy word for the demo collection's seeder.
    #[arg(short, long, default_value_t = 0)]
    entropy: u64,
}

#[derive(Args)]
struct SimulateArgs {
    /// Entropy word for the collection's seeder.
    #[arg(short, long, default_value_t = 0)]
    entropy: u64,

    /// Hare hunts to run before the stag hunt.
    #[arg(long, default_value_t = 2)]
    hares: u64,

    /// Blocks between scripted steps.
    #[arg(long, default_value_t = 100)]
    step_blocks: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Seed(args) => seed(args),
        Commands::Render(args) => render(args),
        Commands::Uri(args) => uri(args),
        Commands::Simulate(args) => simulate(args),
    }
}

fn addr(n: u8) -> Address {
    Address([n; 20])
}

/// A throwaway collection for offline rendering: the owner and founders are
/// fixed demo wallets and block 0 is the init block.
fn demo_collection(entropy: u64) -> TreeCollection {
    TreeCollection::new(
        addr(0xA0),
        addr(0xA1),
        0,
        entropy,
        Box::new(GenomeSeeder),
        Box::new(NullOracle),
    )
}

fn seed(args: SeedArgs) -> Result<()> {
    let genome = GenomeSeeder.generate(args.token_id, args.entropy);
    println!("{}", serde_json::to_string_pretty(&genome)?);
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let mut c = demo_collection(args.entropy);
    ensure_token(&mut c, args.token_id, args.block)?;
    let svg = c.render_token(args.token_id, args.block)?;
    fs::write(&args.out, &svg)
        .with_context(|| format!("writing {}", args.out.display()))?;
    info!(token_id = args.token_id, block = args.block, out = %args.out.display(), "rendered");
    Ok(())
}

fn uri(args: UriArgs) -> Result<()> {
    let mut c = demo_collection(args.entropy);
    ensure_token(&mut c, args.token_id, args.block)?;
    println!("{}", c.token_uri(args.token_id, args.block)?);
    Ok(())
}

/// Open-mint demo tokens until `token_id` exists.
fn ensure_token(c: &mut TreeCollection, token_id: u64, block: u64) -> Result<()> {
    let mut wallet = 1u8;
    while c.owner_of(token_id).is_err() {
        if c.mint(addr(wallet), OPEN_MINT_PRICE, block).is_err() {
            wallet = wallet
                .checked_add(1)
                .context("token id out of range for the demo collection")?;
        }
    }
    Ok(())
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let mut c = demo_collection(args.entropy);
    let mut block = 0u64;

    // Phase 1: mint out the open supply.
    let mut wallet = 1u8;
    while !c.stag_hunt_started() {
        if c.mint(addr(wallet), OPEN_MINT_PRICE, block).is_err() {
            wallet += 1;
        }
        block += 1;
    }
    println!(
        "open phase closed: supply {}, treasury {} wei",
        c.total_supply(),
        c.treasury()
    );

    // Phase 2: defect. Each hare hunt clones a tree and extends the decline.
    for n in 0..args.hares {
        block += args.step_blocks;
        let price = c.hare_price();
        let holder = c.owner_of(n)?;
        let clone = c.hunt_hare(holder, n, price, block)?;
        println!(
            "hare hunt #{n}: paid {price} wei, clone {clone}, decline until block {}",
            c.decline_until()
        );
    }
    // Phase 3: the forest matures and cooperates.
    block += args.step_blocks;
    let mut id = 0u64;
    while c.cooperation_bps() < COOPERATION_THRESHOLD_BPS {
        let mut holder = c.owner_of(id)?;
        while !c.is_mature(id) {
            let next = if holder == addr(0xC0) { addr(0xC1) } else { addr(0xC0) };
            c.transfer(holder, next, id, block)?;
            holder = next;
        }
        id += 1;
    }
    println!("cooperation at {} bps with {id} mature trees", c.cooperation_bps());

    let hunter = c.owner_of(0)?;
    let consumed = c.hunt_stag(hunter, 0, block)?;
    println!("stag hunt: consumed {} trees, hunter {hunter}", consumed.len());

    block += args.step_blocks;
    let minted = c.claim(hunter, c.pending_claim(hunter), block)?;
    println!(
        "claims redeemed: {} new trees, supply {}",
        minted.len(),
        c.total_supply()
    );
    Ok(())
}
