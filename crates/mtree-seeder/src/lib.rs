//! # mtree-seeder
//! Deterministic genome derivation for Merge Trees.

pub mod seeder;

pub use seeder::GenomeSeeder;
