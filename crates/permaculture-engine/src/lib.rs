//! Genetic search engine for planting layouts.
//!
//! This crate searches for an assignment of type labels (plants) to the cells of a
//! rectangular grid that maximizes a composite fitness score. The score rewards
//! label diversity, compatibility between each label and the environmental
//! attributes of its cell, and beneficial adjacency between neighboring labels.
//!
//! # How the Search Works
//!
//! 1. **Initialization** - A population of random candidate layouts is created
//! 2. **Evaluation** - Each candidate is scored and the population is sorted (best first)
//! 3. **Selection** - The top half of the population becomes the breeding pool
//! 4. **Reproduction** - Offspring are produced by single-point crossover and per-cell mutation
//! 5. **Elitism** - The best candidate is carried into the next generation unchanged
//! 6. **Repeat** - For a fixed number of generations
//!
//! # Architecture
//!
//! ```text
//! Evolver (genetic)
//!     ↓ samples with
//! Variation operators (operators)
//!     ↓ candidates scored by
//! FitnessFunction ← Scorer (fitness, memoized)
//!     ↓ neighbor lookup via
//! Layout model (layout)
//! ```
//!
//! # Example
//!
//! ```
//! use permaculture_engine::genetic::Evolver;
//! use rand::{SeedableRng as _, rngs::StdRng};
//!
//! // Count cells labelled "A"
//! let fitness = |candidate: &[&str]| candidate.iter().filter(|l| **l == "A").count() as f64;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let evolver = Evolver {
//!     generations: 30,
//!     ..Evolver::default()
//! };
//! let population = evolver
//!     .evolve_silently(&["A", "B"], 6, &fitness, &mut rng)
//!     .unwrap();
//! assert_eq!(population.best().candidate().len(), 6);
//! ```
//!
//! # Current Limitations
//!
//! - **Single-threaded**: Candidates are scored one after another; the fitness cache
//!   is not shared between threads
//! - **Fixed budget**: The search always runs for the configured number of generations;
//!   there is no convergence detection
//! - **Single objective**: All fitness terms are summed into one scalar

pub mod fitness;
pub mod genetic;
pub mod layout;
pub mod operators;
pub mod stats;

/// Invalid search configuration, detected before any generation is produced.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("type set must contain at least one label")]
    EmptyTypes,
    #[display("candidate length must be greater than zero")]
    ZeroLength,
    #[display("population size must be at least 2 (got {size})")]
    PopulationTooSmall { size: usize },
    #[display("mutation rate must be a number (got {rate})")]
    InvalidMutationRate { rate: f64 },
    #[display("grid width must be greater than zero")]
    ZeroWidth,
}

/// Failure to score a candidate because the input data is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FitnessError {
    #[display("label '{label}' has no preferences")]
    UnknownLabel { label: String },
    #[display("label '{label}' has no preference for map '{map}'")]
    MissingPreference { label: String, map: String },
    #[display("no neighbor affinity from '{from}' to '{to}'")]
    MissingAffinity { from: String, to: String },
    #[display("map '{map}' has {actual} cells but the candidate has {expected}")]
    MapLengthMismatch {
        map: String,
        expected: usize,
        actual: usize,
    },
}

/// Error returned by a search run.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvolveError {
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),
    #[display("fitness evaluation failed: {_0}")]
    Fitness(FitnessError),
}
