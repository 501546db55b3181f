//! Fitness evaluation of planting layouts.
//!
//! The fitness of a candidate layout is the sum of three terms:
//!
//! - **Diversity** - the square of the number of distinct labels in the layout
//! - **Environment** - for every environmental map and every cell, `+2` when the
//!   label's preferred value for that map equals the cell's value, `-2` otherwise
//! - **Neighbor** - for every cell and each of its orthogonal neighbors, the affinity
//!   from the cell's label to the neighbor's label
//!
//! Adjacency is evaluated from both endpoints, so every pair of neighboring cells
//! contributes twice (once per direction). Asymmetric affinity matrices are honored:
//! the `A → B` and `B → A` entries are each added once.
//!
//! # Memoization
//!
//! [`Scorer`] wraps the raw computation with a cache keyed by the candidate itself.
//! A search revisits the same layouts often (the elite is re-scored every
//! generation, and small grids converge quickly), so cache hits are common.
//! The cache lives as long as the scorer and is never evicted.
//!
//! # Logging
//!
//! The scorer reports through an injectable [`log::Log`] implementation instead of
//! a process-wide switch. By default it uses the global logger installed by the
//! binary; tests and embedders can supply their own with [`Scorer::with_logger`].

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};

use log::{Level, Log, Metadata, Record};

use crate::{ConfigError, FitnessError, layout};

const LOG_TARGET: &str = "permaculture_engine::fitness";

/// Scores a candidate layout. Higher is better.
///
/// This is the seam between the search engine and the problem domain. It is
/// implemented by [`Scorer`] and by any closure `Fn(&[T]) -> f64`.
pub trait FitnessFunction<T> {
    fn fitness(&self, candidate: &[T]) -> Result<f64, FitnessError>;
}

impl<T, F> FitnessFunction<T> for F
where
    F: Fn(&[T]) -> f64,
{
    fn fitness(&self, candidate: &[T]) -> Result<f64, FitnessError> {
        Ok(self(candidate))
    }
}

/// Input data for fitness evaluation, in flat (row-major) form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitnessModel {
    /// Grid width, used for neighbor lookup.
    pub width: usize,
    /// Environmental maps by name (e.g. `terrain`, `light`), one value per cell.
    pub maps: BTreeMap<String, Vec<String>>,
    /// Required value per map name, by label.
    pub preferences: BTreeMap<String, BTreeMap<String, String>>,
    /// Affinity from one label (outer key) to a neighboring label (inner key).
    pub affinity: BTreeMap<String, BTreeMap<String, f64>>,
}

/// The individual terms of a fitness score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub diversity: f64,
    pub environment: f64,
    pub neighbor: f64,
}

impl ScoreBreakdown {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.diversity + self.environment + self.neighbor
    }
}

impl FitnessModel {
    /// Computes all three terms for `candidate` without caching.
    pub fn breakdown(
        &self,
        candidate: &[String],
        logger: &dyn Log,
    ) -> Result<ScoreBreakdown, FitnessError> {
        Ok(ScoreBreakdown {
            diversity: diversity_term(candidate),
            environment: self.environment_term(candidate, logger)?,
            neighbor: self.neighbor_term(candidate)?,
        })
    }

    /// Sum of `+2`/`-2` preference matches over all maps and cells.
    pub fn environment_term(
        &self,
        candidate: &[String],
        logger: &dyn Log,
    ) -> Result<f64, FitnessError> {
        let trace = enabled(logger, Level::Trace);
        let mut sum = 0.0;
        for (map_name, map) in &self.maps {
            if map.len() != candidate.len() {
                return Err(FitnessError::MapLengthMismatch {
                    map: map_name.clone(),
                    expected: candidate.len(),
                    actual: map.len(),
                });
            }
            for (label, value) in candidate.iter().zip(map) {
                let required = self
                    .preferences
                    .get(label)
                    .ok_or_else(|| FitnessError::UnknownLabel {
                        label: label.clone(),
                    })?
                    .get(map_name)
                    .ok_or_else(|| FitnessError::MissingPreference {
                        label: label.clone(),
                        map: map_name.clone(),
                    })?;
                if required == value {
                    if trace {
                        emit(logger, Level::Trace, format_args!("{label} likes {value}"));
                    }
                    sum += 2.0;
                } else {
                    sum -= 2.0;
                }
            }
        }
        Ok(sum)
    }

    /// Sum of directed neighbor affinities over all cells.
    pub fn neighbor_term(&self, candidate: &[String]) -> Result<f64, FitnessError> {
        let mut sum = 0.0;
        for (i, label) in candidate.iter().enumerate() {
            for j in layout::neighbor_indices(i, self.width, candidate.len()) {
                let neighbor = &candidate[j];
                sum += self
                    .affinity
                    .get(label)
                    .and_then(|row| row.get(neighbor))
                    .ok_or_else(|| FitnessError::MissingAffinity {
                        from: label.clone(),
                        to: neighbor.clone(),
                    })?;
            }
        }
        Ok(sum)
    }
}

/// Square of the number of distinct labels.
#[must_use]
pub fn diversity_term<T>(candidate: &[T]) -> f64
where
    T: Eq + std::hash::Hash,
{
    let distinct = candidate.iter().collect::<HashSet<_>>().len();
    #[expect(clippy::cast_precision_loss)]
    let distinct = distinct as f64;
    distinct * distinct
}

/// Memoizing fitness evaluator for one search run.
///
/// The cache uses interior mutability, so a scorer is not [`Sync`] and is meant to
/// be driven from a single thread.
pub struct Scorer<'a> {
    model: FitnessModel,
    logger: &'a dyn Log,
    cache: RefCell<HashMap<Vec<String>, f64>>,
    evaluations: Cell<usize>,
}

impl fmt::Debug for Scorer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scorer")
            .field("model", &self.model)
            .field("cache_len", &self.cache_len())
            .field("evaluations", &self.evaluations())
            .finish_non_exhaustive()
    }
}

impl Scorer<'static> {
    /// Creates a scorer that logs through the global logger.
    pub fn new(model: FitnessModel) -> Result<Self, ConfigError> {
        if model.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        Ok(Self {
            model,
            logger: log::logger(),
            cache: RefCell::default(),
            evaluations: Cell::new(0),
        })
    }
}

impl Scorer<'_> {
    /// Replaces the logger used for evaluation diagnostics.
    #[must_use]
    pub fn with_logger<'b>(self, logger: &'b dyn Log) -> Scorer<'b> {
        Scorer {
            model: self.model,
            logger,
            cache: self.cache,
            evaluations: self.evaluations,
        }
    }

    #[must_use]
    pub fn model(&self) -> &FitnessModel {
        &self.model
    }

    /// Returns the score of `candidate`, computing it only on a cache miss.
    pub fn score(&self, candidate: &[String]) -> Result<f64, FitnessError> {
        if let Some(score) = self.cache.borrow().get(candidate) {
            return Ok(*score);
        }
        let score = self.model.breakdown(candidate, self.logger)?.total();
        self.evaluations.set(self.evaluations.get() + 1);
        if enabled(self.logger, Level::Debug) {
            emit(
                self.logger,
                Level::Debug,
                format_args!("evaluated {} => {score}", candidate.join(",")),
            );
        }
        self.cache.borrow_mut().insert(candidate.to_vec(), score);
        Ok(score)
    }

    /// Computes the individual terms of `candidate`'s score, bypassing the cache.
    pub fn breakdown(&self, candidate: &[String]) -> Result<ScoreBreakdown, FitnessError> {
        self.model.breakdown(candidate, self.logger)
    }

    /// Number of raw (uncached) evaluations performed so far.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    /// Number of distinct candidates in the cache.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl FitnessFunction<String> for Scorer<'_> {
    fn fitness(&self, candidate: &[String]) -> Result<f64, FitnessError> {
        self.score(candidate)
    }
}

fn enabled(logger: &dyn Log, level: Level) -> bool {
    logger.enabled(&Metadata::builder().level(level).target(LOG_TARGET).build())
}

fn emit(logger: &dyn Log, level: Level, args: fmt::Arguments<'_>) {
    logger.log(
        &Record::builder()
            .level(level)
            .target(LOG_TARGET)
            .args(args)
            .build(),
    );
}
