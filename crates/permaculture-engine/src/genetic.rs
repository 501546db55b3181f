//! Genetic algorithm evolving planting layouts.
//!
//! This module implements a generational genetic algorithm with truncation
//! selection, single-point crossover, per-label mutation and single-individual
//! elitism.
//!
//! # Algorithm Overview
//!
//! 1. **Initialize** - Create `population_size` random candidates, score and sort them
//! 2. **Report** - Pass the current generation to the progress callback
//! 3. **Truncation Selection** - The top half of the population forms the breeding pool
//! 4. **Crossover** - Two parents drawn uniformly (with replacement) from the pool are spliced
//! 5. **Mutation** - Each label of the child is replaced with probability `mutation_rate`
//! 6. **Elitism** - The best individual joins the next generation unchanged
//! 7. **Evaluate** - All individuals are scored and sorted; repeat from 2
//!
//! The search runs for exactly `generations` iterations; there is no early stop.
//!
//! # Key Components
//!
//! - [`Individual`] - A candidate layout and its fitness score
//! - [`Population`] - Individuals sorted by descending fitness
//! - [`Evolver`] - Search parameters and the driving loop
//! - [`Progress`] - Snapshot passed to the progress callback once per generation
//!
//! # Ordering
//!
//! Populations are sorted with a single stable descending sort. Individuals with
//! equal fitness keep their creation order (offspring first, elite last), which is
//! arbitrary but reproducible for a fixed random seed.
//!
//! # Example
//!
//! ```rust,ignore
//! use permaculture_engine::{fitness::Scorer, genetic::Evolver};
//!
//! let scorer = Scorer::new(model)?;
//! let mut rng = rand_pcg::Pcg64::seed_from_u64(42);
//! let population = Evolver::default().evolve(&types, size, &scorer, &mut rng, |progress| {
//!     eprintln!("#{}: {}", progress.generation, progress.best().fitness());
//! })?;
//! ```

use rand::Rng;

use crate::{
    ConfigError, EvolveError, FitnessError, fitness::FitnessFunction, operators,
    stats::FitnessStats,
};

/// A candidate layout and its fitness score.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual<T> {
    candidate: Vec<T>,
    fitness: f64,
}

impl<T> Individual<T> {
    /// Scores `candidate` and wraps it with its fitness.
    pub fn evaluate<F>(candidate: Vec<T>, fitness: &F) -> Result<Self, FitnessError>
    where
        F: FitnessFunction<T> + ?Sized,
    {
        let fitness = fitness.fitness(&candidate)?;
        Ok(Self { candidate, fitness })
    }

    /// Returns the labels of this individual, in row-major order.
    #[must_use]
    pub fn candidate(&self) -> &[T] {
        &self.candidate
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    #[must_use]
    pub fn into_candidate(self) -> Vec<T> {
        self.candidate
    }
}

/// Individuals of one generation, sorted by fitness in descending order.
#[derive(Debug, Clone, PartialEq)]
pub struct Population<T> {
    individuals: Vec<Individual<T>>,
}

impl<T> Population<T> {
    /// Scores all candidates and sorts them, best first.
    pub fn evaluate<F>(candidates: Vec<Vec<T>>, fitness: &F) -> Result<Self, FitnessError>
    where
        F: FitnessFunction<T> + ?Sized,
    {
        let mut individuals = candidates
            .into_iter()
            .map(|candidate| Individual::evaluate(candidate, fitness))
            .collect::<Result<Vec<_>, _>>()?;
        // stable: equal scores keep their input order
        individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        Ok(Self { individuals })
    }

    /// Creates a scored population of `count` random candidates.
    pub fn random<F, R>(
        types: &[T],
        length: usize,
        count: usize,
        fitness: &F,
        rng: &mut R,
    ) -> Result<Self, FitnessError>
    where
        T: Clone,
        F: FitnessFunction<T> + ?Sized,
        R: Rng + ?Sized,
    {
        let candidates = operators::random_population(types, length, count, rng);
        Self::evaluate(candidates, fitness)
    }

    /// Returns all individuals, best first.
    #[must_use]
    pub fn individuals(&self) -> &[Individual<T>] {
        &self.individuals
    }

    /// Returns the individual with the highest fitness.
    ///
    /// # Panics
    ///
    /// Panics if the population is empty.
    #[must_use]
    pub fn best(&self) -> &Individual<T> {
        &self.individuals[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Computes descriptive statistics of the fitness distribution.
    ///
    /// Returns `None` for an empty population.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<FitnessStats> {
        FitnessStats::new(self.individuals.iter().map(Individual::fitness))
    }

    #[must_use]
    pub fn into_individuals(self) -> Vec<Individual<T>> {
        self.individuals
    }
}

/// State of the search passed to the progress callback.
#[derive(Debug)]
pub struct Progress<'a, T> {
    /// Index of the current generation; the initial population is generation 0.
    pub generation: usize,
    pub population: &'a Population<T>,
}

impl<'a, T> Progress<'a, T> {
    /// Returns the best individual of the current generation.
    #[must_use]
    pub fn best(&self) -> &'a Individual<T> {
        self.population.best()
    }
}

/// Genetic algorithm parameters and driving loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evolver {
    /// Number of generation transitions to perform
    pub generations: usize,
    /// Number of individuals in every generation (at least 2)
    pub population_size: usize,
    /// Probability of replacing each label of an offspring
    pub mutation_rate: f64,
}

impl Default for Evolver {
    fn default() -> Self {
        Self {
            generations: 100,
            population_size: 20,
            mutation_rate: 0.1,
        }
    }
}

impl Evolver {
    /// Checks that the parameters allow a search over `types` with candidates of
    /// `length` labels.
    pub fn validate<T>(&self, types: &[T], length: usize) -> Result<(), ConfigError> {
        if types.is_empty() {
            return Err(ConfigError::EmptyTypes);
        }
        if length == 0 {
            return Err(ConfigError::ZeroLength);
        }
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall {
                size: self.population_size,
            });
        }
        if self.mutation_rate.is_nan() {
            return Err(ConfigError::InvalidMutationRate {
                rate: self.mutation_rate,
            });
        }
        Ok(())
    }

    /// Runs the search and returns the final population, best first.
    ///
    /// `on_progress` is called once per generation transition, before the
    /// transition, with the current generation. With `generations == 0` the
    /// callback is never called and the initial sorted population is returned.
    ///
    /// # Arguments
    ///
    /// * `types` - Labels a cell may hold
    /// * `length` - Number of cells in a candidate
    /// * `fitness` - Fitness function (typically a memoizing [`Scorer`](crate::fitness::Scorer))
    /// * `rng` - Random number generator used for all sampling
    /// * `on_progress` - Progress callback
    pub fn evolve<T, F, R, C>(
        &self,
        types: &[T],
        length: usize,
        fitness: &F,
        rng: &mut R,
        mut on_progress: C,
    ) -> Result<Population<T>, EvolveError>
    where
        T: Clone + PartialEq,
        F: FitnessFunction<T> + ?Sized,
        R: Rng + ?Sized,
        C: FnMut(&Progress<'_, T>),
    {
        self.validate(types, length)?;

        let mut population = Population::random(types, length, self.population_size, fitness, rng)?;
        for generation in 0..self.generations {
            on_progress(&Progress {
                generation,
                population: &population,
            });
            if let Some(stats) = population.fitness_stats() {
                log::debug!(
                    "generation {generation}: best {:.3}, mean {:.3}, min {:.3}",
                    stats.max,
                    stats.mean,
                    stats.min,
                );
            }
            population = self.next_generation(&population, types, fitness, rng)?;
        }

        log::info!(
            "search finished after {} generations with best fitness {:.3}",
            self.generations,
            population.best().fitness(),
        );
        Ok(population)
    }

    /// Runs the search without a progress callback.
    pub fn evolve_silently<T, F, R>(
        &self,
        types: &[T],
        length: usize,
        fitness: &F,
        rng: &mut R,
    ) -> Result<Population<T>, EvolveError>
    where
        T: Clone + PartialEq,
        F: FitnessFunction<T> + ?Sized,
        R: Rng + ?Sized,
    {
        self.evolve(types, length, fitness, rng, |_| {})
    }

    /// Produces the next generation from `population`.
    ///
    /// 1. The top `population_size / 2` individuals form the breeding pool
    /// 2. `population_size - 1` offspring are created by crossover of two parents drawn
    ///    uniformly with replacement from the pool, followed by mutation
    /// 3. The best individual is appended unchanged
    /// 4. All individuals are scored and sorted, best first
    ///
    /// # Panics
    ///
    /// Panics if `population` has fewer than 2 individuals or is not sorted by
    /// fitness in descending order.
    pub fn next_generation<T, F, R>(
        &self,
        population: &Population<T>,
        types: &[T],
        fitness: &F,
        rng: &mut R,
    ) -> Result<Population<T>, FitnessError>
    where
        T: Clone + PartialEq,
        F: FitnessFunction<T> + ?Sized,
        R: Rng + ?Sized,
    {
        let individuals = population.individuals();
        assert!(individuals.len() >= 2);
        assert!(individuals.is_sorted_by(|a, b| a.fitness.total_cmp(&b.fitness).is_ge()));

        let pool = &individuals[..individuals.len() / 2];
        let mut candidates = Vec::with_capacity(individuals.len());
        for _ in 1..individuals.len() {
            let p1 = select_parent(pool, rng);
            let p2 = select_parent(pool, rng);
            let mut child = operators::crossover(&p1.candidate, &p2.candidate, rng);
            operators::mutate(&mut child, types, self.mutation_rate, rng);
            candidates.push(child);
        }

        // elitism
        candidates.push(population.best().candidate.clone());

        Population::evaluate(candidates, fitness)
    }
}

/// Draws a parent uniformly at random from the breeding pool.
fn select_parent<'a, T, R>(pool: &'a [Individual<T>], rng: &mut R) -> &'a Individual<T>
where
    R: Rng + ?Sized,
{
    &pool[rng.random_range(0..pool.len())]
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    #[expect(clippy::cast_precision_loss)]
    fn count_ones(candidate: &[u8]) -> f64 {
        candidate.iter().filter(|v| **v == 1).count() as f64
    }

    #[test]
    fn test_default_parameters() {
        let evolver = Evolver::default();
        assert_eq!(evolver.generations, 100);
        assert_eq!(evolver.population_size, 20);
        assert!((evolver.mutation_rate - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_bad_configuration() {
        let evolver = Evolver::default();
        assert_eq!(
            evolver.validate::<u8>(&[], 4),
            Err(ConfigError::EmptyTypes)
        );
        assert_eq!(evolver.validate(&[0, 1], 0), Err(ConfigError::ZeroLength));

        let small = Evolver {
            population_size: 1,
            ..evolver
        };
        assert_eq!(
            small.validate(&[0, 1], 4),
            Err(ConfigError::PopulationTooSmall { size: 1 })
        );

        let nan = Evolver {
            mutation_rate: f64::NAN,
            ..evolver
        };
        assert!(matches!(
            nan.validate(&[0, 1], 4),
            Err(ConfigError::InvalidMutationRate { .. })
        ));

        let out_of_range = Evolver {
            mutation_rate: 3.0,
            ..evolver
        };
        assert_eq!(out_of_range.validate(&[0, 1], 4), Ok(()));
    }

    #[test]
    fn test_evolve_reports_configuration_error() {
        let mut rng = Pcg64::seed_from_u64(0);
        let evolver = Evolver {
            population_size: 0,
            ..Evolver::default()
        };
        let result = evolver.evolve_silently(&[0_u8, 1], 4, &count_ones, &mut rng);
        assert_eq!(
            result,
            Err(EvolveError::Config(ConfigError::PopulationTooSmall { size: 0 }))
        );
    }

    #[test]
    fn test_population_is_sorted_descending() {
        let mut rng = Pcg64::seed_from_u64(1);
        let population = Population::random(&[0_u8, 1], 10, 25, &count_ones, &mut rng).unwrap();
        assert_eq!(population.len(), 25);
        assert!(
            population
                .individuals()
                .is_sorted_by(|a, b| a.fitness() >= b.fitness())
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_fitness() {
        let constant = |_: &[u8]| 1.0;
        let candidates = vec![vec![0], vec![1], vec![2]];
        let population = Population::evaluate(candidates.clone(), &constant).unwrap();
        let order = population
            .into_individuals()
            .into_iter()
            .map(Individual::into_candidate)
            .collect::<Vec<_>>();
        assert_eq!(order, candidates);
    }

    #[test]
    fn test_next_generation_keeps_size_and_elite() {
        let mut rng = Pcg64::seed_from_u64(2);
        let evolver = Evolver {
            population_size: 8,
            mutation_rate: 0.5,
            ..Evolver::default()
        };
        let types = [0_u8, 1, 2];
        let population = Population::random(&types, 12, 8, &count_ones, &mut rng).unwrap();
        let next = evolver
            .next_generation(&population, &types, &count_ones, &mut rng)
            .unwrap();

        assert_eq!(next.len(), population.len());
        assert!(next.best().fitness() >= population.best().fitness());
        assert!(
            next.individuals()
                .iter()
                .any(|ind| ind.candidate() == population.best().candidate())
        );
    }

    #[test]
    fn test_offspring_descend_from_breeding_pool() {
        // With no mutation, every offspring label at every position must come from
        // a member of the top half.
        let mut rng = Pcg64::seed_from_u64(3);
        let evolver = Evolver {
            population_size: 10,
            mutation_rate: 0.0,
            ..Evolver::default()
        };
        let types = [0_u8, 1, 2, 3];
        let population = Population::random(&types, 6, 10, &count_ones, &mut rng).unwrap();
        let pool = &population.individuals()[..5];
        let next = evolver
            .next_generation(&population, &types, &count_ones, &mut rng)
            .unwrap();
        for ind in next.individuals() {
            for (i, label) in ind.candidate().iter().enumerate() {
                assert!(pool.iter().any(|p| p.candidate()[i] == *label));
            }
        }
    }

    #[test]
    fn test_progress_called_once_per_generation() {
        let mut rng = Pcg64::seed_from_u64(4);
        let evolver = Evolver {
            generations: 7,
            population_size: 6,
            mutation_rate: 0.2,
        };
        let mut seen = vec![];
        evolver
            .evolve(&[0_u8, 1], 5, &count_ones, &mut rng, |progress| {
                assert_eq!(progress.population.len(), 6);
                seen.push(progress.generation);
            })
            .unwrap();
        assert_eq!(seen, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_generations_returns_initial_population() {
        let types = [0_u8, 1, 2];
        let evolver = Evolver {
            generations: 0,
            ..Evolver::default()
        };
        let mut calls = 0;
        let result = evolver
            .evolve(&types, 9, &count_ones, &mut Pcg64::seed_from_u64(5), |_| {
                calls += 1;
            })
            .unwrap();
        let initial = Population::random(
            &types,
            9,
            evolver.population_size,
            &count_ones,
            &mut Pcg64::seed_from_u64(5),
        )
        .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(result, initial);
    }

    #[test]
    fn test_best_fitness_never_decreases() {
        for seed in 0..20 {
            let mut rng = Pcg64::seed_from_u64(seed);
            let evolver = Evolver {
                generations: 40,
                population_size: 6,
                mutation_rate: 0.3,
            };
            let mut best = f64::MIN;
            evolver
                .evolve(&[0_u8, 1, 2], 8, &count_ones, &mut rng, |progress| {
                    assert!(progress.best().fitness() >= best);
                    best = progress.best().fitness();
                })
                .unwrap();
        }
    }

    #[test]
    fn test_fitness_error_aborts_search() {
        struct Failing;
        impl FitnessFunction<u8> for Failing {
            fn fitness(&self, _candidate: &[u8]) -> Result<f64, FitnessError> {
                Err(FitnessError::UnknownLabel {
                    label: "x".to_owned(),
                })
            }
        }
        let mut rng = Pcg64::seed_from_u64(6);
        let result = Evolver::default().evolve_silently(&[0_u8], 3, &Failing, &mut rng);
        assert!(matches!(result, Err(EvolveError::Fitness(_))));
    }
}
