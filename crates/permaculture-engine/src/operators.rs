//! Candidate operations for the genetic algorithm.
//!
//! This module provides the functions that create and vary candidate layouts.
//! They are used by [`genetic::Evolver`](crate::genetic::Evolver) to implement
//! initialization, crossover and mutation.
//!
//! # Operations
//!
//! - **Initialization**: [`random_candidate`] and [`random_population`] sample labels uniformly
//! - **Crossover**: [`crossover`] splices two parents at a single random cut point
//! - **Mutation**: [`mutate`] replaces labels independently with a different random label
//!
//! Every function takes the random number generator as an argument, so a search is
//! reproducible when driven by a seeded generator.
//!
//! # Related
//!
//! - [`genetic`](crate::genetic) module uses these operations to evolve populations
//! - [`fitness`](crate::fitness) module scores the candidates they produce

use rand::{Rng, seq::IteratorRandom as _};

/// Generates a candidate of `length` labels, each sampled uniformly from `types`.
///
/// # Panics
///
/// Panics if `types` is empty and `length` is non-zero.
pub fn random_candidate<T, R>(types: &[T], length: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    (0..length)
        .map(|_| types[rng.random_range(0..types.len())].clone())
        .collect()
}

/// Generates `count` independent random candidates.
///
/// No uniqueness is guaranteed, either across or within candidates.
///
/// # Panics
///
/// Panics if `types` is empty and `length` is non-zero.
pub fn random_population<T, R>(types: &[T], length: usize, count: usize, rng: &mut R) -> Vec<Vec<T>>
where
    T: Clone,
    R: Rng + ?Sized,
{
    (0..count)
        .map(|_| random_candidate(types, length, rng))
        .collect()
}

/// Performs single-point crossover between two parents.
///
/// A cut point is sampled uniformly from `1..=len-1`; the child takes `p1` before
/// the cut and `p2` from the cut on. Both parents therefore always contribute at
/// least one label. Parents shorter than two labels cannot be cut, and the child
/// is a copy of `p1`.
///
/// # Panics
///
/// Panics if parents have different lengths.
///
/// # Examples
///
/// ```
/// use permaculture_engine::operators;
/// use rand::{SeedableRng as _, rngs::StdRng};
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let child = operators::crossover(&[0, 0, 0, 0], &[1, 1, 1, 1], &mut rng);
/// assert_eq!(child.len(), 4);
/// assert_eq!(child[0], 0);
/// assert_eq!(child[3], 1);
/// ```
pub fn crossover<T, R>(p1: &[T], p2: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    let len = p1.len();
    let cut = if len < 2 {
        len
    } else {
        rng.random_range(1..len)
    };
    let mut child = Vec::with_capacity(len);
    child.extend_from_slice(&p1[..cut]);
    child.extend_from_slice(&p2[cut..]);
    child
}

/// Applies per-label mutation to a candidate in-place.
///
/// For each label, with probability `rate`, the label is replaced by one sampled
/// uniformly from `types` excluding the current label. A `rate` of zero or less
/// never mutates and a `rate` of one or more always mutates. When `types` offers
/// no alternative to the current label, the label is left unchanged.
///
/// # Panics
///
/// Panics if `rate` is NaN.
pub fn mutate<T, R>(candidate: &mut [T], types: &[T], rate: f64, rng: &mut R)
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    assert!(!rate.is_nan(), "mutation rate must be a number");
    for label in candidate {
        if !should_mutate(rate, rng) {
            continue;
        }
        if let Some(replacement) = types.iter().filter(|t| *t != label).choose(rng) {
            *label = replacement.clone();
        }
    }
}

fn should_mutate<R>(rate: f64, rng: &mut R) -> bool
where
    R: Rng + ?Sized,
{
    if rate <= 0.0 {
        false
    } else if rate >= 1.0 {
        true
    } else {
        rng.random_bool(rate)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    const TYPES: [&str; 3] = ["A", "B", "C"];

    #[test]
    fn test_random_candidate_uses_only_given_types() {
        let mut rng = Pcg64::seed_from_u64(1);
        let candidate = random_candidate(&TYPES, 50, &mut rng);
        assert_eq!(candidate.len(), 50);
        assert!(candidate.iter().all(|label| TYPES.contains(label)));
    }

    #[test]
    fn test_random_population_shape() {
        let mut rng = Pcg64::seed_from_u64(2);
        let population = random_population(&TYPES, 6, 9, &mut rng);
        assert_eq!(population.len(), 9);
        assert!(population.iter().all(|c| c.len() == 6));
    }

    #[test]
    fn test_same_seed_same_candidates() {
        let a = random_population(&TYPES, 8, 4, &mut Pcg64::seed_from_u64(3));
        let b = random_population(&TYPES, 8, 4, &mut Pcg64::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_crossover_takes_prefix_from_first_parent() {
        let mut rng = Pcg64::seed_from_u64(4);
        let p1 = [1, 2, 3, 4, 5, 6];
        let p2 = [-1, -2, -3, -4, -5, -6];
        for _ in 0..200 {
            let child = crossover(&p1, &p2, &mut rng);
            assert_eq!(child.len(), p1.len());
            let cut = child.iter().position(|v| *v < 0).unwrap();
            assert!((1..p1.len()).contains(&cut));
            assert_eq!(child[..cut], p1[..cut]);
            assert_eq!(child[cut..], p2[cut..]);
        }
    }

    #[test]
    fn test_crossover_covers_every_cut_point() {
        let mut rng = Pcg64::seed_from_u64(5);
        let p1 = [0; 4];
        let p2 = [1; 4];
        let mut seen = [false; 4];
        for _ in 0..200 {
            let child = crossover(&p1, &p2, &mut rng);
            seen[child.iter().filter(|v| **v == 0).count()] = true;
        }
        assert_eq!(seen, [false, true, true, true]);
    }

    #[test]
    fn test_crossover_of_single_label_copies_first_parent() {
        let mut rng = Pcg64::seed_from_u64(6);
        assert_eq!(crossover(&["A"], &["B"], &mut rng), vec!["A"]);
    }

    #[test]
    #[should_panic(expected = "assertion `left == right` failed")]
    fn test_crossover_rejects_unequal_parents() {
        let mut rng = Pcg64::seed_from_u64(7);
        let _ = crossover(&[1, 2, 3], &[1, 2], &mut rng);
    }

    #[test]
    fn test_mutate_with_zero_rate_is_identity() {
        let mut rng = Pcg64::seed_from_u64(8);
        let original = random_candidate(&TYPES, 30, &mut rng);
        let mut candidate = original.clone();
        mutate(&mut candidate, &TYPES, 0.0, &mut rng);
        assert_eq!(candidate, original);
        mutate(&mut candidate, &TYPES, -3.0, &mut rng);
        assert_eq!(candidate, original);
    }

    #[test]
    fn test_mutate_with_full_rate_changes_every_label() {
        let mut rng = Pcg64::seed_from_u64(9);
        let original = random_candidate(&TYPES, 30, &mut rng);
        for rate in [1.0, 7.5] {
            let mut candidate = original.clone();
            mutate(&mut candidate, &TYPES, rate, &mut rng);
            for (before, after) in original.iter().zip(&candidate) {
                assert_ne!(before, after);
                assert!(TYPES.contains(after));
            }
        }
    }

    #[test]
    fn test_mutate_two_types_flips_label() {
        let mut rng = Pcg64::seed_from_u64(10);
        let mut candidate = vec!["A", "B", "A"];
        mutate(&mut candidate, &["A", "B"], 1.0, &mut rng);
        assert_eq!(candidate, vec!["B", "A", "B"]);
    }

    #[test]
    fn test_mutate_single_type_leaves_candidate_unchanged() {
        let mut rng = Pcg64::seed_from_u64(11);
        let mut candidate = vec!["A"; 5];
        mutate(&mut candidate, &["A"], 1.0, &mut rng);
        assert_eq!(candidate, vec!["A"; 5]);
    }

    #[test]
    fn test_mutate_rate_is_roughly_respected() {
        let mut rng = Pcg64::seed_from_u64(12);
        let original = vec!["A"; 10_000];
        let mut candidate = original.clone();
        mutate(&mut candidate, &TYPES, 0.1, &mut rng);
        let changed = candidate.iter().filter(|label| **label != "A").count();
        assert!((800..1200).contains(&changed), "changed = {changed}");
    }
}
