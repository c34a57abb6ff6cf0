//! Greedy selection of evenly spread three-element combinations.
//!
//! The selector is a heuristic. Each step picks the candidate that keeps the
//! per-element usage spread smallest given what is already chosen; the result
//! is not guaranteed to be an optimal balanced design.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unordered triple of distinct alphabet elements, kept in alphabet order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination([String; 3]);

impl Combination {
    pub fn members(&self) -> &[String; 3] {
        &self.0
    }

    pub fn contains(&self, element: &str) -> bool {
        self.0.iter().any(|member| member == element)
    }

    /// Space-joined label, e.g. `"Human Beaver Lizard"`.
    pub fn label(&self) -> String {
        self.0.join(" ")
    }
}

/// Every 3-combination of `alphabet` in lexicographic index order.
pub fn all_triples(alphabet: &[String]) -> Vec<Combination> {
    let n = alphabet.len();
    let mut triples = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                triples.push(Combination([
                    alphabet[i].clone(),
                    alphabet[j].clone(),
                    alphabet[k].clone(),
                ]));
            }
        }
    }
    triples
}

fn spread(usage: &BTreeMap<&str, u32>) -> u32 {
    let max = usage.values().copied().max().unwrap_or(0);
    let min = usage.values().copied().min().unwrap_or(0);
    max - min
}

pub fn select_combinations<R: Rng + ?Sized>(
    alphabet: &[String],
    count: usize,
    rng: &mut R,
) -> Vec<Combination> {
    let mut remaining = all_triples(alphabet);
    if count >= remaining.len() {
        return remaining;
    }
    if count == 0 {
        return Vec::new();
    }

    let mut usage: BTreeMap<&str, u32> = alphabet.iter().map(|e| (e.as_str(), 0)).collect();
    let mut selected = Vec::with_capacity(count);
    let first = remaining.remove(rng.gen_range(0..remaining.len()));
    record(&mut usage, &first);
    selected.push(first);

    while selected.len() < count && !remaining.is_empty() {
        let mut best: Option<(u32, usize)> = None;
        for (index, candidate) in remaining.iter().enumerate() {
            let mut trial = usage.clone();
            record(&mut trial, candidate);
            let score = spread(&trial);
            if best.map_or(true, |(best_score, _)| score < best_score) {
                best = Some((score, index));
            }
        }
        let Some((_, index)) = best else {
            break;
        };
        let chosen = remaining.remove(index);
        record(&mut usage, &chosen);
        selected.push(chosen);
    }
    selected
}

fn record(usage: &mut BTreeMap<&str, u32>, combination: &Combination) {
    for member in combination.members() {
        if let Some(used) = usage.get_mut(member.as_str()) {
            *used += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::storm::SPECIES;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn alphabet(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn enumerates_all_triples_in_order() {
        let triples = all_triples(&alphabet(&["A", "B", "C", "D"]));
        let labels: Vec<String> = triples.iter().map(Combination::label).collect();
        assert_eq!(labels, vec!["A B C", "A B D", "A C D", "B C D"]);
    }

    #[test]
    fn asking_for_everything_returns_everything() {
        let letters = alphabet(&["A", "B", "C", "D"]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(select_combinations(&letters, 4, &mut rng).len(), 4);
        assert_eq!(select_combinations(&letters, 10, &mut rng), all_triples(&letters));
    }

    #[test]
    fn two_of_four_never_omit_the_same_element() {
        let letters = alphabet(&["A", "B", "C", "D"]);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let chosen = select_combinations(&letters, 2, &mut rng);
            assert_eq!(chosen.len(), 2);
            assert_ne!(chosen[0], chosen[1]);
            let omitted_by_both = letters
                .iter()
                .filter(|l| !chosen[0].contains(l) && !chosen[1].contains(l))
                .count();
            assert_eq!(omitted_by_both, 0);
        }
    }

    #[test]
    fn ties_go_to_the_earliest_remaining_triple() {
        let letters = alphabet(&["A", "B", "C", "D"]);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let chosen = select_combinations(&letters, 3, &mut rng);
            let mut remaining = all_triples(&letters);
            remaining.retain(|triple| *triple != chosen[0]);
            assert_eq!(chosen[1], remaining[0], "seed {seed}");
            remaining.remove(0);
            assert_eq!(chosen[2], remaining[0], "seed {seed}");
        }
    }

    #[test]
    fn species_usage_stays_balanced() {
        let species = alphabet(SPECIES);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let chosen = select_combinations(&species, 6, &mut rng);
            assert_eq!(chosen.len(), 6);
            let mut usage: BTreeMap<&str, u32> =
                species.iter().map(|s| (s.as_str(), 0)).collect();
            for combination in &chosen {
                for member in combination.members() {
                    *usage.get_mut(member.as_str()).unwrap() += 1;
                }
            }
            assert!(spread(&usage) <= 1, "seed {seed}: {usage:?}");
        }
    }

    #[test]
    fn zero_requested_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(select_combinations(&alphabet(SPECIES), 0, &mut rng).is_empty());
    }

    #[test]
    fn selection_is_seeded() {
        let species = alphabet(SPECIES);
        let a = select_combinations(&species, 5, &mut ChaCha8Rng::seed_from_u64(3));
        let b = select_combinations(&species, 5, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
