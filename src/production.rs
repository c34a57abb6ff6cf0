use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Building, BuildingKind, Catalog, Production};
use crate::error::{GenerationError, GenerationResult};

pub const DEFAULT_MAX_SHUFFLE_ATTEMPTS: u32 = 1_000;

/// Building → ordered outputs. Serialized as `{"Bakery": [["Pie", 2], ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductionMap(BTreeMap<String, Vec<Production>>);

impl ProductionMap {
    pub fn from_buildings(buildings: &[Building]) -> Self {
        Self(
            buildings
                .iter()
                .map(|b| (b.name.clone(), b.outputs.clone()))
                .collect(),
        )
    }

    pub fn outputs(&self, building: &str) -> Option<&[Production]> {
        self.0.get(building).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Production])> {
        self.0
            .iter()
            .map(|(name, outputs)| (name.as_str(), outputs.as_slice()))
    }

    /// Buildings that list `good` among their outputs.
    pub fn producers<'a>(&'a self, good: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |(_, outputs)| outputs.iter().any(|p| p.good == good))
            .map(|(name, _)| name)
    }

    pub fn is_produced(&self, good: &str) -> bool {
        self.producers(good).next().is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleMode {
    #[default]
    Vanilla,
    /// Starter buildings keep their outputs; all others are shuffled.
    ExcludeStarters,
    Full,
}

pub struct RecipeShuffler<'a> {
    catalog: &'a Catalog,
    mode: ShuffleMode,
    starters: BTreeSet<String>,
    max_attempts: u32,
}

impl<'a> RecipeShuffler<'a> {
    pub fn new(catalog: &'a Catalog, mode: ShuffleMode) -> Self {
        Self {
            catalog,
            mode,
            starters: BTreeSet::new(),
            max_attempts: DEFAULT_MAX_SHUFFLE_ATTEMPTS,
        }
    }

    pub fn with_starters<I, S>(mut self, starters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.starters = starters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    fn participates(&self, building: &str) -> bool {
        match self.mode {
            ShuffleMode::Vanilla => false,
            ShuffleMode::ExcludeStarters => !self.starters.contains(building),
            ShuffleMode::Full => true,
        }
    }

    /// Produces a beatable production map, redrawing the whole assignment
    /// until [`is_beatable`] accepts it or the attempt bound is hit.
    pub fn shuffle<R: Rng + ?Sized>(&self, rng: &mut R) -> GenerationResult<ProductionMap> {
        let base = self.catalog.base_production();
        if self.mode == ShuffleMode::Vanilla {
            return Ok(base);
        }
        if self.mode == ShuffleMode::ExcludeStarters {
            if let Some(missing) = self
                .starters
                .iter()
                .find(|name| self.catalog.building(name).is_none())
            {
                return Err(GenerationError::UnknownBuilding(missing.clone()));
            }
        }

        let bag: Vec<Production> = base
            .iter()
            .filter(|(name, _)| self.participates(name))
            .flat_map(|(_, outputs)| outputs.iter().cloned())
            .collect();

        for attempt in 1..=self.max_attempts {
            let candidate = self.draw(&base, bag.clone(), rng);
            let stranded = bonus_only_goods(&candidate, self.catalog);
            if stranded.is_empty() {
                debug!(attempt, "recipe shuffle accepted");
                return Ok(candidate);
            }
            debug!(attempt, ?stranded, "recipe shuffle rejected");
        }
        Err(GenerationError::InfeasibleShuffle {
            attempts: self.max_attempts,
        })
    }

    fn draw<R: Rng + ?Sized>(
        &self,
        base: &ProductionMap,
        mut bag: Vec<Production>,
        rng: &mut R,
    ) -> ProductionMap {
        let mut shuffled = BTreeMap::new();
        for (name, outputs) in base.iter() {
            if !self.participates(name) {
                shuffled.insert(name.to_string(), outputs.to_vec());
                continue;
            }
            let mut drawn = Vec::with_capacity(outputs.len());
            for _ in 0..outputs.len() {
                let index = rng.gen_range(0..bag.len());
                drawn.push(bag.swap_remove(index));
            }
            shuffled.insert(name.to_string(), drawn);
        }
        ProductionMap(shuffled)
    }
}

/// Goods whose only sources in `map` are bonus buildings.
///
/// Bonus status comes from the catalog's static classification, never from
/// what a player holds.
pub fn bonus_only_goods(map: &ProductionMap, catalog: &Catalog) -> Vec<String> {
    let is_bonus =
        |building: &str| catalog.building_kind(building) == Some(BuildingKind::Bonus);
    let fallback: BTreeSet<&str> = map
        .iter()
        .filter(|(name, _)| !is_bonus(name))
        .flat_map(|(_, outputs)| outputs.iter().map(|p| p.good.as_str()))
        .collect();
    let stranded: BTreeSet<&str> = map
        .iter()
        .filter(|(name, _)| is_bonus(name))
        .flat_map(|(_, outputs)| outputs.iter().map(|p| p.good.as_str()))
        .filter(|good| !fallback.contains(good))
        .collect();
    stranded.into_iter().map(str::to_string).collect()
}

pub fn is_beatable(map: &ProductionMap, catalog: &Catalog) -> bool {
    bonus_only_goods(map, catalog).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{storm, ItemTable};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn building(name: &str, kind: BuildingKind, outputs: &[(&str, u8)]) -> Building {
        Building {
            name: name.to_string(),
            kind,
            outputs: outputs
                .iter()
                .map(|(good, tier)| Production::new(*good, *tier))
                .collect(),
        }
    }

    fn tiny_catalog() -> Catalog {
        Catalog::new(
            vec![
                building("Workstation", BuildingKind::AlwaysAvailable, &[("Planks", 0)]),
                building("Bakery", BuildingKind::Core, &[("Pie", 2), ("Biscuits", 1)]),
                building("Smithy", BuildingKind::Core, &[("Tools", 2), ("Pie", 1)]),
                building("Flawless Oven", BuildingKind::Bonus, &[("Biscuits", 3)]),
            ],
            BTreeMap::new(),
            BTreeSet::new(),
            ItemTable::default(),
        )
    }

    #[test]
    fn vanilla_returns_catalog_unchanged() {
        let catalog = storm::catalog().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let map = RecipeShuffler::new(&catalog, ShuffleMode::Vanilla)
            .shuffle(&mut rng)
            .unwrap();
        assert_eq!(map, catalog.base_production());
    }

    #[test]
    fn shuffle_preserves_output_counts() {
        let catalog = storm::catalog().unwrap();
        let base = catalog.base_production();
        for seed in 0..20 {
            for mode in [ShuffleMode::ExcludeStarters, ShuffleMode::Full] {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let map = RecipeShuffler::new(&catalog, mode)
                    .with_starters(["Crude Workstation"])
                    .shuffle(&mut rng)
                    .unwrap();
                for (name, outputs) in base.iter() {
                    assert_eq!(map.outputs(name).map(<[_]>::len), Some(outputs.len()));
                }
                assert!(is_beatable(&map, &catalog));
            }
        }
    }

    #[test]
    fn shuffle_permutes_the_bag() {
        let catalog = storm::catalog().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let map = RecipeShuffler::new(&catalog, ShuffleMode::Full)
            .shuffle(&mut rng)
            .unwrap();
        let mut before: Vec<_> = catalog
            .base_production()
            .iter()
            .flat_map(|(_, o)| o.to_vec())
            .map(|p| (p.good, p.tier))
            .collect();
        let mut after: Vec<_> = map
            .iter()
            .flat_map(|(_, o)| o.to_vec())
            .map(|p| (p.good, p.tier))
            .collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn excluded_starters_keep_outputs() {
        let catalog = storm::catalog().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let map = RecipeShuffler::new(&catalog, ShuffleMode::ExcludeStarters)
            .with_starters(["Crude Workstation"])
            .shuffle(&mut rng)
            .unwrap();
        assert_eq!(
            map.outputs("Crude Workstation"),
            catalog.base_production().outputs("Crude Workstation")
        );
    }

    #[test]
    fn same_seed_same_shuffle() {
        let catalog = storm::catalog().unwrap();
        let shuffler = RecipeShuffler::new(&catalog, ShuffleMode::Full);
        let a = shuffler.shuffle(&mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let b = shuffler.shuffle(&mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_starter_is_an_error() {
        let catalog = tiny_catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = RecipeShuffler::new(&catalog, ShuffleMode::ExcludeStarters)
            .with_starters(["Nowhere"])
            .shuffle(&mut rng);
        assert!(matches!(result, Err(GenerationError::UnknownBuilding(name)) if name == "Nowhere"));
    }

    #[test]
    fn bonus_only_good_is_rejected() {
        let catalog = tiny_catalog();
        assert!(is_beatable(&catalog.base_production(), &catalog));

        let stranded = ProductionMap::from_buildings(&[
            building("Bakery", BuildingKind::Core, &[("Pie", 2)]),
            building("Flawless Oven", BuildingKind::Bonus, &[("Biscuits", 3)]),
        ]);
        assert_eq!(bonus_only_goods(&stranded, &catalog), vec!["Biscuits"]);
        assert!(!is_beatable(&stranded, &catalog));
    }

    #[test]
    fn impossible_catalog_fails_after_bounded_attempts() {
        let catalog = Catalog::new(
            vec![
                building("Bakery", BuildingKind::Core, &[("Pie", 2)]),
                building("Flawless Oven", BuildingKind::Bonus, &[("Biscuits", 3)]),
            ],
            BTreeMap::new(),
            BTreeSet::new(),
            ItemTable::default(),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let result = RecipeShuffler::new(&catalog, ShuffleMode::Full)
            .with_max_attempts(25)
            .shuffle(&mut rng);
        assert!(matches!(
            result,
            Err(GenerationError::InfeasibleShuffle { attempts: 25 })
        ));
    }
}
