//! One generation run: recipe shuffle, item pool, species combinations.
//!
//! Every random component draws from a single per-player stream in that
//! fixed order, so a (scenario, seed, player) triple always yields the same
//! output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{storm, Catalog};
use crate::combinations::{select_combinations, Combination};
use crate::config::Scenario;
use crate::error::GenerationResult;
use crate::locations::LocationPlan;
use crate::logic::{LogicRules, RecipeLogic};
use crate::pool::{MaterialReport, Placement, PoolAllocator};
use crate::production::{ProductionMap, RecipeShuffler, ShuffleMode};
use crate::rng::RngManager;

/// Everything a host needs to place items and evaluate logic for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub scenario: String,
    pub seed: u64,
    pub player: u32,
    pub recipe_shuffle: ShuffleMode,
    pub blueprint_items: bool,
    pub production_recipes: ProductionMap,
    pub item_pool: Vec<String>,
    pub locked_placements: Vec<Placement>,
    pub excluded_items: BTreeMap<String, u32>,
    pub material: MaterialReport,
    pub location_count: usize,
    pub reputation_locations_per_biome: Option<u32>,
    pub rep_location_indices: Vec<u32>,
    pub species_combinations: Vec<Combination>,
}

pub struct Generator {
    scenario: Scenario,
    catalog: Catalog,
}

impl Generator {
    pub fn new(scenario: Scenario) -> GenerationResult<Self> {
        scenario.validate()?;
        let mut catalog = storm::catalog()?;
        catalog.replace_items(scenario.item_table.table());
        Ok(Self { scenario, catalog })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.scenario.seed = seed;
        self
    }

    pub fn with_player(mut self, player: u32) -> Self {
        self.scenario.player = player;
        self
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn run(&self) -> GenerationResult<GenerationOutput> {
        let scenario = &self.scenario;
        let mut rng = RngManager::new(scenario.seed).player_rng(scenario.player);

        let options = scenario.allocation_options();
        let allocator = PoolAllocator::new(self.catalog.items(), &options);
        let plan = match scenario.location_count {
            Some(total) => LocationPlan::fixed(total),
            None => LocationPlan::fit(
                scenario.reputation_locations_per_biome,
                scenario.blueprint_items,
                allocator.mandatory_count(),
            )?,
        };

        let production = RecipeShuffler::new(&self.catalog, scenario.recipe_shuffle)
            .with_starters(&scenario.starter_buildings)
            .with_max_attempts(scenario.max_shuffle_attempts)
            .shuffle(&mut rng)?;
        let pool = allocator.allocate(plan.total, &mut rng)?;
        let species_combinations =
            select_combinations(&scenario.species, scenario.species_combinations, &mut rng);

        info!(
            scenario = %scenario.name,
            seed = scenario.seed,
            player = scenario.player,
            locations = plan.total,
            pool = pool.items.len(),
            "generation finished"
        );

        Ok(GenerationOutput {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            player: scenario.player,
            recipe_shuffle: scenario.recipe_shuffle,
            blueprint_items: scenario.blueprint_items,
            production_recipes: production,
            item_pool: pool.items,
            locked_placements: pool.locked,
            excluded_items: pool.excluded,
            material: pool.material,
            location_count: plan.total,
            reputation_locations_per_biome: plan.reputation_per_biome,
            rep_location_indices: plan.rep_indices,
            species_combinations,
        })
    }

    /// Completion rules for a finished run. The production map gates logic
    /// only when blueprints are items.
    pub fn rules<'a>(&'a self, output: &'a GenerationOutput) -> GenerationResult<LogicRules<'a>> {
        let mut logic = RecipeLogic::new(&self.catalog);
        if output.blueprint_items {
            logic = logic.with_production(&output.production_recipes);
        }
        Ok(LogicRules::new(logic, storm::goal_requirement()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BuildingKind, Requirement};
    use crate::logic::HeldItems;
    use crate::production::is_beatable;

    fn scenario(yaml: &str) -> Scenario {
        Scenario::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn vanilla_run_uses_base_production() {
        let generator = Generator::new(scenario("name: plain\nseed: 5\n")).unwrap();
        let output = generator.run().unwrap();
        assert_eq!(output.production_recipes, generator.catalog().base_production());
        assert_eq!(output.location_count, 60);
        assert_eq!(output.rep_location_indices, vec![1]);
        assert_eq!(output.item_pool.len(), 60);
        assert_eq!(output.species_combinations.len(), 5);
    }

    #[test]
    fn shuffled_run_is_beatable_and_seeded() {
        let generator =
            Generator::new(scenario("name: shuffled\nseed: 12\nrecipe_shuffle: full\n")).unwrap();
        let first = generator.run().unwrap();
        assert!(is_beatable(&first.production_recipes, generator.catalog()));
        assert_eq!(first, generator.run().unwrap());
    }

    #[test]
    fn players_get_independent_runs() {
        let base = scenario("name: pair\nseed: 12\nrecipe_shuffle: full\n");
        let one = Generator::new(base.clone()).unwrap().run().unwrap();
        let two = Generator::new(base).unwrap().with_player(2).run().unwrap();
        assert_eq!(two.player, 2);
        assert_ne!(one.production_recipes, two.production_recipes);
    }

    #[test]
    fn blueprints_grow_locations_and_gate_logic() {
        let generator = Generator::new(scenario(
            "name: blueprints\nseed: 3\nrecipe_shuffle: exclude_starters\nblueprint_items: true\n",
        ))
        .unwrap();
        let output = generator.run().unwrap();
        assert_eq!(output.reputation_locations_per_biome, Some(11));
        assert_eq!(output.location_count, 115);
        assert!(output.item_pool.iter().any(|item| item == "Bakery"));

        let catalog = generator.catalog();
        let core_only = output
            .production_recipes
            .iter()
            .flat_map(|(_, outputs)| outputs.iter().map(|p| p.good.as_str()))
            .find(|good| {
                !catalog.is_resource(good)
                    && output.production_recipes.producers(good).all(|building| {
                        catalog.building_kind(building) != Some(BuildingKind::AlwaysAvailable)
                    })
            })
            .unwrap();
        let rules = generator
            .rules(&output)
            .unwrap()
            .with_location("core good", Requirement::parse(&[core_only]).unwrap());

        let everything: HeldItems = output.item_pool.iter().cloned().collect();
        assert!(rules.can_complete(&everything));
        assert_eq!(rules.can_reach("core good", &everything), Some(true));
        let goods_only: HeldItems = output
            .item_pool
            .iter()
            .filter(|item| catalog.building(item).is_none())
            .cloned()
            .collect();
        assert_eq!(rules.can_reach("core good", &goods_only), Some(false));
    }

    #[test]
    fn fixed_location_count_skips_the_reputation_plan() {
        let yaml = r#"
name: army
seed: 8
item_table: chess
location_count: 120
allocation:
  material:
    min_material: 39
    max_material: 40
  early_material: 5
"#;
        let output = Generator::new(scenario(yaml)).unwrap().run().unwrap();
        assert_eq!(output.location_count, 120);
        assert!(output.rep_location_indices.is_empty());
        assert_eq!(output.item_pool.len() + output.locked_placements.len(), 120);
    }
}
