//! Built-in city-builder tables: goods, recipes and production buildings.

use std::collections::{BTreeMap, BTreeSet};

use super::{
    Building, BuildingKind, Catalog, ItemDef, ItemGate, ItemTable, Production, Requirement,
};
use crate::error::GenerationResult;

#[derive(Debug, Clone, Copy)]
pub struct BuildingDefinition {
    pub name: &'static str,
    pub kind: BuildingKind,
    pub outputs: &'static [(&'static str, u8)],
}

const fn building(
    name: &'static str,
    kind: BuildingKind,
    outputs: &'static [(&'static str, u8)],
) -> BuildingDefinition {
    BuildingDefinition {
        name,
        kind,
        outputs,
    }
}

use BuildingKind::{AlwaysAvailable, Bonus, Core};

pub const BUILDINGS: &[BuildingDefinition] = &[
    building(
        "Crude Workstation",
        AlwaysAvailable,
        &[("Planks", 0), ("Fabric", 0), ("Bricks", 0), ("Pipes", 0)],
    ),
    building(
        "Field Kitchen",
        AlwaysAvailable,
        &[("Porridge", 0), ("Skewers", 0), ("Paste", 0)],
    ),
    building(
        "Makeshift Post",
        AlwaysAvailable,
        &[
            ("Pack of Crops", 0),
            ("Pack of Provisions", 0),
            ("Pack of Building Materials", 0),
        ],
    ),
    building("Bakery", Core, &[("Biscuits", 2), ("Pie", 2), ("Pottery", 1)]),
    building("Beanery", Core, &[("Porridge", 2), ("Pickled Goods", 1), ("Crystallized Dew", 1)]),
    building("Brewery", Core, &[("Ale", 2), ("Porridge", 1)]),
    building("Brick Oven", Core, &[("Bricks", 2), ("Coal", 1), ("Biscuits", 1)]),
    building("Butcher", Core, &[("Skewers", 2), ("Jerky", 2), ("Oil", 1)]),
    building("Cellar", Core, &[("Wine", 2), ("Pickled Goods", 1), ("Jerky", 1)]),
    building("Clothier", Core, &[("Coats", 2), ("Fabric", 1), ("Waterskins", 1)]),
    building("Cookhouse", Core, &[("Skewers", 2), ("Biscuits", 2)]),
    building("Cooperage", Core, &[("Barrels", 2), ("Pickled Goods", 1), ("Ale", 1)]),
    building("Distillery", Core, &[("Wine", 2), ("Ale", 1), ("Oil", 1)]),
    building("Druid's Hut", Core, &[("Oil", 2), ("Incense", 1), ("Coats", 1)]),
    building("Furnace", Core, &[("Pie", 2), ("Copper Bars", 1), ("Coal", 1)]),
    building("Granary", Core, &[("Pickled Goods", 2), ("Fabric", 1), ("Training Gear", 1)]),
    building("Kiln", Core, &[("Coal", 2), ("Bricks", 1), ("Jerky", 1)]),
    building("Lumber Mill", Core, &[("Planks", 2), ("Scrolls", 1), ("Pipes", 1)]),
    building("Press", Core, &[("Oil", 2), ("Flour", 1)]),
    building("Provisioner", Core, &[("Flour", 2), ("Barrels", 1)]),
    building("Rain Mill", Core, &[("Flour", 2), ("Paste", 1), ("Scrolls", 1)]),
    building("Scribe", Core, &[("Scrolls", 2), ("Pack of Trade Goods", 1), ("Ink", 1)]),
    building("Smelter", Core, &[("Copper Bars", 2), ("Crystallized Dew", 1), ("Pie", 1)]),
    building("Smithy", Core, &[("Tools", 2), ("Purging Fire", 1), ("Copper Bars", 1)]),
    building("Stamping Mill", Core, &[("Copper Bars", 2), ("Pipes", 1)]),
    building("Teahouse", Core, &[("Tea", 2), ("Paste", 1), ("Waterskins", 1)]),
    building("Tinctury", Core, &[("Tea", 2), ("Incense", 1), ("Pigment", 1)]),
    building("Toolshop", Core, &[("Tools", 2), ("Purging Fire", 2), ("Pipes", 1)]),
    building("Manufactory", Core, &[("Fabric", 2), ("Barrels", 1), ("Pottery", 1)]),
    building("Artisan", Core, &[("Barrels", 2), ("Coats", 1), ("Training Gear", 1)]),
    building("Apothecary", Core, &[("Incense", 2), ("Tea", 1), ("Pack of Luxury Goods", 1)]),
    building("Workshop", Core, &[("Pigment", 2), ("Training Gear", 2), ("Pottery", 1)]),
    building("Leatherworker", Core, &[("Waterskins", 2), ("Coats", 1), ("Training Gear", 1)]),
    building(
        "Alchemist's Hut",
        Core,
        &[("Crystallized Dew", 2), ("Pigment", 1), ("Pack of Trade Goods", 1)],
    ),
    building("Flawless Brewery", Bonus, &[("Ale", 3), ("Pickled Goods", 3)]),
    building("Flawless Cellar", Bonus, &[("Wine", 3), ("Jerky", 3)]),
    building("Flawless Rain Mill", Bonus, &[("Flour", 3), ("Pie", 3)]),
];

/// Goods that are gathered rather than produced.
pub const RESOURCES: &[&str] = &[
    "Amber", "Berries", "Clay", "Coal", "Copper Ore", "Eggs", "Fish", "Grain", "Herbs", "Insects",
    "Leather", "Meat", "Mushrooms", "Plant Fiber", "Reeds", "Resin", "Roots", "Sea Marrow",
    "Stone", "Vegetables", "Wood",
];

/// Good → comma-joined requirement groups.
pub const RECIPES: &[(&str, &[&str])] = &[
    ("Jerky", &["Insects,Meat"]),
    ("Porridge", &["Grain,Vegetables,Mushrooms,Herbs", "Planks"]),
    ("Skewers", &["Insects,Meat,Mushrooms,Jerky", "Vegetables,Roots,Berries,Eggs"]),
    ("Biscuits", &["Flour", "Herbs,Berries,Roots"]),
    ("Pie", &["Flour", "Herbs,Meat,Insects,Eggs,Berries"]),
    ("Pickled Goods", &["Vegetables,Mushrooms,Roots,Berries,Eggs", "Pottery,Barrels,Waterskins"]),
    ("Coats", &["Fabric"]),
    ("Bricks", &["Clay,Stone"]),
    ("Fabric", &["Leather,Plant Fiber,Reeds"]),
    ("Pipes", &["Copper Bars,Crystallized Dew"]),
    ("Ale", &["Grain,Roots", "Barrels,Pottery,Waterskins"]),
    ("Incense", &["Herbs,Insects,Resin,Roots"]),
    ("Scrolls", &["Pigment,Wine"]),
    ("Tea", &["Herbs,Mushrooms,Pigment,Resin,Roots", "Planks", "Copper Bars,Crystallized Dew"]),
    ("Training Gear", &["Copper Bars,Crystallized Dew,Stone", "Planks,Reeds"]),
    ("Wine", &["Berries,Mushrooms,Reeds", "Barrels,Pottery,Waterskins"]),
    ("Crystallized Dew", &["Herbs,Insects,Resin,Vegetables", "Stone,Clay", "Planks"]),
    ("Barrels", &["Copper Bars,Crystallized Dew", "Planks"]),
    ("Copper Bars", &["Copper Ore"]),
    ("Flour", &["Grain,Mushrooms,Roots"]),
    ("Pigment", &["Berries,Coal,Copper Ore,Insects"]),
    ("Pottery", &["Clay"]),
    ("Waterskins", &["Leather", "Meat,Oil"]),
    ("Pack of Building Materials", &["Bricks,Copper Ore,Fabric,Planks"]),
    ("Pack of Provisions", &["Berries,Eggs,Herbs,Insects,Meat"]),
    ("Pack of Crops", &["Grain,Mushrooms,Roots,Vegetables"]),
    ("Pack of Luxury Goods", &["Ale,Incense,Scrolls,Tea,Training Gear,Wine"]),
    ("Pack of Trade Goods", &["Barrels,Flour,Oil,Pigment,Pottery,Waterskins"]),
    ("Oil", &["Grain,Meat,Vegetables,Plant Fiber"]),
    ("Tools", &["Copper Bars,Crystallized Dew"]),
    ("Purging Fire", &["Coal,Oil,Sea Marrow"]),
];

/// Top-level completion requirement: feed, serve, fuel and house every
/// species.
pub const GOAL_REQUIREMENT: &[&str] = &[
    "Jerky,Porridge,Skewers,Biscuits,Pie,Pickled Goods",
    "Ale,Training Gear,Incense,Scrolls,Wine,Tea",
    "Coal,Oil,Sea Marrow",
    "Amber",
    "Tools",
    "Purging Fire",
    "Planks",
    "Bricks",
    "Fabric",
];

pub const SPECIES: &[&str] = &["Human", "Beaver", "Lizard", "Harpy", "Fox", "Frog"];

pub const FILLER: &[&str] = &["Survivor", "Stormwater", "Wildfire Essence"];

pub fn goal_requirement() -> GenerationResult<Requirement> {
    Requirement::parse(GOAL_REQUIREMENT)
}

/// Every gathered or produced good is a single progression item; core
/// blueprints become items only when blueprint items are enabled.
pub fn item_table() -> ItemTable {
    let mut goods: BTreeSet<&str> = RESOURCES.iter().copied().collect();
    goods.extend(RECIPES.iter().map(|(good, _)| *good));
    for def in BUILDINGS {
        goods.extend(def.outputs.iter().map(|(good, _)| *good));
    }

    let mut items: Vec<ItemDef> = goods.into_iter().map(ItemDef::progression).collect();
    items.extend(
        BUILDINGS
            .iter()
            .filter(|def| def.kind == BuildingKind::Core)
            .map(|def| ItemDef::progression(def.name).gate(ItemGate::Blueprint)),
    );
    items.extend(FILLER.iter().map(|name| ItemDef::filler(*name)));
    ItemTable::new(items)
}

pub fn catalog() -> GenerationResult<Catalog> {
    let buildings = BUILDINGS
        .iter()
        .map(|def| Building {
            name: def.name.to_string(),
            kind: def.kind,
            outputs: def
                .outputs
                .iter()
                .map(|(good, tier)| Production::new(*good, *tier))
                .collect(),
        })
        .collect();
    let recipes = RECIPES
        .iter()
        .map(|(good, groups)| Ok((good.to_string(), Requirement::parse(groups)?)))
        .collect::<GenerationResult<BTreeMap<_, _>>>()?;
    let resources = RESOURCES.iter().map(|r| r.to_string()).collect();
    Ok(Catalog::new(buildings, recipes, resources, item_table()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{HeldItems, RecipeLogic};
    use crate::production::is_beatable;

    #[test]
    fn catalog_builds() {
        let catalog = catalog().unwrap();
        assert_eq!(catalog.buildings().len(), BUILDINGS.len());
        assert!(catalog.recipe("Jerky").is_some());
        assert!(catalog.is_known("Amber"));
        assert!(!catalog.is_known("Unobtainium"));
    }

    #[test]
    fn every_requirement_name_is_known() {
        let catalog = catalog().unwrap();
        let goal = goal_requirement().unwrap();
        let recipes = RECIPES
            .iter()
            .map(|(_, groups)| Requirement::parse(groups).unwrap());
        for requirement in recipes.chain(std::iter::once(goal)) {
            for group in requirement.groups() {
                for item in group.items() {
                    assert!(catalog.is_known(item), "unknown item {item}");
                    assert!(catalog.items().contains(item), "no item for {item}");
                }
            }
        }
    }

    #[test]
    fn refined_goods_without_ingredients_need_only_themselves() {
        let catalog = catalog().unwrap();
        let logic = RecipeLogic::new(&catalog);
        for good in ["Planks", "Paste", "Ink"] {
            assert!(catalog.is_known(good), "{good}");
            assert!(catalog.recipe(good).is_none(), "{good}");
            let requirement = Requirement::parse(&[good]).unwrap();
            let holdings: HeldItems = [good].into_iter().collect();
            assert!(logic.satisfied(&requirement, &holdings), "{good}");
        }
    }

    #[test]
    fn vanilla_production_is_beatable() {
        let catalog = catalog().unwrap();
        assert!(is_beatable(&catalog.base_production(), &catalog));
    }

    #[test]
    fn blueprint_items_cover_core_buildings_only() {
        let table = item_table();
        assert!(table.contains("Bakery"));
        assert!(!table.contains("Crude Workstation"));
        assert!(!table.contains("Flawless Cellar"));
    }
}
