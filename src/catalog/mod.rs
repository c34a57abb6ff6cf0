//! Static game data: goods, recipes, production buildings and item tables.
//!
//! The built-in tables live in [`storm`] and [`chess`]; everything here is
//! read-only once a [`Catalog`] has been assembled.

pub mod chess;
pub mod storm;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};
use crate::production::ProductionMap;

/// One OR-clause of a recipe: any single member satisfies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequirementGroup(Vec<String>);

impl RequirementGroup {
    pub fn new<I, S>(items: I) -> GenerationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(GenerationError::EmptyRequirementGroup);
        }
        Ok(Self(items))
    }

    /// Parses the comma-joined form used by the catalog, e.g. `"Grain,Roots"`.
    pub fn parse(text: &str) -> GenerationResult<Self> {
        Self::new(
            text.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<String> for RequirementGroup {
    type Error = GenerationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RequirementGroup> for String {
    fn from(value: RequirementGroup) -> Self {
        value.0.join(",")
    }
}

impl fmt::Display for RequirementGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" | "))
    }
}

/// AND of [`RequirementGroup`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requirement(Vec<RequirementGroup>);

impl Requirement {
    pub fn parse(groups: &[&str]) -> GenerationResult<Self> {
        groups
            .iter()
            .map(|group| RequirementGroup::parse(group))
            .collect::<GenerationResult<Vec<_>>>()
            .map(Self)
    }

    pub fn groups(&self) -> &[RequirementGroup] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Usable from the start, no blueprint required.
    AlwaysAvailable,
    Core,
    /// Only obtainable through optional content such as world events.
    Bonus,
}

/// A (good, tier) pairing. Serialized as `[good, tier]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, u8)", into = "(String, u8)")]
pub struct Production {
    pub good: String,
    pub tier: u8,
}

impl Production {
    pub fn new(good: impl Into<String>, tier: u8) -> Self {
        Self {
            good: good.into(),
            tier,
        }
    }
}

impl From<(String, u8)> for Production {
    fn from((good, tier): (String, u8)) -> Self {
        Self { good, tier }
    }
}

impl From<Production> for (String, u8) {
    fn from(value: Production) -> Self {
        (value.good, value.tier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    pub kind: BuildingKind,
    pub outputs: Vec<Production>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    Progression,
    Useful,
    Filler,
}

/// Setting an item depends on; the item is dropped from every candidate list
/// while that setting is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemGate {
    Pocket,
    Blueprint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: String,
    pub class: ItemClass,
    /// `None` means unbounded supply.
    pub quantity: Option<u32>,
    pub material: u32,
    pub parents: Vec<String>,
    pub gate: Option<ItemGate>,
    /// Relative draw weight inside its class. Equivalent to listing the item
    /// this many times in a uniform draw.
    pub weight: u32,
}

impl ItemDef {
    fn with_class(name: impl Into<String>, class: ItemClass) -> Self {
        Self {
            name: name.into(),
            class,
            quantity: Some(1),
            material: 0,
            parents: Vec::new(),
            gate: None,
            weight: 1,
        }
    }

    pub fn progression(name: impl Into<String>) -> Self {
        Self::with_class(name, ItemClass::Progression)
    }

    pub fn useful(name: impl Into<String>) -> Self {
        Self::with_class(name, ItemClass::Useful)
    }

    pub fn filler(name: impl Into<String>) -> Self {
        Self {
            quantity: None,
            ..Self::with_class(name, ItemClass::Filler)
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn material(mut self, material: u32) -> Self {
        self.material = material;
        self
    }

    pub fn parents(mut self, parents: &[&str]) -> Self {
        self.parents = parents.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn gate(mut self, gate: ItemGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemTable {
    items: Vec<ItemDef>,
    index: BTreeMap<String, usize>,
    /// Early-material starter tiers, weakest first. Empty when the table has
    /// no starter rule.
    starter_tiers: Vec<String>,
    goal: Option<String>,
}

impl ItemTable {
    pub fn new(items: Vec<ItemDef>) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.name.clone(), position))
            .collect();
        Self {
            items,
            index,
            starter_tiers: Vec::new(),
            goal: None,
        }
    }

    pub fn with_starter_tiers(mut self, tiers: &[&str]) -> Self {
        self.starter_tiers = tiers.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ItemDef> {
        self.index.get(name).map(|&position| &self.items[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.iter()
    }

    pub fn of_class(&self, class: ItemClass) -> impl Iterator<Item = &ItemDef> {
        self.items.iter().filter(move |item| item.class == class)
    }

    pub fn starter_tiers(&self) -> &[String] {
        &self.starter_tiers
    }

    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }
}

/// Everything the generator and evaluator read: buildings, recipes, raw
/// resources and the item table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    buildings: Vec<Building>,
    recipes: BTreeMap<String, Requirement>,
    resources: BTreeSet<String>,
    items: ItemTable,
}

impl Catalog {
    pub fn new(
        buildings: Vec<Building>,
        recipes: BTreeMap<String, Requirement>,
        resources: BTreeSet<String>,
        items: ItemTable,
    ) -> Self {
        Self {
            buildings,
            recipes,
            resources,
            items,
        }
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building(&self, name: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.name == name)
    }

    pub fn building_kind(&self, name: &str) -> Option<BuildingKind> {
        self.building(name).map(|b| b.kind)
    }

    pub fn recipe(&self, good: &str) -> Option<&Requirement> {
        self.recipes.get(good)
    }

    pub fn items(&self) -> &ItemTable {
        &self.items
    }

    pub fn is_resource(&self, name: &str) -> bool {
        self.resources.contains(name)
    }

    pub fn replace_items(&mut self, items: ItemTable) {
        self.items = items;
    }

    /// Whether `name` is anything the catalog knows about: an item, a raw
    /// resource, a good with a recipe, a produced good or a building.
    pub fn is_known(&self, name: &str) -> bool {
        self.items.contains(name)
            || self.resources.contains(name)
            || self.recipes.contains_key(name)
            || self
                .buildings
                .iter()
                .any(|b| b.name == name || b.outputs.iter().any(|p| p.good == name))
    }

    /// The unshuffled building → outputs assignment.
    pub fn base_production(&self) -> ProductionMap {
        ProductionMap::from_buildings(&self.buildings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_group_parses_comma_form() {
        let group = RequirementGroup::parse("Grain, Roots,Berries").unwrap();
        assert_eq!(group.items(), ["Grain", "Roots", "Berries"]);
    }

    #[test]
    fn empty_requirement_group_is_rejected() {
        assert!(matches!(
            RequirementGroup::parse(" , "),
            Err(GenerationError::EmptyRequirementGroup)
        ));
        assert!(RequirementGroup::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn production_serializes_as_pair() {
        let json = serde_json::to_string(&Production::new("Planks", 2)).unwrap();
        assert_eq!(json, "[\"Planks\",2]");
    }

    #[test]
    fn requirement_deserializes_from_comma_strings() {
        let requirement: Requirement = serde_yaml::from_str("- Grain,Roots\n- Planks\n").unwrap();
        assert_eq!(requirement.groups().len(), 2);
        assert_eq!(requirement.groups()[0].items(), ["Grain", "Roots"]);
    }

    #[test]
    fn item_table_lookup() {
        let table = ItemTable::new(vec![
            ItemDef::progression("Planks"),
            ItemDef::filler("Survivor"),
        ]);
        assert!(table.contains("Planks"));
        assert_eq!(table.get("Survivor").map(|i| i.quantity), Some(None));
        assert_eq!(table.of_class(ItemClass::Filler).count(), 1);
    }
}
