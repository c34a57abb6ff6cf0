//! Reachability predicates over AND-of-OR recipe requirements.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::warn;

use crate::catalog::{BuildingKind, Catalog, Requirement};
use crate::production::ProductionMap;

/// Read-only view of what a player currently holds. Queried fresh on every
/// evaluation; never cached by the evaluator.
pub trait Holdings {
    fn has(&self, item: &str) -> bool;
}

impl<T: Holdings + ?Sized> Holdings for &T {
    fn has(&self, item: &str) -> bool {
        (**self).has(item)
    }
}

impl Holdings for HashSet<String> {
    fn has(&self, item: &str) -> bool {
        self.contains(item)
    }
}

impl Holdings for BTreeSet<String> {
    fn has(&self, item: &str) -> bool {
        self.contains(item)
    }
}

/// Counted holdings, the shape a host's collection state usually takes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldItems {
    counts: BTreeMap<String, u32>,
}

impl HeldItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(&mut self, item: impl Into<String>) {
        *self.counts.entry(item.into()).or_insert(0) += 1;
    }

    pub fn remove(&mut self, item: &str) {
        if let Some(count) = self.counts.get_mut(item) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.counts.remove(item);
            }
        }
    }

    pub fn count(&self, item: &str) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }
}

impl<S: Into<String>> FromIterator<S> for HeldItems {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut held = Self::new();
        for item in iter {
            held.collect(item);
        }
        held
    }
}

impl Holdings for HeldItems {
    fn has(&self, item: &str) -> bool {
        self.count(item) > 0
    }
}

/// Recipe evaluator. With a production map attached, a produced good also
/// needs an unlocked building that makes it.
#[derive(Debug, Clone, Copy)]
pub struct RecipeLogic<'a> {
    catalog: &'a Catalog,
    production: Option<&'a ProductionMap>,
}

impl<'a> RecipeLogic<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            production: None,
        }
    }

    pub fn with_production(mut self, production: &'a ProductionMap) -> Self {
        self.production = Some(production);
        self
    }

    pub fn satisfied<H: Holdings + ?Sized>(&self, requirement: &Requirement, holdings: &H) -> bool {
        let mut path = Vec::new();
        self.satisfied_along(requirement, holdings, &mut path)
    }

    fn satisfied_along<'r, H: Holdings + ?Sized>(
        &'r self,
        requirement: &'r Requirement,
        holdings: &H,
        path: &mut Vec<&'r str>,
    ) -> bool {
        requirement.groups().iter().all(|group| {
            group
                .items()
                .iter()
                .any(|item| self.item_satisfied(item, holdings, path))
        })
    }

    fn item_satisfied<'r, H: Holdings + ?Sized>(
        &'r self,
        item: &'r str,
        holdings: &H,
        path: &mut Vec<&'r str>,
    ) -> bool {
        if !self.catalog.is_known(item) {
            warn!(item, "logical requirement for unknown item");
        }
        if !holdings.has(item) {
            return false;
        }
        if !self.producible(item, holdings) {
            return false;
        }
        let Some(recipe) = self.catalog.recipe(item) else {
            return true;
        };
        if path.contains(&item) {
            warn!(item, ?path, "recipe cycle, treating as unsatisfied");
            return false;
        }
        path.push(item);
        let satisfied = self.satisfied_along(recipe, holdings, path);
        path.pop();
        satisfied
    }

    /// Gathered resources and goods no building makes are never gated.
    fn producible<H: Holdings + ?Sized>(&self, item: &str, holdings: &H) -> bool {
        let Some(production) = self.production else {
            return true;
        };
        if self.catalog.is_resource(item) || !production.is_produced(item) {
            return true;
        }
        production
            .producers(item)
            .any(|building| self.building_unlocked(building, holdings))
    }

    fn building_unlocked<H: Holdings + ?Sized>(&self, building: &str, holdings: &H) -> bool {
        self.catalog.building_kind(building) == Some(BuildingKind::AlwaysAvailable)
            || holdings.has(building)
    }
}

/// Completion and per-location rules for one generated world.
#[derive(Debug, Clone)]
pub struct LogicRules<'a> {
    logic: RecipeLogic<'a>,
    goal: Requirement,
    locations: BTreeMap<String, Requirement>,
}

impl<'a> LogicRules<'a> {
    pub fn new(logic: RecipeLogic<'a>, goal: Requirement) -> Self {
        Self {
            logic,
            goal,
            locations: BTreeMap::new(),
        }
    }

    pub fn with_location(mut self, name: impl Into<String>, requirement: Requirement) -> Self {
        self.locations.insert(name.into(), requirement);
        self
    }

    pub fn can_complete<H: Holdings + ?Sized>(&self, holdings: &H) -> bool {
        self.logic.satisfied(&self.goal, holdings)
    }

    /// `None` when the location has no registered rule.
    pub fn can_reach<H: Holdings + ?Sized>(&self, location: &str, holdings: &H) -> Option<bool> {
        self.locations
            .get(location)
            .map(|requirement| self.logic.satisfied(requirement, holdings))
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }
}
