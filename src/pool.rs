//! Item pool allocation under quantity caps, unlock chains and a material
//! budget.
//!
//! Allocation runs in a fixed order: excluded items and option limits are
//! charged first, then the starter and goal locks, then locked items, then
//! progression draws against the material budget, then useful items, then
//! filler until every location is spoken for.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{chess, ItemClass, ItemDef, ItemGate, ItemTable};
use crate::error::{GenerationError, GenerationResult};
use crate::rng::RngExt;

/// Material options are given in units of this many material points.
pub const MATERIAL_UNIT: u64 = 100;

/// Per-player count of every item already committed. Never decreases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ItemsUsed(BTreeMap<String, u32>);

impl ItemsUsed {
    pub fn get(&self, item: &str) -> u32 {
        self.0.get(item).copied().unwrap_or(0)
    }

    fn add(&mut self, item: &str, count: u32) {
        *self.0.entry(item.to_string()).or_insert(0) += count;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(name, &count)| (name.as_str(), count))
    }

    /// True while another unit of `item` keeps it at or under its cap.
    pub fn can_add_more(&self, item: &ItemDef) -> bool {
        item.quantity.map_or(true, |cap| self.get(&item.name) < cap)
    }

    /// A child may gain a unit only while it trails every one of its parents.
    pub fn has_prereqs(&self, item: &ItemDef) -> bool {
        let Some(fewest) = item.parents.iter().map(|parent| self.get(parent)).min() else {
            return true;
        };
        fewest > self.get(&item.name)
    }
}

/// Material window in option units; the absolute window is `min..=max` times
/// [`MATERIAL_UNIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialOptions {
    pub min_material: u32,
    pub max_material: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOptions {
    #[serde(default)]
    pub material: Option<MaterialOptions>,
    /// 0 disables the starter lock. 1 pawn, 2 minor, 3 major, 4 minor or
    /// major, 5 and up any tier.
    #[serde(default)]
    pub early_material: u8,
    #[serde(default)]
    pub pocket: bool,
    /// Set from the scenario's top-level switch.
    #[serde(skip)]
    pub blueprint_items: bool,
    #[serde(default)]
    pub non_local_items: BTreeSet<String>,
    #[serde(default)]
    pub excluded_items: BTreeMap<String, u32>,
    /// Units forced into the pool. They count against caps, material and
    /// locations like drawn units.
    #[serde(default)]
    pub locked_items: BTreeMap<String, u32>,
    #[serde(default)]
    pub max_engine_penalties: Option<u32>,
    #[serde(default)]
    pub max_pocket: Option<u32>,
    #[serde(default)]
    pub max_kings: Option<u32>,
    #[serde(default)]
    pub fairy_kings: Option<u32>,
    #[serde(default = "default_starter_location")]
    pub starter_location: String,
    #[serde(default = "default_goal_location")]
    pub goal_location: String,
}

fn default_starter_location() -> String {
    "Bongcloud Once".to_string()
}

fn default_goal_location() -> String {
    "Checkmate Maxima".to_string()
}

impl Default for AllocationOptions {
    fn default() -> Self {
        Self {
            material: None,
            early_material: 0,
            pocket: false,
            blueprint_items: false,
            non_local_items: BTreeSet::new(),
            excluded_items: BTreeMap::new(),
            locked_items: BTreeMap::new(),
            max_engine_penalties: None,
            max_pocket: None,
            max_kings: None,
            fairy_kings: None,
            starter_location: default_starter_location(),
            goal_location: default_goal_location(),
        }
    }
}

impl AllocationOptions {
    /// Option-driven limits as (item, units allowed) pairs. The allocator
    /// charges each item's cap minus the limit to Items-Used up front.
    pub fn item_limits(&self) -> impl Iterator<Item = (&'static str, u32)> {
        [
            (chess::ENGINE_PENALTY, self.max_engine_penalties),
            (chess::POCKET, self.max_pocket),
            (chess::CONSUL, self.max_kings),
            (chess::KING_PROMOTION, self.fairy_kings),
        ]
        .into_iter()
        .filter_map(|(item, limit)| limit.map(|limit| (item, limit)))
    }

    fn enables(&self, gate: Option<ItemGate>) -> bool {
        match gate {
            None => true,
            Some(ItemGate::Pocket) => self.pocket,
            Some(ItemGate::Blueprint) => self.blueprint_items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub location: String,
    pub item: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialReport {
    /// Sampled stopping point; `None` without a material window.
    pub target: Option<u64>,
    pub ceiling: Option<u64>,
    pub spent: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocatedPool {
    pub items: Vec<String>,
    pub locked: Vec<Placement>,
    pub excluded: BTreeMap<String, u32>,
    pub used: ItemsUsed,
    pub material: MaterialReport,
}

impl AllocatedPool {
    /// Locations consumed before general allocation: excluded units plus
    /// locked placements.
    pub fn preplaced(&self) -> usize {
        unit_count(&self.excluded) + self.locked.len()
    }
}

fn unit_count(counts: &BTreeMap<String, u32>) -> usize {
    counts.values().map(|&count| count as usize).sum()
}

struct MaterialBudget {
    target: u64,
    ceiling: u64,
    spent: u64,
}

impl MaterialBudget {
    fn wants_more(&self) -> bool {
        self.spent < self.target
    }

    fn fits(&self, item: &ItemDef) -> bool {
        self.spent + u64::from(item.material) <= self.ceiling
    }
}

/// Working draw list. Entry weights stand in for duplicated list entries.
/// Parked entries failed the prerequisite check and come back after the next
/// commit, since only a commit can change prerequisite status.
struct Candidates<'t> {
    entries: Vec<&'t ItemDef>,
    weights: Vec<u32>,
    parked: Vec<bool>,
}

impl<'t> Candidates<'t> {
    fn new(entries: Vec<&'t ItemDef>) -> Self {
        let weights = entries.iter().map(|item| item.weight).collect();
        let parked = vec![false; entries.len()];
        Self {
            entries,
            weights,
            parked,
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let live: Vec<u32> = self
            .weights
            .iter()
            .zip(&self.parked)
            .map(|(&weight, &parked)| if parked { 0 } else { weight })
            .collect();
        rng.weighted_index(&live)
    }

    fn remove(&mut self, index: usize) {
        self.weights[index] = 0;
    }

    fn park(&mut self, index: usize) {
        self.parked[index] = true;
    }

    fn unpark_all(&mut self) {
        self.parked.iter_mut().for_each(|parked| *parked = false);
    }
}

pub struct PoolAllocator<'a> {
    items: &'a ItemTable,
    options: &'a AllocationOptions,
}

impl<'a> PoolAllocator<'a> {
    pub fn new(items: &'a ItemTable, options: &'a AllocationOptions) -> Self {
        Self { items, options }
    }

    fn eligible(&self, class: ItemClass) -> Vec<&'a ItemDef> {
        let goal = self.items.goal();
        self.items
            .of_class(class)
            .filter(|item| Some(item.name.as_str()) != goal)
            .filter(|item| item.weight > 0 && self.options.enables(item.gate))
            .collect()
    }

    /// Units of `item` charged before any draw: excluded, limit and locked.
    fn precharged(&self, item: &str) -> u32 {
        let options = self.options;
        let limited = options
            .item_limits()
            .filter(|(name, _)| *name == item)
            .filter_map(|(_, limit)| {
                let cap = self.items.get(item)?.quantity?;
                Some(cap.saturating_sub(limit))
            })
            .sum::<u32>();
        options.excluded_items.get(item).copied().unwrap_or(0)
            + limited
            + options.locked_items.get(item).copied().unwrap_or(0)
    }

    /// Locations the run needs regardless of randomness: excluded and locked
    /// units, the starter and goal locks, and, without a material window,
    /// every bounded progression unit not already charged.
    pub fn mandatory_count(&self) -> usize {
        let mut count =
            unit_count(&self.options.excluded_items) + unit_count(&self.options.locked_items);
        if self.options.early_material > 0 {
            count += 1;
        }
        if self.items.goal().is_some() {
            count += 1;
        }
        if self.options.material.is_none() {
            count += self
                .eligible(ItemClass::Progression)
                .iter()
                .filter_map(|item| {
                    let cap = item.quantity?;
                    Some(cap.saturating_sub(self.precharged(&item.name)) as usize)
                })
                .sum::<usize>();
        }
        count
    }

    fn material_of(&self, item: &ItemDef, count: u32) -> u64 {
        if item.class == ItemClass::Progression {
            u64::from(item.material) * u64::from(count)
        } else {
            0
        }
    }

    /// Charges `count` forced units of `name`, refusing to pass its cap.
    fn charge(
        &self,
        option: &'static str,
        name: &str,
        count: u32,
        used: &mut ItemsUsed,
    ) -> GenerationResult<u64> {
        let item = self
            .items
            .get(name)
            .ok_or_else(|| GenerationError::UnknownItem(name.to_string()))?;
        if item.quantity.is_some_and(|cap| used.get(name) + count > cap) {
            return Err(GenerationError::InvalidOption {
                option,
                reason: format!("{count} x '{name}' exceeds its quantity cap"),
            });
        }
        used.add(name, count);
        Ok(self.material_of(item, count))
    }

    pub fn allocate<R: Rng + ?Sized>(
        &self,
        location_count: usize,
        rng: &mut R,
    ) -> GenerationResult<AllocatedPool> {
        let excluded = self.options.excluded_items.clone();
        let forced = &self.options.locked_items;
        if location_count == 0 && excluded.is_empty() && forced.is_empty() {
            return Ok(AllocatedPool::default());
        }

        let mut used = ItemsUsed::default();
        let mut spent = 0;
        for (name, &count) in &excluded {
            spent += self.charge("excluded_items", name, count, &mut used)?;
        }
        // Limits shrink the room left under a cap; they are never placed.
        for (name, limit) in self.options.item_limits() {
            if let Some(cap) = self.items.get(name).and_then(|item| item.quantity) {
                used.add(name, cap.saturating_sub(limit));
            }
        }

        let mut locked = Vec::new();
        if let Some(starter) = self.pick_starter(&used, rng)? {
            spent += self.charge("early_material", &starter, 1, &mut used)?;
            locked.push(Placement {
                location: self.options.starter_location.clone(),
                item: starter,
            });
        }
        if let Some(goal) = self.items.goal() {
            used.add(goal, 1);
            locked.push(Placement {
                location: self.options.goal_location.clone(),
                item: goal.to_string(),
            });
        }

        let preplaced = unit_count(&excluded) + locked.len();
        let mandatory = preplaced + unit_count(forced);
        if mandatory > location_count {
            return Err(GenerationError::LocationShortfall {
                mandatory,
                available: location_count,
            });
        }
        let open = location_count - preplaced;

        let mut pool = Vec::with_capacity(open);
        for (name, &count) in forced {
            spent += self.charge("locked_items", name, count, &mut used)?;
            pool.extend((0..count).map(|_| name.clone()));
        }

        let mut budget = self.options.material.map(|window| {
            let min = u64::from(window.min_material) * MATERIAL_UNIT;
            let max = (u64::from(window.max_material) * MATERIAL_UNIT).max(min);
            MaterialBudget {
                target: rng.gen_range(min..=max),
                ceiling: max,
                spent,
            }
        });

        self.fill(
            ItemClass::Progression,
            open,
            &mut pool,
            &mut used,
            budget.as_mut(),
            rng,
        );
        self.fill(ItemClass::Useful, open, &mut pool, &mut used, None, rng);
        self.fill(ItemClass::Filler, open, &mut pool, &mut used, None, rng);

        if pool.len() != open {
            return Err(GenerationError::PoolSizeMismatch {
                actual: pool.len(),
                preplaced,
                expected: location_count,
            });
        }

        let material = match budget {
            Some(budget) => MaterialReport {
                target: Some(budget.target),
                ceiling: Some(budget.ceiling),
                spent: budget.spent,
            },
            None => MaterialReport {
                target: None,
                ceiling: None,
                spent,
            },
        };
        Ok(AllocatedPool {
            items: pool,
            locked,
            excluded,
            used,
            material,
        })
    }

    fn pick_starter<R: Rng + ?Sized>(
        &self,
        used: &ItemsUsed,
        rng: &mut R,
    ) -> GenerationResult<Option<String>> {
        let early_material = self.options.early_material;
        if early_material == 0 {
            return Ok(None);
        }
        let tiers = self.items.starter_tiers();
        let wanted = [
            early_material == 1 || early_material > 4,
            early_material == 2 || early_material > 3,
            early_material > 2,
        ];
        let mut eligible: Vec<&str> = tiers
            .iter()
            .zip(wanted)
            .filter(|(_, wanted)| *wanted)
            .map(|(name, _)| name.as_str())
            .filter(|name| !self.options.non_local_items.contains(*name))
            .filter(|name| self.items.get(name).is_some_and(|item| used.can_add_more(item)))
            .collect();
        eligible.sort_unstable();
        if eligible.is_empty() {
            return Err(GenerationError::NoEligibleStarter { early_material });
        }
        let chosen = eligible[rng.gen_range(0..eligible.len())];
        Ok(Some(chosen.to_string()))
    }

    fn fill<R: Rng + ?Sized>(
        &self,
        class: ItemClass,
        open: usize,
        pool: &mut Vec<String>,
        used: &mut ItemsUsed,
        mut budget: Option<&mut MaterialBudget>,
        rng: &mut R,
    ) {
        let mut candidates = Candidates::new(self.eligible(class));
        while pool.len() < open {
            if budget.as_ref().is_some_and(|b| !b.wants_more()) {
                break;
            }
            let Some(index) = candidates.draw(rng) else {
                break;
            };
            let item = candidates.entries[index];
            if budget.as_ref().is_some_and(|b| !b.fits(item)) {
                candidates.remove(index);
                continue;
            }
            if !used.has_prereqs(item) {
                candidates.park(index);
                continue;
            }
            if !used.can_add_more(item) {
                candidates.remove(index);
                continue;
            }
            used.add(&item.name, 1);
            pool.push(item.name.clone());
            if let Some(budget) = budget.as_mut() {
                budget.spent += u64::from(item.material);
            }
            candidates.unpark_all();
        }
        debug!(
            ?class,
            pool = pool.len(),
            open,
            spent = ?budget.as_ref().map(|b| b.spent),
            "allocation loop finished"
        );
    }
}
