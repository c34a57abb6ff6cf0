use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GenerationError, GenerationResult};

pub const BASE_LOCATIONS: usize = 60;
pub const BIOMES: usize = 5;
pub const MAX_REPUTATION_PER_BIOME: u32 = 16;
pub const BLUEPRINT_MIN_REPUTATION_PER_BIOME: u32 = 11;
/// Highest reputation level that carries a location; reaching 18 wins.
const LAST_REPUTATION: u32 = 17;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPlan {
    /// `None` when the location count was fixed directly.
    pub reputation_per_biome: Option<u32>,
    pub total: usize,
    pub rep_indices: Vec<u32>,
}

impl LocationPlan {
    pub fn fixed(total: usize) -> Self {
        Self {
            reputation_per_biome: None,
            total,
            rep_indices: Vec::new(),
        }
    }

    pub fn with_reputation(per_biome: u32) -> Self {
        Self {
            reputation_per_biome: Some(per_biome),
            total: total_locations(per_biome),
            rep_indices: reputation_indices(per_biome),
        }
    }

    /// Plans the smallest reputation setting at or above `requested` that
    /// holds `mandatory` items. Blueprint items force at least
    /// [`BLUEPRINT_MIN_REPUTATION_PER_BIOME`].
    pub fn fit(requested: u32, blueprint_items: bool, mandatory: usize) -> GenerationResult<Self> {
        if requested > MAX_REPUTATION_PER_BIOME {
            return Err(GenerationError::InvalidOption {
                option: "reputation_locations_per_biome",
                reason: format!("{requested} is above the maximum of {MAX_REPUTATION_PER_BIOME}"),
            });
        }
        let mut per_biome = requested;
        if blueprint_items && per_biome < BLUEPRINT_MIN_REPUTATION_PER_BIOME {
            warn!(
                requested,
                raised_to = BLUEPRINT_MIN_REPUTATION_PER_BIOME,
                "blueprint items need more reputation locations"
            );
            per_biome = BLUEPRINT_MIN_REPUTATION_PER_BIOME;
        }
        let before = per_biome;
        while total_locations(per_biome) < mandatory && per_biome < MAX_REPUTATION_PER_BIOME {
            per_biome += 1;
        }
        if total_locations(per_biome) < mandatory {
            return Err(GenerationError::LocationShortfall {
                mandatory,
                available: total_locations(per_biome),
            });
        }
        if per_biome != before {
            warn!(
                from = before,
                to = per_biome,
                mandatory,
                "raised reputation locations per biome to fit mandatory items"
            );
        }
        Ok(Self::with_reputation(per_biome))
    }
}

pub fn total_locations(per_biome: u32) -> usize {
    BASE_LOCATIONS + BIOMES * per_biome as usize
}

/// Reputation levels that carry a location in every biome: always the first,
/// then `per_biome` levels spread evenly over 2..=17.
pub fn reputation_indices(per_biome: u32) -> Vec<u32> {
    let slots = per_biome + 1;
    let mut indices = vec![1];
    indices.extend((1..=per_biome).map(|step| {
        let numerator = step * LAST_REPUTATION;
        // round(1 + numerator / slots), halves rounding up
        1 + (2 * numerator + slots) / (2 * slots)
    }));
    indices
}
