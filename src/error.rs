use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("infeasible recipe shuffle: no beatable production map after {attempts} attempts")]
    InfeasibleShuffle { attempts: u32 },

    #[error("shuffle exclusion names unknown building '{0}'")]
    UnknownBuilding(String),

    #[error("requirement group is empty")]
    EmptyRequirementGroup,

    #[error("item '{0}' is not in the item table")]
    UnknownItem(String),

    #[error("no local, unexcluded starter for early_material = {early_material}")]
    NoEligibleStarter { early_material: u8 },

    #[error("{mandatory} mandatory items cannot fit in {available} locations")]
    LocationShortfall { mandatory: usize, available: usize },

    #[error("pool holds {actual} items plus {preplaced} pre-placed, expected {expected}")]
    PoolSizeMismatch {
        actual: usize,
        preplaced: usize,
        expected: usize,
    },

    #[error("invalid option {option}: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },
}

pub type GenerationResult<T> = Result<T, GenerationError>;
