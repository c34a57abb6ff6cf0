pub mod catalog;
pub mod combinations;
pub mod config;
pub mod error;
pub mod generation;
pub mod locations;
pub mod logic;
pub mod output;
pub mod pool;
pub mod production;
pub mod rng;

pub use config::{Scenario, ScenarioLoader};
pub use error::{GenerationError, GenerationResult};
pub use generation::{GenerationOutput, Generator};
pub use logic::{HeldItems, Holdings, LogicRules, RecipeLogic};
