pub mod board;
pub mod dispersal;
pub mod engine;
pub mod export;
pub mod plant;
pub mod rng;
pub mod scenario;
pub mod species;
pub mod tile;
pub mod topology;

pub use board::Board;
pub use engine::{Engine, EngineSettings, RunSummary};
pub use scenario::{Scenario, ScenarioLoader};
