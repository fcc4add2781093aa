pub mod boosters;
pub mod heuristic;

pub use boosters::BoosterPlanner;
