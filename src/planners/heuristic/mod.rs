mod bomb_placement;
mod command;
mod config;
mod danger;
mod deconflict;
mod escape;
mod movement;
mod planner;
mod targeting;

pub use bomb_placement::{BombPlanner, BombTrigger};
pub use command::Command;
pub use config::EngineConfig;
pub(crate) use config::get_env_var;
pub use danger::DangerAssessor;
pub use deconflict::Deconflictor;
pub use escape::EscapePlanner;
pub use movement::MovementPlanner;
pub use planner::StrategyPlanner;
pub use targeting::TargetSelector;
