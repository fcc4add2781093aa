pub mod game;
pub mod infra;
pub mod planners;
pub mod state;

// Re-export commonly used types for convenience
pub use game::{Game, RunnerConfig};
pub use infra::{Direction, Position};
pub use planners::heuristic::{Command, EngineConfig, StrategyPlanner};
pub use state::ArenaSnapshot;
