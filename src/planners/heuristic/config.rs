use std::env;
use std::str::FromStr;

/// Tuning knobs of the decision engine.
///
/// Radii named "exclusive" compare with `<`, the rest with `<=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cells a blast travels along a row or column.
    pub blast_radius: i32,
    /// Manhattan range at which enemies and walls are considered.
    pub vision_radius: i32,
    /// Evaluated ticks an agent waits after placing a bomb.
    pub bomb_cooldown: u32,
    /// Evaluated ticks an escape stays armed after placing a bomb.
    pub escape_ticks: u32,
    /// Displacement from the escape origin at which an escape ends.
    pub escape_displacement: i32,
    /// Length of the straight retreat the escape planner looks for.
    pub escape_length: i32,
    /// Exclusive radius for counting crowding agents.
    pub crowding_radius: i32,
    /// Number of nearby agents that counts as a crowd.
    pub crowding_count: usize,
    /// Exclusive radius around other agents a move may not enter.
    pub spacing_radius: i32,
    /// Exclusive radius within which another agent's target counts as claimed.
    pub claim_radius: i32,
    /// Exclusive lower bound on the average distance a spread-out cell needs.
    pub spread_min_average: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            blast_radius: 1,
            vision_radius: 5,
            bomb_cooldown: 6,
            escape_ticks: 4,
            escape_displacement: 4,
            escape_length: 3,
            crowding_radius: 3,
            crowding_count: 2,
            spacing_radius: 2,
            claim_radius: 3,
            spread_min_average: 4,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `BOMBER_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            blast_radius: get_env_var("BOMBER_BLAST_RADIUS").unwrap_or(defaults.blast_radius),
            vision_radius: get_env_var("BOMBER_VISION_RADIUS").unwrap_or(defaults.vision_radius),
            bomb_cooldown: get_env_var("BOMBER_BOMB_COOLDOWN").unwrap_or(defaults.bomb_cooldown),
            escape_ticks: get_env_var("BOMBER_ESCAPE_TICKS").unwrap_or(defaults.escape_ticks),
            escape_displacement: get_env_var("BOMBER_ESCAPE_DISPLACEMENT")
                .unwrap_or(defaults.escape_displacement),
            escape_length: get_env_var("BOMBER_ESCAPE_LENGTH").unwrap_or(defaults.escape_length),
            ..defaults
        }
    }
}

pub(crate) fn get_env_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.parse::<T>().ok())
}
