use crate::infra::{ApiError, ArenaResponse, Booster, BoosterState};
use crate::planners::heuristic::Command;

/// Trait for observing runner events, one call per event per tick
pub trait GameObserver {
    /// Called before the first request of a tick
    fn on_tick_start(&mut self, tick_id: &str);

    /// Called when the arena has been fetched
    fn on_arena_received(&mut self, tick_id: &str, arena: &ArenaResponse);

    /// Called with the current upgrade levels
    fn on_booster_state(&mut self, _tick_id: &str, _state: &BoosterState) {
        // Default implementation does nothing
    }

    /// Called when the engine has chosen this tick's commands
    fn on_commands_chosen(&mut self, tick_id: &str, commands: &[Command]);

    /// Called after a purchase attempt
    fn on_booster_purchase(&mut self, tick_id: &str, booster: &Booster, result: &Result<(), ApiError>);

    /// Called when a tick has failed every attempt
    fn on_tick_failed(&mut self, tick_id: &str, error: &ApiError);
}
