use tracing::{error, info, warn};

use crate::infra::{ApiError, ArenaResponse, Booster, BoosterState, GameObserver};
use crate::planners::heuristic::Command;

/// Writes runner events to the log.
pub struct DefaultObserver;

impl GameObserver for DefaultObserver {
    fn on_tick_start(&mut self, tick_id: &str) {
        info!("[{}] ┌─── tick started", tick_id);
    }

    fn on_arena_received(&mut self, tick_id: &str, arena: &ArenaResponse) {
        info!(
            "[{}] │ ✓ arena: code={}, player={}, round={}, score={}",
            tick_id, arena.code, arena.player, arena.round, arena.raw_score
        );
        for message in &arena.errors {
            warn!("[{}] │ server reported: {}", tick_id, message);
        }
    }

    fn on_booster_state(&mut self, tick_id: &str, state: &BoosterState) {
        info!(
            "[{}] │ 📊 points={} speed={} bombs={} range={} view={} armor={} delay={}",
            tick_id,
            state.points,
            state.speed,
            state.bombs,
            state.bomb_range,
            state.view,
            state.armor,
            state.bomb_delay
        );
        if state.can_pass_bombs || state.can_pass_obstacles || state.can_pass_walls {
            info!(
                "[{}] │ 🚀 pass bombs={} obstacles={} walls={}",
                tick_id, state.can_pass_bombs, state.can_pass_obstacles, state.can_pass_walls
            );
        }
    }

    fn on_commands_chosen(&mut self, tick_id: &str, commands: &[Command]) {
        info!("[{}] │ {} commands", tick_id, commands.len());
        for command in commands {
            info!(
                "[{}] │   {}: {} steps{}",
                tick_id,
                command.agent_id,
                command.steps(),
                if command.bomb.is_some() { " + 💣" } else { "" }
            );
        }
    }

    fn on_booster_purchase(&mut self, tick_id: &str, booster: &Booster, result: &Result<(), ApiError>) {
        match result {
            Ok(()) => info!(
                "[{}] │ ✅ bought {} for {} points",
                tick_id, booster.booster_type, booster.cost
            ),
            Err(e) => error!("[{}] │ ❌ buying {} failed: {}", tick_id, booster.booster_type, e),
        }
    }

    fn on_tick_failed(&mut self, tick_id: &str, error: &ApiError) {
        error!("[{}] └─── tick failed after retries: {}", tick_id, error);
    }
}
