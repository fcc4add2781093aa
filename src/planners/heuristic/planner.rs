use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::infra::Position;
use crate::planners::heuristic::{
    BombPlanner, Command, DangerAssessor, Deconflictor, EngineConfig, EscapePlanner,
    MovementPlanner, TargetSelector,
};
use crate::state::{AgentAction, AgentId, AgentRegistry, ArenaSnapshot, FriendlyAgent};

/// Outcome of evaluating one agent, before it is written to the registry.
#[derive(Debug)]
struct Decision {
    action: AgentAction,
    path: Vec<Position>,
    bomb: bool,
    target: Option<Position>,
}

impl Decision {
    fn new(action: AgentAction, path: Vec<Position>) -> Self {
        Self {
            action,
            path,
            bomb: false,
            target: None,
        }
    }

    fn heading_for(mut self, target: Position) -> Self {
        self.target = Some(target);
        self
    }
}

/// Turns arena snapshots into per-agent commands, one evaluated tick at a time.
///
/// Rules are tried in priority order and the first that applies wins:
/// emergency escape, continued escape, danger escape, spreading out, bombing
/// in place, follow-up retreat, moving to a bomb spot, moving to a target and
/// finally patrolling.
pub struct StrategyPlanner {
    config: EngineConfig,
    registry: AgentRegistry,
    rng: StdRng,
    tick: u64,
}

impl StrategyPlanner {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Same seed and same snapshots give the same commands.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, rng: StdRng) -> Self {
        Self {
            config,
            registry: AgentRegistry::new(),
            rng,
            tick: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AgentRegistry {
        &mut self.registry
    }

    /// Number of snapshots seen so far, including skipped ones.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Commands for this snapshot. Only every second call does any work;
    /// agents with nothing to do are left out.
    #[tracing::instrument(level = "debug", skip_all, fields(tick = self.tick + 1))]
    pub fn decide_commands(&mut self, snapshot: &ArenaSnapshot) -> Vec<Command> {
        self.tick += 1;
        if self.tick % 2 != 0 {
            debug!("Skipping odd tick");
            return Vec::new();
        }

        self.registry.prune(snapshot);
        for agent in snapshot.agents.iter().filter(|agent| agent.alive) {
            self.registry.observe(&agent.id, &mut self.rng);
        }
        self.registry.decrement_cooldowns();

        let mut commands = Vec::new();
        let mut reserved = Vec::new();
        for agent in &snapshot.agents {
            if !agent.alive || !agent.can_move {
                continue;
            }
            let Some(pos) = agent.position.filter(|pos| snapshot.in_bounds(pos)) else {
                warn!("Agent {} has no usable position, skipping", agent.id);
                continue;
            };
            if let Some(command) = self.evaluate_agent(snapshot, agent, pos, &reserved) {
                if command.path.len() > 1
                    && let Some(landing) = command.path.last()
                {
                    reserved.push(*landing);
                }
                commands.push(command);
            }
        }

        debug!("{} commands for {} agents", commands.len(), snapshot.agents.len());
        commands
    }

    fn evaluate_agent(
        &mut self,
        snapshot: &ArenaSnapshot,
        agent: &FriendlyAgent,
        pos: Position,
        reserved: &[Position],
    ) -> Option<Command> {
        let decision = match self.escape_decision(snapshot, &agent.id, pos) {
            Some(decision) => decision,
            None => self.tactical_decision(snapshot, agent, pos, reserved)?,
        };
        debug!(
            "Agent {} at {}: {:?} via {:?}",
            agent.id, pos, decision.action, decision.path
        );
        self.record(&agent.id, pos, &decision);

        let command = if decision.bomb {
            Command::bomb_and_move(agent.id.clone(), pos, decision.path)
        } else {
            Command::movement(agent.id.clone(), decision.path)
        };
        (!command.is_noop()).then_some(command)
    }

    /// Rules that get an agent out of harm's way. Updates the escape state
    /// in place.
    fn escape_decision(
        &mut self,
        snapshot: &ArenaSnapshot,
        id: &AgentId,
        pos: Position,
    ) -> Option<Decision> {
        let config = &self.config;
        let escape = EscapePlanner::new(snapshot, config);

        if snapshot.is_bomb(&pos) || snapshot.is_adjacent_to_bomb(&pos) {
            warn!("🚨 Agent {} is next to a bomb at {}", id, pos);
            return Some(Decision::new(
                AgentAction::EmergencyEscape,
                escape.emergency_escape(pos),
            ));
        }

        let danger = DangerAssessor::new(snapshot, config);
        let in_danger = danger.is_in_danger_zone(&pos);
        let state = self.registry.get_mut(id)?;

        let mut ended_escape = false;
        if state.escape.is_active() {
            if in_danger && state.escape.displacement(&pos) < config.escape_displacement {
                state.escape.ticks_remaining -= 1;
                let path = escape.continue_escape(pos, state.escape.direction);
                return Some(Decision::new(AgentAction::ContinueEscape, path));
            }
            debug!("Agent {} ends its escape at {}", id, pos);
            state.escape.finish();
            ended_escape = true;
        }

        if in_danger {
            let direction = danger.find_safest_direction(&pos);
            debug!("Agent {} in a blast line, fleeing {:?}", id, direction);
            let path = escape.continue_escape(pos, Some(direction));
            // An escape that just ran out stays ended for this tick.
            if !ended_escape {
                let first_step = path.get(1).and_then(|next| pos.direction_to(next));
                state.escape.arm(config.escape_ticks, pos, first_step);
            }
            return Some(Decision::new(AgentAction::DangerEscape, path));
        }

        None
    }

    /// Everything an agent does when it is safe. `reserved` holds the cells
    /// agents evaluated earlier this tick are moving to.
    fn tactical_decision(
        &mut self,
        snapshot: &ArenaSnapshot,
        agent: &FriendlyAgent,
        pos: Position,
        reserved: &[Position],
    ) -> Option<Decision> {
        let id = &agent.id;
        let state = self.registry.get(id)?.clone();
        let config = &self.config;
        let rng = &mut self.rng;
        let movement = MovementPlanner::new(snapshot, &self.registry, config).with_reserved(reserved);

        if Deconflictor::new(snapshot, &self.registry, config).is_crowded(id, &pos) {
            return Some(Decision::new(
                AgentAction::SpreadOut,
                movement.spread_out(id, pos, state.group, rng),
            ));
        }

        let bombs = BombPlanner::new(snapshot, config);
        if let Some(trigger) = bombs.evaluate_current_cell(agent, &state, &pos) {
            let path = EscapePlanner::new(snapshot, config).compute_escape_path(pos);
            if path.len() < 2 {
                warn!("Agent {} holds its bomb at {}: no way out", id, pos);
                return Some(Decision::new(
                    AgentAction::Patrol,
                    movement.patrol(id, pos, state.group, rng),
                ));
            }
            info!("💣 Agent {} bombs {} ({:?})", id, pos, trigger);
            return Some(Decision {
                bomb: true,
                ..Decision::new(AgentAction::PlaceBomb, path)
            });
        }

        if state.last_action == AgentAction::PlaceBomb {
            let path = EscapePlanner::new(snapshot, config).continue_escape(pos, state.escape.direction);
            return Some(Decision::new(AgentAction::FollowUpEscape, path));
        }

        if let Some(spot) = bombs.find_strategic_bomb_placement(pos) {
            let path = movement.move_to_target(id, pos, &state, spot);
            return Some(Decision::new(AgentAction::MoveToBombSpot, path).heading_for(spot));
        }

        let selector = TargetSelector::new(snapshot, &self.registry, config);
        if let Some(target) = selector.find_individual_target(id, pos, &state) {
            let path = movement.move_to_target(id, pos, &state, target);
            return Some(Decision::new(AgentAction::MoveToTarget, path).heading_for(target));
        }

        Some(Decision::new(
            AgentAction::Patrol,
            movement.patrol(id, pos, state.group, rng),
        ))
    }

    fn record(&mut self, id: &AgentId, pos: Position, decision: &Decision) {
        let Some(state) = self.registry.get_mut(id) else {
            return;
        };
        state.last_action = decision.action;
        if decision.target.is_some() {
            state.last_target = decision.target;
        }
        if decision.bomb {
            state.bomb_cooldown = self.config.bomb_cooldown;
            let first_step = decision.path.get(1).and_then(|next| pos.direction_to(next));
            state.escape.arm(self.config.escape_ticks, pos, first_step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Direction;
    use crate::state::AgentState;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn planner() -> StrategyPlanner {
        StrategyPlanner::with_seed(EngineConfig::default(), 11)
    }

    /// Runs the skipped odd tick, then the evaluated one.
    fn evaluate(planner: &mut StrategyPlanner, snapshot: &ArenaSnapshot) -> Vec<Command> {
        assert!(planner.decide_commands(snapshot).is_empty());
        planner.decide_commands(snapshot)
    }

    #[test]
    fn test_odd_ticks_are_skipped() {
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_bombs([pos(5, 5)])
            .with_agent(FriendlyAgent::new("a", pos(5, 5)));
        let mut planner = planner();

        assert!(planner.decide_commands(&snapshot).is_empty());
        assert_eq!(planner.tick(), 1);
        assert!(planner.registry().is_empty());
        assert_eq!(planner.decide_commands(&snapshot).len(), 1);
        assert!(planner.decide_commands(&snapshot).is_empty());
    }

    #[test]
    fn test_agent_on_bomb_escapes_first_free_direction() {
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_bombs([pos(5, 5)])
            .with_agent(FriendlyAgent::new("a", pos(5, 5)));
        let mut planner = planner();

        let commands = evaluate(&mut planner, &snapshot);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].path, vec![pos(5, 5), pos(6, 5), pos(7, 5)]);
        assert_eq!(commands[0].bomb, None);
        let state = planner.registry().get(&AgentId::new("a")).unwrap();
        assert_eq!(state.last_action, AgentAction::EmergencyEscape);
    }

    #[test]
    fn test_bomb_placement_arms_escape_and_cooldown() {
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_destructible([pos(6, 5), pos(5, 6)])
            .with_agent(FriendlyAgent::new("a", pos(5, 5)));
        let mut planner = planner();

        let commands = evaluate(&mut planner, &snapshot);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].bomb, Some(pos(5, 5)));
        assert_eq!(commands[0].path, vec![pos(5, 5), pos(4, 5), pos(3, 5), pos(2, 5)]);

        let state = planner.registry().get(&AgentId::new("a")).unwrap();
        assert_eq!(state.last_action, AgentAction::PlaceBomb);
        assert_eq!(state.bomb_cooldown, 6);
        assert_eq!(state.escape.ticks_remaining, 4);
        assert_eq!(state.escape.origin, Some(pos(5, 5)));
        assert_eq!(state.escape.direction, Some(Direction::West));
    }

    #[test]
    fn test_no_bomb_without_escape_route() {
        let snapshot = ArenaSnapshot::new(3, 3)
            .with_destructible([pos(0, 1), pos(2, 1), pos(1, 0), pos(1, 2)])
            .with_agent(FriendlyAgent::new("a", pos(1, 1)));
        let mut planner = planner();

        let commands = evaluate(&mut planner, &snapshot);
        assert!(commands.is_empty());
        let state = planner.registry().get(&AgentId::new("a")).unwrap();
        assert_eq!(state.last_action, AgentAction::Patrol);
        assert_eq!(state.bomb_cooldown, 0);
        assert!(!state.escape.is_active());
    }

    #[test]
    fn test_escape_continues_while_in_danger() {
        let config = EngineConfig {
            blast_radius: 2,
            ..EngineConfig::default()
        };
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_bombs([pos(5, 5)])
            .with_agent(FriendlyAgent::new("a", pos(5, 7)));
        let mut planner = StrategyPlanner::with_seed(config, 3);
        let mut state = AgentState::new(0, 0);
        state.escape.arm(2, pos(5, 6), Some(Direction::South));
        planner.registry_mut().insert(AgentId::new("a"), state);

        let commands = evaluate(&mut planner, &snapshot);
        assert_eq!(commands[0].path, vec![pos(5, 7), pos(5, 8), pos(5, 9)]);
        let state = planner.registry().get(&AgentId::new("a")).unwrap();
        assert_eq!(state.last_action, AgentAction::ContinueEscape);
        assert_eq!(state.escape.ticks_remaining, 1);
    }

    #[test]
    fn test_escape_ends_once_safe() {
        let snapshot = ArenaSnapshot::new(10, 10).with_agent(FriendlyAgent::new("a", pos(5, 7)));
        let mut planner = planner();
        let mut state = AgentState::new(0, 0);
        state.escape.arm(3, pos(5, 6), Some(Direction::South));
        planner.registry_mut().insert(AgentId::new("a"), state);

        evaluate(&mut planner, &snapshot);
        let state = planner.registry().get(&AgentId::new("a")).unwrap();
        assert_eq!(state.escape.ticks_remaining, 0);
        assert_ne!(state.last_action, AgentAction::ContinueEscape);
    }

    #[test]
    fn test_escape_ends_at_displacement_limit_while_in_danger() {
        let config = EngineConfig {
            blast_radius: 6,
            ..EngineConfig::default()
        };
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_bombs([pos(5, 0)])
            .with_agent(FriendlyAgent::new("a", pos(5, 6)));
        let mut planner = StrategyPlanner::with_seed(config, 3);
        let mut state = AgentState::new(0, 0);
        state.escape.arm(3, pos(5, 2), Some(Direction::South));
        planner.registry_mut().insert(AgentId::new("a"), state);

        let commands = evaluate(&mut planner, &snapshot);
        assert_eq!(commands.len(), 1);
        let state = planner.registry().get(&AgentId::new("a")).unwrap();
        assert_eq!(state.last_action, AgentAction::DangerEscape);
        assert_eq!(state.escape.ticks_remaining, 0);
        assert_eq!(state.escape.origin, Some(pos(5, 2)));
    }

    #[test]
    fn test_later_agent_keeps_clear_of_earlier_landing_cell() {
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_agent(FriendlyAgent::new("a", pos(2, 5)))
            .with_agent(FriendlyAgent::new("b", pos(5, 5)));
        let mut planner = planner();

        let commands = evaluate(&mut planner, &snapshot);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].path, vec![pos(2, 5), pos(3, 5)]);
        // West would end next to the cell "a" is moving to.
        assert_eq!(commands[1].path, vec![pos(5, 5), pos(5, 4)]);
    }

    #[test]
    fn test_danger_escape_arms_escape() {
        let config = EngineConfig {
            blast_radius: 3,
            ..EngineConfig::default()
        };
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_bombs([pos(5, 2)])
            .with_agent(FriendlyAgent::new("a", pos(5, 5)));
        let mut planner = StrategyPlanner::with_seed(config, 3);

        let commands = evaluate(&mut planner, &snapshot);
        assert_eq!(commands.len(), 1);
        let state = planner.registry().get(&AgentId::new("a")).unwrap();
        assert_eq!(state.last_action, AgentAction::DangerEscape);
        assert!(state.escape.is_active());
        assert_eq!(state.escape.origin, Some(pos(5, 5)));
    }

    #[test]
    fn test_same_seed_same_commands() {
        let snapshot = ArenaSnapshot::new(12, 12)
            .with_destructible([pos(8, 8), pos(2, 9)])
            .with_enemies([pos(10, 1)])
            .with_agent(FriendlyAgent::new("a", pos(1, 1)))
            .with_agent(FriendlyAgent::new("b", pos(6, 6)))
            .with_agent(FriendlyAgent::new("c", pos(10, 10)));

        let mut first = StrategyPlanner::with_seed(EngineConfig::default(), 99);
        let mut second = StrategyPlanner::with_seed(EngineConfig::default(), 99);
        for _ in 0..6 {
            assert_eq!(first.decide_commands(&snapshot), second.decide_commands(&snapshot));
        }
    }

    #[test]
    fn test_dead_and_unplaced_agents_are_skipped() {
        let mut dead = FriendlyAgent::new("dead", pos(1, 1));
        dead.alive = false;
        let mut lost = FriendlyAgent::new("lost", pos(1, 1));
        lost.position = None;
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_bombs([pos(5, 5)])
            .with_agent(dead)
            .with_agent(lost)
            .with_agent(FriendlyAgent::new("a", pos(5, 5)));
        let mut planner = planner();
        planner
            .registry_mut()
            .insert(AgentId::new("dead"), AgentState::new(0, 0));

        let commands = evaluate(&mut planner, &snapshot);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].agent_id, AgentId::new("a"));
        assert!(!planner.registry().contains(&AgentId::new("dead")));
    }

    #[test]
    fn test_immobile_agent_gets_no_command() {
        let mut stuck = FriendlyAgent::new("a", pos(5, 5));
        stuck.can_move = false;
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_bombs([pos(5, 5)])
            .with_agent(stuck);
        let mut planner = planner();

        assert!(evaluate(&mut planner, &snapshot).is_empty());
        assert!(planner.registry().contains(&AgentId::new("a")));
    }
}
