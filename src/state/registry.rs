use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, info};

use crate::infra::{Direction, Position};
use crate::state::{AgentId, ArenaSnapshot};

/// What an agent did on the last tick it was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentAction {
    #[default]
    Idle,
    EmergencyEscape,
    ContinueEscape,
    DangerEscape,
    SpreadOut,
    PlaceBomb,
    FollowUpEscape,
    MoveToBombSpot,
    MoveToTarget,
    Patrol,
}

/// Multi-tick retreat bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscapeState {
    pub ticks_remaining: u32,
    pub origin: Option<Position>,
    pub direction: Option<Direction>,
}

impl EscapeState {
    pub fn is_active(&self) -> bool {
        self.ticks_remaining > 0
    }

    pub fn arm(&mut self, ticks: u32, origin: Position, direction: Option<Direction>) {
        self.ticks_remaining = ticks;
        self.origin = Some(origin);
        self.direction = direction;
    }

    /// End the escape. Origin and direction stay for a later follow-up retreat.
    pub fn finish(&mut self) {
        self.ticks_remaining = 0;
    }

    /// Manhattan distance travelled since the escape started.
    pub fn displacement(&self, pos: &Position) -> i32 {
        self.origin.map_or(0, |origin| origin.distance(pos))
    }
}

/// Persistent per-agent record, created on first sighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentState {
    /// Zone index in `0..3`.
    pub group: u32,
    pub preferred_direction: usize,
    pub bomb_cooldown: u32,
    pub last_action: AgentAction,
    pub last_target: Option<Position>,
    pub escape: EscapeState,
}

impl AgentState {
    pub fn new(group: u32, preferred_direction: usize) -> Self {
        Self {
            group,
            preferred_direction,
            bomb_cooldown: 0,
            last_action: AgentAction::Idle,
            last_target: None,
            escape: EscapeState::default(),
        }
    }

    pub fn preferred(&self) -> Direction {
        Direction::from_index(self.preferred_direction)
    }
}

/// Agent records keyed by id, plus the round-robin zone counter.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, AgentState>,
    group_counter: u32,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &AgentId) -> Option<&AgentState> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut AgentState> {
        self.agents.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.contains_key(id)
    }

    /// Create a record for an unseen agent. The zone counter advances only here.
    pub fn observe<R: Rng>(&mut self, id: &AgentId, rng: &mut R) -> &mut AgentState {
        let counter = &mut self.group_counter;
        self.agents.entry(id.clone()).or_insert_with(|| {
            let group = *counter % 3;
            *counter += 1;
            let preferred_direction = rng.random_range(0..Direction::ALL.len());
            info!(
                "🎯 Agent {} assigned to zone {}, preferred direction {:?}",
                id,
                group,
                Direction::from_index(preferred_direction)
            );
            AgentState::new(group, preferred_direction)
        })
    }

    /// Insert or replace a record without touching the zone counter.
    pub fn insert(&mut self, id: AgentId, state: AgentState) {
        self.agents.insert(id, state);
    }

    /// Drop records of agents that are dead or missing from `snapshot`.
    pub fn prune(&mut self, snapshot: &ArenaSnapshot) {
        let before = self.agents.len();
        self.agents.retain(|id, _| snapshot.is_alive(id));
        let removed = before - self.agents.len();
        if removed > 0 {
            debug!("Pruned {} registry entries for dead or absent agents", removed);
        }
    }

    pub fn decrement_cooldowns(&mut self) {
        for state in self.agents.values_mut() {
            state.bomb_cooldown = state.bomb_cooldown.saturating_sub(1);
        }
    }

    /// Last targets of living agents other than `id`.
    pub fn claimed_targets<'a>(
        &'a self,
        snapshot: &'a ArenaSnapshot,
        id: &'a AgentId,
    ) -> impl Iterator<Item = Position> + 'a {
        snapshot
            .other_living_agents(id)
            .filter_map(|(other, _)| self.agents.get(other).and_then(|state| state.last_target))
    }
}
