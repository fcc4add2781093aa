use std::collections::HashSet;
use std::fmt;

use crate::infra::Position;

/// Stable identifier of a friendly agent, as reported by the arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct FriendlyAgent {
    pub id: AgentId,
    /// `None` when the arena sent a malformed position; such agents never act.
    pub position: Option<Position>,
    pub alive: bool,
    pub can_move: bool,
    pub bombs_available: i32,
}

impl FriendlyAgent {
    pub fn new(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: AgentId::new(id),
            position: Some(position),
            alive: true,
            can_move: true,
            bombs_available: 1,
        }
    }

    /// Position of a living agent, if known.
    pub fn live_position(&self) -> Option<Position> {
        if self.alive { self.position } else { None }
    }
}

/// One tick's read-only view of the arena.
///
/// `indestructible` cells never disappear; `destructible` cells are the walls
/// bombs are meant to clear. Both stop a blast and both block movement.
#[derive(Debug, Clone, Default)]
pub struct ArenaSnapshot {
    pub width: i32,
    pub height: i32,
    pub indestructible: HashSet<Position>,
    pub destructible: HashSet<Position>,
    pub bombs: Vec<Position>,
    pub agents: Vec<FriendlyAgent>,
    pub enemies: Vec<Position>,
}

impl ArenaSnapshot {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_indestructible(mut self, cells: impl IntoIterator<Item = Position>) -> Self {
        self.indestructible.extend(cells);
        self
    }

    pub fn with_destructible(mut self, cells: impl IntoIterator<Item = Position>) -> Self {
        self.destructible.extend(cells);
        self
    }

    pub fn with_bombs(mut self, cells: impl IntoIterator<Item = Position>) -> Self {
        self.bombs.extend(cells);
        self
    }

    pub fn with_enemies(mut self, cells: impl IntoIterator<Item = Position>) -> Self {
        self.enemies.extend(cells);
        self
    }

    pub fn with_agent(mut self, agent: FriendlyAgent) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn is_destructible(&self, pos: &Position) -> bool {
        self.destructible.contains(pos)
    }

    /// Terrain that stops a blast: either wall kind.
    pub fn is_blocking_terrain(&self, pos: &Position) -> bool {
        self.indestructible.contains(pos) || self.destructible.contains(pos)
    }

    pub fn is_bomb(&self, pos: &Position) -> bool {
        self.bombs.contains(pos)
    }

    pub fn is_adjacent_to_bomb(&self, pos: &Position) -> bool {
        self.bombs.iter().any(|bomb| bomb.is_adjacent(pos))
    }

    pub fn is_enemy(&self, pos: &Position) -> bool {
        self.enemies.contains(pos)
    }

    pub fn is_occupied_by_agent(&self, pos: &Position) -> bool {
        self.living_agents().any(|(_, agent_pos)| agent_pos == *pos)
    }

    /// Terrain or a living friendly agent occupies the cell.
    pub fn is_obstructed(&self, pos: &Position) -> bool {
        self.is_blocking_terrain(pos) || self.is_occupied_by_agent(pos)
    }

    /// In bounds and not obstructed.
    pub fn is_passable(&self, pos: &Position) -> bool {
        self.in_bounds(pos) && !self.is_obstructed(pos)
    }

    /// In bounds, not obstructed and not carrying a bomb.
    pub fn is_free(&self, pos: &Position) -> bool {
        self.is_passable(pos) && !self.is_bomb(pos)
    }

    pub fn destructible_neighbor_count(&self, pos: &Position) -> usize {
        pos.neighbors()
            .iter()
            .filter(|cell| self.is_destructible(cell))
            .count()
    }

    pub fn nearest_bomb_distance(&self, pos: &Position) -> Option<i32> {
        self.bombs.iter().map(|bomb| bomb.distance(pos)).min()
    }

    /// Living agents with a known position, in snapshot order.
    pub fn living_agents(&self) -> impl Iterator<Item = (&AgentId, Position)> {
        self.agents
            .iter()
            .filter_map(|agent| agent.live_position().map(|pos| (&agent.id, pos)))
    }

    /// Living agents other than `id`, in snapshot order.
    pub fn other_living_agents<'a>(
        &'a self,
        id: &'a AgentId,
    ) -> impl Iterator<Item = (&'a AgentId, Position)> + 'a {
        self.living_agents().filter(move |(other, _)| *other != id)
    }

    pub fn is_alive(&self, id: &AgentId) -> bool {
        self.agents.iter().any(|agent| agent.alive && agent.id == *id)
    }
}
