//! Keeps agents from chasing the same target or piling onto each other.

use crate::infra::Position;
use crate::planners::heuristic::EngineConfig;
use crate::state::{AgentId, AgentRegistry, ArenaSnapshot};

pub struct Deconflictor<'a> {
    snapshot: &'a ArenaSnapshot,
    registry: &'a AgentRegistry,
    config: &'a EngineConfig,
    /// Cells earlier agents are moving to this tick.
    reserved: &'a [Position],
}

impl<'a> Deconflictor<'a> {
    pub fn new(
        snapshot: &'a ArenaSnapshot,
        registry: &'a AgentRegistry,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            snapshot,
            registry,
            config,
            reserved: &[],
        }
    }

    pub fn with_reserved(mut self, reserved: &'a [Position]) -> Self {
        self.reserved = reserved;
        self
    }

    /// Another living agent's last target lies close to `target`.
    pub fn is_target_claimed(&self, id: &AgentId, target: &Position) -> bool {
        self.registry
            .claimed_targets(self.snapshot, id)
            .any(|claimed| claimed.distance(target) < self.config.claim_radius)
    }

    pub fn is_crowded(&self, id: &AgentId, pos: &Position) -> bool {
        self.snapshot
            .other_living_agents(id)
            .filter(|(_, other)| other.distance(pos) < self.config.crowding_radius)
            .count()
            >= self.config.crowding_count
    }

    /// Another agent stands, or is about to stand, within the spacing radius.
    pub fn is_too_close(&self, id: &AgentId, cell: &Position) -> bool {
        let spacing = self.config.spacing_radius;
        self.snapshot
            .other_living_agents(id)
            .any(|(_, other)| other.distance(cell) < spacing)
            || self.reserved.iter().any(|taken| taken.distance(cell) < spacing)
    }

    /// A cell `id` may step onto: passable and not crowding anybody.
    pub fn is_admissible(&self, id: &AgentId, cell: &Position) -> bool {
        self.snapshot.is_passable(cell) && !self.is_too_close(id, cell)
    }

    /// Integer mean distance from `cell` to every other living agent, 0 when alone.
    pub fn average_distance_to_others(&self, id: &AgentId, cell: &Position) -> i32 {
        let (total, count) = self
            .snapshot
            .other_living_agents(id)
            .fold((0, 0), |(total, count), (_, other)| (total + other.distance(cell), count + 1));
        if count == 0 { 0 } else { total / count }
    }
}
