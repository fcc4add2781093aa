//! Greedy, single-hop movement. Paths start at the agent's own cell and only
//! ever cover one to two further cells.

use rand::Rng;
use tracing::debug;

use crate::infra::{Direction, Position};
use crate::planners::heuristic::{Deconflictor, EngineConfig};
use crate::state::{AgentId, AgentRegistry, AgentState, ArenaSnapshot};

use Direction::{East, North, South, West};

/// Detour orders, indexed by an agent's preferred direction.
const PREFERRED_ROTATIONS: [[Direction; 4]; 4] = [
    [East, South, North, West],
    [West, South, North, East],
    [South, East, West, North],
    [North, East, West, South],
];

/// Patrol orders, indexed by zone.
const ZONE_PATROL_ORDERS: [[Direction; 4]; 3] = [
    [East, South, North, West],
    [West, North, South, East],
    [South, East, West, North],
];

pub struct MovementPlanner<'a> {
    snapshot: &'a ArenaSnapshot,
    deconflictor: Deconflictor<'a>,
    config: &'a EngineConfig,
}

impl<'a> MovementPlanner<'a> {
    pub fn new(
        snapshot: &'a ArenaSnapshot,
        registry: &'a AgentRegistry,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            snapshot,
            deconflictor: Deconflictor::new(snapshot, registry, config),
            config,
        }
    }

    /// Keep clear of cells other agents are moving to this tick.
    pub fn with_reserved(mut self, reserved: &'a [Position]) -> Self {
        self.deconflictor = self.deconflictor.with_reserved(reserved);
        self
    }

    /// One greedy step towards `target`, or a detour when someone else is
    /// already heading there.
    #[tracing::instrument(level = "debug", skip(self, state))]
    pub fn move_to_target(
        &self,
        id: &AgentId,
        pos: Position,
        state: &AgentState,
        target: Position,
    ) -> Vec<Position> {
        if self.deconflictor.is_target_claimed(id, &target) {
            debug!("Target {} is contested, taking an offset route", target);
            return self.offset_route(id, pos, state.preferred_direction);
        }

        let mut path = vec![pos];
        if let Some(dir) = axis_priority_direction(&pos, &target) {
            let cell = pos.step(dir);
            if self.deconflictor.is_admissible(id, &cell) {
                path.push(cell);
                return path;
            }
        }

        let mut options: Vec<(i32, Position)> = pos
            .neighbors()
            .into_iter()
            .filter(|cell| self.deconflictor.is_admissible(id, cell))
            .map(|cell| (cell.distance(&target), cell))
            .collect();
        options.sort_by_key(|(distance, _)| *distance);
        if let Some((_, cell)) = options.first() {
            path.push(*cell);
        }
        path
    }

    /// First admissible hop in the agent's preferred rotation, stretched to
    /// two cells when the second one is free.
    pub fn offset_route(&self, id: &AgentId, pos: Position, preferred: usize) -> Vec<Position> {
        let mut path = vec![pos];
        let order = PREFERRED_ROTATIONS[preferred % PREFERRED_ROTATIONS.len()];
        if let Some(dir) = order
            .into_iter()
            .find(|dir| self.deconflictor.is_admissible(id, &pos.step(*dir)))
        {
            self.push_hop(&mut path, pos, dir);
        }
        path
    }

    fn push_hop(&self, path: &mut Vec<Position>, pos: Position, dir: Direction) {
        let first = pos.step(dir);
        path.push(first);
        let second = first.step(dir);
        if self.snapshot.is_free(&second) {
            path.push(second);
        }
    }

    /// Move away from a cluster of friendly agents; patrol when no neighbour
    /// is roomy enough.
    #[tracing::instrument(level = "debug", skip(self, rng))]
    pub fn spread_out<R: Rng>(
        &self,
        id: &AgentId,
        pos: Position,
        group: u32,
        rng: &mut R,
    ) -> Vec<Position> {
        let mut best: Option<(i32, Direction)> = None;
        for dir in Direction::ALL {
            let cell = pos.step(dir);
            if !self.snapshot.is_passable(&cell) {
                continue;
            }
            let average = self.deconflictor.average_distance_to_others(id, &cell);
            if average > self.config.spread_min_average
                && best.is_none_or(|(best_average, _)| average > best_average)
            {
                best = Some((average, dir));
            }
        }

        match best {
            Some((average, dir)) => {
                debug!("📈 Agent {} spreading out {:?} (average distance {})", id, dir, average);
                let mut path = vec![pos];
                self.push_hop(&mut path, pos, dir);
                path
            }
            None => self.patrol(id, pos, group, rng),
        }
    }

    /// One step in the zone's patrol order, else a random free neighbour.
    pub fn patrol<R: Rng>(
        &self,
        id: &AgentId,
        pos: Position,
        group: u32,
        rng: &mut R,
    ) -> Vec<Position> {
        let order = ZONE_PATROL_ORDERS[group as usize % ZONE_PATROL_ORDERS.len()];
        let step = order.into_iter().map(|dir| pos.step(dir)).find(|cell| {
            self.snapshot.is_free(cell) && !self.deconflictor.is_too_close(id, cell)
        });
        if let Some(cell) = step {
            return vec![pos, cell];
        }

        let safe: Vec<Position> = pos
            .neighbors()
            .into_iter()
            .filter(|cell| self.snapshot.is_free(cell))
            .collect();
        if safe.is_empty() {
            return vec![pos];
        }
        let cell = safe[rng.random_range(0..safe.len())];
        debug!("Agent {} patrols randomly to {}", id, cell);
        vec![pos, cell]
    }
}

/// Close the larger of the two gaps first.
fn axis_priority_direction(from: &Position, to: &Position) -> Option<Direction> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0 && dy == 0 {
        None
    } else if dx.abs() >= dy.abs() {
        Some(if dx > 0 { East } else { West })
    } else {
        Some(if dy > 0 { South } else { North })
    }
}
