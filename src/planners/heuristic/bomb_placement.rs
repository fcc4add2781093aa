use tracing::debug;

use crate::infra::Position;
use crate::planners::heuristic::{DangerAssessor, EngineConfig};
use crate::state::{AgentState, ArenaSnapshot, FriendlyAgent};

/// An enemy within this range of a wall counts as standing next to it.
const ENEMY_NEAR_WALL: i32 = 2;

/// Why the current cell is worth a bomb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BombTrigger {
    /// Two or more destructible walls next to the cell.
    MultiWall,
    /// A wall next to the cell and an enemy on a clear blast line.
    WallAndEnemy,
    /// An enemy right next to the cell.
    AdjacentEnemy,
}

pub struct BombPlanner<'a> {
    snapshot: &'a ArenaSnapshot,
    config: &'a EngineConfig,
}

impl<'a> BombPlanner<'a> {
    pub fn new(snapshot: &'a ArenaSnapshot, config: &'a EngineConfig) -> Self {
        Self { snapshot, config }
    }

    fn danger(&self) -> DangerAssessor<'a> {
        DangerAssessor::new(self.snapshot, self.config)
    }

    /// Cooldown, ammunition and bomb-proximity preconditions.
    pub fn can_place_bomb(&self, agent: &FriendlyAgent, state: &AgentState, pos: &Position) -> bool {
        state.bomb_cooldown == 0
            && agent.bombs_available >= 1
            && !self.snapshot.is_bomb(pos)
            && !self.snapshot.is_adjacent_to_bomb(pos)
    }

    /// First trigger that holds at `pos`, ignoring preconditions.
    pub fn placement_trigger(&self, pos: &Position) -> Option<BombTrigger> {
        let walls = self.snapshot.destructible_neighbor_count(pos);
        if walls >= 2 {
            return Some(BombTrigger::MultiWall);
        }
        let danger = self.danger();
        if walls >= 1
            && self
                .snapshot
                .enemies
                .iter()
                .any(|enemy| enemy != pos && danger.is_in_blast_line(pos, enemy))
        {
            return Some(BombTrigger::WallAndEnemy);
        }
        if self.snapshot.enemies.iter().any(|enemy| enemy.is_adjacent(pos)) {
            return Some(BombTrigger::AdjacentEnemy);
        }
        None
    }

    /// Trigger for dropping a bomb where the agent stands, if allowed.
    pub fn evaluate_current_cell(
        &self,
        agent: &FriendlyAgent,
        state: &AgentState,
        pos: &Position,
    ) -> Option<BombTrigger> {
        if !self.can_place_bomb(agent, state, pos) {
            return None;
        }
        self.placement_trigger(pos)
    }

    fn is_candidate_cell(&self, cell: &Position) -> bool {
        self.snapshot.is_passable(cell)
            && !self.snapshot.is_bomb(cell)
            && !self.snapshot.is_adjacent_to_bomb(cell)
    }

    /// A better nearby cell to bomb from, searched ring by ring within vision.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn find_strategic_bomb_placement(&self, pos: Position) -> Option<Position> {
        let vision = self.config.vision_radius;

        let multi_wall = (1..=vision).flat_map(|r| ring(pos, r)).find(|cell| {
            self.is_candidate_cell(cell) && self.snapshot.destructible_neighbor_count(cell) >= 2
        });
        if let Some(cell) = multi_wall {
            debug!("Multi-wall bomb spot at {}", cell);
            return Some(cell);
        }

        if !self.snapshot.enemies.is_empty() {
            let combo = (1..=vision)
                .flat_map(|r| ring(pos, r))
                .find(|cell| self.is_candidate_cell(cell) && self.hits_enemy_near_wall(cell));
            if let Some(cell) = combo {
                debug!("Enemy-and-wall bomb spot at {}", cell);
                return Some(cell);
            }
        }

        let wall = self.nearest_reachable_wall(pos);
        if let Some(wall) = wall {
            debug!("Heading for wall at {}", wall);
        }
        wall
    }

    /// A bomb at `cell` would catch an enemy and a wall that enemy stands near.
    fn hits_enemy_near_wall(&self, cell: &Position) -> bool {
        let hit = self.danger().blast_cells(cell);
        let enemies: Vec<&Position> = hit.iter().filter(|c| self.snapshot.is_enemy(c)).collect();
        hit.iter()
            .filter(|c| self.snapshot.is_destructible(c))
            .any(|wall| enemies.iter().any(|enemy| enemy.distance(wall) <= ENEMY_NEAR_WALL))
    }

    fn nearest_reachable_wall(&self, pos: Position) -> Option<Position> {
        let mut walls: Vec<Position> = self
            .snapshot
            .destructible
            .iter()
            .filter(|wall| wall.distance(&pos) <= self.config.vision_radius)
            .copied()
            .collect();
        walls.sort_by_key(|wall| (wall.distance(&pos), wall.y, wall.x));
        walls.into_iter().find(|wall| self.has_approach(&pos, wall))
    }

    /// Straight sampled line to the wall, or to one of its free neighbours.
    fn has_approach(&self, from: &Position, wall: &Position) -> bool {
        if self.is_clear_line(from, wall, false) {
            return true;
        }
        wall.neighbors()
            .iter()
            .any(|cell| self.snapshot.is_passable(cell) && self.is_clear_line(from, cell, true))
    }

    /// Every rounded cell on the segment after `from` is passable.
    fn is_clear_line(&self, from: &Position, to: &Position, include_end: bool) -> bool {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs());
        let last = if include_end { steps } else { steps - 1 };
        (1..=last).all(|i| {
            let t = f64::from(i) / f64::from(steps);
            let cell = Position::new(
                (f64::from(from.x) + f64::from(dx) * t).round() as i32,
                (f64::from(from.y) + f64::from(dy) * t).round() as i32,
            );
            self.snapshot.is_passable(&cell)
        })
    }
}

/// Cells at exactly Manhattan distance `r` from `center`, in a fixed order.
fn ring(center: Position, r: i32) -> impl Iterator<Item = Position> {
    (-r..=r).flat_map(move |dx| {
        let dy = r - dx.abs();
        let first = Position::new(center.x + dx, center.y - dy);
        let second = (dy != 0).then(|| Position::new(center.x + dx, center.y + dy));
        std::iter::once(first).chain(second)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn ready() -> AgentState {
        AgentState::new(0, 0)
    }

    #[test]
    fn test_ring_has_all_cells_at_distance() {
        let center = pos(0, 0);
        for r in 1..=4 {
            let cells: Vec<Position> = ring(center, r).collect();
            assert_eq!(cells.len() as i32, 4 * r);
            assert!(cells.iter().all(|c| c.distance(&center) == r));
        }
    }

    #[test]
    fn test_multi_wall_trigger() {
        let snapshot = ArenaSnapshot::new(10, 10).with_destructible([pos(6, 5), pos(5, 6)]);
        let config = EngineConfig::default();
        let planner = BombPlanner::new(&snapshot, &config);
        let agent = FriendlyAgent::new("a", pos(5, 5));

        assert_eq!(
            planner.evaluate_current_cell(&agent, &ready(), &pos(5, 5)),
            Some(BombTrigger::MultiWall)
        );
    }

    #[test]
    fn test_preconditions_block_placement() {
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_destructible([pos(6, 5), pos(5, 6)])
            .with_bombs([pos(1, 1)]);
        let config = EngineConfig::default();
        let planner = BombPlanner::new(&snapshot, &config);
        let agent = FriendlyAgent::new("a", pos(5, 5));

        let mut cooling = ready();
        cooling.bomb_cooldown = 2;
        assert_eq!(planner.evaluate_current_cell(&agent, &cooling, &pos(5, 5)), None);

        let mut empty_handed = FriendlyAgent::new("a", pos(5, 5));
        empty_handed.bombs_available = 0;
        assert_eq!(planner.evaluate_current_cell(&empty_handed, &ready(), &pos(5, 5)), None);

        assert!(!planner.can_place_bomb(&agent, &ready(), &pos(1, 1)));
        assert!(!planner.can_place_bomb(&agent, &ready(), &pos(1, 2)));
        assert!(planner.can_place_bomb(&agent, &ready(), &pos(1, 3)));
    }

    #[test]
    fn test_wall_and_enemy_trigger_needs_clear_line() {
        let config = EngineConfig {
            blast_radius: 2,
            ..EngineConfig::default()
        };
        let open = ArenaSnapshot::new(10, 10)
            .with_destructible([pos(5, 6)])
            .with_enemies([pos(7, 5)]);
        assert_eq!(
            BombPlanner::new(&open, &config).placement_trigger(&pos(5, 5)),
            Some(BombTrigger::WallAndEnemy)
        );

        let shielded = open.clone().with_indestructible([pos(6, 5)]);
        assert_eq!(BombPlanner::new(&shielded, &config).placement_trigger(&pos(5, 5)), None);
    }

    #[test]
    fn test_adjacent_enemy_trigger() {
        let snapshot = ArenaSnapshot::new(10, 10).with_enemies([pos(5, 4)]);
        let config = EngineConfig::default();
        let planner = BombPlanner::new(&snapshot, &config);

        assert_eq!(planner.placement_trigger(&pos(5, 5)), Some(BombTrigger::AdjacentEnemy));
        assert_eq!(planner.placement_trigger(&pos(5, 7)), None);
    }

    #[test]
    fn test_strategic_search_finds_nearest_multi_wall_cell() {
        let snapshot = ArenaSnapshot::new(10, 10).with_destructible([pos(3, 1), pos(2, 2)]);
        let config = EngineConfig::default();
        let planner = BombPlanner::new(&snapshot, &config);

        assert_eq!(planner.find_strategic_bomb_placement(pos(0, 0)), Some(pos(2, 1)));
    }

    #[test]
    fn test_strategic_search_finds_enemy_and_wall_combo() {
        let snapshot = ArenaSnapshot::new(10, 10)
            .with_destructible([pos(6, 4)])
            .with_enemies([pos(5, 3)]);
        let config = EngineConfig::default();
        let planner = BombPlanner::new(&snapshot, &config);

        assert_eq!(planner.find_strategic_bomb_placement(pos(5, 7)), Some(pos(5, 4)));
    }

    #[test]
    fn test_strategic_search_falls_back_to_reachable_wall() {
        let snapshot = ArenaSnapshot::new(10, 10).with_destructible([pos(2, 0)]);
        let config = EngineConfig::default();
        let planner = BombPlanner::new(&snapshot, &config);

        assert_eq!(planner.find_strategic_bomb_placement(pos(0, 0)), Some(pos(2, 0)));
        assert_eq!(
            BombPlanner::new(&ArenaSnapshot::new(10, 10), &config)
                .find_strategic_bomb_placement(pos(0, 0)),
            None
        );
    }
}
