use tracing::debug;

use crate::infra::{Position, Zone};
use crate::planners::heuristic::{Deconflictor, EngineConfig};
use crate::state::{AgentId, AgentRegistry, AgentState, ArenaSnapshot};

const HOME_ZONE_BONUS: i32 = 50;
const WALL_WITH_ENEMY_BONUS: i32 = 50;
/// An enemy this close to a wall makes the wall worth more.
const WALL_ENEMY_RANGE: i32 = 2;
const PREFERRED_AXIS_BONUS: i32 = 30;

/// Picks an enemy or destructible wall for an agent to head for.
pub struct TargetSelector<'a> {
    snapshot: &'a ArenaSnapshot,
    registry: &'a AgentRegistry,
    config: &'a EngineConfig,
}

impl<'a> TargetSelector<'a> {
    pub fn new(
        snapshot: &'a ArenaSnapshot,
        registry: &'a AgentRegistry,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            snapshot,
            registry,
            config,
        }
    }

    #[tracing::instrument(level = "debug", skip(self, state), fields(group = state.group))]
    pub fn find_individual_target(
        &self,
        id: &AgentId,
        pos: Position,
        state: &AgentState,
    ) -> Option<Position> {
        let zone = Zone::for_group(state.group, self.snapshot.width, self.snapshot.height);
        let target = self
            .best_enemy_in_zone(pos, &zone)
            .or_else(|| self.best_wall(pos))?;

        let deconflictor = Deconflictor::new(self.snapshot, self.registry, self.config);
        if deconflictor.is_target_claimed(id, &target) {
            debug!("Target {} already pursued, looking for an alternative", target);
            return self.find_alternative_target(pos, state, &target);
        }
        Some(target)
    }

    fn within_vision(&self, from: &Position, to: &Position) -> bool {
        from.distance(to) <= self.config.vision_radius
    }

    fn best_enemy_in_zone(&self, pos: Position, zone: &Zone) -> Option<Position> {
        best_by_score(
            self.snapshot
                .enemies
                .iter()
                .filter(|enemy| zone.contains(enemy) && self.within_vision(&pos, enemy))
                .map(|enemy| (*enemy, 150 - 5 * pos.distance(enemy) + HOME_ZONE_BONUS)),
        )
    }

    fn best_wall(&self, pos: Position) -> Option<Position> {
        let mut walls: Vec<&Position> = self
            .snapshot
            .destructible
            .iter()
            .filter(|wall| self.within_vision(&pos, wall))
            .collect();
        // HashSet order is arbitrary; sort so equal scores resolve the same way every time.
        walls.sort_by_key(|wall| (wall.y, wall.x));

        best_by_score(walls.into_iter().map(|wall| {
            let mut score = 100 - 10 * pos.distance(wall);
            if self
                .snapshot
                .enemies
                .iter()
                .any(|enemy| enemy.distance(wall) <= WALL_ENEMY_RANGE)
            {
                score += WALL_WITH_ENEMY_BONUS;
            }
            (*wall, score)
        }))
    }

    /// Enemies in vision other than `contested`, favouring the preferred axis.
    pub fn find_alternative_target(
        &self,
        pos: Position,
        state: &AgentState,
        contested: &Position,
    ) -> Option<Position> {
        let (main_dx, main_dy) = state.preferred().delta();
        best_by_score(
            self.snapshot
                .enemies
                .iter()
                .filter(|enemy| *enemy != contested && self.within_vision(&pos, enemy))
                .map(|enemy| {
                    let dx = (enemy.x - pos.x).signum();
                    let dy = (enemy.y - pos.y).signum();
                    let on_axis =
                        (dx == main_dx && dy == main_dy) || (dx == -main_dx && dy == -main_dy);
                    let bonus = if on_axis { PREFERRED_AXIS_BONUS } else { 0 };
                    (*enemy, 100 - 3 * pos.distance(enemy) + bonus)
                }),
        )
    }
}

/// Highest score wins; the first candidate keeps a tie.
fn best_by_score(candidates: impl Iterator<Item = (Position, i32)>) -> Option<Position> {
    let mut best: Option<(Position, i32)> = None;
    for (pos, score) in candidates {
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((pos, score));
        }
    }
    best.map(|(pos, _)| pos)
}
