use tracing::{debug, warn};

use crate::infra::{Direction, Position};
use crate::planners::heuristic::EngineConfig;
use crate::state::ArenaSnapshot;

/// Cells an in-progress escape advances per tick.
const CONTINUE_STEPS: i32 = 2;

pub struct EscapePlanner<'a> {
    snapshot: &'a ArenaSnapshot,
    config: &'a EngineConfig,
}

impl<'a> EscapePlanner<'a> {
    pub fn new(snapshot: &'a ArenaSnapshot, config: &'a EngineConfig) -> Self {
        Self { snapshot, config }
    }

    /// Straight retreat from `origin`, origin included as the first cell.
    ///
    /// Prefers the longest straight run (escape length, then shorter) of free
    /// cells. A path of just `origin` means there is nowhere to go.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn compute_escape_path(&self, origin: Position) -> Vec<Position> {
        for length in (1..=self.config.escape_length).rev() {
            let mut best: Option<(i32, Direction)> = None;
            for dir in Direction::ALL {
                let Some(score) = self.straight_run_score(&origin, dir, length) else {
                    continue;
                };
                if best.is_none_or(|(best_score, _)| score > best_score) {
                    best = Some((score, dir));
                }
            }
            if let Some((score, dir)) = best {
                debug!("Escape from {} heads {:?} for {} cells (score {})", origin, dir, length, score);
                let mut path = vec![origin];
                path.extend((1..=length).map(|step| origin.offset(dir, step)));
                return path;
            }
        }
        warn!("⚠️ No escape path from {}", origin);
        vec![origin]
    }

    fn straight_run_score(&self, origin: &Position, dir: Direction, length: i32) -> Option<i32> {
        let mut score = 0;
        for step in 1..=length {
            let cell = origin.offset(dir, step);
            if !self.snapshot.is_free(&cell) {
                return None;
            }
            score += 10 * origin.distance(&cell);
            if !self.snapshot.is_adjacent_to_bomb(&cell) {
                score += 20;
            }
        }
        Some(score)
    }

    /// Keep retreating along `direction`; fall back to any free neighbour.
    pub fn continue_escape(&self, pos: Position, direction: Option<Direction>) -> Vec<Position> {
        let mut path = vec![pos];
        if let Some(dir) = direction {
            let mut cell = pos;
            for _ in 0..CONTINUE_STEPS {
                let next = cell.step(dir);
                if !self.snapshot.is_free(&next) {
                    break;
                }
                path.push(next);
                cell = next;
            }
        }
        if path.len() == 1
            && let Some(cell) = self.first_free_neighbor(&pos)
        {
            path.push(cell);
        }
        path
    }

    /// Step off or away from a bomb right now: first free neighbour, plus one
    /// more cell in the same direction when that is free too.
    pub fn emergency_escape(&self, pos: Position) -> Vec<Position> {
        let mut path = vec![pos];
        for dir in Direction::ALL {
            let first = pos.step(dir);
            if !self.snapshot.is_free(&first) {
                continue;
            }
            path.push(first);
            let second = first.step(dir);
            if self.snapshot.is_free(&second) {
                path.push(second);
            }
            return path;
        }
        warn!("⚠️ Trapped next to a bomb at {}", pos);
        path
    }

    pub fn first_free_neighbor(&self, pos: &Position) -> Option<Position> {
        pos.neighbors()
            .into_iter()
            .find(|cell| self.snapshot.is_free(cell))
    }
}
