//! Blast-line reasoning over the current snapshot.
//!
//! A bomb threatens the cells of its row and column up to the blast radius.
//! The first wall on a line, destructible or not, absorbs the blast.

use crate::infra::{Direction, Position};
use crate::planners::heuristic::EngineConfig;
use crate::state::ArenaSnapshot;

/// Cells scanned ahead when scoring a direction.
const LOOKAHEAD: i32 = 3;

pub struct DangerAssessor<'a> {
    snapshot: &'a ArenaSnapshot,
    config: &'a EngineConfig,
}

impl<'a> DangerAssessor<'a> {
    pub fn new(snapshot: &'a ArenaSnapshot, config: &'a EngineConfig) -> Self {
        Self { snapshot, config }
    }

    /// True when a blast from `from` would reach `to`.
    pub fn is_in_blast_line(&self, from: &Position, to: &Position) -> bool {
        if !from.is_aligned(to) || from.distance(to) > self.config.blast_radius {
            return false;
        }
        !self.is_line_blocked(from, to)
    }

    /// Blocking terrain strictly between two aligned cells.
    fn is_line_blocked(&self, from: &Position, to: &Position) -> bool {
        let dx = (to.x - from.x).signum();
        let dy = (to.y - from.y).signum();
        let mut cell = Position::new(from.x + dx, from.y + dy);
        while cell != *to {
            if self.snapshot.is_blocking_terrain(&cell) {
                return true;
            }
            cell = Position::new(cell.x + dx, cell.y + dy);
        }
        false
    }

    pub fn is_in_danger_zone(&self, pos: &Position) -> bool {
        self.snapshot
            .bombs
            .iter()
            .any(|bomb| self.is_in_blast_line(bomb, pos))
    }

    /// Cells a bomb at `origin` would hit, origin excluded. A destructible
    /// wall is hit and ends its line; an indestructible one just ends it.
    pub fn blast_cells(&self, origin: &Position) -> Vec<Position> {
        let mut cells = Vec::new();
        for dir in Direction::ALL {
            for step in 1..=self.config.blast_radius {
                let cell = origin.offset(dir, step);
                if !self.snapshot.in_bounds(&cell) || self.snapshot.indestructible.contains(&cell)
                {
                    break;
                }
                cells.push(cell);
                if self.snapshot.is_destructible(&cell) {
                    break;
                }
            }
        }
        cells
    }

    /// Score of retreating from `pos` towards `dir`; higher is safer.
    pub fn direction_score(&self, pos: &Position, dir: Direction) -> i32 {
        let mut score = 0;
        for step in 1..=LOOKAHEAD {
            let cell = pos.offset(dir, step);
            if !self.snapshot.in_bounds(&cell) {
                score -= 50;
                break;
            }
            if self.snapshot.is_obstructed(&cell) {
                score -= 30;
                break;
            }
            if self.snapshot.is_bomb(&cell) {
                score -= 100;
            } else {
                score += 5;
            }
            if self.snapshot.is_adjacent_to_bomb(&cell) {
                score -= 50;
            }
            score += 10 * self.snapshot.nearest_bomb_distance(&cell).unwrap_or(0);
        }
        score
    }

    /// Best-scoring direction; ties go to the earliest in [`Direction::ALL`].
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn find_safest_direction(&self, pos: &Position) -> Direction {
        let mut best = Direction::ALL[0];
        let mut best_score = i32::MIN;
        for dir in Direction::ALL {
            let score = self.direction_score(pos, dir);
            if score > best_score {
                best_score = score;
                best = dir;
            }
        }
        best
    }
}
