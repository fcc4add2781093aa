use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::infra::{Booster, BoosterResponse};

/// Fixed ranking of booster types; unknown types rank lowest.
pub fn booster_priority(booster_type: &str) -> u32 {
    match booster_type.to_ascii_lowercase().as_str() {
        "armor" => 10,
        "speed" => 9,
        "bombs" => 8,
        "view" => 7,
        "bomb_range" => 6,
        "bomb_delay" => 5,
        "can_pass_bombs" => 4,
        "can_pass_obstacles" => 3,
        "can_pass_walls" => 2,
        _ => 1,
    }
}

/// Decides at most one booster purchase per interval.
pub struct BoosterPlanner {
    interval: Duration,
    last_check: Option<Instant>,
    purchased: u32,
}

impl BoosterPlanner {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_check: None,
            purchased: 0,
        }
    }

    pub fn purchased(&self) -> u32 {
        self.purchased
    }

    pub fn record_purchase(&mut self) {
        self.purchased += 1;
    }

    /// Booster to buy now, if any. Every check that gets past the interval
    /// restarts it, whether or not something is bought.
    pub fn choose(&mut self, now: Instant, response: &BoosterResponse) -> Option<Booster> {
        if let Some(last) = self.last_check {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.interval {
                debug!(
                    "⏳ Last booster check {}s ago (need {}s)",
                    elapsed.as_secs(),
                    self.interval.as_secs()
                );
                return None;
            }
        }
        self.last_check = Some(now);

        if response.available.is_empty() {
            info!("🚫 No boosters available for purchase");
            return None;
        }

        let points = response.state.points;
        for booster in &response.available {
            debug!(
                "  - {}: {} points (affordable: {}, priority: {})",
                booster.booster_type,
                booster.cost,
                booster.cost <= points,
                booster_priority(&booster.booster_type)
            );
        }

        let mut best: Option<&Booster> = None;
        for booster in response.available.iter().filter(|b| b.cost <= points) {
            let priority = booster_priority(&booster.booster_type);
            if best.is_none_or(|current| priority > booster_priority(&current.booster_type)) {
                best = Some(booster);
            }
        }

        match best {
            Some(booster) => {
                info!(
                    "🛒 Buying {} for {} of {} points",
                    booster.booster_type, booster.cost, points
                );
                Some(booster.clone())
            }
            None => {
                if let Some(cheapest) = response.available.iter().map(|b| b.cost).min() {
                    info!(
                        "💰 No affordable boosters: {} points, cheapest costs {} ({} short)",
                        points,
                        cheapest,
                        cheapest - points
                    );
                }
                None
            }
        }
    }
}
