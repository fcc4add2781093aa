//! JSON bodies exchanged with the arena server.
//!
//! Coordinates travel as `[x, y]` arrays. Anything missing from a response is
//! read as empty so a partial arena still yields a usable snapshot.

use serde::{Deserialize, Deserializer, Serialize};

use crate::infra::{ApiError, Position};
use crate::planners::heuristic::Command;
use crate::state::{AgentId, ArenaSnapshot, FriendlyAgent};

/// Raw `[x, y]` pair; anything else is treated as malformed.
pub type WireCoord = Vec<i32>;

fn to_position(coord: &[i32]) -> Option<Position> {
    match coord {
        [x, y] => Some(Position::new(*x, *y)),
        _ => None,
    }
}

fn to_coord(pos: &Position) -> WireCoord {
    vec![pos.x, pos.y]
}

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireBomb {
    pub pos: WireCoord,
    pub range: i32,
    pub timer: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireArena {
    #[serde(deserialize_with = "null_as_default")]
    pub bombs: Vec<WireBomb>,
    /// Destructible cells.
    #[serde(deserialize_with = "null_as_default")]
    pub obstacles: Vec<WireCoord>,
    /// Indestructible cells.
    #[serde(deserialize_with = "null_as_default")]
    pub walls: Vec<WireCoord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireBomber {
    pub id: String,
    pub pos: Option<WireCoord>,
    pub alive: bool,
    pub can_move: bool,
    pub bombs_available: i32,
    pub armor: i32,
    pub safe_time: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireEnemy {
    pub id: String,
    pub pos: Option<WireCoord>,
    pub safe_time: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireMob {
    pub id: String,
    #[serde(rename = "type")]
    pub mob_type: String,
    pub pos: Option<WireCoord>,
    pub safe_time: i32,
}

/// Body of `GET /arena`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArenaResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub arena: WireArena,
    #[serde(deserialize_with = "null_as_default")]
    pub bombers: Vec<WireBomber>,
    #[serde(deserialize_with = "null_as_default")]
    pub enemies: Vec<WireEnemy>,
    #[serde(deserialize_with = "null_as_default")]
    pub mobs: Vec<WireMob>,
    #[serde(deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
    pub raw_score: i64,
    pub player: String,
    pub round: String,
    pub code: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub map_size: Vec<i32>,
}

impl ArenaResponse {
    /// A non-zero code means no round is running.
    pub fn is_active(&self) -> bool {
        self.code == 0
    }

    /// Engine view of this response. Malformed coordinates are dropped; a
    /// friendly agent with a malformed position is kept without one.
    pub fn to_snapshot(&self) -> Result<ArenaSnapshot, ApiError> {
        let (width, height) = match self.map_size.as_slice() {
            [w, h] if *w > 0 && *h > 0 => (*w, *h),
            _ => return Err(ApiError::MissingMapSize(self.map_size.clone())),
        };

        let mut snapshot = ArenaSnapshot::new(width, height)
            .with_indestructible(self.arena.walls.iter().filter_map(|c| to_position(c)))
            .with_destructible(self.arena.obstacles.iter().filter_map(|c| to_position(c)))
            .with_bombs(self.arena.bombs.iter().filter_map(|b| to_position(&b.pos)))
            .with_enemies(
                self.enemies
                    .iter()
                    .filter_map(|e| e.pos.as_deref().and_then(to_position)),
            );

        for bomber in &self.bombers {
            snapshot = snapshot.with_agent(FriendlyAgent {
                id: AgentId::new(bomber.id.clone()),
                position: bomber.pos.as_deref().and_then(to_position),
                alive: bomber.alive,
                can_move: bomber.can_move,
                bombs_available: bomber.bombs_available,
            });
        }
        Ok(snapshot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveBomber {
    pub id: String,
    pub path: Vec<WireCoord>,
    pub bombs: Vec<WireCoord>,
}

/// Body of `POST /move`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveRequest {
    pub bombers: Vec<MoveBomber>,
}

impl MoveRequest {
    pub fn from_commands(commands: &[Command]) -> Self {
        let bombers = commands
            .iter()
            .map(|command| MoveBomber {
                id: command.agent_id.as_str().to_string(),
                path: command.path.iter().map(to_coord).collect(),
                bombs: command.bomb.iter().map(to_coord).collect(),
            })
            .collect();
        Self { bombers }
    }

    pub fn is_empty(&self) -> bool {
        self.bombers.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Booster {
    #[serde(rename = "type")]
    pub booster_type: String,
    pub cost: i64,
}

/// Current upgrade levels and spendable points.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoosterState {
    pub points: i64,
    pub speed: i32,
    pub bombs: i32,
    pub bomb_range: i32,
    pub view: i32,
    pub armor: i32,
    pub bomb_delay: i32,
    pub bombers: i32,
    pub can_pass_bombs: bool,
    pub can_pass_obstacles: bool,
    pub can_pass_walls: bool,
}

/// Body of `GET /booster`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoosterResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub available: Vec<Booster>,
    pub state: BoosterState,
}

/// Body of `POST /booster`.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseBoosterRequest {
    pub booster: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARENA: &str = r#"{
        "arena": {
            "bombs": [{"pos": [4, 4], "range": 1, "timer": 2.5}],
            "obstacles": [[1, 2], [3, 3]],
            "walls": [[0, 0], [9]]
        },
        "bombers": [
            {"id": "b1", "pos": [2, 2], "alive": true, "can_move": true, "bombs_available": 1, "armor": 0, "safe_time": 0},
            {"id": "b2", "pos": [7], "alive": true, "can_move": true, "bombs_available": 0},
            {"id": "b3", "pos": [5, 5], "alive": false, "can_move": false, "bombs_available": 0}
        ],
        "enemies": [{"id": "e1", "pos": [8, 8], "safe_time": 0}],
        "mobs": [],
        "errors": [],
        "raw_score": 12,
        "player": "team",
        "round": "r1",
        "code": 0,
        "map_size": [10, 12]
    }"#;

    #[test]
    fn test_arena_maps_obstacles_to_destructible() {
        let response: ArenaResponse = serde_json::from_str(ARENA).unwrap();
        let snapshot = response.to_snapshot().unwrap();

        assert!(response.is_active());
        assert_eq!((snapshot.width, snapshot.height), (10, 12));
        assert!(snapshot.is_destructible(&Position::new(1, 2)));
        assert!(snapshot.indestructible.contains(&Position::new(0, 0)));
        assert_eq!(snapshot.indestructible.len(), 1);
        assert_eq!(snapshot.bombs, vec![Position::new(4, 4)]);
        assert_eq!(snapshot.enemies, vec![Position::new(8, 8)]);
    }

    #[test]
    fn test_malformed_agent_position_is_kept_empty() {
        let response: ArenaResponse = serde_json::from_str(ARENA).unwrap();
        let snapshot = response.to_snapshot().unwrap();

        assert_eq!(snapshot.agents.len(), 3);
        assert_eq!(snapshot.agents[0].position, Some(Position::new(2, 2)));
        assert_eq!(snapshot.agents[1].position, None);
        assert!(!snapshot.agents[2].alive);
    }

    #[test]
    fn test_missing_fields_read_as_empty() {
        let response: ArenaResponse = serde_json::from_str(
            r#"{"code": 23, "mobs": null, "arena": {"bombs": null}, "map_size": [5, 5]}"#,
        )
        .unwrap();
        assert!(!response.is_active());
        let snapshot = response.to_snapshot().unwrap();
        assert!(snapshot.agents.is_empty());
        assert!(snapshot.destructible.is_empty());
    }

    #[test]
    fn test_missing_map_size_is_an_error() {
        let response: ArenaResponse = serde_json::from_str(r#"{"code": 0}"#).unwrap();
        assert!(matches!(
            response.to_snapshot(),
            Err(ApiError::MissingMapSize(_))
        ));
    }

    #[test]
    fn test_move_request_serializes_paths_and_bombs() {
        let commands = vec![
            Command::bomb_and_move(
                AgentId::new("b1"),
                Position::new(2, 2),
                vec![Position::new(2, 2), Position::new(2, 3)],
            ),
            Command::movement(AgentId::new("b2"), vec![Position::new(5, 5), Position::new(6, 5)]),
        ];
        let body = serde_json::to_value(MoveRequest::from_commands(&commands)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "bombers": [
                    {"id": "b1", "path": [[2, 2], [2, 3]], "bombs": [[2, 2]]},
                    {"id": "b2", "path": [[5, 5], [6, 5]], "bombs": []}
                ]
            })
        );
    }

    #[test]
    fn test_booster_response_parses_type_field() {
        let response: BoosterResponse = serde_json::from_str(
            r#"{"available": [{"type": "armor", "cost": 2}], "state": {"points": 5, "can_pass_walls": true}}"#,
        )
        .unwrap();
        assert_eq!(response.available[0].booster_type, "armor");
        assert_eq!(response.state.points, 5);
        assert!(response.state.can_pass_walls);
    }
}
