mod api;
mod default_observer;
mod game_observer;
mod types;
mod wire;

pub use api::{ApiError, GameConnection};
pub use default_observer::DefaultObserver;
pub use game_observer::GameObserver;
pub use types::{Direction, Position, Zone};
pub use wire::{
    ArenaResponse, Booster, BoosterResponse, BoosterState, MoveBomber, MoveRequest,
    PurchaseBoosterRequest,
};
