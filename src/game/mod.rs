//! Game simulation modules

pub mod arena;
pub mod collision;
pub mod session;
pub mod snapshot;
pub mod world;

pub use session::{GameHandle, GameSession, MAX_PLAYERS, ROOM_FULL_MESSAGE};

use uuid::Uuid;

use crate::ws::protocol::Direction;

/// Command routed from the session gateway into the game loop. Join and
/// Leave are synthesized by the gateway; Move and Shoot come off the wire.
#[derive(Debug, Clone)]
pub enum Command {
    Join,
    Move { x: f32, y: f32, direction: Direction },
    Shoot { x: f32, y: f32, direction: Direction },
    Leave,
}

/// Player input received from the WebSocket gateway
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub player_id: Uuid,
    pub command: Command,
}
