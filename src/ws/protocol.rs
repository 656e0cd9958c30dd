//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Facing/movement direction, axis-aligned only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Tank position update; coordinates are client-reported and trusted
    Move { x: f32, y: f32, direction: Direction },

    /// Fire a projectile from the reported position
    Shoot { x: f32, y: f32, direction: Direction },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Sent once after a successful join, only to the joining connection
    Init { id: Uuid, map: Vec<Vec<u8>> },

    /// Full world snapshot, sent every tick and after every accepted command
    GameState {
        players: Vec<TankState>,
        bullets: Vec<BulletState>,
        explosions: Vec<ExplosionState>,
        map: Vec<Vec<u8>>,
    },

    /// Room already has two players; the connection is closed after this
    RoomFull { message: String },
}

/// Tank state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankState {
    pub id: Uuid,
    /// Top-left corner of the tank footprint
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub alive: bool,
    /// Remaining lives (starts at 3)
    pub lives: u32,
    /// Hits taken since the last life loss (0..2)
    pub hits: u32,
}

/// Projectile state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletState {
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub owner: Uuid,
    pub size: f32,
    pub speed: f32,
}

/// Explosion effect in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionState {
    /// Center of the destroyed tank
    pub x: f32,
    pub y: f32,
    pub frame: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_command_parses_wire_shape() {
        let msg: ClientMsg =
            serde_json::from_str(r#"{"type":"move","x":60.0,"y":80.0,"direction":"left"}"#)
                .unwrap();
        match msg {
            ClientMsg::Move { x, y, direction } => {
                assert_eq!(x, 60.0);
                assert_eq!(y, 80.0);
                assert_eq!(direction, Direction::Left);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn game_state_uses_camel_case_tag() {
        let msg = ServerMsg::GameState {
            players: vec![],
            bullets: vec![],
            explosions: vec![],
            map: vec![vec![1, 0, 1]],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"gameState""#));
        assert!(json.contains(r#""map":[[1,0,1]]"#));
    }

    #[test]
    fn room_full_round_trips() {
        let msg = ServerMsg::RoomFull {
            message: "Room is full! Maximum 2 players.".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"roomFull""#));
        let back: ServerMsg = serde_json::from_str(&json).unwrap();
        match back {
            ServerMsg::RoomFull { message } => assert!(message.contains("Maximum 2")),
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
