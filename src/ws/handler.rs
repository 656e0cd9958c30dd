//! WebSocket upgrade handler and session gateway

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::Ordering;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{Command, PlayerInput, MAX_PLAYERS, ROOM_FULL_MESSAGE};
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let player_id = Uuid::new_v4();
    info!(player_id = %player_id, "New WebSocket connection");

    let (mut ws_sink, ws_stream) = socket.split();

    // Admission is decided here: atomically claim a slot or reject. The
    // session itself never sees over-capacity joins in the normal path.
    if !claim_slot(&state) {
        info!(player_id = %player_id, "Room full, rejecting connection");
        let _ = send_msg(
            &mut ws_sink,
            &ServerMsg::RoomFull {
                message: ROOM_FULL_MESSAGE.to_string(),
            },
        )
        .await;
        let _ = ws_sink.close().await;
        return;
    }

    // Subscribe before joining so the init snapshot is not missed
    let snapshot_rx = state.game.snapshot_tx.subscribe();
    let input_tx = state.game.input_tx.clone();

    let joined = input_tx
        .send(PlayerInput {
            player_id,
            command: Command::Join,
        })
        .await
        .is_ok();

    if joined {
        run_session(player_id, ws_sink, ws_stream, input_tx, snapshot_rx).await;
    } else {
        error!(player_id = %player_id, "Game session unavailable");
    }

    state.game.player_count.fetch_sub(1, Ordering::AcqRel);
    info!(player_id = %player_id, "WebSocket connection closed");
}

/// Claim one of the two player slots. Returns false when the room is full.
fn claim_slot(state: &AppState) -> bool {
    state
        .game
        .player_count
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
            if count < MAX_PLAYERS {
                Some(count + 1)
            } else {
                None
            }
        })
        .is_ok()
}

/// Run the WebSocket session with read/write split
async fn run_session(
    player_id: Uuid,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    input_tx: mpsc::Sender<PlayerInput>,
    mut snapshot_rx: broadcast::Receiver<ServerMsg>,
) {
    // Writer task: broadcast snapshots -> WebSocket
    let writer_player_id = player_id;
    let writer_handle = tokio::spawn(async move {
        loop {
            match snapshot_rx.recv().await {
                Ok(msg) => {
                    if !should_forward(&msg, writer_player_id) {
                        continue;
                    }
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(player_id = %writer_player_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        player_id = %writer_player_id,
                        lagged_count = n,
                        "Client lagged, skipping {} snapshots", n
                    );
                    // Continue - don't disconnect for lag
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(player_id = %writer_player_id, "Snapshot channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> game session
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMsg>(&text) {
                Ok(client_msg) => {
                    let command = match client_msg {
                        ClientMsg::Move { x, y, direction } => Command::Move { x, y, direction },
                        ClientMsg::Shoot { x, y, direction } => Command::Shoot { x, y, direction },
                    };

                    if input_tx
                        .send(PlayerInput { player_id, command })
                        .await
                        .is_err()
                    {
                        debug!(player_id = %player_id, "Command channel closed");
                        break;
                    }
                }
                Err(e) => {
                    // Malformed commands are dropped, never fatal
                    warn!(player_id = %player_id, error = %e, "Failed to parse client message");
                }
            },
            Ok(Message::Binary(_)) => {
                warn!(player_id = %player_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(player_id = %player_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(player_id = %player_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(player_id = %player_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(player_id = %player_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Signal disconnect to the game session
    let _ = input_tx
        .send(PlayerInput {
            player_id,
            command: Command::Leave,
        })
        .await;

    // Abort writer task
    writer_handle.abort();
}

/// Init is addressed to one connection; everything else fans out to all.
/// Forwarding another player's init would make the client adopt that
/// identity, since clients take their id from every init they receive.
fn should_forward(msg: &ServerMsg, player_id: Uuid) -> bool {
    match msg {
        ServerMsg::Init { id, .. } => *id == player_id,
        _ => true,
    }
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
