//! Game session state and authoritative tick loop

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::util::time::{unix_millis, TICK_DURATION_MICROS};
use crate::ws::protocol::ServerMsg;

use super::arena::{ArenaGrid, GridStrategy, GRID_COLS, GRID_ROWS};
use super::collision::{self, Collision};
use super::snapshot::SnapshotBuilder;
use super::world::{HitEffect, TankStatus, WorldState};
use super::{Command, PlayerInput};

/// Hard cap on simultaneous players
pub const MAX_PLAYERS: usize = 2;

/// Message sent with the room-full rejection
pub const ROOM_FULL_MESSAGE: &str = "Room is full! Maximum 2 players.";

/// Handle to the running game session
#[derive(Clone)]
pub struct GameHandle {
    pub input_tx: mpsc::Sender<PlayerInput>,
    pub snapshot_tx: broadcast::Sender<ServerMsg>,
    pub player_count: Arc<AtomicUsize>,
}

impl GameHandle {
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }
}

/// The authoritative game session. Owns the world state; all mutation goes
/// through the command channel, so no locks are needed.
pub struct GameSession {
    world: WorldState,
    tick: u64,
    input_rx: mpsc::Receiver<PlayerInput>,
    snapshot_tx: broadcast::Sender<ServerMsg>,
    snapshot_builder: SnapshotBuilder,
    player_count: Arc<AtomicUsize>,
}

impl GameSession {
    /// Create a session with a freshly generated arena
    pub fn new(seed: u64, strategy: GridStrategy) -> (Self, GameHandle) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = ArenaGrid::generate(strategy, GRID_COLS, GRID_ROWS, &mut rng);

        let (input_tx, input_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = GameHandle {
            input_tx,
            snapshot_tx: snapshot_tx.clone(),
            player_count: player_count.clone(),
        };

        let session = Self {
            world: WorldState::new(grid),
            tick: 0,
            input_rx,
            snapshot_tx,
            snapshot_builder: SnapshotBuilder::new(),
            player_count,
        };

        (session, handle)
    }

    /// Run the fixed-rate tick loop. Commands are applied as they arrive,
    /// interleaved with ticks on this single task, and every accepted
    /// command triggers an out-of-band broadcast.
    pub async fn run(mut self) {
        info!(tick_ms = TICK_DURATION_MICROS / 1000, "Game session started");

        let mut ticker = interval(Duration::from_micros(TICK_DURATION_MICROS));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_tick(unix_millis());
                    self.broadcast();
                }
                input = self.input_rx.recv() => {
                    match input {
                        Some(input) => {
                            if self.apply_command(input) {
                                self.broadcast();
                            }
                        }
                        None => {
                            info!("Command channel closed, stopping game session");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Apply one client command. Returns true when it changed state and a
    /// broadcast is due; rejected commands are silent no-ops.
    fn apply_command(&mut self, input: PlayerInput) -> bool {
        match input.command {
            Command::Join => self.handle_join(input.player_id),
            Command::Leave => self.handle_leave(input.player_id),
            Command::Move { x, y, direction } => {
                self.world.apply_move(input.player_id, x, y, direction)
            }
            Command::Shoot { x, y, direction } => {
                self.world.apply_shoot(input.player_id, x, y, direction)
            }
        }
    }

    fn handle_join(&mut self, player_id: Uuid) -> bool {
        if self.world.tank(player_id).is_some() {
            warn!(player_id = %player_id, "Player already joined");
            return false;
        }

        if self.world.tanks.len() >= MAX_PLAYERS {
            // The gateway already rejects over-capacity sockets; this guard
            // covers the join that raced past it. The store stays untouched.
            warn!(player_id = %player_id, "Join rejected, room full");
            return false;
        }

        self.world.spawn_tank(player_id);
        let _ = self.snapshot_tx.send(ServerMsg::Init {
            id: player_id,
            map: self.world.grid.to_rows(),
        });

        info!(
            player_id = %player_id,
            connected = self.world.tanks.len(),
            max = MAX_PLAYERS,
            "Player joined"
        );
        true
    }

    fn handle_leave(&mut self, player_id: Uuid) -> bool {
        let removed = self.world.remove_tank(player_id);
        if removed {
            info!(
                player_id = %player_id,
                connected = self.world.tanks.len(),
                max = MAX_PLAYERS,
                "Player left"
            );
        }
        removed
    }

    /// One simulation step: advance projectiles, resolve collisions, advance
    /// explosions, respawn elapsed tanks, prune. Skips malformed or inactive
    /// entities instead of faulting.
    pub(crate) fn run_tick(&mut self, now: u64) {
        self.tick += 1;
        self.advance_projectiles();
        self.resolve_collisions(now);
        self.advance_explosions();
        self.respawn_tanks(now);
        self.world.prune();
    }

    fn advance_projectiles(&mut self) {
        for projectile in self.world.projectiles.iter_mut() {
            if projectile.active {
                projectile.advance();
            }
        }
    }

    fn resolve_collisions(&mut self, now: u64) {
        let mut outcomes = Vec::new();
        for (idx, projectile) in self.world.projectiles.iter().enumerate() {
            if !projectile.active {
                continue;
            }
            if let Some(outcome) =
                collision::resolve(projectile, &mut self.world.grid, &self.world.tanks)
            {
                outcomes.push((idx, outcome));
            }
        }

        for (idx, outcome) in outcomes {
            if let Some(projectile) = self.world.projectiles.get_mut(idx) {
                projectile.active = false;
            }

            if let Collision::TankHit(target) = outcome {
                self.apply_tank_hit(target, now);
            }
        }
    }

    fn apply_tank_hit(&mut self, target: Uuid, now: u64) {
        let mut explosion_at = None;

        if let Some(tank) = self.world.tank_mut(target) {
            match tank.register_hit(now) {
                HitEffect::Damaged => {
                    debug!(player_id = %target, hits = tank.hits, "Tank hit");
                }
                HitEffect::LifeLost => {
                    info!(player_id = %target, lives = tank.lives, "Tank lost a life");
                }
                HitEffect::Destroyed => {
                    info!(player_id = %target, "Tank destroyed, respawn in 3s");
                    explosion_at = Some(tank.center());
                }
                HitEffect::None => {}
            }
        }

        if let Some((x, y)) = explosion_at {
            self.world.spawn_explosion(x, y);
        }
    }

    fn advance_explosions(&mut self) {
        for explosion in self.world.explosions.iter_mut() {
            if explosion.active {
                explosion.advance();
            }
        }
    }

    fn respawn_tanks(&mut self, now: u64) {
        for i in 0..self.world.tanks.len() {
            let due = matches!(
                self.world.tanks[i].status,
                TankStatus::Dead { respawn_at } if now >= respawn_at
            );
            if !due {
                continue;
            }

            // Respawn reuses the candidate list without the free-cell search
            let slot = self.world.next_respawn_slot();
            if self.world.tanks[i].try_respawn(now, slot) {
                info!(player_id = %self.world.tanks[i].id, "Tank respawned");
            }
        }
    }

    fn broadcast(&mut self) {
        let msg = self.snapshot_builder.build(&self.world);
        let _ = self.snapshot_tx.send(msg);
        trace!(
            snapshots = self.snapshot_builder.snapshots_built(),
            "Snapshot broadcast"
        );
    }
}
