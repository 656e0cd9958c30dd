//! World state aggregate - tanks, projectiles, explosions, arena grid

use uuid::Uuid;

use crate::ws::protocol::Direction;

use super::arena::{ArenaGrid, TILE_SIZE, WORLD_HEIGHT, WORLD_WIDTH};

/// Tank footprint edge length in world units
pub const TANK_SIZE: f32 = 40.0;
/// Lives granted at spawn and respawn
pub const TANK_LIVES: u32 = 3;
/// Hits required to lose one life
pub const HIT_THRESHOLD: u32 = 3;
/// Delay between death and respawn
pub const RESPAWN_DELAY_MS: u64 = 3000;
/// Candidate spawn coordinates, assigned in cycling order
pub const SPAWN_POSITIONS: [(f32, f32); 3] = [(60.0, 60.0), (780.0, 60.0), (400.0, 480.0)];
/// Expanding-ring spawn search parameters
const SPAWN_SEARCH_STEP: f32 = TILE_SIZE;
const SPAWN_SEARCH_MAX_RADIUS: i32 = 10;

/// Projectile footprint edge length
pub const PROJECTILE_SIZE: f32 = 6.0;
/// Projectile travel per tick
pub const PROJECTILE_SPEED: f32 = 10.0;

/// Explosion animation length in ticks
pub const EXPLOSION_FRAMES: u32 = 8;

/// Life state of a tank. Dead tanks re-enter play only once their
/// respawn timestamp has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankStatus {
    Alive,
    Dead { respawn_at: u64 },
}

/// Effect of a registered projectile hit on a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitEffect {
    /// Tank was not alive, hit ignored
    None,
    /// Hit counter incremented, below the threshold
    Damaged,
    /// Threshold reached: one life lost, counter reset
    LifeLost,
    /// Last life lost: tank is dead pending respawn
    Destroyed,
}

/// Authoritative tank state
#[derive(Debug, Clone)]
pub struct Tank {
    pub id: Uuid,
    /// Top-left corner of the footprint
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub lives: u32,
    /// Hits taken since the last life loss (0..HIT_THRESHOLD)
    pub hits: u32,
    pub status: TankStatus,
}

impl Tank {
    fn new(id: Uuid, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            direction: Direction::Up,
            lives: TANK_LIVES,
            hits: 0,
            status: TankStatus::Alive,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == TankStatus::Alive
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + TANK_SIZE / 2.0, self.y + TANK_SIZE / 2.0)
    }

    /// Register one projectile hit. Hits only accumulate while alive; the
    /// third hit costs a life and resets the counter in the same step, and
    /// losing the last life schedules the respawn.
    pub fn register_hit(&mut self, now: u64) -> HitEffect {
        if !self.is_alive() {
            return HitEffect::None;
        }

        self.hits += 1;
        if self.hits < HIT_THRESHOLD {
            return HitEffect::Damaged;
        }

        self.lives = self.lives.saturating_sub(1);
        self.hits = 0;
        if self.lives == 0 {
            self.status = TankStatus::Dead {
                respawn_at: now + RESPAWN_DELAY_MS,
            };
            HitEffect::Destroyed
        } else {
            HitEffect::LifeLost
        }
    }

    /// Return a dead tank to play if its respawn timestamp has elapsed.
    /// Returns true when the tank came back to life.
    pub fn try_respawn(&mut self, now: u64, spawn: (f32, f32)) -> bool {
        match self.status {
            TankStatus::Dead { respawn_at } if now >= respawn_at => {
                self.x = spawn.0;
                self.y = spawn.1;
                self.direction = Direction::Up;
                self.lives = TANK_LIVES;
                self.hits = 0;
                self.status = TankStatus::Alive;
                true
            }
            _ => false,
        }
    }
}

/// Live projectile. Deactivated projectiles are pruned at the end of the
/// tick and never advanced or resolved again.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub owner: Uuid,
    /// Top-left corner of the footprint
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub active: bool,
}

impl Projectile {
    pub fn new(owner: Uuid, x: f32, y: f32, direction: Direction) -> Self {
        Self {
            owner,
            x,
            y,
            direction,
            active: true,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + PROJECTILE_SIZE / 2.0, self.y + PROJECTILE_SIZE / 2.0)
    }

    /// Advance one tick along the facing direction
    pub fn advance(&mut self) {
        match self.direction {
            Direction::Up => self.y -= PROJECTILE_SPEED,
            Direction::Down => self.y += PROJECTILE_SPEED,
            Direction::Left => self.x -= PROJECTILE_SPEED,
            Direction::Right => self.x += PROJECTILE_SPEED,
        }
    }
}

/// Explosion effect played at a destroyed tank's center
#[derive(Debug, Clone)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub frame: u32,
    pub active: bool,
}

impl Explosion {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            frame: 0,
            active: true,
        }
    }

    /// Advance one animation frame, deactivating at the last frame
    pub fn advance(&mut self) {
        self.frame += 1;
        if self.frame >= EXPLOSION_FRAMES {
            self.active = false;
        }
    }
}

/// The full mutable game world, owned by the session task
pub struct WorldState {
    pub grid: ArenaGrid,
    pub tanks: Vec<Tank>,
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    respawn_cursor: usize,
}

impl WorldState {
    pub fn new(grid: ArenaGrid) -> Self {
        Self {
            grid,
            tanks: Vec::new(),
            projectiles: Vec::new(),
            explosions: Vec::new(),
            respawn_cursor: 0,
        }
    }

    pub fn tank(&self, id: Uuid) -> Option<&Tank> {
        self.tanks.iter().find(|t| t.id == id)
    }

    pub fn tank_mut(&mut self, id: Uuid) -> Option<&mut Tank> {
        self.tanks.iter_mut().find(|t| t.id == id)
    }

    /// Spawn a tank at the next candidate slot, searching nearby cells when
    /// the slot is blocked by walls.
    pub fn spawn_tank(&mut self, id: Uuid) {
        let candidate = SPAWN_POSITIONS[self.tanks.len() % SPAWN_POSITIONS.len()];
        let (x, y) = self.find_free_spawn(candidate);
        self.tanks.push(Tank::new(id, x, y));
    }

    /// Remove the tank owned by a disconnected player. Returns true when a
    /// tank was actually removed.
    pub fn remove_tank(&mut self, id: Uuid) -> bool {
        let before = self.tanks.len();
        self.tanks.retain(|t| t.id != id);
        self.tanks.len() != before
    }

    /// Apply a client-reported position. Coordinates are trusted verbatim
    /// while the tank is alive; dead or unknown tanks are a silent no-op.
    pub fn apply_move(&mut self, id: Uuid, x: f32, y: f32, direction: Direction) -> bool {
        match self.tank_mut(id) {
            Some(tank) if tank.is_alive() => {
                tank.x = x;
                tank.y = y;
                tank.direction = direction;
                true
            }
            _ => false,
        }
    }

    /// Append a projectile at the client-reported position if the owner is
    /// alive. There is no server-side cap or cooldown on shots.
    pub fn apply_shoot(&mut self, id: Uuid, x: f32, y: f32, direction: Direction) -> bool {
        match self.tank(id) {
            Some(tank) if tank.is_alive() => {
                self.projectiles.push(Projectile::new(id, x, y, direction));
                true
            }
            _ => false,
        }
    }

    pub fn spawn_explosion(&mut self, x: f32, y: f32) {
        self.explosions.push(Explosion::new(x, y));
    }

    /// Next respawn coordinate, cycling through the fixed candidate list.
    /// Respawn intentionally skips the free-cell search used at first spawn.
    pub fn next_respawn_slot(&mut self) -> (f32, f32) {
        let slot = SPAWN_POSITIONS[self.respawn_cursor % SPAWN_POSITIONS.len()];
        self.respawn_cursor += 1;
        slot
    }

    /// Drop inactive projectiles and finished explosions
    pub fn prune(&mut self) {
        self.projectiles.retain(|p| p.active);
        self.explosions.retain(|e| e.active);
    }

    /// All four footprint corners must land on empty tiles
    fn footprint_free(&self, x: f32, y: f32) -> bool {
        let corners = [
            (x, y),
            (x + TANK_SIZE - 1.0, y),
            (x, y + TANK_SIZE - 1.0),
            (x + TANK_SIZE - 1.0, y + TANK_SIZE - 1.0),
        ];
        corners.iter().all(|&(cx, cy)| {
            self.grid
                .tile_at_point(cx, cy)
                .is_some_and(|tile| tile.is_passable())
        })
    }

    /// Search an expanding square of tile-aligned offsets around the
    /// candidate. Falls back to the candidate itself when the search is
    /// exhausted, which can place the tank inside a wall.
    fn find_free_spawn(&self, candidate: (f32, f32)) -> (f32, f32) {
        if self.footprint_free(candidate.0, candidate.1) {
            return candidate;
        }

        for radius in 1..SPAWN_SEARCH_MAX_RADIUS {
            let reach = radius as f32 * SPAWN_SEARCH_STEP;
            let mut dx = -reach;
            while dx <= reach {
                let mut dy = -reach;
                while dy <= reach {
                    let nx = candidate.0 + dx;
                    let ny = candidate.1 + dy;
                    let in_bounds = nx >= TANK_SIZE
                        && nx <= WORLD_WIDTH - TANK_SIZE
                        && ny >= TANK_SIZE
                        && ny <= WORLD_HEIGHT - TANK_SIZE;
                    if in_bounds && self.footprint_free(nx, ny) {
                        return (nx, ny);
                    }
                    dy += SPAWN_SEARCH_STEP;
                }
                dx += SPAWN_SEARCH_STEP;
            }
        }

        candidate
    }
}
