//! Snapshot assembly for network transmission

use crate::ws::protocol::{BulletState, ExplosionState, ServerMsg, TankState};

use super::world::{WorldState, PROJECTILE_SIZE, PROJECTILE_SPEED};

/// Projects the world state into full wire snapshots. Snapshots go out on
/// every tick and again after every accepted command, so two clients can
/// see more than one snapshot per tick window.
pub struct SnapshotBuilder {
    snapshots_built: u64,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self { snapshots_built: 0 }
    }

    pub fn snapshots_built(&self) -> u64 {
        self.snapshots_built
    }

    /// Build a full game-state message from the current world
    pub fn build(&mut self, world: &WorldState) -> ServerMsg {
        self.snapshots_built += 1;

        let players = world
            .tanks
            .iter()
            .map(|t| TankState {
                id: t.id,
                x: t.x,
                y: t.y,
                direction: t.direction,
                alive: t.is_alive(),
                lives: t.lives,
                hits: t.hits,
            })
            .collect();

        let bullets = world
            .projectiles
            .iter()
            .filter(|p| p.active)
            .map(|p| BulletState {
                x: p.x,
                y: p.y,
                direction: p.direction,
                owner: p.owner,
                size: PROJECTILE_SIZE,
                speed: PROJECTILE_SPEED,
            })
            .collect();

        let explosions = world
            .explosions
            .iter()
            .filter(|e| e.active)
            .map(|e| ExplosionState {
                x: e.x,
                y: e.y,
                frame: e.frame,
            })
            .collect();

        ServerMsg::GameState {
            players,
            bullets,
            explosions,
            map: world.grid.to_rows(),
        }
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::arena::{ArenaGrid, GRID_COLS, GRID_ROWS};
    use crate::game::world::TankStatus;
    use crate::ws::protocol::Direction;
    use uuid::Uuid;

    #[test]
    fn snapshot_projects_all_entity_lists_and_the_map() {
        let mut world = WorldState::new(ArenaGrid::bordered(GRID_COLS, GRID_ROWS));
        let shooter = Uuid::new_v4();
        let target = Uuid::new_v4();
        world.spawn_tank(shooter);
        world.spawn_tank(target);
        world.tank_mut(target).unwrap().status = TankStatus::Dead { respawn_at: 500 };
        world.apply_shoot(shooter, 70.0, 50.0, Direction::Up);
        world.spawn_explosion(800.0, 80.0);

        let mut builder = SnapshotBuilder::new();
        let msg = builder.build(&world);
        let ServerMsg::GameState {
            players,
            bullets,
            explosions,
            map,
        } = msg
        else {
            panic!("expected a game state snapshot");
        };

        assert_eq!(players.len(), 2);
        let dead = players.iter().find(|p| p.id == target).unwrap();
        assert!(!dead.alive);
        let alive = players.iter().find(|p| p.id == shooter).unwrap();
        assert!(alive.alive);
        assert_eq!(alive.lives, 3);

        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0].owner, shooter);
        assert_eq!(bullets[0].size, PROJECTILE_SIZE);
        assert_eq!(bullets[0].speed, PROJECTILE_SPEED);

        assert_eq!(explosions.len(), 1);
        assert_eq!(explosions[0].frame, 0);

        assert_eq!(map.len(), GRID_ROWS);
        assert_eq!(map[0].len(), GRID_COLS);
        assert_eq!(map[0][0], 1);
        assert_eq!(builder.snapshots_built(), 1);
    }

    #[test]
    fn inactive_entities_are_excluded() {
        let mut world = WorldState::new(ArenaGrid::bordered(GRID_COLS, GRID_ROWS));
        let id = Uuid::new_v4();
        world.spawn_tank(id);
        world.apply_shoot(id, 70.0, 50.0, Direction::Up);
        world.projectiles[0].active = false;
        world.spawn_explosion(80.0, 80.0);
        world.explosions[0].active = false;

        let msg = SnapshotBuilder::new().build(&world);
        let ServerMsg::GameState {
            bullets, explosions, ..
        } = msg
        else {
            panic!("expected a game state snapshot");
        };
        assert!(bullets.is_empty());
        assert!(explosions.is_empty());
    }
}
