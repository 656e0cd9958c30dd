//! Projectile collision resolution
//!
//! Stateless: every function maps (projectile, grid, tanks) to at most one
//! outcome per tick. Checks run in a fixed order - arena bounds, then the
//! tile under the projectile center, then opposing tanks in store order.

use uuid::Uuid;

use super::arena::{ArenaGrid, Tile, WORLD_HEIGHT, WORLD_WIDTH};
use super::world::{Projectile, Tank};

/// Distance between projectile center and tank center that counts as a hit
pub const HIT_RADIUS: f32 = 35.0;

/// Collision outcome for one projectile in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Center left the arena bounds
    Expired,
    /// Struck a non-empty tile; destructible tiles are cleared here
    WallHit,
    /// Struck an opposing alive tank
    TankHit(Uuid),
}

/// Resolve one projectile against the arena and the tank list. Destructible
/// tiles are consumed via `apply_hit` as part of resolution. Tank matching
/// stops at the first alive non-owner within the hit radius, in store
/// iteration order.
pub fn resolve(projectile: &Projectile, grid: &mut ArenaGrid, tanks: &[Tank]) -> Option<Collision> {
    let (cx, cy) = projectile.center();

    if cx < 0.0 || cx > WORLD_WIDTH || cy < 0.0 || cy > WORLD_HEIGHT {
        return Some(Collision::Expired);
    }

    if let Some((col, row)) = ArenaGrid::tile_coords(cx, cy) {
        if let Some(tile) = grid.tile(col, row) {
            if tile != Tile::Empty {
                grid.apply_hit(col, row);
                return Some(Collision::WallHit);
            }
        }
    }

    for tank in tanks {
        if !tank.is_alive() || tank.id == projectile.owner {
            continue;
        }
        let (tx, ty) = tank.center();
        let distance = ((cx - tx).powi(2) + (cy - ty).powi(2)).sqrt();
        if distance < HIT_RADIUS {
            return Some(Collision::TankHit(tank.id));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::arena::{HitOutcome, GRID_COLS, GRID_ROWS};
    use crate::game::world::TankStatus;
    use crate::ws::protocol::Direction;

    fn grid() -> ArenaGrid {
        ArenaGrid::bordered(GRID_COLS, GRID_ROWS)
    }

    fn tank_at(x: f32, y: f32) -> Tank {
        Tank {
            id: Uuid::new_v4(),
            x,
            y,
            direction: Direction::Up,
            lives: 3,
            hits: 0,
            status: TankStatus::Alive,
        }
    }

    #[test]
    fn out_of_bounds_center_expires() {
        let mut g = grid();
        let projectile = Projectile::new(Uuid::new_v4(), -20.0, 100.0, Direction::Left);
        assert_eq!(
            resolve(&projectile, &mut g, &[]),
            Some(Collision::Expired)
        );
    }

    #[test]
    fn destructible_tile_is_cleared_on_wall_hit() {
        let mut g = grid();
        g.set(5, 5, Tile::Destructible);
        // Projectile center inside tile (5, 5)
        let projectile = Projectile::new(Uuid::new_v4(), 102.0, 102.0, Direction::Up);

        assert_eq!(resolve(&projectile, &mut g, &[]), Some(Collision::WallHit));
        assert_eq!(g.tile(5, 5), Some(Tile::Empty));
        assert_eq!(g.apply_hit(5, 5), HitOutcome::None);
    }

    #[test]
    fn indestructible_tile_blocks_without_changing() {
        let mut g = grid();
        // Tile (0, 5) is border
        let projectile = Projectile::new(Uuid::new_v4(), 5.0, 105.0, Direction::Left);

        assert_eq!(resolve(&projectile, &mut g, &[]), Some(Collision::WallHit));
        assert_eq!(g.tile(0, 5), Some(Tile::Indestructible));
    }

    #[test]
    fn opposing_tank_within_radius_is_hit() {
        let mut g = grid();
        let tank = tank_at(100.0, 100.0); // center (120, 120)
        let projectile = Projectile::new(Uuid::new_v4(), 100.0, 100.0, Direction::Down);

        assert_eq!(
            resolve(&projectile, &mut g, std::slice::from_ref(&tank)),
            Some(Collision::TankHit(tank.id))
        );
    }

    #[test]
    fn tank_outside_radius_is_missed() {
        let mut g = grid();
        let tank = tank_at(400.0, 400.0);
        let projectile = Projectile::new(Uuid::new_v4(), 100.0, 100.0, Direction::Down);

        assert_eq!(resolve(&projectile, &mut g, &[tank]), None);
    }

    #[test]
    fn owner_is_never_hit_by_own_projectile() {
        let mut g = grid();
        let tank = tank_at(100.0, 100.0);
        let projectile = Projectile::new(tank.id, 110.0, 110.0, Direction::Up);

        assert_eq!(resolve(&projectile, &mut g, &[tank]), None);
    }

    #[test]
    fn dead_tanks_are_ignored() {
        let mut g = grid();
        let mut tank = tank_at(100.0, 100.0);
        tank.status = TankStatus::Dead { respawn_at: 0 };
        let projectile = Projectile::new(Uuid::new_v4(), 110.0, 110.0, Direction::Up);

        assert_eq!(resolve(&projectile, &mut g, &[tank]), None);
    }

    #[test]
    fn first_tank_in_store_order_wins_the_tie() {
        let mut g = grid();
        let first = tank_at(100.0, 100.0);
        let mut second = tank_at(100.0, 100.0);
        second.x += 5.0;
        let projectile = Projectile::new(Uuid::new_v4(), 110.0, 110.0, Direction::Up);

        let first_id = first.id;
        assert_eq!(
            resolve(&projectile, &mut g, &[first, second]),
            Some(Collision::TankHit(first_id))
        );
    }

    #[test]
    fn wall_hit_takes_precedence_over_tank_hit() {
        let mut g = grid();
        g.set(5, 5, Tile::Destructible);
        let tank = tank_at(85.0, 85.0); // center (105, 105), within radius
        let projectile = Projectile::new(Uuid::new_v4(), 102.0, 102.0, Direction::Up);

        assert_eq!(resolve(&projectile, &mut g, &[tank]), Some(Collision::WallHit));
    }
}
