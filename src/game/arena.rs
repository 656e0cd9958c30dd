//! Arena grid - tile map generation and destruction

use rand::Rng;

/// Tile edge length in world units
pub const TILE_SIZE: f32 = 20.0;
/// Arena dimensions in tiles
pub const GRID_COLS: usize = 45;
pub const GRID_ROWS: usize = 30;
/// Arena dimensions in world units
pub const WORLD_WIDTH: f32 = GRID_COLS as f32 * TILE_SIZE;
pub const WORLD_HEIGHT: f32 = GRID_ROWS as f32 * TILE_SIZE;

/// One cell of the arena grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Indestructible,
    Destructible,
}

impl Tile {
    /// Only empty tiles can be driven or shot through
    pub fn is_passable(self) -> bool {
        matches!(self, Tile::Empty)
    }

    /// Wire representation (0 = empty, 1 = indestructible, 2 = destructible)
    pub fn as_u8(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::Indestructible => 1,
            Tile::Destructible => 2,
        }
    }
}

/// Result of a projectile striking a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Tile was already empty, nothing to hit
    None,
    /// Indestructible tile, unchanged
    Blocked,
    /// Destructible tile cleared to empty
    Destroyed,
}

/// Interior generation policy. Both strategies are deterministic for a
/// given seeded RNG; the border is always indestructible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridStrategy {
    /// Horizontal and vertical runs of destructible wall segments
    Corridors,
    /// Each interior cell independently becomes destructible
    Scatter { density: f32 },
}

/// Fixed-dimensions tile map; only destructible tiles mutate after generation
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaGrid {
    cols: usize,
    rows: usize,
    tiles: Vec<Tile>,
}

impl ArenaGrid {
    /// Empty interior with an indestructible border on all four edges
    pub fn bordered(cols: usize, rows: usize) -> Self {
        let mut grid = Self {
            cols,
            rows,
            tiles: vec![Tile::Empty; cols * rows],
        };
        for col in 0..cols {
            grid.set(col, 0, Tile::Indestructible);
            grid.set(col, rows - 1, Tile::Indestructible);
        }
        for row in 0..rows {
            grid.set(0, row, Tile::Indestructible);
            grid.set(cols - 1, row, Tile::Indestructible);
        }
        grid
    }

    /// Generate an arena with the given interior strategy
    pub fn generate(strategy: GridStrategy, cols: usize, rows: usize, rng: &mut impl Rng) -> Self {
        let mut grid = Self::bordered(cols, rows);
        match strategy {
            GridStrategy::Corridors => grid.fill_corridors(rng),
            GridStrategy::Scatter { density } => grid.fill_scatter(density, rng),
        }
        grid
    }

    /// Horizontal runs every 4 rows, vertical runs every 8 columns, with
    /// randomized run lengths and gaps between segments
    fn fill_corridors(&mut self, rng: &mut impl Rng) {
        let mut row = 1;
        while row < self.rows - 1 {
            let mut col = 1;
            while col < self.cols - 2 {
                let length = rng.gen_range(3..8);
                for i in 0..length {
                    if col + i >= self.cols - 1 {
                        break;
                    }
                    self.set(col + i, row, Tile::Destructible);
                }
                col += length + rng.gen_range(2..6);
            }
            row += 4;
        }

        let mut col = 1;
        while col < self.cols - 1 {
            let mut row = 1;
            while row < self.rows - 2 {
                let length = rng.gen_range(2..6);
                for i in 0..length {
                    if row + i >= self.rows - 1 {
                        break;
                    }
                    self.set(col, row + i, Tile::Destructible);
                }
                row += length + rng.gen_range(2..6);
            }
            col += 8;
        }
    }

    fn fill_scatter(&mut self, density: f32, rng: &mut impl Rng) {
        for row in 1..self.rows - 1 {
            for col in 1..self.cols - 1 {
                if rng.gen::<f32>() < density {
                    self.set(col, row, Tile::Destructible);
                }
            }
        }
    }

    /// Tile at a grid coordinate, None when out of bounds
    pub fn tile(&self, col: usize, row: usize) -> Option<Tile> {
        if col < self.cols && row < self.rows {
            Some(self.tiles[row * self.cols + col])
        } else {
            None
        }
    }

    pub(crate) fn set(&mut self, col: usize, row: usize, tile: Tile) {
        if col < self.cols && row < self.rows {
            self.tiles[row * self.cols + col] = tile;
        }
    }

    /// Map a world-space point to a grid coordinate
    pub fn tile_coords(x: f32, y: f32) -> Option<(usize, usize)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        Some(((x / TILE_SIZE) as usize, (y / TILE_SIZE) as usize))
    }

    /// Tile under a world-space point, None outside the grid
    pub fn tile_at_point(&self, x: f32, y: f32) -> Option<Tile> {
        let (col, row) = Self::tile_coords(x, y)?;
        self.tile(col, row)
    }

    /// Apply a projectile hit to a tile. Destructible tiles become empty;
    /// indestructible tiles never change.
    pub fn apply_hit(&mut self, col: usize, row: usize) -> HitOutcome {
        match self.tile(col, row) {
            Some(Tile::Destructible) => {
                self.set(col, row, Tile::Empty);
                HitOutcome::Destroyed
            }
            Some(Tile::Indestructible) => HitOutcome::Blocked,
            Some(Tile::Empty) | None => HitOutcome::None,
        }
    }

    /// Row-major wire representation for snapshots
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| self.tiles[row * self.cols + col].as_u8())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn border_is_indestructible_for_both_strategies() {
        for strategy in [GridStrategy::Corridors, GridStrategy::Scatter { density: 0.5 }] {
            let grid = ArenaGrid::generate(strategy, GRID_COLS, GRID_ROWS, &mut rng(7));
            for col in 0..GRID_COLS {
                assert_eq!(grid.tile(col, 0), Some(Tile::Indestructible));
                assert_eq!(grid.tile(col, GRID_ROWS - 1), Some(Tile::Indestructible));
            }
            for row in 0..GRID_ROWS {
                assert_eq!(grid.tile(0, row), Some(Tile::Indestructible));
                assert_eq!(grid.tile(GRID_COLS - 1, row), Some(Tile::Indestructible));
            }
        }
    }

    #[test]
    fn generation_is_deterministic_given_a_seed() {
        let a = ArenaGrid::generate(GridStrategy::Corridors, GRID_COLS, GRID_ROWS, &mut rng(42));
        let b = ArenaGrid::generate(GridStrategy::Corridors, GRID_COLS, GRID_ROWS, &mut rng(42));
        assert_eq!(a, b);

        let c = ArenaGrid::generate(
            GridStrategy::Scatter { density: 0.2 },
            GRID_COLS,
            GRID_ROWS,
            &mut rng(42),
        );
        let d = ArenaGrid::generate(
            GridStrategy::Scatter { density: 0.2 },
            GRID_COLS,
            GRID_ROWS,
            &mut rng(42),
        );
        assert_eq!(c, d);
        assert_ne!(a, c);
    }

    #[test]
    fn corridors_place_only_destructible_interior_walls() {
        let grid = ArenaGrid::generate(GridStrategy::Corridors, GRID_COLS, GRID_ROWS, &mut rng(3));
        let mut destructible = 0;
        for row in 1..GRID_ROWS - 1 {
            for col in 1..GRID_COLS - 1 {
                match grid.tile(col, row).unwrap() {
                    Tile::Indestructible => panic!("indestructible tile inside interior"),
                    Tile::Destructible => destructible += 1,
                    Tile::Empty => {}
                }
            }
        }
        assert!(destructible > 0);
    }

    #[test]
    fn apply_hit_never_changes_indestructible() {
        let mut grid = ArenaGrid::bordered(10, 10);
        assert_eq!(grid.apply_hit(0, 0), HitOutcome::Blocked);
        assert_eq!(grid.tile(0, 0), Some(Tile::Indestructible));
    }

    #[test]
    fn apply_hit_destroys_destructible_exactly_once() {
        let mut grid = ArenaGrid::bordered(10, 10);
        grid.set(4, 4, Tile::Destructible);

        assert_eq!(grid.apply_hit(4, 4), HitOutcome::Destroyed);
        assert_eq!(grid.tile(4, 4), Some(Tile::Empty));
        // Second hit on the now-empty cell is a no-op
        assert_eq!(grid.apply_hit(4, 4), HitOutcome::None);
        assert_eq!(grid.tile(4, 4), Some(Tile::Empty));
    }

    #[test]
    fn apply_hit_out_of_bounds_is_none() {
        let mut grid = ArenaGrid::bordered(10, 10);
        assert_eq!(grid.apply_hit(99, 99), HitOutcome::None);
    }

    #[test]
    fn tile_at_point_maps_by_tile_size() {
        let grid = ArenaGrid::bordered(10, 10);
        // (5, 5) lands in the border tile (0, 0)
        assert_eq!(grid.tile_at_point(5.0, 5.0), Some(Tile::Indestructible));
        // (30, 30) lands in the interior tile (1, 1)
        assert_eq!(grid.tile_at_point(30.0, 30.0), Some(Tile::Empty));
        assert_eq!(grid.tile_at_point(-1.0, 30.0), None);
        assert_eq!(grid.tile_at_point(1000.0, 30.0), None);
    }

    #[test]
    fn only_empty_is_passable() {
        assert!(Tile::Empty.is_passable());
        assert!(!Tile::Indestructible.is_passable());
        assert!(!Tile::Destructible.is_passable());
    }
}
