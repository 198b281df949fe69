/// Discretized Domain
///
/// A fixed `nx × ny` grid of square cells with spacing `dx`. Cell `(i, j)`
/// lives at flat index `i + nx * j` on the host and at texel `(i, j)` on
/// the GPU, so both backends address the same cell the same way.

use serde::{Deserialize, Serialize};

use crate::constants::grid::{DEFAULT_DX, DEFAULT_NX, DEFAULT_NY, MIN_CELLS_PER_AXIS};
use crate::error::{SolverError, SolverResult};

/// Grid descriptor, immutable for the lifetime of a solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid {
    pub nx: u32,
    pub ny: u32,
    pub dx: f32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            nx: DEFAULT_NX,
            ny: DEFAULT_NY,
            dx: DEFAULT_DX,
        }
    }
}

impl Grid {
    /// Create a validated grid
    pub fn new(nx: u32, ny: u32, dx: f32) -> SolverResult<Self> {
        let grid = Self { nx, ny, dx };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> SolverResult<()> {
        if self.nx < MIN_CELLS_PER_AXIS || self.ny < MIN_CELLS_PER_AXIS {
            return Err(SolverError::InvalidGrid {
                reason: format!(
                    "({}, {}) cells, need at least {} per axis",
                    self.nx, self.ny, MIN_CELLS_PER_AXIS
                ),
            });
        }
        if !self.dx.is_finite() || self.dx <= 0.0 {
            return Err(SolverError::InvalidGrid {
                reason: format!("cell spacing {} must be positive and finite", self.dx),
            });
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.nx as usize * self.ny as usize
    }

    #[inline]
    pub fn index(&self, i: u32, j: u32) -> usize {
        i as usize + self.nx as usize * j as usize
    }

    /// Index of `(i + di, j + dj)` clamped to the domain (clamp-to-edge)
    #[inline]
    pub fn clamped_index(&self, i: u32, j: u32, di: i32, dj: i32) -> usize {
        let ci = (i as i64 + di as i64).clamp(0, self.nx as i64 - 1) as u32;
        let cj = (j as i64 + dj as i64).clamp(0, self.ny as i64 - 1) as u32;
        self.index(ci, cj)
    }

    /// Normalized size of one cell, `(1/nx, 1/ny)`
    pub fn unit(&self) -> [f32; 2] {
        [1.0 / self.nx as f32, 1.0 / self.ny as f32]
    }

    /// Normalized texture coordinate of the centre of cell `(i, j)`
    pub fn tex_coord(&self, i: u32, j: u32) -> [f32; 2] {
        [
            (i as f32 + 0.5) / self.nx as f32,
            (j as f32 + 0.5) / self.ny as f32,
        ]
    }

    /// Which domain edges cell `(i, j)` touches.
    ///
    /// Must stay identical to `edge_flags` in `boundary.wgsl`.
    pub fn edges(&self, i: u32, j: u32) -> EdgeFlags {
        let [unit_x, unit_y] = self.unit();
        let [x, y] = self.tex_coord(i, j);
        EdgeFlags {
            west: x - unit_x < 0.0,
            east: x + unit_x > 1.0,
            south: y - unit_y < 0.0,
            north: y + unit_y > 1.0,
        }
    }
}

/// Domain edges touched by a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeFlags {
    pub west: bool,
    pub east: bool,
    pub south: bool,
    pub north: bool,
}

impl EdgeFlags {
    #[inline]
    pub fn on_x_edge(&self) -> bool {
        self.west || self.east
    }

    #[inline]
    pub fn on_y_edge(&self) -> bool {
        self.south || self.north
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_validation() {
        assert!(Grid::new(64, 64, 0.1).is_ok());
        assert!(Grid::new(1, 64, 0.1).is_err());
        assert!(Grid::new(64, 64, 0.0).is_err());
        assert!(Grid::new(64, 64, f32::NAN).is_err());
    }

    #[test]
    fn test_row_major_indexing() {
        let grid = Grid::new(8, 4, 0.1).unwrap();
        assert_eq!(grid.cell_count(), 32);
        assert_eq!(grid.index(0, 0), 0);
        assert_eq!(grid.index(7, 0), 7);
        assert_eq!(grid.index(0, 1), 8);
        assert_eq!(grid.index(3, 2), 19);
    }

    #[test]
    fn test_clamped_index_stays_in_domain() {
        let grid = Grid::new(8, 4, 0.1).unwrap();
        assert_eq!(grid.clamped_index(0, 0, -1, 0), grid.index(0, 0));
        assert_eq!(grid.clamped_index(7, 3, 1, 1), grid.index(7, 3));
        assert_eq!(grid.clamped_index(3, 2, -1, 1), grid.index(2, 3));
    }

    #[test]
    fn test_edges_only_on_outer_ring() {
        let grid = Grid::new(64, 48, 0.1).unwrap();
        for j in 0..grid.ny {
            for i in 0..grid.nx {
                let edges = grid.edges(i, j);
                assert_eq!(edges.west, i == 0, "west at ({}, {})", i, j);
                assert_eq!(edges.east, i == grid.nx - 1, "east at ({}, {})", i, j);
                assert_eq!(edges.south, j == 0, "south at ({}, {})", i, j);
                assert_eq!(edges.north, j == grid.ny - 1, "north at ({}, {})", i, j);
            }
        }
    }

    #[test]
    fn test_two_cell_grid_touches_both_edges() {
        let grid = Grid::new(2, 2, 1.0).unwrap();
        let edges = grid.edges(0, 1);
        assert!(edges.west && !edges.east);
        assert!(edges.north && !edges.south);
        assert!(edges.on_x_edge() && edges.on_y_edge());
    }
}
