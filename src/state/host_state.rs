use std::ops::{Add, Mul, Sub};

use crate::constants::gpu::CHANNELS_PER_TEXEL;
use crate::error::{SolverError, SolverResult};
use crate::grid::Grid;

/// One grid cell: height perturbation and the two velocity components
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cell {
    pub z: f32,
    pub u: f32,
    pub v: f32,
}

impl Cell {
    pub const ZERO: Cell = Cell { z: 0.0, u: 0.0, v: 0.0 };

    pub fn new(z: f32, u: f32, v: f32) -> Self {
        Self { z, u, v }
    }
}

impl Add for Cell {
    type Output = Cell;

    fn add(self, rhs: Cell) -> Cell {
        Cell::new(self.z + rhs.z, self.u + rhs.u, self.v + rhs.v)
    }
}

impl Sub for Cell {
    type Output = Cell;

    fn sub(self, rhs: Cell) -> Cell {
        Cell::new(self.z - rhs.z, self.u - rhs.u, self.v - rhs.v)
    }
}

impl Mul<Cell> for f32 {
    type Output = Cell;

    fn mul(self, rhs: Cell) -> Cell {
        Cell::new(self * rhs.z, self * rhs.u, self * rhs.v)
    }
}

/// State-shaped host arrays, one entry per cell in row-major order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostState {
    pub z: Vec<f32>,
    pub u: Vec<f32>,
    pub v: Vec<f32>,
}

impl HostState {
    /// Quiescent state for `grid`
    pub fn zeros(grid: &Grid) -> Self {
        let n = grid.cell_count();
        Self {
            z: vec![0.0; n],
            u: vec![0.0; n],
            v: vec![0.0; n],
        }
    }

    pub fn cell_count(&self) -> usize {
        self.z.len()
    }

    /// Fail unless every channel holds exactly `nx * ny` cells
    pub fn ensure_matches(&self, grid: &Grid) -> SolverResult<()> {
        let expected = grid.cell_count();
        for actual in [self.z.len(), self.u.len(), self.v.len()] {
            if actual != expected {
                return Err(SolverError::DimensionMismatch {
                    nx: grid.nx,
                    ny: grid.ny,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn cell(&self, idx: usize) -> Cell {
        Cell::new(self.z[idx], self.u[idx], self.v[idx])
    }

    #[inline]
    pub fn set_cell(&mut self, idx: usize, cell: Cell) {
        self.z[idx] = cell.z;
        self.u[idx] = cell.u;
        self.v[idx] = cell.v;
    }

    /// Interleave into RGBA texels `[z, u, v, 0]`
    pub fn pack_rgba(&self) -> Vec<f32> {
        let mut texels = Vec::with_capacity(self.cell_count() * CHANNELS_PER_TEXEL);
        for idx in 0..self.cell_count() {
            texels.extend_from_slice(&[self.z[idx], self.u[idx], self.v[idx], 0.0]);
        }
        texels
    }

    /// Inverse of [`pack_rgba`](Self::pack_rgba) for rows that may be padded.
    ///
    /// `row_stride` is the distance between rows in floats.
    pub fn unpack_rgba(grid: &Grid, texels: &[f32], row_stride: usize) -> SolverResult<Self> {
        grid.validate()?;
        let row_len = grid.nx as usize * CHANNELS_PER_TEXEL;
        let required = row_stride * (grid.ny as usize - 1) + row_len;
        if row_stride < row_len || texels.len() < required {
            return Err(SolverError::DimensionMismatch {
                nx: grid.nx,
                ny: grid.ny,
                expected: required / CHANNELS_PER_TEXEL,
                actual: texels.len() / CHANNELS_PER_TEXEL,
            });
        }

        let mut state = Self::zeros(grid);
        for j in 0..grid.ny {
            let row = &texels[j as usize * row_stride..j as usize * row_stride + row_len];
            for (i, texel) in row.chunks_exact(CHANNELS_PER_TEXEL).enumerate() {
                let idx = grid.index(i as u32, j);
                state.set_cell(idx, Cell::new(texel[0], texel[1], texel[2]));
            }
        }
        Ok(state)
    }

    /// Sum of the height perturbation over all cells
    pub fn total_height(&self) -> f64 {
        self.z.iter().map(|&z| z as f64).sum()
    }

    pub fn max_abs_height(&self) -> f32 {
        self.z.iter().fold(0.0f32, |acc, z| acc.max(z.abs()))
    }

    pub fn max_speed(&self) -> f32 {
        self.u
            .iter()
            .zip(&self.v)
            .fold(0.0f32, |acc, (u, v)| acc.max((u * u + v * v).sqrt()))
    }

    pub fn is_finite(&self) -> bool {
        self.z
            .iter()
            .chain(&self.u)
            .chain(&self.v)
            .all(|value| value.is_finite())
    }
}
