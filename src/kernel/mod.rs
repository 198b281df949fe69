/// Tendency Kernel
///
/// Per-cell evaluation of `d(z, u, v)/dt` from neighbouring samples. The
/// functions here are the host mirror of `tendency.wgsl`: same stencils,
/// same clamp-to-edge fetches, same boundary rules. The GPU passes are
/// checked against them.

pub mod boundary;
pub mod colocated;
pub mod staggered;
pub mod stage;

use serde::{Deserialize, Serialize};

use crate::constants::physics::{GRAVITY, KINEMATIC_VISCOSITY, MEAN_DEPTH};
use crate::error::{SolverError, SolverResult};
use crate::grid::{EdgeFlags, Grid};
use crate::state::{Cell, HostState};

pub use stage::evaluate_stage;

/// Spatial discretization of the tendency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discretization {
    /// All channels at cell centres, 5-point stencil
    Colocated,
    /// Arakawa C-grid: z at centres, u on west faces, v on south faces
    #[default]
    Staggered,
}

impl Discretization {
    /// Fragment entry point implementing this discretization
    pub fn fragment_entry(&self) -> &'static str {
        match self {
            Discretization::Colocated => "fs_colocated",
            Discretization::Staggered => "fs_staggered",
        }
    }

    /// Neighbour offsets fetched per cell, centre first
    pub fn stencil_offsets(&self) -> &'static [(i32, i32)] {
        match self {
            Discretization::Colocated => &[(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)],
            Discretization::Staggered => {
                &[(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1), (-1, 1), (1, -1)]
            }
        }
    }
}

/// Scheme constants carried into every tendency evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    pub gravity: f32,
    pub mean_depth: f32,
    pub viscosity: f32,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            mean_depth: MEAN_DEPTH,
            viscosity: KINEMATIC_VISCOSITY,
        }
    }
}

impl PhysicalConstants {
    pub fn validate(&self) -> SolverResult<()> {
        let values = [
            ("gravity", self.gravity),
            ("mean_depth", self.mean_depth),
            ("viscosity", self.viscosity),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(SolverError::Config(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Samples around one cell, clamped to the domain
#[derive(Debug, Clone, Copy)]
pub struct Stencil {
    pub center: Cell,
    pub ip1: Cell,
    pub im1: Cell,
    pub jp1: Cell,
    pub jm1: Cell,
    /// `(i-1, j+1)`, staggered scheme only
    pub im1_jp1: Cell,
    /// `(i+1, j-1)`, staggered scheme only
    pub ip1_jm1: Cell,
}

impl Stencil {
    pub fn gather(state: &HostState, grid: &Grid, i: u32, j: u32) -> Self {
        let at = |di: i32, dj: i32| state.cell(grid.clamped_index(i, j, di, dj));
        Self {
            center: at(0, 0),
            ip1: at(1, 0),
            im1: at(-1, 0),
            jp1: at(0, 1),
            jm1: at(0, -1),
            im1_jp1: at(-1, 1),
            ip1_jm1: at(1, -1),
        }
    }

    /// 5-point Laplacian of every channel
    pub fn laplacian(&self, dx: f32) -> Cell {
        let sum = self.ip1 + self.im1 + self.jp1 + self.jm1;
        (1.0 / (dx * dx)) * (sum - 4.0 * self.center)
    }
}

/// Tendency of cell `(i, j)` of `state`
pub fn tendency(
    discretization: Discretization,
    state: &HostState,
    grid: &Grid,
    constants: &PhysicalConstants,
    i: u32,
    j: u32,
) -> Cell {
    let stencil = Stencil::gather(state, grid, i, j);
    let edges: EdgeFlags = grid.edges(i, j);
    match discretization {
        Discretization::Colocated => colocated::tendency(&stencil, edges, grid.dx, constants),
        Discretization::Staggered => staggered::tendency(&stencil, edges, grid.dx, constants),
    }
}
