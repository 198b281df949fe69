use rayon::prelude::*;

use crate::grid::Grid;
use crate::integrator::StageBinding;
use crate::kernel::boundary::enforce_walls;
use crate::kernel::{tendency, Discretization, PhysicalConstants};
use crate::state::{Cell, HostState};

/// One full-grid stage pass on the host, mirroring `stage.wgsl`.
///
/// `out = base_weight·base + prev_weight·prev + dt_weight·dt·tendency(prev)`,
/// followed on the final stage by the wall rule of `discretization`. `out` is
/// overwritten entirely; it must not alias `base` or `prev`, which the
/// borrow checker guarantees here.
pub fn evaluate_stage(
    discretization: Discretization,
    grid: &Grid,
    constants: &PhysicalConstants,
    dt: f32,
    binding: &StageBinding,
    base: &HostState,
    prev: &HostState,
    out: &mut HostState,
) {
    let nx = grid.nx as usize;
    let weights = binding.weights;
    let dt_scale = weights.dt * dt;

    out.z
        .par_chunks_mut(nx)
        .zip(out.u.par_chunks_mut(nx))
        .zip(out.v.par_chunks_mut(nx))
        .enumerate()
        .for_each(|(j, ((z_row, u_row), v_row))| {
            let j = j as u32;
            for i in 0..grid.nx {
                let idx = grid.index(i, j);
                let rate = tendency(discretization, prev, grid, constants, i, j);
                let mut cell: Cell = weights.base * base.cell(idx)
                    + weights.prev * prev.cell(idx)
                    + dt_scale * rate;
                if binding.is_final {
                    cell = enforce_walls(discretization, grid.edges(i, j), cell);
                }
                z_row[i as usize] = cell.z;
                u_row[i as usize] = cell.u;
                v_row[i as usize] = cell.v;
            }
        });
}
