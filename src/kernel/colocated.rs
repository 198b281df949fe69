//! Centred co-located scheme: all three channels at the cell centre,
//! central first differences and a 5-point Laplacian.

use crate::grid::EdgeFlags;
use crate::kernel::boundary::suppress_height_gradient;
use crate::kernel::{PhysicalConstants, Stencil};
use crate::state::Cell;

pub fn tendency(s: &Stencil, edges: EdgeFlags, dx: f32, constants: &PhysicalConstants) -> Cell {
    let inv_2dx = 1.0 / (2.0 * dx);
    let c = s.center;

    let (dz_dx, dz_dy) = suppress_height_gradient(
        edges,
        (s.ip1.z - s.im1.z) * inv_2dx,
        (s.jp1.z - s.jm1.z) * inv_2dx,
    );

    let du_dx = (s.ip1.u - s.im1.u) * inv_2dx;
    let dv_dx = (s.ip1.v - s.im1.v) * inv_2dx;
    let du_dy = (s.jp1.u - s.jm1.u) * inv_2dx;
    let dv_dy = (s.jp1.v - s.jm1.v) * inv_2dx;

    let lap = s.laplacian(dx);
    let depth = constants.mean_depth + c.z;
    let nu = constants.viscosity;
    let g = constants.gravity;

    Cell {
        z: -(depth * (du_dx + dv_dy) + c.u * dz_dx + c.v * dz_dy) + nu * lap.z,
        u: -g * dz_dx - c.u * du_dx - c.v * du_dy + nu * lap.u,
        v: -g * dz_dy - c.u * dv_dx - c.v * dv_dy + nu * lap.v,
    }
}
