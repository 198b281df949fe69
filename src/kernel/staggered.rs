//! Arakawa C-grid scheme.
//!
//! Texel `(i, j)` stores `z` at the cell centre, `u` on the west face
//! `(i-½, j)` and `v` on the south face `(i, j-½)`. Continuity is written
//! in flux form with closed walls, so `Σz` only changes by rounding. The
//! stored wall faces are the west `u` of column 0 and the south `v` of
//! row 0; every other stored face is interior.

use crate::grid::EdgeFlags;
use crate::kernel::boundary::{suppress_face_gradient, wall_face};
use crate::kernel::{PhysicalConstants, Stencil};
use crate::state::Cell;

pub fn tendency(s: &Stencil, edges: EdgeFlags, dx: f32, constants: &PhysicalConstants) -> Cell {
    let inv_dx = 1.0 / dx;
    let inv_2dx = 1.0 / (2.0 * dx);
    let inv_dx2 = 1.0 / (dx * dx);
    let c = s.center;
    let h = constants.mean_depth;
    let g = constants.gravity;
    let nu = constants.viscosity;

    // Faces past the east and north walls are closed, not clamped copies
    let u_ip1 = wall_face(edges.east, s.ip1.u);
    let u_ip1_jm1 = wall_face(edges.east, s.ip1_jm1.u);
    let v_jp1 = wall_face(edges.north, s.jp1.v);
    let v_im1_jp1 = wall_face(edges.north, s.im1_jp1.v);

    // Mass fluxes through the four faces of the cell
    let u_west = wall_face(edges.west, c.u);
    let v_south = wall_face(edges.south, c.v);

    let flux_west = (h + 0.5 * (s.im1.z + c.z)) * u_west;
    let flux_east = (h + 0.5 * (c.z + s.ip1.z)) * u_ip1;
    let flux_south = (h + 0.5 * (s.jm1.z + c.z)) * v_south;
    let flux_north = (h + 0.5 * (c.z + s.jp1.z)) * v_jp1;

    let lap_z = s.laplacian(dx).z;
    let dz = -((flux_east - flux_west) + (flux_north - flux_south)) * inv_dx + nu * lap_z;

    // Pressure gradients at the u and v points, one-sided across the face
    let (dz_dx, dz_dy) = suppress_face_gradient(
        edges,
        (c.z - s.im1.z) * inv_dx,
        (c.z - s.jm1.z) * inv_dx,
    );

    // u-momentum at (i-½, j); the west wall face is fixed
    let du = if edges.west {
        0.0
    } else {
        let v_bar = 0.25 * (c.v + v_jp1 + s.im1.v + v_im1_jp1);
        let du_dx = (u_ip1 - s.im1.u) * inv_2dx;
        let du_dy = (s.jp1.u - s.jm1.u) * inv_2dx;
        let lap_u = inv_dx2 * (u_ip1 + s.im1.u + s.jp1.u + s.jm1.u - 4.0 * c.u);
        -g * dz_dx - c.u * du_dx - v_bar * du_dy + nu * lap_u
    };

    // v-momentum at (i, j-½); the south wall face is fixed
    let dv = if edges.south {
        0.0
    } else {
        let u_bar = 0.25 * (c.u + u_ip1 + s.jm1.u + u_ip1_jm1);
        let dv_dx = (s.ip1.v - s.im1.v) * inv_2dx;
        let dv_dy = (v_jp1 - s.jm1.v) * inv_2dx;
        let lap_v = inv_dx2 * (s.ip1.v + s.im1.v + v_jp1 + s.jm1.v - 4.0 * c.v);
        -g * dz_dy - u_bar * dv_dx - c.v * dv_dy + nu * lap_v
    };

    Cell { z: dz, u: du, v: dv }
}
