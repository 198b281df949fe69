//! Boundary Enforcer
//!
//! The stencil fetches clamp at the domain edge, so gradients formed there
//! are not physical. Two rules fix that, both keyed on [`EdgeFlags`]:
//!
//! - every stage: the height gradient across an edge is forced to zero
//!   (Neumann, zero flux)
//! - final stage only: the velocity component normal to an edge is forced
//!   to zero (impermeable wall)
//!
//! On the C-grid a texel stores its west `u` face and south `v` face, so
//! only the west and south texels hold wall faces. The east and north walls
//! lie beyond the last stored face and are closed through [`wall_face`].
//!
//! `boundary.wgsl` and `stage.wgsl` apply the same rules on the GPU.

use crate::grid::EdgeFlags;
use crate::kernel::Discretization;
use crate::state::Cell;

/// Zero the centred height-gradient components that would reach outside
/// the domain
#[inline]
pub fn suppress_height_gradient(edges: EdgeFlags, dz_dx: f32, dz_dy: f32) -> (f32, f32) {
    let dz_dx = if edges.on_x_edge() { 0.0 } else { dz_dx };
    let dz_dy = if edges.on_y_edge() { 0.0 } else { dz_dy };
    (dz_dx, dz_dy)
}

/// Zero the backward height differences at the C-grid wall faces
#[inline]
pub fn suppress_face_gradient(edges: EdgeFlags, dz_dx: f32, dz_dy: f32) -> (f32, f32) {
    let dz_dx = if edges.west { 0.0 } else { dz_dx };
    let dz_dy = if edges.south { 0.0 } else { dz_dy };
    (dz_dx, dz_dy)
}

/// Zero the wall-normal velocity of an edge cell
#[inline]
pub fn enforce_impermeability(edges: EdgeFlags, cell: Cell) -> Cell {
    Cell {
        z: cell.z,
        u: if edges.on_x_edge() { 0.0 } else { cell.u },
        v: if edges.on_y_edge() { 0.0 } else { cell.v },
    }
}

/// Zero the stored C-grid faces that lie on a wall
#[inline]
pub fn close_wall_faces(edges: EdgeFlags, cell: Cell) -> Cell {
    Cell {
        z: cell.z,
        u: if edges.west { 0.0 } else { cell.u },
        v: if edges.south { 0.0 } else { cell.v },
    }
}

/// Final-stage wall rule for `discretization`
#[inline]
pub fn enforce_walls(discretization: Discretization, edges: EdgeFlags, cell: Cell) -> Cell {
    match discretization {
        Discretization::Colocated => enforce_impermeability(edges, cell),
        Discretization::Staggered => close_wall_faces(edges, cell),
    }
}

/// Face velocity with wall faces closed
#[inline]
pub fn wall_face(closed: bool, velocity: f32) -> f32 {
    if closed {
        0.0
    } else {
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_cells_untouched() {
        let edges = EdgeFlags::default();
        assert_eq!(suppress_height_gradient(edges, 1.5, -2.0), (1.5, -2.0));
        let cell = Cell::new(1.0, 2.0, 3.0);
        assert_eq!(enforce_impermeability(edges, cell), cell);
    }

    #[test]
    fn test_corner_cell() {
        let edges = EdgeFlags {
            west: true,
            north: true,
            ..EdgeFlags::default()
        };
        assert_eq!(suppress_height_gradient(edges, 1.5, -2.0), (0.0, 0.0));
        assert_eq!(
            enforce_impermeability(edges, Cell::new(1.0, 2.0, 3.0)),
            Cell::new(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_single_axis_edge() {
        let edges = EdgeFlags {
            south: true,
            ..EdgeFlags::default()
        };
        assert_eq!(suppress_height_gradient(edges, 1.5, -2.0), (1.5, 0.0));
        assert_eq!(
            enforce_impermeability(edges, Cell::new(1.0, 2.0, 3.0)),
            Cell::new(1.0, 2.0, 0.0)
        );
        assert_eq!(wall_face(edges.south, 4.0), 0.0);
        assert_eq!(wall_face(edges.north, 4.0), 4.0);
    }

    #[test]
    fn test_staggered_walls_close_only_stored_wall_faces() {
        let cell = Cell::new(1.0, 2.0, 3.0);
        let east_north = EdgeFlags {
            east: true,
            north: true,
            ..EdgeFlags::default()
        };
        // u and v of the east and north texels sit on interior faces
        assert_eq!(enforce_walls(Discretization::Staggered, east_north, cell), cell);
        assert_eq!(suppress_face_gradient(east_north, 1.5, -2.0), (1.5, -2.0));
        assert_eq!(
            enforce_walls(Discretization::Colocated, east_north, cell),
            Cell::new(1.0, 0.0, 0.0)
        );

        let west_south = EdgeFlags {
            west: true,
            south: true,
            ..EdgeFlags::default()
        };
        assert_eq!(
            enforce_walls(Discretization::Staggered, west_south, cell),
            Cell::new(1.0, 0.0, 0.0)
        );
        assert_eq!(suppress_face_gradient(west_south, 1.5, -2.0), (0.0, 0.0));
    }
}
