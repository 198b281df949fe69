//! State injection.
//!
//! An external field is composited onto the committed state as
//! `added + (keep ? current : 0)`, evaluated into the scratch slot and then
//! committed by rotation. `inject.wgsl` is the GPU form of [`composite_cell`].

use crate::grid::Grid;
use crate::state::{Cell, HostState};

/// Composite one cell; `current` is ignored entirely when not kept
#[inline]
pub fn composite_cell(added: Cell, current: Cell, keep_current: bool) -> Cell {
    if keep_current {
        added + current
    } else {
        added
    }
}

/// Composite `added` onto `current` into `out`, cell by cell
pub fn composite_into(
    grid: &Grid,
    added: &HostState,
    current: &HostState,
    keep_current: bool,
    out: &mut HostState,
) {
    for idx in 0..grid.cell_count() {
        out.set_cell(
            idx,
            composite_cell(added.cell(idx), current.cell(idx), keep_current),
        );
    }
}
