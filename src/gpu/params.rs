//! Uniform blocks consumed by the passes. Layouts must match the `Params`
//! structs declared in `stage.wgsl` and `inject.wgsl`.

use bytemuck::{Pod, Zeroable};

use crate::grid::Grid;
use crate::integrator::StageBinding;
use crate::kernel::PhysicalConstants;

/// Per-stage parameters for `stage.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct StageParams {
    pub nx: u32,
    pub ny: u32,
    pub dx: f32,
    pub dt: f32,
    pub gravity: f32,
    pub mean_depth: f32,
    pub viscosity: f32,
    pub base_weight: f32,
    pub prev_weight: f32,
    pub dt_weight: f32,
    /// Non-zero on the last stage, which applies impermeability
    pub final_stage: u32,
    pub _padding: u32,
}

impl StageParams {
    pub fn new(grid: &Grid, constants: &PhysicalConstants, dt: f32, binding: &StageBinding) -> Self {
        Self {
            nx: grid.nx,
            ny: grid.ny,
            dx: grid.dx,
            dt,
            gravity: constants.gravity,
            mean_depth: constants.mean_depth,
            viscosity: constants.viscosity,
            base_weight: binding.weights.base,
            prev_weight: binding.weights.prev,
            dt_weight: binding.weights.dt,
            final_stage: binding.is_final as u32,
            _padding: 0,
        }
    }
}

/// Parameters for `inject.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InjectParams {
    pub nx: u32,
    pub ny: u32,
    /// Zero when the injection replaces the state
    pub keep_current: u32,
    pub _padding: u32,
}

impl InjectParams {
    pub fn new(grid: &Grid, keep_current: bool) -> Self {
        Self {
            nx: grid.nx,
            ny: grid.ny,
            keep_current: keep_current as u32,
            _padding: 0,
        }
    }
}
