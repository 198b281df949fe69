/// Solver Interface
///
/// The operations a host drives every tick, shared by the GPU backend and
/// the CPU reference backend. Calls must be serialized by the host; neither
/// backend overlaps two operations.

use std::sync::Arc;

use crate::config::SolverConfig;
use crate::cpu::CpuSolver;
use crate::error::{SolverError, SolverResult};
use crate::gpu::{GpuContext, GpuSolver};
use crate::grid::Grid;
use crate::state::HostState;

pub trait StateSolver {
    /// Grid the solver was built for
    fn grid(&self) -> Grid;

    /// Advance the committed state by one step of `dt`
    fn advance(&mut self, dt: f32) -> SolverResult<()>;

    /// Composite `perturbation` onto the committed state, or replace it
    /// when `clear_state` is set
    fn inject_state(&mut self, perturbation: &HostState, clear_state: bool) -> SolverResult<()>;

    /// Copy the committed state back to the host
    fn read_state(&self) -> SolverResult<HostState>;

    fn is_gpu_accelerated(&self) -> bool;
}

/// Build a solver seeded with `config.initial`.
///
/// With `prefer_gpu` a headless GPU context is requested first; when no
/// adapter is available the CPU backend is used instead. Every other error
/// is returned.
pub fn create_solver(config: &SolverConfig, prefer_gpu: bool) -> SolverResult<Box<dyn StateSolver>> {
    config.validate()?;
    let initial = config.initial.generate(&config.grid)?;

    if prefer_gpu {
        match GpuContext::new_headless_blocking() {
            Ok(context) => {
                let solver = GpuSolver::setup(Arc::new(context), config, &initial)?;
                return Ok(Box::new(solver));
            }
            Err(SolverError::AdapterUnavailable) => {
                log::warn!("[StateSolver] No GPU adapter available, using CPU reference backend");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Box::new(CpuSolver::setup(config, &initial)?))
}
