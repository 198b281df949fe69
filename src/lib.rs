pub mod config;
pub mod constants;
pub mod cpu;
pub mod error;
pub mod gpu;
pub mod grid;
pub mod injector;
pub mod integrator;
pub mod kernel;
pub mod solver;
pub mod state;

pub use config::SolverConfig;
pub use cpu::CpuSolver;
pub use error::{SolverError, SolverResult};
pub use gpu::{GpuContext, GpuSolver};
pub use grid::{EdgeFlags, Grid};
pub use integrator::{Integrator, SlotRotation, StageWeights};
pub use kernel::{Discretization, PhysicalConstants};
pub use solver::{create_solver, StateSolver};
pub use state::{BumpParams, Cell, Diagnostics, DropParams, HostState, InitialCondition};
