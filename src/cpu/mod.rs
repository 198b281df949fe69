/// CPU Reference Backend
///
/// Runs the same stage plan and kernels as the GPU passes on host arrays.
/// Used as the numeric oracle in GPU tests and as the fallback when no
/// adapter is present.

pub mod solver;

pub use solver::CpuSolver;
