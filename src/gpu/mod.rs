//! GPU backend
//!
//! The solver state lives in `Rgba32Float` render targets. Each stage of a
//! time step and each injection is one full-screen raster pass whose
//! fragment shader evaluates a single cell.

pub mod context;
pub mod params;
pub mod pass;
pub mod pass_schema;
pub mod readback;
pub mod shader_source;
pub mod solver;
pub mod texture;

pub use context::GpuContext;
pub use pass::FullscreenPass;
pub use pass_schema::{PassSchema, INJECT_PASS, STAGE_PASS};
pub use solver::GpuSolver;
pub use texture::{StateArena, StateTexture};
