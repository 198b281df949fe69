/// Host-side State Model
///
/// The solver state itself lives in GPU textures. This module holds the
/// host representation used to seed, perturb and read back that state,
/// plus the initial-condition generators that produce it.

pub mod host_state;
pub mod initial;
pub mod diagnostics;

pub use host_state::{Cell, HostState};
pub use initial::{BumpParams, DropParams, InitialCondition};
pub use diagnostics::Diagnostics;
