//! Solver configuration
//!
//! Everything a solver needs to be built, loadable from TOML. Missing keys
//! fall back to the defaults in [`crate::constants`].
//!
//! ```toml
//! discretization = "colocated"
//! integrator = "heun"
//!
//! [grid]
//! nx = 128
//! ny = 128
//!
//! [initial]
//! method = "bump"
//! width = 3.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};
use crate::grid::Grid;
use crate::integrator::Integrator;
use crate::kernel::{Discretization, PhysicalConstants};
use crate::state::InitialCondition;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub grid: Grid,
    pub discretization: Discretization,
    pub integrator: Integrator,
    pub constants: PhysicalConstants,
    pub initial: InitialCondition,
}

impl SolverConfig {
    pub fn from_toml_str(raw: &str) -> SolverResult<Self> {
        let config: SolverConfig =
            toml::from_str(raw).map_err(|e| SolverError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SolverResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        log::info!("[SolverConfig] Loaded {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> SolverResult<()> {
        self.grid.validate()?;
        self.constants.validate()
    }

    /// Short human-readable description of the scheme pairing
    pub fn scheme_label(&self) -> String {
        format!("{:?} + {:?}", self.discretization, self.integrator)
    }
}
