use std::fmt;

use crate::state::HostState;

/// Summary of a state snapshot, logged by the runner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    pub total_height: f64,
    pub max_abs_height: f32,
    pub max_speed: f32,
    pub finite: bool,
}

impl Diagnostics {
    pub fn from_state(state: &HostState) -> Self {
        Self {
            total_height: state.total_height(),
            max_abs_height: state.max_abs_height(),
            max_speed: state.max_speed(),
            finite: state.is_finite(),
        }
    }

    /// Relative change of the height integral against `reference`
    pub fn mass_drift(&self, reference: &Diagnostics) -> f64 {
        let scale = reference.total_height.abs().max(f64::EPSILON);
        (self.total_height - reference.total_height).abs() / scale
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Σz={:.6} max|z|={:.4} max|u|={:.4} finite={}",
            self.total_height, self.max_abs_height, self.max_speed, self.finite
        )
    }
}
