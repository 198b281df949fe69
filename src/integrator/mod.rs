/// Stage Scheduler
///
/// Explicit multi-stage time integration. Every stage reads the committed
/// state (`base`) and the previous stage's output (`prev`) and writes a new
/// slot:
///
/// ```text
/// out = base_weight·base + prev_weight·prev + (dt_weight·dt)·tendency(prev)
/// ```
///
/// Stage 0 reads `base` as `prev`. The schemes differ only in their rows of
/// weights, so the GPU and host backends share one stage kernel and walk the
/// same [`StagePlan`].

pub mod rotation;

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

pub use rotation::SlotRotation;

/// Weights applied by one stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageWeights {
    pub base: f32,
    pub prev: f32,
    pub dt: f32,
}

impl StageWeights {
    pub const fn new(base: f32, prev: f32, dt: f32) -> Self {
        Self { base, prev, dt }
    }
}

const EULER: [StageWeights; 1] = [StageWeights::new(1.0, 0.0, 1.0)];

const HEUN: [StageWeights; 2] = [
    StageWeights::new(1.0, 0.0, 1.0),
    StageWeights::new(0.5, 0.5, 0.5),
];

/// Low-storage RK3: each stage restarts from `base` with a growing step
const RK3: [StageWeights; 3] = [
    StageWeights::new(1.0, 0.0, 1.0 / 3.0),
    StageWeights::new(1.0, 0.0, 0.5),
    StageWeights::new(1.0, 0.0, 1.0),
];

/// Time-integration scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Forward Euler, one stage
    Euler,
    /// Two-stage predictor/corrector
    Heun,
    #[default]
    Rk3,
}

impl Integrator {
    pub fn stage_count(&self) -> usize {
        self.weights().len()
    }

    pub fn weights(&self) -> &'static [StageWeights] {
        match self {
            Integrator::Euler => &EULER,
            Integrator::Heun => &HEUN,
            Integrator::Rk3 => &RK3,
        }
    }

    /// Slot bindings for every stage of one step, starting from `rotation`
    pub fn plan(&self, rotation: &SlotRotation) -> StagePlan {
        let weights = self.weights();
        let last = weights.len() - 1;
        let stages = weights
            .iter()
            .enumerate()
            .map(|(stage, &weights)| StageBinding {
                stage,
                base: rotation.main(),
                source: rotation.stage_source(stage),
                target: rotation.stage_target(stage),
                weights,
                is_final: stage == last,
            })
            .collect();
        StagePlan { stages }
    }
}

/// Texture slots and weights for a single stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageBinding {
    pub stage: usize,
    /// Committed state at the start of the step
    pub base: usize,
    /// Previous stage output, `base` for stage 0
    pub source: usize,
    pub target: usize,
    pub weights: StageWeights,
    /// Impermeability is applied only when this is set
    pub is_final: bool,
}

/// Ordered stage bindings of one time step
#[derive(Debug, Clone, PartialEq)]
pub struct StagePlan {
    pub stages: Vec<StageBinding>,
}

/// Accept `dt >= 0`; zero is a valid no-progress step
pub fn validate_time_step(dt: f32) -> SolverResult<()> {
    if !dt.is_finite() || dt < 0.0 {
        return Err(SolverError::InvalidTimeStep(dt));
    }
    Ok(())
}
