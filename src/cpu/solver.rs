use crate::config::SolverConfig;
use crate::error::SolverResult;
use crate::grid::Grid;
use crate::injector;
use crate::integrator::{validate_time_step, Integrator, SlotRotation};
use crate::kernel::{evaluate_stage, Discretization, PhysicalConstants};
use crate::solver::StateSolver;
use crate::state::HostState;

/// Host-memory solver with the same slot arena as the GPU backend
pub struct CpuSolver {
    grid: Grid,
    discretization: Discretization,
    integrator: Integrator,
    constants: PhysicalConstants,
    slots: Vec<HostState>,
    rotation: SlotRotation,
}

impl CpuSolver {
    /// Quiescent solver for `config`
    pub fn new(config: &SolverConfig) -> SolverResult<Self> {
        config.validate()?;
        let rotation = SlotRotation::new(config.integrator.stage_count());
        let slots = (0..rotation.slot_count())
            .map(|_| HostState::zeros(&config.grid))
            .collect();

        log::info!(
            "[CpuSolver] {}x{} grid, {} with {} slots",
            config.grid.nx,
            config.grid.ny,
            config.scheme_label(),
            rotation.slot_count()
        );

        Ok(Self {
            grid: config.grid,
            discretization: config.discretization,
            integrator: config.integrator,
            constants: config.constants,
            slots,
            rotation,
        })
    }

    /// Solver whose committed state is `initial`
    pub fn setup(config: &SolverConfig, initial: &HostState) -> SolverResult<Self> {
        let mut solver = Self::new(config)?;
        solver.inject_state(initial, true)?;
        Ok(solver)
    }

    /// Committed state
    pub fn state(&self) -> &HostState {
        &self.slots[self.rotation.main()]
    }

    pub fn discretization(&self) -> Discretization {
        self.discretization
    }

    pub fn integrator(&self) -> Integrator {
        self.integrator
    }
}

impl StateSolver for CpuSolver {
    fn grid(&self) -> Grid {
        self.grid
    }

    fn advance(&mut self, dt: f32) -> SolverResult<()> {
        validate_time_step(dt)?;
        let plan = self.integrator.plan(&self.rotation);

        for binding in &plan.stages {
            // Take the target out so base and prev can be borrowed alongside it
            let mut out = std::mem::take(&mut self.slots[binding.target]);
            evaluate_stage(
                self.discretization,
                &self.grid,
                &self.constants,
                dt,
                binding,
                &self.slots[binding.base],
                &self.slots[binding.source],
                &mut out,
            );
            self.slots[binding.target] = out;
        }

        self.rotation.commit_stages();
        log::debug!("[CpuSolver] Advanced dt={} main={}", dt, self.rotation.main());
        Ok(())
    }

    fn inject_state(&mut self, perturbation: &HostState, clear_state: bool) -> SolverResult<()> {
        perturbation.ensure_matches(&self.grid)?;

        let scratch = self.rotation.scratch();
        let mut out = std::mem::take(&mut self.slots[scratch]);
        injector::composite_into(
            &self.grid,
            perturbation,
            &self.slots[self.rotation.main()],
            !clear_state,
            &mut out,
        );
        self.slots[scratch] = out;
        self.rotation.commit(scratch);

        log::debug!("[CpuSolver] Injected state (clear={})", clear_state);
        Ok(())
    }

    fn read_state(&self) -> SolverResult<HostState> {
        Ok(self.state().clone())
    }

    fn is_gpu_accelerated(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;
    use crate::kernel::boundary::enforce_walls;
    use crate::state::InitialCondition;

    fn small_config(integrator: Integrator) -> SolverConfig {
        SolverConfig {
            grid: Grid::new(16, 16, 0.1).unwrap(),
            integrator,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_quiescent_stays_at_rest() {
        let mut solver = CpuSolver::new(&small_config(Integrator::Rk3)).unwrap();
        for _ in 0..5 {
            solver.advance(0.01).unwrap();
        }
        assert_eq!(solver.state(), &HostState::zeros(&solver.grid()));
    }

    #[test]
    fn test_zero_dt_keeps_interior() {
        let config = small_config(Integrator::Heun);
        let initial = InitialCondition::bump(8.0, 8.0, 2.0).generate(&config.grid).unwrap();
        let mut solver = CpuSolver::setup(&config, &initial).unwrap();
        solver.advance(0.0).unwrap();
        // Heights untouched, velocities were zero already
        assert_eq!(solver.state(), &initial);
    }

    #[test]
    fn test_euler_step_matches_single_tendency() {
        let config = SolverConfig {
            discretization: Discretization::Colocated,
            ..small_config(Integrator::Euler)
        };
        let initial = InitialCondition::bump(8.0, 8.0, 2.0).generate(&config.grid).unwrap();
        let mut solver = CpuSolver::setup(&config, &initial).unwrap();
        let dt = 0.005;
        solver.advance(dt).unwrap();

        let (i, j) = (6, 7);
        let idx = config.grid.index(i, j);
        let rate = crate::kernel::tendency(
            config.discretization,
            &initial,
            &config.grid,
            &config.constants,
            i,
            j,
        );
        let expected = initial.z[idx] + dt * rate.z;
        assert!((solver.state().z[idx] - expected).abs() < 1e-6);
    }

    /// `a·x + b·y + c·T(y)` on every cell, then the wall rule if `last`
    fn combine_by_hand(
        config: &SolverConfig,
        x: &HostState,
        y: &HostState,
        (a, b, c): (f32, f32, f32),
        last: bool,
    ) -> HostState {
        let grid = &config.grid;
        let mut out = HostState::zeros(grid);
        for j in 0..grid.ny {
            for i in 0..grid.nx {
                let idx = grid.index(i, j);
                let rate = crate::kernel::tendency(
                    config.discretization,
                    y,
                    grid,
                    &config.constants,
                    i,
                    j,
                );
                let mut cell = a * x.cell(idx) + b * y.cell(idx) + c * rate;
                if last {
                    cell = enforce_walls(config.discretization, grid.edges(i, j), cell);
                }
                out.set_cell(idx, cell);
            }
        }
        out
    }

    fn max_difference(a: &HostState, b: &HostState) -> f32 {
        a.z.iter()
            .chain(&a.u)
            .chain(&a.v)
            .zip(b.z.iter().chain(&b.u).chain(&b.v))
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f32::max)
    }

    /// A few steps in, so every channel carries signal
    fn developed_solver(config: &SolverConfig) -> CpuSolver {
        let initial = InitialCondition::bump(6.0, 9.0, 2.0).generate(&config.grid).unwrap();
        let mut solver = CpuSolver::setup(config, &initial).unwrap();
        for _ in 0..10 {
            solver.advance(0.005).unwrap();
        }
        solver
    }

    #[test]
    fn test_heun_step_matches_hand_composition() {
        for discretization in [Discretization::Colocated, Discretization::Staggered] {
            let config = SolverConfig {
                discretization,
                ..small_config(Integrator::Heun)
            };
            let mut solver = developed_solver(&config);
            let x = solver.state().clone();
            let dt = 0.005;

            let s0 = combine_by_hand(&config, &x, &x, (0.0, 1.0, dt), false);
            let expected = combine_by_hand(&config, &x, &s0, (0.5, 0.5, 0.5 * dt), true);

            solver.advance(dt).unwrap();
            let difference = max_difference(solver.state(), &expected);
            assert!(difference < 1e-5, "{:?}: differs by {}", discretization, difference);
        }
    }

    #[test]
    fn test_rk3_step_matches_hand_composition() {
        for discretization in [Discretization::Colocated, Discretization::Staggered] {
            let config = SolverConfig {
                discretization,
                ..small_config(Integrator::Rk3)
            };
            let mut solver = developed_solver(&config);
            let x = solver.state().clone();
            let dt = 0.005;

            // Every stage restarts from x and evaluates the previous stage
            let s0 = combine_by_hand(&config, &x, &x, (0.0, 1.0, dt / 3.0), false);
            let s1 = combine_by_hand(&config, &x, &s0, (1.0, 0.0, dt / 2.0), false);
            let expected = combine_by_hand(&config, &x, &s1, (1.0, 0.0, dt), true);

            solver.advance(dt).unwrap();
            let difference = max_difference(solver.state(), &expected);
            assert!(difference < 1e-5, "{:?}: differs by {}", discretization, difference);

            // The same step with the tendency taken at x would land elsewhere
            let wrong = combine_by_hand(&config, &x, &x, (0.0, 1.0, dt), true);
            assert!(max_difference(solver.state(), &wrong) > 1e-4);
        }
    }

    #[test]
    fn test_invalid_dt_rejected_without_side_effects() {
        let config = small_config(Integrator::Rk3);
        let initial = InitialCondition::bump(8.0, 8.0, 2.0).generate(&config.grid).unwrap();
        let mut solver = CpuSolver::setup(&config, &initial).unwrap();
        assert!(matches!(solver.advance(-1.0), Err(SolverError::InvalidTimeStep(_))));
        assert!(solver.advance(f32::NAN).is_err());
        assert_eq!(solver.state(), &initial);
    }
}
