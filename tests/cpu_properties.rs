//! Solver properties checked on the CPU reference backend

use shallow_water_gpu::{
    create_solver, CpuSolver, Discretization, Grid, HostState, InitialCondition, Integrator,
    PhysicalConstants, SolverConfig, SolverError, StateSolver,
};

const DT: f32 = 0.005;

fn config(discretization: Discretization, integrator: Integrator) -> SolverConfig {
    SolverConfig {
        grid: Grid::new(48, 40, 0.1).unwrap(),
        discretization,
        integrator,
        initial: InitialCondition::bump(20.0, 18.0, 4.0),
        ..SolverConfig::default()
    }
}

fn seeded(config: &SolverConfig) -> CpuSolver {
    let initial = config.initial.generate(&config.grid).unwrap();
    CpuSolver::setup(config, &initial).unwrap()
}

fn pairings() -> [(Discretization, Integrator); 3] {
    [
        (Discretization::Staggered, Integrator::Rk3),
        (Discretization::Colocated, Integrator::Heun),
        (Discretization::Staggered, Integrator::Heun),
    ]
}

#[test]
fn test_smooth_state_stays_bounded() {
    for (discretization, integrator) in pairings() {
        let config = config(discretization, integrator);
        let mut solver = seeded(&config);

        for _ in 0..200 {
            solver.advance(DT).unwrap();
        }

        let state = solver.read_state().unwrap();
        assert!(state.ensure_matches(&config.grid).is_ok());
        assert!(state.is_finite(), "{:?} + {:?} blew up", discretization, integrator);
        assert!(state.max_abs_height() < 4.0);
    }
}

#[test]
fn test_staggered_scheme_conserves_mass() {
    let config = config(Discretization::Staggered, Integrator::Rk3);
    let mut solver = seeded(&config);
    let before = solver.state().total_height();

    for _ in 0..100 {
        solver.advance(DT).unwrap();
    }

    let after = solver.state().total_height();
    let drift = (after - before).abs() / before.abs();
    assert!(drift < 1e-3, "mass drifted by {} ({} -> {})", drift, before, after);
}

/// Stored wall-normal velocities are exactly zero.
///
/// The C-grid stores only the west and south wall faces; its east and north
/// texels hold interior faces.
fn assert_walls_closed(discretization: Discretization, grid: &Grid, state: &HostState) {
    for j in 0..grid.ny {
        assert_eq!(state.u[grid.index(0, j)], 0.0);
    }
    for i in 0..grid.nx {
        assert_eq!(state.v[grid.index(i, 0)], 0.0);
    }
    if discretization == Discretization::Colocated {
        for j in 0..grid.ny {
            assert_eq!(state.u[grid.index(grid.nx - 1, j)], 0.0);
        }
        for i in 0..grid.nx {
            assert_eq!(state.v[grid.index(i, grid.ny - 1)], 0.0);
        }
    }
}

#[test]
fn test_normal_velocity_vanishes_on_walls() {
    for (discretization, integrator) in pairings() {
        let config = SolverConfig {
            // Off-centre so flow reaches the walls quickly
            initial: InitialCondition::bump(6.0, 34.0, 3.0),
            ..config(discretization, integrator)
        };
        let grid = config.grid;
        let mut solver = seeded(&config);

        for step in 1..=60 {
            solver.advance(DT).unwrap();
            if step % 20 == 0 {
                assert_walls_closed(discretization, &grid, solver.state());
            }
        }

        // The interior is actually moving
        assert!(solver.state().max_speed() > 0.0);
    }
}

#[test]
fn test_staggered_east_and_north_cells_stay_live() {
    let config = SolverConfig {
        grid: Grid::new(16, 16, 0.1).unwrap(),
        initial: InitialCondition::bump(13.0, 13.0, 1.5),
        constants: PhysicalConstants {
            viscosity: 0.0,
            ..PhysicalConstants::default()
        },
        ..config(Discretization::Staggered, Integrator::Rk3)
    };
    let grid = config.grid;
    let mut solver = seeded(&config);

    let column_height = |state: &HostState, i: u32| -> f32 {
        (0..grid.ny).map(|j| state.z[grid.index(i, j)]).sum()
    };
    let row_height = |state: &HostState, j: u32| -> f32 {
        (0..grid.nx).map(|i| state.z[grid.index(i, j)]).sum()
    };
    let east_before = column_height(solver.state(), grid.nx - 1);
    let north_before = row_height(solver.state(), grid.ny - 1);

    for _ in 0..50 {
        solver.advance(DT).unwrap();
    }

    // Only advection through the last interior faces can change these
    let state = solver.state();
    assert!((column_height(state, grid.nx - 1) - east_before).abs() > 1e-2);
    assert!((row_height(state, grid.ny - 1) - north_before).abs() > 1e-2);
    assert!((0..grid.ny).any(|j| state.u[grid.index(grid.nx - 1, j)] != 0.0));
    assert!((0..grid.nx).any(|i| state.v[grid.index(i, grid.ny - 1)] != 0.0));
}

#[test]
fn test_staggered_mirror_symmetric_state_stays_symmetric() {
    let grid = Grid::new(32, 24, 0.1).unwrap();
    let config = SolverConfig {
        grid,
        ..config(Discretization::Staggered, Integrator::Rk3)
    };

    // Off-centre bump plus its reflection about the vertical centre line
    let bump = InitialCondition::bump(7.0, 10.0, 2.5).generate(&grid).unwrap();
    let mut initial = HostState::zeros(&grid);
    for j in 0..grid.ny {
        for i in 0..grid.nx {
            let mirror = grid.index(grid.nx - 1 - i, j);
            initial.z[grid.index(i, j)] = bump.z[grid.index(i, j)] + bump.z[mirror];
        }
    }
    let mut solver = CpuSolver::setup(&config, &initial).unwrap();

    for _ in 0..100 {
        solver.advance(DT).unwrap();
    }

    // z and v mirror onto the reflected cell, u (on west faces) onto the
    // reflected face with its sign flipped
    let state = solver.state();
    let tolerance = 1e-4;
    for j in 0..grid.ny {
        for i in 0..grid.nx {
            let idx = grid.index(i, j);
            let mirror = grid.index(grid.nx - 1 - i, j);
            assert!((state.z[idx] - state.z[mirror]).abs() < tolerance, "z at ({}, {})", i, j);
            assert!((state.v[idx] - state.v[mirror]).abs() < tolerance, "v at ({}, {})", i, j);
        }
        for i in 1..grid.nx {
            let face = state.u[grid.index(i, j)];
            let mirror_face = state.u[grid.index(grid.nx - i, j)];
            assert!((face + mirror_face).abs() < tolerance, "u at ({}, {})", i, j);
        }
    }
    assert!(state.max_speed() > 0.1);
}

#[test]
fn test_zero_injection_is_a_no_op() {
    let config = config(Discretization::Staggered, Integrator::Rk3);
    let mut solver = seeded(&config);
    for _ in 0..10 {
        solver.advance(DT).unwrap();
    }

    let before = solver.read_state().unwrap();
    solver.inject_state(&HostState::zeros(&config.grid), false).unwrap();
    assert_eq!(solver.read_state().unwrap(), before);
}

#[test]
fn test_clear_injection_replaces_state() {
    let config = config(Discretization::Colocated, Integrator::Heun);
    let mut solver = seeded(&config);
    for _ in 0..10 {
        solver.advance(DT).unwrap();
    }

    let field = InitialCondition::Random { seed: Some(3) }.generate(&config.grid).unwrap();
    solver.inject_state(&field, true).unwrap();
    assert_eq!(solver.read_state().unwrap(), field);
}

#[test]
fn test_injection_adds_to_current_state() {
    let config = config(Discretization::Staggered, Integrator::Rk3);
    let mut solver = seeded(&config);
    let current = solver.read_state().unwrap();

    let drop = InitialCondition::drop(30.0, 20.0, 2.0, 1.0, 10.0).generate(&config.grid).unwrap();
    solver.inject_state(&drop, false).unwrap();

    let state = solver.read_state().unwrap();
    let idx = config.grid.index(30, 20);
    assert_eq!(state.z[idx], current.z[idx] + drop.z[idx]);
}

#[test]
fn test_bump_is_symmetric_about_its_centre() {
    let config = SolverConfig {
        grid: Grid::new(64, 64, 0.1).unwrap(),
        initial: InitialCondition::bump(16.0, 32.0, 1.0),
        ..SolverConfig::default()
    };
    let solver = create_solver(&config, false).unwrap();
    assert!(!solver.is_gpu_accelerated());

    let grid = config.grid;
    let state = solver.read_state().unwrap();
    let peak = state.z[grid.index(16, 32)];
    assert_eq!(peak, 2.0);
    assert!(state.z.iter().all(|&z| z <= peak));
    for j in 0..grid.ny {
        for i in 0..=32u32 {
            assert_eq!(state.z[grid.index(i, j)], state.z[grid.index(32 - i, j)]);
        }
    }
}

#[test]
fn test_zero_amplitude_drop_leaves_height_unchanged() {
    let config = config(Discretization::Staggered, Integrator::Rk3);
    let mut solver = seeded(&config);
    let before = solver.read_state().unwrap();

    let drop = InitialCondition::drop(10.0, 10.0, 2.0, 0.0, 10.0).generate(&config.grid).unwrap();
    solver.inject_state(&drop, false).unwrap();

    assert_eq!(solver.read_state().unwrap().z, before.z);
}

#[test]
fn test_dimension_mismatch_is_rejected_without_side_effects() {
    let config = config(Discretization::Staggered, Integrator::Rk3);
    let mut solver = seeded(&config);
    let before = solver.read_state().unwrap();

    let wrong = HostState::zeros(&Grid::new(8, 8, 0.1).unwrap());
    match solver.inject_state(&wrong, true) {
        Err(SolverError::DimensionMismatch { expected, actual, .. }) => {
            assert_eq!(expected, config.grid.cell_count());
            assert_eq!(actual, 64);
        }
        other => panic!("expected a dimension mismatch, got {:?}", other),
    }
    assert_eq!(solver.read_state().unwrap(), before);
}

#[test]
fn test_unknown_generation_method() {
    let err = "whirlpool".parse::<InitialCondition>().unwrap_err();
    assert_eq!(err.to_string(), "Unknown generation method 'whirlpool'");
}
