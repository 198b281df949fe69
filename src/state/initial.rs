use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::generators::{
    BUMP_AMPLITUDE, DEFAULT_DROP_AMPLITUDE, DEFAULT_DROP_SHAPE, DROP_CUTOFF_WIDTHS, WIDTH_DIVISOR,
};
use crate::error::{SolverError, SolverResult};
use crate::grid::Grid;
use crate::state::HostState;

/// Gaussian bump parameters; unset fields fall back to grid-relative defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BumpParams {
    pub center_x: Option<f32>,
    pub center_y: Option<f32>,
    pub width: Option<f32>,
}

/// Ring-shaped drop parameters; unset fields fall back to defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropParams {
    pub center_x: Option<f32>,
    pub center_y: Option<f32>,
    pub width: Option<f32>,
    pub amplitude: Option<f32>,
    pub shape: Option<f32>,
}

/// Initial or injected state generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum InitialCondition {
    /// z, u and v uniform in [0, 1)
    Random { seed: Option<u64> },
    Quiescent,
    Bump(BumpParams),
    Drop(DropParams),
}

impl Default for InitialCondition {
    fn default() -> Self {
        InitialCondition::Quiescent
    }
}

impl FromStr for InitialCondition {
    type Err = SolverError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "random" => Ok(InitialCondition::Random { seed: None }),
            "quiescent" => Ok(InitialCondition::Quiescent),
            "bump" => Ok(InitialCondition::Bump(BumpParams::default())),
            "drop" => Ok(InitialCondition::Drop(DropParams::default())),
            other => Err(SolverError::UnknownInitialCondition(other.to_string())),
        }
    }
}

impl InitialCondition {
    pub fn bump(center_x: f32, center_y: f32, width: f32) -> Self {
        InitialCondition::Bump(BumpParams {
            center_x: Some(center_x),
            center_y: Some(center_y),
            width: Some(width),
        })
    }

    pub fn drop(center_x: f32, center_y: f32, width: f32, amplitude: f32, shape: f32) -> Self {
        InitialCondition::Drop(DropParams {
            center_x: Some(center_x),
            center_y: Some(center_y),
            width: Some(width),
            amplitude: Some(amplitude),
            shape: Some(shape),
        })
    }

    /// Drop with default width, amplitude and shape
    pub fn drop_at(center_x: f32, center_y: f32) -> Self {
        InitialCondition::Drop(DropParams {
            center_x: Some(center_x),
            center_y: Some(center_y),
            ..DropParams::default()
        })
    }

    /// Evaluate the generator on every cell of `grid`
    pub fn generate(&self, grid: &Grid) -> SolverResult<HostState> {
        grid.validate()?;
        let mut state = HostState::zeros(grid);

        match *self {
            InitialCondition::Quiescent => {}
            InitialCondition::Random { seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                for idx in 0..grid.cell_count() {
                    state.z[idx] = rng.gen::<f32>();
                    state.u[idx] = rng.gen::<f32>();
                    state.v[idx] = rng.gen::<f32>();
                }
            }
            InitialCondition::Bump(params) => {
                let (cx, cy) = resolve_center(grid, params.center_x, params.center_y)?;
                let width = resolve_width(grid, params.width)?;
                for j in 0..grid.ny {
                    for i in 0..grid.nx {
                        let x_term = (i as f32 - cx) / width;
                        let y_term = (j as f32 - cy) / width;
                        state.z[grid.index(i, j)] =
                            BUMP_AMPLITUDE * (-(x_term * x_term) - y_term * y_term).exp();
                    }
                }
            }
            InitialCondition::Drop(params) => {
                let (cx, cy) = resolve_center(grid, params.center_x, params.center_y)?;
                let width = resolve_width(grid, params.width)?;
                let amplitude = require_finite("amplitude", params.amplitude.unwrap_or(DEFAULT_DROP_AMPLITUDE))?;
                let shape = require_finite("shape", params.shape.unwrap_or(DEFAULT_DROP_SHAPE))?;
                if shape == 0.0 {
                    return Err(SolverError::InvalidInitialCondition(
                        "drop shape must be non-zero".to_string(),
                    ));
                }

                let shape_factor = (shape + amplitude) / shape;
                let inv_width = 1.0 / width;
                let cutoff = width * DROP_CUTOFF_WIDTHS;

                for j in 0..grid.ny {
                    for i in 0..grid.nx {
                        let dx = i as f32 - cx;
                        let dy = j as f32 - cy;
                        if dx.abs() >= cutoff || dy.abs() >= cutoff {
                            continue;
                        }
                        let x_term = dx * inv_width;
                        let y_term = dy * inv_width;
                        let radial = -x_term * x_term - y_term * y_term;
                        state.z[grid.index(i, j)] = shape * radial.exp()
                            - (shape + amplitude) * (radial * shape_factor).exp();
                    }
                }
            }
        }

        Ok(state)
    }
}

fn resolve_center(grid: &Grid, x: Option<f32>, y: Option<f32>) -> SolverResult<(f32, f32)> {
    let cx = require_finite("center_x", x.unwrap_or(grid.nx as f32 / 4.0))?;
    let cy = require_finite("center_y", y.unwrap_or(grid.ny as f32 / 3.0))?;
    Ok((cx, cy))
}

fn resolve_width(grid: &Grid, width: Option<f32>) -> SolverResult<f32> {
    let width = require_finite("width", width.unwrap_or(grid.nx as f32 / WIDTH_DIVISOR))?;
    if width <= 0.0 {
        return Err(SolverError::InvalidInitialCondition(format!(
            "filter width {} must be positive",
            width
        )));
    }
    Ok(width)
}

fn require_finite(name: &str, value: f32) -> SolverResult<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolverError::InvalidInitialCondition(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid64() -> Grid {
        Grid::new(64, 64, 0.1).unwrap()
    }

    #[test]
    fn test_named_methods() {
        assert_eq!("quiescent".parse::<InitialCondition>().unwrap(), InitialCondition::Quiescent);
        assert!(matches!("bump".parse::<InitialCondition>(), Ok(InitialCondition::Bump(_))));
        assert!(matches!("drop".parse::<InitialCondition>(), Ok(InitialCondition::Drop(_))));
        match "tsunami".parse::<InitialCondition>() {
            Err(SolverError::UnknownInitialCondition(name)) => assert_eq!(name, "tsunami"),
            other => panic!("expected unknown method error, got {:?}", other),
        }
    }

    #[test]
    fn test_quiescent_is_zero() {
        let state = InitialCondition::Quiescent.generate(&grid64()).unwrap();
        assert_eq!(state, HostState::zeros(&grid64()));
    }

    #[test]
    fn test_random_is_seeded_and_bounded() {
        let grid = grid64();
        let a = InitialCondition::Random { seed: Some(7) }.generate(&grid).unwrap();
        let b = InitialCondition::Random { seed: Some(7) }.generate(&grid).unwrap();
        assert_eq!(a, b);
        assert!(a.z.iter().chain(&a.u).chain(&a.v).all(|&x| (0.0..1.0).contains(&x)));
    }

    #[test]
    fn test_bump_peak_and_symmetry() {
        let grid = grid64();
        let state = InitialCondition::bump(16.0, 32.0, 1.0).generate(&grid).unwrap();

        let peak = state.z[grid.index(16, 32)];
        assert_eq!(peak, 2.0);
        assert!(state.z.iter().all(|&z| z <= peak));

        for j in 0..grid.ny {
            for i in 0..=32u32 {
                let mirrored = 32 - i;
                assert_eq!(state.z[grid.index(i, j)], state.z[grid.index(mirrored, j)]);
            }
        }
        assert!(state.u.iter().chain(&state.v).all(|&x| x == 0.0));
    }

    #[test]
    fn test_zero_amplitude_drop_is_flat() {
        let grid = grid64();
        let state = InitialCondition::drop(10.0, 10.0, 2.0, 0.0, 10.0).generate(&grid).unwrap();
        assert!(state.z.iter().all(|&z| z == 0.0));
    }

    #[test]
    fn test_drop_is_local_and_dips_at_centre() {
        let grid = grid64();
        let state = InitialCondition::drop(32.0, 32.0, 2.0, 1.0, 10.0).generate(&grid).unwrap();

        // shape - (shape + amplitude) at the centre
        assert!((state.z[grid.index(32, 32)] + 1.0).abs() < 1e-5);
        // Outside the 4-width cutoff nothing is written
        assert_eq!(state.z[grid.index(32 + 8, 32)], 0.0);
        assert_eq!(state.z[grid.index(0, 0)], 0.0);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let grid = grid64();
        assert!(InitialCondition::bump(10.0, 10.0, 0.0).generate(&grid).is_err());
        assert!(InitialCondition::drop(10.0, 10.0, 1.0, 1.0, 0.0).generate(&grid).is_err());
        assert!(InitialCondition::bump(f32::NAN, 10.0, 1.0).generate(&grid).is_err());
    }
}
