// Shallow Water Solver Constants - SINGLE SOURCE OF TRUTH
//
// This file contains the constants shared by the CPU reference kernels,
// the WGSL passes and the headless runner.
//
// Do NOT redefine these values anywhere else in the crate!

/// Physical constants of the shallow-water equations
pub mod physics {
    /// Gravitational acceleration (m/s²)
    pub const GRAVITY: f32 = 9.806;

    /// Mean fluid depth the height perturbation is measured against
    pub const MEAN_DEPTH: f32 = 2.0;

    /// Kinematic viscosity applied as ν∇² to every channel
    pub const KINEMATIC_VISCOSITY: f32 = 5e-2;
}

/// Grid defaults and limits
pub mod grid {
    pub const DEFAULT_NX: u32 = 256;
    pub const DEFAULT_NY: u32 = 256;

    /// Uniform isotropic cell spacing
    pub const DEFAULT_DX: f32 = 0.1;

    /// A centred stencil needs at least two cells per axis
    pub const MIN_CELLS_PER_AXIS: u32 = 2;
}

/// Time stepping defaults for the headless runner
pub mod timing {
    /// 1/105 s matches a 105 Hz display refresh
    pub const DEFAULT_DT: f32 = 1.0 / 105.0;
    pub const DEFAULT_STEPS: u32 = 600;
    pub const DIAGNOSTIC_INTERVAL: u32 = 100;
}

/// GPU layout constants
pub mod gpu {
    /// z, u, v and one unused channel per texel
    pub const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
    pub const CHANNELS_PER_TEXEL: usize = 4;
    pub const BYTES_PER_TEXEL: u32 = 16;

    /// Full-screen quad drawn as a triangle strip
    pub const QUAD_VERTEX_COUNT: u32 = 4;
}

/// Initial-condition generator constants
pub mod generators {
    /// Peak height of the Gaussian bump
    pub const BUMP_AMPLITUDE: f32 = 2.0;

    /// Default filter width is nx / 64
    pub const WIDTH_DIVISOR: f32 = 64.0;

    /// Drops are evaluated only within this many filter widths of the centre
    pub const DROP_CUTOFF_WIDTHS: f32 = 4.0;

    pub const DEFAULT_DROP_AMPLITUDE: f32 = 1.0;
    pub const DEFAULT_DROP_SHAPE: f32 = 10.0;
}
