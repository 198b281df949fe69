use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::SolverConfig;
use crate::constants::gpu::BYTES_PER_TEXEL;
use crate::error::{GpuErrorContext, SolverError, SolverResult};
use crate::gpu::params::{InjectParams, StageParams};
use crate::gpu::pass::FullscreenPass;
use crate::gpu::pass_schema::{INJECT_PASS, STAGE_PASS};
use crate::gpu::readback;
use crate::gpu::texture::{StateArena, StateTexture};
use crate::gpu::GpuContext;
use crate::grid::Grid;
use crate::integrator::{validate_time_step, Integrator};
use crate::kernel::{Discretization, PhysicalConstants};
use crate::solver::StateSolver;
use crate::state::HostState;

/// Stage index, base slot, source slot
type StageBindKey = (usize, usize, usize);

/// GPU-resident shallow-water solver.
///
/// The committed state lives in one texture of a `stage_count + 1` slot
/// arena. `advance` records every stage into one command buffer and commits
/// by rotating the final stage's slot into the main role.
pub struct GpuSolver {
    context: Arc<GpuContext>,
    grid: Grid,
    discretization: Discretization,
    integrator: Integrator,
    constants: PhysicalConstants,
    arena: StateArena,
    stage_pass: FullscreenPass,
    inject_pass: FullscreenPass,
    /// One buffer per stage so every write lands before the single submit
    stage_uniforms: Vec<wgpu::Buffer>,
    inject_uniform: wgpu::Buffer,
    stage_bind_groups: FxHashMap<StageBindKey, wgpu::BindGroup>,
}

impl GpuSolver {
    /// Quiescent solver for `config`
    pub fn new(context: Arc<GpuContext>, config: &SolverConfig) -> SolverResult<Self> {
        config.validate()?;
        let stage_pass = FullscreenPass::new::<StageParams>(
            &context,
            STAGE_PASS,
            config.discretization.fragment_entry(),
        )?;
        let inject_pass = FullscreenPass::new::<InjectParams>(&context, INJECT_PASS, "fs_inject")?;
        Self::with_passes(context, config, stage_pass, inject_pass)
    }

    /// Solver driven by prebuilt passes, which must match `config`
    pub fn with_passes(
        context: Arc<GpuContext>,
        config: &SolverConfig,
        stage_pass: FullscreenPass,
        inject_pass: FullscreenPass,
    ) -> SolverResult<Self> {
        config.validate()?;
        let grid = config.grid;
        let max_dimension = context.max_texture_dimension();
        if grid.nx > max_dimension || grid.ny > max_dimension {
            return Err(SolverError::InvalidGrid {
                reason: format!(
                    "({}, {}) exceeds the device texture limit of {}",
                    grid.nx, grid.ny, max_dimension
                ),
            });
        }

        log::info!(
            "[GpuSolver] {}x{} grid (dx={}), {} with a {}-point stencil",
            grid.nx,
            grid.ny,
            grid.dx,
            config.scheme_label(),
            config.discretization.stencil_offsets().len()
        );

        let expected = [
            (&stage_pass, STAGE_PASS.name, config.discretization.fragment_entry()),
            (&inject_pass, INJECT_PASS.name, "fs_inject"),
        ];
        for (pass, name, entry) in expected {
            if pass.schema().name != name || pass.fragment_entry() != entry {
                return Err(SolverError::PassSchema {
                    pass: pass.schema().name,
                    reason: format!(
                        "built for '{}', solver needs '{}' ({})",
                        pass.fragment_entry(),
                        name,
                        entry
                    ),
                });
            }
        }

        let stage_count = config.integrator.stage_count();
        let stage_uniforms = (0..stage_count)
            .map(|stage| {
                uniform_buffer::<StageParams>(&context, &format!("Stage {} Params", stage))
            })
            .collect();
        let inject_uniform = uniform_buffer::<InjectParams>(&context, "Inject Params");

        // New textures are zero-initialized, so main starts quiescent
        let arena = StateArena::new(&context, &grid, stage_count);
        log::info!(
            "[GpuSolver] Allocated {} state slots ({} KiB each)",
            arena.rotation().slot_count(),
            grid.cell_count() * BYTES_PER_TEXEL as usize / 1024
        );

        Ok(Self {
            context,
            grid,
            discretization: config.discretization,
            integrator: config.integrator,
            constants: config.constants,
            arena,
            stage_pass,
            inject_pass,
            stage_uniforms,
            inject_uniform,
            stage_bind_groups: FxHashMap::default(),
        })
    }

    /// Solver whose committed state is `initial`
    pub fn setup(
        context: Arc<GpuContext>,
        config: &SolverConfig,
        initial: &HostState,
    ) -> SolverResult<Self> {
        let mut solver = Self::new(context, config)?;
        solver.inject_state(initial, true)?;
        Ok(solver)
    }

    /// View of the committed state for rendering
    pub fn state_texture(&self) -> &wgpu::TextureView {
        &self.arena.main().view
    }

    pub fn state_texture_raw(&self) -> &wgpu::Texture {
        &self.arena.main().texture
    }

    pub async fn read_state_async(&self) -> SolverResult<HostState> {
        readback::read_texture(&self.context, self.state_texture_raw(), &self.grid).await
    }

    /// Whether a pass failed to compile and calls are being skipped
    pub fn is_degraded(&self) -> bool {
        self.stage_pass.is_degraded() || self.inject_pass.is_degraded()
    }

    pub fn discretization(&self) -> Discretization {
        self.discretization
    }

    pub fn integrator(&self) -> Integrator {
        self.integrator
    }
}

impl StateSolver for GpuSolver {
    fn grid(&self) -> Grid {
        self.grid
    }

    fn advance(&mut self, dt: f32) -> SolverResult<()> {
        validate_time_step(dt)?;
        if self.stage_pass.is_degraded() {
            self.stage_pass.report_degraded();
            return Ok(());
        }

        let plan = self.integrator.plan(self.arena.rotation());

        for binding in &plan.stages {
            let params = StageParams::new(&self.grid, &self.constants, dt, binding);
            self.context.queue.write_buffer(
                &self.stage_uniforms[binding.stage],
                0,
                bytemuck::bytes_of(&params),
            );

            let key = (binding.stage, binding.base, binding.source);
            if !self.stage_bind_groups.contains_key(&key) {
                let bind_group = self.stage_pass.create_bind_group(
                    &self.context,
                    &[
                        &self.arena.slot(binding.base).view,
                        &self.arena.slot(binding.source).view,
                    ],
                    Some(&self.stage_uniforms[binding.stage]),
                )?;
                self.stage_bind_groups.insert(key, bind_group);
            }
        }

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Advance Encoder"),
            });
        for binding in &plan.stages {
            let bind_group = self
                .stage_bind_groups
                .get(&(binding.stage, binding.base, binding.source))
                .gpu_context("stage bind group lookup")?;
            self.stage_pass
                .draw(&mut encoder, &self.arena.slot(binding.target).view, bind_group);
        }
        self.context.queue.submit(Some(encoder.finish()));

        self.arena.commit_stages();
        log::debug!(
            "[GpuSolver] Advanced dt={} in {} stages, main slot {}",
            dt,
            plan.stages.len(),
            self.arena.rotation().main()
        );
        Ok(())
    }

    fn inject_state(&mut self, perturbation: &HostState, clear_state: bool) -> SolverResult<()> {
        perturbation.ensure_matches(&self.grid)?;
        if self.inject_pass.is_degraded() {
            self.inject_pass.report_degraded();
            return Ok(());
        }

        let upload = StateTexture::new(&self.context, &self.grid, "Perturbation");
        upload.upload(&self.context, &self.grid, perturbation)?;

        let params = InjectParams::new(&self.grid, !clear_state);
        self.context
            .queue
            .write_buffer(&self.inject_uniform, 0, bytemuck::bytes_of(&params));

        let scratch = self.arena.rotation().scratch();
        let bind_group = self.inject_pass.create_bind_group(
            &self.context,
            &[&upload.view, &self.arena.main().view],
            Some(&self.inject_uniform),
        )?;

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Inject Encoder"),
            });
        self.inject_pass
            .draw(&mut encoder, &self.arena.slot(scratch).view, &bind_group);
        self.context.queue.submit(Some(encoder.finish()));

        self.arena.commit(scratch);
        log::debug!(
            "[GpuSolver] Injected state (clear={}), main slot {}",
            clear_state,
            scratch
        );
        Ok(())
    }

    fn read_state(&self) -> SolverResult<HostState> {
        pollster::block_on(self.read_state_async())
    }

    fn is_gpu_accelerated(&self) -> bool {
        true
    }
}

fn uniform_buffer<P>(context: &GpuContext, label: &str) -> wgpu::Buffer {
    context.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<P>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
