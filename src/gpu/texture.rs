//! State textures and the slot arena that rotates them.

use crate::constants::gpu::{BYTES_PER_TEXEL, STATE_FORMAT};
use crate::error::SolverResult;
use crate::gpu::GpuContext;
use crate::grid::Grid;
use crate::integrator::SlotRotation;
use crate::state::HostState;

/// One `Rgba32Float` texture holding `(z, u, v, 0)` per cell
pub struct StateTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl StateTexture {
    pub fn new(context: &GpuContext, grid: &Grid, label: &str) -> Self {
        let texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(grid),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Upload `state`, which must match `grid`
    pub fn upload(&self, context: &GpuContext, grid: &Grid, state: &HostState) -> SolverResult<()> {
        state.ensure_matches(grid)?;
        let texels = state.pack_rgba();
        context.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&texels),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(grid.nx * BYTES_PER_TEXEL),
                rows_per_image: Some(grid.ny),
            },
            extent(grid),
        );
        Ok(())
    }
}

pub fn extent(grid: &Grid) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: grid.nx,
        height: grid.ny,
        depth_or_array_layers: 1,
    }
}

/// `stage_count + 1` state textures addressed through a [`SlotRotation`]
pub struct StateArena {
    slots: Vec<StateTexture>,
    rotation: SlotRotation,
}

impl StateArena {
    pub fn new(context: &GpuContext, grid: &Grid, stage_count: usize) -> Self {
        let rotation = SlotRotation::new(stage_count);
        let slots = (0..rotation.slot_count())
            .map(|slot| StateTexture::new(context, grid, &format!("State Slot {}", slot)))
            .collect();
        Self { slots, rotation }
    }

    pub fn rotation(&self) -> &SlotRotation {
        &self.rotation
    }

    pub fn slot(&self, index: usize) -> &StateTexture {
        &self.slots[index]
    }

    pub fn main(&self) -> &StateTexture {
        &self.slots[self.rotation.main()]
    }

    pub fn commit(&mut self, slot: usize) {
        self.rotation.commit(slot);
    }

    pub fn commit_stages(&mut self) {
        self.rotation.commit_stages();
    }
}
