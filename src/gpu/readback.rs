//! Texture to host copies.

use crate::constants::gpu::BYTES_PER_TEXEL;
use crate::error::{GpuErrorContext, SolverError, SolverResult};
use crate::gpu::texture::extent;
use crate::gpu::GpuContext;
use crate::grid::Grid;
use crate::state::HostState;

/// Row pitch of a copy of `width` texels, padded to the copy alignment
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_TEXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Copy `texture` into a staging buffer, wait for it and unpack the rows
pub async fn read_texture(
    context: &GpuContext,
    texture: &wgpu::Texture,
    grid: &Grid,
) -> SolverResult<HostState> {
    let bytes_per_row = padded_bytes_per_row(grid.nx);
    let size = bytes_per_row as u64 * grid.ny as u64;

    let staging = context.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("State Readback Buffer"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = context
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("State Readback Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &staging,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(grid.ny),
            },
        },
        extent(grid),
    );
    context.queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = futures::channel::oneshot::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        // The receiver only disappears if the caller was dropped
        let _ = tx.send(result);
    });
    context.device.poll(wgpu::Maintain::Wait);
    rx.await
        .gpu_context("readback channel")?
        .map_err(|e| SolverError::BufferMap(e.to_string()))?;

    let state = {
        let data = slice.get_mapped_range();
        let texels: &[f32] = bytemuck::cast_slice(&data);
        let row_stride = bytes_per_row as usize / std::mem::size_of::<f32>();
        HostState::unpack_rgba(grid, texels, row_stride)?
    };
    staging.unmap();
    Ok(state)
}
