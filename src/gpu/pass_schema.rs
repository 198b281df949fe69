//! Static description of each raster pass.
//!
//! A schema lists the textures and uniform block a pass reads, the entry
//! points it may run and the format it writes. Bind-group layouts are
//! generated from it, so the Rust side never derives bindings from shader
//! text.

use std::num::NonZeroU64;

use crate::constants::gpu::STATE_FORMAT;
use crate::error::{SolverError, SolverResult};

/// A sampled state texture read with `textureLoad`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInput {
    pub name: &'static str,
    pub binding: u32,
}

/// A uniform block with its WGSL size in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformBlock {
    pub name: &'static str,
    pub binding: u32,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassSchema {
    pub name: &'static str,
    /// Top-level shader file, resolved through the include table
    pub source: &'static str,
    pub vertex_entry: &'static str,
    /// Fragment entry points the source provides; a pipeline picks one
    pub fragment_entries: &'static [&'static str],
    pub textures: &'static [TextureInput],
    pub uniform: Option<UniformBlock>,
    pub output_format: wgpu::TextureFormat,
}

/// Stage pass: `out = a·base + b·prev + c·dt·tendency(prev)`
pub const STAGE_PASS: PassSchema = PassSchema {
    name: "stage",
    source: "stage.wgsl",
    vertex_entry: "vs_fullscreen",
    fragment_entries: &["fs_colocated", "fs_staggered"],
    textures: &[
        TextureInput { name: "base_state", binding: 0 },
        TextureInput { name: "prev_state", binding: 1 },
    ],
    uniform: Some(UniformBlock { name: "params", binding: 2, size: 48 }),
    output_format: STATE_FORMAT,
};

/// Injection pass: `out = perturbation + keep·current`
pub const INJECT_PASS: PassSchema = PassSchema {
    name: "inject",
    source: "inject.wgsl",
    vertex_entry: "vs_fullscreen",
    fragment_entries: &["fs_inject"],
    textures: &[
        TextureInput { name: "perturbation", binding: 0 },
        TextureInput { name: "current_state", binding: 1 },
    ],
    uniform: Some(UniformBlock { name: "params", binding: 2, size: 16 }),
    output_format: STATE_FORMAT,
};

impl PassSchema {
    /// Check the schema against the uniform type `P` bound to it and the
    /// fragment entry a pipeline will use
    pub fn validate<P: bytemuck::Pod>(&self, fragment_entry: &str) -> SolverResult<()> {
        if self.textures.is_empty() {
            return Err(self.invalid("declares no texture inputs".to_string()));
        }

        let mut bindings: Vec<u32> = self.textures.iter().map(|t| t.binding).collect();
        if let Some(uniform) = self.uniform {
            bindings.push(uniform.binding);
        }
        bindings.sort_unstable();
        for (expected, &binding) in bindings.iter().enumerate() {
            if binding != expected as u32 {
                return Err(self.invalid(format!(
                    "bindings must be unique and contiguous from 0, got {:?}",
                    bindings
                )));
            }
        }

        let host_size = std::mem::size_of::<P>() as u64;
        match self.uniform {
            Some(uniform) => {
                if uniform.size % 16 != 0 {
                    return Err(self.invalid(format!(
                        "uniform '{}' size {} is not a multiple of 16",
                        uniform.name, uniform.size
                    )));
                }
                if uniform.size != host_size {
                    return Err(self.invalid(format!(
                        "uniform '{}' declares {} bytes but the host struct has {}",
                        uniform.name, uniform.size, host_size
                    )));
                }
            }
            None if host_size != 0 => {
                return Err(self.invalid(format!(
                    "no uniform declared but {} bytes of parameters supplied",
                    host_size
                )));
            }
            None => {}
        }

        if !self.fragment_entries.iter().any(|entry| *entry == fragment_entry) {
            return Err(self.invalid(format!(
                "unknown fragment entry '{}', expected one of {:?}",
                fragment_entry, self.fragment_entries
            )));
        }

        if self.output_format.is_depth_stencil_format() {
            return Err(self.invalid(format!(
                "output format {:?} is not a color format",
                self.output_format
            )));
        }

        Ok(())
    }

    /// Layout entries generated from the declared inputs
    pub fn layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        let mut entries: Vec<wgpu::BindGroupLayoutEntry> = self
            .textures
            .iter()
            .map(|texture| wgpu::BindGroupLayoutEntry {
                binding: texture.binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect();

        if let Some(uniform) = self.uniform {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: uniform.binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(uniform.size),
                },
                count: None,
            });
        }
        entries
    }

    pub fn bind_group_layout(&self, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} Bind Group Layout", self.name)),
            entries: &self.layout_entries(),
        })
    }

    /// Bind `views` (in declaration order) and `uniform` to `layout`
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        views: &[&wgpu::TextureView],
        uniform: Option<&wgpu::Buffer>,
    ) -> SolverResult<wgpu::BindGroup> {
        if views.len() != self.textures.len() {
            return Err(self.invalid(format!(
                "expected {} texture views, got {}",
                self.textures.len(),
                views.len()
            )));
        }

        let mut entries: Vec<wgpu::BindGroupEntry> = self
            .textures
            .iter()
            .zip(views)
            .map(|(texture, view)| wgpu::BindGroupEntry {
                binding: texture.binding,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();

        match (self.uniform, uniform) {
            (Some(block), Some(buffer)) => entries.push(wgpu::BindGroupEntry {
                binding: block.binding,
                resource: buffer.as_entire_binding(),
            }),
            (None, None) => {}
            (declared, supplied) => {
                return Err(self.invalid(format!(
                    "uniform declared: {}, supplied: {}",
                    declared.is_some(),
                    supplied.is_some()
                )));
            }
        }

        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", self.name)),
            layout,
            entries: &entries,
        }))
    }

    fn invalid(&self, reason: String) -> SolverError {
        log::error!("[PassSchema] {}: {}", self.name, reason);
        SolverError::PassSchema {
            pass: self.name,
            reason,
        }
    }
}
