//! Full-screen raster pass built from a [`PassSchema`].
//!
//! Shader and pipeline creation run inside a validation error scope. A
//! captured error leaves the pass degraded: it logs once and draws nothing,
//! and the caller keeps its previous state.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::constants::gpu::QUAD_VERTEX_COUNT;
use crate::error::SolverResult;
use crate::gpu::pass_schema::PassSchema;
use crate::gpu::{shader_source, GpuContext};

pub struct FullscreenPass {
    schema: PassSchema,
    fragment_entry: &'static str,
    layout: wgpu::BindGroupLayout,
    pipeline: Option<wgpu::RenderPipeline>,
    degraded_reported: AtomicBool,
}

impl FullscreenPass {
    /// Build the pass for `schema` from its embedded shader source
    pub fn new<P: bytemuck::Pod>(
        context: &GpuContext,
        schema: PassSchema,
        fragment_entry: &'static str,
    ) -> SolverResult<Self> {
        let source = shader_source::resolve(schema.source)?;
        Self::from_source::<P>(context, schema, fragment_entry, &source)
    }

    /// Build the pass from already expanded WGSL
    pub fn from_source<P: bytemuck::Pod>(
        context: &GpuContext,
        schema: PassSchema,
        fragment_entry: &'static str,
        source: &str,
    ) -> SolverResult<Self> {
        schema.validate::<P>(fragment_entry)?;
        let device = &context.device;
        let layout = schema.bind_group_layout(device);

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} Shader", schema.name)),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", schema.name)),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Pipeline ({})", schema.name, fragment_entry)),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: schema.vertex_entry,
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: fragment_entry,
                targets: &[Some(wgpu::ColorTargetState {
                    format: schema.output_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let pipeline = match pollster::block_on(device.pop_error_scope()) {
            None => {
                log::debug!("[FullscreenPass] Built '{}' ({})", schema.name, fragment_entry);
                Some(pipeline)
            }
            Some(error) => {
                log::error!(
                    "[FullscreenPass] '{}' ({}) failed to compile, pass disabled: {}",
                    schema.name,
                    fragment_entry,
                    error
                );
                None
            }
        };

        Ok(Self {
            schema,
            fragment_entry,
            layout,
            pipeline,
            degraded_reported: AtomicBool::new(false),
        })
    }

    pub fn schema(&self) -> &PassSchema {
        &self.schema
    }

    pub fn fragment_entry(&self) -> &'static str {
        self.fragment_entry
    }

    pub fn is_degraded(&self) -> bool {
        self.pipeline.is_none()
    }

    /// Log the degraded state the first time a caller hits it
    pub fn report_degraded(&self) {
        if !self.degraded_reported.swap(true, Ordering::Relaxed) {
            log::warn!(
                "[FullscreenPass] '{}' is disabled, skipping calls until the solver is rebuilt",
                self.schema.name
            );
        }
    }

    pub fn create_bind_group(
        &self,
        context: &GpuContext,
        views: &[&wgpu::TextureView],
        uniform: Option<&wgpu::Buffer>,
    ) -> SolverResult<wgpu::BindGroup> {
        self.schema
            .create_bind_group(&context.device, &self.layout, views, uniform)
    }

    /// Record a cleared draw of the full quad into `target`.
    ///
    /// Returns `false` without recording anything when degraded.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        bind_group: &wgpu::BindGroup,
    ) -> bool {
        let Some(pipeline) = &self.pipeline else {
            return false;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.schema.name),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        true
    }
}
