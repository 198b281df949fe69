//! Explicit GPU context.
//!
//! Every GPU object in the crate is created from a [`GpuContext`] handed to
//! its constructor. There is no process-wide device.

use std::sync::Arc;

use crate::constants::gpu::STATE_FORMAT;
use crate::error::{SolverError, SolverResult};

pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    adapter_info: Option<wgpu::AdapterInfo>,
}

impl GpuContext {
    /// Wrap a device the host already owns
    pub fn from_parts(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            adapter_info: None,
        }
    }

    /// Create a headless context, trying each power preference and finally
    /// the fallback adapter
    pub async fn new_headless() -> SolverResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let strategies = [
            (wgpu::PowerPreference::HighPerformance, false),
            (wgpu::PowerPreference::LowPower, false),
            (wgpu::PowerPreference::None, true),
        ];

        for (i, (power_preference, force_fallback_adapter)) in strategies.into_iter().enumerate() {
            log::debug!(
                "[GpuContext] Strategy {}: {:?} (fallback: {})",
                i + 1,
                power_preference,
                force_fallback_adapter
            );
            let Some(adapter) = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference,
                    compatible_surface: None,
                    force_fallback_adapter,
                })
                .await
            else {
                continue;
            };

            let info = adapter.get_info();
            if !supports_state_targets(&adapter) {
                log::warn!(
                    "[GpuContext] {} cannot render to {:?}, trying next adapter",
                    info.name,
                    STATE_FORMAT
                );
                continue;
            }

            let (device, queue) = adapter
                .request_device(
                    &wgpu::DeviceDescriptor {
                        label: Some("Shallow Water Device"),
                        required_features: wgpu::Features::empty(),
                        required_limits: adapter.limits(),
                    },
                    None,
                )
                .await
                .map_err(|e| SolverError::DeviceRequest(e.to_string()))?;

            log::info!(
                "[GpuContext] Using {} ({:?}, {:?})",
                info.name,
                info.backend,
                info.device_type
            );
            if force_fallback_adapter || info.device_type == wgpu::DeviceType::Cpu {
                log::warn!("[GpuContext] Software adapter - performance will be limited");
            }

            return Ok(Self {
                device: Arc::new(device),
                queue: Arc::new(queue),
                adapter_info: Some(info),
            });
        }

        log::error!("[GpuContext] No adapter with {:?} render targets found", STATE_FORMAT);
        Err(SolverError::AdapterUnavailable)
    }

    /// Blocking form of [`new_headless`](Self::new_headless)
    pub fn new_headless_blocking() -> SolverResult<Self> {
        pollster::block_on(Self::new_headless())
    }

    /// Adapter description, unknown for contexts built with `from_parts`
    pub fn adapter_info(&self) -> Option<&wgpu::AdapterInfo> {
        self.adapter_info.as_ref()
    }

    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

fn supports_state_targets(adapter: &wgpu::Adapter) -> bool {
    adapter
        .get_texture_format_features(STATE_FORMAT)
        .allowed_usages
        .contains(wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING)
}
