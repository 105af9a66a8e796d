//! Screen-space filtering of the offscreen scene image.
//!
//! [`FilterPass`] draws one fullscreen triangle that samples the previous
//! pass's color target. Two filters can be toggled independently:
//!
//! - **per-pixel**: color inversion,
//! - **kernel**: a `(2r + 1)²` box blur.
//!
//! When both are on the blur runs first and its result is inverted.

use crate::gpu::GpuContext;

/// Which filters run and how wide the kernel is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterSettings {
    pub per_pixel: bool,
    pub kernel: bool,
    pub radius: u32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            per_pixel: false,
            kernel: false,
            radius: 5,
        }
    }
}

impl FilterSettings {
    /// Uniforms for an input image of `width × height` pixels.
    pub fn uniforms(&self, width: u32, height: u32) -> FilterUniforms {
        FilterUniforms {
            step: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            radius: self.radius.min(i32::MAX as u32) as i32,
            per_pixel: self.per_pixel as u32,
            kernel: self.kernel as u32,
            _padding: [0; 3],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FilterUniforms {
    /// `(u_step, v_step)`, one texel in uv units.
    pub step: [f32; 2],
    pub radius: i32,
    pub per_pixel: u32,
    pub kernel: u32,
    pub _padding: [u32; 3],
}

/// Fullscreen pass applying [`FilterSettings`] to an input texture.
pub struct FilterPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl FilterPass {
    /// Builds the pipeline for color targets of `format`.
    pub fn new(gpu: &GpuContext, format: wgpu::TextureFormat) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Filter Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/filter.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Filter Uniforms"),
            size: std::mem::size_of::<FilterUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Nearest keeps every kernel tap on an exact texel.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Filter Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Filter Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Input texture
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Filter Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Filter Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group_layout,
            sampler,
        }
    }

    fn create_bind_group(&self, gpu: &GpuContext, input_view: &wgpu::TextureView) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Filter Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(input_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Draws `input_view` through the enabled filters.
    ///
    /// `input_size` is the input's pixel size, which sets the kernel step.
    pub fn render(
        &self,
        gpu: &GpuContext,
        render_pass: &mut wgpu::RenderPass,
        settings: &FilterSettings,
        input_view: &wgpu::TextureView,
        input_size: (u32, u32),
    ) {
        let uniforms = settings.uniforms(input_size.0, input_size.1);
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let bind_group = self.create_bind_group(gpu, input_view);

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<FilterUniforms>(), 32);
    }

    #[test]
    fn step_is_one_texel() {
        let u = FilterSettings {
            per_pixel: true,
            kernel: false,
            radius: 3,
        }
        .uniforms(800, 600);

        assert_relative_eq!(u.step[0], 1.0 / 800.0);
        assert_relative_eq!(u.step[1], 1.0 / 600.0);
        assert_eq!((u.per_pixel, u.kernel, u.radius), (1, 0, 3));
    }

    #[test]
    fn zero_size_does_not_divide_by_zero() {
        let u = FilterSettings::default().uniforms(0, 0);
        assert!(u.step.iter().all(|s| s.is_finite()));
    }
}
