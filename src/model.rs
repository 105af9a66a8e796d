//! Imported STL models drawn with hardware instancing.
//!
//! A [`Model`] owns its uploaded mesh and a vertex buffer of per-instance
//! matrices. A single instance sits at the origin; with more, the instances
//! are scattered around a ring like an asteroid belt. The scatter is seeded,
//! so the same settings always produce the same belt.

use glam::{Mat4, Quat, Vec3};

use crate::camera::Camera;
use crate::error::GeometryError;
use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;
use crate::mesh::{InstanceTransform, Mesh, MeshVertex};
use crate::settings::ModelSettings;

fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

/// Uniform float in `[0, 1)` for draw `draw` of instance `index`.
fn randf(index: u32, draw: u32, seed: u32) -> f32 {
    (hash(index, draw, seed) >> 8) as f32 / (1u32 << 24) as f32
}

/// Model matrices for `count` instances spread around a ring in the XZ plane.
///
/// Each instance lands `radius` plus up to `deviation` units from the origin,
/// gets a small vertical offset, a random orientation and a random
/// per-axis scale in `[0, 0.1)`.
pub fn ring_transforms(count: u32, radius: f32, deviation: f32, seed: u32) -> Vec<Mat4> {
    (0..count)
        .map(|i| {
            let mut draw = 0;
            let mut next = || {
                draw += 1;
                randf(i, draw, seed)
            };

            let x = next() * 2.0 - 1.0;
            let mut y = (1.0 - x * x).max(0.0).sqrt();
            if next() < 0.5 {
                y = -y;
            }
            let distance = radius + next() * deviation;
            let planar = if next() < 0.5 {
                Vec3::new(y, 0.0, x)
            } else {
                Vec3::new(x, 0.0, y)
            };
            let height = (next() - 0.5) * deviation * 0.4;
            let position = planar * distance + Vec3::Y * height;

            let rotation = Quat::from_xyzw(next(), next(), next(), 1.0).normalize();
            let scale = Vec3::new(next(), next(), next()) * 0.1;

            Mat4::from_scale_rotation_translation(scale, rotation, position)
        })
        .collect()
}

/// Instance matrices for `settings`: identity for one instance, a ring otherwise.
pub fn instance_transforms(settings: &ModelSettings) -> Vec<Mat4> {
    match settings.instances {
        0 => Vec::new(),
        1 => vec![Mat4::IDENTITY],
        n => ring_transforms(n, settings.ring_radius, settings.ring_deviation, settings.seed),
    }
}

/// An uploaded model with its instance buffer.
#[derive(Debug)]
pub struct Model {
    mesh: Mesh,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    color: Vec3,
}

impl Model {
    /// Loads the model file, fits it to a unit cube around the origin and uploads it.
    pub fn load(gpu: &GpuContext, settings: &ModelSettings) -> Result<Self, GeometryError> {
        use wgpu::util::DeviceExt;

        let mut geometry = RawGeometry::load(&settings.path)?;
        geometry.recenter();
        geometry.normalize();

        let transforms: Vec<InstanceTransform> = instance_transforms(settings)
            .into_iter()
            .map(InstanceTransform::from)
            .collect();

        let instance_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Instance Buffer"),
                contents: bytemuck::cast_slice(&transforms),
                usage: wgpu::BufferUsages::VERTEX,
            });

        log::info!(
            "loaded model {}: {} triangles, {} instances",
            settings.path.display(),
            geometry.indices.len() / 3,
            transforms.len()
        );

        Ok(Self {
            mesh: geometry.upload(gpu),
            instance_buffer,
            instance_count: transforms.len() as u32,
            color: settings.color,
        })
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
    pub color: [f32; 4],
}

/// Instanced drawing of a [`Model`], lit by one white light at the origin.
pub struct ModelPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ModelPass {
    pub fn new(gpu: &GpuContext, format: wgpu::TextureFormat) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Model Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/model.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: std::mem::size_of::<ModelUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Model Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Model Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[MeshVertex::LAYOUT, InstanceTransform::LAYOUT],
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
            // STL winding is not reliable enough to cull.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn prepare(&self, gpu: &GpuContext, camera: &Camera, model: &Model) {
        let uniforms = ModelUniforms {
            view: camera.view().to_cols_array_2d(),
            proj: camera.clip_projection().to_cols_array_2d(),
            camera_pos: camera.position().to_array(),
            _padding: 0.0,
            color: model.color.extend(1.0).to_array(),
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass, model: &Model) {
        if model.instance_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, model.mesh.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, model.instance_buffer.slice(..));
        render_pass.set_index_buffer(model.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..model.mesh.index_count(), 0, 0..model.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_floats_stay_in_unit_interval() {
        for i in 0..1000 {
            let r = randf(i, i * 7, 42);
            assert!((0.0..1.0).contains(&r), "{r}");
        }
    }

    #[test]
    fn ring_is_deterministic_per_seed() {
        let a = ring_transforms(20, 50.0, 2.5, 7);
        let b = ring_transforms(20, 50.0, 2.5, 7);
        let c = ring_transforms(20, 50.0, 2.5, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ring_instances_sit_on_the_band() {
        let (radius, deviation) = (50.0, 2.5);
        for m in ring_transforms(200, radius, deviation, 3) {
            let p = m.w_axis.truncate();
            let planar = Vec3::new(p.x, 0.0, p.z).length();
            assert!(planar >= radius - 1e-3, "{planar}");
            assert!(planar <= radius + deviation + 1e-3, "{planar}");
            assert!(p.y.abs() <= deviation * 0.2 + 1e-3);
        }
    }

    #[test]
    fn single_instance_sits_at_origin() {
        let settings = ModelSettings {
            instances: 1,
            ..Default::default()
        };
        assert_eq!(instance_transforms(&settings), vec![Mat4::IDENTITY]);
    }

    #[test]
    fn instance_count_follows_settings() {
        let settings = ModelSettings {
            instances: 64,
            ..Default::default()
        };
        assert_eq!(instance_transforms(&settings).len(), 64);
    }

    #[test]
    fn uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 160);
    }
}
