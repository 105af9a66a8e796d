//! Phong rendering of the flattened scene's primitives.
//!
//! # Architecture
//!
//! The pass uses two bind groups:
//! - **Group 0**: per-frame data ([`GlobalUniforms`] and the eight light slots)
//! - **Group 1**: one [`InstanceUniforms`] record, picked from a single buffer
//!   with a dynamic offset
//!
//! Instances are drawn grouped by [`PrimitiveKind`] so each shared vertex
//! buffer is bound once.

use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::mesh::MeshVertex;
use crate::primitives::{InstanceUniforms, MeshRegistry, PrimitiveInstance, PrimitiveKind};
use crate::scene::{LightSlots, LoadedScene};

/// Per-frame camera and lighting coefficients.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
    pub _padding: [f32; 2],
}

impl GlobalUniforms {
    pub fn new(camera: &Camera, scene: &LoadedScene) -> Self {
        let globals = scene.global_data();
        Self {
            view: camera.view().to_cols_array_2d(),
            proj: camera.clip_projection().to_cols_array_2d(),
            camera_pos: camera.position().to_array(),
            ka: globals.ka,
            kd: globals.kd,
            ks: globals.ks,
            _padding: [0.0; 2],
        }
    }
}

/// Rounds the instance record size up to the device's dynamic offset alignment.
pub fn instance_stride(alignment: u32) -> u64 {
    let size = std::mem::size_of::<InstanceUniforms>() as u64;
    let alignment = alignment.max(1) as u64;
    size.div_ceil(alignment) * alignment
}

/// Lays instance records out `stride` bytes apart.
pub fn pack_instances(instances: &[PrimitiveInstance], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; instances.len() * stride];
    for (chunk, instance) in bytes.chunks_exact_mut(stride).zip(instances) {
        let uniforms = instance.uniforms();
        let record = bytemuck::bytes_of(&uniforms);
        chunk[..record.len()].copy_from_slice(record);
    }
    bytes
}

pub struct PrimitivePass {
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    instance_layout: wgpu::BindGroupLayout,
    instance_buffer: wgpu::Buffer,
    instance_bind_group: wgpu::BindGroup,
    instance_capacity: usize,
    instance_stride: u64,
}

impl PrimitivePass {
    /// Creates the pipeline for a color target of `format` with a `Depth32Float` depth buffer.
    pub fn new(gpu: &GpuContext, format: wgpu::TextureFormat) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Phong Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/phong.wgsl").into()),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Global Uniforms"),
            size: std::mem::size_of::<GlobalUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let lights_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Uniforms"),
            size: std::mem::size_of::<LightSlots>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding, visibility| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        let instance_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Instance Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<InstanceUniforms>() as u64),
                },
                count: None,
            }],
        });

        let instance_stride = instance_stride(device.limits().min_uniform_buffer_offset_alignment);
        let instance_capacity = 16;
        let (instance_buffer, instance_bind_group) =
            Self::create_instance_storage(device, &instance_layout, instance_capacity, instance_stride);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Phong Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &instance_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Phong Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[MeshVertex::LAYOUT],
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
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
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
            globals_buffer,
            lights_buffer,
            frame_bind_group,
            instance_layout,
            instance_buffer,
            instance_bind_group,
            instance_capacity,
            instance_stride,
        }
    }

    fn create_instance_storage(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
        stride: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Uniforms"),
            size: capacity as u64 * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Instance Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<InstanceUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Uploads camera, lights and every instance record for the coming draw.
    pub fn prepare(&mut self, gpu: &GpuContext, camera: &Camera, scene: &LoadedScene) {
        let globals = GlobalUniforms::new(camera, scene);
        gpu.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        gpu.queue
            .write_buffer(&self.lights_buffer, 0, bytemuck::bytes_of(scene.lights()));

        let instances = scene.instances();
        if instances.is_empty() {
            return;
        }
        if instances.len() > self.instance_capacity {
            let capacity = instances.len().next_power_of_two();
            log::debug!("growing instance buffer to {capacity} records");
            (self.instance_buffer, self.instance_bind_group) = Self::create_instance_storage(
                &gpu.device,
                &self.instance_layout,
                capacity,
                self.instance_stride,
            );
            self.instance_capacity = capacity;
        }
        gpu.queue.write_buffer(
            &self.instance_buffer,
            0,
            &pack_instances(instances, self.instance_stride),
        );
    }

    /// Draws every instance of `scene`. [`Self::prepare`] must have run this frame.
    pub fn render(
        &self,
        render_pass: &mut wgpu::RenderPass,
        scene: &LoadedScene,
        meshes: &MeshRegistry<wgpu::Buffer>,
    ) {
        if scene.instances().is_empty() {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for kind in PrimitiveKind::ALL {
            if meshes.is_degenerate(kind) {
                continue;
            }
            let slot = meshes.slot(kind);
            let mut bound = false;
            for (i, instance) in scene
                .instances()
                .iter()
                .enumerate()
                .filter(|(_, instance)| instance.kind() == kind)
            {
                if !bound {
                    if let Some(buffer) = slot.buffer() {
                        render_pass.set_vertex_buffer(0, buffer.slice(..));
                    }
                    bound = true;
                }
                let offset = (i as u64 * self.instance_stride) as u32;
                instance.draw(render_pass, slot, &self.instance_bind_group, offset);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Material;
    use glam::{Mat4, Vec3};

    #[test]
    fn globals_match_shader_layout() {
        assert_eq!(std::mem::size_of::<GlobalUniforms>(), 160);
    }

    #[test]
    fn stride_respects_alignment() {
        assert_eq!(instance_stride(256), 256);
        assert_eq!(instance_stride(64), 192);
        assert_eq!(instance_stride(0), 192);
    }

    #[test]
    fn instances_are_packed_at_stride_offsets() {
        let instances = [
            PrimitiveInstance::new(PrimitiveKind::Cube, Mat4::IDENTITY, Material::default()),
            PrimitiveInstance::new(
                PrimitiveKind::Sphere,
                Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0)),
                Material::default(),
            ),
        ];

        let bytes = pack_instances(&instances, 256);
        assert_eq!(bytes.len(), 512);

        let second: &InstanceUniforms =
            bytemuck::from_bytes(&bytes[256..256 + std::mem::size_of::<InstanceUniforms>()]);
        assert_eq!(second.model[3], [4.0, 5.0, 6.0, 1.0]);
        assert!(bytes[192..256].iter().all(|&b| b == 0));
    }

    #[test]
    fn globals_carry_camera_and_coefficients() {
        let camera = Camera::default();
        let scene = LoadedScene::default();
        let globals = GlobalUniforms::new(&camera, &scene);
        assert_eq!(globals.camera_pos, [0.0, 0.0, 0.0]);
        assert_eq!(globals.ka, scene.global_data().ka);
        assert_eq!(globals.view, Mat4::IDENTITY.to_cols_array_2d());
    }
}
