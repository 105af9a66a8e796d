//! Render targets and execution context for the render graph.

use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::renderer::World;

/// An off-screen color target that can be rendered to and sampled from.
///
/// The graph keeps two of these for ping-pong rendering: one pass writes
/// target A while the next reads it and writes target B.
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    extra_usage: wgpu::TextureUsages,
    size: (u32, u32),
}

impl RenderTarget {
    /// Creates a `size` target of `format`.
    ///
    /// The texture is always a render attachment and sampleable; `extra_usage`
    /// adds flags such as `COPY_SRC` for readback.
    pub fn new(
        gpu: &GpuContext,
        format: wgpu::TextureFormat,
        size: (u32, u32),
        label: &str,
        extra_usage: wgpu::TextureUsages,
    ) -> Self {
        let usage =
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING | extra_usage;
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            format,
            extra_usage,
            size: (size.0.max(1), size.1.max(1)),
        }
    }

    /// Reallocates the texture if `size` differs from the current one.
    ///
    /// Must run before every frame that follows a resize.
    pub fn ensure_size(&mut self, gpu: &GpuContext, size: (u32, u32), label: &str) {
        let size = (size.0.max(1), size.1.max(1));
        if self.size != size {
            log::debug!("resizing {label} to {}x{}", size.0, size.1);
            *self = Self::new(gpu, self.format, size, label, self.extra_usage);
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

/// A `Depth32Float` attachment that follows the frame size.
pub struct DepthTarget {
    pub view: wgpu::TextureView,
    size: (u32, u32),
}

impl DepthTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(gpu: &GpuContext, size: (u32, u32)) -> Self {
        let size = (size.0.max(1), size.1.max(1));
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { view, size }
    }

    pub fn ensure_size(&mut self, gpu: &GpuContext, size: (u32, u32)) {
        if self.size != (size.0.max(1), size.1.max(1)) {
            *self = Self::new(gpu, size);
        }
    }
}

/// Everything a node needs during one traversal of the graph.
///
/// Created fresh for each frame; the `'a` lifetime keeps nodes from holding
/// on to any of it.
pub struct RenderContext<'a> {
    pub gpu: &'a GpuContext,
    /// Nodes append their passes to this encoder.
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub camera: &'a Camera,
    pub world: &'a World,
    /// Pixel size of every target in this traversal.
    pub size: (u32, u32),
}
