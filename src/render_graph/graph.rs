//! The main render graph and builder for composing render pipelines.

use crate::camera::Camera;
use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::render_graph::{RenderContext, RenderNode, RenderTarget};
use crate::renderer::World;

const TARGET_A: &str = "RenderGraph Target A";
const TARGET_B: &str = "RenderGraph Target B";

/// Builder for constructing render graphs with a fluent API.
///
/// Nodes execute in insertion order. The first node receives no input, each
/// later node receives its predecessor's output, and the final node writes
/// the destination (the screen or a caller-provided target).
///
/// ```ignore
/// let graph = RenderGraph::builder()
///     .node(ScenePassNode::new(&gpu, format))
///     .node(FilterNode::new(&gpu, format))
///     .build(&gpu, format);
/// ```
pub struct RenderGraphBuilder {
    nodes: Vec<Box<dyn RenderNode>>,
}

impl RenderGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn node<N: RenderNode + 'static>(mut self, node: N) -> Self {
        self.nodes.push(Box::new(node));
        self
    }

    /// Allocates the ping-pong targets in `format` at the current surface size.
    pub fn build(self, gpu: &GpuContext, format: wgpu::TextureFormat) -> RenderGraph {
        let size = (gpu.width(), gpu.height());
        let target_a = RenderTarget::new(gpu, format, size, TARGET_A, wgpu::TextureUsages::empty());
        let target_b = RenderTarget::new(gpu, format, size, TARGET_B, wgpu::TextureUsages::empty());

        RenderGraph {
            nodes: self.nodes,
            target_a,
            target_b,
        }
    }
}

impl Default for RenderGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A chain of render nodes with ping-pong intermediate targets.
///
/// ```text
/// Pass 0: None     → Target A
/// Pass 1: Target A → Target B
/// Pass 2: Target B → Destination
/// ```
///
/// Intermediate targets follow the size of each traversal, so the same graph
/// can draw the window and a fixed-size snapshot.
pub struct RenderGraph {
    nodes: Vec<Box<dyn RenderNode>>,
    target_a: RenderTarget,
    target_b: RenderTarget,
}

impl RenderGraph {
    pub fn builder() -> RenderGraphBuilder {
        RenderGraphBuilder::new()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Renders one frame to the window surface and presents it.
    ///
    /// A lost or outdated surface is returned to the caller, which should
    /// reconfigure and try again next frame.
    pub fn execute(&mut self, gpu: &GpuContext, camera: &Camera, world: &World) -> Result<(), RenderError> {
        let output = gpu.surface.get_current_texture()?;
        let screen_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("RenderGraph Encoder"),
            });

        self.run(gpu, &mut encoder, camera, world, &screen_view, (gpu.width(), gpu.height()));

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Renders one frame into `target` without touching the window.
    ///
    /// `size` must be the pixel size of `target`.
    pub fn execute_to_target(
        &mut self,
        gpu: &GpuContext,
        camera: &Camera,
        world: &World,
        target: &wgpu::TextureView,
        size: (u32, u32),
    ) {
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("RenderGraph To Target Encoder"),
            });

        self.run(gpu, &mut encoder, camera, world, target, size);

        gpu.queue.submit(std::iter::once(encoder.finish()));
    }

    fn run(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        camera: &Camera,
        world: &World,
        destination: &wgpu::TextureView,
        size: (u32, u32),
    ) {
        self.target_a.ensure_size(gpu, size, TARGET_A);
        self.target_b.ensure_size(gpu, size, TARGET_B);

        let mut ctx = RenderContext {
            gpu,
            encoder,
            camera,
            world,
            size,
        };

        let node_count = self.nodes.len();
        let mut current_input: Option<&wgpu::TextureView> = None;

        for (i, node) in self.nodes.iter_mut().enumerate() {
            let is_last = i == node_count - 1;

            let target = if is_last {
                destination
            } else if i % 2 == 0 {
                &self.target_a.view
            } else {
                &self.target_b.view
            };

            node.execute(&mut ctx, target, current_input);

            if !is_last {
                current_input = Some(target);
            }
        }
    }
}
