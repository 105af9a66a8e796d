//! The renderer's two graph nodes: the offscreen scene pass and the filter pass.

use crate::gpu::GpuContext;
use crate::model::ModelPass;
use crate::post_process::FilterPass;
use crate::primitive_pass::PrimitivePass;
use crate::render_graph::{DepthTarget, RenderContext, RenderNode};
use crate::skybox::SkyboxPass;

/// Draws the world's primitives, imported model and skybox with depth testing.
///
/// Always clears its target, so it belongs at the head of the graph.
pub struct ScenePassNode {
    primitives: PrimitivePass,
    model: ModelPass,
    skybox: SkyboxPass,
    depth: DepthTarget,
}

impl ScenePassNode {
    pub fn new(gpu: &GpuContext, format: wgpu::TextureFormat) -> Self {
        Self {
            primitives: PrimitivePass::new(gpu, format),
            model: ModelPass::new(gpu, format),
            skybox: SkyboxPass::new(gpu, format),
            depth: DepthTarget::new(gpu, (gpu.width(), gpu.height())),
        }
    }
}

impl RenderNode for ScenePassNode {
    fn execute(
        &mut self,
        ctx: &mut RenderContext,
        target: &wgpu::TextureView,
        _input: Option<&wgpu::TextureView>,
    ) {
        self.depth.ensure_size(ctx.gpu, ctx.size);

        let world = ctx.world;
        self.primitives.prepare(ctx.gpu, ctx.camera, &world.scene);
        if let Some(model) = &world.model {
            self.model.prepare(ctx.gpu, ctx.camera, model);
        }

        let mut render_pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.primitives
            .render(&mut render_pass, &world.scene, &world.meshes);
        if let Some(model) = &world.model {
            self.model.render(&mut render_pass, model);
        }
        // Last, so it only fills pixels nothing else covered.
        if let Some(sky) = &world.skybox {
            self.skybox
                .render(ctx.gpu, &mut render_pass, ctx.camera, sky);
        }
    }
}

/// Applies the world's [`FilterSettings`](crate::post_process::FilterSettings)
/// to the previous pass's output.
///
/// This node **requires** a previous pass in the render graph.
pub struct FilterNode {
    pass: FilterPass,
}

impl FilterNode {
    pub fn new(gpu: &GpuContext, format: wgpu::TextureFormat) -> Self {
        Self {
            pass: FilterPass::new(gpu, format),
        }
    }
}

impl RenderNode for FilterNode {
    fn execute(
        &mut self,
        ctx: &mut RenderContext,
        target: &wgpu::TextureView,
        input: Option<&wgpu::TextureView>,
    ) {
        let input_view = input.expect("FilterNode requires an input from a previous pass");

        let mut render_pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Filter Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.pass.render(
            ctx.gpu,
            &mut render_pass,
            &ctx.world.filters,
            input_view,
            ctx.size,
        );
    }
}
