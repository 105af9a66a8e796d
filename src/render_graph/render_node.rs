//! The core render node trait for the render graph.

use crate::render_graph::RenderContext;

/// One pass in the render graph.
///
/// Each node receives the previous node's output (if any) and writes to a
/// target texture view. Nodes may keep per-size resources such as depth
/// buffers, so `execute` takes `&mut self` and should resize them from
/// [`RenderContext::size`].
///
/// ```ignore
/// struct Invert {
///     pipeline: wgpu::RenderPipeline,
/// }
///
/// impl RenderNode for Invert {
///     fn execute(
///         &mut self,
///         ctx: &mut RenderContext,
///         target: &wgpu::TextureView,
///         input: Option<&wgpu::TextureView>,
///     ) {
///         let mut pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
///             color_attachments: &[Some(wgpu::RenderPassColorAttachment {
///                 view: target,
///                 // ...
///             })],
///             // ...
///         });
///         pass.set_pipeline(&self.pipeline);
///         pass.draw(0..3, 0..1);
///     }
/// }
/// ```
pub trait RenderNode {
    /// Records this node's passes into `ctx.encoder`.
    ///
    /// `input` is `None` for the first node in the graph.
    ///
    /// # Panics
    ///
    /// Screen-space nodes panic when `input` is `None`, since they have
    /// nothing to sample.
    fn execute(
        &mut self,
        ctx: &mut RenderContext,
        target: &wgpu::TextureView,
        input: Option<&wgpu::TextureView>,
    );
}
