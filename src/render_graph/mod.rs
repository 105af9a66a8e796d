//! Node-based render graph for multi-pass rendering.
//!
//! Nodes run in order, handing their output to the next through two
//! ping-pong targets; the last node writes the destination.
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ ScenePass   │───▶│   Filter    │───▶│   Screen    │
//! │ (offscreen) │    │ (fullscreen)│    │ or snapshot │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!       │
//!       ▼
//!   Target A
//! ```
//!
//! ```ignore
//! let mut graph = RenderGraph::builder()
//!     .node(ScenePassNode::new(&gpu, format))
//!     .node(FilterNode::new(&gpu, format))
//!     .build(&gpu, format);
//!
//! graph.execute(&gpu, &camera, &world)?;
//! ```

mod graph;
mod nodes;
mod render_node;
mod render_target;

pub use graph::{RenderGraph, RenderGraphBuilder};
pub use nodes::{FilterNode, ScenePassNode};
pub use render_node::RenderNode;
pub use render_target::{DepthTarget, RenderContext, RenderTarget};
