//! # Scenery
//!
//! **An interactive viewer for declarative 3D scenes.**
//!
//! A scene file describes a camera, lights and a tree of transformed
//! primitive solids. Scenery flattens the tree into world-space instances,
//! tessellates spheres, cubes, cylinders and cones at a configurable density,
//! and renders them with Phong lighting. An optional imported model and a
//! cubemap skybox are composited in, and a post-processing pass applies
//! screen-space filters.
//!
//! ## Quick Start
//!
//! ```no_run
//! use scenery::{Config, Settings};
//!
//! let settings = Settings::load_or_default("scenery.toml").unwrap();
//! scenery::run("scenery.toml".into(), settings).unwrap();
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! SceneFile ──flatten──▶ RenderData ──▶ LoadedScene ──┐
//!                                                     ▼
//! Settings ──▶ MeshRegistry (one mesh per kind) ──▶ ScenePassNode ──▶ FilterNode ──▶ screen
//! ```
//!
//! Everything CPU-side (tessellation, flattening, camera math, settings)
//! works without a GPU and is tested that way.

mod app;
mod camera;
mod controls;
pub mod coords;
mod error;
mod geometry;
mod gpu;
mod input;
mod mesh;
mod model;
mod post_process;
mod primitive_pass;
pub mod primitives;
pub mod quaternion;
mod render_graph;
mod renderer;
pub mod scene;
mod settings;
mod skybox;
mod snapshot;
mod texture;

pub use app::{TICK_INTERVAL, run};
pub use camera::{Camera, OPENGL_TO_WGPU};
pub use controls::CameraControls;
pub use error::{GeometryError, RenderError, SceneError, SettingsError};
pub use geometry::RawGeometry;
pub use gpu::GpuContext;
pub use input::Input;
pub use mesh::{InstanceTransform, Mesh, MeshVertex};
pub use model::{Model, ModelPass, ModelUniforms, instance_transforms, ring_transforms};
pub use post_process::{FilterPass, FilterSettings, FilterUniforms};
pub use primitive_pass::{GlobalUniforms, PrimitivePass};
pub use primitives::{
    InstanceUniforms, Material, MeshBackend, MeshRegistry, MeshSlot, PrimitiveInstance,
    PrimitiveKind, ShapeParams, Tessellate,
};
pub use render_graph::{
    DepthTarget, FilterNode, RenderContext, RenderGraph, RenderGraphBuilder, RenderNode,
    RenderTarget, ScenePassNode,
};
pub use renderer::{Renderer, SettingsChange, World};
pub use scene::LoadedScene;
pub use settings::{Config, MAX_SHAPE_PARAMETER, ModelSettings, Settings, WindowSettings};
pub use skybox::{SkyboxPass, SkyboxUniforms};
pub use snapshot::{SNAPSHOT_SIZE, read_texture};
pub use texture::{CUBE_FACES, CubeTexture, load_cube_faces};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
