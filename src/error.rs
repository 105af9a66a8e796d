//! Error types shared across the renderer.
//!
//! Each concern gets its own enum so callers can match on what actually went
//! wrong; [`RenderError`] wraps the others for the orchestrator's entry points.

use std::path::PathBuf;

/// Failures while loading or flattening a scene description.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// The scene file could not be read.
    #[error("failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scene file is not valid RON for the scene schema.
    #[error("failed to parse scene file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// Arbitrary polygon meshes cannot be rendered as scene primitives.
    #[error("Rendering mesh objects not supported (mesh file: {mesh_file})")]
    UnsupportedMesh { mesh_file: String },
}

/// Failures while loading or saving settings.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Unsupported settings format: {0}")]
    UnsupportedFormat(String),
}

/// Errors that can occur when loading imported model geometry.
#[derive(thiserror::Error, Debug)]
pub enum GeometryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown model format: {0}")]
    UnknownFormat(String),
}

/// Errors surfaced by the GPU side of the renderer.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// Near and far planes are equal, so no projection can be derived.
    #[error("near and far planes are equal ({0}); refusing to render")]
    DegenerateClipPlanes(f32),

    #[error("failed to read back rendered image: {0}")]
    Readback(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The skybox faces are missing or inconsistent.
    #[error("invalid skybox in {dir}: {message}")]
    Skybox { dir: PathBuf, message: String },

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
