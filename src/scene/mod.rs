//! Scene descriptions and their flattening into render-ready lists.
//!
//! A scene is authored as a RON tree of [`SceneNode`]s. Loading it goes
//! through three steps:
//!
//! 1. [`SceneFile::load`] parses the file,
//! 2. [`flatten`] walks the tree and resolves every light and primitive into
//!    world space as a [`RenderData`],
//! 3. [`LoadedScene::from_render_data`] builds the per-instance records and
//!    the fixed light slots the renderer uploads.
//!
//! ```ignore
//! let scene = LoadedScene::load("scenes/spheres.ron")?;
//! for instance in scene.instances() {
//!     println!("{:?} at {:?}", instance.kind(), instance.model());
//! }
//! ```

mod flatten;
mod graph;
mod lights;

pub use flatten::flatten;
pub use graph::{
    LightType, PrimitiveType, RenderData, RenderShapeData, SceneCameraData, SceneFile,
    SceneGlobalData, SceneLight, SceneLightData, SceneNode, ScenePrimitive, Transformation,
};
pub use lights::{LightKind, LightSlots, LightUniform, MAX_LIGHTS};

use std::path::Path;

use crate::error::SceneError;
use crate::primitives::PrimitiveInstance;

/// A flattened scene ready for drawing.
///
/// Replaced wholesale on every reload; nothing in it changes afterwards.
#[derive(Clone, Debug, Default)]
pub struct LoadedScene {
    global_data: SceneGlobalData,
    camera_data: SceneCameraData,
    instances: Vec<PrimitiveInstance>,
    lights: LightSlots,
}

impl LoadedScene {
    /// Parses and flattens the scene file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let scene = SceneFile::load(path)?;
        let data = flatten(&scene)?;
        log::info!(
            "loaded scene {}: {} shapes, {} lights",
            path.display(),
            data.shapes.len(),
            data.lights.len()
        );
        Ok(Self::from_render_data(&data))
    }

    pub fn from_render_data(data: &RenderData) -> Self {
        let instances = data
            .shapes
            .iter()
            .filter_map(|shape| {
                let kind = shape.primitive.kind.parametric()?;
                Some(PrimitiveInstance::new(kind, shape.ctm, shape.primitive.material))
            })
            .collect();

        Self {
            global_data: data.global_data,
            camera_data: data.camera_data.clone(),
            instances,
            lights: LightSlots::from_lights(&data.lights),
        }
    }

    pub fn global_data(&self) -> SceneGlobalData {
        self.global_data
    }

    pub fn camera_data(&self) -> &SceneCameraData {
        &self.camera_data
    }

    pub fn instances(&self) -> &[PrimitiveInstance] {
        &self.instances
    }

    pub fn lights(&self) -> &LightSlots {
        &self.lights
    }
}
