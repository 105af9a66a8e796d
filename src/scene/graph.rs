//! Scene description types as read from disk and as produced by flattening.

use std::path::Path;

use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::primitives::{Material, PrimitiveKind};

/// A single local transformation applied at a scene-graph node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Transformation {
    Translate(Vec3),
    Scale(Vec3),
    /// Rotation of `angle` radians about `axis`.
    Rotate { axis: Vec3, angle: f32 },
    /// An arbitrary column-major matrix.
    Matrix(Mat4),
}

impl Transformation {
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Transformation::Translate(t) => Mat4::from_translation(t),
            Transformation::Scale(s) => Mat4::from_scale(s),
            Transformation::Rotate { axis, angle } => {
                Mat4::from_quat(Quat::from_axis_angle(axis.normalize(), angle))
            }
            Transformation::Matrix(m) => m,
        }
    }
}

/// Primitive type names accepted in scene files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    Cube,
    Cone,
    Cylinder,
    Sphere,
    /// A polygon mesh file; the renderer rejects these.
    Mesh,
}

impl PrimitiveType {
    /// The parametric kind, or `None` for meshes.
    pub fn parametric(self) -> Option<PrimitiveKind> {
        match self {
            PrimitiveType::Cube => Some(PrimitiveKind::Cube),
            PrimitiveType::Cone => Some(PrimitiveKind::Cone),
            PrimitiveType::Cylinder => Some(PrimitiveKind::Cylinder),
            PrimitiveType::Sphere => Some(PrimitiveKind::Sphere),
            PrimitiveType::Mesh => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenePrimitive {
    #[serde(rename = "type")]
    pub kind: PrimitiveType,
    #[serde(default)]
    pub material: Material,
    #[serde(default)]
    pub mesh_file: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightType {
    Point,
    Directional,
    Spot,
}

/// A light as attached to a scene-graph node, in that node's local space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneLight {
    #[serde(default)]
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: LightType,
    pub color: Vec4,
    /// Constant, linear and quadratic attenuation coefficients.
    #[serde(default)]
    pub attenuation: Vec3,
    #[serde(default)]
    pub direction: Vec4,
    /// Spot light falloff width in radians.
    #[serde(default)]
    pub penumbra: f32,
    /// Spot light cone half-angle in radians.
    #[serde(default)]
    pub angle: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneNode {
    pub transformations: Vec<Transformation>,
    pub primitives: Vec<ScenePrimitive>,
    pub lights: Vec<SceneLight>,
    pub children: Vec<SceneNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneCameraData {
    pub position: Vec4,
    pub look: Vec4,
    pub up: Vec4,
    /// Vertical field of view in radians.
    pub height_angle: f32,
}

impl Default for SceneCameraData {
    fn default() -> Self {
        Self {
            position: Vec4::new(0.0, 0.0, 5.0, 1.0),
            look: Vec4::new(0.0, 0.0, -1.0, 0.0),
            up: Vec4::new(0.0, 1.0, 0.0, 0.0),
            height_angle: std::f32::consts::FRAC_PI_4,
        }
    }
}

/// Scene-wide weights for the ambient, diffuse and specular terms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneGlobalData {
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
}

impl Default for SceneGlobalData {
    fn default() -> Self {
        Self {
            ka: 0.5,
            kd: 0.5,
            ks: 0.5,
        }
    }
}

/// A whole scene file: camera, global coefficients and the node tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub global_data: SceneGlobalData,
    pub camera: SceneCameraData,
    pub root: SceneNode,
}

impl SceneFile {
    /// Reads a RON scene file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| SceneError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses RON scene text.
    pub fn parse(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}

/// A light resolved into world space.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLightData {
    pub id: u32,
    pub kind: LightType,
    pub color: Vec4,
    pub attenuation: Vec3,
    pub position: Vec4,
    pub direction: Vec4,
    pub penumbra: f32,
    pub angle: f32,
}

/// A primitive paired with its cumulative world transform.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderShapeData {
    pub primitive: ScenePrimitive,
    pub ctm: Mat4,
}

/// The flat, render-ready form of a scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderData {
    pub global_data: SceneGlobalData,
    pub camera_data: SceneCameraData,
    pub lights: Vec<SceneLightData>,
    pub shapes: Vec<RenderShapeData>,
}
