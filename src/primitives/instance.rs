use std::ops::Range;

use glam::{Mat3, Mat4, Vec4};
use serde::{Deserialize, Serialize};

use super::{MeshSlot, PrimitiveKind};

/// Phong material coefficients of a primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub shininess: f32,
}

/// Per-instance uniform block consumed by the primitive shader.
///
/// The normal matrix is widened to 4x4 to keep WGSL's column alignment simple.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
    pub _padding: [f32; 3],
}

/// One placed primitive in the flattened scene.
///
/// Derived matrices are computed once here and never touched again; the
/// mesh itself lives in the kind's shared [`MeshSlot`].
#[derive(Clone, Debug)]
pub struct PrimitiveInstance {
    kind: PrimitiveKind,
    model: Mat4,
    inverse_model: Mat4,
    normal_matrix: Mat3,
    material: Material,
}

impl PrimitiveInstance {
    pub fn new(kind: PrimitiveKind, model: Mat4, material: Material) -> Self {
        Self {
            kind,
            model,
            inverse_model: model.inverse(),
            normal_matrix: Mat3::from_mat4(model).transpose().inverse(),
            material,
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn inverse_model(&self) -> Mat4 {
        self.inverse_model
    }

    /// Inverse-transpose of the upper 3x3 of the model matrix.
    pub fn normal_matrix(&self) -> Mat3 {
        self.normal_matrix
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn uniforms(&self) -> InstanceUniforms {
        InstanceUniforms {
            model: self.model.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(self.normal_matrix).to_cols_array_2d(),
            ambient: self.material.ambient.to_array(),
            diffuse: self.material.diffuse.to_array(),
            specular: self.material.specular.to_array(),
            shininess: self.material.shininess,
            _padding: [0.0; 3],
        }
    }

    /// Vertex range covering the whole shared mesh.
    ///
    /// # Panics
    ///
    /// Panics if `slot` has no generated mesh; drawing before generation is a
    /// call-ordering bug.
    pub fn vertex_range<B>(&self, slot: &MeshSlot<B>) -> Range<u32> {
        assert!(
            !slot.is_empty(),
            "{} instance drawn before its mesh was generated",
            self.kind.name()
        );
        0..slot.triangle_count() * 3
    }

    /// Records this instance's draw into `pass`.
    ///
    /// The kind's vertex buffer must already be bound at slot 0, and
    /// `uniform_offset` must point at this instance's [`InstanceUniforms`]
    /// inside the dynamic buffer behind `bind_group`.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass,
        slot: &MeshSlot<wgpu::Buffer>,
        bind_group: &wgpu::BindGroup,
        uniform_offset: u32,
    ) {
        let range = self.vertex_range(slot);
        pass.set_bind_group(1, bind_group, &[uniform_offset]);
        pass.draw(range, 0..1);
    }
}
