use glam::{Mat4, Vec4};

use crate::error::SceneError;

use super::graph::{
    PrimitiveType, RenderData, RenderShapeData, SceneFile, SceneLightData, SceneNode,
};

/// Flattens a parsed scene into world-space lights and shapes.
///
/// Nodes are visited depth-first in pre-order. Each node folds its own
/// transformations into the incoming CTM as `ctm · T1 · T2 · ...`, so the last
/// transformation in a list is the one applied closest to the geometry.
pub fn flatten(scene: &SceneFile) -> Result<RenderData, SceneError> {
    let mut data = RenderData {
        global_data: scene.global_data,
        camera_data: scene.camera.clone(),
        lights: Vec::new(),
        shapes: Vec::new(),
    };
    visit(&scene.root, Mat4::IDENTITY, &mut data)?;
    Ok(data)
}

fn visit(node: &SceneNode, mut ctm: Mat4, out: &mut RenderData) -> Result<(), SceneError> {
    for transformation in &node.transformations {
        ctm *= transformation.matrix();
    }

    for light in &node.lights {
        out.lights.push(SceneLightData {
            id: light.id,
            kind: light.kind,
            color: light.color,
            attenuation: light.attenuation,
            position: ctm * Vec4::W,
            direction: ctm * light.direction,
            penumbra: light.penumbra,
            angle: light.angle,
        });
    }

    for primitive in &node.primitives {
        if primitive.kind == PrimitiveType::Mesh {
            return Err(SceneError::UnsupportedMesh {
                mesh_file: primitive.mesh_file.clone().unwrap_or_default(),
            });
        }
        out.shapes.push(RenderShapeData {
            primitive: primitive.clone(),
            ctm,
        });
    }

    // `ctm` is `Copy`, so every child starts from this node's transform.
    for child in &node.children {
        visit(child, ctm, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Material;
    use crate::scene::graph::{LightType, SceneLight, ScenePrimitive, Transformation};
    use glam::Vec3;

    fn cube() -> ScenePrimitive {
        ScenePrimitive {
            kind: PrimitiveType::Cube,
            material: Material::default(),
            mesh_file: None,
        }
    }

    fn node(transformations: Vec<Transformation>) -> SceneNode {
        SceneNode {
            transformations,
            ..Default::default()
        }
    }

    fn scene(root: SceneNode) -> SceneFile {
        SceneFile {
            root,
            ..Default::default()
        }
    }

    #[test]
    fn translate_then_scale_places_cube_origin() {
        let mut leaf = node(vec![]);
        leaf.primitives.push(cube());
        let mut scaled = node(vec![Transformation::Scale(Vec3::splat(2.0))]);
        scaled.children.push(leaf);
        let mut root = node(vec![Transformation::Translate(Vec3::X)]);
        root.children.push(scaled);

        let data = flatten(&scene(root)).unwrap();
        assert_eq!(data.shapes.len(), 1);
        let world = data.shapes[0].ctm.transform_point3(Vec3::ZERO);
        assert!(world.abs_diff_eq(Vec3::X, 1e-6));
        // Scale is applied before the translation.
        let corner = data.shapes[0].ctm.transform_point3(Vec3::splat(0.5));
        assert!(corner.abs_diff_eq(Vec3::new(2.0, 1.0, 1.0), 1e-6));
    }

    #[test]
    fn transformations_within_a_node_fold_left_to_right() {
        let mut root = node(vec![
            Transformation::Translate(Vec3::new(0.0, 3.0, 0.0)),
            Transformation::Scale(Vec3::splat(2.0)),
        ]);
        root.primitives.push(cube());

        let data = flatten(&scene(root)).unwrap();
        let p = data.shapes[0].ctm.transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(2.0, 3.0, 0.0), 1e-6));
    }

    #[test]
    fn siblings_do_not_share_transforms() {
        let mut a = node(vec![Transformation::Translate(Vec3::new(5.0, 0.0, 0.0))]);
        a.primitives.push(cube());
        let mut b = node(vec![Transformation::Scale(Vec3::splat(3.0))]);
        b.primitives.push(cube());
        let mut root = node(vec![Transformation::Translate(Vec3::Z)]);
        root.children.extend([a, b]);

        let data = flatten(&scene(root)).unwrap();
        assert_eq!(data.shapes.len(), 2);
        let expected_b = Mat4::from_translation(Vec3::Z) * Mat4::from_scale(Vec3::splat(3.0));
        assert!(data.shapes[1].ctm.abs_diff_eq(expected_b, 1e-6));
    }

    #[test]
    fn lights_take_the_node_ctm() {
        let mut root = node(vec![
            Transformation::Translate(Vec3::new(1.0, 2.0, 3.0)),
            Transformation::Rotate {
                axis: Vec3::Y,
                angle: std::f32::consts::FRAC_PI_2,
            },
        ]);
        root.lights.push(SceneLight {
            id: 7,
            kind: LightType::Spot,
            color: Vec4::ONE,
            attenuation: Vec3::new(1.0, 0.0, 0.0),
            direction: Vec4::new(0.0, 0.0, -1.0, 0.0),
            penumbra: 0.1,
            angle: 0.5,
        });

        let data = flatten(&scene(root)).unwrap();
        let light = &data.lights[0];
        assert_eq!(light.id, 7);
        assert!(light.position.abs_diff_eq(Vec4::new(1.0, 2.0, 3.0, 1.0), 1e-6));
        // Directions ignore the translation.
        assert!(light.direction.abs_diff_eq(Vec4::new(-1.0, 0.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn mesh_primitive_aborts_the_load() {
        let mut root = node(vec![]);
        root.primitives.push(ScenePrimitive {
            kind: PrimitiveType::Mesh,
            material: Material::default(),
            mesh_file: Some("teapot.obj".into()),
        });

        let err = flatten(&scene(root)).unwrap_err();
        assert!(matches!(err, SceneError::UnsupportedMesh { ref mesh_file } if mesh_file == "teapot.obj"));
        assert!(err.to_string().contains("not supported"));
    }
}
