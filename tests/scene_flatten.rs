use std::path::PathBuf;

use scenery::scene::{LightKind, LoadedScene, SceneFile, flatten};
use scenery::{Mat4, PrimitiveKind, SceneError, Vec3};

const ONE_LIGHT_ONE_CUBE: &str = r#"(
    camera: (
        position: (0.0, 0.0, 5.0, 1.0),
        look: (0.0, 0.0, -1.0, 0.0),
        up: (0.0, 1.0, 0.0, 0.0),
        height_angle: 0.785398,
    ),
    root: (
        lights: [(
            type: Directional,
            color: (1.0, 1.0, 1.0, 1.0),
            direction: (-1.0, -1.0, -1.0, 0.0),
        )],
        primitives: [(
            type: Cube,
            material: (
                ambient: (0.1, 0.1, 0.1, 1.0),
                diffuse: (0.8, 0.2, 0.2, 1.0),
                specular: (1.0, 1.0, 1.0, 1.0),
                shininess: 20.0,
            ),
        )],
    ),
)"#;

fn write_scene(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("scenery-it-{}-{name}.ron", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn one_directional_light_and_one_cube() {
    let path = write_scene("basic", ONE_LIGHT_ONE_CUBE);
    let scene = LoadedScene::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let lights: Vec<_> = scene.lights().active().collect();
    assert_eq!(lights.len(), 1);
    assert_eq!(lights[0].kind(), LightKind::Directional);

    assert_eq!(scene.instances().len(), 1);
    let cube = &scene.instances()[0];
    assert_eq!(cube.kind(), PrimitiveKind::Cube);
    assert_eq!(cube.model(), Mat4::IDENTITY);
    assert_eq!(cube.material().shininess, 20.0);
}

#[test]
fn nested_transforms_reach_the_instance() {
    let scene = SceneFile::parse(
        r#"(
            root: (
                transformations: [Translate((0.0, 2.0, 0.0))],
                children: [(
                    transformations: [Scale((2.0, 2.0, 2.0))],
                    primitives: [(type: Sphere)],
                )],
            ),
        )"#,
    )
    .unwrap();

    let data = flatten(&scene).unwrap();
    let loaded = LoadedScene::from_render_data(&data);

    let model = loaded.instances()[0].model();
    let top = model.transform_point3(Vec3::new(0.0, 0.5, 0.0));
    assert!(top.abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-6), "{top}");
}

#[test]
fn mesh_primitives_abort_the_load() {
    let path = write_scene(
        "mesh",
        r#"(root: (primitives: [(type: Mesh, mesh_file: Some("teapot.obj"))]))"#,
    );
    let err = LoadedScene::load(&path).unwrap_err();
    std::fs::remove_file(&path).ok();

    assert!(matches!(err, SceneError::UnsupportedMesh { ref mesh_file } if mesh_file == "teapot.obj"));
}

#[test]
fn bundled_scene_and_settings_load() {
    use scenery::{Config, Settings};

    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let settings = Settings::load_from_file(root.join("scenery.toml")).unwrap();
    let scene_file = settings.scene_file.clone().unwrap();

    let scene = LoadedScene::load(root.join(scene_file)).unwrap();
    assert_eq!(scene.instances().len(), 4);
    assert_eq!(scene.lights().active().count(), 3);
    assert!(settings.has_valid_clip_planes());
}

#[test]
fn malformed_scene_keeps_the_ron_error() {
    use std::error::Error;

    let path = write_scene("malformed", "( root: ( children: [ ");
    let err = LoadedScene::load(&path).unwrap_err();
    std::fs::remove_file(&path).ok();

    assert!(matches!(err, SceneError::Parse { .. }), "{err:?}");
    let source = err.source().expect("parse error carries its cause");
    assert!(source.downcast_ref::<ron::error::SpannedError>().is_some());
}
