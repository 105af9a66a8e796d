//! Frame orchestration.
//!
//! [`Renderer`] owns the GPU context, the camera and everything drawn (the
//! [`World`]), and runs the render graph: the offscreen scene pass followed
//! by the fullscreen filter pass.
//!
//! Settings changes are applied idempotently. Meshes are only rebuilt when
//! their clamped shape parameters change, and the scene, model and skybox
//! are only reloaded when their paths change.

use std::path::Path;
use std::sync::Arc;

use winit::window::Window;

use crate::camera::Camera;
use crate::controls::CameraControls;
use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::model::Model;
use crate::post_process::FilterSettings;
use crate::primitives::{MeshRegistry, ShapeParams};
use crate::render_graph::{FilterNode, RenderGraph, RenderTarget, ScenePassNode};
use crate::scene::{LoadedScene, SceneCameraData};
use crate::settings::Settings;
use crate::snapshot::{SNAPSHOT_SIZE, read_texture};
use crate::texture::CubeTexture;

/// Everything the render graph draws in one frame.
#[derive(Debug, Default)]
pub struct World {
    pub scene: LoadedScene,
    pub meshes: MeshRegistry<wgpu::Buffer>,
    pub model: Option<Model>,
    pub skybox: Option<CubeTexture>,
    pub filters: FilterSettings,
}

impl From<&Settings> for FilterSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            per_pixel: settings.per_pixel_filter,
            kernel: settings.kernel_filter,
            radius: settings.filter_radius,
        }
    }
}

/// What a new set of settings requires beyond mesh regeneration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub scene: bool,
    pub model: bool,
    pub skybox: bool,
}

impl SettingsChange {
    pub fn between(old: &Settings, new: &Settings) -> Self {
        Self {
            scene: old.scene_file != new.scene_file,
            model: old.model != new.model,
            skybox: old.skybox_dir != new.skybox_dir,
        }
    }
}

pub struct Renderer {
    gpu: GpuContext,
    camera: Camera,
    controls: CameraControls,
    settings: Settings,
    world: World,
    graph: RenderGraph,
}

impl Renderer {
    /// Sets up the GPU and graph, then loads everything `settings` names.
    ///
    /// Only GPU initialization is fatal. A scene, model or skybox that fails
    /// to load is logged and left out.
    pub fn new(window: Arc<Window>, settings: Settings) -> Result<Self, RenderError> {
        let gpu = GpuContext::new(window)?;
        let format = gpu.format();

        let graph = RenderGraph::builder()
            .node(ScenePassNode::new(&gpu, format))
            .node(FilterNode::new(&gpu, format))
            .build(&gpu, format);

        let camera = Camera::from_scene(
            &SceneCameraData::default(),
            gpu.aspect(),
            settings.near_plane,
            settings.far_plane,
        );

        let mut renderer = Self {
            gpu,
            camera,
            controls: CameraControls::new(),
            world: World {
                filters: FilterSettings::from(&settings),
                ..Default::default()
            },
            settings,
            graph,
        };

        renderer.regenerate_meshes();
        renderer.reload_model();
        renderer.reload_skybox();
        renderer.reload_scene();

        Ok(renderer)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Parses and flattens `path`, replaces the scene and resets the camera to it.
    ///
    /// On failure the previous scene stays loaded.
    pub fn load_scene(&mut self, path: &Path) -> Result<(), RenderError> {
        let scene = LoadedScene::load(path)?;
        self.camera = Camera::from_scene(
            scene.camera_data(),
            self.gpu.aspect(),
            self.settings.near_plane,
            self.settings.far_plane,
        );
        self.world.scene = scene;
        self.regenerate_meshes();
        Ok(())
    }

    /// Reloads the configured scene file, if any.
    pub fn reload_scene(&mut self) {
        let Some(path) = self.settings.scene_file.clone() else {
            return;
        };
        if let Err(e) = self.load_scene(&path) {
            log::error!("{e}");
        }
    }

    /// Applies changed settings.
    ///
    /// The projection is only re-derived when near and far differ; with
    /// equal planes painting is skipped until they are fixed.
    pub fn apply_settings(&mut self, settings: Settings) {
        let change = SettingsChange::between(&self.settings, &settings);
        self.settings = settings;

        self.regenerate_meshes();

        self.camera
            .set_clip_planes(self.settings.near_plane, self.settings.far_plane);
        if !self.settings.has_valid_clip_planes() {
            log::warn!(
                "near and far planes are both {}; rendering paused",
                self.settings.near_plane
            );
        }

        self.world.filters = FilterSettings::from(&self.settings);

        if change.scene {
            self.reload_scene();
        }
        if change.model {
            self.reload_model();
        }
        if change.skybox {
            self.reload_skybox();
        }
    }

    fn regenerate_meshes(&mut self) {
        let ShapeParams { p1, p2 } = self.settings.shape_params();
        let rebuilt = self.world.meshes.regenerate(&self.gpu, p1, p2);
        if rebuilt > 0 {
            log::debug!("rebuilt {rebuilt} primitive meshes for ({p1}, {p2})");
        }
    }

    fn reload_model(&mut self) {
        self.world.model = self
            .settings
            .model
            .as_ref()
            .and_then(|settings| match Model::load(&self.gpu, settings) {
                Ok(model) => Some(model),
                Err(e) => {
                    log::error!("failed to load model {}: {e}", settings.path.display());
                    None
                }
            });
    }

    fn reload_skybox(&mut self) {
        self.world.skybox = self
            .settings
            .skybox_dir
            .as_deref()
            .and_then(|dir| match CubeTexture::from_dir(&self.gpu, dir) {
                Ok(sky) => {
                    log::info!("loaded {}px skybox from {}", sky.size, dir.display());
                    Some(sky)
                }
                Err(e) => {
                    log::error!("{e}");
                    None
                }
            });
    }

    /// Follows a window resize. Offscreen targets catch up on the next paint.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.camera.set_viewport(self.gpu.width(), self.gpu.height());
    }

    /// Integrates held movement keys over `dt` seconds. Returns whether the camera moved.
    pub fn tick(&mut self, input: &Input, dt: f32) -> bool {
        self.controls.fly(&mut self.camera, input, dt)
    }

    /// Turns the camera for a pointer drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.controls.orbit(&mut self.camera, dx, dy);
    }

    /// Draws one frame to the window.
    ///
    /// Skipped entirely while the clip planes are degenerate. A lost or
    /// outdated surface is reconfigured and the frame dropped.
    pub fn paint(&mut self) -> Result<(), RenderError> {
        if !self.settings.has_valid_clip_planes() {
            log::debug!("skipping frame: degenerate clip planes");
            return Ok(());
        }

        match self.graph.execute(&self.gpu, &self.camera, &self.world) {
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                Ok(())
            }
            other => other,
        }
    }

    /// Renders the current view at [`SNAPSHOT_SIZE`] and writes it to `path`.
    ///
    /// The image format follows the file extension. The window's viewport is
    /// restored afterwards.
    pub fn snapshot(&mut self, path: &Path) -> Result<(), RenderError> {
        if !self.settings.has_valid_clip_planes() {
            return Err(RenderError::DegenerateClipPlanes(self.settings.near_plane));
        }

        let format = self.gpu.format();
        let target = RenderTarget::new(
            &self.gpu,
            format,
            SNAPSHOT_SIZE,
            "Snapshot Target",
            wgpu::TextureUsages::COPY_SRC,
        );

        self.camera.set_viewport(SNAPSHOT_SIZE.0, SNAPSHOT_SIZE.1);
        self.graph
            .execute_to_target(&self.gpu, &self.camera, &self.world, &target.view, SNAPSHOT_SIZE);
        self.camera.set_viewport(self.gpu.width(), self.gpu.height());

        let image = read_texture(&self.gpu, &target.texture, SNAPSHOT_SIZE, format)?;
        image.save(path)?;
        log::info!(
            "saved {}x{} snapshot to {}",
            SNAPSHOT_SIZE.0,
            SNAPSHOT_SIZE.1,
            path.display()
        );
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.world.meshes.release_all(&self.gpu);
    }
}
