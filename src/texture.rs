use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::RenderError;
use crate::gpu::GpuContext;

/// Face file stems in cubemap layer order (+X, -X, +Y, -Y, +Z, -Z).
pub const CUBE_FACES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// Extensions tried for each face, in order.
const FACE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tga"];

/// Finds the image file for cube face `stem` in `dir`.
pub fn find_face(dir: &Path, stem: &str) -> Option<PathBuf> {
    FACE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

/// Reads the six faces of a cubemap from `dir`.
///
/// Faces must be square and all the same size.
pub fn load_cube_faces(dir: &Path) -> Result<[RgbaImage; 6], RenderError> {
    let invalid = |message: String| RenderError::Skybox {
        dir: dir.to_path_buf(),
        message,
    };

    let mut faces = Vec::with_capacity(6);
    for stem in CUBE_FACES {
        let path = find_face(dir, stem).ok_or_else(|| invalid(format!("missing face '{stem}'")))?;
        let face = image::open(&path)?.to_rgba8();
        log::debug!("loaded skybox face {}", path.display());
        faces.push(face);
    }

    let size = faces[0].dimensions();
    if size.0 != size.1 {
        return Err(invalid(format!("face is {}x{}, not square", size.0, size.1)));
    }
    if let Some((stem, face)) = CUBE_FACES
        .iter()
        .zip(&faces)
        .find(|(_, face)| face.dimensions() != size)
    {
        let (w, h) = face.dimensions();
        return Err(invalid(format!(
            "face '{stem}' is {w}x{h}, expected {}x{}",
            size.0, size.1
        )));
    }

    faces
        .try_into()
        .map_err(|_| invalid("expected six faces".to_string()))
}

/// A six-layer cube texture sampled by direction.
#[derive(Debug)]
pub struct CubeTexture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub size: u32,
}

impl CubeTexture {
    /// Uploads six square RGBA faces, in [`CUBE_FACES`] order.
    pub fn from_faces(gpu: &GpuContext, faces: &[RgbaImage; 6], label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let size = faces[0].width();
        let data: Vec<u8> = faces.iter().flat_map(|face| face.as_raw().iter().copied()).collect();

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 6,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label} View")),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            size,
        }
    }

    /// Loads a cubemap from the six face images in `dir`.
    pub fn from_dir(gpu: &GpuContext, dir: &Path) -> Result<Self, RenderError> {
        let faces = load_cube_faces(dir)?;
        Ok(Self::from_faces(gpu, &faces, &format!("Skybox {}", dir.display())))
    }
}
