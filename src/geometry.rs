//! Imported model geometry.
//!
//! Models are read into a [`RawGeometry`], optionally reshaped on the CPU
//! (recentered, fitted to a unit cube, given smooth normals) and then
//! uploaded as an indexed [`Mesh`].
//!
//! # Supported Formats
//!
//! | Format | Extensions | Notes |
//! |--------|------------|-------|
//! | STL    | `.stl`     | Binary and ASCII, face normals only |
//!
//! ```ignore
//! let mut rock = RawGeometry::load("assets/rock.stl")?;
//! rock.recenter();
//! rock.normalize();
//! let mesh = rock.upload(&gpu);
//! ```

use std::path::Path;

use glam::Vec3;

use crate::error::GeometryError;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, MeshVertex};

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    pub vertices: Vec<MeshVertex>,
    /// Triangle indices, counter-clockwise.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Loads a model, picking the parser from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "stl" => {
                let file = std::fs::File::open(path)?;
                Self::parse_stl(&mut std::io::BufReader::new(file))
            }
            _ => Err(GeometryError::UnknownFormat(ext)),
        }
    }

    /// Parses binary or ASCII STL data.
    ///
    /// Every face gets its own three vertices carrying the face normal.
    pub fn parse_stl<R: std::io::Read + std::io::Seek>(reader: &mut R) -> Result<Self, GeometryError> {
        let stl = stl_io::read_stl(reader)
            .map_err(|e| GeometryError::Parse(format!("STL parse error: {e}")))?;

        let mut vertices = Vec::with_capacity(stl.faces.len() * 3);
        for face in &stl.faces {
            let normal = Vec3::from(<[f32; 3]>::from(face.normal));
            for &vertex_idx in &face.vertices {
                let position = stl
                    .vertices
                    .get(vertex_idx)
                    .ok_or_else(|| GeometryError::Parse(format!("vertex index {vertex_idx} out of range")))?;
                vertices.push(MeshVertex::new(Vec3::from(<[f32; 3]>::from(*position)), normal));
            }
        }
        let indices = (0..vertices.len() as u32).collect();

        Ok(Self::new(vertices, indices))
    }

    /// Returns the `(min, max)` corners of the axis-aligned bounding box.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.vertices.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), v| (min.min(v.position()), max.max(v.position())),
        )
    }

    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        let (min, max) = self.bounds();
        max - min
    }

    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position = (v.position() + offset).to_array();
        }
    }

    /// Scales all vertices uniformly around the origin.
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.vertices {
            v.position = (v.position() * factor).to_array();
        }
    }

    /// Centers the geometry at the origin.
    pub fn recenter(&mut self) {
        let center = self.center();
        self.translate(-center);
    }

    /// Scales the geometry to fit within a unit cube.
    pub fn normalize(&mut self) {
        let max_dim = self.size().max_element();
        if max_dim > 0.0 {
            self.scale(1.0 / max_dim);
        }
    }

    /// Replaces face normals with area-weighted vertex averages.
    ///
    /// Only vertices shared through the index buffer are smoothed together.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = self.vertices[i0].position();
            let face_normal = (self.vertices[i1].position() - p0).cross(self.vertices[i2].position() - p0);
            for i in [i0, i1, i2] {
                normals[i] += face_normal;
            }
        }

        for (v, n) in self.vertices.iter_mut().zip(normals) {
            v.normal = n.normalize_or_zero().to_array();
        }
    }

    pub fn upload(&self, gpu: &GpuContext) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_STL: &str = "solid tri
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 2 0 0
    vertex 0 4 0
  endloop
endfacet
endsolid tri
";

    fn v(x: f32, y: f32, z: f32) -> MeshVertex {
        MeshVertex::new(Vec3::new(x, y, z), Vec3::Y)
    }

    #[test]
    fn raw_geometry_bounds() {
        let geom = RawGeometry::new(vec![v(0.0, 0.0, 0.0), v(1.0, 2.0, 3.0), v(-1.0, -1.0, -1.0)], vec![0, 1, 2]);

        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn recenter_and_normalize_fit_unit_cube() {
        let mut geom = RawGeometry::new(vec![v(2.0, 2.0, 2.0), v(6.0, 4.0, 4.0)], vec![0, 1, 0]);

        geom.recenter();
        geom.normalize();

        assert!(geom.center().abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!((geom.size().max_element() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn parses_ascii_stl() {
        let mut cursor = std::io::Cursor::new(TRIANGLE_STL.as_bytes());
        let geom = RawGeometry::parse_stl(&mut cursor).unwrap();

        assert_eq!(geom.vertices.len(), 3);
        assert_eq!(geom.indices, vec![0, 1, 2]);
        assert_eq!(geom.vertices[0].normal(), Vec3::Z);
        assert_eq!(geom.size(), Vec3::new(2.0, 4.0, 0.0));
    }

    #[test]
    fn smooth_normals_follow_winding() {
        let mut geom = RawGeometry::new(vec![v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0)], vec![0, 1, 2]);
        geom.recalculate_normals();
        for vertex in &geom.vertices {
            assert_eq!(vertex.normal(), Vec3::Z);
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = RawGeometry::load("model.fbx").unwrap_err();
        assert!(matches!(err, GeometryError::UnknownFormat(ref ext) if ext == "fbx"));
    }
}
