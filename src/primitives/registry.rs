use crate::gpu::GpuContext;
use crate::mesh::MeshVertex;

use super::{PrimitiveKind, ShapeParams};

/// Something that can turn vertex data into a drawable buffer handle.
///
/// [`GpuContext`] uploads into a `wgpu::Buffer`; tests substitute a fake that
/// records uploads and releases.
pub trait MeshBackend {
    type Buffer;

    fn upload_vertices(&self, label: &str, vertices: &[MeshVertex]) -> Self::Buffer;

    /// Frees a buffer. The default simply drops it.
    fn release(&self, buffer: Self::Buffer) {
        drop(buffer);
    }
}

impl MeshBackend for GpuContext {
    type Buffer = wgpu::Buffer;

    fn upload_vertices(&self, label: &str, vertices: &[MeshVertex]) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;

        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    fn release(&self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }
}

/// The shared mesh of one primitive kind.
///
/// An empty slot holds no buffer and is always safe to release again.
#[derive(Debug)]
pub struct MeshSlot<B> {
    buffer: Option<B>,
    triangle_count: u32,
    params: Option<ShapeParams>,
}

impl<B> MeshSlot<B> {
    pub fn empty() -> Self {
        Self {
            buffer: None,
            triangle_count: 0,
            params: None,
        }
    }

    pub fn buffer(&self) -> Option<&B> {
        self.buffer.as_ref()
    }

    pub fn triangle_count(&self) -> u32 {
        self.triangle_count
    }

    /// Clamped parameters the current buffer was built from.
    pub fn params(&self) -> Option<ShapeParams> {
        self.params
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_none() || self.triangle_count == 0
    }

    fn release<M: MeshBackend<Buffer = B>>(&mut self, backend: &M) {
        if let Some(buffer) = self.buffer.take() {
            backend.release(buffer);
        }
        self.triangle_count = 0;
        self.params = None;
    }
}

/// Owns one [`MeshSlot`] per [`PrimitiveKind`].
///
/// Regeneration is skipped when a kind's clamped parameters match the ones
/// its current buffer was built from.
#[derive(Debug)]
pub struct MeshRegistry<B> {
    slots: [MeshSlot<B>; 4],
}

impl<B> Default for MeshRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> MeshRegistry<B> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| MeshSlot::empty()),
        }
    }

    pub fn slot(&self, kind: PrimitiveKind) -> &MeshSlot<B> {
        &self.slots[kind.index()]
    }

    /// Whether `kind`'s mesh was built from parameters below the shape's
    /// minimum. Such a kind draws zero triangles for every instance.
    pub fn is_degenerate(&self, kind: PrimitiveKind) -> bool {
        self.slot(kind)
            .params()
            .is_some_and(|params| !kind.is_renderable(params))
    }

    /// Regenerates every kind for the raw parameters `(p1, p2)`.
    ///
    /// Returns how many kinds were actually rebuilt.
    pub fn regenerate<M: MeshBackend<Buffer = B>>(&mut self, backend: &M, p1: u32, p2: u32) -> usize {
        PrimitiveKind::ALL
            .into_iter()
            .filter(|&kind| self.regenerate_kind(backend, kind, ShapeParams::new(p1, p2)))
            .count()
    }

    /// Rebuilds one kind's mesh unless its clamped parameters are unchanged.
    pub fn regenerate_kind<M: MeshBackend<Buffer = B>>(
        &mut self,
        backend: &M,
        kind: PrimitiveKind,
        params: ShapeParams,
    ) -> bool {
        let clamped = kind.clamp(params);
        let slot = &mut self.slots[kind.index()];
        if slot.params == Some(clamped) && slot.buffer.is_some() {
            return false;
        }

        slot.release(backend);

        let vertices = kind.tessellate(clamped);
        let label = format!("{} Vertex Buffer", kind.name());
        slot.buffer = Some(backend.upload_vertices(&label, &vertices));
        slot.triangle_count = (vertices.len() / 3) as u32;
        slot.params = Some(clamped);

        log::debug!(
            "regenerated {} mesh at {:?}: {} triangles",
            kind.name(),
            clamped,
            slot.triangle_count
        );
        true
    }

    /// Releases every buffer, leaving all slots empty.
    pub fn release_all<M: MeshBackend<Buffer = B>>(&mut self, backend: &M) {
        for slot in &mut self.slots {
            slot.release(backend);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every upload and release instead of touching a GPU.
    #[derive(Default)]
    struct RecordingBackend {
        uploads: RefCell<Vec<(String, Vec<u8>)>>,
        releases: RefCell<Vec<usize>>,
    }

    impl MeshBackend for RecordingBackend {
        type Buffer = usize;

        fn upload_vertices(&self, label: &str, vertices: &[MeshVertex]) -> usize {
            let mut uploads = self.uploads.borrow_mut();
            uploads.push((label.to_string(), bytemuck::cast_slice(vertices).to_vec()));
            uploads.len() - 1
        }

        fn release(&self, buffer: usize) {
            self.releases.borrow_mut().push(buffer);
        }
    }

    #[test]
    fn regeneration_with_same_params_is_a_no_op() {
        let backend = RecordingBackend::default();
        let mut registry = MeshRegistry::new();

        assert_eq!(registry.regenerate(&backend, 5, 5), 4);
        assert_eq!(registry.regenerate(&backend, 5, 5), 0);
        assert_eq!(backend.uploads.borrow().len(), 4);
        assert!(backend.releases.borrow().is_empty());

        let sphere = registry.slot(PrimitiveKind::Sphere);
        assert_eq!(sphere.buffer(), Some(&0));
        assert_eq!(sphere.triangle_count(), 50);
    }

    #[test]
    fn repeated_generation_produces_identical_bytes() {
        let first = RecordingBackend::default();
        let second = RecordingBackend::default();
        MeshRegistry::new().regenerate(&first, 4, 9);
        MeshRegistry::new().regenerate(&second, 4, 9);
        assert_eq!(*first.uploads.borrow(), *second.uploads.borrow());
    }

    #[test]
    fn raw_params_that_clamp_equal_do_not_regenerate() {
        let backend = RecordingBackend::default();
        let mut registry = MeshRegistry::new();

        registry.regenerate(&backend, 0, 0);
        // (1, 2) clamps to the same values as (0, 0) for every kind.
        let rebuilt = registry.regenerate(&backend, 1, 2);
        assert_eq!(rebuilt, 0);
        assert_eq!(
            registry.slot(PrimitiveKind::Sphere).params(),
            Some(ShapeParams::new(2, 3))
        );
    }

    #[test]
    fn changed_params_release_the_old_buffer_first() {
        let backend = RecordingBackend::default();
        let mut registry = MeshRegistry::new();

        registry.regenerate(&backend, 2, 3);
        // Only p2 changes, which the cube ignores.
        assert_eq!(registry.regenerate(&backend, 2, 4), 3);
        assert_eq!(backend.releases.borrow().len(), 3);
        assert_eq!(registry.slot(PrimitiveKind::Cube).buffer(), Some(&1));
        assert_eq!(registry.slot(PrimitiveKind::Cone).triangle_count(), 4 * (4 * 2 - 2));
    }

    #[test]
    fn clamped_regeneration_is_never_degenerate() {
        let backend = RecordingBackend::default();
        let mut registry = MeshRegistry::new();

        registry.regenerate(&backend, 0, 0);
        for kind in PrimitiveKind::ALL {
            assert!(!registry.is_degenerate(kind), "{kind:?}");
        }
    }

    #[test]
    fn below_minimum_params_are_degenerate() {
        let mut registry = MeshRegistry::<usize>::new();
        assert!(!registry.is_degenerate(PrimitiveKind::Sphere));

        registry.slots[PrimitiveKind::Sphere.index()] = MeshSlot {
            buffer: Some(0),
            triangle_count: 2,
            params: Some(ShapeParams::new(1, 2)),
        };
        assert!(registry.is_degenerate(PrimitiveKind::Sphere));
        assert!(!registry.is_degenerate(PrimitiveKind::Cube));
    }

    #[test]
    fn release_all_is_idempotent() {
        let backend = RecordingBackend::default();
        let mut registry = MeshRegistry::new();

        registry.regenerate(&backend, 3, 3);
        registry.release_all(&backend);
        registry.release_all(&backend);

        assert_eq!(backend.releases.borrow().len(), 4);
        for kind in PrimitiveKind::ALL {
            assert!(registry.slot(kind).is_empty());
        }
    }
}
