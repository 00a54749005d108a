//! Scene context: the single owner of all scene-layer state.
//!
//! One [`SceneContext`] replaces the global per-shape lists: it owns the
//! primitive store, one registry and destination buffer per shape, the
//! bounding tree and the sample set. Renderers talk to it through
//! [`SceneContext::prepare_frame`] and a [`FrameSink`].

use crate::bvh::{AabbNode, AabbTree};
use crate::config::SceneConfig;
use crate::error::{SceneError, SceneResult};
use crate::primitive::{Primitive, PrimitiveId, Shape};
use crate::record::{GeometryRecord, PlaneRecord};
use crate::registry::{Rebuild, RecordBuffer, Registry};
use crate::sampling::SampleSet;
use crate::store::PrimitiveStore;

/// GPU-side storage a registry uploads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferSlot {
    Spheres,
    Boxes,
    Planes,
}

impl BufferSlot {
    pub fn for_shape(shape: Shape) -> Self {
        match shape {
            Shape::Sphere => BufferSlot::Spheres,
            Shape::Box => BufferSlot::Boxes,
            Shape::Plane => BufferSlot::Planes,
        }
    }
}

/// The renderer side of the frame protocol.
///
/// `upload` is only called for buffers whose contents changed; the renderer
/// rewrites that GPU buffer and its element count and nothing else.
pub trait FrameSink {
    fn upload(&mut self, slot: BufferSlot, bytes: &[u8], count: usize);

    /// Called once, on the first frame, with the whole sample set.
    fn upload_samples(&mut self, bytes: &[u8]);

    fn set_sample_offset(&mut self, offset: usize);
}

/// What happened during one [`SceneContext::prepare_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub spheres: Rebuild,
    pub boxes: Rebuild,
    pub planes: Rebuild,
    pub tree_rebuilt: bool,
    pub sample_offset: usize,
}

impl FrameReport {
    pub fn any_uploaded(&self) -> bool {
        self.spheres.changed || self.boxes.changed || self.planes.changed
    }
}

pub struct SceneContext {
    config: SceneConfig,
    store: PrimitiveStore,

    spheres: Registry<GeometryRecord>,
    boxes: Registry<GeometryRecord>,
    planes: Registry<PlaneRecord>,

    sphere_buffer: RecordBuffer<GeometryRecord>,
    box_buffer: RecordBuffer<GeometryRecord>,
    plane_buffer: RecordBuffer<PlaneRecord>,

    tree: AabbTree,
    /// Ids in tree input order at the last build; leaf `data` indexes this
    tree_ids: Vec<PrimitiveId>,
    tree_dirty: bool,

    samples: SampleSet,
    samples_uploaded: bool,
    frame: u64,
}

impl SceneContext {
    pub fn new(config: SceneConfig) -> SceneResult<Self> {
        config
            .validate()
            .map_err(|err| SceneError::InvalidConfig(err.to_string()))?;

        let spheres = Registry::new(Shape::Sphere, config.sphere_capacity)?;
        let boxes = Registry::new(Shape::Box, config.box_capacity)?;
        let planes = Registry::new(Shape::Plane, config.plane_capacity)?;

        log::info!(
            "Scene context: capacities sphere={} box={} plane={}, cursor {:?}",
            config.sphere_capacity,
            config.box_capacity,
            config.plane_capacity,
            config.cursor_step
        );

        Ok(Self {
            sphere_buffer: spheres.create_buffer(),
            box_buffer: boxes.create_buffer(),
            plane_buffer: planes.create_buffer(),
            spheres,
            boxes,
            planes,
            store: PrimitiveStore::new(),
            tree: AabbTree::new(),
            tree_ids: Vec::new(),
            tree_dirty: true,
            samples: SampleSet::new(),
            samples_uploaded: false,
            frame: 0,
            config,
        })
    }

    /// Take ownership of a primitive and register it with its shape's registry.
    ///
    /// Nothing is stored if registration is refused.
    pub fn spawn(&mut self, primitive: Primitive) -> SceneResult<PrimitiveId> {
        let shape = primitive.shape;
        let id = self.store.insert(primitive);
        let Some(primitive) = self.store.get(id) else {
            return Err(SceneError::UnknownPrimitive(id));
        };

        let registered = match shape {
            Shape::Sphere => self.spheres.register(id, primitive),
            Shape::Box => self.boxes.register(id, primitive),
            Shape::Plane => self.planes.register(id, primitive),
        };
        if let Err(err) = registered {
            self.store.remove(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Deregister and drop a primitive. Unknown ids are ignored.
    pub fn despawn(&mut self, id: PrimitiveId) -> Option<Primitive> {
        let Some(primitive) = self.store.remove(id) else {
            log::warn!("Despawn of unknown primitive {}", id);
            return None;
        };

        match primitive.shape {
            Shape::Sphere => self.spheres.deregister(id),
            Shape::Box => self.boxes.deregister(id),
            Shape::Plane => self.planes.deregister(id),
        };
        Some(primitive)
    }

    /// Mutate a live primitive in place and mark its registry dirty.
    ///
    /// The shape of a primitive is fixed at spawn; a changed `shape` is
    /// reverted. Despawn and respawn to change kind.
    pub fn edit<T, F>(&mut self, id: PrimitiveId, f: F) -> SceneResult<T>
    where
        F: FnOnce(&mut Primitive) -> T,
    {
        let primitive = self
            .store
            .get_mut(id)
            .ok_or(SceneError::UnknownPrimitive(id))?;

        let shape = primitive.shape;
        let result = f(primitive);
        if primitive.shape != shape {
            log::warn!("Shape of {} cannot change in place, keeping {:?}", id, shape);
            primitive.shape = shape;
        }

        match shape {
            Shape::Sphere => self.spheres.mark_dirty(),
            Shape::Box => self.boxes.mark_dirty(),
            Shape::Plane => self.planes.mark_dirty(),
        }
        Ok(result)
    }

    /// Run the per-frame sequence: rebuild and upload dirty registries,
    /// rebuild the tree if sphere or box geometry changed, then advance the
    /// sample cursor.
    ///
    /// A registry that fails (capacity overflow) does not stop the others or
    /// the cursor; it stays dirty and the first such error is returned after
    /// the frame completes.
    pub fn prepare_frame<S: FrameSink + ?Sized>(
        &mut self,
        dt: f32,
        sink: &mut S,
    ) -> SceneResult<FrameReport> {
        self.frame += 1;
        let mut first_error: Option<SceneError> = None;

        if !self.samples_uploaded {
            sink.upload_samples(self.samples.as_bytes());
            self.samples_uploaded = true;
        }

        let spheres = upload_or_record(
            self.spheres.rebuild_if_dirty(&self.store, &mut self.sphere_buffer),
            BufferSlot::Spheres,
            self.sphere_buffer.as_bytes(),
            sink,
            &mut first_error,
        );
        let boxes = upload_or_record(
            self.boxes.rebuild_if_dirty(&self.store, &mut self.box_buffer),
            BufferSlot::Boxes,
            self.box_buffer.as_bytes(),
            sink,
            &mut first_error,
        );
        let planes = upload_or_record(
            self.planes.rebuild_if_dirty(&self.store, &mut self.plane_buffer),
            BufferSlot::Planes,
            self.plane_buffer.as_bytes(),
            sink,
            &mut first_error,
        );

        // The tree indexes into the uploaded sphere and box buffers, so it
        // waits until both are consistent with the live lists.
        self.tree_dirty |= spheres.changed || boxes.changed;
        let geometry_consistent = !self.spheres.is_dirty() && !self.boxes.is_dirty();
        let tree_rebuilt = self.config.build_tree && self.tree_dirty && geometry_consistent;
        if tree_rebuilt {
            self.rebuild_tree();
        }

        let sample_offset = self.samples.advance_frame(&self.config.cursor_step, dt);
        sink.set_sample_offset(sample_offset);

        let report = FrameReport {
            frame: self.frame,
            spheres,
            boxes,
            planes,
            tree_rebuilt,
            sample_offset,
        };
        if report.any_uploaded() {
            log::debug!("Frame {}: {:?}", self.frame, report);
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }

    fn rebuild_tree(&mut self) {
        let inputs: Vec<(PrimitiveId, &Primitive)> = self
            .spheres
            .primitives(&self.store)
            .chain(self.boxes.primitives(&self.store))
            .collect();

        self.tree.build(inputs.iter().map(|&(_, p)| p));
        self.tree_ids.clear();
        self.tree_ids.extend(inputs.iter().map(|&(id, _)| id));
        self.tree_dirty = false;

        log::debug!(
            "Rebuilt bounding tree: {} nodes, depth {}",
            self.tree.len(),
            self.tree.depth()
        );
    }

    /// Resolve a leaf of the current tree back to its primitive.
    ///
    /// Leaf indices count spheres first, then boxes, both in registration
    /// order as of the last tree build. Spawns and despawns since then do not
    /// shift the mapping.
    pub fn leaf_primitive(&self, node: &AabbNode) -> Option<PrimitiveId> {
        self.tree_ids.get(node.data_index()?).copied()
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.store.get(id)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn store(&self) -> &PrimitiveStore {
        &self.store
    }

    pub fn spheres(&self) -> &Registry<GeometryRecord> {
        &self.spheres
    }

    pub fn boxes(&self) -> &Registry<GeometryRecord> {
        &self.boxes
    }

    pub fn planes(&self) -> &Registry<PlaneRecord> {
        &self.planes
    }

    pub fn sphere_buffer(&self) -> &RecordBuffer<GeometryRecord> {
        &self.sphere_buffer
    }

    pub fn box_buffer(&self) -> &RecordBuffer<GeometryRecord> {
        &self.box_buffer
    }

    pub fn plane_buffer(&self) -> &RecordBuffer<PlaneRecord> {
        &self.plane_buffer
    }

    pub fn tree(&self) -> &AabbTree {
        &self.tree
    }

    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

fn upload_or_record<S: FrameSink + ?Sized>(
    result: SceneResult<Rebuild>,
    slot: BufferSlot,
    bytes: &[u8],
    sink: &mut S,
    first_error: &mut Option<SceneError>,
) -> Rebuild {
    match result {
        Ok(rebuild) => {
            if rebuild.changed {
                sink.upload(slot, bytes, rebuild.count);
            }
            rebuild
        }
        Err(err) => {
            log::warn!("Skipping {:?} upload: {}", slot, err);
            first_error.get_or_insert(err);
            Rebuild::UNCHANGED
        }
    }
}
