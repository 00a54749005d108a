//! Dirty-tracked registry of one primitive kind.
//!
//! A registry keeps the live primitives of one [`Shape`] in registration
//! order and rebuilds its record array only when something changed since the
//! last successful rebuild:
//!
//! ```text
//!            register / deregister / mark_dirty
//!   Clean ───────────────────────────────────────▶ Dirty
//!     ▲                                              │
//!     └────────── rebuild_if_dirty (success) ────────┘
//! ```
//!
//! Registries start dirty so the first poll always uploads, even when empty.
//! Any number of mutations between two polls collapse into one rebuild.

use std::marker::PhantomData;

use crate::error::{SceneError, SceneResult};
use crate::primitive::{Primitive, PrimitiveId, Shape};
use crate::record::GpuRecord;
use crate::store::PrimitiveStore;

/// Outcome of [`Registry::rebuild_if_dirty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rebuild {
    /// True when the destination buffer was rewritten and must be re-uploaded.
    pub changed: bool,
    /// Number of records written; zero when nothing changed.
    pub count: usize,
}

impl Rebuild {
    pub const UNCHANGED: Rebuild = Rebuild {
        changed: false,
        count: 0,
    };
}

/// Fixed-capacity destination storage for one registry.
///
/// Mirrors the GPU buffer the renderer allocated: the capacity never changes
/// and the record count never exceeds it.
#[derive(Debug, Clone)]
pub struct RecordBuffer<R: GpuRecord> {
    records: Vec<R>,
    capacity: usize,
}

impl<R: GpuRecord> RecordBuffer<R> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Raw bytes of the live records, `len() * R::STRIDE` long.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    /// Size in bytes of the full allocation the renderer must reserve.
    pub fn capacity_bytes(&self) -> usize {
        self.capacity * R::STRIDE
    }

    fn replace(&mut self, records: Vec<R>) {
        debug_assert!(records.len() <= self.capacity);
        self.records = records;
    }
}

/// Live primitives of one shape plus the dirty flag guarding their records.
#[derive(Debug)]
pub struct Registry<R: GpuRecord> {
    shape: Shape,
    live: Vec<PrimitiveId>,
    dirty: bool,
    capacity: usize,
    _record: PhantomData<R>,
}

impl<R: GpuRecord> Registry<R> {
    /// Create a registry for `shape` holding at most `capacity` primitives.
    ///
    /// Fails if the record type cannot encode `shape`.
    pub fn new(shape: Shape, capacity: usize) -> SceneResult<Self> {
        if !R::accepts(shape) {
            return Err(SceneError::KindMismatch {
                registry: std::any::type_name::<R>(),
                shape,
            });
        }

        Ok(Self {
            shape,
            live: Vec::new(),
            dirty: true,
            capacity,
            _record: PhantomData,
        })
    }

    /// A destination buffer sized to this registry's capacity.
    pub fn create_buffer(&self) -> RecordBuffer<R> {
        RecordBuffer::with_capacity(self.capacity)
    }

    pub fn name(&self) -> &'static str {
        self.shape.name()
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.live.contains(&id)
    }

    /// Live ids in registration order.
    pub fn ids(&self) -> &[PrimitiveId] {
        &self.live
    }

    /// Append a primitive to the live list.
    ///
    /// Primitives of another shape or without a material are refused and leave
    /// the registry untouched. Registering an id twice is a no-op.
    pub fn register(&mut self, id: PrimitiveId, primitive: &Primitive) -> SceneResult<()> {
        if primitive.shape != self.shape {
            return Err(SceneError::KindMismatch {
                registry: self.name(),
                shape: primitive.shape,
            });
        }
        if primitive.material.is_none() {
            return Err(SceneError::UnboundMaterial(primitive.shape));
        }
        if self.contains(id) {
            log::debug!("{} {} already registered", self.name(), id);
            return Ok(());
        }

        self.live.push(id);
        self.dirty = true;
        Ok(())
    }

    /// Remove a primitive by identity, keeping the order of the others.
    ///
    /// Returns false (and stays clean) if the id was not registered.
    pub fn deregister(&mut self, id: PrimitiveId) -> bool {
        match self.live.iter().position(|&live| live == id) {
            Some(index) => {
                self.live.remove(index);
                self.dirty = true;
                true
            }
            None => {
                log::warn!("{} {} is not registered", self.name(), id);
                false
            }
        }
    }

    /// Flag an in-place edit of a live primitive.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Live primitives in registration order, resolved through the store.
    pub fn primitives<'a>(
        &'a self,
        store: &'a PrimitiveStore,
    ) -> impl Iterator<Item = (PrimitiveId, &'a Primitive)> + 'a {
        self.live
            .iter()
            .filter_map(move |&id| store.get(id).map(|p| (id, p)))
    }

    /// Re-encode every live primitive into `buffer` if anything changed.
    ///
    /// The clean path does no work and returns [`Rebuild::UNCHANGED`]. On any
    /// error the buffer is left as it was and the registry stays dirty, so
    /// the next poll retries.
    pub fn rebuild_if_dirty(
        &mut self,
        store: &PrimitiveStore,
        buffer: &mut RecordBuffer<R>,
    ) -> SceneResult<Rebuild> {
        if !self.dirty {
            return Ok(Rebuild::UNCHANGED);
        }

        let capacity = self.capacity.min(buffer.capacity());
        if self.live.len() > capacity {
            return Err(SceneError::CapacityOverflow {
                registry: self.name(),
                live: self.live.len(),
                capacity,
            });
        }

        let records = self
            .live
            .iter()
            .map(|&id| {
                store
                    .get(id)
                    .map(R::encode)
                    .ok_or(SceneError::UnknownPrimitive(id))
            })
            .collect::<SceneResult<Vec<R>>>()?;

        let count = records.len();
        buffer.replace(records);
        self.dirty = false;

        log::debug!("Rebuilt {} records ({} live)", self.name(), count);
        Ok(Rebuild {
            changed: true,
            count,
        })
    }
}
