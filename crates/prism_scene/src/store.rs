//! Owning arena for primitives.
//!
//! The store plays the part of the scene graph: it owns every primitive,
//! while registries only hold [`PrimitiveId`]s. Ids are never reused, so a
//! stale id cannot alias a newer primitive.

use std::collections::HashMap;

use crate::primitive::{Primitive, PrimitiveId};

#[derive(Debug, Default)]
pub struct PrimitiveStore {
    primitives: HashMap<PrimitiveId, Primitive>,
    next_id: u64,
}

impl PrimitiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a primitive and return its handle.
    pub fn insert(&mut self, primitive: Primitive) -> PrimitiveId {
        self.next_id += 1;
        let id = PrimitiveId(self.next_id);
        self.primitives.insert(id, primitive);
        id
    }

    pub fn remove(&mut self, id: PrimitiveId) -> Option<Primitive> {
        self.primitives.remove(&id)
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&id)
    }

    pub fn get_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.primitives.get_mut(&id)
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.primitives.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Iterate in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.primitives.iter().map(|(id, p)| (*id, p))
    }
}
