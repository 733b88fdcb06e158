//! Object pools
//!
//! Entries are created up front from prototypes and toggled between active
//! and inactive instead of being allocated and dropped during play. Entries
//! are never destroyed; a growable pool only ever gets larger.

use neon_core::{EntityId, Rect, Vec2};
use rand::Rng;
use tracing::{debug, warn};

/// Anything a pool can hold
pub trait Poolable: Clone {
    fn body(&self) -> &Rect;
    fn body_mut(&mut self) -> &mut Rect;

    fn set_position(&mut self, position: Vec2) {
        self.body_mut().center = position;
    }
}

/// What a pool does when every entry is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolMode {
    /// Acquisition fails
    Fixed,
    /// A new entry is cloned from the first prototype
    Growable,
}

/// Handle to one pool entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: usize,
    id: EntityId,
}

impl PoolHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> EntityId {
        self.id
    }
}

struct PoolEntry<T> {
    id: EntityId,
    active: bool,
    item: T,
}

pub struct ObjectPool<T> {
    name: &'static str,
    mode: PoolMode,
    prototypes: Vec<T>,
    parent: Option<Vec2>,
    entries: Vec<PoolEntry<T>>,
}

impl<T: Poolable> ObjectPool<T> {
    pub fn new(name: &'static str, mode: PoolMode) -> Self {
        Self {
            name,
            mode,
            prototypes: Vec::new(),
            parent: None,
            entries: Vec::new(),
        }
    }

    /// Replace the pool contents with `count_per_prototype` inactive copies of
    /// each prototype, in prototype order. Entries start at `parent`, or the
    /// origin when there is none.
    pub fn initialize(&mut self, prototypes: Vec<T>, count_per_prototype: usize, parent: Option<Vec2>) {
        self.prototypes = prototypes;
        self.parent = parent;
        self.entries.clear();
        for proto_index in 0..self.prototypes.len() {
            for _ in 0..count_per_prototype {
                self.instantiate(proto_index);
            }
        }
        debug!(pool = self.name, size = self.entries.len(), "pool initialized");
    }

    fn instantiate(&mut self, proto_index: usize) -> usize {
        let mut item = self.prototypes[proto_index].clone();
        item.set_position(self.parent.unwrap_or(Vec2::ZERO));
        self.entries.push(PoolEntry {
            id: EntityId::new(),
            active: false,
            item,
        });
        self.entries.len() - 1
    }

    fn handle(&self, index: usize) -> PoolHandle {
        PoolHandle {
            index,
            id: self.entries[index].id,
        }
    }

    /// First inactive entry in creation order. A growable pool creates one
    /// when none is free. The entry is not activated.
    pub fn acquire_first_inactive(&mut self) -> Option<PoolHandle> {
        if let Some(index) = self.entries.iter().position(|e| !e.active) {
            return Some(self.handle(index));
        }
        match self.mode {
            PoolMode::Fixed => {
                debug!(pool = self.name, "pool exhausted");
                None
            }
            PoolMode::Growable if self.prototypes.is_empty() => {
                warn!(pool = self.name, "cannot grow a pool without prototypes");
                None
            }
            PoolMode::Growable => {
                let index = self.instantiate(0);
                debug!(pool = self.name, size = self.entries.len(), "pool grew");
                Some(self.handle(index))
            }
        }
    }

    /// Uniformly random inactive entry. Never grows.
    pub fn acquire_random_inactive<R: Rng>(&mut self, rng: &mut R) -> Option<PoolHandle> {
        let inactive: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.active)
            .map(|(i, _)| i)
            .collect();
        match inactive.len() {
            0 => None,
            1 => Some(self.handle(inactive[0])),
            n => Some(self.handle(inactive[rng.gen_range(0..n)])),
        }
    }

    fn entry(&self, handle: PoolHandle) -> Option<&PoolEntry<T>> {
        self.entries.get(handle.index).filter(|e| e.id == handle.id)
    }

    fn entry_mut(&mut self, handle: PoolHandle) -> Option<&mut PoolEntry<T>> {
        self.entries.get_mut(handle.index).filter(|e| e.id == handle.id)
    }

    pub fn activate(&mut self, handle: PoolHandle) {
        if let Some(entry) = self.entry_mut(handle) {
            entry.active = true;
        }
    }

    pub fn deactivate(&mut self, handle: PoolHandle) {
        if let Some(entry) = self.entry_mut(handle) {
            entry.active = false;
        }
    }

    /// Mark every entry inactive. Nothing else about the entries changes.
    pub fn deactivate_all(&mut self) {
        for entry in &mut self.entries {
            entry.active = false;
        }
    }

    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.entry(handle).map(|e| e.active).unwrap_or(false)
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.entry(handle).map(|e| &e.item)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.entry_mut(handle).map(|e| &mut e.item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.active).count()
    }

    pub fn mode(&self) -> PoolMode {
        self.mode
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.active)
            .map(|(index, e)| (PoolHandle { index, id: e.id }, &e.item))
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter(|(_, e)| e.active)
            .map(|(index, e)| (PoolHandle { index, id: e.id }, &mut e.item))
    }
}
