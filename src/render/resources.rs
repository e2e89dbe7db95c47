//! Handle accounting for transient render resources.
//!
//! Every geometry, material, texture and surface created for one render call
//! is wrapped in a [`Tracked`] handle. Dropping the handle releases it, so a
//! [`RenderContext`] going out of scope frees everything on any exit path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;
use tracing::trace;

/// Kinds of resource a render call allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Geometry,
    Material,
    Texture,
    Surface,
}

/// Counts live handles per kind. Clones share the same counts.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    live: Rc<RefCell<HashMap<ResourceKind, usize>>>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource and get its handle.
    pub fn track<T>(&self, kind: ResourceKind, value: T) -> Tracked<T> {
        *self.live.borrow_mut().entry(kind).or_default() += 1;
        Tracked {
            value,
            kind,
            tracker: self.clone(),
        }
    }

    /// Handles still referenced, all kinds together.
    pub fn live_handles(&self) -> usize {
        self.live.borrow().values().sum()
    }

    /// Handles still referenced of one kind.
    pub fn live(&self, kind: ResourceKind) -> usize {
        self.live.borrow().get(&kind).copied().unwrap_or(0)
    }

    fn release(&self, kind: ResourceKind) {
        if let Some(count) = self.live.borrow_mut().get_mut(&kind) {
            *count = count.saturating_sub(1);
        }
    }
}

/// A resource registered with a [`ResourceTracker`], released on drop.
#[derive(Debug)]
pub struct Tracked<T> {
    value: T,
    kind: ResourceKind,
    tracker: ResourceTracker,
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> std::ops::DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.tracker.release(self.kind);
    }
}

/// All resources of one render call.
pub struct RenderContext<G, M, T, S> {
    tracker: ResourceTracker,
    pub geometries: Vec<Tracked<G>>,
    pub materials: Vec<Tracked<M>>,
    pub textures: HashMap<String, Tracked<T>>,
    pub surface: Option<Tracked<S>>,
}

impl<G, M, T, S> RenderContext<G, M, T, S> {
    pub fn new(tracker: &ResourceTracker) -> Self {
        Self {
            tracker: tracker.clone(),
            geometries: Vec::new(),
            materials: Vec::new(),
            textures: HashMap::new(),
            surface: None,
        }
    }

    /// Add a geometry and return its index.
    pub fn add_geometry(&mut self, geometry: G) -> usize {
        self.geometries
            .push(self.tracker.track(ResourceKind::Geometry, geometry));
        self.geometries.len() - 1
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: M) -> usize {
        self.materials
            .push(self.tracker.track(ResourceKind::Material, material));
        self.materials.len() - 1
    }

    pub fn add_texture(&mut self, key: impl Into<String>, texture: T) {
        self.textures
            .insert(key.into(), self.tracker.track(ResourceKind::Texture, texture));
    }

    pub fn set_surface(&mut self, surface: S) {
        self.surface = Some(self.tracker.track(ResourceKind::Surface, surface));
    }

    /// Handles held by this context.
    pub fn handle_count(&self) -> usize {
        self.geometries.len()
            + self.materials.len()
            + self.textures.len()
            + usize::from(self.surface.is_some())
    }
}

impl<G, M, T, S> Drop for RenderContext<G, M, T, S> {
    fn drop(&mut self) {
        trace!(handles = self.handle_count(), "releasing render context");
    }
}
