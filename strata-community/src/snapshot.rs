//! Shared, atomically replaceable view of the current hierarchy.

use std::sync::{Arc, RwLock};

use crate::hierarchy::Hierarchy;

/// Readers take an `Arc` to the current hierarchy and keep it for the whole
/// query; a rebuild swaps in a new `Arc` without touching the old one.
#[derive(Debug, Clone, Default)]
pub struct HierarchyHandle {
    inner: Arc<RwLock<Arc<Hierarchy>>>,
}

impl HierarchyHandle {
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(hierarchy))) }
    }

    pub fn load(&self) -> Arc<Hierarchy> {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Install `next` and return the previous snapshot.
    pub fn swap(&self, next: Arc<Hierarchy>) -> Arc<Hierarchy> {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *guard, next)
    }
}
