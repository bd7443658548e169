// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Identity cache for materialized catalog objects
//!
//! Each container owns one `ObjectCache` per child kind. The cache keeps at
//! most one live object per id: every id has its own slot lock, so concurrent
//! resolutions of the same id are serialized and share one catalog query,
//! while different ids materialize in parallel.
//!
//! Nothing is written to the cache until an object is fully materialized.
//! A cancelled or failed load leaves the cache exactly as it was.

use crate::error::{MetaError, MetaResult};
use crate::gateway::CatalogRow;
use crate::model::{MetaObject, ObjectId};
use crate::monitor::{check_cancelled, ProgressMonitor};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Slot<T> = Arc<Mutex<Option<Arc<T>>>>;

pub struct ObjectCache<T> {
    /// Object kind, for log messages
    label: &'static str,
    /// Per-id slots; an empty slot is a lock placeholder, not an object
    slots: Mutex<HashMap<ObjectId, Slot<T>>>,
    /// Ids of a complete listing, in catalog order
    listing: RwLock<Option<Vec<ObjectId>>>,
    /// Serializes full listings of this container
    batch_lock: Mutex<()>,
}

impl<T: MetaObject> ObjectCache<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            slots: Mutex::new(HashMap::new()),
            listing: RwLock::new(None),
            batch_lock: Mutex::new(()),
        }
    }

    fn slot(&self, id: ObjectId) -> Slot<T> {
        self.slots.lock().entry(id).or_default().clone()
    }

    /// Materialized object for `id`, without loading
    ///
    /// Returns `None` while another thread is still materializing the id.
    pub fn get_cached(&self, id: ObjectId) -> Option<Arc<T>> {
        let slot = self.slots.lock().get(&id).cloned()?;
        let guard = slot.try_lock()?;
        guard.clone()
    }

    /// Return the cached object for `id` or materialize it with `load`
    ///
    /// `load` returns `Ok(None)` when the backend has no row for the id; that
    /// is reported as not-found and nothing is cached.
    pub fn resolve<F>(
        &self,
        monitor: &dyn ProgressMonitor,
        id: ObjectId,
        load: F,
    ) -> MetaResult<Option<Arc<T>>>
    where
        F: FnOnce(&dyn ProgressMonitor) -> MetaResult<Option<T>>,
    {
        if let Some(listing) = self.listing.read().as_ref() {
            if !listing.contains(&id) {
                log::trace!("{} {} is not part of the complete listing", self.label, id);
                return Ok(None);
            }
        }

        let slot = self.slot(id);
        let result = self.fill_slot(monitor, id, &slot, load);
        if !matches!(result, Ok(Some(_))) {
            self.release_placeholder(id, &slot);
        }
        result
    }

    fn fill_slot<F>(
        &self,
        monitor: &dyn ProgressMonitor,
        id: ObjectId,
        slot: &Slot<T>,
        load: F,
    ) -> MetaResult<Option<Arc<T>>>
    where
        F: FnOnce(&dyn ProgressMonitor) -> MetaResult<Option<T>>,
    {
        let mut guard = slot.lock();
        if let Some(existing) = guard.as_ref() {
            return Ok(Some(existing.clone()));
        }

        check_cancelled(monitor)?;
        match load(monitor)? {
            Some(object) => {
                if object.object_id() != id {
                    return Err(MetaError::data_integrity(
                        format!("{} {}", self.label, id),
                        format!("backend returned {} {}", self.label, object.object_id()),
                    ));
                }
                let object = Arc::new(object);
                *guard = Some(object.clone());
                log::debug!("Materialized {} '{}' ({})", self.label, object.name(), id);
                Ok(Some(object))
            }
            None => {
                log::debug!("{} {} not found", self.label, id);
                Ok(None)
            }
        }
    }

    /// Drop the empty slot of `id` unless another resolver still holds it
    ///
    /// Slots are only cloned under the map lock, so a strong count of two
    /// (the map and `slot`) means nobody else is waiting on it.
    fn release_placeholder(&self, id: ObjectId, slot: &Slot<T>) {
        let mut slots = self.slots.lock();
        let unused = slots
            .get(&id)
            .map_or(false, |current| Arc::ptr_eq(current, slot))
            && Arc::strong_count(slot) == 2
            && slot.try_lock().map_or(false, |guard| guard.is_none());
        if unused {
            slots.remove(&id);
            log::trace!("Released placeholder for {} {}", self.label, id);
        }
    }

    /// Load every child of the container from one catalog query
    ///
    /// Rows are materialized in query order and already cached instances are
    /// reused. The monitor is polled between rows; the batch is committed only
    /// after all rows succeeded.
    pub fn load_all<Q, B>(
        &self,
        monitor: &dyn ProgressMonitor,
        id_column: &str,
        fetch: Q,
        mut build: B,
    ) -> MetaResult<Vec<Arc<T>>>
    where
        Q: FnOnce(&dyn ProgressMonitor) -> MetaResult<Vec<CatalogRow>>,
        B: FnMut(&dyn ProgressMonitor, &CatalogRow) -> MetaResult<T>,
    {
        if let Some(objects) = self.complete_listing() {
            return Ok(objects);
        }

        let _batch = self.batch_lock.lock();
        if let Some(objects) = self.complete_listing() {
            return Ok(objects);
        }

        check_cancelled(monitor)?;
        let rows = fetch(monitor)?;

        monitor.begin_task(self.label, rows.len());
        let loaded = self.build_batch(monitor, id_column, &rows, &mut build);
        monitor.done();
        let loaded = loaded?;

        let mut objects = Vec::with_capacity(loaded.len());
        for object in loaded {
            let slot = self.slot(object.object_id());
            let mut guard = slot.lock();
            let object = match guard.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    *guard = Some(object.clone());
                    object
                }
            };
            objects.push(object);
        }

        *self.listing.write() = Some(objects.iter().map(|o| o.object_id()).collect());
        log::debug!("Loaded {} {} objects", objects.len(), self.label);
        Ok(objects)
    }

    fn build_batch<B>(
        &self,
        monitor: &dyn ProgressMonitor,
        id_column: &str,
        rows: &[CatalogRow],
        build: &mut B,
    ) -> MetaResult<Vec<Arc<T>>>
    where
        B: FnMut(&dyn ProgressMonitor, &CatalogRow) -> MetaResult<T>,
    {
        let mut loaded = Vec::with_capacity(rows.len());
        for row in rows {
            check_cancelled(monitor)?;
            let id = row.get_id(id_column)?;
            let object = match self.get_cached(id) {
                Some(existing) => existing,
                None => Arc::new(build(monitor, row)?),
            };
            monitor.worked(1);
            loaded.push(object);
        }
        Ok(loaded)
    }

    fn complete_listing(&self) -> Option<Vec<Arc<T>>> {
        let listing = self.listing.read();
        let ids = listing.as_ref()?;
        let slots: Vec<Option<Slot<T>>> = {
            let map = self.slots.lock();
            ids.iter().map(|id| map.get(id).cloned()).collect()
        };
        slots
            .into_iter()
            .map(|slot| {
                let slot = slot?;
                let object = slot.lock().clone();
                object
            })
            .collect()
    }

    /// Number of materialized objects
    pub fn len(&self) -> usize {
        let slots: Vec<Slot<T>> = self.slots.lock().values().cloned().collect();
        slots
            .iter()
            .filter(|slot| slot.try_lock().map(|g| g.is_some()).unwrap_or(false))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the full child list has been loaded
    pub fn is_complete(&self) -> bool {
        self.listing.read().is_some()
    }

    /// Forget every materialized object
    pub fn invalidate(&self) {
        let _batch = self.batch_lock.lock();
        *self.listing.write() = None;
        self.slots.lock().clear();
        log::debug!("Invalidated {} cache", self.label);
    }
}

impl<T> fmt::Debug for ObjectCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCache")
            .field("label", &self.label)
            .field("complete", &self.listing.read().is_some())
            .finish()
    }
}
