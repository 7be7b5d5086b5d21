//! Thread-safe wrapper for sharing a grid between threads.
//!
//! Both insertion and [`Grid::find_closest`] create blocks, so both take the
//! write lock. Only the read-only operations share the read lock.
//!
//! ```rust
//! use fleetgrid::{Location, SyncGrid};
//! use std::thread;
//!
//! let grid = SyncGrid::new();
//! let writer = grid.clone();
//! thread::spawn(move || writer.add(7u32, Location::new(1.0, 2.0)))
//!     .join()
//!     .unwrap()?;
//!
//! assert_eq!(grid.find_closest(Location::new(1.0, 2.0)).unwrap().payload, 7);
//! # Ok::<(), fleetgrid::FleetError>(())
//! ```

use crate::config::GridConfig;
use crate::error::Result;
use crate::grid::{Entry, Grid, LocationIndex};
use fleetgrid_types::location::Location;
use parking_lot::RwLock;
use std::sync::Arc;

/// `Arc<RwLock<Grid<T>>>` with the grid's operations.
#[derive(Debug)]
pub struct SyncGrid<T> {
    inner: Arc<RwLock<Grid<T>>>,
}

impl<T> Clone for SyncGrid<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SyncGrid<T> {
    pub fn new() -> Self {
        Self::from_grid(Grid::new())
    }

    pub fn with_config(config: GridConfig) -> Self {
        Self::from_grid(Grid::with_config(config))
    }

    pub fn from_grid(grid: Grid<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(grid)),
        }
    }

    pub fn add(&self, payload: T, location: Location) -> Result<()> {
        self.inner.write().add(payload, location)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn count(&self) -> usize {
        self.inner.read().count()
    }

    /// Unwrap the grid if this is the last handle.
    pub fn into_inner(self) -> Option<Grid<T>> {
        Arc::try_unwrap(self.inner).ok().map(RwLock::into_inner)
    }
}

impl<T: Clone> SyncGrid<T> {
    /// See [`Grid::find_closest`]. Holds the write lock.
    pub fn find_closest(&self, location: Location) -> Option<Entry<T>> {
        self.inner.write().find_closest(location).cloned()
    }

    /// See [`Grid::find_closest_exact`]. Holds the read lock.
    pub fn find_closest_exact(&self, location: Location) -> Option<Entry<T>> {
        self.inner.read().find_closest_exact(location).cloned()
    }
}

impl<T> Default for SyncGrid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LocationIndex<T> for SyncGrid<T> {
    fn add(&mut self, payload: T, location: Location) -> Result<()> {
        SyncGrid::add(self, payload, location)
    }
}
