//! Binary vehicle position feeds indexed in a self-growing quadtree.
//!
//! ```rust
//! use fleetgrid::{Grid, Location};
//!
//! let mut grid = Grid::new();
//! grid.add("AB-123", Location::new(52.37, 4.89))?;
//! grid.add("CD-456", Location::new(48.85, 2.35))?;
//!
//! let closest = grid.find_closest(Location::new(52.0, 4.0)).unwrap();
//! assert_eq!(closest.payload, "AB-123");
//! # Ok::<(), fleetgrid::FleetError>(())
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod loader;
pub mod record;
pub mod registry;
pub mod search;
pub mod spatial;
pub mod sync;
pub mod vehicle;

pub use config::{Config, GridConfig, LoadConfig};
pub use error::{FleetError, Result};
pub use grid::{Block, BlockId, Entry, Grid, LocationIndex};
pub use loader::{LoadStats, Loader};
pub use record::{PositionRecord, RECORD_SIZE, RecordReader};
pub use registry::{BuildStats, VehicleRegistry};
pub use search::{ResolvedVehicle, SearchMode, SearchRequest, SearchResult, search_all};
pub use spatial::closest_linear;
pub use sync::SyncGrid;
pub use vehicle::Vehicle;

pub use fleetgrid_types::{Location, Track};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{FleetError, Result};

    pub use crate::{Grid, LocationIndex, SyncGrid};

    pub use crate::{Location, PositionRecord, Track, Vehicle, VehicleRegistry};

    pub use crate::{Config, Loader};

    pub use std::time::{Duration, SystemTime, UNIX_EPOCH};
}
