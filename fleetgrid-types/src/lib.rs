//! # fleetgrid-types
//!
//! Value types shared by the fleetgrid loader and index.
//!
//! - **Location**: a latitude/longitude pair in degrees with planar distance
//! - **Track**: one timestamped position sample of a vehicle
//!
//! All types are serializable with Serde and convert to and from the `geo`
//! crate's `Point`.
//!
//! ## Examples
//!
//! ```rust
//! use fleetgrid_types::location::Location;
//! use fleetgrid_types::track::Track;
//! use std::time::UNIX_EPOCH;
//!
//! let depot = Location::new(-33.92, 18.42);
//! let sample = Track::new(7, depot, UNIX_EPOCH);
//! assert!(sample.location.is_valid());
//! ```

pub mod location;
pub mod track;

pub use location::Location;
pub use track::Track;
