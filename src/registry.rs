//! Vehicles accumulated by registration, and grids built from them.
//!
//! The registry lives for one batch load; it replaces any process-wide map
//! of vehicles. Once loading finishes, a grid can be materialized for any
//! instant by resolving every vehicle's location at that instant.

use crate::config::GridConfig;
use crate::error::Result;
use crate::grid::Grid;
use crate::record::PositionRecord;
use crate::vehicle::Vehicle;
use fleetgrid_types::location::Location;
use rustc_hash::FxHashMap;
use std::time::{Instant, SystemTime};

/// Outcome of building a grid from a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Vehicles placed in the grid.
    pub inserted: usize,
    /// Vehicles left out because they had no tracks.
    pub skipped: usize,
}

/// Registration to vehicle map.
#[derive(Debug, Default)]
pub struct VehicleRegistry {
    vehicles: FxHashMap<String, Vehicle>,
}

impl VehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn get(&self, registration: &str) -> Option<&Vehicle> {
        self.vehicles.get(registration)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Total number of track samples across all vehicles.
    pub fn track_count(&self) -> usize {
        self.vehicles.values().map(Vehicle::track_count).sum()
    }

    /// Add a vehicle, replacing any vehicle with the same registration.
    pub fn insert(&mut self, vehicle: Vehicle) -> Option<Vehicle> {
        self.vehicles
            .insert(vehicle.registration().to_string(), vehicle)
    }

    /// Append the record's sample to the vehicle with its registration,
    /// creating the vehicle on first sight.
    pub fn record(&mut self, record: PositionRecord) -> &Vehicle {
        let track = record.to_track();
        let vehicle = self
            .vehicles
            .entry(record.registration)
            .or_insert_with_key(|reg| Vehicle::new(reg.clone()));
        vehicle.push_track(track);
        vehicle
    }

    /// Grid of every vehicle at its location at `instant`.
    pub fn grid_at(&self, instant: SystemTime) -> Result<(Grid<&Vehicle>, BuildStats)> {
        self.grid_at_with_config(instant, GridConfig::default())
    }

    pub fn grid_at_with_config(
        &self,
        instant: SystemTime,
        config: GridConfig,
    ) -> Result<(Grid<&Vehicle>, BuildStats)> {
        self.build_grid(config, |vehicle| vehicle.location_at(instant))
    }

    /// Grid of every vehicle at its most recent location.
    pub fn grid_latest(&self) -> Result<(Grid<&Vehicle>, BuildStats)> {
        self.grid_latest_with_config(GridConfig::default())
    }

    pub fn grid_latest_with_config(
        &self,
        config: GridConfig,
    ) -> Result<(Grid<&Vehicle>, BuildStats)> {
        self.build_grid(config, Vehicle::latest_location)
    }

    fn build_grid<F>(&self, config: GridConfig, resolve: F) -> Result<(Grid<&Vehicle>, BuildStats)>
    where
        F: Fn(&Vehicle) -> Result<Location>,
    {
        let started = Instant::now();
        let mut grid = Grid::with_config(config);
        let mut stats = BuildStats::default();

        for vehicle in self.vehicles.values() {
            let location = match resolve(vehicle) {
                Ok(location) => location,
                Err(e) if e.is_skippable() => {
                    log::warn!("Skipping vehicle: {}", e);
                    stats.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            grid.add(vehicle, location)?;
            stats.inserted += 1;
        }

        log::info!(
            "Built grid of {} vehicles ({} skipped, {} blocks) in {:?}",
            stats.inserted,
            stats.skipped,
            grid.block_count(),
            started.elapsed()
        );
        Ok((grid, stats))
    }
}
