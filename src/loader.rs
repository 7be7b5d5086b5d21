//! Batch loading of binary position feeds.
//!
//! Two modes share one streaming pass over the file:
//!
//! - **direct**: every record is inserted into a [`LocationIndex`] as its own
//!   entry; records sharing a registration are not merged.
//! - **tracks**: records are grouped by registration into a
//!   [`VehicleRegistry`], from which grids are built afterwards.
//!
//! A partial record at the end of the input ends the load quietly unless
//! strict mode is on.

use crate::config::LoadConfig;
use crate::error::{FleetError, Result};
use crate::grid::LocationIndex;
use crate::record::{PositionRecord, RECORD_SIZE, RecordReader};
use crate::registry::VehicleRegistry;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

const PROGRESS_INTERVAL: usize = 100_000;

/// Figures gathered while loading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadStats {
    /// Records decoded and accepted.
    pub records: usize,
    /// Direct mode: entries inserted. Tracks mode: distinct registrations.
    pub vehicles: usize,
    pub min_timestamp: Option<SystemTime>,
    pub max_timestamp: Option<SystemTime>,
    /// Longest track history seen (tracks mode only).
    pub max_tracks_per_vehicle: usize,
    /// Bytes of an incomplete final record that were ignored.
    pub trailing_bytes: usize,
    pub elapsed: Duration,
}

impl LoadStats {
    fn observe(&mut self, timestamp: SystemTime) {
        if self.min_timestamp.is_none_or(|min| timestamp < min) {
            self.min_timestamp = Some(timestamp);
        }
        if self.max_timestamp.is_none_or(|max| timestamp > max) {
            self.max_timestamp = Some(timestamp);
        }
    }
}

/// Reads position feeds according to a [`LoadConfig`].
#[derive(Debug, Clone, Default)]
pub struct Loader {
    config: LoadConfig,
}

impl Loader {
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Load `path` in direct mode into `index`.
    ///
    /// Open/read failures and rejected records abort the load.
    pub fn load_direct<P, I>(&self, path: P, index: &mut I) -> Result<LoadStats>
    where
        P: AsRef<Path>,
        I: LocationIndex<PositionRecord>,
    {
        let file = self.open(path.as_ref())?;
        self.load_direct_from(BufReader::new(file), index)
    }

    pub fn load_direct_from<R, I>(&self, reader: R, index: &mut I) -> Result<LoadStats>
    where
        R: Read,
        I: LocationIndex<PositionRecord>,
    {
        self.stream(reader, |record, stats| {
            let location = record.location;
            index.add(record, location)?;
            stats.vehicles += 1;
            Ok(())
        })
    }

    /// Load `path` in tracks mode, accumulating samples into `registry`.
    pub fn load_tracks<P: AsRef<Path>>(
        &self,
        path: P,
        registry: &mut VehicleRegistry,
    ) -> Result<LoadStats> {
        let file = self.open(path.as_ref())?;
        self.load_tracks_from(BufReader::new(file), registry)
    }

    pub fn load_tracks_from<R: Read>(
        &self,
        reader: R,
        registry: &mut VehicleRegistry,
    ) -> Result<LoadStats> {
        let mut stats = self.stream(reader, |record, stats| {
            let vehicle = registry.record(record);
            stats.max_tracks_per_vehicle = stats.max_tracks_per_vehicle.max(vehicle.track_count());
            Ok(())
        })?;
        stats.vehicles = registry.len();
        log::info!(
            "Max tracks per vehicle is {} across {} vehicles",
            stats.max_tracks_per_vehicle,
            stats.vehicles
        );
        Ok(stats)
    }

    fn open(&self, path: &Path) -> Result<File> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        log::debug!("Opened {} ({} bytes)", path.display(), size);

        let trailing = (size % RECORD_SIZE as u64) as usize;
        if trailing != 0 && self.config.strict {
            return Err(FleetError::TruncatedFile { trailing });
        }
        Ok(file)
    }

    fn stream<R, F>(&self, reader: R, mut sink: F) -> Result<LoadStats>
    where
        R: Read,
        F: FnMut(PositionRecord, &mut LoadStats) -> Result<()>,
    {
        let started = Instant::now();
        let mut reader = RecordReader::new(reader);
        let mut stats = LoadStats::default();

        while self.config.limit == 0 || stats.records < self.config.limit {
            let offset = reader.offset();
            let record = match reader.read_record() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(FleetError::MalformedRecord { len }) => {
                    stats.trailing_bytes = len;
                    if self.config.strict {
                        return Err(FleetError::TruncatedFile { trailing: len });
                    }
                    log::warn!("Ignoring {} trailing bytes at offset {}", len, offset);
                    break;
                }
                Err(e) => return Err(e),
            };

            let timestamp = record.timestamp;
            if let Err(e) = sink(record, &mut stats) {
                log::error!("Record {} at offset {}: {}", stats.records, offset, e);
                return Err(e);
            }
            stats.observe(timestamp);
            stats.records += 1;
            if stats.records % PROGRESS_INTERVAL == 0 {
                log::debug!("Loaded {} records", stats.records);
            }
        }

        stats.elapsed = started.elapsed();
        log::info!(
            "Loaded {} records spanning {:?}..{:?} in {:?}",
            stats.records,
            stats.min_timestamp,
            stats.max_timestamp,
            stats.elapsed
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use fleetgrid_types::location::Location;
    use std::io::Cursor;
    use std::time::UNIX_EPOCH;

    fn feed(records: &[(u32, &str, u64, f64, f64)]) -> Vec<u8> {
        let mut data = Vec::new();
        for &(id, reg, secs, lat, lon) in records {
            PositionRecord::new(
                id,
                reg,
                Location::new(lat, lon),
                UNIX_EPOCH + Duration::from_secs(secs),
            )
            .write_to(&mut data)
            .unwrap();
        }
        data
    }

    /// Collects everything it is given.
    #[derive(Default)]
    struct Recorder(Vec<(PositionRecord, Location)>);

    impl LocationIndex<PositionRecord> for Recorder {
        fn add(&mut self, payload: PositionRecord, location: Location) -> Result<()> {
            self.0.push((payload, location));
            Ok(())
        }
    }

    #[test]
    fn test_direct_mode_keeps_duplicates() {
        let data = feed(&[
            (1, "AAA111", 10, 1.0, 1.0),
            (2, "AAA111", 20, 2.0, 2.0),
            (3, "BBB222", 30, 3.0, 3.0),
        ]);
        let mut recorder = Recorder::default();
        let stats = Loader::default()
            .load_direct_from(Cursor::new(data), &mut recorder)
            .unwrap();

        assert_eq!(stats.records, 3);
        assert_eq!(stats.vehicles, 3);
        assert_eq!(recorder.0.len(), 3);
        assert_eq!(recorder.0[1].0.position_id, 2);
        assert_eq!(recorder.0[1].1, Location::new(2.0, 2.0));
        assert_eq!(stats.min_timestamp, Some(UNIX_EPOCH + Duration::from_secs(10)));
        assert_eq!(stats.max_timestamp, Some(UNIX_EPOCH + Duration::from_secs(30)));
    }

    #[test]
    fn test_limit_stops_early() {
        let data = feed(&[
            (1, "A", 1, 1.0, 1.0),
            (2, "B", 2, 2.0, 2.0),
            (3, "C", 3, 3.0, 3.0),
        ]);
        let mut grid = Grid::new();
        let stats = Loader::new(LoadConfig::default().with_limit(2))
            .load_direct_from(Cursor::new(data), &mut grid)
            .unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(grid.count(), 2);
    }

    #[test]
    fn test_partial_tail_is_end_of_stream() {
        let mut data = feed(&[(1, "A", 1, 1.0, 1.0)]);
        data.extend_from_slice(&[0u8; 12]);

        let mut grid = Grid::new();
        let stats = Loader::default()
            .load_direct_from(Cursor::new(data), &mut grid)
            .unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.trailing_bytes, 12);
    }

    #[test]
    fn test_partial_tail_fails_in_strict_mode() {
        let mut data = feed(&[(1, "A", 1, 1.0, 1.0)]);
        data.extend_from_slice(&[0u8; 12]);

        let mut grid = Grid::new();
        let err = Loader::new(LoadConfig::default().with_strict(true))
            .load_direct_from(Cursor::new(data), &mut grid)
            .unwrap_err();
        assert!(matches!(err, FleetError::TruncatedFile { trailing: 12 }));
    }

    #[test]
    fn test_invalid_location_aborts_direct_load() {
        let data = feed(&[(1, "A", 1, 1.0, 1.0), (2, "B", 2, 91.0, 1.0), (3, "C", 3, 3.0, 3.0)]);
        let mut grid = Grid::new();
        let err = Loader::default()
            .load_direct_from(Cursor::new(data), &mut grid)
            .unwrap_err();
        assert!(matches!(err, FleetError::InvalidLocation { .. }));
        assert_eq!(grid.count(), 1);
    }

    #[test]
    fn test_tracks_mode_groups_by_registration() {
        let data = feed(&[
            (1, "AAA111", 10, 1.0, 1.0),
            (2, "BBB222", 10, 5.0, 5.0),
            (3, "AAA111", 20, 2.0, 2.0),
            (4, "AAA111", 15, 1.5, 1.5),
        ]);
        let mut registry = VehicleRegistry::new();
        let stats = Loader::default()
            .load_tracks_from(Cursor::new(data), &mut registry)
            .unwrap();

        assert_eq!(stats.records, 4);
        assert_eq!(stats.vehicles, 2);
        assert_eq!(stats.max_tracks_per_vehicle, 3);

        let ids: Vec<u32> = registry
            .get("AAA111")
            .unwrap()
            .tracks()
            .iter()
            .map(|t| t.position_id)
            .collect();
        assert_eq!(ids, vec![1, 4, 3]);
    }

    #[test]
    fn test_empty_input() {
        let mut registry = VehicleRegistry::new();
        let stats = Loader::default()
            .load_tracks_from(Cursor::new(Vec::new()), &mut registry)
            .unwrap();
        assert_eq!(stats.records, 0);
        assert!(stats.min_timestamp.is_none());
        assert!(registry.is_empty());
    }
}
