//! Vehicles with a time-ordered track history.

use crate::error::{FleetError, Result};
use fleetgrid_types::location::Location;
use fleetgrid_types::track::Track;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A vehicle identified by its registration, owning its position history.
///
/// Tracks are kept sorted by timestamp; samples with equal timestamps stay
/// in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    registration: String,
    tracks: Vec<Track>,
}

impl Vehicle {
    pub fn new(registration: impl Into<String>) -> Self {
        Self {
            registration: registration.into(),
            tracks: Vec::new(),
        }
    }

    pub fn with_tracks(registration: impl Into<String>, tracks: Vec<Track>) -> Self {
        let mut vehicle = Self::new(registration);
        for track in tracks {
            vehicle.push_track(track);
        }
        vehicle
    }

    pub fn registration(&self) -> &str {
        &self.registration
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Add a sample, keeping the history ordered by timestamp.
    ///
    /// In-order arrival appends in constant time.
    pub fn push_track(&mut self, track: Track) {
        let idx = self
            .tracks
            .partition_point(|t| t.timestamp <= track.timestamp);
        self.tracks.insert(idx, track);
    }

    /// Location of the most recent sample.
    pub fn latest_location(&self) -> Result<Location> {
        self.tracks
            .last()
            .map(|t| t.location)
            .ok_or_else(|| self.no_tracks())
    }

    /// Location of the vehicle at `instant`.
    ///
    /// Clamps to the first/last sample outside the recorded span, returns an
    /// exactly matching sample as is, and otherwise interpolates linearly
    /// between the bracketing samples.
    pub fn location_at(&self, instant: SystemTime) -> Result<Location> {
        let (first, last) = match (self.tracks.first(), self.tracks.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(self.no_tracks()),
        };
        if instant >= last.timestamp {
            return Ok(last.location);
        }
        if instant <= first.timestamp {
            return Ok(first.location);
        }

        // first.timestamp < instant < last.timestamp, so 1 <= idx < len
        let idx = self.tracks.partition_point(|t| t.timestamp < instant);
        let b = &self.tracks[idx];
        if b.timestamp == instant {
            return Ok(b.location);
        }
        let a = &self.tracks[idx - 1];

        let span = seconds_between(a.timestamp, b.timestamp);
        let elapsed = seconds_between(a.timestamp, instant);
        Ok(a.location.lerp(&b.location, elapsed / span))
    }

    fn no_tracks(&self) -> FleetError {
        FleetError::NoTracks {
            registration: self.registration.clone(),
        }
    }
}

fn seconds_between(earlier: SystemTime, later: SystemTime) -> f64 {
    later
        .duration_since(earlier)
        .unwrap_or_default()
        .as_secs_f64()
}
