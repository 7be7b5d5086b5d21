use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One timestamped position sample of a vehicle.
///
/// Samples are immutable once created; a vehicle's history is an ordered
/// sequence of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "positionId")]
    pub position_id: u32,
    pub location: Location,
    pub timestamp: SystemTime,
}

impl Track {
    pub fn new(position_id: u32, location: Location, timestamp: SystemTime) -> Self {
        Self {
            position_id,
            location,
            timestamp,
        }
    }
}
