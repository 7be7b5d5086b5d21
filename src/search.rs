//! Search requests and their answers.
//!
//! The shapes match the JSON exchanged with callers: a request is
//! `{"location": {"lat": .., "lon": ..}}` and a result repeats the location
//! and adds `closest` when something was found.

use crate::grid::{Entry, Grid};
use crate::vehicle::Vehicle;
use fleetgrid_types::location::Location;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<V> {
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest: Option<V>,
}

/// How [`search_all`] looks up each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// [`Grid::find_closest`]: fast, may miss entries across block edges.
    #[default]
    Approximate,
    /// [`Grid::find_closest_exact`]: true nearest entry.
    Exact,
}

/// A vehicle as placed in a grid built from a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVehicle {
    pub registration: String,
    pub location: Location,
}

impl From<&Entry<&Vehicle>> for ResolvedVehicle {
    fn from(entry: &Entry<&Vehicle>) -> Self {
        Self {
            registration: entry.payload.registration().to_string(),
            location: entry.location,
        }
    }
}

/// Answer every request in order, turning hits into `V` with `project`.
pub fn search_all<T, V, F>(
    grid: &mut Grid<T>,
    requests: &[SearchRequest],
    mode: SearchMode,
    mut project: F,
) -> Vec<SearchResult<V>>
where
    F: FnMut(&Entry<T>) -> V,
{
    requests
        .iter()
        .map(|request| {
            let hit = match mode {
                SearchMode::Approximate => grid.find_closest(request.location),
                SearchMode::Exact => grid.find_closest_exact(request.location),
            };
            SearchResult {
                location: request.location,
                closest: hit.map(&mut project),
            }
        })
        .collect()
}
