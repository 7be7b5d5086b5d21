//! Brute-force spatial helpers.
//!
//! These scan every candidate and serve as the ground truth the grid is
//! measured against.

use crate::grid::Entry;
use fleetgrid_types::location::Location;

/// Closest entry to `location` by planar distance, scanning all of them.
///
/// Uses the same strict `<` rule as the grid: the first entry at the minimum
/// distance wins.
///
/// # Examples
///
/// ```rust
/// use fleetgrid::grid::Entry;
/// use fleetgrid::spatial::closest_linear;
/// use fleetgrid::Location;
///
/// let entries = vec![
///     Entry { payload: "north", location: Location::new(10.0, 0.0) },
///     Entry { payload: "south", location: Location::new(-1.0, 0.0) },
/// ];
/// let hit = closest_linear(&entries, &Location::new(0.0, 0.0)).unwrap();
/// assert_eq!(hit.payload, "south");
/// ```
pub fn closest_linear<'a, T: 'a>(
    entries: impl IntoIterator<Item = &'a Entry<T>>,
    location: &Location,
) -> Option<&'a Entry<T>> {
    let mut best: Option<(&Entry<T>, f64)> = None;
    for entry in entries {
        let dist = entry.location.distance(location);
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((entry, dist));
        }
    }
    best.map(|(entry, _)| entry)
}
