use fleetgrid_types::location::Location;
use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length in degrees of the first block a grid creates.
pub const BASE_BLOCK_SIZE: f64 = 1.0;

/// Handle of a block inside its grid's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) usize);

/// A payload stored in the grid together with the location it was indexed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub payload: T,
    pub location: Location,
}

/// One square node of the grid.
///
/// Bounds are half-open: `[min_lat, max_lat) x [min_lon, max_lon)`. A block
/// is either a leaf holding entries or an internal node with up to four
/// quadrant children; it never holds both outside of a split.
///
/// Quadrants are numbered `lat_index * 2 + lon_index`, where index 1 is the
/// upper half of that axis.
#[derive(Debug)]
pub struct Block<T> {
    pub(crate) size: f64,
    pub(crate) min_lat: f64,
    pub(crate) min_lon: f64,
    pub(crate) parent: Option<BlockId>,
    pub(crate) children: Option<[Option<BlockId>; 4]>,
    pub(crate) entries: Vec<Entry<T>>,
}

impl<T> Block<T> {
    pub(crate) fn new(size: f64, min_lat: f64, min_lon: f64, parent: Option<BlockId>) -> Self {
        Self {
            size,
            min_lat,
            min_lon,
            parent,
            children: None,
            entries: Vec::new(),
        }
    }

    /// The half-size block covering `quadrant` of this one.
    pub(crate) fn quadrant_block(&self, quadrant: usize, this: BlockId) -> Self {
        let half = self.size * 0.5;
        let lat_index = (quadrant / 2) as f64;
        let lon_index = (quadrant % 2) as f64;
        Self::new(
            half,
            self.min_lat + half * lat_index,
            self.min_lon + half * lon_index,
            Some(this),
        )
    }

    /// Quadrant of this block that `location` falls in, split at the midpoints.
    #[inline]
    pub(crate) fn quadrant_of(&self, location: &Location) -> usize {
        let lat_index = usize::from(location.lat >= self.mid_lat());
        let lon_index = usize::from(location.lon >= self.mid_lon());
        lat_index * 2 + lon_index
    }

    /// Side length in degrees.
    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    pub fn mid_lat(&self) -> f64 {
        self.min_lat + self.size * 0.5
    }

    pub fn mid_lon(&self) -> f64 {
        self.min_lon + self.size * 0.5
    }

    /// Exclusive upper latitude bound.
    pub fn max_lat(&self) -> f64 {
        self.min_lat + self.size
    }

    /// Exclusive upper longitude bound.
    pub fn max_lon(&self) -> f64 {
        self.min_lon + self.size
    }

    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    /// Existing children in quadrant order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = BlockId> + '_ {
        self.children.iter().flatten().flatten().copied()
    }

    /// Child covering `quadrant` (0..4), if it has been created.
    pub fn child(&self, quadrant: usize) -> Option<BlockId> {
        self.children.and_then(|c| c.get(quadrant).copied().flatten())
    }

    /// Entries held directly by this block. Always empty for internal blocks.
    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Whether `location` lies inside the half-open bounds.
    #[inline]
    pub fn contains(&self, location: &Location) -> bool {
        location.lat >= self.min_lat
            && location.lat < self.max_lat()
            && location.lon >= self.min_lon
            && location.lon < self.max_lon()
    }

    /// Bounds as a `geo::Rect` with `x` = longitude and `y` = latitude.
    pub fn bounds(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.min_lon,
                y: self.min_lat,
            },
            Coord {
                x: self.max_lon(),
                y: self.max_lat(),
            },
        )
    }

    /// Smallest planar distance from `location` to any point of this block.
    pub fn min_distance(&self, location: &Location) -> f64 {
        let dlat = (self.min_lat - location.lat)
            .max(location.lat - self.max_lat())
            .max(0.0);
        let dlon = (self.min_lon - location.lon)
            .max(location.lon - self.max_lon())
            .max(0.0);
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

impl<T> fmt::Display for Block<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "B({:8.3}..{:8.3};{:8.3}..{:8.3})",
            self.min_lat,
            self.max_lat(),
            self.min_lon,
            self.max_lon()
        )
    }
}
