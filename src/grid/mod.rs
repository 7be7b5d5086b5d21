//! Adaptive quadtree ("grid of blocks") for nearest-entry lookups.
//!
//! The grid has no fixed world bounds. The first entry creates a 1°x1° root
//! block at the floor of its coordinates; entries outside the root grow new
//! parents of twice the size until they are covered; leaves holding more
//! than `split_threshold` entries split into four quadrants.
//!
//! Blocks live in an arena owned by the grid. Parents refer to children and
//! children back to parents through [`BlockId`] handles, so the upward link
//! never owns anything. Blocks are never removed.
//!
//! ```rust
//! use fleetgrid::grid::Grid;
//! use fleetgrid::Location;
//!
//! let mut grid = Grid::new();
//! grid.add("depot", Location::new(0.0, 0.0))?;
//! grid.add("harbour", Location::new(0.0, 1.0))?;
//! grid.add("airport", Location::new(10.0, 10.0))?;
//!
//! let hit = grid.find_closest(Location::new(0.1, 0.1)).unwrap();
//! assert_eq!(hit.payload, "depot");
//! # Ok::<(), fleetgrid::FleetError>(())
//! ```

mod block;


pub use block::{BASE_BLOCK_SIZE, Block, BlockId, Entry};

use crate::config::GridConfig;
use crate::error::{FleetError, Result};
use fleetgrid_types::location::Location;
use geo::Rect;

/// Anything entries can be added to by location.
///
/// The loader writes through this so it does not care whether it feeds a
/// plain [`Grid`] or a shared one.
pub trait LocationIndex<T> {
    /// Insert `payload` at `location`, rejecting out-of-range coordinates
    /// with `InvalidLocation` and leaving the index untouched.
    fn add(&mut self, payload: T, location: Location) -> Result<()>;
}

/// The spatial index: an arena of blocks plus the current root.
#[derive(Debug)]
pub struct Grid<T> {
    blocks: Vec<Block<T>>,
    root: Option<BlockId>,
    len: usize,
    config: GridConfig,
}

impl<T> Grid<T> {
    /// Create an empty grid with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GridConfig::default())
    }

    pub fn with_config(config: GridConfig) -> Self {
        Self {
            blocks: Vec::new(),
            root: None,
            len: 0,
            config,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of successful adds.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries reachable from the root, counted by walking the tree.
    pub fn count(&self) -> usize {
        self.root.map_or(0, |root| self.count_in(root))
    }

    /// Entries held by `id` and all of its descendants.
    pub fn count_in(&self, id: BlockId) -> usize {
        let mut total = 0;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let block = &self.blocks[id.0];
            total += block.entries.len();
            stack.extend(block.children());
        }
        total
    }

    pub fn root_id(&self) -> Option<BlockId> {
        self.root
    }

    pub fn root(&self) -> Option<&Block<T>> {
        self.root.map(|id| &self.blocks[id.0])
    }

    pub fn block(&self, id: BlockId) -> Option<&Block<T>> {
        self.blocks.get(id.0)
    }

    /// All blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block<T>)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(idx, block)| (BlockId(idx), block))
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Extent of the root block.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.root().map(Block::bounds)
    }

    /// Number of levels below and including the root.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1)];
        while let Some((id, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(self.blocks[id.0].children().map(|c| (c, level + 1)));
        }
        deepest
    }

    /// All entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.blocks.iter().flat_map(|block| block.entries.iter())
    }

    /// Insert `payload` at `location`.
    ///
    /// Fails with `InvalidLocation` when `|lat| > 90`, `|lon| > 180` or a
    /// coordinate is not finite; the grid is unchanged in that case.
    pub fn add(&mut self, payload: T, location: Location) -> Result<()> {
        if !location.is_valid() {
            return Err(FleetError::InvalidLocation {
                lat: location.lat,
                lon: location.lon,
            });
        }

        let entry = Entry { payload, location };
        let root = match self.root {
            Some(root) => self.insert_from(root, entry),
            None => {
                let mut block = Block::new(
                    BASE_BLOCK_SIZE,
                    location.lat.floor(),
                    location.lon.floor(),
                    None,
                );
                block.entries.push(entry);
                let id = self.push_block(block);
                log::debug!("Created first block {}", self.blocks[id.0]);
                id
            }
        };
        self.root = Some(root);
        self.len += 1;
        Ok(())
    }

    /// Approximate nearest entry to `location`.
    ///
    /// Descends to the leaf covering `location` (creating empty blocks on the
    /// way), climbs until a block with entries underneath is found, then
    /// returns the closest entry in that block's subtree. Entries in sibling
    /// subtrees of the blocks climbed through are never examined, so a
    /// closer entry just across a block edge can be missed. Ties go to the
    /// first entry scanned.
    ///
    /// Returns `None` for an empty grid or a non-finite `location`.
    pub fn find_closest(&mut self, location: Location) -> Option<&Entry<T>> {
        if !location.lat.is_finite() || !location.lon.is_finite() {
            return None;
        }
        let root = self.root?;
        let mut id = self.descend(root, &location);
        while !self.has_entries(id) {
            id = self.blocks[id.0].parent?;
        }
        self.closest_below(id, &location)
    }

    /// Exact nearest entry to `location`, without modifying the tree.
    ///
    /// Visits every block whose bounds could hold something closer than the
    /// best candidate so far. When several entries share the minimum distance
    /// any one of them may be returned.
    pub fn find_closest_exact(&self, location: Location) -> Option<&Entry<T>> {
        if !location.lat.is_finite() || !location.lon.is_finite() {
            return None;
        }
        let root = self.root?;
        let mut best: Option<(&Entry<T>, f64)> = None;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let block = &self.blocks[id.0];
            if let Some((_, best_dist)) = best
                && block.min_distance(&location) >= best_dist
            {
                continue;
            }
            for entry in &block.entries {
                let dist = entry.location.distance(&location);
                if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                    best = Some((entry, dist));
                }
            }

            let mut children: Vec<(BlockId, f64)> = block
                .children()
                .map(|c| (c, self.blocks[c.0].min_distance(&location)))
                .collect();
            // farthest first so the nearest child is popped next
            children.sort_by(|a, b| b.1.total_cmp(&a.1));
            stack.extend(children.into_iter().map(|(c, _)| c));
        }
        best.map(|(entry, _)| entry)
    }

    /// Deepest existing block covering `location`, without creating any.
    ///
    /// `None` when the grid is empty or `location` is outside the root.
    pub fn locate(&self, location: Location) -> Option<BlockId> {
        let mut id = self.root?;
        if !self.blocks[id.0].contains(&location) {
            return None;
        }
        loop {
            let block = &self.blocks[id.0];
            match block.child(block.quadrant_of(&location)) {
                Some(child) => id = child,
                None => return Some(id),
            }
        }
    }

    /// Grow upward until a block covers `entry`, descend to its leaf, store
    /// it there and return the new root.
    fn insert_from(&mut self, start: BlockId, entry: Entry<T>) -> BlockId {
        let mut id = start;
        while !self.blocks[id.0].contains(&entry.location) {
            id = self.parent_for(id, &entry.location);
        }
        if !self.blocks[id.0].is_leaf() {
            id = self.child_by_loc(id, &entry.location);
        }
        self.place(id, entry);
        self.top(id)
    }

    /// Append `entry` to the leaf `id`, splitting the leaf if it overflows.
    fn place(&mut self, id: BlockId, entry: Entry<T>) {
        let block = &mut self.blocks[id.0];
        block.entries.push(entry);
        if block.entries.len() > self.config.split_threshold
            && block.size > self.config.min_block_size
        {
            self.split(id);
        }
    }

    /// Move every entry of leaf `id` into its quadrant children.
    fn split(&mut self, id: BlockId) {
        let block = &mut self.blocks[id.0];
        let entries = std::mem::take(&mut block.entries);
        block.children = Some([None; 4]);
        log::debug!("Splitting {} with {} entries", block, entries.len());

        for entry in entries {
            let leaf = self.child_by_loc(id, &entry.location);
            self.place(leaf, entry);
        }
    }

    /// The parent of `id`, creating one of twice the size if it has none.
    ///
    /// A new parent extends toward `location`: if `location` is below this
    /// block on an axis, this block becomes the upper half of the parent on
    /// that axis, otherwise the lower half.
    fn parent_for(&mut self, id: BlockId, location: &Location) -> BlockId {
        let block = &self.blocks[id.0];
        if let Some(parent) = block.parent {
            return parent;
        }

        let mut min_lat = block.min_lat;
        let mut min_lon = block.min_lon;
        let mut lat_index = 0;
        let mut lon_index = 0;
        if location.lat < block.min_lat {
            lat_index = 1;
            min_lat -= block.size;
        }
        if location.lon < block.min_lon {
            lon_index = 1;
            min_lon -= block.size;
        }

        let mut parent = Block::new(block.size * 2.0, min_lat, min_lon, None);
        let mut children = [None; 4];
        children[lat_index * 2 + lon_index] = Some(id);
        parent.children = Some(children);

        let parent_id = self.push_block(parent);
        self.blocks[id.0].parent = Some(parent_id);
        log::debug!(
            "Grew parent {} over {}",
            self.blocks[parent_id.0],
            self.blocks[id.0]
        );
        parent_id
    }

    /// Leaf under `id` in the quadrant of `location`, creating missing
    /// quadrant blocks on the way. Turns a leaf `id` into an internal block.
    ///
    /// This is the only descent that allocates; both insertion and
    /// [`Grid::find_closest`] go through it.
    fn child_by_loc(&mut self, id: BlockId, location: &Location) -> BlockId {
        let mut id = id;
        loop {
            let quadrant = self.blocks[id.0].quadrant_of(location);
            let existing = self.blocks[id.0].children.get_or_insert([None; 4])[quadrant];
            let child = match existing {
                Some(child) => child,
                None => {
                    let block = self.blocks[id.0].quadrant_block(quadrant, id);
                    let child = self.push_block(block);
                    if let Some(children) = self.blocks[id.0].children.as_mut() {
                        children[quadrant] = Some(child);
                    }
                    log::trace!(
                        "Created {} in quadrant {} of {}",
                        self.blocks[child.0],
                        quadrant,
                        self.blocks[id.0]
                    );
                    child
                }
            };
            if self.blocks[child.0].is_leaf() {
                return child;
            }
            id = child;
        }
    }

    /// Leaf a query at `location` starts from. A leaf root is its own answer.
    fn descend(&mut self, root: BlockId, location: &Location) -> BlockId {
        if self.blocks[root.0].is_leaf() {
            root
        } else {
            self.child_by_loc(root, location)
        }
    }

    fn top(&self, id: BlockId) -> BlockId {
        let mut id = id;
        while let Some(parent) = self.blocks[id.0].parent {
            id = parent;
        }
        id
    }

    fn has_entries(&self, id: BlockId) -> bool {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let block = &self.blocks[id.0];
            if !block.entries.is_empty() {
                return true;
            }
            stack.extend(block.children());
        }
        false
    }

    /// Closest entry in the subtree of `id`, scanning each block's own
    /// entries before its children, children in quadrant order.
    fn closest_below(&self, id: BlockId, location: &Location) -> Option<&Entry<T>> {
        let mut best: Option<(&Entry<T>, f64)> = None;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let block = &self.blocks[id.0];
            for entry in &block.entries {
                let dist = entry.location.distance(location);
                if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                    best = Some((entry, dist));
                }
            }
            stack.extend(block.children().rev());
        }
        best.map(|(entry, _)| entry)
    }

    fn push_block(&mut self, block: Block<T>) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(block);
        id
    }
}

impl<T> Default for Grid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LocationIndex<T> for Grid<T> {
    fn add(&mut self, payload: T, location: Location) -> Result<()> {
        Grid::add(self, payload, location)
    }
}
