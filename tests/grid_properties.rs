use fleetgrid::{Grid, GridConfig, Location, closest_linear};

fn scatter(n: usize, seed: u64) -> Vec<Location> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let lat = ((state >> 33) % 170_000) as f64 / 1000.0 - 85.0;
            let lon = ((state >> 11) % 350_000) as f64 / 1000.0 - 175.0;
            Location::new(lat, lon)
        })
        .collect()
}

fn small_grid(points: &[Location]) -> Grid<usize> {
    let mut grid = Grid::with_config(GridConfig::default().with_split_threshold(8));
    for (i, &location) in points.iter().enumerate() {
        grid.add(i, location).expect("Insert failed");
    }
    grid
}

#[test]
fn test_tree_shape_after_many_inserts() {
    let points = scatter(2_000, 7);
    let grid = small_grid(&points);

    assert_eq!(grid.len(), 2_000);
    assert_eq!(grid.count(), 2_000);

    let root = grid.root().unwrap();
    assert!(root.parent().is_none());
    for point in &points {
        assert!(root.contains(point), "{} outside root", point);
    }

    for (id, block) in grid.blocks() {
        if block.is_leaf() {
            for entry in block.entries() {
                assert!(block.contains(&entry.location));
            }
        } else {
            assert!(block.entries().is_empty(), "internal block {:?} holds entries", id);
            for child in block.children() {
                let child = grid.block(child).unwrap();
                assert_eq!(child.size(), block.size() / 2.0);
                assert_eq!(child.parent(), Some(id));
            }
        }
    }
}

#[test]
fn test_leaf_sizes_are_powers_of_two() {
    let grid = small_grid(&scatter(500, 11));
    for (_, block) in grid.blocks() {
        let exponent = block.size().log2();
        assert_eq!(exponent, exponent.round());
    }
}

#[test]
fn test_exact_matches_linear_scan() {
    let points = scatter(1_500, 3);
    let grid = small_grid(&points);
    let entries: Vec<_> = grid.iter().cloned().collect();

    for query in scatter(100, 99) {
        let exact = grid.find_closest_exact(query).unwrap();
        let linear = closest_linear(&entries, &query).unwrap();
        assert_eq!(
            exact.location.distance(&query),
            linear.location.distance(&query)
        );
    }
}

#[test]
fn test_approximate_is_never_better_than_exact() {
    let points = scatter(1_500, 5);
    let mut grid = small_grid(&points);

    for query in scatter(100, 42) {
        let exact = grid.find_closest_exact(query).unwrap().location.distance(&query);
        let approx = grid.find_closest(query).unwrap().location.distance(&query);
        assert!(approx >= exact);
    }
    assert_eq!(grid.count(), 1_500);
}

#[test]
fn test_every_entry_finds_itself() {
    let points = scatter(300, 17);
    let mut grid = small_grid(&points);

    for point in &points {
        let hit = grid.find_closest(*point).unwrap();
        assert_eq!(hit.location.distance(point), 0.0);
    }
}
