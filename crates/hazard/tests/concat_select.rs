use drisk_hazard::{Centroids, CsrBuilder, EventTable, Extent, HazardSet};

fn tile(lon0: f64, lat0: f64, n_events: usize) -> HazardSet {
    let lons: Vec<f64> = (0..4).map(|i| lon0 + 0.25 * i as f64 + 0.125).collect();
    let lats: Vec<f64> = (0..4).map(|i| lat0 + 1.0 - 0.25 * i as f64 - 0.125).collect();
    let centroids = Centroids::from_grid(&lons, &lats);
    let mut b = CsrBuilder::new(centroids.len());
    for e in 0..n_events {
        b.push_dense_row((0..centroids.len()).map(|c| (e + c % 3) as f64));
    }
    let freq = (0..n_events).map(|e| 1.0 / (e + 1) as f64).collect();
    HazardSet::new("FL", "m", centroids, EventTable::numbered(freq), b.finish()).unwrap()
}

#[test]
fn concat_then_select_union_preserves_event_count() {
    let west = tile(120.0, 5.0, 7);
    let east = tile(121.0, 5.0, 5);
    let union = west
        .centroids()
        .extent()
        .unwrap()
        .union(&east.centroids().extent().unwrap());

    let joined = HazardSet::concat_disjoint(&[west.clone(), east.clone()]).unwrap();
    let selected = joined.select_extent(&union).unwrap();

    assert_eq!(selected.n_events(), west.n_events() + east.n_events());
    assert_eq!(selected.n_centroids(), 32);
    assert!(selected.check().is_ok());
}

#[test]
fn select_one_tile_of_concatenation() {
    let west = tile(120.0, 5.0, 3);
    let east = tile(121.0, 5.0, 3);
    let joined = HazardSet::concat_disjoint(&[west.clone(), east]).unwrap();

    let only_west = Extent::new(120.0, 120.99, 5.0, 6.0).unwrap();
    let selected = joined.select_extent(&only_west).unwrap();
    assert_eq!(selected.n_centroids(), west.n_centroids());
    // Events of the east tile remain but carry no intensity here.
    assert_eq!(selected.n_events(), 6);
    let east_rows: f64 = selected.intensity().row_sums()[3..].iter().sum();
    assert_eq!(east_rows, 0.0);
}
