use serie_geo::{distance_field, distance_field_on_grid, KdTree};
use serie_geo_utils::{generate_random_points, Point3};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reference cloud in the unit cube
    let references = generate_random_points::<3>(10_000, 7);

    // Distance to the cloud on a 40^3 grid
    let n = 40;
    let grid_field = distance_field_on_grid(&references, [(0.0, 1.0); 3], [n, n, n])?;
    let max_gap = grid_field.iter().copied().fold(0.0, f64::max);
    println!("largest empty-space distance on the grid: {max_gap:.4}");

    // Same tree type used directly for neighbour queries
    let tree = KdTree::from_points(&references)?;
    let probe = Point3::new([0.5, 0.5, 0.5]);
    for neighbour in tree.find_k_nearest(&probe, 5)? {
        println!("  #{:<6} at {:.4}", neighbour.index, neighbour.distance());
    }
    println!("points within 0.05: {}", tree.find_in_radius(&probe, 0.05).len());

    // Random probes
    let probes = generate_random_points::<3>(1000, 8);
    let distances = distance_field(&probes, &references)?;
    let mean = distances.iter().sum::<f64>() / distances.count() as f64;
    println!("mean probe distance: {mean:.4}");

    Ok(())
}
