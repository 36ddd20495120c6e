use serie_geo::{
    interpolate_field, BarrierMode, CurvedDiscontinuity, GroupInfo, InterpolationParams,
    SmoothingMethod,
};
use serie_geo_utils::{create_evaluation_grid, generate_random_points, Point2, Serie};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Scattered samples in [0, 1]^2 with a step across a curved fault
    let samples = generate_random_points::<2>(400, 42);
    let fault = CurvedDiscontinuity::new(vec![
        Point2::new([0.3, -0.1]),
        Point2::new([0.45, 0.4]),
        Point2::new([0.6, 0.7]),
        Point2::new([0.55, 1.1]),
    ])?;

    // Side of the fault decides the value and the group
    let origin = Point2::new([0.0, 0.0]);
    let (values, groups): (Vec<f64>, Vec<GroupInfo>) = samples
        .iter()
        .map(|p| {
            let west = !fault.intersects(&origin, p);
            let base = p[1] * 2.0;
            match west {
                true => (base, GroupInfo::new(0, 1.0)),
                false => (base + 5.0, GroupInfo::new(1, 1.0)),
            }
        })
        .unzip();
    let values = Serie::new(values);
    let groups = Serie::new(groups);

    let targets = create_evaluation_grid([(0.0, 1.0), (0.0, 1.0)], [60, 60]);

    let params = InterpolationParams::builder()
        .num_neighbors(Some(8))
        .power(2.0)
        .discontinuity(fault)
        .barrier_mode(BarrierMode::Exclude)
        .respect_groups(true)
        .cross_group_penalty(0.1)
        .smoothing_method(SmoothingMethod::Gaussian)
        .smoothing_radius(0.04)
        .smoothing_iterations(2)
        .build()?;

    let field = interpolate_field(&targets, &samples, &values, Some(&groups), &params)?;

    let (lo, hi) = field
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    println!("interpolated {} targets, range [{lo:.3}, {hi:.3}]", field.count());

    Ok(())
}
