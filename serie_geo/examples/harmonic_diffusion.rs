use serie_geo::{
    generate_grid2d_mesh,
    progress::{closure_sink, ProgressMsg},
    DiffusionParams, HarmonicDiffusion,
};
use serie_geo_utils::Point2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A 51 x 51 vertex grid covering [-5, 5]^2
    let mesh = generate_grid2d_mesh(51, 10.0)?;

    // Print solver progress from a listener thread
    let (sink, handle) = closure_sink(256, |msg| match msg {
        ProgressMsg::SolverIteration {
            iter,
            max_change,
            progress,
        } if iter % 50 == 0 => {
            println!("sweep {iter:>5}  max change {max_change:.3e}  ({:.0}%)", progress * 100.0);
        }
        ProgressMsg::SnapshotRecorded { name, iter } => println!("stored {name} after {iter} sweeps"),
        ProgressMsg::Message { message } => println!("{message}"),
        _ => {}
    });

    let params = DiffusionParams::builder()
        .max_iter(5000)
        .eps(1e-6)
        .record(500)
        .name("temperature")
        .constraint_tolerance(0.5)
        .build()?;

    // Cold borders, two hot spots and one cold spot
    let mut solver = HarmonicDiffusion::new(&mesh, 0.0, params)?.progress_callback(sink);
    solver.constrain_borders(0.0);
    solver.add_constraint(&Point2::new([-2.0, 1.0]), 100.0)?;
    solver.add_constraint(&Point2::new([2.0, 2.0]), 60.0)?;
    solver.add_constraint(&Point2::new([0.0, -2.0]), -20.0)?;

    let outcome = solver.solve();
    drop(solver);
    handle.join().map_err(|_| "progress listener panicked")?;

    println!(
        "{:?} after {} sweeps (last change {:.3e}), {} snapshots",
        outcome.termination,
        outcome.iterations,
        outcome.last_change,
        outcome.snapshots.len()
    );

    let centre = mesh.closest_vertex(&Point2::new([0.0, 0.0]))?;
    println!("{} at the centre: {:.4}", outcome.name, outcome.field[centre.index]);

    Ok(())
}
