use pipescan::{PipeProfiler, PoseConfig};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let diameter: f64 = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(300.0);
    let offset_x: f64 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(50.0);

    let pose = PoseConfig::default();
    let points = pipescan::synthetic_pipe_profile(&pose, diameter, offset_x, 800);
    println!("Generated {} points.", points.len());

    let profiler = PipeProfiler::new(pose, diameter);
    match profiler.detect(&points, None) {
        Some(det) => println!(
            "Pipe at ({:.1}, {:.1}), diameter {:.1} mm, {} inliers (rms {:.3}).",
            det.fit.cx, det.fit.cz, det.diameter, det.num_inliers, det.fit.rms
        ),
        None => println!("No pipe detected."),
    }
    Ok(())
}
