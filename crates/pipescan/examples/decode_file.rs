use pipescan::PipeProfiler;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <scan.bin> <expected_diameter_mm> [out.json]", args[0]);
        std::process::exit(2);
    }

    let bytes = std::fs::read(&args[1])?;
    let diameter: f64 = args[2].parse()?;

    let data = pipescan::decode(&bytes)?;
    println!("Decoded {} profiles.", data.profile_count());
    for warning in &data.warnings {
        eprintln!("warning: {}", warning);
    }

    let profiler = PipeProfiler::new(pipescan::PoseConfig::default(), diameter);
    let results = profiler.process_file(&data);
    let detections = results.iter().filter(|r| r.detection.is_some()).count();
    println!("Pipe detected in {} of {} profiles.", detections, results.len());

    if let Some(out_path) = args.get(3) {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
