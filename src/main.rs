//! Demo binary: estimate a photo position from a landmark directory and a
//! marker file produced by the tagging shell

use std::env;
use std::error::Error;
use std::fs;
use std::process;

use triangulation::projection;
use triangulation::{
    BearingTriangulation, CameraModel, KeyStyle, LandmarkDirectory, Observation,
};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!(
            "Usage: {} <landmarks.json> <markers.json> <focal-length-mm>",
            args.first().map(String::as_str).unwrap_or("triangulation")
        );
        process::exit(2);
    }
    if let Err(err) = run(&args[1], &args[2], &args[3]) {
        eprintln!("Estimation failed: {}", err);
        process::exit(1);
    }
}

fn run(landmark_path: &str, marker_path: &str, focal: &str) -> Result<(), Box<dyn Error>> {
    let focal_length_mm: f64 = focal.parse()?;

    let markers = fs::read_to_string(marker_path)?;
    let observations: Vec<Observation> = serde_json::from_str(&markers)?;
    println!("Loaded {} markers from {}", observations.len(), marker_path);

    // Marker files reference landmarks either by plain name or by
    // "<name> <height>m" label, depending on how they were produced
    let mut directory = LandmarkDirectory::load_from_file(landmark_path, KeyStyle::Name)?;
    if observations.iter().any(|obs| directory.get(&obs.landmark_key).is_none()) {
        directory = LandmarkDirectory::load_from_file(landmark_path, KeyStyle::NameAndHeight)?;
    }
    println!("Loaded {} landmarks from {}", directory.len(), landmark_path);

    let camera = CameraModel::full_frame(focal_length_mm);
    println!("Focal length {} mm", camera.focal_length_mm);
    println!("Sensor width {} mm", camera.sensor_width_mm);
    println!("Sensor width {} pixels", camera.sensor_width_px);

    let solver = BearingTriangulation::new(camera);
    let estimate = solver.estimate_position(&observations, &directory)?;

    let geodetic = projection::planar_to_geodetic(&estimate.position, None);
    println!("Estimated position {} (CH1903)", estimate.position);
    println!(
        "Estimated position {:.6},{:.6} (WGS84)",
        geodetic.latitude, geodetic.longitude
    );
    let diagnostics = &estimate.diagnostics;
    println!(
        "Converged: {} (residual {:e}, {} iterations, {} evaluations)",
        diagnostics.converged, diagnostics.residual, diagnostics.iterations,
        diagnostics.evaluations
    );
    if diagnostics.under_determined {
        println!(
            "Warning: only {} observations, the solution is under-determined",
            diagnostics.observation_count
        );
    }
    Ok(())
}
