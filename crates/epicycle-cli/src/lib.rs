//! CLI logic for the Epicycle diagram tool.

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{debug, info};

use epicycle::{
    EpicycleError, export::svg::Svg, geometry::Point, loader, physics::Engine,
};

/// Run the Epicycle CLI application
///
/// Loads the system tree from JSON, seeds the circular layout, relaxes
/// it with the force engine, normalizes coordinates into the margin, and
/// writes the resulting SVG.
///
/// # Errors
///
/// Returns `EpicycleError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - JSON loading errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), EpicycleError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    // Load configuration
    let app_config = config::load_config(args.config.as_ref())?;

    // Read and parse the input document
    let source = fs::read_to_string(&args.input)?;
    let mut system = loader::from_json_str(&source)?;
    debug!(root = system.name(); "System tree loaded");

    // One-time circular placement, then force relaxation
    system.seed_circular_layout(args.seed_radius);

    let engine = Engine::with_params(app_config.physics);
    info!(steps = args.steps, dt = args.dt; "Relaxing layout");
    for _ in 0..args.steps {
        engine.step(&mut system, args.dt);
    }

    // Normalize the whole tree into non-negative render coordinates
    let bounds = system.bounding_box();
    system.shift(Point::new(
        args.margin - bounds.min_x(),
        args.margin - bounds.min_y(),
    ));

    Svg::new(&args.output).export(&system, args.margin)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
