//! One-shot MacCready solve, printed as JSON.

use clap::Parser;
use soar_cli::config::{init_tracing, Config};
use soar_core::{AircraftState, GeoPoint, GeoVector, GlidePolar, GlideState, MacCready};
use std::path::PathBuf;

/// MacCready glide solver
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Leg length in meters
    #[arg(long)]
    distance: f64,

    /// Leg bearing in degrees
    #[arg(long, default_value_t = 0.0)]
    bearing: f64,

    /// Aircraft altitude in meters
    #[arg(long)]
    altitude: f64,

    /// Lowest acceptable arrival altitude
    #[arg(long, default_value_t = 0.0)]
    min_height: f64,

    /// MacCready setting, overrides configuration
    #[arg(long)]
    mc: Option<f64>,

    /// Wind speed in m/s
    #[arg(long, default_value_t = 0.0)]
    wind_speed: f64,

    /// Direction the wind blows from, degrees
    #[arg(long, default_value_t = 0.0)]
    wind_dir: f64,

    /// Cruise efficiency, overrides configuration
    #[arg(long)]
    efficiency: Option<f64>,

    /// Glide with this sink rate (m/s) instead of the polar's
    #[arg(long)]
    sink: Option<f64>,

    /// Engine configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(&config.log, args.json)?;

    let mut engine = config.engine_config(args.config.as_deref())?;
    if let Some(efficiency) = args.efficiency {
        engine.glide.cruise_efficiency = efficiency;
    }
    let mc = args.mc.unwrap_or(engine.glide.mc).max(0.0);

    let solver = MacCready::new(GlidePolar::from_config(&engine.polar)?, engine.glide);
    let aircraft = AircraftState::new(GeoPoint::default(), args.altitude, 0.0)
        .with_wind(args.wind_speed, args.wind_dir);
    let leg = GlideState::new(
        GeoVector::new(args.distance, args.bearing),
        args.min_height,
        mc,
    );

    let result = match args.sink {
        Some(sink) => solver.solve_sink(&aircraft, &leg, sink),
        None => solver.solve(&aircraft, &leg),
    };
    tracing::debug!(solution = ?result.solution, v_opt = result.v_opt, "solved");

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
