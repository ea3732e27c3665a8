//! Fly a synthetic glider through a task and print progress.
//!
//! Samples go through the task service one at a time, exactly as a device
//! feed would deliver them.

use anyhow::Context;
use clap::Parser;
use soar_cli::config::{init_tracing, Config};
use soar_cli::report::format_stats;
use soar_cli::service::TaskService;
use soar_cli::sim::{task_scenario, triangle_scenario, GpsNoise};
use soar_core::{GeoPoint, OrderedTask, TaskDefinition, TaskEvent, TaskManager};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time;

/// Task flight simulator
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Task definition JSON; the built-in triangle is flown when omitted
    #[arg(long)]
    task: Option<PathBuf>,

    /// Engine configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start latitude for the built-in triangle
    #[arg(long, default_value_t = 45.0)]
    lat: f64,

    /// Start longitude for the built-in triangle
    #[arg(long, default_value_t = 7.0)]
    lon: f64,

    /// Simulated seconds between fixes
    #[arg(long, default_value_t = 5.0)]
    step: f64,

    /// Fixes per wall-clock second, 0 runs as fast as possible
    #[arg(long, default_value_t = 0.0)]
    rate: f64,

    /// GPS noise standard deviation in meters
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    /// Seed for the noise generator
    #[arg(long)]
    seed: Option<u64>,

    /// MacCready setting, overrides configuration
    #[arg(long)]
    mc: Option<f64>,

    /// Wind speed in m/s
    #[arg(long, default_value_t = 0.0)]
    wind_speed: f64,

    /// Direction the wind blows from, degrees
    #[arg(long, default_value_t = 0.0)]
    wind_dir: f64,

    /// Release altitude for a loaded task
    #[arg(long, default_value_t = 1800.0)]
    altitude: f64,

    /// Print every Nth fix
    #[arg(long, default_value_t = 60)]
    every: usize,

    /// Log as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(&config.log, args.json)?;

    let mut engine = config.engine_config(args.config.as_deref())?;
    if let Some(mc) = args.mc {
        engine.glide.mc = mc.max(0.0);
    }

    let scenario = match &args.task {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading task {}", path.display()))?;
            let definition: TaskDefinition = serde_json::from_str(&text)
                .with_context(|| format!("parsing task {}", path.display()))?;
            let task = OrderedTask::from_definition(&definition)?;
            task_scenario(definition.name.clone(), task, args.altitude)
        }
        None => triangle_scenario(GeoPoint::new(args.lat, args.lon)),
    }
    .with_wind(args.wind_speed, args.wind_dir);

    let mut manager = TaskManager::new(engine)?;
    manager.set_task(scenario.task.clone())?;
    let (handle, service) = TaskService::spawn(manager);

    let samples = scenario.samples(args.step);
    let mut noise = match args.seed {
        Some(seed) => GpsNoise::seeded(args.noise, seed),
        None => GpsNoise::new(args.noise),
    };

    println!("\nScenario: {}", scenario.name);
    println!(
        "  Points: {}, nominal distance: {:.1} km",
        scenario.task.len(),
        scenario.task.distance_nominal() / 1000.0
    );
    println!("  Fixes: {}, step: {}s\n", samples.len(), args.step);

    let mut ticker = (args.rate > 0.0)
        .then(|| time::interval(Duration::from_secs_f64(1.0 / args.rate)));
    let every = args.every.max(1);

    for (count, sample) in samples.iter().enumerate() {
        if let Some(ticker) = ticker.as_mut() {
            ticker.tick().await;
        }
        let stats = handle.submit(noise.apply(*sample)).await?;

        for event in handle.take_events().await? {
            match event {
                TaskEvent::Started { time } => println!("  >> started at {time:.0}s"),
                TaskEvent::Finished { time } => println!("  >> finished at {time:.0}s"),
                TaskEvent::ActiveAdvanced { from, to } => {
                    println!("  >> active point {from} -> {to}")
                }
                TaskEvent::Entered { .. } | TaskEvent::Exited { .. } => {}
            }
        }

        if count % every == 0 || stats.task_finished {
            println!("{}", format_stats(&stats, chrono::Utc::now()));
        }
        if stats.task_finished {
            break;
        }
    }

    let last = handle.snapshot().await?;
    drop(handle);
    service.await.context("task service panicked")?;

    println!("\nSimulation complete");
    println!("  Scored: {:.1} km", last.distance_scored / 1000.0);
    println!(
        "  Speed:  {:.1} km/h",
        last.total.travelled.speed * 3.6
    );
    if !last.task_finished {
        println!("  Task not finished");
    }
    Ok(())
}
