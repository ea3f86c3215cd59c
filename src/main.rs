//! firnpack command-line driver.
//!
//! Builds one column (cold start or restart), steps it through a synthetic
//! diurnal forcing and prints the final grid. Stands in for the external
//! energy-balance model: snowfall, a crude surface melt and the surface
//! schemes are all it applies.

use std::f64::consts::PI;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;

use firnpack_core::constants::ZERO_TEMPERATURE;
use firnpack_core::{
    init_snowpack, load_snowpack, AlbedoModel, Grid, InitialForcing, ModelConfig, RoughnessModel,
    Snapshot,
};

/// Point-scale snow/firn/ice column driver
#[derive(Parser)]
#[command(name = "firnpack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Layered glacier column driver", long_about = None)]
struct Cli {
    /// JSON model configuration (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Restart snapshot to resume from instead of a cold start
    #[arg(short, long)]
    restart: Option<PathBuf>,

    /// Initial snow height for a cold start [m]
    #[arg(long)]
    snow_height: Option<f64>,

    /// Initial 2 m air temperature [K]
    #[arg(long, default_value_t = 268.0)]
    air_temperature: f64,

    /// Number of time steps to simulate
    #[arg(short, long, default_value_t = 48)]
    steps: usize,

    /// Write the final state as a restart snapshot
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); falls back to RUST_LOG
    #[arg(short, long)]
    log_level: Option<String>,
}

fn init_logging(level: Option<&str>) {
    let log_level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| {
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|v| v.parse::<LevelFilter>().ok())
        })
        .unwrap_or(LevelFilter::Info);

    Builder::new()
        .filter_level(log_level)
        .target(Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{:5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Synthetic forcing for step `i`: (snowfall [m], surface temperature [K]).
fn forcing(i: usize, dt: f64) -> (f64, f64) {
    let hour = i as f64 * dt / 3600.0;
    let surface_temperature = 266.0 + 8.0 * (2.0 * PI * (hour - 9.0) / 24.0).sin();
    let snowfall = if i % 36 == 35 { 0.02 } else { 0.0 };
    (snowfall, surface_temperature.min(ZERO_TEMPERATURE))
}

fn build_grid(cli: &Cli, config: &ModelConfig) -> anyhow::Result<Grid> {
    match &cli.restart {
        Some(path) => {
            let snapshot = Snapshot::from_file(path)
                .with_context(|| format!("reading restart {}", path.display()))?;
            Ok(load_snowpack(&snapshot, config)?)
        }
        None => {
            let forcing = InitialForcing {
                snow_height: cli.snow_height,
                temperature: cli.air_temperature,
            };
            Ok(init_snowpack(&forcing, config)?)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = match &cli.config {
        Some(path) => ModelConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ModelConfig::default(),
    };
    let albedo = AlbedoModel::from_config(&config);
    let roughness = RoughnessModel::from_config(&config);
    log::info!(
        "albedo method {}, roughness method {}, dt {} s",
        albedo.method(),
        roughness.method(),
        config.dt
    );

    let mut grid = build_grid(&cli, &config)?;
    log::info!(
        "start: {} layers, {:.3} m total, {:.3} m snow",
        grid.number_of_layers(),
        grid.total_height(),
        grid.total_snowheight()
    );

    let mut albedo_snow = config.albedo.albedo_fresh_snow;
    for i in 0..cli.steps {
        let (snowfall, surface_temperature) = forcing(i, config.dt);
        if snowfall > 0.0 {
            grid.add_fresh_snow(snowfall, 250.0, surface_temperature, 0.0)?;
        } else {
            grid.age_fresh_snow(config.dt);
        }

        if surface_temperature >= ZERO_TEMPERATURE - 0.5 {
            let h = grid.layer_height(0)?;
            grid.set_layer_height(0, (h - 0.002).max(0.0))?;
            let fresh = grid.fresh_snow_props().height;
            grid.set_fresh_snow_height(fresh - 0.002)?;
        }
        grid.set_layer_temperature(0, surface_temperature)?;

        let out = albedo.update(&mut grid, surface_temperature, albedo_snow);
        albedo_snow = out.albedo_snow;
        let z0 = roughness.roughness(&grid);
        let summary = grid.update_grid()?;
        log::debug!(
            "step {:>4}: Ts={:.2} albedo={:.3} z0={:.5} layers={} {:?}",
            i,
            surface_temperature,
            out.albedo,
            z0,
            grid.number_of_layers(),
            summary
        );
    }

    println!("{grid}");

    if let Some(path) = &cli.save {
        grid.snapshot()
            .save_to_file(path)
            .with_context(|| format!("writing restart {}", path.display()))?;
        log::info!("restart written to {}", path.display());
    }
    Ok(())
}
