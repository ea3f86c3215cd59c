/// Pure Rust core benchmarks for the column engine.
///
/// Uses std::time::Instant for timing, a deterministic LCG PRNG for forcing
/// generation, and std::hint::black_box to prevent dead-code elimination.
use std::hint::black_box;
use std::time::{Duration, Instant};

use firnpack_core::albedo::AlbedoMethod;
use firnpack_core::{init_snowpack, AlbedoModel, Grid, InitialForcing, ModelConfig};

const REPEATS: usize = 7;

/// Simple LCG PRNG for deterministic forcing: (snowfall [m], surface temperature [K]).
fn make_forcing(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut state = seed;
    let mut next_f64 = || -> f64 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let snowfall: Vec<f64> = (0..n)
        .map(|_| {
            let u = next_f64();
            if u > 0.85 {
                (u - 0.85) * 0.2
            } else {
                0.0
            }
        })
        .collect();
    let surface_temperature: Vec<f64> = (0..n).map(|_| 255.0 + next_f64() * 20.0).collect();
    (snowfall, surface_temperature)
}

/// Run a closure `REPEATS` times, return the median duration.
fn median_time<F: FnMut()>(mut f: F) -> Duration {
    let mut times: Vec<Duration> = (0..REPEATS)
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed()
        })
        .collect();
    times.sort();
    times[REPEATS / 2]
}

fn initial_grid(config: &ModelConfig) -> Grid {
    let forcing = InitialForcing {
        snow_height: Some(1.0),
        temperature: 265.0,
    };
    match init_snowpack(&forcing, config) {
        Ok(grid) => grid,
        Err(err) => panic!("benchmark column failed to initialize: {err}"),
    }
}

/// Snowfall or aging, a crude surface melt, albedo, then remeshing.
fn run(config: &ModelConfig, snowfall: &[f64], surface_temperature: &[f64]) -> f64 {
    let model = AlbedoModel::from_config(config);
    let mut grid = initial_grid(config);
    let mut albedo_snow = config.albedo.albedo_fresh_snow;
    let mut albedo = 0.0;
    for (&sf, &ts) in snowfall.iter().zip(surface_temperature) {
        if sf > 0.0 {
            let t = ts.min(273.16);
            if grid.add_fresh_snow(sf, 250.0, t, 0.0).is_err() {
                grid.age_fresh_snow(config.dt);
            }
        } else {
            grid.age_fresh_snow(config.dt);
        }
        if ts > 270.0 {
            let h = grid.layer_height(0).unwrap_or(0.0);
            let _ = grid.set_layer_height(0, (h - 0.002).max(0.0));
        }
        let out = model.update(&mut grid, ts, albedo_snow);
        albedo = out.albedo;
        albedo_snow = out.albedo_snow;
        let _ = grid.update_grid();
    }
    albedo
}

fn bench_method(method: AlbedoMethod, sizes: &[usize]) -> Vec<(String, usize, Duration)> {
    let mut config = ModelConfig::default();
    config.albedo.method = method;
    let mut results = Vec::new();

    for &n in sizes {
        let (snowfall, ts) = make_forcing(n, 42);

        // Warmup
        black_box(run(&config, &snowfall, &ts));

        let dur = median_time(|| {
            black_box(run(&config, &snowfall, &ts));
        });
        results.push((method.to_string(), n, dur));
    }
    results
}

fn bench_update_grid(sizes: &[usize]) -> Vec<(String, usize, Duration)> {
    let config = ModelConfig::default();
    let mut results = Vec::new();

    for &n in sizes {
        let base = initial_grid(&config);
        let dur = median_time(|| {
            let mut grid = base.clone();
            for _ in 0..n {
                black_box(grid.update_grid().ok());
            }
        });
        results.push(("update_grid".to_string(), n, dur));
    }
    results
}

fn main() {
    println!("Pure Rust Core Benchmarks");
    println!("============================================================");
    println!("{:<18} {:>6}   {:>12}", "Case", "N", "Median (ms)");
    println!("--------------------------------------------");

    let mut all_results: Vec<(String, usize, Duration)> = Vec::new();

    all_results.extend(bench_update_grid(&[1000, 10000]));
    all_results.extend(bench_method(AlbedoMethod::Oerlemans98, &[8760, 87600]));
    all_results.extend(bench_method(AlbedoMethod::Bougamont05, &[8760, 87600]));
    all_results.extend(bench_method(AlbedoMethod::Lejeune13, &[8760]));

    for (case, n, dur) in &all_results {
        let ms = dur.as_secs_f64() * 1000.0;
        println!("{:<18} {:>6}      {:>8.2}", case, n, ms);
    }

    println!("============================================================");
}
