mod config;
mod telemetry;

use std::{thread, time::Duration};

use clap::Parser;
use config::{CliArgs, DemoConfig};
use ordered_pool::{OrderedThreadPool, PoolConfig, PoolStats, ThreadPool};
use rand::Rng;
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = DemoConfig::try_from(args)?;

    init_telemetry()?;
    tracing::debug!("Starting demo with config: {config:#?}");

    println!("Start...");
    let stats = if config.unordered {
        run_unordered(&config)?
    } else {
        run_ordered(&config)?
    };
    println!("Fin.");

    tracing::info!(
        "Processed {} jobs ({} compute panics, {} finalize panics)",
        stats.completed,
        stats.compute_panics,
        stats.finalize_panics
    );
    Ok(())
}

fn pool_config(config: &DemoConfig) -> PoolConfig {
    PoolConfig::new(config.workers, config.queue_capacity).with_thread_name("demo-worker")
}

fn sleep_random(max_delay_ms: u64) {
    let ms = rand::rng().random_range(0..max_delay_ms);
    thread::sleep(Duration::from_millis(ms));
}

/// Results print in submission order even though jobs finish out of order.
fn run_ordered(config: &DemoConfig) -> anyhow::Result<PoolStats> {
    let pool = OrderedThreadPool::with_config(pool_config(config))?;
    let max_delay_ms = config.max_delay_ms;

    for i in 0..config.jobs {
        pool.submit(
            move || {
                sleep_random(max_delay_ms);
                i
            },
            |k| println!("Result: {k}"),
        )?;
    }

    // Pending jobs keep running; shutdown blocks until all of them finalize.
    Ok(pool.shutdown())
}

/// Results print in completion order.
fn run_unordered(config: &DemoConfig) -> anyhow::Result<PoolStats> {
    let pool = ThreadPool::with_config(pool_config(config))?;
    let max_delay_ms = config.max_delay_ms;

    for i in 0..config.jobs {
        pool.submit(move || {
            sleep_random(max_delay_ms);
            println!("Result: {i}");
        })?;
    }

    Ok(pool.shutdown())
}
