use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use std::time::Instant;

use umidedup::{Args, Config, run_dedup};

#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::from_args(&args)?;

    let start = Instant::now();
    let stats = run_dedup(&config)
        .with_context(|| format!("failed to deduplicate {}", config.input.display()))?;
    stats.log_summary(start.elapsed());

    Ok(())
}
