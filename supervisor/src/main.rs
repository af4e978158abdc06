use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use devs::Time;
use log::info;
use supervisor::runner::{SupervisorRunner, load_params};

#[derive(Debug, Parser)]
#[command(version, about = "Runs the landing supervisor in real time")]
struct Args {
    /// Parameter file
    #[arg(long, default_value = "config/params.toml")]
    params: PathBuf,

    /// Stop after this many seconds of wall clock time
    #[arg(long)]
    duration_s: Option<f64>,

    /// Build and validate the model graph, then exit
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        unsafe { env::set_var("RUST_LOG", "info") }
    }

    pretty_env_logger::init();

    let args = Args::parse();
    let params = load_params(&args.params)?;
    let runner = SupervisorRunner::new(&params)?;

    if args.dry_run {
        info!("Model graph is valid");
        return Ok(());
    }

    let stop = runner.stop_handle();
    ctrlc::set_handler(move || {
        info!("Interrupted, stopping");
        stop.stop();
    })
    .context("Cannot install the interrupt handler")?;

    info!(
        "Supervisor started at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    runner.run(args.duration_s.map(Time::from_secs_f64))?;

    info!("Supervisor stopped");

    Ok(())
}
