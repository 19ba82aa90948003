//! railsim — drive a railway description from file to running simulation.

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use rail_core::FaultProfile;
use rail_io::{load_scenario, render_dot, write_stream};
use rail_sim::{launch, LaunchOptions, Railway};

#[derive(Parser, Debug)]
#[command(name = "railsim", about = "Concurrent railway network simulation")]
struct Args {
    /// Stream events to stdout instead of running the interactive console.
    #[arg(long)]
    verbose: bool,

    /// Write a Graphviz description of the railway and exit.
    #[arg(long)]
    dot: bool,

    /// Input file containing the railway description.
    #[arg(long = "in", value_name = "PATH", default_value = "input")]
    input: PathBuf,

    /// Output file for statistics; will be overwritten.
    #[arg(long = "out", value_name = "PATH", default_value = "output")]
    output: PathBuf,

    /// Enable the repair subsystem.
    #[arg(short = 'r', long = "repairs")]
    repairs: bool,

    /// Enable workers and job dispatch.
    #[arg(short = 'w', long = "workers")]
    workers: bool,

    /// Master RNG seed for fault rolls and job dispatch.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Event lines only, no logger decoration; the simulated clock is the
    // timestamp.  Non-verbose runs keep the log gate shut until the console's
    // `v` command opens it.
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "{}", record.args())
        })
        .init();
    if !args.verbose {
        log::set_max_level(LevelFilter::Off);
    }

    let mut scenario =
        load_scenario(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    scenario.params.seed = args.seed;

    if args.dot {
        let name = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("railway");
        let network = rail_net::build_network(
            &scenario.junctions,
            &scenario.segments,
            &scenario.platforms,
        )
        .context("building the railway network")?;

        let dot_path = PathBuf::from(format!("{}.dot", args.output.display()));
        std::fs::write(&dot_path, render_dot(&network, name))
            .with_context(|| format!("writing {}", dot_path.display()))?;
        println!("Graphviz description written to {}", dot_path.display());
        return Ok(());
    }

    let (railway, events) =
        Railway::assemble(&scenario, FaultProfile::default()).context("assembling the railway")?;

    println!(
        "{} trains\n{} repair teams\n{} junctions\n{} segments\n{} platforms\n{} workers\n\
         hour takes {} seconds\nsimulation starts at {:02}:{:02}",
        railway.trains.len(),
        railway.teams.len(),
        scenario.junctions.len(),
        scenario.segments.len(),
        scenario.platforms.len(),
        railway.workers.len(),
        scenario.params.seconds_per_hour,
        scenario.params.clock_hour,
        scenario.params.clock_minute,
    );

    tokio::spawn(write_stream(args.output.clone(), events));

    let trains = launch(
        &railway,
        LaunchOptions {
            repairs: args.repairs,
            workers: args.workers,
        },
    );

    if !args.verbose {
        let console_railway: Arc<Railway> = railway.clone();
        tokio::task::spawn_blocking(move || console::run(&console_railway));
    }

    // Trains run until the process exits via the console's `q`.
    for handle in trains {
        handle.await.context("train task failed")?;
    }
    Ok(())
}
