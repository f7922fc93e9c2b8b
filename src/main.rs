use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use average::{Estimate, Mean};
use clap::Parser;

use dispatch_sim::program::CreationSchedule;
use dispatch_sim::{Sim, SimParams};

/// Simulate a uniprocessor dispatcher over a scripted process workload.
#[derive(Parser)]
#[command(name = "dispatch-sim")]
struct Args {
    /// Degree of parallelism; this simulator models a single execution unit,
    /// so the only accepted value is 1.
    cores: u32,

    /// Max instructions per dispatch before forced preemption.
    quantum: u32,

    /// Creation order file: `cycle process_file...` per line.
    creation_order: PathBuf,

    /// Output log file.
    output: PathBuf,

    /// Stop after this many cycles even if processes remain.
    #[arg(long, default_value_t = 60)]
    max_cycles: u64,

    /// Bound on the ready queue and the blocked set.
    #[arg(long, default_value_t = 100)]
    capacity: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.cores != 1 {
        bail!("only one execution unit is supported; CORES must be 1");
    }
    if args.quantum == 0 {
        bail!("QUANTUM must be at least 1");
    }

    let (schedule, warnings) = CreationSchedule::from_file(&args.creation_order)
        .with_context(|| format!("opening creation order {}", args.creation_order.display()))?;
    for warning in warnings {
        eprintln!("warning: {warning}");
    }

    let mut sim = Sim::new(
        schedule,
        SimParams {
            quantum: args.quantum,
            capacity: args.capacity,
        },
    );
    let events = sim.run(args.max_cycles);

    let out = File::create(&args.output)
        .with_context(|| format!("creating output log {}", args.output.display()))?;
    let mut out = BufWriter::new(out);
    for event in &events {
        writeln!(out, "{event}")?;
    }
    out.flush()?;

    print_stats(&sim);
    Ok(())
}

fn print_stats(sim: &Sim) {
    let mut turnaround = Mean::new();
    let mut response = Mean::new();

    println!("pid | name         | state      | dispatches | turnaround");
    println!("----|--------------|------------|------------|-----------");
    for p in sim.processes() {
        let turn = p
            .terminated_at
            .map(|t| t - p.admitted_at)
            .map(|t| {
                turnaround.add(t as f64);
                t.to_string()
            })
            .unwrap_or_else(|| "-".to_string());
        if let Some(first) = p.first_dispatched_at {
            response.add((first - p.admitted_at) as f64);
        }
        println!(
            "{:>3} | {:<12} | {:<10} | {:>10} | {:>10}",
            p.pid,
            p.name,
            format!("{:?}", p.state),
            p.dispatches,
            turn
        );
    }
    if !sim.processes().is_empty() {
        println!("mean turnaround: {:.2} cycles", turnaround.estimate());
        println!("mean response:   {:.2} cycles", response.estimate());
    }
}
