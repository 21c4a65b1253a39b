use chiplet_trace::Result;
use chiplet_trace::engine::{self, filter};
use chiplet_trace::parse;
use chiplet_trace::report::{self, EliminationReport};
use chiplet_trace::trace::NodeId;

use anyhow::bail;
use clap::{Parser, Subcommand};
use log::{LevelFilter, info};
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Parser)]
#[command(name = "chiplet-trace")]
#[command(about = "Chiplet trace pair elimination", long_about = None)]
struct Cli {
    /// Enable debug log messages
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print trace metadata and per-chiplet counts.
    Summary {
        #[arg(long)]
        trace: String,
    },
    /// Remove COMPUTE and/or DRAM operations and show what is left.
    Filter {
        #[arg(long)]
        trace: String,

        /// Drop COMPUTE operations.
        #[arg(long)]
        compute: bool,

        /// Drop operations whose peer is DRAM.
        #[arg(long)]
        dram: bool,
    },
    /// Eliminate matched SEND/RECV pairs and report the residue.
    CheckPair {
        #[arg(long)]
        trace: String,

        /// Also write the report as JSON.
        #[arg(long)]
        json: Option<String>,
    },
    /// Check that the whole schedule drains without deadlock.
    Verify {
        #[arg(long)]
        trace: String,
    },
}

fn setup_logger(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.debug);

    match cli.cmd {
        Commands::Summary { trace } => {
            let trace = parse::parse_trace_file(&trace)?;
            print!("{}", report::render_summary(&trace)?);
        }
        Commands::Filter {
            trace: path,
            compute,
            dram,
        } => {
            let mut trace = parse::parse_trace_file(&path)?;
            let before: BTreeMap<NodeId, usize> = trace
                .chiplets
                .iter()
                .map(|(id, c)| (*id, c.operations.len()))
                .collect();

            // No flag means both filters.
            let both = !compute && !dram;
            if compute || both {
                filter::remove_compute_operations(&mut trace);
            }
            if dram || both {
                filter::remove_dram_operations(&mut trace);
            }
            print!("{}", report::render_counts(&before, &trace)?);
        }
        Commands::CheckPair { trace: path, json } => {
            let mut trace = parse::parse_trace_file(&path)?;
            info!("loaded {} chiplets from {}", trace.chiplets.len(), path);

            let report = EliminationReport::run(&mut trace)?;
            print!("{}", report::render_text(&report)?);

            if let Some(out) = json {
                std::fs::write(&out, serde_json::to_string_pretty(&report)?)?;
                println!("Wrote {}", out);
            }
        }
        Commands::Verify { trace: path } => {
            let trace = parse::parse_trace_file(&path)?;
            let verdict = engine::verify_deadlock_free(&trace);
            print!("{}", report::render_verdict(&verdict)?);
            if !verdict.is_deadlock_free() {
                bail!("trace {} may deadlock", path);
            }
        }
    }

    Ok(())
}
