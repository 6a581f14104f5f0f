// src/bin/histogram_cli.rs
use std::error::Error;
use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::Serialize;

use gr_histogram::{logging, Bin, HistogramAccumulator, HistogramAggregate};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Parser)]
#[command(name = "histogram", author, version, about)]
struct Args {
    /// Upper bound on emitted bins (1..=250)
    #[arg(short = 'b', long, default_value_t = 10)]
    max_bins: u64,

    /// Log to stderr (-v debug, -vv trace). HISTOGRAM_LOG sets the level too.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Build a histogram from numbers (stdin or --input) and print its bins
    Bins {
        /// Read numbers from this file instead of stdin (space/comma/newline separated)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Merge saved states into the histogram before finalizing (repeatable)
        #[arg(long = "from-state")]
        from_state: Vec<PathBuf>,

        /// Save the state (before finalization) to this path
        #[arg(long = "to-state")]
        to_state: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        output: OutputFormat,

        /// Omit the CSV header line
        #[arg(long)]
        no_header: bool,
    },
    /// Merge saved states into one
    Merge {
        #[arg(long = "from-state", required = true)]
        from_state: Vec<PathBuf>,

        #[arg(long = "to-state")]
        to_state: PathBuf,
    },
    /// Print bounds and point count of a saved state
    Inspect {
        #[arg(long = "from-state")]
        from_state: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        output: OutputFormat,
    },
}

#[derive(Serialize)]
struct StateSummary {
    lower_bound: f64,
    upper_bound: f64,
    size: u32,
    total_weight: f64,
}

fn parse_numbers(s: &str) -> Result<Vec<f64>, Box<dyn Error>> {
    let mut out = Vec::new();
    for tok in s
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|t| !t.is_empty())
    {
        out.push(tok.parse::<f64>()?);
    }
    Ok(out)
}

fn read_numbers(input: Option<&Path>) -> Result<Vec<f64>, Box<dyn Error>> {
    let s = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s)?;
            s
        }
    };
    parse_numbers(&s)
}

fn load_state(
    agg: &HistogramAggregate,
    path: &Path,
) -> Result<HistogramAccumulator, Box<dyn Error>> {
    let mut r = BufReader::new(fs::File::open(path)?);
    let state = agg
        .deserialize(&mut r)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(state)
}

fn save_state(
    agg: &HistogramAggregate,
    state: &HistogramAccumulator,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut w = BufWriter::new(fs::File::create(path)?);
    agg.serialize(state, &mut w)?;
    w.flush()?;
    Ok(())
}

fn print_bins(bins: &[Bin], output: OutputFormat, no_header: bool) -> Result<(), Box<dyn Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match output {
        OutputFormat::Csv => {
            if !no_header {
                writeln!(out, "lower,upper,weight")?;
            }
            for b in bins {
                writeln!(out, "{},{},{}", b.lower, b.upper, b.weight)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut out, bins)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let floor = match args.verbose {
        0 => LevelFilter::Off,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    logging::init_from_env(floor);

    let agg = HistogramAggregate::builder()
        .max_bins(args.max_bins)
        .build()?;

    match args.cmd {
        Cmd::Bins {
            input,
            from_state,
            to_state,
            output,
            no_header,
        } => {
            let xs = read_numbers(input.as_deref())?;
            let mut state = agg.create_state();
            agg.add_batch(&mut state, &xs)?;
            for path in &from_state {
                let other = load_state(&agg, path)?;
                agg.merge(&mut state, &other)?;
            }
            if let Some(path) = to_state {
                save_state(&agg, &state, &path)?;
            }
            let bins = agg.finalize(&mut state);
            print_bins(&bins, output, no_header)?;
        }
        Cmd::Merge {
            from_state,
            to_state,
        } => {
            let mut state = agg.create_state();
            for path in &from_state {
                let other = load_state(&agg, path)?;
                agg.merge(&mut state, &other)?;
            }
            save_state(&agg, &state, &to_state)?;
        }
        Cmd::Inspect { from_state, output } => {
            let state = load_state(&agg, &from_state)?;
            let summary = StateSummary {
                lower_bound: state.lower_bound(),
                upper_bound: state.upper_bound(),
                size: state.size(),
                total_weight: state.total_weight(),
            };
            match output {
                OutputFormat::Csv => {
                    println!("lower_bound,upper_bound,size,total_weight");
                    println!(
                        "{},{},{},{}",
                        summary.lower_bound,
                        summary.upper_bound,
                        summary.size,
                        summary.total_weight
                    );
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string(&summary)?);
                }
            }
        }
    }
    Ok(())
}
