use clap::{Parser, ValueEnum};
use log::info;
use std::io::{self, Write};

use salesgrid::downloader::to_csv;
use salesgrid::generator::generate_sample_data;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// Print a generated sales dataset to stdout
#[derive(Debug, Parser)]
#[command(name = "salesgrid")]
struct Args {
    /// Number of records to generate
    #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
    rows: i64,

    /// Seed for reproducible output; omitted means a different dataset every run
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Print the summary figures instead of the rows
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let dataset = generate_sample_data(args.rows, args.seed)?;
    info!("generated {} rows", dataset.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.summary {
        serde_json::to_writer_pretty(&mut out, &dataset.summary())?;
        writeln!(out)?;
        return Ok(());
    }

    match args.format {
        OutputFormat::Csv => out.write_all(to_csv(dataset.records())?.as_bytes())?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &dataset)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
