// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! meshvtk CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use meshvtk::cli::{convert_all, discover_inputs, DatasetSummary, Reporter};
use meshvtk::{DatasetKind, MeshFileStore, StoreConfig, StoreOptions, VtkError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "meshvtk")]
#[command(about = "Inspect and re-encode legacy VTK mesh files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./meshvtk.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Polydata,
    UnstructuredGrid,
}

impl From<KindArg> for DatasetKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Polydata => DatasetKind::PolyData,
            KindArg::UnstructuredGrid => DatasetKind::UnstructuredGrid,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a file
    Info {
        input: PathBuf,

        /// Required dataset kind (detected from the file when omitted)
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-encode files or directories of *.vtk files
    Convert {
        /// Input files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Write BINARY
        #[arg(long, conflicts_with = "ascii")]
        binary: bool,

        /// Write ASCII
        #[arg(long)]
        ascii: bool,

        /// Transpose attribute and field tables on read and write
        #[arg(long)]
        switch_rows_cols: bool,

        /// Keep at most N columns of scalar and field tables
        #[arg(long, value_name = "N")]
        max_columns: Option<usize>,
    },

    /// Print a numeric or string field
    Field {
        input: PathBuf,

        name: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::load()?,
    };
    debug!(?config, "configuration loaded");
    let options: StoreOptions = config.into();

    match cli.command {
        Commands::Info { input, kind, json } => info_command(&input, kind, json, options)?,
        Commands::Convert {
            inputs,
            out_dir,
            binary,
            ascii,
            switch_rows_cols,
            max_columns,
        } => {
            let mut options = options;
            if binary {
                options.binary = true;
            }
            if ascii {
                options.binary = false;
            }
            if switch_rows_cols {
                options.switch_rows_cols = true;
            }
            if max_columns.is_some() {
                options.max_columns = max_columns;
            }
            convert_command(&inputs, &out_dir, &options, cli.quiet)?;
        }
        Commands::Field { input, name } => field_command(&input, &name, options)?,
        Commands::Version => {
            println!("meshvtk v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn open_store(
    input: &Path,
    kind: Option<KindArg>,
    options: StoreOptions,
) -> Result<MeshFileStore> {
    let store = match kind {
        Some(kind) => {
            let mut store = MeshFileStore::with_options(kind.into(), options);
            store.load(input)?;
            store
        }
        None => MeshFileStore::open_detected(input, options)?,
    };
    Ok(store)
}

fn info_command(
    input: &Path,
    kind: Option<KindArg>,
    json: bool,
    options: StoreOptions,
) -> Result<()> {
    let store = open_store(input, kind, options)
        .with_context(|| format!("Failed to load {:?}", input))?;
    let summary = DatasetSummary::from_store(&input.display().to_string(), &store);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        Reporter::report_summary(&summary);
    }
    Ok(())
}

fn convert_command(
    inputs: &[PathBuf],
    out_dir: &Path,
    options: &StoreOptions,
    quiet: bool,
) -> Result<()> {
    let files = discover_inputs(inputs)?;
    if files.is_empty() {
        Reporter::report_error("No .vtk files found");
        std::process::exit(1);
    }

    let progress = if quiet {
        None
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .context("Invalid progress template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let start = Instant::now();
    let results = convert_all(&files, out_dir, options, progress.as_ref())?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let failed = Reporter::report_conversions(&results, start.elapsed());
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn field_command(input: &Path, name: &str, options: StoreOptions) -> Result<()> {
    let store = open_store(input, None, options)
        .with_context(|| format!("Failed to load {:?}", input))?;

    match store.field(name) {
        Ok(table) => Reporter::report_table(name, table),
        Err(VtkError::FieldNotFound(_)) => {
            let strings = store.string_field(name)?;
            Reporter::report_strings(name, strings);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
