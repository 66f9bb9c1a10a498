//! cohort-cli: command-line interface for the cohort compatibility
//! partitioning engine.
//!
//! # Commands
//!
//! - `allocate`: load a catalog and a person table, partition the
//!   cohort (greedy, optionally refined with simulated annealing), and
//!   print the partition plus metrics as JSON.
//! - `validate`: load a catalog and person table and attempt
//!   `Cohort::new`, reporting whether the input is well-formed without
//!   running an allocator.
//! - `schema`: print example catalog/overlay/person-table/output
//!   documents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cohort_core::Cohort;
use cohort_cli::{loader, output};

#[derive(Parser)]
#[command(name = "cohort-cli")]
#[command(author = "cohort-core")]
#[command(version = "0.1.0")]
#[command(about = "Cohort compatibility partitioning engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Partition a cohort into compatibility-optimized groups
    Allocate {
        /// Attribute catalog document (JSON or YAML)
        #[arg(long, value_name = "FILE")]
        catalog: PathBuf,

        /// Optional per-attribute weight/enabled overlay document
        #[arg(long, value_name = "FILE")]
        overlay: Option<PathBuf>,

        /// Person table (CSV)
        #[arg(long, value_name = "FILE")]
        people: PathBuf,

        /// Minimum group size
        #[arg(long = "n-min")]
        n_min: usize,

        /// Maximum group size
        #[arg(long = "n-max")]
        n_max: usize,

        /// Refine the greedy partition with the simulated-annealing
        /// refiner
        #[arg(long, requires = "seed")]
        anneal: bool,

        /// RNG seed for the simulated-annealing refiner (required with
        /// --anneal, for reproducibility)
        #[arg(long)]
        seed: Option<u64>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a catalog and person table without running an allocator
    Validate {
        #[arg(long, value_name = "FILE")]
        catalog: PathBuf,

        #[arg(long, value_name = "FILE")]
        overlay: Option<PathBuf>,

        #[arg(long, value_name = "FILE")]
        people: PathBuf,

        #[arg(long = "n-min")]
        n_min: usize,

        #[arg(long = "n-max")]
        n_max: usize,
    },

    /// Print example catalog, overlay, person-table, and output documents
    Schema {
        /// Which schema to print: catalog, overlay, people, output, or all
        #[arg(value_name = "TYPE", default_value = "all")]
        schema_type: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Allocate {
            catalog,
            overlay,
            people,
            n_min,
            n_max,
            anneal,
            seed,
            pretty,
        } => cmd_allocate(catalog, overlay, people, n_min, n_max, anneal, seed, pretty),

        Commands::Validate {
            catalog,
            overlay,
            people,
            n_min,
            n_max,
        } => cmd_validate(catalog, overlay, people, n_min, n_max),

        Commands::Schema { schema_type } => cmd_schema(&schema_type),
    }
}

fn build_cohort(
    catalog_path: PathBuf,
    overlay_path: Option<PathBuf>,
    people_path: PathBuf,
    n_min: usize,
    n_max: usize,
) -> Result<Cohort> {
    let mut raw = loader::load_catalog(&catalog_path)?;
    if let Some(overlay_path) = overlay_path {
        loader::apply_overlay(&mut raw, &overlay_path)?;
    }

    let headers = loader::read_csv_headers(&people_path)?;
    let active = loader::activate_columns_present_in(&raw, &headers);
    let catalog = loader::build_catalog(raw, active)?;

    let people = loader::load_people(&people_path, &catalog)?;

    Cohort::new(people, catalog, n_min, n_max).context("failed to construct cohort")
}

fn cmd_allocate(
    catalog: PathBuf,
    overlay: Option<PathBuf>,
    people: PathBuf,
    n_min: usize,
    n_max: usize,
    anneal: bool,
    seed: Option<u64>,
    pretty: bool,
) -> Result<()> {
    let mut cohort = build_cohort(catalog, overlay, people, n_min, n_max)?;

    log::info!("running greedy allocator over {} people", cohort.people().len());
    cohort
        .allocate_greedy()
        .context("greedy allocator failed to place every person")?;

    if anneal {
        let seed = seed.context("--anneal requires --seed, for reproducibility")?;
        log::info!("refining with simulated annealing (seed {seed})");
        cohort
            .allocate_sa(seed)
            .context("simulated-annealing refiner failed")?;
    }

    let result = output::PartitionOutput::from_cohort(&cohort);
    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_validate(
    catalog: PathBuf,
    overlay: Option<PathBuf>,
    people: PathBuf,
    n_min: usize,
    n_max: usize,
) -> Result<()> {
    match build_cohort(catalog, overlay, people, n_min, n_max) {
        Ok(_) => println!("{{\"valid\": true}}"),
        Err(e) => println!(
            "{{\"valid\": false, \"error\": \"{}\"}}",
            format!("{e:#}").replace('"', "\\\"")
        ),
    }
    Ok(())
}

fn cmd_schema(schema_type: &str) -> Result<()> {
    match schema_type {
        "catalog" => print_catalog_schema(),
        "overlay" => print_overlay_schema(),
        "people" => print_people_schema(),
        "output" => print_output_schema(),
        "all" => {
            println!("=== CATALOG SCHEMA ===\n");
            print_catalog_schema()?;
            println!("\n=== OVERLAY SCHEMA ===\n");
            print_overlay_schema()?;
            println!("\n=== PEOPLE SCHEMA (CSV header) ===\n");
            print_people_schema()?;
            println!("\n=== OUTPUT SCHEMA ===\n");
            print_output_schema()?;
            Ok(())
        }
        other => anyhow::bail!("unknown schema type '{other}'; use: catalog, overlay, people, output, or all"),
    }
}

fn print_catalog_schema() -> Result<()> {
    let example = r#"{
  "attributes": [
    {
      "name": "time",
      "description": "meeting time preference",
      "selections": ["AM", "PM"],
      "compatibility_matrix": {
        "AM": {"AM": 1.0, "PM": 0.0},
        "PM": {"AM": 0.0, "PM": 1.0}
      },
      "default_weight": 1.0,
      "enabled_by_default": true
    }
  ]
}"#;
    println!("{example}");
    Ok(())
}

fn print_overlay_schema() -> Result<()> {
    let example = r#"{
  "customizations": [
    {"name": "time", "weight": 0.5, "enabled": "None"}
  ]
}"#;
    println!("{example}");
    Ok(())
}

fn print_people_schema() -> Result<()> {
    println!("name,identifier,time,time Flexibility");
    println!("Alice,1,AM,10");
    println!("Bob,2,PM,");
    Ok(())
}

fn print_output_schema() -> Result<()> {
    let example = r#"{
  "groups": [
    {
      "members": [{"name": "Alice", "identifier": 1}, {"name": "Bob", "identifier": 2}],
      "gcs": 0.9,
      "pcs_variance": 0.0
    }
  ],
  "gcs_mean": 0.9,
  "gcs_variance": 0.0
}"#;
    println!("{example}");
    Ok(())
}
