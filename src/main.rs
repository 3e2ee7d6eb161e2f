use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flatrec::{SchemaRegistry, Value};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Decode flat positional records using text record definitions
#[derive(Parser)]
#[command(name = "flatrec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an input file and print the decoded records
    Decode {
        /// Record definitions file (one `Name = declarations` per line)
        #[arg(short, long, value_name = "FILE")]
        schema: PathBuf,

        /// Name of the record to decode
        #[arg(short, long)]
        record: String,

        /// Input is hex text rather than raw bytes
        #[arg(long)]
        hex: bool,

        /// Decode records back-to-back until the input is exhausted
        #[arg(short, long)]
        all: bool,

        /// Input file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Show resolved field descriptors for record definitions
    Schema {
        /// Record definitions file
        #[arg(short, long, value_name = "FILE")]
        schema: PathBuf,

        /// Only show this record
        #[arg(short, long)]
        record: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    install_tracing(cli.verbose);

    match cli.command {
        Commands::Decode {
            schema,
            record,
            hex,
            all,
            input,
        } => decode_command(&schema, &record, hex, all, &input),
        Commands::Schema { schema, record } => schema_command(&schema, record.as_deref()),
    }
}

fn install_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn load_registry(path: &Path) -> Result<SchemaRegistry> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record definitions: {}", path.display()))?;
    SchemaRegistry::from_definitions(&text)
        .with_context(|| format!("Invalid record definitions in {}", path.display()))
}

fn decode_command(schema: &Path, record: &str, hex: bool, all: bool, input: &Path) -> Result<()> {
    let registry = load_registry(schema)?;

    let file = std::fs::File::open(input)
        .with_context(|| format!("Failed to open input: {}", input.display()))?;
    let file_size = file.metadata()?.len();

    // Zero-length files cannot be mapped
    let mmap = if file_size > 0 {
        Some(unsafe { memmap2::Mmap::map(&file)? })
    } else {
        None
    };
    let raw: &[u8] = mmap.as_deref().unwrap_or(&[]);

    let decoded_hex;
    let data: &[u8] = if hex {
        let digits: String = String::from_utf8_lossy(raw)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        decoded_hex = hex::decode(&digits).context("Input is not valid hex")?;
        &decoded_hex
    } else {
        raw
    };

    let start = Instant::now();
    let values: Vec<Value> = if all {
        registry.decode_all(record, data)
    } else {
        registry.decode(record, data).map(|value| vec![value])
    }
    .with_context(|| format!("Failed to decode {} from {}", record, input.display()))?;

    info!(
        records = values.len(),
        bytes = data.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "decoded input"
    );

    for value in &values {
        println!("{}", value);
    }

    Ok(())
}

fn schema_command(schema: &Path, record: Option<&str>) -> Result<()> {
    let registry = load_registry(schema)?;

    let selected: Vec<_> = match record {
        Some(name) => vec![registry
            .get(name)
            .with_context(|| format!("Record '{}' not found in {}", name, schema.display()))?],
        None => registry.schemas().collect(),
    };

    for (i, schema) in selected.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}:", schema.name);
        for field in &schema.fields {
            println!("  {}", field);
        }
    }

    Ok(())
}
