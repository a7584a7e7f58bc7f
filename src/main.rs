//! Platecut - laser-cut plate generator for split sandwich keyboard cases.
//!
//! Reads one layout description per keyboard half, builds the five-plate
//! sandwich geometry for each, and writes a single SVG cutting sheet. A
//! parse failure in one half is reported and skipped; the other half still
//! renders.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

use platecut::constants::{APP_BINARY_NAME, APP_NAME};
use platecut::export::{render_document, DocumentConfig, GridOrientation, PlateGroup};
use platecut::geometry::{PlateBuilder, PLATE_SEQUENCE};
use platecut::models::KeyboardHalf;
use platecut::parser::parse_layout;
use platecut::specs::{BaseMeasurements, PhysicalSpecs};

/// Platecut - laser-cut plate generator for split sandwich keyboard cases
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the left-half layout file
    #[arg(long, value_name = "FILE", default_value = "left.txt")]
    left: PathBuf,

    /// Path to the right-half layout file
    #[arg(long, value_name = "FILE", default_value = "right.txt")]
    right: PathBuf,

    /// Output SVG path
    #[arg(short, long, value_name = "FILE", default_value = "out.svg")]
    output: PathBuf,

    /// TOML file with alternate base measurements
    #[arg(long, value_name = "FILE")]
    specs: Option<PathBuf>,

    /// Print resolved key centers per row for each half
    #[arg(long)]
    positions: bool,

    /// Arrange halves across columns instead of plate layers
    #[arg(long)]
    halves_across: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    info!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let base = match &cli.specs {
        Some(path) => {
            debug!("loading base measurements from {}", path.display());
            BaseMeasurements::load_from_file(path)?
        }
        None => BaseMeasurements::default(),
    };
    let specs = PhysicalSpecs::derive(&base);
    let builder = PlateBuilder::new(&specs);

    let halves = [
        (KeyboardHalf::Left, &cli.left),
        (KeyboardHalf::Right, &cli.right),
    ];

    let mut groups = Vec::new();
    let mut failed = false;

    for (half, path) in halves {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout file: {}", path.display()))?;

        let layout = match parse_layout(&text) {
            Ok(layout) => layout,
            Err(err) => {
                // The failed half is excluded entirely; nothing partial is
                // ever emitted for it.
                error!("{} half: {} ({})", half.name(), err, path.display());
                failed = true;
                continue;
            }
        };
        info!(
            "{} half: {} rows, {} keys",
            half.name(),
            layout.rows.len(),
            layout.key_count()
        );

        if cli.positions {
            println!("{}", half.name());
            print!("{}", layout.key_position_report());
            println!();
        }

        for (plate_index, kind) in PLATE_SEQUENCE.into_iter().enumerate() {
            debug!("building {} plate for {} half", kind.name(), half.name());
            groups.push(PlateGroup {
                half,
                plate_index,
                shapes: builder.build_plate(&layout, half, kind),
            });
        }
    }

    let config = DocumentConfig {
        orientation: if cli.halves_across {
            GridOrientation::HalvesAcross
        } else {
            GridOrientation::LayersAcross
        },
        ..DocumentConfig::default()
    };
    let svg = render_document(&specs, &config, &groups);
    fs::write(&cli.output, svg)
        .with_context(|| format!("Failed to write output file: {}", cli.output.display()))?;
    info!("wrote {}", cli.output.display());

    if failed {
        error!(
            "one or more halves failed to parse; see errors above or run \
             `{} --help` for usage",
            APP_BINARY_NAME
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
