//! # Beltworks CLI Application
//!
//! Terminal front end for the conveyor drive calculators and the shaft
//! geometry editor. Every command prints a human-readable block followed by
//! the JSON the web API would return.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use calc_core::calculations::form::FieldSpec;
use calc_core::shaft::editor::{HiddenField, TextField};
use calc_core::shaft::table::SegmentField;
use calc_core::{
    append_record, load_records, CalculationRecord, CalculationResult, CalculatorKind,
    ShaftEditor,
};
use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const RULE: &str = "═══════════════════════════════════════";
const DEFAULT_RECORDS_PATH: &str = "beltworks-results.json";
const DEFAULT_MAX_SAVED_RESULTS: usize = 200;

#[derive(Debug, Parser)]
#[command(name = "calc_cli", about = "Belt conveyor drive calculators")]
struct Cli {
    /// Results file used by --save and `history`
    #[arg(long, env = "BELTWORKS_RECORDS_PATH", default_value = DEFAULT_RECORDS_PATH, global = true)]
    records: PathBuf,

    /// Oldest results are dropped once the file holds this many
    #[arg(
        long,
        env = "BELTWORKS_MAX_SAVED_RESULTS",
        default_value_t = DEFAULT_MAX_SAVED_RESULTS,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..),
        global = true
    )]
    max_saved_results: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Required drive power for a belt conveyor.
    BeltPower {
        /// Material throughput (t/h)
        #[arg(long)]
        throughput: f64,
        /// Lift height (m)
        #[arg(long)]
        lift_height: f64,
        /// Friction factor (N per tonne)
        #[arg(long, default_value_t = 15.0)]
        friction_factor: f64,
        /// Belt speed (m/s)
        #[arg(long)]
        belt_speed: f64,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// Pulley torque from motor power and speed.
    PulleyTorque {
        /// Drive power (kW)
        #[arg(long)]
        power: f64,
        /// Pulley speed (rpm)
        #[arg(long)]
        rotational_speed: f64,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// Tight and slack side belt tensions.
    BeltTension {
        /// Pulley torque (N·m)
        #[arg(long)]
        torque: f64,
        /// Pulley radius (m)
        #[arg(long)]
        pulley_radius: f64,
        /// Wrap angle (degrees)
        #[arg(long, default_value_t = 180.0)]
        wrap_angle: f64,
        /// Belt/pulley friction coefficient
        #[arg(long, default_value_t = 0.35)]
        friction_coefficient: f64,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// Inspect a shaft geometry and optionally write its preview as SVG.
    Shaft {
        /// Segment list as JSON, e.g. '[{"length_mm":150,"diameter_mm":60}]'.
        /// Omit for the default shape.
        #[arg(long, default_value = "")]
        geometry: String,
        /// Append N copies of the last segment before printing
        #[arg(long, default_value_t = 0)]
        add: usize,
        /// Write the preview diagram to this file
        #[arg(long)]
        svg: Option<PathBuf>,
    },
    /// List saved results, newest first.
    History {
        /// Only show one calculator (slug, e.g. pulley_torque)
        #[arg(long)]
        calculator: Option<String>,
    },
}

#[derive(Debug, Args)]
struct SaveArgs {
    /// Save the result to the results file
    #[arg(long)]
    save: bool,
}

fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    debug!(
        records = %cli.records.display(),
        max_saved_results = cli.max_saved_results,
        "parsed command line"
    );
    let save_to = |save: SaveArgs| save.save.then_some((&cli.records, cli.max_saved_results));

    match cli.command {
        Commands::BeltPower {
            throughput,
            lift_height,
            friction_factor,
            belt_speed,
            save,
        } => run_calculator(
            CalculatorKind::BeltPower,
            json!({
                "throughput": throughput,
                "lift_height": lift_height,
                "friction_factor": friction_factor,
                "belt_speed": belt_speed,
            }),
            save_to(save),
        ),
        Commands::PulleyTorque {
            power,
            rotational_speed,
            save,
        } => run_calculator(
            CalculatorKind::PulleyTorque,
            json!({ "power": power, "rotational_speed": rotational_speed }),
            save_to(save),
        ),
        Commands::BeltTension {
            torque,
            pulley_radius,
            wrap_angle,
            friction_coefficient,
            save,
        } => run_calculator(
            CalculatorKind::BeltTension,
            json!({
                "torque": torque,
                "pulley_radius": pulley_radius,
                "wrap_angle": wrap_angle,
                "friction_coefficient": friction_coefficient,
            }),
            save_to(save),
        ),
        Commands::Shaft { geometry, add, svg } => run_shaft(&geometry, add, svg),
        Commands::History { calculator } => run_history(&cli.records, calculator.as_deref()),
    }
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn field_value(input: &Value, spec: &FieldSpec) -> String {
    input
        .get(spec.name)
        .map(Value::to_string)
        .unwrap_or_default()
}

fn run_calculator(
    kind: CalculatorKind,
    input: Value,
    save_to: Option<(&PathBuf, usize)>,
) -> Result<()> {
    let result = match kind.calculate_json(&input) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            std::process::exit(1);
        }
    };

    print_result(kind, &input, &result);

    if let Some((path, max_saved_results)) = save_to {
        let record = CalculationRecord::new(kind, input, result);
        let file = append_record(path, record, max_saved_results, "calc_cli")
            .with_context(|| format!("failed to save result to {}", path.display()))?;
        info!(calculator = %kind, total = file.len(), "saved calculation result");
        println!();
        println!("Saved to {} ({} records)", path.display(), file.len());
    }

    Ok(())
}

fn print_result(kind: CalculatorKind, input: &Value, result: &CalculationResult) {
    println!("{}", RULE);
    println!("  {}", kind.title().to_uppercase());
    println!("{}", RULE);
    println!();
    println!("Input:");
    for spec in kind.fields() {
        println!("  {:<36} {}", spec.label, field_value(input, spec));
    }
    println!();
    println!("{}:", result.title);
    println!("  {} {}", result.value, result.units);
    println!("  {}", result.description);
    println!();
    println!("{}", RULE);

    println!();
    println!("JSON Output (for API use):");
    if let Ok(json) = serde_json::to_string_pretty(result) {
        println!("{}", json);
    }
}

fn run_shaft(geometry: &str, add: usize, svg: Option<PathBuf>) -> Result<()> {
    let mut editor = ShaftEditor::new(TextField::new("geometry", geometry));
    for _ in 0..add {
        editor.add_segment();
    }

    println!("{}", RULE);
    println!("  SHAFT GEOMETRY");
    println!("{}", RULE);
    println!();
    println!(
        "  {:>3}  {:>12}  {:>14}",
        "#",
        SegmentField::Length.label(),
        SegmentField::Diameter.label()
    );
    for row in editor.rows() {
        println!(
            "  {:>3}  {:>12}  {:>14}",
            row.number, row.length_mm, row.diameter_mm
        );
    }
    println!();
    println!("  {}", editor.summary_text());
    println!();
    println!("{}", RULE);

    if let Some(path) = svg {
        fs::write(&path, editor.preview_svg())
            .with_context(|| format!("failed to write preview to {}", path.display()))?;
        println!();
        println!("Preview written to {}", path.display());
    }

    println!();
    println!("Geometry JSON:");
    println!("{}", editor.field().value());

    Ok(())
}

fn run_history(path: &PathBuf, calculator: Option<&str>) -> Result<()> {
    let filter = calculator.map(CalculatorKind::parse).transpose()?;
    let file = load_records(path)
        .with_context(|| format!("failed to read results from {}", path.display()))?;

    let records: Vec<_> = match filter {
        Some(kind) => file.for_calculator(kind).collect(),
        None => file.records.iter().collect(),
    };

    if records.is_empty() {
        println!("No saved results in {}", path.display());
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {:<14} {}: {} {}",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.calculator.title(),
            record.result.title,
            record.result.value,
            record.result.units
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_saved_results_flag() {
        let cli = Cli::try_parse_from(["calc_cli", "history"]).unwrap();
        assert_eq!(cli.max_saved_results, DEFAULT_MAX_SAVED_RESULTS);

        let cli = Cli::try_parse_from(["calc_cli", "history", "--max-saved-results", "25"]).unwrap();
        assert_eq!(cli.max_saved_results, 25);

        assert!(Cli::try_parse_from(["calc_cli", "history", "--max-saved-results", "0"]).is_err());
        assert!(Cli::try_parse_from(["calc_cli", "history", "--max-saved-results", "many"]).is_err());
    }
}
