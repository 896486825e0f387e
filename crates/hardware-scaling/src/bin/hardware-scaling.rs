//! Hardware scaling CLI - replay form edits and print the resulting configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hardware_scaling::catalog::gpu_count_options;
use hardware_scaling::{
    AcceleratorType, CallbackFns, Catalog, Details, HardwareConfiguration, HardwareEvent,
    HardwareScalingForm,
};

/// Hardware scaling CLI - pick machine and GPU configurations for notebook instances.
#[derive(Parser)]
#[command(name = "hardware-scaling")]
#[command(about = "Resolve machine type and GPU selections for notebook instances")]
struct Cli {
    /// Catalog file (JSON or YAML). Defaults to `HARDWARE_CATALOG` or the standard locations.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List machine types and accelerators in the catalog.
    Catalog,

    /// Apply form edits and submit (or cancel) the result.
    Resolve {
        /// Existing instance profile (JSON). Omit to start from the default configuration.
        #[arg(long)]
        details: Option<PathBuf>,

        /// Edits to apply in order, e.g. `attach-gpu=true`, `gpu-type=nvidia-tesla-t4`,
        /// `gpu-count=2`, `machine-type=n1-standard-8`.
        #[arg(long = "event", short = 'e')]
        events: Vec<HardwareEvent>,

        /// Dismiss the form instead of submitting it.
        #[arg(long, default_value = "false")]
        cancel: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let catalog = match &cli.catalog {
        Some(path) => Catalog::load_from_path(path)
            .await
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => Catalog::load().await.context("Failed to load catalog")?,
    };

    match cli.command {
        Commands::Catalog => print_catalog(&catalog),

        Commands::Resolve {
            details,
            events,
            cancel,
        } => {
            let details = match details {
                Some(path) => Some(
                    Details::load_from_path(&path)
                        .await
                        .with_context(|| format!("Failed to load details from {}", path.display()))?,
                ),
                None => None,
            };

            let configuration = resolve(catalog, details.as_ref(), &events, cancel);
            match configuration {
                Some(configuration) => {
                    println!("{}", serde_json::to_string_pretty(&configuration)?);
                }
                None => println!("Cancelled, no configuration submitted."),
            }
        }
    }

    Ok(())
}

/// Replay `events` against a fresh form and return what it submits.
fn resolve(
    catalog: Catalog,
    details: Option<&Details>,
    events: &[HardwareEvent],
    cancel: bool,
) -> Option<HardwareConfiguration> {
    let mut submitted = None;
    let callbacks = CallbackFns::new(
        |configuration| submitted = Some(configuration),
        || info!("Hardware scaling form closed"),
    );

    let events: Vec<HardwareEvent> = events
        .iter()
        .map(|event| with_catalog_machine_type(&catalog, event))
        .collect();

    let mut form = HardwareScalingForm::new(catalog, details, callbacks);
    for event in &events {
        if !form.handle(event) {
            warn!(event = %event, "Ignored edit: control is not active for the current selection");
        }
    }

    if cancel {
        form.dismiss();
    } else {
        form.submit();
    }
    submitted
}

/// Swap a machine type parsed from the command line for the catalog's entry.
fn with_catalog_machine_type(catalog: &Catalog, event: &HardwareEvent) -> HardwareEvent {
    match event {
        HardwareEvent::MachineType(machine) => catalog
            .find_machine_type(&machine.name)
            .map_or_else(|| event.clone(), |found| HardwareEvent::MachineType(found.clone())),
        other => other.clone(),
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("\n🖥️  Machine Types");
    println!("{}", "=".repeat(60));
    for family in &catalog.machine_types {
        println!("\n{}", family.base);
        for machine in &family.configurations {
            let gpu = if catalog.is_gpu_capable(&machine.name) {
                "🎮"
            } else {
                "  "
            };
            println!("   {gpu} {:<20} {}", machine.name, machine.description);
        }
    }

    println!("\n🎮 Accelerators");
    println!("{}", "=".repeat(60));
    for accelerator in &catalog.accelerator_types {
        let counts: Vec<String> = gpu_count_options(
            &catalog.accelerator_types,
            &AcceleratorType::new(accelerator.name.as_str()),
            &catalog.gpu_counts,
        )
        .into_iter()
        .map(|option| option.value)
        .collect();
        println!(
            "   {:<20} {:<20} counts: {}",
            accelerator.name,
            accelerator.description,
            counts.join(", ")
        );
    }
    println!();
}
