//! physeng device selection demo.
//!
//! Creates a Vulkan instance, selects a physical device and its queues from the
//! command line criteria, creates the logical device and runs a few frames.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p sph -- [OPTIONS]
//! ```
//!
//! ## Examples
//!
//! ```bash
//! # Show what the selector thinks of every device
//! cargo run -p sph -- --list-devices
//!
//! # Take an integrated GPU, with two compute queues
//! cargo run -p sph -- --prefer integrated --compute 2
//!
//! # Take whatever is there
//! cargo run -p sph -- --allow-any-device-type
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)
//!
//! Logs go to the console and to `sph.logs` in the working directory.

mod args;

use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use physeng_core::{ApplicationInfo, SemanticVersion};
use physeng_gpu::{Instance, QueuePurpose, SelectionCriteria};
use physeng_render::RenderSystemBuilder;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::args::{print_help, Command, Params};

const APP_NAME: &str = "sph";
const FRAME_TIME: f32 = 1.0 / 60.0;

fn main() -> ExitCode {
    let params = match Params::from_env() {
        Ok(params) => params,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    if params.command == Command::Help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    let result = match params.command {
        Command::ListDevices => list_devices(&params),
        _ => run(&params),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log to the console and to `<app name>.logs`.
fn init_logging() -> anyhow::Result<()> {
    let path = format!("{APP_NAME}.logs");
    let file = File::create(&path).with_context(|| format!("could not create {path}"))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("a global subscriber is already installed")?;

    Ok(())
}

fn app_info() -> anyhow::Result<ApplicationInfo> {
    let version: SemanticVersion = env!("CARGO_PKG_VERSION")
        .parse()
        .context("invalid package version")?;
    Ok(ApplicationInfo::new(APP_NAME, version)?)
}

fn list_devices(params: &Params) -> anyhow::Result<()> {
    let instance =
        Instance::new(&app_info()?, params.validation).context("could not create the instance")?;
    let candidates = instance
        .enumerate_candidates()
        .context("could not enumerate devices")?;

    if candidates.is_empty() {
        println!("No Vulkan devices found");
        return Ok(());
    }

    let criteria: &SelectionCriteria = &params.criteria;
    for (i, candidate) in candidates.iter().enumerate() {
        let rating = criteria.rate_device(candidate);
        let eligible = candidate.api_version >= criteria.minimum_version;

        println!("[{i}] {}", candidate.summary());
        for family in &candidate.queue_families {
            let purposes: Vec<String> = QueuePurpose::ALL
                .into_iter()
                .filter(|&p| family.supports(p))
                .map(|p| p.to_string())
                .collect();
            println!(
                "      family {}: {} queues ({})",
                family.index,
                family.queue_count,
                purposes.join(", ")
            );
        }
        println!(
            "      rating {} (type {}, queues {}){}",
            rating.total(),
            rating.type_score,
            rating.queue_score,
            if eligible {
                ""
            } else {
                " - below the minimum Vulkan version"
            }
        );
    }

    Ok(())
}

fn run(params: &Params) -> anyhow::Result<()> {
    let mut system = RenderSystemBuilder::new()
        .app_info(app_info()?)
        .validation(params.validation)
        .criteria(params.criteria)
        .build()
        .context("could not start the render system")?;

    let allocation = system.allocation();
    for (family, purposes) in allocation.iter() {
        info!("Queue family {}: {:?}", family, purposes);
    }

    for _ in 0..params.frames {
        system.update(FRAME_TIME);
    }

    info!(
        "Ran {} frames on \"{}\"",
        system.frame_count(),
        system.gpu().name
    );

    Ok(())
}
