//! Command line parameters.

use anyhow::{anyhow, bail, Context};
use physeng_core::SemanticVersion;
use physeng_gpu::{DeviceType, SelectionCriteria};

/// What the executable was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the help text.
    Help,
    /// Print every device with its rating.
    ListDevices,
    /// Bring up the render system and run some frames.
    Run,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub command: Command,
    pub criteria: SelectionCriteria,
    pub validation: bool,
    pub frames: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            command: Command::Run,
            criteria: SelectionCriteria::default(),
            validation: cfg!(debug_assertions),
            frames: 1,
        }
    }
}

impl Params {
    /// Parse the process arguments.
    pub fn from_env() -> anyhow::Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse(&args)
    }

    /// Parse arguments, excluding the program name.
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut params = Self::default();
        let mut args = args.iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => params.command = Command::Help,
                "--list-devices" => {
                    if params.command != Command::Help {
                        params.command = Command::ListDevices;
                    }
                }
                "--prefer" => {
                    let value = value_of(arg, args.next())?;
                    params.criteria.preferred_device_type = parse_device_type(value)?;
                }
                "--allow-any-device-type" => params.criteria.allow_any_device_type = true,
                "--graphics" => {
                    params.criteria.queues.graphics = parse_count(arg, args.next())?;
                }
                "--compute" => {
                    params.criteria.queues.compute = parse_count(arg, args.next())?;
                }
                "--transfer" => {
                    params.criteria.queues.transfer = parse_count(arg, args.next())?;
                }
                "--min-vulkan" => {
                    params.criteria.minimum_version = parse_version(arg, args.next())?;
                }
                "--desired-vulkan" => {
                    params.criteria.desired_version = parse_version(arg, args.next())?;
                }
                "--validation" => params.validation = true,
                "--no-validation" => params.validation = false,
                "--frames" => params.frames = parse_count(arg, args.next())?,
                other => bail!("unknown argument \"{other}\" (see --help)"),
            }
        }

        Ok(params)
    }
}

fn value_of<'a>(flag: &str, value: Option<&'a String>) -> anyhow::Result<&'a str> {
    value
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{flag} expects a value"))
}

fn parse_count(flag: &str, value: Option<&String>) -> anyhow::Result<u32> {
    let value = value_of(flag, value)?;
    value
        .parse()
        .with_context(|| format!("{flag} expects a non-negative integer, got \"{value}\""))
}

fn parse_version(flag: &str, value: Option<&String>) -> anyhow::Result<SemanticVersion> {
    let value = value_of(flag, value)?;
    value
        .parse()
        .with_context(|| format!("{flag} expects a version like 1.3, got \"{value}\""))
}

fn parse_device_type(value: &str) -> anyhow::Result<DeviceType> {
    match value.to_ascii_lowercase().as_str() {
        "discrete" => Ok(DeviceType::Discrete),
        "integrated" => Ok(DeviceType::Integrated),
        "virtual" => Ok(DeviceType::Virtual),
        "other" => Ok(DeviceType::Other),
        _ => bail!(
            "unknown device type \"{value}\" (expected discrete, integrated, virtual or other)"
        ),
    }
}

pub fn print_help() {
    eprintln!(
        "sph - pick a Vulkan device and bring up the physeng render system

USAGE:
    cargo run -p sph -- [OPTIONS]

DEVICE SELECTION:
    --prefer <TYPE>           Preferred device type: discrete, integrated,
                              virtual or other (default: discrete)
    --allow-any-device-type   Grade other device types instead of rejecting them
    --min-vulkan <X.Y[.Z]>    Lowest acceptable Vulkan version (default: 1.3)
    --desired-vulkan <X.Y[.Z]> Vulkan version to target (default: 1.3)

QUEUES:
    --graphics <N>            Graphics queues to request (default: 1)
    --compute <N>             Compute queues to request (default: 0)
    --transfer <N>            Transfer queues to request (default: 1)

OTHER:
    --validation              Enable the Vulkan validation layer
    --no-validation           Disable the Vulkan validation layer
                              (default: on in debug builds)
    --frames <N>              Frames to run (default: 1)
    --list-devices            Print every device with its rating and exit
    -h, --help                Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                  Set log level (e.g., info, debug, trace)"
    );
}
