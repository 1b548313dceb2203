//! Command-line argument parsing for the `tou-billing` binary.

use std::env;
use std::path::PathBuf;

/// Default API server port.
#[cfg(feature = "api")]
pub const DEFAULT_PORT: u16 = 3000;

/// What the binary was asked to do.
#[derive(Debug)]
pub enum Command {
    Run(CliOptions),
    Help,
}

/// Parsed options for a billing run.
#[derive(Debug)]
pub struct CliOptions {
    /// Interval data CSV.
    pub input: PathBuf,
    /// TOML configuration file; exclusive with `preset`.
    pub config: Option<PathBuf>,
    /// Built-in configuration name; defaults to `b19` when no config is given.
    pub preset: Option<String>,
    /// `MM-YYYY` cycle to print a detailed breakdown for.
    pub detail: Option<String>,
    /// Path for the bill CSV export.
    pub bills_out: Option<PathBuf>,
    /// Start the interactive lookup loop after the summary.
    pub interactive: bool,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: u16,
}

pub fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

/// Parses arguments, not including the program name.
///
/// # Errors
///
/// Returns a message describing the first problem found.
pub fn parse_args_from(args: Vec<String>) -> Result<Command, String> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(Command::Help);
    }
    parse_options(&args).map(Command::Run)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut input = None;
    let mut config = None;
    let mut preset = None;
    let mut detail = None;
    let mut bills_out = None;
    let mut interactive = false;
    #[cfg(feature = "api")]
    let mut serve = false;
    #[cfg(feature = "api")]
    let mut port = DEFAULT_PORT;

    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --input (expected a CSV file path)")?;
                if input.replace(PathBuf::from(path)).is_some() {
                    return Err("--input provided more than once".to_string());
                }
            }
            "--config" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--detail" => {
                i += 1;
                let key = args.next_or_err(i, "missing value for --detail (expected MM-YYYY)")?;
                if detail.replace(key.to_string()).is_some() {
                    return Err("--detail provided more than once".to_string());
                }
            }
            "--bills-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --bills-out (expected a file path)")?;
                if bills_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--bills-out provided more than once".to_string());
                }
            }
            "--interactive" | "-i" => interactive = true,
            #[cfg(feature = "api")]
            "--serve" => serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                port = value
                    .parse()
                    .map_err(|_| format!("--port value \"{value}\" is not a valid u16"))?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if config.is_some() && preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if config.is_none() && preset.is_none() {
        preset = Some("b19".to_string());
    }

    let input = input.ok_or_else(|| "missing required argument --input <csv>".to_string())?;

    Ok(CliOptions {
        input,
        config,
        preset,
        detail,
        bills_out,
        interactive,
        #[cfg(feature = "api")]
        serve,
        #[cfg(feature = "api")]
        port,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("tou-billing: monthly bills from time-of-use interval meter data");
    eprintln!();
    eprintln!("Usage: tou-billing --input <csv> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --input <path>       Interval data CSV (required)");
    eprintln!("  --config <path>      Load tariff and CSV layout from a TOML file");
    eprintln!("  --preset <name>      Use a built-in configuration (b19, b19_voluntary)");
    eprintln!("  --detail <MM-YYYY>   Print the detailed breakdown of one cycle");
    eprintln!("  --bills-out <path>   Export one CSV row per billing cycle");
    eprintln!("  -i, --interactive    Look up detailed bills by MM-YYYY after the summary");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve              Start the REST API after billing");
        eprintln!("  --port <u16>         API server port (default: {DEFAULT_PORT})");
    }
    eprintln!("  -h, --help           Show this help message");
    eprintln!();
    eprintln!("If neither --config nor --preset is given, the b19 preset is used.");
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=info) for progress logging on stderr.");
}
