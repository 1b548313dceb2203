//! tou-billing entry point: CLI wiring around the billing pipeline.

use std::io::{self, Write};
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tou_billing::billing::{price_all, segment};
use tou_billing::cli::{self, CliOptions, Command};
use tou_billing::config::BillingConfig;
use tou_billing::io::export::export_csv;
use tou_billing::io::read_readings;
use tou_billing::query::run_query_loop;
use tou_billing::report::{write_detail, write_summaries};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &CliOptions) -> BillingConfig {
    let loaded = if let Some(ref path) = cli.config {
        BillingConfig::from_toml_file(path)
    } else {
        BillingConfig::from_preset(cli.preset.as_deref().unwrap_or("b19"))
    };
    let config = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

fn fail(context: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("error: {context}: {e}");
    process::exit(1);
}

fn main() {
    init_tracing();

    let cli = match cli::parse_args() {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            cli::print_usage();
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    let config = load_config(&cli);
    info!(tariff = %config.tariff.name, "configuration loaded");

    let readings = read_readings(&cli.input, &config.input)
        .unwrap_or_else(|e| fail(&format!("cannot read {}", cli.input.display()), e));
    let mut cycles = segment(&readings).unwrap_or_else(|e| fail("cannot segment readings", e));
    if let Err(e) = price_all(&mut cycles, &config.tariff) {
        fail("cannot price billing cycles", e);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_summaries(&cycles, &mut out) {
        fail("cannot write report", e);
    }

    if let Some(ref key) = cli.detail {
        let cycle = cycles.lookup(key).unwrap_or_else(|e| fail("--detail", e));
        if let Err(e) = write_detail(cycle, &config.tariff, &mut out) {
            fail("cannot write report", e);
        }
    }
    if let Err(e) = out.flush() {
        fail("cannot write report", e);
    }
    drop(out);

    if let Some(ref path) = cli.bills_out {
        if let Err(e) = export_csv(&cycles, path) {
            fail("failed to write CSV", e);
        }
        eprintln!("Bills written to {}", path.display());
    }

    if cli.interactive {
        let stdin = io::stdin();
        if let Err(e) = run_query_loop(&cycles, &config.tariff, stdin.lock(), io::stdout()) {
            fail("interactive session", e);
        }
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(tou_billing::api::AppState {
            tariff: config.tariff,
            cycles,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| fail("failed to create tokio runtime", e));
        if let Err(e) = rt.block_on(tou_billing::api::serve(state, addr)) {
            fail("API server", e);
        }
    }
}
