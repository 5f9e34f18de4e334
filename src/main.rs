//! @dose
//! purpose: This is the CLI entry point for generate-docs. It parses command-line arguments
//!     using clap, installs the tracing subscriber and hands off to run_generate.
//!
//! when-editing:
//!     - !All command handlers are imported from the compdoc crate
//!     - Error messages are printed to stderr and exit with code 1
//!
//! invariants:
//!     - The process exits with 0 on success, 1 on any error (2 for usage errors, from clap)
//!     - Logs go to stderr; stdout carries only the confirmation line
//!
//! do-not:
//!     - Never add business logic here - delegate to command modules
//!     - Never panic - always use proper error handling
//!
//! gotchas:
//!     - RUST_LOG, when set, replaces the level derived from the logging flags

use clap::Parser;
use compdoc::cli::{Cli, LoggingArgs};
use compdoc::commands::run_generate;
use std::env;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.logging);

    if let Err(e) = run_generate(&cli.generate) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &LoggingArgs) {
    let level = parse_level(&args.level());

    let mut filter = EnvFilter::from_default_env();
    if env::var("RUST_LOG").is_err() {
        filter = filter.add_directive(
            format!("compdoc={}", level)
                .parse()
                .unwrap_or_else(|_| LevelFilter::INFO.into()),
        );
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("Warning: Invalid log level '{}', using 'info'", level_str);
            Level::INFO
        }
    }
}
