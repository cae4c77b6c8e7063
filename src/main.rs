//! G'Day CLI entry point.

use clap::Parser;
use gday::cli::{commands, Cli, Commands};
use gday::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    // JSON mode when asked for, or when stdout is piped.
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info,tower_http=warn"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let mut config = commands::resolve_config(cli);

    match &cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host.clone_from(host);
            }
            if let Some(port) = port {
                config.port = *port;
            }
            commands::serve::execute(&config)
        }
        Commands::Init => commands::init::execute(&config, json),
        Commands::Query(args) => commands::query::execute(args, &config, json),
        Commands::Random => commands::random::execute(&config, json),
    }
}
