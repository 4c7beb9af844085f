#![allow(missing_docs)]
#![allow(clippy::print_stderr)]

use std::fs::File;

use miette::IntoDiagnostic;

use symfind_cli::CliOpts;

use tracing_subscriber::EnvFilter;

/// Exit code when some of the looked-up symbols were not found.
const EXIT_NOT_FOUND: i32 = 2;

fn main() {
    let cli = CliOpts::parse_from_cmdline();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_env_var("SYMFIND_LOG")
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match evaluate(cli) {
        Ok(true) => (),
        Ok(false) => std::process::exit(EXIT_NOT_FOUND),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

fn evaluate(cli: CliOpts) -> miette::Result<bool> {
    let config = symfind_cli::parse_config(cli.config)?;

    if let Some(output) = cli.output {
        let file = File::create(output).into_diagnostic()?;
        symfind_cli::evaluate(cli.action, config, file)
    } else {
        symfind_cli::evaluate(cli.action, config, std::io::stdout())
    }
}
