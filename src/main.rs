use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use crate::cli::Cli;
use emberlog::build::build_site;

mod cli;

/// Exit status for invalid command lines.
const EXIT_USAGE: u8 = 22;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(EXIT_USAGE);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(cli.level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match build_site(&cli.blogdir, &cli.destdir, &cli.options()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::from(err.exit_code())
        }
    }
}
