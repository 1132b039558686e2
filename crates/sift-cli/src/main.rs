use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use sift_cli::args::{log_level, Cli};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // usage errors exit 1; --help and --version are not errors
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    env_logger::Builder::new()
        .filter_level(log_level(cli.output_level))
        .format_timestamp(None)
        .init();

    match sift_cli::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sift: {err:#}");
            ExitCode::from(1)
        }
    }
}
