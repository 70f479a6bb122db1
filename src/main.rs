//! `dotsync` command-line entry point.
use std::process::ExitCode;

use dotsync::error::{CliError, classify};
use dotsync::{cli, commands, logging};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();

    let args = match cli::try_parse(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => {
            let classified = cli::classify_clap_error(&err);
            if matches!(classified, CliError::HelpRequested) {
                err.print().ok();
                return ExitCode::SUCCESS;
            }
            logging::init_subscriber(false, "cli");
            tracing::error!("{}: {classified}", classified.kind());
            return ExitCode::FAILURE;
        }
    };

    logging::init_subscriber(args.verbose, args.command.name());
    let log = logging::Logger::new(args.command.name());

    match commands::run(&args, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let class = classify(&err);
            let line = format!("{}: {err:#}", class.kind);
            if class.soft {
                log.warn(&line);
            } else {
                log.error(&line);
            }
            if let Some(path) = log.log_path() {
                log.debug(&format!("full log in {}", path.display()));
            }
            ExitCode::FAILURE
        }
    }
}
