mod commands;
pub mod exit_codes;
mod output;

pub use commands::Cli;
pub use output::OutputMode;

use crate::{config, logging};

/// run a parsed command line and return the process exit code
pub fn run(cli: Cli) -> i32 {
    let output_mode = OutputMode::from_flags(cli.json, cli.quiet);

    let config = config::load_with_override(cli.config.as_deref());
    let log_level = config.as_ref().ok().map(|c| c.settings.log_level.clone());
    logging::init(cli.verbose, log_level.as_deref());

    match commands::execute(cli, config, output_mode) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = exit_codes::for_error(&err);
            let problems = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<exit_codes::ExitError>())
                .map(|e| e.problems.clone())
                .unwrap_or_default();

            if output_mode.is_json() {
                output::print_json_error(code, &err.to_string(), problems);
            } else {
                eprintln!("Error: {}", err);
                for problem in &problems {
                    eprintln!("  - {}", problem);
                }
            }
            code
        }
    }
}
