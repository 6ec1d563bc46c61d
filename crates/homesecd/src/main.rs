use std::io::{self, Write};
use std::process::ExitCode;

use homesec_config::{Config, ConfigError};

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(ConfigError::Cli(error)) => {
            // Help and version requests arrive here too and exit cleanly.
            let _ = error.print();
            return ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(1));
        }
        Err(error) => return report_failure(&error),
    };

    match homesecd::run_daemon(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(
                target: concat!(env!("CARGO_PKG_NAME"), "::process"),
                error = %error,
                "daemon exited with an error"
            );
            report_failure(&error)
        }
    }
}

fn report_failure(error: &dyn std::error::Error) -> ExitCode {
    let _ = writeln!(io::stderr(), "homesecd: {error}");
    ExitCode::FAILURE
}
