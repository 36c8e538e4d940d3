use layergen::cli::run_cli;
use layergen::logging::{init_logging, LogConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = init_logging(&LogConfig::from_env()) {
        eprintln!("⚠️  {err:#}");
    }
    match run_cli() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::FAILURE
        }
    }
}
