use std::process::ExitCode;

use clap::Parser;

use intruder_cam::camera::NokhwaDriver;
use intruder_cam::cli::{self, Args, Command};
use intruder_cam::config::Config;
use intruder_cam::logging;

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(index) = args.camera {
        config.camera.camera_index = index;
    }

    if let Some(Command::Config { action }) = args.command {
        return match cli::handle_config_action(action, &config, args.config.as_deref()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(msg) => {
                eprintln!("{}", msg);
                ExitCode::FAILURE
            }
        };
    }

    if let Err(e) = logging::init(&config.logging.file, &config.logging.level) {
        eprintln!("Warning: {}", e);
    }

    let driver = NokhwaDriver;
    if args.test {
        cli::run_scan(&driver, args.scan_range)
    } else {
        cli::run_capture(&config, &driver, &args.reason)
    }
}
