#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod app;
mod exporters;

use std::process::ExitCode;

use app::{
    options::{from_command_line, Options},
    runtime::Config,
};

fn main() -> ExitCode {
    // Get args from command line
    let args = from_command_line();
    // Create application options
    let options = Options::from_args(&args);

    match options {
        Ok(options) => match Config::new(options) {
            Ok(app) => {
                if let Err(why) = app.start() {
                    eprintln!("Unable to export: {why}");
                    return ExitCode::FAILURE;
                }
                ExitCode::SUCCESS
            }
            Err(why) => {
                eprintln!("Unable to decode input: {why}");
                ExitCode::FAILURE
            }
        },
        Err(why) => {
            eprintln!("{why}");
            ExitCode::FAILURE
        }
    }
}
