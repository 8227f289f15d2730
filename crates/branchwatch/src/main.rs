mod app;
mod args;
mod error;
mod logging;
mod settings;

use std::process::ExitCode;

use clap::Parser as _;

use crate::args::CliArgs;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    match app::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error}");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
