//! Inspect and maintain stored search histories.

mod command;
mod logs;

use std::process::ExitCode;

use recall_lib::HistoryManager;

use crate::command::{CliError, Command};

#[tokio::main]
async fn main() -> ExitCode {
    logs::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CliError> {
    let invocation = command::parse(std::env::args().skip(1))?;
    if invocation.command == Command::Help {
        println!("{}", command::USAGE);
        return Ok(());
    }

    let manager = match &invocation.db {
        Some(path) => HistoryManager::open(path).await?,
        None => HistoryManager::open_default().await?,
    };
    log::debug!("Running {:?}", invocation.command);

    let mut stdout = std::io::stdout().lock();
    command::run(&invocation.command, &manager, &mut stdout).await
}
