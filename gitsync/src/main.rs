use std::process::ExitCode;

use clap::Parser;
use gitsync::cli::CliFlags;
use gitsync::core::Core;
use gitsync::logging;
use gitsync_common::envvar::EnvVars;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let env = EnvVars::from_os();
    logging::init(&env);

    let flags = CliFlags::parse();
    match run(&env, flags).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(env: &EnvVars, flags: CliFlags) -> anyhow::Result<()> {
    let core = Core::init(env, flags)?;
    let mut stdout = std::io::stdout();
    core.run(&mut stdout).await
}
