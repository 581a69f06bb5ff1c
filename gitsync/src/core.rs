//! Mode dispatch: dry-run, one-shot sync, or the mirroring loop.

use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use gitsync_common::config::Config;
use gitsync_common::envvar::EnvVars;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::cli::{self, CliFlags};
use crate::dryrun;
use crate::engine::GitSync;
use crate::signals;

pub struct Core {
    flags: CliFlags,
    config: Config,
}

impl Core {
    /// Validate the flags and load the configuration streams.
    pub fn init(env: &EnvVars, flags: CliFlags) -> Result<Core> {
        flags.validate()?;
        let config = cli::load_config(&flags, env)?;
        Ok(Core { flags, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the selected mode. Graceful, signal-initiated shutdown is a
    /// normal termination.
    pub async fn run(&self, out: &mut impl Write) -> Result<()> {
        if !self.flags.run {
            debug!("run dry-run");
            return dryrun::write_dry_run(out, &self.config)
                .context("failed to write dry run info");
        }

        let cancel = signals::cancel_on_signals(&CancellationToken::new())
            .context("failed to install signal handlers")?;

        if self.flags.once {
            debug!("run once");
            self.run_once(&cancel).await
        } else {
            debug!("run in a loop");
            self.run_loop(&cancel).await
        }
    }

    /// One pass per mapping, sequentially, cleaning up after each.
    /// Failures are collected so every mapping gets its turn.
    async fn run_once(&self, cancel: &CancellationToken) -> Result<()> {
        let mut failures: Vec<String> = Vec::new();

        for mapping in &self.config.mappings {
            if cancel.is_cancelled() {
                break;
            }
            let engine = match GitSync::init(&self.config, mapping) {
                Ok(engine) => Arc::new(engine),
                Err(err) => {
                    failures.push(err.to_string());
                    continue;
                }
            };

            let pass = {
                let engine = Arc::clone(&engine);
                tokio::task::spawn_blocking(move || engine.run_once()).await
            };
            match pass {
                Ok(Ok(())) => {}
                Ok(Err(err)) => failures.push(err.to_string()),
                Err(join_err) => failures.push(format!("sync pass panicked: {join_err}")),
            }
            engine.clean_logged();
        }

        if !failures.is_empty() {
            bail!("{}", failures.join("; "));
        }
        Ok(())
    }

    /// Initialize every mapping up front, then run one loop task per
    /// mapping until cancellation. Any init failure aborts startup
    /// after cleaning up the already-initialized engines.
    async fn run_loop(&self, cancel: &CancellationToken) -> Result<()> {
        let mut engines = Vec::with_capacity(self.config.mappings.len());
        for mapping in &self.config.mappings {
            match GitSync::init(&self.config, mapping) {
                Ok(engine) => engines.push(Arc::new(engine)),
                Err(err) => {
                    for engine in &engines {
                        engine.clean_logged();
                    }
                    return Err(anyhow!(err));
                }
            }
        }

        let mut tasks = JoinSet::new();
        for engine in engines {
            let token = cancel.clone();
            tasks.spawn(async move {
                let result = Arc::clone(&engine).run_in_loop(&token).await;
                engine.clean_logged();
                result
            });
        }

        let mut first_failure: Option<anyhow::Error> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(error = %err, "mapping loop failed");
                    if first_failure.is_none() {
                        first_failure = Some(anyhow!(err));
                    }
                }
                Err(join_err) => {
                    error!(error = %join_err, "mapping task died");
                    if first_failure.is_none() {
                        first_failure = Some(anyhow!(join_err));
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
