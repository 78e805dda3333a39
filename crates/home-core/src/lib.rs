pub mod cli;
pub mod commands;
pub mod config;
pub mod day;
pub mod dispatch;
pub mod session;
pub mod shell;
pub mod transport;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting home CLI"
  );
  debug!(
    overrides = pre.rc_overrides.len(),
    "preprocessed rc overrides"
  );

  let mut cfg = config::Config::load(
    cli.homerc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );
  if let Some(server) = cli.server {
    cfg.set("server.url", server);
  }
  if let Some(passcode) = cli.passcode {
    cfg.set("login.passcode", passcode);
  }

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async \
         runtime"
      )?;

  runtime.block_on(execute(
    &cfg,
    cli.command
  ))?;

  info!("done");
  Ok(())
}

async fn execute(
  cfg: &config::Config,
  command: cli::Command
) -> anyhow::Result<()> {
  let mut client =
    commands::Client::from_config(cfg)?;

  if command == cli::Command::Shell {
    return shell::run_shell(
      &mut client,
      cfg.idle_timeout()?
    )
    .await;
  }

  let report =
    client.execute(command).await?;
  println!("{report}");
  Ok(())
}
