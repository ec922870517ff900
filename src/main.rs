mod app;
mod cache;
mod config;
mod connectivity;
mod db;
mod logging;
mod pokedex;
mod prefs;
mod view;

#[cfg(test)]
mod testutil;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dex")]
#[command(about = "An offline-first Pokédex with a connectivity-aware local cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/dex/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Treat the network as unreachable
  #[arg(long, global = true)]
  offline: bool,

  /// Keep the cache and preferences in memory for this run only
  #[arg(long, global = true)]
  ephemeral: bool,

  /// Also log to stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: app::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let config = config::Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config, args.verbose)?;

  let options = app::Options {
    offline: args.offline,
    ephemeral: args.ephemeral,
  };

  let mut app = app::App::new(config, options).await?;
  app.run(args.command).await?;

  Ok(())
}
