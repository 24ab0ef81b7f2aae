mod cli;
mod replay;

use crate::cli::Cli;
use crate::replay::Replay;
use anyhow::{Context, anyhow};
use sapp::domain::config::AppConfig;
use sapp::domain::registry;
use sapp::features::cart::CartSessions;
use sapp::features::catalog::Catalog;
use sapp::kernel::config::load_config;
use sapp_logger::Logger;
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_checked();

    let mut config: AppConfig = load_config(cli.config.as_deref())?;
    cli.apply(&mut config);

    let _logger =
        Logger::builder().name(env!("CARGO_BIN_NAME")).with_config(&config.logging)?.init()?;

    let slices = sapp::init(&config).map_err(|e| anyhow!("Feature initialization failed: {e}"))?;
    let catalog = registry::find::<Catalog>(&slices).context("Catalog slice is not enabled")?;
    let sessions = registry::find::<CartSessions>(&slices).context("Cart slice is not enabled")?;

    let replay = Replay::open(catalog, sessions);
    let mut out = io::stdout().lock();

    for command in &cli.commands {
        replay.run(command, &mut out)?;
    }

    if cli.json {
        serde_json::to_writer_pretty(&mut out, &replay.snapshot()?)?;
        writeln!(out)?;
    } else {
        replay.render(&mut out)?;
    }

    out.flush()?;
    replay.close();
    Ok(())
}
