//! CLI commands module.

mod chat;
mod devices;
mod timeline;

pub use chat::ChatCommand;
pub use devices::DevicesCommand;
pub use timeline::TimelineCommand;

use anyhow::Context as _;
use skytalk_timeline::{Timeline, TimelineConfig, PAGE_SIZE};

use crate::config::{load_config, Config};
use crate::Cli;

/// Loads the configuration selected on the command line.
pub(crate) fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(cli.config.as_deref())
}

/// Logs in to Bluesky and fetches the first snapshot.
pub(crate) async fn open_timeline(cfg: &Config) -> anyhow::Result<Timeline> {
    cfg.require_bluesky()?;
    let timeline = Timeline::new(TimelineConfig {
        service: cfg.bluesky.service.clone(),
        handle: cfg.bluesky.handle.clone(),
        app_password: cfg.bluesky.app_password.clone(),
        fetch_limit: cfg.bluesky.fetch_limit,
        page_size: PAGE_SIZE,
    })?;
    timeline
        .initialize()
        .await
        .with_context(|| format!("failed to load timeline for {}", cfg.bluesky.handle))?;
    Ok(timeline)
}
