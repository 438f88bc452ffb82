use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::sync::Arc;

use launchbar::app::{
    config::Config, r#loop::run_loop, router::CommandRouter, store::ListStore,
    view_pool::ViewPool,
};
use launchbar::infrastructure::{headless::HeadlessHost, json_store::JsonFileRepository};

const ENV_LOG: &str = "LAUNCHBAR_LOG";
const ENV_LOG_STYLE: &str = "LAUNCHBAR_LOG_STYLE";

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    Builder::from_env(
        Env::new()
            .filter_or(ENV_LOG, "info")
            .write_style(ENV_LOG_STYLE),
    )
    .target(Target::Stderr)
    .init();

    let config = Config::load();
    let data_path = config
        .data_path()
        .context("no data file configured and no home directory to default to")?;
    log::info!("using {}", data_path.display());

    let store = ListStore::open(Box::new(JsonFileRepository::new(data_path)));
    let views = ViewPool::new(Arc::new(HeadlessHost::new()));
    let router = CommandRouter::new(store, views)
        .open_externally_on_kill(config.open_externally_on_kill);

    run_loop(router, config.channel_capacity).await
}
