use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::HttpClient;
use crate::app::App;

mod api;
mod app;
mod cli;
mod colors;
mod commands;
mod config;
mod context;
mod form;
mod modal;
mod model;
mod navigation;
mod search;
mod service;
mod stores;
mod theme;
mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting storedash");

    let args = cli::Args::parse();

    let mut config = config::load()?;
    if let Some(api_url) = &args.api_url {
        config.api.base_url.clone_from(api_url);
    }
    let route = args.initial_route(config.last_store.as_deref());
    let client = HttpClient::new(&config.api)?;
    let theme = theme::theme_from_name(&config.theme.name);

    let mut app = App::new(Arc::new(config), client, theme, route);
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("storedash").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "storedash.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
