mod app;
mod assistant;
mod chat;
mod cli;
mod config;
mod event;
mod logging;
mod preview;
mod project;
mod studio;
mod theme;

use anyhow::Context;
use app::SiteCraftApp;
use assistant::runner::AssistantRunner;
use assistant::KeywordResponder;
use clap::Parser;
use cli::Cli;
use config::Config;
use eframe::egui;
use preview::PreviewDocument;
use std::sync::{mpsc, Arc};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    logging::init(&config.log.filter);

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("sitecraft-runtime")
        .build()
        .context("failed to start tokio runtime")?;

    let runner = AssistantRunner::new(
        Arc::new(KeywordResponder::new()),
        config.assistant.clone(),
        tx.clone(),
        runtime.handle().clone(),
    );

    let publisher = if config.preview.enabled {
        let (publisher, state) = preview::server::channel(PreviewDocument::default(), tx.clone());
        preview::server::spawn(runtime.handle(), config.preview.bind, state);
        Some(publisher)
    } else {
        info!("preview sandbox server disabled");
        None
    };

    let app = SiteCraftApp::new(rx, runner, publisher, config.preview.open_browser);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("sitecraft")
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "sitecraft",
        native_options,
        Box::new(move |creation_context| {
            app.theme().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("window error: {err}"))?;

    Ok(())
}
