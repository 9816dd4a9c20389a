mod app;
mod mind_map;
mod session;
mod worker;

use anyhow::Context;
use eframe::egui;
use reqtrace_core::ClientConfig;

use app::ReqtraceApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ClientConfig::load_default().context("Failed to load configuration")?;
    let api = config.api_client()?;
    let author = config.author.clone().unwrap_or_default();
    log::info!("Connecting to {} (project {:?})", config.base_url, config.project_id);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Requirements Traceability"),
        ..Default::default()
    };

    eframe::run_native(
        "reqtrace",
        options,
        Box::new(move |cc| Ok(Box::new(ReqtraceApp::new(cc, api, author)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}
