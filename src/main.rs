#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod error;
mod io;
mod model;
mod ui;

use tracing_subscriber::EnvFilter;

use crate::config::PlannerConfig;

fn main() -> eframe::Result<()> {
    let config_path = config::config_path();
    let read = PlannerConfig::read(&config_path);
    let config = match &read {
        Ok(Some(config)) => config.clone(),
        _ => PlannerConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match read {
        Ok(Some(_)) => tracing::info!(path = ?config_path, "loaded settings"),
        Ok(None) => tracing::info!(path = ?config_path, "no settings file; using defaults"),
        Err(e) => tracing::warn!(error = %e, "using default settings"),
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Month Planner"),
        ..Default::default()
    };

    eframe::run_native(
        "Month Planner",
        options,
        Box::new(move |cc| Ok(Box::new(app::PlannerApp::new(cc, config)))),
    )
}
