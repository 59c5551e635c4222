#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use anyhow::Context as _;

mod app;

fn main() -> anyhow::Result<()> {
    // Log to stdout (if you run with `RUST_LOG=debug`).
    use env_logger::{Builder, Target};
    let mut builder = Builder::from_default_env();
    builder.target(Target::Stdout);
    builder.init();

    let rom = match std::env::args().nth(1) {
        Some(path) => {
            std::fs::read(&path).with_context(|| format!("reading ROM from {path}"))?
        }
        None => Vec::new(),
    };

    let native_options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(960.0, 520.0)),
        ..Default::default()
    };
    eframe::run_native(
        "okto",
        native_options,
        Box::new(move |cc| Box::new(app::App::new(cc, rom))),
    )
    .map_err(|e| anyhow::anyhow!("starting the UI: {e}"))
}
