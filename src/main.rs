use eframe::NativeOptions;
use egui_player::{PlayerApp, PlayerSettings};

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("egui_player=info,warn");
    env_logger::Builder::from_env(env)
        .filter_module("egui", log::LevelFilter::Warn)
        .filter_module("eframe", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .init();
}

fn main() -> eframe::Result<()> {
    init_logging();

    let settings = PlayerSettings::default();
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(settings.title.as_str())
            .with_inner_size(settings.inner_size)
            .with_min_inner_size(settings.min_inner_size)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        &settings.title.clone(),
        options,
        Box::new(move |cc| Ok(Box::new(PlayerApp::new(cc, &settings)?))),
    )
}
