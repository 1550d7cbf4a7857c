use character_stats::ui::app::StatsApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Character Stats",
        options,
        Box::new(|_cc| Ok(Box::new(StatsApp::new()))),
    )
}
