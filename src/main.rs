use std::path::PathBuf;

use scenery::{Config, Settings};

const DEFAULT_SETTINGS: &str = "scenery.toml";

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS));

    let settings = match Settings::load_or_default(&settings_path) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("failed to load {}: {e}", settings_path.display());
            std::process::exit(1);
        }
    };

    if let Err(e) = scenery::run(settings_path, settings) {
        log::error!("event loop error: {e}");
        std::process::exit(1);
    }
}
