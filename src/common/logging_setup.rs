use env_logger::Builder;
use log::LevelFilter;
use crate::config_loader::MasterConfig;

// Windowing and GPU crates are chatty at info; keep them at warn.
const QUIET_MODULES: &[&str] = &["eframe", "egui_glow", "egui_winit", "winit", "wgpu_core", "naga", "reqwest", "hyper_util"];

pub fn level_from_str(level: &str) -> Option<LevelFilter> {
    level.trim().parse::<LevelFilter>().ok()
}

pub fn initialize_logging(config: Option<&MasterConfig>, cli_matches: &clap::ArgMatches) {
    let mut builder = Builder::new();

    // Determine log level from CLI, then config, then default
    let log_level_str = if cli_matches.get_flag("debug") {
        "debug".to_string()
    } else {
        config
            .and_then(|c| c.app_settings.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    };

    let level = level_from_str(&log_level_str).unwrap_or_else(|| {
        eprintln!("Unrecognized log level '{}', defaulting to info.", log_level_str);
        LevelFilter::Info
    });
    builder.filter_level(level);
    for module in QUIET_MODULES {
        builder.filter_module(module, level.min(LevelFilter::Warn));
    }
    // RUST_LOG still wins for ad-hoc debugging
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.try_init().unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {}. Logging might not work as expected.", e);
    });
}
