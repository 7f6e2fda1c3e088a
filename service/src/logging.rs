use crate::config::Config;
use log::LevelFilter;
use simplelog::{self, ConfigBuilder};

/// Dependency modules whose output is suppressed unless the level is Trace.
/// Outbound HTTP clients are chatty at Debug, so they are included alongside
/// the database and server stacks.
const FILTERED_MODULES: &[&str] = &[
    "sqlx", "sea_orm", "tower", "tracing", "hyper", "hyper_util", "h2", "axum", "reqwest",
    "rustls",
];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger at the configured level.
    ///
    /// Only Trace lets dependency output through; every other level hides the
    /// modules listed in `FILTERED_MODULES`.
    pub fn init_logger(config: &Config) {
        let level = to_simplelog_level(config.log_level_filter);
        let log_config = build_log_config(config.log_level_filter != LevelFilter::Trace);

        if let Err(e) = simplelog::TermLogger::init(
            level,
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        ) {
            // A logger is already installed (tests, or a second init call).
            eprintln!("Logger already initialized: {e}");
        }
    }
}

fn to_simplelog_level(level: LevelFilter) -> simplelog::LevelFilter {
    match level {
        LevelFilter::Off => simplelog::LevelFilter::Off,
        LevelFilter::Error => simplelog::LevelFilter::Error,
        LevelFilter::Warn => simplelog::LevelFilter::Warn,
        LevelFilter::Info => simplelog::LevelFilter::Info,
        LevelFilter::Debug => simplelog::LevelFilter::Debug,
        LevelFilter::Trace => simplelog::LevelFilter::Trace,
    }
}

fn build_log_config(hide_dependencies: bool) -> simplelog::Config {
    let mut builder = ConfigBuilder::new();
    builder.set_time_format_rfc3339();

    if hide_dependencies {
        for module in FILTERED_MODULES {
            builder.add_filter_ignore_str(module);
        }
    }

    builder.build()
}
