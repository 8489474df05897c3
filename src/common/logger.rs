use tracing_subscriber::{EnvFilter, fmt::{self, time::LocalTime}, prelude::*};

use crate::configs::Config;

/// Build the filter directive string from the `[logging]` section.
pub fn filter_directives(config: &Config) -> String {
    let log_level = config
        .logging
        .as_ref()
        .and_then(|l| l.level.as_deref())
        .unwrap_or("info");

    let filters = config
        .logging
        .as_ref()
        .and_then(|l| l.filters.as_deref())
        .unwrap_or("");

    if filters.is_empty() {
        log_level.to_string()
    } else {
        format!("{},{}", log_level, filters)
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
pub fn init(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let timer = LocalTime::new(time::macros::format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let stdout_layer = fmt::layer()
        .with_timer(timer)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();
}
