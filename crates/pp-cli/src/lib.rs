pub mod args;
pub mod logging;
pub mod run;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

/// Install the stderr subscriber. `RUST_LOG` wins over the default `info`;
/// `verbosity` then moves the level that many steps up (or down when negative).
pub fn init_tracing(verbosity: i32) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let initial = env_filter.max_level_hint().unwrap_or(LevelFilter::INFO);
    let base = env_filter.to_string();
    let (filter, handle) = reload::Layer::new(env_filter);
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok();
    if installed {
        logging::set_reload_handle(handle, base, initial);
        if verbosity != 0 {
            logging::shift_level(verbosity);
        }
    }
}
