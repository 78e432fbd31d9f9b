//! Platform-aware logging initialization.
//!
//! Web builds route `tracing` events to the browser console with a level that
//! can be changed at runtime and is remembered in local storage. Other builds
//! log to stderr filtered by `RUST_LOG`.

use std::sync::Once;

use tracing::level_filters::LevelFilter;

static INIT: Once = Once::new();

const LEVEL_STORAGE_KEY: &str = "pp_web_log_level";

/// Initialize logging for the current platform. Idempotent.
pub fn init() {
    INIT.call_once(|| {
        #[cfg(feature = "web")]
        init_web_logging();
        #[cfg(not(feature = "web"))]
        init_native_logging();
    });
}

#[cfg(feature = "web")]
static RELOAD_HANDLE: std::sync::OnceLock<tracing_subscriber::reload::Handle<LevelFilter, tracing_subscriber::Registry>> =
    std::sync::OnceLock::new();

#[cfg(feature = "web")]
fn init_web_logging() {
    console_error_panic_hook::set_once();
    use tracing_subscriber::prelude::*;
    use tracing_web::MakeWebConsoleWriter;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(MakeWebConsoleWriter::new())
        .without_time();

    let initial_level = stored_level().unwrap_or(LevelFilter::WARN);
    let (filter, handle) = tracing_subscriber::reload::Layer::new(initial_level);
    let _ = RELOAD_HANDLE.set(handle);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

#[cfg(not(feature = "web"))]
fn init_native_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value {
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

fn level_name(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::ERROR => "error",
        LevelFilter::INFO => "info",
        LevelFilter::DEBUG => "debug",
        LevelFilter::TRACE => "trace",
        _ => "warn",
    }
}

fn stored_level() -> Option<LevelFilter> {
    let storage = super::storage::BrowserStorage::new(super::storage::StorageType::Local);
    parse_level(&storage.get(LEVEL_STORAGE_KEY)?)
}

/// Change the console level now and remember it for the next visit.
pub fn set_log_level(level: LevelFilter) {
    #[cfg(feature = "web")]
    if let Some(handle) = RELOAD_HANDLE.get() {
        let _ = handle.reload(level);
    }
    let storage = super::storage::BrowserStorage::new(super::storage::StorageType::Local);
    if let Err(err) = storage.set(LEVEL_STORAGE_KEY, level_name(level)) {
        tracing::warn!(error = %err, "could not store log level");
    }
}

pub fn get_log_level() -> LevelFilter {
    stored_level().unwrap_or(if cfg!(feature = "web") { LevelFilter::WARN } else { LevelFilter::INFO })
}
