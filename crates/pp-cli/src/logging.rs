//! Runtime log level for the `pp` binary.

use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Registry, reload};

static RELOAD: OnceCell<reload::Handle<EnvFilter, Registry>> = OnceCell::new();
/// Directives the subscriber started with, e.g. from `RUST_LOG`.
static BASE: OnceCell<String> = OnceCell::new();
static RUNG: AtomicUsize = AtomicUsize::new(2);

/// Levels `-v` / `-q` move between, quietest first.
const LADDER: [LevelFilter; 5] = [
    LevelFilter::ERROR,
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
];

pub fn set_reload_handle(handle: reload::Handle<EnvFilter, Registry>, base: String, initial: LevelFilter) {
    let _ = RELOAD.set(handle);
    let _ = BASE.set(base);
    RUNG.store(rung_of(initial), Ordering::Relaxed);
}

/// Move the active level `steps` rungs up (positive) or down, staying
/// within error..=trace. Per-target directives of the starting filter are
/// kept. `None` until a reload handle is installed.
pub fn shift_level(steps: i32) -> Option<LevelFilter> {
    let handle = RELOAD.get()?;
    let rung = shifted(RUNG.load(Ordering::Relaxed), steps);
    RUNG.store(rung, Ordering::Relaxed);
    let level = LADDER[rung];
    let base = BASE.get().map(String::as_str).unwrap_or_default();
    let _ = handle.reload(with_default_level(base, level));
    Some(level)
}

/// `base` with its default level replaced by `level`.
fn with_default_level(base: &str, level: LevelFilter) -> EnvFilter {
    EnvFilter::new(base).add_directive(level.into())
}

fn shifted(rung: usize, steps: i32) -> usize {
    let top = LADDER.len() as i32 - 1;
    (rung as i32 + steps).clamp(0, top) as usize
}

/// `OFF` counts as the quietest rung.
fn rung_of(level: LevelFilter) -> usize {
    LADDER.iter().position(|l| *l == level).unwrap_or(0)
}
