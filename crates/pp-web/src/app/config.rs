//! Backend settings for the browser build.
//!
//! There is no process environment in the browser, so the `PP_*` values are
//! baked in at compile time and read through [`BackendConfig::from_lookup`].

use pp_types::{BackendConfig, ConfigError, ENV_BACKEND_ANON_KEY, ENV_BACKEND_URL, ENV_STORAGE_BUCKET};

fn compiled(key: &str) -> Option<String> {
    let value = match key {
        ENV_BACKEND_URL => option_env!("PP_BACKEND_URL"),
        ENV_BACKEND_ANON_KEY => option_env!("PP_BACKEND_ANON_KEY"),
        ENV_STORAGE_BUCKET => option_env!("PP_STORAGE_BUCKET"),
        _ => None,
    };
    value.map(str::to_string)
}

pub fn backend_config() -> Result<BackendConfig, ConfigError> {
    BackendConfig::from_lookup(compiled)
}
