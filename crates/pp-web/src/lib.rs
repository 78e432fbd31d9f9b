//! Project portfolio web entrypoint and common exports.
//!
//! This crate hosts the Dioxus single-page UI. Every protected route is
//! wrapped in [`components::RequireSession`], which mounts one authorization
//! gate per view.

pub mod app;
pub mod app_root;

pub use app::{components, pages, routes};
pub use routes::Routes;
