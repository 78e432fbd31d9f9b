//! Shared type definitions for Project Portfolio
//!
//! This crate contains lightweight type definitions that are shared across
//! the whole workspace: the session core, the data store services, the HTTP
//! client, the web UI (compiled to WASM) and the CLI.

pub mod auth;
pub mod config;
pub mod profile;
pub mod project;
pub mod route;

pub use auth::{Identity, Session, UserId};
pub use config::{BackendConfig, ConfigError, DEFAULT_STORAGE_BUCKET, ENV_BACKEND_ANON_KEY, ENV_BACKEND_URL, ENV_STORAGE_BUCKET};
pub use profile::{DisplayProfile, UserProfile};
pub use project::{Project, ProjectDraft, ProjectId, ProjectStatus, Step, StepDraft, StepId, progress_percent};
pub use route::{DEFAULT_LANDING_PATH, ReturnTo, SIGN_IN_PATH, SIGN_UP_PATH};
