//! Persistence and services for projects, steps and profiles.
//!
//! ## Module Structure
//!
//! - `store`: seams to the hosted data store and object storage
//! - `memory`: in-process backend
//! - `projects`: create, edit, delete and step toggling with progress upkeep
//! - `profiles`: profile page saves and the shell's profile lookup
//! - `stats`: dashboard aggregation
//! - `report`: CSV export
//! - `upload`: object naming for image uploads

mod error;
mod memory;
mod profiles;
mod projects;
mod report;
mod stats;
mod store;
mod upload;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryPortfolioStore;
pub use profiles::{PROFILE_UPDATED, ProfileForm, ProfileLookup, ProfileService};
pub use projects::{ProjectDetail, ProjectService, SavedProject};
pub use report::{REPORT_CONTENT_TYPE, REPORT_FILE_NAME, projects_csv};
pub use stats::{BUCKET_LABELS, DashboardStats, StatusCounts, TrendPoint, bucket_index, trend_label};
pub use store::{NewProject, ObjectStore, ObjectUpload, ProfileStore, ProjectPatch, ProjectStore, StepRow};
pub use upload::{CACHE_CONTROL_SECONDS, ImageKind, ImageUpload, object_path};
