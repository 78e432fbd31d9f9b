//! Persistence seams for projects, steps, profiles and uploaded objects.
//!
//! Row-level ownership is enforced by the backend; every project call still
//! names the owner so in-process backends can apply the same rule.

use async_trait::async_trait;
use pp_types::{Project, ProjectId, ProjectStatus, Step, StepId, UserId, UserProfile};
use serde::Serialize;
use session_core::MaybeSendSync;

use crate::error::StoreResult;

/// Insert body for a new project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewProject {
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub progress: i32,
}

/// Partial update of a project row. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProjectPatch {
    pub fn progress(progress: i32) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Step row as written. Rows without an id are new.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<StepId>,
    pub project_id: ProjectId,
    pub title: String,
    pub is_done: bool,
    pub position: i32,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ProjectStore: MaybeSendSync {
    /// Projects of `owner`, newest first.
    async fn list_projects(&self, owner: &UserId) -> StoreResult<Vec<Project>>;

    async fn get_project(&self, owner: &UserId, id: &ProjectId) -> StoreResult<Option<Project>>;

    async fn insert_project(&self, project: &NewProject) -> StoreResult<Project>;

    async fn update_project(&self, owner: &UserId, id: &ProjectId, patch: &ProjectPatch) -> StoreResult<()>;

    /// Deletes the project and its steps.
    async fn delete_project(&self, owner: &UserId, id: &ProjectId) -> StoreResult<()>;

    /// Steps of a project ordered by position.
    async fn list_steps(&self, project: &ProjectId) -> StoreResult<Vec<Step>>;

    async fn insert_steps(&self, steps: &[StepRow]) -> StoreResult<()>;

    /// Insert-or-update keyed on step id.
    async fn upsert_steps(&self, steps: &[StepRow]) -> StoreResult<()>;

    async fn delete_steps(&self, ids: &[StepId]) -> StoreResult<()>;

    async fn set_step_done(&self, id: &StepId, is_done: bool) -> StoreResult<()>;
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ProfileStore: MaybeSendSync {
    async fn fetch_profile(&self, user: &UserId) -> StoreResult<Option<UserProfile>>;

    /// Insert-or-update keyed on user id.
    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<()>;
}

/// One object to put into storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectUpload {
    pub path: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    /// Seconds, sent as the object's cache-control.
    pub cache_control: u32,
    /// Overwrite an existing object at `path`.
    pub upsert: bool,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ObjectStore: MaybeSendSync {
    /// Store the object and return the path it was stored under.
    async fn upload(&self, object: ObjectUpload) -> StoreResult<String>;

    /// Publicly readable URL of a stored object.
    fn public_url(&self, path: &str) -> String;
}
