//! In-process backend for tests and the offline demo.

use std::{
    collections::HashMap, sync::{Mutex, MutexGuard, PoisonError}
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use pp_types::{Project, ProjectId, Step, StepId, UserId, UserProfile};
use uuid::Uuid;

use crate::{
    error::{StoreError, StoreResult}, store::{NewProject, ObjectStore, ObjectUpload, ProfileStore, ProjectPatch, ProjectStore, StepRow}
};

#[derive(Default)]
struct MemoryState {
    projects: HashMap<ProjectId, (UserId, Project)>,
    steps: HashMap<StepId, Step>,
    profiles: HashMap<UserId, UserProfile>,
    objects: HashMap<String, ObjectUpload>,
    last_created: Option<DateTime<Utc>>,
    failing_uploads: bool,
}

impl MemoryState {
    /// Creation timestamps are strictly increasing so "newest first" is stable.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let at = match self.last_created {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_created = Some(at);
        at
    }

    fn owned_mut(&mut self, owner: &UserId, id: &ProjectId) -> StoreResult<&mut Project> {
        match self.projects.get_mut(id) {
            Some((o, project)) if o == owner => Ok(project),
            _ => Err(StoreError::ProjectNotFound { id: id.to_string() }),
        }
    }
}

pub struct MemoryPortfolioStore {
    state: Mutex<MemoryState>,
    public_base: String,
}

impl Default for MemoryPortfolioStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPortfolioStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            public_base: "memory://objects".to_string(),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every upload fail until switched off again.
    pub fn fail_uploads(&self, failing: bool) {
        self.state().failing_uploads = failing;
    }

    pub fn object(&self, path: &str) -> Option<ObjectUpload> {
        self.state().objects.get(path).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.state().objects.len()
    }

    pub fn step_count(&self) -> usize {
        self.state().steps.len()
    }

    fn write_step(state: &mut MemoryState, row: &StepRow) -> StoreResult<()> {
        if !state.projects.contains_key(&row.project_id) {
            return Err(StoreError::ProjectNotFound {
                id: row.project_id.to_string(),
            });
        }
        let id = row.id.clone().unwrap_or_else(|| StepId::new(Uuid::new_v4().to_string()));
        state.steps.insert(
            id.clone(),
            Step {
                id,
                project_id: row.project_id.clone(),
                title: row.title.clone(),
                is_done: row.is_done,
                position: row.position,
            },
        );
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ProjectStore for MemoryPortfolioStore {
    async fn list_projects(&self, owner: &UserId) -> StoreResult<Vec<Project>> {
        let state = self.state();
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|(o, _)| o == owner)
            .map(|(_, p)| p.clone())
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn get_project(&self, owner: &UserId, id: &ProjectId) -> StoreResult<Option<Project>> {
        Ok(self
            .state()
            .projects
            .get(id)
            .filter(|(o, _)| o == owner)
            .map(|(_, p)| p.clone()))
    }

    async fn insert_project(&self, new: &NewProject) -> StoreResult<Project> {
        let mut state = self.state();
        let project = Project {
            id: ProjectId::new(Uuid::new_v4().to_string()),
            name: new.name.clone(),
            description: new.description.clone(),
            status: new.status,
            progress: new.progress,
            created_at: state.next_created_at(),
            image_url: None,
        };
        state
            .projects
            .insert(project.id.clone(), (new.user_id.clone(), project.clone()));
        Ok(project)
    }

    async fn update_project(&self, owner: &UserId, id: &ProjectId, patch: &ProjectPatch) -> StoreResult<()> {
        let mut state = self.state();
        let project = state.owned_mut(owner, id)?;
        if let Some(name) = &patch.name {
            project.name = name.clone();
        }
        if let Some(description) = &patch.description {
            project.description = description.clone();
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        if let Some(progress) = patch.progress {
            project.progress = progress;
        }
        if let Some(url) = &patch.image_url {
            project.image_url = Some(url.clone());
        }
        Ok(())
    }

    async fn delete_project(&self, owner: &UserId, id: &ProjectId) -> StoreResult<()> {
        let mut state = self.state();
        state.owned_mut(owner, id)?;
        state.projects.remove(id);
        state.steps.retain(|_, step| &step.project_id != id);
        Ok(())
    }

    async fn list_steps(&self, project: &ProjectId) -> StoreResult<Vec<Step>> {
        let state = self.state();
        let mut steps: Vec<Step> = state
            .steps
            .values()
            .filter(|s| &s.project_id == project)
            .cloned()
            .collect();
        steps.sort_by_key(|s| s.position);
        Ok(steps)
    }

    async fn insert_steps(&self, steps: &[StepRow]) -> StoreResult<()> {
        let mut state = self.state();
        for row in steps {
            let row = StepRow { id: None, ..row.clone() };
            Self::write_step(&mut state, &row)?;
        }
        Ok(())
    }

    async fn upsert_steps(&self, steps: &[StepRow]) -> StoreResult<()> {
        let mut state = self.state();
        for row in steps {
            Self::write_step(&mut state, row)?;
        }
        Ok(())
    }

    async fn delete_steps(&self, ids: &[StepId]) -> StoreResult<()> {
        let mut state = self.state();
        for id in ids {
            state.steps.remove(id);
        }
        Ok(())
    }

    async fn set_step_done(&self, id: &StepId, is_done: bool) -> StoreResult<()> {
        let mut state = self.state();
        let step = state
            .steps
            .get_mut(id)
            .ok_or_else(|| StoreError::StepNotFound { id: id.to_string() })?;
        step.is_done = is_done;
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ProfileStore for MemoryPortfolioStore {
    async fn fetch_profile(&self, user: &UserId) -> StoreResult<Option<UserProfile>> {
        Ok(self.state().profiles.get(user).cloned())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.state().profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ObjectStore for MemoryPortfolioStore {
    async fn upload(&self, object: ObjectUpload) -> StoreResult<String> {
        let mut state = self.state();
        if state.failing_uploads {
            return Err(StoreError::Upload("storage unavailable".to_string()));
        }
        if !object.upsert && state.objects.contains_key(&object.path) {
            return Err(StoreError::Upload("The resource already exists".to_string()));
        }
        let path = object.path.clone();
        state.objects.insert(path.clone(), object);
        Ok(path)
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base, path)
    }
}
