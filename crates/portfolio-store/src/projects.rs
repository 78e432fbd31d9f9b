//! Project operations behind the project list, detail and edit screens.

use std::{collections::HashSet, sync::Arc};

use pp_types::{Project, ProjectDraft, ProjectId, Step, StepId, UserId, progress_percent};
use session_core::Authorized;
use tracing::{debug, info, warn};

use crate::{
    error::{StoreError, StoreResult}, store::{NewProject, ObjectStore, ProjectPatch, ProjectStore, StepRow}, upload::{ImageKind, ImageUpload}
};

/// A project with its ordered steps.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectDetail {
    pub project: Project,
    pub steps: Vec<Step>,
}

/// Result of a create or update. The project is saved even when the image
/// upload failed; the failure is reported alongside.
#[derive(Clone, Debug, PartialEq)]
pub struct SavedProject {
    pub project: Project,
    pub image_error: Option<String>,
}

#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectStore>,
    objects: Arc<dyn ObjectStore>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { projects, objects }
    }

    /// The caller's projects, newest first.
    pub async fn list(&self, auth: &Authorized) -> StoreResult<Vec<Project>> {
        self.projects.list_projects(auth.user_id()).await
    }

    pub async fn detail(&self, auth: &Authorized, id: &ProjectId) -> StoreResult<Option<ProjectDetail>> {
        let Some(project) = self.projects.get_project(auth.user_id(), id).await? else {
            return Ok(None);
        };
        let steps = self.projects.list_steps(id).await?;
        Ok(Some(ProjectDetail { project, steps }))
    }

    async fn require(&self, owner: &UserId, id: &ProjectId) -> StoreResult<Project> {
        self.projects
            .get_project(owner, id)
            .await?
            .ok_or_else(|| StoreError::ProjectNotFound { id: id.to_string() })
    }

    /// Insert the project with progress 0, then its steps in draft order,
    /// then the image if one was picked.
    pub async fn create(&self, auth: &Authorized, draft: &ProjectDraft, image: Option<ImageUpload>) -> StoreResult<SavedProject> {
        let owner = auth.user_id();
        let project = self
            .projects
            .insert_project(&NewProject {
                user_id: owner.clone(),
                name: draft.name.clone(),
                description: draft.description.clone(),
                status: draft.status,
                progress: 0,
            })
            .await?;
        info!(project = %project.id, steps = draft.steps.len(), "project created");

        if !draft.steps.is_empty() {
            let rows: Vec<StepRow> = draft
                .steps
                .iter()
                .enumerate()
                .map(|(position, step)| StepRow {
                    id: None,
                    project_id: project.id.clone(),
                    title: step.title.clone(),
                    is_done: step.is_done,
                    position: position as i32,
                })
                .collect();
            self.projects.insert_steps(&rows).await?;
        }

        let image_error = match image {
            Some(image) => self.attach_image(owner, &project.id, image).await,
            None => None,
        };
        let project = self.require(owner, &project.id).await?;
        Ok(SavedProject { project, image_error })
    }

    /// Write the draft over an existing project.
    ///
    /// Steps missing from the draft are deleted, the rest are written with
    /// positions following draft order, and progress is recomputed from the
    /// draft's steps.
    pub async fn update(
        &self,
        auth: &Authorized,
        id: &ProjectId,
        draft: &ProjectDraft,
        image: Option<ImageUpload>,
    ) -> StoreResult<SavedProject> {
        let owner = auth.user_id();
        self.projects
            .update_project(
                owner,
                id,
                &ProjectPatch {
                    name: Some(draft.name.clone()),
                    description: Some(draft.description.clone()),
                    status: Some(draft.status),
                    ..ProjectPatch::default()
                },
            )
            .await?;

        let image_error = match image {
            Some(image) => self.attach_image(owner, id, image).await,
            None => None,
        };

        self.sync_steps(id, draft).await?;

        let progress = draft.progress();
        self.projects.update_project(owner, id, &ProjectPatch::progress(progress)).await?;
        info!(project = %id, progress, "project updated");

        let project = self.require(owner, id).await?;
        Ok(SavedProject { project, image_error })
    }

    async fn sync_steps(&self, id: &ProjectId, draft: &ProjectDraft) -> StoreResult<()> {
        let existing: HashSet<StepId> = self.projects.list_steps(id).await?.into_iter().map(|s| s.id).collect();
        let kept: HashSet<&StepId> = draft.steps.iter().filter_map(|s| s.id.as_ref()).collect();

        let removed: Vec<StepId> = existing.iter().filter(|sid| !kept.contains(sid)).cloned().collect();
        if !removed.is_empty() {
            debug!(project = %id, count = removed.len(), "deleting removed steps");
            self.projects.delete_steps(&removed).await?;
        }

        let (updated, added): (Vec<StepRow>, Vec<StepRow>) = draft
            .steps
            .iter()
            .enumerate()
            .map(|(position, step)| StepRow {
                // ids that do not belong to this project are written as new steps
                id: step.id.clone().filter(|sid| existing.contains(sid)),
                project_id: id.clone(),
                title: step.title.clone(),
                is_done: step.is_done,
                position: position as i32,
            })
            .partition(|row| row.id.is_some());

        if !updated.is_empty() {
            self.projects.upsert_steps(&updated).await?;
        }
        if !added.is_empty() {
            self.projects.insert_steps(&added).await?;
        }
        Ok(())
    }

    /// Upload `image` and point the project at it. Returns the error text
    /// shown to the user when the upload fails.
    async fn attach_image(&self, owner: &UserId, id: &ProjectId, image: ImageUpload) -> Option<String> {
        let object = image.into_object(owner, ImageKind::Project);
        let result = async {
            let path = self.objects.upload(object).await?;
            let url = self.objects.public_url(&path);
            self.projects.update_project(owner, id, &ProjectPatch::image_url(url)).await
        }
        .await;

        match result {
            Ok(()) => None,
            Err(err) => {
                warn!(project = %id, error = %err, "project image upload failed");
                Some(format!("Image upload failed: {err}"))
            }
        }
    }

    pub async fn delete(&self, auth: &Authorized, id: &ProjectId) -> StoreResult<()> {
        self.projects.delete_project(auth.user_id(), id).await?;
        info!(project = %id, "project deleted");
        Ok(())
    }

    /// Flip one step and store the recomputed progress.
    pub async fn toggle_step(&self, auth: &Authorized, id: &ProjectId, step: &StepId) -> StoreResult<ProjectDetail> {
        let owner = auth.user_id();
        let mut project = self.require(owner, id).await?;
        let mut steps = self.projects.list_steps(id).await?;

        let target = steps
            .iter_mut()
            .find(|s| &s.id == step)
            .ok_or_else(|| StoreError::StepNotFound { id: step.to_string() })?;
        target.is_done = !target.is_done;
        let is_done = target.is_done;
        self.projects.set_step_done(step, is_done).await?;

        let progress = progress_percent(steps.iter().map(|s| s.is_done));
        self.projects.update_project(owner, id, &ProjectPatch::progress(progress)).await?;
        project.progress = progress;
        debug!(project = %id, step = %step, is_done, progress, "step toggled");

        Ok(ProjectDetail { project, steps })
    }
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;
