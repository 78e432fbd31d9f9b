use pp_types::{Identity, ProjectStatus, StepDraft};
use session_core::test_support::authorized;

use super::*;
use crate::memory::MemoryPortfolioStore;

fn service() -> (Arc<MemoryPortfolioStore>, ProjectService) {
    let store = Arc::new(MemoryPortfolioStore::new());
    let service = ProjectService::new(store.clone(), store.clone());
    (store, service)
}

fn owner() -> Authorized {
    authorized(Identity::new("u-1").with_email("ada@example.com"))
}

fn draft() -> ProjectDraft {
    ProjectDraft::new("Garden shed")
        .with_description("Back corner")
        .with_step(StepDraft::new("Foundation"))
        .with_step(StepDraft::new("Walls"))
        .with_step(StepDraft::new("Roof"))
}

#[tokio::test]
async fn test_create_starts_at_zero_with_ordered_steps() {
    let (_, service) = service();
    let auth = owner();
    let saved = service.create(&auth, &draft(), None).await.unwrap();
    assert_eq!(saved.project.progress, 0);
    assert_eq!(saved.project.status, ProjectStatus::Active);
    assert_eq!(saved.image_error, None);

    let detail = service.detail(&auth, &saved.project.id).await.unwrap().unwrap();
    let titles: Vec<_> = detail.steps.iter().map(|s| (s.title.as_str(), s.position)).collect();
    assert_eq!(titles, vec![("Foundation", 0), ("Walls", 1), ("Roof", 2)]);
}

#[tokio::test]
async fn test_create_with_image_sets_public_url() {
    let (store, service) = service();
    let auth = owner();
    let image = ImageUpload::new("cover.png", vec![7; 4]).with_content_type("image/png");
    let saved = service.create(&auth, &draft(), Some(image)).await.unwrap();

    let url = saved.project.image_url.expect("image url");
    let path = url.strip_prefix("memory://objects/").unwrap();
    assert!(path.starts_with("u-1/") && path.ends_with(".png"));
    assert_eq!(store.object(path).unwrap().cache_control, 3600);
}

#[tokio::test]
async fn test_failed_upload_still_saves_project() {
    let (store, service) = service();
    store.fail_uploads(true);
    let auth = owner();
    let saved = service
        .create(&auth, &draft(), Some(ImageUpload::new("cover.png", vec![1])))
        .await
        .unwrap();
    assert_eq!(saved.project.image_url, None);
    assert_eq!(saved.image_error.as_deref(), Some("Image upload failed: upload failed: storage unavailable"));
    assert_eq!(service.list(&auth).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_syncs_steps_and_progress() {
    let (store, service) = service();
    let auth = owner();
    let saved = service.create(&auth, &draft(), None).await.unwrap();
    let id = saved.project.id;
    let steps = service.detail(&auth, &id).await.unwrap().unwrap().steps;

    // drop "Walls", finish "Roof" and move it first, add a new step
    let mut roof = StepDraft::from(&steps[2]);
    roof.is_done = true;
    let edited = ProjectDraft::new("Garden shed v2")
        .with_status(ProjectStatus::Paused)
        .with_step(roof)
        .with_step(StepDraft::from(&steps[0]))
        .with_step(StepDraft::new("Paint"));

    let updated = service.update(&auth, &id, &edited, None).await.unwrap();
    assert_eq!(updated.project.name, "Garden shed v2");
    assert_eq!(updated.project.description, None);
    assert_eq!(updated.project.status, ProjectStatus::Paused);
    assert_eq!(updated.project.progress, 33);

    let detail = service.detail(&auth, &id).await.unwrap().unwrap();
    let rows: Vec<_> = detail.steps.iter().map(|s| (s.title.as_str(), s.position, s.is_done)).collect();
    assert_eq!(rows, vec![("Roof", 0, true), ("Foundation", 1, false), ("Paint", 2, false)]);
    assert_eq!(detail.steps[0].id, steps[2].id);
    assert_eq!(store.step_count(), 3);
}

#[tokio::test]
async fn test_update_with_no_steps_resets_progress() {
    let (store, service) = service();
    let auth = owner();
    let id = service.create(&auth, &draft(), None).await.unwrap().project.id;

    let updated = service.update(&auth, &id, &ProjectDraft::new("Empty"), None).await.unwrap();
    assert_eq!(updated.project.progress, 0);
    assert_eq!(store.step_count(), 0);
}

#[tokio::test]
async fn test_toggle_step_recomputes_progress() {
    let (_, service) = service();
    let auth = owner();
    let id = service.create(&auth, &draft(), None).await.unwrap().project.id;
    let steps = service.detail(&auth, &id).await.unwrap().unwrap().steps;

    let detail = service.toggle_step(&auth, &id, &steps[0].id).await.unwrap();
    assert_eq!(detail.project.progress, 33);
    assert!(detail.steps[0].is_done);

    let detail = service.toggle_step(&auth, &id, &steps[1].id).await.unwrap();
    assert_eq!(detail.project.progress, 67);

    let detail = service.toggle_step(&auth, &id, &steps[0].id).await.unwrap();
    assert_eq!(detail.project.progress, 33);
    let stored = service.detail(&auth, &id).await.unwrap().unwrap();
    assert_eq!(stored.project.progress, 33);
    assert!(!stored.steps[0].is_done);

    let missing = service.toggle_step(&auth, &id, &StepId::new("nope")).await.unwrap_err();
    assert_eq!(missing, StoreError::StepNotFound { id: "nope".into() });
}

#[tokio::test]
async fn test_other_users_cannot_touch_project() {
    let (_, service) = service();
    let id = service.create(&owner(), &draft(), None).await.unwrap().project.id;
    let intruder = authorized(Identity::new("u-2"));

    assert!(service.list(&intruder).await.unwrap().is_empty());
    assert_eq!(service.detail(&intruder, &id).await.unwrap(), None);
    assert!(matches!(
        service.delete(&intruder, &id).await,
        Err(StoreError::ProjectNotFound { .. })
    ));
}

#[tokio::test]
async fn test_list_is_newest_first_and_delete_removes_steps() {
    let (store, service) = service();
    let auth = owner();
    let first = service.create(&auth, &ProjectDraft::new("First"), None).await.unwrap().project;
    let second = service.create(&auth, &draft(), None).await.unwrap().project;

    let names: Vec<_> = service.list(&auth).await.unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec![second.name.clone(), first.name.clone()]);

    service.delete(&auth, &second.id).await.unwrap();
    assert_eq!(store.step_count(), 0);
    assert_eq!(service.list(&auth).await.unwrap().len(), 1);
}
