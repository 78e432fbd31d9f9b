//! Unit tests for project status parsing and progress computation.

use super::*;

#[test]
fn test_status_string_representation() {
    assert_eq!(ProjectStatus::Active.to_string(), "active");
    assert_eq!(ProjectStatus::Completed.label(), "Completed");
    assert_eq!("Paused".parse::<ProjectStatus>().unwrap(), ProjectStatus::Paused);
    assert!("archived".parse::<ProjectStatus>().is_err());

    assert_eq!(serde_json::to_string(&ProjectStatus::Completed).unwrap(), "\"completed\"");
    let parsed: ProjectStatus = serde_json::from_str("\"paused\"").unwrap();
    assert_eq!(parsed, ProjectStatus::Paused);
}

#[test]
fn test_project_row_deserializes_backend_timestamp() {
    let row = r#"{
        "id": "8c1d",
        "name": "Shed",
        "description": null,
        "status": "active",
        "progress": 40,
        "created_at": "2024-05-01T10:00:00.123456+00:00"
    }"#;
    let project: Project = serde_json::from_str(row).unwrap();
    assert_eq!(project.id, ProjectId::new("8c1d"));
    assert_eq!(project.image_url, None);
    assert_eq!(project.created_at.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");
}

#[test]
fn test_progress_percent_rounding() {
    assert_eq!(progress_percent(Vec::<bool>::new()), 0);
    assert_eq!(progress_percent([true]), 100);
    assert_eq!(progress_percent([false, false]), 0);
    assert_eq!(progress_percent([true, false]), 50);
    // 1/3 = 33.33 -> 33, 2/3 = 66.67 -> 67
    assert_eq!(progress_percent([true, false, false]), 33);
    assert_eq!(progress_percent([true, true, false]), 67);
    // 1/8 = 12.5 rounds half up
    assert_eq!(progress_percent([true, false, false, false, false, false, false, false]), 13);
}

#[test]
fn test_draft_progress_and_display_clamp() {
    let draft = ProjectDraft::new("Garden")
        .with_step(StepDraft::new("Dig"))
        .with_step(StepDraft {
            id: None,
            title: "Plant".to_string(),
            is_done: true,
        });
    assert_eq!(draft.progress(), 50);
    assert_eq!(draft.status, ProjectStatus::Active);

    let project = Project {
        id: ProjectId::new("p-1"),
        name: "Garden".to_string(),
        description: None,
        status: ProjectStatus::Active,
        progress: 140,
        created_at: chrono::Utc::now(),
        image_url: None,
    };
    assert_eq!(project.display_progress(), 100);
}
