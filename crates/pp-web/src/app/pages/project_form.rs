use dioxus::prelude::*;
use portfolio_store::{ImageUpload, SavedProject};
use pp_types::{ProjectDraft, ProjectId, ProjectStatus, StepDraft};

use crate::{
    app::context::use_services, components::{ImagePicker, Layout, Notice, NoticeKind, RequireSession, Spinner, use_authorized}, routes::Routes
};

#[component]
pub fn NewProjectPage() -> Element {
    rsx! {
        Layout {
            RequireSession { ProjectForm { id: None } }
        }
    }
}

#[component]
pub fn EditProjectPage(id: String) -> Element {
    rsx! {
        Layout {
            RequireSession { ProjectForm { id: Some(id) } }
        }
    }
}

/// Create form when `id` is `None`, edit form otherwise.
#[component]
fn ProjectForm(id: Option<String>) -> Element {
    let services = use_services();
    let authorize = use_authorized();
    let navigator = use_navigator();
    let project_id = id.clone().map(ProjectId::new);

    let mut name = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut status = use_signal(ProjectStatus::default);
    let mut steps = use_signal(Vec::<StepDraft>::new);
    let mut new_step = use_signal(String::new);
    let mut image = use_signal(|| None::<ImageUpload>);
    let mut loaded = use_signal(|| project_id.is_none());
    let mut saving = use_signal(|| false);
    let mut notice = use_signal(|| None::<(NoticeKind, String)>);

    let load_services = services.clone();
    let load_authorize = authorize.clone();
    let load_id = project_id.clone();
    use_hook(move || {
        let Some(load_id) = load_id else {
            return;
        };
        spawn(async move {
            let detail = match load_authorize() {
                Ok(auth) => load_services.projects.detail(&auth, &load_id).await.map_err(|e| e.to_string()),
                Err(err) => Err(err.to_string()),
            };
            match detail {
                Ok(Some(detail)) => {
                    name.set(detail.project.name.clone());
                    description.set(detail.project.description.clone().unwrap_or_default());
                    status.set(detail.project.status);
                    steps.set(detail.steps.iter().map(StepDraft::from).collect());
                }
                Ok(None) => notice.set(Some((NoticeKind::Error, "Project not found.".to_string()))),
                Err(message) => notice.set(Some((NoticeKind::Error, message))),
            }
            loaded.set(true);
        });
    });

    let mut add_step = move || {
        let title = new_step().trim().to_string();
        if !title.is_empty() {
            steps.write().push(StepDraft::new(title));
            new_step.set(String::new());
        }
    };

    let on_submit = move |evt: Event<FormData>| {
        evt.prevent_default();
        if saving() {
            return;
        }
        saving.set(true);
        notice.set(None);

        let mut draft = ProjectDraft::new(name().trim()).with_status(status());
        let text = description();
        if !text.trim().is_empty() {
            draft = draft.with_description(text);
        }
        draft.steps = steps();

        let (services, authorize, project_id) = (services.clone(), authorize.clone(), project_id.clone());
        spawn(async move {
            let saved = match (authorize(), &project_id) {
                (Ok(auth), Some(id)) => services.projects.update(&auth, id, &draft, image()).await.map_err(|e| e.to_string()),
                (Ok(auth), None) => services.projects.create(&auth, &draft, image()).await.map_err(|e| e.to_string()),
                (Err(err), _) => Err(err.to_string()),
            };
            match saved {
                Ok(SavedProject { project, image_error: None }) => {
                    navigator.push(Routes::ProjectDetailPage { id: project.id.to_string() });
                }
                Ok(SavedProject {
                    image_error: Some(message),
                    ..
                }) => {
                    notice.set(Some((NoticeKind::Error, message)));
                    saving.set(false);
                }
                Err(message) => {
                    notice.set(Some((NoticeKind::Error, message)));
                    saving.set(false);
                }
            }
        });
    };

    if !loaded() {
        return rsx! { Spinner {} };
    }

    let heading = if id.is_some() { "Edit project" } else { "New project" };

    rsx! {
        div { class: "card max-w-2xl bg-base-100 shadow",
            div { class: "card-body",
                h1 { class: "card-title text-2xl", "{heading}" }
                form { onsubmit: on_submit, class: "flex flex-col gap-4",
                    label { class: "form-control w-full flex flex-col gap-2",
                        span { class: "label-text", "Name" }
                        input {
                            class: "input input-bordered w-full",
                            value: "{name}",
                            oninput: move |evt| name.set(evt.value()),
                        }
                    }
                    label { class: "form-control w-full flex flex-col gap-2",
                        span { class: "label-text", "Description" }
                        textarea {
                            class: "textarea textarea-bordered w-full",
                            value: "{description}",
                            oninput: move |evt| description.set(evt.value()),
                        }
                    }
                    label { class: "form-control w-full flex flex-col gap-2",
                        span { class: "label-text", "Status" }
                        select {
                            class: "select select-bordered w-full",
                            value: "{status}",
                            onchange: move |evt| {
                                if let Ok(parsed) = evt.value().parse::<ProjectStatus>() {
                                    status.set(parsed);
                                }
                            },
                            for choice in ProjectStatus::ALL {
                                option { key: "{choice}", value: "{choice}", selected: choice == status(), "{choice.label()}" }
                            }
                        }
                    }

                    div { class: "flex flex-col gap-2",
                        span { class: "label-text", "Steps" }
                        ul { class: "flex flex-col gap-2",
                            for (index, step) in steps().into_iter().enumerate() {
                                li { key: "{index}", class: "flex gap-2 items-center",
                                    input {
                                        class: "input input-bordered input-sm flex-1",
                                        value: "{step.title}",
                                        oninput: move |evt| {
                                            if let Some(draft) = steps.write().get_mut(index) {
                                                draft.title = evt.value();
                                            }
                                        },
                                    }
                                    button {
                                        r#type: "button",
                                        class: "btn btn-sm btn-ghost",
                                        onclick: move |_| {
                                            steps.write().remove(index);
                                        },
                                        "Remove"
                                    }
                                }
                            }
                        }
                        div { class: "join",
                            input {
                                class: "input input-bordered input-sm join-item flex-1",
                                placeholder: "New step",
                                value: "{new_step}",
                                oninput: move |evt| new_step.set(evt.value()),
                            }
                            button {
                                r#type: "button",
                                class: "btn btn-sm join-item",
                                onclick: move |_| add_step(),
                                "Add step"
                            }
                        }
                    }

                    ImagePicker {
                        label: "Cover image",
                        on_pick: move |picked| image.set(picked),
                    }

                    if let Some((kind, message)) = notice() {
                        Notice { kind, message }
                    }

                    div { class: "card-actions justify-end",
                        Link { class: "btn btn-ghost", to: Routes::ProjectsPage {}, "Cancel" }
                        button {
                            r#type: "submit",
                            class: "btn btn-primary",
                            disabled: saving(),
                            if saving() {
                                span { class: "loading loading-spinner" }
                            }
                            "Save"
                        }
                    }
                }
            }
        }
    }
}
