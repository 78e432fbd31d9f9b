use dioxus::prelude::*;
use portfolio_store::ProjectDetail;
use pp_types::{ProjectId, Step, StepId};

use crate::{
    app::context::use_services, components::{Layout, Notice, NoticeKind, RequireSession, Spinner, use_authorized}, routes::Routes
};

#[component]
pub fn ProjectDetailPage(id: String) -> Element {
    rsx! {
        Layout {
            RequireSession { ProjectDetailView { id } }
        }
    }
}

#[component]
fn ProjectDetailView(id: String) -> Element {
    let services = use_services();
    let authorize = use_authorized();
    let project_id = ProjectId::new(id.clone());
    let mut detail = use_signal(|| None::<Result<Option<ProjectDetail>, String>>);
    let mut toggling = use_signal(|| false);

    let load_services = services.clone();
    let load_authorize = authorize.clone();
    let load_id = project_id.clone();
    use_hook(move || {
        spawn(async move {
            let loaded = match load_authorize() {
                Ok(auth) => load_services.projects.detail(&auth, &load_id).await.map_err(|e| e.to_string()),
                Err(err) => Err(err.to_string()),
            };
            detail.set(Some(loaded));
        });
    });

    let on_toggle = use_callback(move |step: StepId| {
        if toggling() {
            return;
        }
        toggling.set(true);
        let (services, authorize, project_id) = (services.clone(), authorize.clone(), project_id.clone());
        spawn(async move {
            let toggled = match authorize() {
                Ok(auth) => services.projects.toggle_step(&auth, &project_id, &step).await.map_err(|e| e.to_string()),
                Err(err) => Err(err.to_string()),
            };
            match toggled {
                Ok(updated) => detail.set(Some(Ok(Some(updated)))),
                Err(message) => detail.set(Some(Err(message))),
            }
            toggling.set(false);
        });
    });

    let body = match detail() {
        None => rsx! { Spinner {} },
        Some(Err(message)) => rsx! { Notice { kind: NoticeKind::Error, message } },
        Some(Ok(None)) => rsx! {
            Notice { kind: NoticeKind::Info, message: "Project not found." }
        },
        Some(Ok(Some(ProjectDetail { project, steps }))) => {
            let progress = project.display_progress();
            let description = project.description.clone().unwrap_or_default();
            rsx! {
                div { class: "flex justify-between items-center",
                    h1 { class: "text-3xl font-bold", "{project.name}" }
                    Link { class: "btn", to: Routes::EditProjectPage { id: id.clone() }, "Edit" }
                }
                if let Some(url) = project.image_url.clone() {
                    img { class: "max-h-64 rounded-box object-cover", src: "{url}", alt: "{project.name}" }
                }
                div { class: "flex gap-4 items-center",
                    span { class: "badge badge-outline", "{project.status.label()}" }
                    progress { class: "progress progress-primary w-64", value: "{progress}", max: "100" }
                    span { class: "font-mono", "{progress}%" }
                }
                if !description.is_empty() {
                    p { "{description}" }
                }
                h2 { class: "text-xl font-bold", "Steps" }
                ul { class: "flex flex-col gap-2",
                    for step in steps {
                        StepItem { key: "{step.id}", step, disabled: toggling(), on_toggle }
                    }
                }
            }
        }
    };

    rsx! {
        div { class: "flex flex-col gap-4",
            Link { class: "link", to: Routes::ProjectsPage {}, "← All projects" }
            {body}
        }
    }
}

#[component]
fn StepItem(step: Step, disabled: bool, on_toggle: Callback<StepId>) -> Element {
    let id = step.id.clone();
    rsx! {
        li { class: "flex gap-2 items-center",
            input {
                r#type: "checkbox",
                class: "checkbox",
                checked: step.is_done,
                disabled,
                onclick: move |_| on_toggle.call(id.clone()),
            }
            span { class: if step.is_done { "line-through text-base-content/60" } else { "" }, "{step.title}" }
        }
    }
}
