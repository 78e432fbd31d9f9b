use dioxus::prelude::*;
use pp_types::Project;

use crate::{
    app::context::use_services, components::{ConfirmDialog, Layout, Notice, NoticeKind, RequireSession, Spinner, use_authorized}, pages::dashboard::ProjectCard, routes::Routes
};

#[component]
pub fn ProjectsPage() -> Element {
    rsx! {
        Layout {
            RequireSession { ProjectsView {} }
        }
    }
}

#[component]
fn ProjectsView() -> Element {
    let services = use_services();
    let authorize = use_authorized();
    let mut delete_target = use_signal(|| None::<Project>);
    let mut action_error = use_signal(|| None::<String>);
    let mut deleting = use_signal(|| false);

    let load_services = services.clone();
    let load_authorize = authorize.clone();
    let mut projects = use_resource(move || {
        let (services, authorize) = (load_services.clone(), load_authorize.clone());
        async move {
            let auth = authorize().map_err(|e| e.to_string())?;
            services.projects.list(&auth).await.map_err(|e| e.to_string())
        }
    });

    let confirm_delete = move |_: ()| {
        let Some(project) = delete_target() else {
            return;
        };
        deleting.set(true);
        let (services, authorize) = (services.clone(), authorize.clone());
        spawn(async move {
            let result = match authorize() {
                Ok(auth) => services.projects.delete(&auth, &project.id).await.map_err(|e| e.to_string()),
                Err(err) => Err(err.to_string()),
            };
            deleting.set(false);
            delete_target.set(None);
            match result {
                Ok(()) => projects.restart(),
                Err(message) => action_error.set(Some(message)),
            }
        });
    };

    let list = match &*projects.read() {
        None => rsx! { Spinner {} },
        Some(Err(message)) => rsx! { Notice { kind: NoticeKind::Error, message: message.clone() } },
        Some(Ok(list)) if list.is_empty() => rsx! {
            p { class: "text-base-content/60", "No projects yet." }
        },
        Some(Ok(list)) => rsx! {
            div { class: "grid gap-4 md:grid-cols-2 lg:grid-cols-3",
                for project in list.iter().cloned() {
                    ProjectListItem {
                        key: "{project.id}",
                        project,
                        on_delete: move |project| delete_target.set(Some(project)),
                    }
                }
            }
        },
    };

    rsx! {
        div { class: "flex flex-col gap-6",
            div { class: "flex justify-between items-center",
                h1 { class: "text-3xl font-bold", "Projects" }
                Link { class: "btn btn-primary", to: Routes::NewProjectPage {}, "New project" }
            }
            if let Some(message) = action_error() {
                Notice { kind: NoticeKind::Error, message }
            }
            {list}
        }

        if let Some(target) = delete_target() {
            ConfirmDialog {
                title: "Delete project",
                message: format!("Delete \"{}\" and all of its steps?", target.name),
                confirm_label: "Delete",
                busy: deleting(),
                on_confirm: confirm_delete,
                on_cancel: move |_| delete_target.set(None),
            }
        }
    }
}

#[component]
fn ProjectListItem(project: Project, on_delete: EventHandler<Project>) -> Element {
    let edit = Routes::EditProjectPage { id: project.id.to_string() };
    let deleted = project.clone();
    rsx! {
        div { class: "flex flex-col gap-2",
            ProjectCard { project }
            div { class: "join self-end",
                Link { class: "btn btn-xs btn-primary join-item", to: edit, "Edit" }
                button {
                    class: "btn btn-xs btn-secondary join-item",
                    onclick: move |_| on_delete.call(deleted.clone()),
                    "Delete"
                }
            }
        }
    }
}
