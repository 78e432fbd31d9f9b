use dioxus::prelude::*;
use portfolio_store::DashboardStats;
use pp_types::{Project, ProjectStatus};

use crate::{
    app::context::use_services, components::{Layout, Notice, NoticeKind, RequireSession, Spinner, use_authorized}, routes::Routes
};

#[component]
pub fn DashboardPage() -> Element {
    rsx! {
        Layout {
            RequireSession { DashboardView {} }
        }
    }
}

#[component]
fn DashboardView() -> Element {
    let services = use_services();
    let authorize = use_authorized();

    let stats = use_resource(move || {
        let (services, authorize) = (services.clone(), authorize.clone());
        async move {
            let auth = authorize().map_err(|e| e.to_string())?;
            let projects = services.projects.list(&auth).await.map_err(|e| e.to_string())?;
            Ok::<_, String>(DashboardStats::from_projects(&projects))
        }
    });

    let content = match &*stats.read() {
        None => rsx! { Spinner {} },
        Some(Err(message)) => rsx! { Notice { kind: NoticeKind::Error, message: message.clone() } },
        Some(Ok(stats)) => rsx! { StatsPanels { stats: stats.clone() } },
    };

    rsx! {
        div { class: "flex flex-col gap-6",
            div { class: "flex justify-between items-center",
                h1 { class: "text-3xl font-bold", "Dashboard" }
                Link { class: "btn btn-primary", to: Routes::NewProjectPage {}, "New project" }
            }
            {content}
        }
    }
}

#[component]
fn StatsPanels(stats: DashboardStats) -> Element {
    rsx! {
        div { class: "stats shadow",
            div { class: "stat",
                div { class: "stat-title", "Total" }
                div { class: "stat-value", "{stats.total}" }
            }
            for status in ProjectStatus::ALL {
                div { class: "stat", key: "{status.as_str()}",
                    div { class: "stat-title", "{status.label()}" }
                    div { class: "stat-value", "{stats.counts.get(status)}" }
                }
            }
        }

        div { class: "grid gap-6 md:grid-cols-2",
            div { class: "card bg-base-100 shadow",
                div { class: "card-body",
                    h2 { class: "card-title", "Progress distribution" }
                    ul {
                        for (label, count) in stats.distribution_series() {
                            li { class: "flex justify-between", key: "{label}",
                                span { "{label}" }
                                span { class: "font-mono", "{count}" }
                            }
                        }
                    }
                }
            }
            div { class: "card bg-base-100 shadow",
                div { class: "card-body",
                    h2 { class: "card-title", "Recent progress" }
                    if stats.trend.is_empty() {
                        p { class: "text-base-content/60", "No projects yet." }
                    }
                    ul {
                        for (index, point) in stats.trend.iter().enumerate() {
                            li { class: "flex justify-between", key: "{index}",
                                span { "{point.label}" }
                                span { class: "font-mono", "{point.progress}%" }
                            }
                        }
                    }
                }
            }
        }

        h2 { class: "text-xl font-bold", "Recent projects" }
        div { class: "grid gap-4 md:grid-cols-2 lg:grid-cols-4",
            for project in stats.recent.iter().cloned() {
                ProjectCard { key: "{project.id}", project }
            }
        }
    }
}

#[component]
pub fn ProjectCard(project: Project) -> Element {
    let progress = project.display_progress();
    rsx! {
        div { class: "card bg-base-100 shadow",
            if let Some(url) = project.image_url.clone() {
                figure { img { class: "h-32 w-full object-cover", src: "{url}", alt: "{project.name}" } }
            }
            div { class: "card-body",
                h3 { class: "card-title", "{project.name}" }
                span { class: "badge badge-outline", "{project.status.label()}" }
                progress { class: "progress progress-primary w-full", value: "{progress}", max: "100" }
                div { class: "card-actions justify-end",
                    Link { class: "btn btn-sm", to: Routes::ProjectDetailPage { id: project.id.to_string() }, "Open" }
                }
            }
        }
    }
}
