use dioxus::prelude::*;
use portfolio_store::{REPORT_CONTENT_TYPE, REPORT_FILE_NAME, projects_csv};
use tracing::{info, warn};

use crate::{
    app::{browser, context::use_services}, components::{Layout, Notice, NoticeKind, RequireSession, Spinner, use_authorized}
};

#[component]
pub fn ReportsPage() -> Element {
    rsx! {
        Layout {
            RequireSession { ReportsView {} }
        }
    }
}

#[component]
fn ReportsView() -> Element {
    let services = use_services();
    let authorize = use_authorized();
    let mut export_error = use_signal(|| None::<String>);

    let projects = use_resource(move || {
        let (services, authorize) = (services.clone(), authorize.clone());
        async move {
            let auth = authorize().map_err(|e| e.to_string())?;
            services.projects.list(&auth).await.map_err(|e| e.to_string())
        }
    });

    let on_export = move |_| {
        let loaded = projects.read();
        let Some(Ok(list)) = &*loaded else {
            return;
        };
        let csv = projects_csv(list);
        match browser::save_file(REPORT_FILE_NAME, REPORT_CONTENT_TYPE, &csv) {
            Ok(()) => {
                info!(rows = list.len(), "report exported");
                export_error.set(None);
            }
            Err(err) => {
                warn!(error = %err, "report export failed");
                export_error.set(Some(err));
            }
        }
    };

    let table = match &*projects.read() {
        None => rsx! { Spinner {} },
        Some(Err(message)) => rsx! { Notice { kind: NoticeKind::Error, message: message.clone() } },
        Some(Ok(list)) => rsx! {
            div { class: "overflow-x-auto",
                table { class: "table table-zebra",
                    thead {
                        tr {
                            th { "Name" }
                            th { "Status" }
                            th { class: "text-right", "Progress" }
                            th { class: "text-right", "Created" }
                        }
                    }
                    tbody {
                        for project in list.iter() {
                            tr { key: "{project.id}",
                                td { "{project.name}" }
                                td { "{project.status.label()}" }
                                td { class: "text-right", "{project.display_progress()}%" }
                                td { class: "text-right", "{project.created_at.format(\"%Y-%m-%d\")}" }
                            }
                        }
                    }
                }
            }
        },
    };

    let ready = matches!(&*projects.read(), Some(Ok(_)));

    rsx! {
        div { class: "flex flex-col gap-6",
            div { class: "flex justify-between items-center",
                h1 { class: "text-3xl font-bold", "Reports" }
                button { class: "btn btn-primary", disabled: !ready, onclick: on_export, "Export CSV" }
            }
            if let Some(message) = export_error() {
                Notice { kind: NoticeKind::Error, message }
            }
            {table}
        }
    }
}
