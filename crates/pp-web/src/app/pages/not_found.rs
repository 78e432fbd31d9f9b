use dioxus::prelude::*;

use crate::{components::Layout, routes::Routes};

#[component]
pub fn NotFoundPage(route: Vec<String>) -> Element {
    let path = route.join("/");
    rsx! {
        Layout {
            div { class: "flex flex-col items-center gap-4 py-16",
                h1 { class: "text-5xl font-bold", "404" }
                p { "Not found: /{path}" }
                Link { class: "btn btn-primary", to: Routes::DashboardPage {}, "Go Home" }
            }
        }
    }
}
