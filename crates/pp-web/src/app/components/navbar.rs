use dioxus::prelude::*;
use session_core::ShellState;

use crate::{components::AvatarMenu, routes::Routes};

#[component]
pub fn NavBar() -> Element {
    let shell = use_context::<Signal<ShellState>>();
    let signed_in = shell.read().is_signed_in();

    rsx! {
        div { class: "navbar bg-base-200 shadow-sm",
            div { class: "flex-1",
                Link { class: "btn btn-ghost text-xl", to: Routes::DashboardPage {}, "Portfolio" }
                ul { class: "menu menu-horizontal px-1",
                    if signed_in {
                        li { Link { to: Routes::DashboardPage {}, "Dashboard" } }
                        li { Link { to: Routes::ProjectsPage {}, "Projects" } }
                        li { Link { to: Routes::ReportsPage {}, "Reports" } }
                    }
                }
            }
            div { class: "flex-none gap-2",
                if signed_in {
                    AvatarMenu {}
                } else {
                    Link { class: "btn btn-sm btn-primary", to: Routes::SignInPage { from: String::new() }, "Sign in" }
                }
            }
        }
    }
}
