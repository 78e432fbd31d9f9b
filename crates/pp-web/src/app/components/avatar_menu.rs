use dioxus::prelude::*;
use session_core::ShellState;
use tracing::warn;

use crate::{app::context::use_services, routes::Routes};

#[component]
pub fn AvatarMenu() -> Element {
    let shell = use_context::<Signal<ShellState>>();
    let services = use_services();
    let navigator = use_navigator();

    let profile = shell.read().profile.clone();
    let label = profile.label().to_string();
    let initial = profile.initial();

    let on_sign_out = move |_| {
        let services = services.clone();
        spawn(async move {
            match services.mirror.sign_out(services.session.auth.as_ref()).await {
                Ok(target) => {
                    navigator.push(target);
                }
                Err(err) => warn!(error = %err, "sign-out failed"),
            }
        });
    };

    rsx! {
        div { class: "dropdown dropdown-end pl-2",
            div {
                tabindex: "0",
                role: "button",
                class: "btn btn-ghost btn-circle avatar placeholder",
                if let Some(url) = profile.avatar_url.clone() {
                    div { class: "rounded-full w-10",
                        img { src: "{url}", alt: "{label}" }
                    }
                } else {
                    div { class: "bg-neutral text-neutral-content rounded-full w-10",
                        span { class: "text-xl", "{initial}" }
                    }
                }
            }
            ul {
                tabindex: "-1",
                class: "menu menu-sm dropdown-content bg-base-100 rounded-box z-1 mt-3 w-52 p-2 shadow",
                li {
                    a { class: "pointer-events-none font-bold", "{label}" }
                }
                li { Link { to: Routes::ProfilePage {}, "Profile" } }
                div { class: "divider my-0" }
                li {
                    a { onclick: on_sign_out, "Sign out" }
                }
            }
        }
    }
}
