use std::sync::Arc;

use dioxus::prelude::*;
use session_core::ShellState;
use tracing::{debug, info, warn};

use crate::{
    app::{
        self, browser, config::backend_config, context::AppServices, storage::BrowserTokenStore
    }, components::Spinner
};

/// Root shell: builds the services, finishes a magic-link redirect, then
/// mounts the router.
#[component]
pub fn app_root() -> Element {
    let services = use_hook(|| {
        let config = backend_config().map_err(|err| err.to_string())?;
        AppServices::connect(config, Arc::new(BrowserTokenStore::local()), browser::origin()).map_err(|err| err.to_string())
    });

    let body = match services {
        Ok(services) => rsx! { ServicesProvider { services } },
        Err(message) => rsx! { ConfigErrorPage { message } },
    };

    rsx! {
        document::Title { "Project Portfolio" }
        {body}
    }
}

#[component]
fn ServicesProvider(services: AppServices) -> Element {
    let services = use_context_provider(|| services);
    let mut shell = use_context_provider(|| Signal::<ShellState>::new(services.mirror.state()));
    let mut ready = use_signal(|| false);

    use_hook(|| {
        let services = services.clone();
        spawn(async move {
            if let Some(fragment) = browser::location_fragment() {
                match services.backend.complete_magic_link(&fragment).await {
                    Ok(Some(session)) => info!(user = %session.identity.id, "signed in from magic link"),
                    Ok(None) => {}
                    Err(err) => warn!(error = %err, "magic link could not be completed"),
                }
                browser::clear_fragment();
            }
            ready.set(true);

            let mut rx = services.mirror.watch();
            spawn(async move {
                while rx.changed().await.is_ok() {
                    let state = rx.borrow_and_update().clone();
                    shell.set(state);
                }
            });
            services.session.mirror(&services.mirror).await;
            debug!("shell stopped following the session");
        });
    });

    use_drop({
        let mirror = services.mirror.clone();
        move || mirror.stop()
    });

    rsx! {
        if ready() {
            app::routes::AppRouter {}
        } else {
            Spinner { class: "min-h-screen" }
        }
    }
}

#[component]
fn ConfigErrorPage(message: String) -> Element {
    rsx! {
        div { class: "hero min-h-screen bg-base-200",
            div { class: "hero-content text-center",
                div {
                    h1 { class: "text-3xl font-bold", "Backend not configured" }
                    p { class: "py-6", "{message}" }
                }
            }
        }
    }
}
