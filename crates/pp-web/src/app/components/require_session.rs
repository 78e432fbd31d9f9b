use dioxus::prelude::*;
use session_core::{AuthGate, Authorized, GateDecision, GateError, decide};

use crate::{app::context::use_services, components::Spinner, routes::Routes};

/// Route guard: mounts one authorization gate for the current view.
///
/// Shows a spinner while the gate is pending, redirects to sign-in when it
/// is denied and renders `children` only while it is granted. The gate is
/// torn down when this component unmounts.
///
/// ```text
/// Layout { RequireSession { ProjectsView {} } }
/// ```
#[component]
pub fn RequireSession(children: Element) -> Element {
    let services = use_services();
    let route = use_route::<Routes>();
    let nav = navigator();

    let gate = use_context_provider(|| services.session.mount_gate(route.to_string()));
    let mut resolution = use_signal(|| gate.resolution());

    use_hook(|| {
        let (session, driven) = (services.session.clone(), gate.clone());
        spawn(async move { session.guard(driven).await });

        let mut rx = gate.watch();
        spawn(async move {
            while rx.changed().await.is_ok() {
                let current = *rx.borrow_and_update();
                resolution.set(current);
            }
        });
    });

    use_drop({
        let gate = gate.clone();
        move || gate.teardown()
    });

    let redirect_gate = gate.clone();
    use_effect(move || {
        if let GateDecision::Redirect(redirect) = decide(resolution(), redirect_gate.requested(), redirect_gate.config()) {
            nav.replace(redirect.href());
        }
    });

    match decide(resolution(), gate.requested(), gate.config()) {
        GateDecision::Loading => rsx! { Spinner {} },
        // navigation happens in the effect above
        GateDecision::Redirect(_) => rsx! {},
        GateDecision::Render => rsx! { {children} },
    }
}

/// Write proof of the enclosing [`RequireSession`].
pub fn use_authorized() -> impl Fn() -> Result<Authorized, GateError> + Clone + 'static {
    let gate = use_context::<AuthGate>();
    move || gate.authorize()
}
