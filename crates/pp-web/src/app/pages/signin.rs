use dioxus::prelude::*;
use secrecy::SecretString;
use session_core::{ShellState, SignInFlow, SignInOutcome};

use crate::{
    app::context::use_services, components::{Layout, Notice, NoticeKind}, routes::Routes
};

#[component]
pub fn SignInPage(from: String) -> Element {
    let services = use_services();
    let shell = use_context::<Signal<ShellState>>();
    let navigator = use_navigator();

    let mut flow = use_signal(|| SignInFlow::from_query((!from.is_empty()).then_some(from.as_str())));
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut submitting = use_signal(|| false);
    let mut error_message = use_signal(|| None::<String>);
    let mut info_message = use_signal(|| None::<String>);

    // a visitor who is already signed in skips the form
    use_effect(move || {
        if shell.read().is_signed_in() && !*submitting.peek() {
            let target = flow.write().already_signed_in();
            navigator.replace(target);
        }
    });

    let sign_in_services = services.clone();
    let on_submit = move |evt: Event<FormData>| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        error_message.set(None);
        info_message.set(None);
        submitting.set(true);

        let services = sign_in_services.clone();
        spawn(async move {
            let secret = SecretString::from(password());
            let mut current = flow();
            let result = current.sign_in(services.session.auth.as_ref(), &email(), &secret).await;
            flow.set(current);
            match result {
                Ok(SignInOutcome::Navigate(target)) => {
                    navigator.replace(target);
                }
                Ok(SignInOutcome::Stay) => submitting.set(false),
                Err(err) => {
                    error_message.set(Some(err.to_string()));
                    submitting.set(false);
                }
            }
        });
    };

    let on_magic_link = move |_| {
        if submitting() {
            return;
        }
        error_message.set(None);
        info_message.set(None);
        let services = services.clone();
        spawn(async move {
            match flow().send_magic_link(services.session.auth.as_ref(), &email()).await {
                Ok(message) => info_message.set(Some(message.to_string())),
                Err(err) => error_message.set(Some(err.to_string())),
            }
        });
    };

    rsx! {
        Layout {
            div { class: "flex items-center justify-center min-h-[calc(100vh-16rem)]",
                div { class: "card w-96 bg-base-100 shadow-xl",
                    div { class: "card-body",
                        h2 { class: "card-title justify-center mb-4", "Sign in" }

                        form { onsubmit: on_submit,
                            class: "flex flex-col gap-4",
                            label { class: "form-control w-full flex flex-col gap-2",
                                span { class: "label-text", "Email" }
                                input {
                                    r#type: "email",
                                    class: "input input-bordered w-full",
                                    value: "{email}",
                                    oninput: move |evt| email.set(evt.value()),
                                    autocomplete: "email",
                                }
                            }
                            label { class: "form-control w-full flex flex-col gap-2",
                                span { class: "label-text", "Password" }
                                input {
                                    r#type: "password",
                                    class: "input input-bordered w-full",
                                    value: "{password}",
                                    oninput: move |evt| password.set(evt.value()),
                                    autocomplete: "current-password",
                                }
                            }

                            if let Some(error) = error_message() {
                                Notice { kind: NoticeKind::Error, message: error }
                            }
                            if let Some(info) = info_message() {
                                Notice { kind: NoticeKind::Info, message: info }
                            }

                            button {
                                r#type: "submit",
                                class: "btn btn-primary w-full",
                                disabled: submitting(),
                                if submitting() {
                                    span { class: "loading loading-spinner" }
                                    span { "Signing in" }
                                } else {
                                    span { "Sign in" }
                                }
                            }
                        }

                        div { class: "divider", "OR" }

                        button {
                            class: "btn btn-outline btn-primary w-full",
                            disabled: submitting(),
                            onclick: on_magic_link,
                            "Send magic link"
                        }

                        p { class: "text-sm text-center mt-4",
                            "No account yet? "
                            Link { class: "link link-primary", to: Routes::SignUpPage {}, "Sign up" }
                        }
                    }
                }
            }
        }
    }
}
