use dioxus::prelude::*;
use secrecy::SecretString;
use session_core::sign_up;

use crate::{
    app::context::use_services, components::{Layout, Notice, NoticeKind}, routes::Routes
};

#[component]
pub fn SignUpPage() -> Element {
    let services = use_services();
    let navigator = use_navigator();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut submitting = use_signal(|| false);
    let mut notice = use_signal(|| None::<(NoticeKind, String)>);

    let on_submit = move |evt: Event<FormData>| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        notice.set(None);
        submitting.set(true);

        let services = services.clone();
        spawn(async move {
            let secret = SecretString::from(password());
            match sign_up(services.session.auth.as_ref(), &email(), &secret).await {
                Ok((_, Some(target))) => {
                    navigator.replace(target);
                }
                Ok((_, None)) => {
                    notice.set(Some((NoticeKind::Info, "Check your email to confirm your account.".to_string())));
                }
                Err(err) => notice.set(Some((NoticeKind::Error, err.to_string()))),
            }
            submitting.set(false);
        });
    };

    rsx! {
        Layout {
            div { class: "flex items-center justify-center min-h-[calc(100vh-16rem)]",
                div { class: "card w-96 bg-base-100 shadow-xl",
                    div { class: "card-body",
                        h2 { class: "card-title justify-center mb-4", "Create an account" }

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
                                    autocomplete: "new-password",
                                }
                            }

                            if let Some((kind, message)) = notice() {
                                Notice { kind, message }
                            }

                            button {
                                r#type: "submit",
                                class: "btn btn-primary w-full",
                                disabled: submitting(),
                                if submitting() {
                                    span { class: "loading loading-spinner" }
                                }
                                span { "Sign up" }
                            }
                        }

                        p { class: "text-sm text-center mt-4",
                            "Already registered? "
                            Link { class: "link link-primary", to: Routes::SignInPage { from: String::new() }, "Sign in" }
                        }
                    }
                }
            }
        }
    }
}
