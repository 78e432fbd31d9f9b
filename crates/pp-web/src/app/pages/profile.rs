use dioxus::prelude::*;
use portfolio_store::{ImageUpload, PROFILE_UPDATED, ProfileForm};
use pp_types::UserProfile;
use secrecy::SecretString;
use tracing::level_filters::LevelFilter;

use crate::{
    app::{context::use_services, logging}, components::{ImagePicker, Layout, Notice, NoticeKind, RequireSession, Spinner, use_authorized}
};

#[component]
pub fn ProfilePage() -> Element {
    rsx! {
        Layout {
            RequireSession { ProfileView {} }
        }
    }
}

#[component]
fn ProfileView() -> Element {
    let services = use_services();
    let authorize = use_authorized();

    let mut current = use_signal(|| None::<UserProfile>);
    let mut name = use_signal(String::new);
    let mut avatar = use_signal(|| None::<ImageUpload>);
    let mut old_password = use_signal(String::new);
    let mut new_password = use_signal(String::new);
    let mut saving = use_signal(|| false);
    let mut notice = use_signal(|| None::<(NoticeKind, String)>);
    let mut log_level = use_signal(logging::get_log_level);

    let load_services = services.clone();
    let load_authorize = authorize.clone();
    use_hook(move || {
        spawn(async move {
            let loaded = match load_authorize() {
                Ok(auth) => load_services.profiles.load(&auth).await.map_err(|e| e.to_string()),
                Err(err) => Err(err.to_string()),
            };
            match loaded {
                Ok(profile) => {
                    name.set(profile.name.clone().unwrap_or_default());
                    current.set(Some(profile));
                }
                Err(message) => notice.set(Some((NoticeKind::Error, message))),
            }
        });
    });

    let on_submit = move |evt: Event<FormData>| {
        evt.prevent_default();
        let Some(profile) = current() else {
            return;
        };
        if saving() {
            return;
        }
        saving.set(true);
        notice.set(None);

        let mut form = ProfileForm::new(name().trim());
        if let Some(upload) = avatar() {
            form = form.with_avatar(upload);
        }
        if !new_password().is_empty() {
            form = form.with_password_change(SecretString::from(old_password()), SecretString::from(new_password()));
        }

        let (services, authorize) = (services.clone(), authorize.clone());
        spawn(async move {
            let (saved, message) = match authorize() {
                Ok(auth) => services.profiles.save_with_message(&auth, &profile, form).await,
                Err(err) => (None, err.to_string()),
            };
            let kind = if message == PROFILE_UPDATED { NoticeKind::Success } else { NoticeKind::Error };
            if let Some(saved) = saved {
                current.set(Some(saved));
                old_password.set(String::new());
                new_password.set(String::new());
            }
            notice.set(Some((kind, message)));
            saving.set(false);
        });
    };

    let Some(profile) = current() else {
        return rsx! {
            if let Some((kind, message)) = notice() {
                Notice { kind, message }
            } else {
                Spinner {}
            }
        };
    };

    rsx! {
        div { class: "card max-w-xl bg-base-100 shadow",
            div { class: "card-body",
                h1 { class: "card-title text-2xl", "Profile" }
                if let Some(url) = profile.avatar_url.clone() {
                    div { class: "avatar",
                        div { class: "w-24 rounded-full", img { src: "{url}" } }
                    }
                }
                form { onsubmit: on_submit, class: "flex flex-col gap-4",
                    label { class: "form-control w-full flex flex-col gap-2",
                        span { class: "label-text", "Name" }
                        input {
                            class: "input input-bordered w-full",
                            value: "{name}",
                            oninput: move |evt| name.set(evt.value()),
                        }
                    }
                    ImagePicker {
                        label: "Avatar",
                        on_pick: move |picked| avatar.set(picked),
                    }
                    div { class: "divider", "Change password" }
                    label { class: "form-control w-full flex flex-col gap-2",
                        span { class: "label-text", "Current password" }
                        input {
                            r#type: "password",
                            class: "input input-bordered w-full",
                            value: "{old_password}",
                            oninput: move |evt| old_password.set(evt.value()),
                            autocomplete: "current-password",
                        }
                    }
                    label { class: "form-control w-full flex flex-col gap-2",
                        span { class: "label-text", "New password" }
                        input {
                            r#type: "password",
                            class: "input input-bordered w-full",
                            value: "{new_password}",
                            oninput: move |evt| new_password.set(evt.value()),
                            autocomplete: "new-password",
                        }
                    }

                    if let Some((kind, message)) = notice() {
                        Notice { kind, message }
                    }

                    div { class: "card-actions justify-end",
                        button {
                            r#type: "submit",
                            class: "btn btn-primary",
                            disabled: saving(),
                            if saving() {
                                span { class: "loading loading-spinner" }
                            }
                            "Save"
                        }
                    }
                }

                div { class: "divider", "Diagnostics" }
                label { class: "form-control w-full flex flex-col gap-2",
                    span { class: "label-text", "Console log level" }
                    select {
                        class: "select select-bordered select-sm w-full",
                        onchange: move |evt| {
                            if let Ok(level) = evt.value().parse::<LevelFilter>() {
                                logging::set_log_level(level);
                                log_level.set(level);
                            }
                        },
                        for level in [LevelFilter::ERROR, LevelFilter::WARN, LevelFilter::INFO, LevelFilter::DEBUG, LevelFilter::TRACE] {
                            option {
                                key: "{level}",
                                value: "{level}",
                                selected: level == log_level(),
                                "{level}"
                            }
                        }
                    }
                }
            }
        }
    }
}
