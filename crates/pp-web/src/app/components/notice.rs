use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Inline result message under a form.
#[component]
pub fn Notice(kind: NoticeKind, message: String) -> Element {
    let alert_class = match kind {
        NoticeKind::Success => "alert-success",
        NoticeKind::Error => "alert-error",
        NoticeKind::Info => "alert-info",
    };
    rsx! {
        div { class: "alert {alert_class} mt-4",
            span { "{message}" }
        }
    }
}
