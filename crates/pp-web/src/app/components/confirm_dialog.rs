use dioxus::prelude::*;

/// Blocking yes/no prompt for destructive actions. Render it only while the
/// question is open; clicking the backdrop cancels.
#[component]
pub fn ConfirmDialog(
    title: String,
    message: String,
    confirm_label: String,
    #[props(default)] busy: bool,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    rsx! {
        dialog { class: "modal modal-open",
            div { class: "modal-box",
                h3 { class: "font-bold text-lg", "{title}" }
                p { class: "py-4", "{message}" }
                div { class: "modal-action",
                    button {
                        class: "btn btn-ghost",
                        disabled: busy,
                        onclick: move |_| on_cancel.call(()),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-error",
                        disabled: busy,
                        onclick: move |_| on_confirm.call(()),
                        if busy {
                            span { class: "loading loading-spinner loading-sm" }
                        }
                        "{confirm_label}"
                    }
                }
            }
            div {
                class: "modal-backdrop",
                onclick: move |_| {
                    if !busy {
                        on_cancel.call(());
                    }
                },
            }
        }
    }
}
