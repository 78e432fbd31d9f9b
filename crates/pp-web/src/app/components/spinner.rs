use dioxus::prelude::*;

#[component]
pub fn Spinner(#[props(default = "min-h-[50vh]")] class: &'static str) -> Element {
    rsx! {
        div { class: "flex items-center justify-center {class}",
            span { class: "loading loading-spinner loading-lg" }
        }
    }
}
