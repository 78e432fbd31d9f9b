use dioxus::prelude::*;

use crate::components::NavBar;

#[component]
pub fn Layout(children: Element) -> Element {
    rsx! {
        div {
            class: "pp-layout min-h-screen flex flex-col",
            header {
                NavBar {}
            }
            main {
                class: "pp-main flex-grow p-4", {
                    children
                }
            }
        }
    }
}
