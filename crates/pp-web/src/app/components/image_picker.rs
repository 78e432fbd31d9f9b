use dioxus::prelude::*;
use portfolio_store::ImageUpload;
use tracing::warn;

/// File input that hands the chosen image over as an [`ImageUpload`].
#[component]
pub fn ImagePicker(label: String, on_pick: EventHandler<Option<ImageUpload>>) -> Element {
    let on_change = move |evt: Event<FormData>| async move {
        let Some(file) = evt.files().into_iter().next() else {
            on_pick.call(None);
            return;
        };
        let name = file.name();
        match file.read_bytes().await {
            Ok(bytes) => on_pick.call(Some(ImageUpload::new(name, bytes.to_vec()))),
            Err(err) => {
                warn!(file = %name, error = %err, "could not read selected image");
                on_pick.call(None);
            }
        }
    };

    rsx! {
        label { class: "form-control w-full flex flex-col gap-2",
            span { class: "label-text", "{label}" }
            input {
                r#type: "file",
                accept: "image/*",
                class: "file-input file-input-bordered w-full",
                onchange: on_change,
            }
        }
    }
}
