//! Browser APIs the pages need: file downloads and the location fragment.

/// Offer `contents` as a file download named `file_name`.
#[cfg(feature = "web")]
pub fn save_file(file_name: &str, content_type: &str, contents: &str) -> Result<(), String> {
    use wasm_bindgen::JsCast;

    let window = web_sys::window().ok_or_else(|| "Window not available".to_string())?;
    let document = window.document().ok_or_else(|| "Document not available".to_string())?;

    let parts = js_sys::Array::of1(&wasm_bindgen::JsValue::from_str(contents));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(content_type);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options).map_err(|e| format!("{:?}", e))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(|e| format!("{:?}", e))?;

    let anchor = document
        .create_element("a")
        .map_err(|e| format!("{:?}", e))?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "Could not create download link".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    web_sys::Url::revoke_object_url(&url).map_err(|e| format!("{:?}", e))
}

#[cfg(not(feature = "web"))]
pub fn save_file(file_name: &str, _content_type: &str, _contents: &str) -> Result<(), String> {
    Err(format!("Downloading {file_name} needs a browser"))
}

/// The URL fragment, without `#`, when it is not empty.
pub fn location_fragment() -> Option<String> {
    #[cfg(feature = "web")]
    {
        let hash = web_sys::window()?.location().hash().ok()?;
        let fragment = hash.trim_start_matches('#');
        (!fragment.is_empty()).then(|| fragment.to_string())
    }
    #[cfg(not(feature = "web"))]
    {
        None
    }
}

/// Drop the fragment from the address bar without navigating.
pub fn clear_fragment() {
    #[cfg(feature = "web")]
    {
        let Some(window) = web_sys::window() else {
            return;
        };
        let location = window.location();
        let path = format!(
            "{}{}",
            location.pathname().unwrap_or_default(),
            location.search().unwrap_or_default()
        );
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&path));
        }
    }
}

/// Where magic links should send the browser back to.
pub fn origin() -> Option<String> {
    #[cfg(feature = "web")]
    {
        web_sys::window()?.location().origin().ok()
    }
    #[cfg(not(feature = "web"))]
    {
        None
    }
}
