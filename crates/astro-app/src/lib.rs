//! Astro App: WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the platform adapters, the chat core and the egui UI.

#[cfg(target_arch = "wasm32")]
mod app;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    const CANVAS_ID: &str = "astro_canvas";

    /// WASM entry point, called from index.html
    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        wasm_logger::init(wasm_logger::Config::default());
        log::info!("Astro chat starting...");

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document"))?;
        let canvas = document
            .get_element_by_id(CANVAS_ID)
            .ok_or_else(|| JsValue::from_str(&format!("No canvas element with id '{}'", CANVAS_ID)))?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        let web_options = eframe::WebOptions::default();
        wasm_bindgen_futures::spawn_local(async move {
            let started = eframe::WebRunner::new()
                .start(
                    canvas,
                    web_options,
                    Box::new(|cc| Ok(Box::new(super::app::AstroApp::new(cc)))),
                )
                .await;
            if let Err(e) = started {
                log::error!("Failed to start eframe: {:?}", e);
            }
        });
        Ok(())
    }
}
