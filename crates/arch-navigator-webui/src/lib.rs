#[cfg(target_arch = "wasm32")]
mod app;
mod clipboard;
#[cfg(target_arch = "wasm32")]
mod diagram;
#[cfg(target_arch = "wasm32")]
mod panels;

#[cfg(target_arch = "wasm32")]
pub use app::NavigatorApp;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
fn main() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` message to `console.log` and friends:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|x| x.document()) else {
            log::error!("No window or document");
            return;
        };

        let canvas = match document
            .get_element_by_id("the_canvas_id")
            .map(|x| x.dyn_into::<web_sys::HtmlCanvasElement>())
        {
            Some(Ok(canvas)) => canvas,
            _ => {
                log::error!("the_canvas_id is missing or not a HtmlCanvasElement");
                return;
            }
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(NavigatorApp::new(cc)))),
            )
            .await;

        // Remove the loading text and spinner:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p> The app has crashed. See the developer console for details. </p>",
                    );
                    log::error!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}
