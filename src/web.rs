#![cfg(target_arch = "wasm32")]

use std::fmt::Display;
use std::sync::Arc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::web::{EventLoopExtWebSys, WindowAttributesExtWebSys};
use winit::window::Window;

use crate::app::ViewerApp;
use crate::config::ViewerConfig;
use crate::render::Renderer;
use crate::scene::build_cube_grid;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Attaches the viewer to the canvas with the given id.
///
/// `config_json` optionally overrides the default viewer configuration.
#[wasm_bindgen]
pub async fn start(canvas_id: String, config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(text) => ViewerConfig::from_json(&text).map_err(js_error)?,
        None => ViewerConfig::default(),
    };
    let canvas = find_canvas(&canvas_id)?;

    let event_loop = EventLoop::new().map_err(js_error)?;
    event_loop.set_control_flow(ControlFlow::Wait);
    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(Window::default_attributes().with_canvas(Some(canvas)))
            .map_err(js_error)?,
    );

    let scene = build_cube_grid(&config);
    let renderer = Renderer::new(Arc::clone(&window), &scene)
        .await
        .map_err(js_error)?;
    log::info!("{}", scene.summary_lines().join("\n"));

    event_loop.spawn_app(ViewerApp::with_renderer(config, window, renderer, scene));
    Ok(())
}

fn find_canvas(canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("missing window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("missing document"))?
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("canvas #{canvas_id} not found")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))
}

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}
