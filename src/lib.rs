/// TabFlow - Chrome extension showing open tabs by tab group
/// Built with Rust + WASM + Yew

mod background;
pub mod domain;
pub mod errors;
pub mod floating;
mod host;
pub mod launch;
pub mod notice;
pub mod operations;
pub mod render;
pub mod storage;
pub mod tab_data;
pub mod ui;

use ui::panel::{FeatureSet, TabPanel, TabPanelProps};
use wasm_bindgen::prelude::*;

pub use ui::overlay::OverlayController;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

fn render_panel(features: FeatureSet) {
    yew::Renderer::<TabPanel>::with_props(TabPanelProps { features }).render();
}

// Host side panel (also used by the fallback popup window)
#[wasm_bindgen]
pub fn start_side_panel() {
    render_panel(FeatureSet::SIDE_PANEL);
}

// Panel page loaded inside the in-page overlay's iframe
#[wasm_bindgen]
pub fn start_floating_panel() {
    render_panel(FeatureSet::FLOATING);
}

// Compact toolbar popup
#[wasm_bindgen]
pub fn start_popup() {
    render_panel(FeatureSet::POPUP);
}

#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}

// Service worker entry point
#[wasm_bindgen]
pub fn start_background() {
    background::start();
}
