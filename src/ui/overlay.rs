/// In-page floating panel: container element, drag, resize and messages
/// from the embedded panel
///
/// Geometry lives in [`FloatingPanel`]; this module only feeds it pointer
/// positions and measured sizes and writes the result back to the container's
/// inline style.

use crate::errors::HostError;
use crate::floating::{FloatingPanel, Horizontal, MIN_HEIGHT, MIN_WIDTH, PanelGeometry, PanelMessage, ToggleIntent, Viewport};
use crate::host;
use crate::storage::{AnchorSide, FloatingPanelState, px};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlElement, MessageEvent, MouseEvent, ResizeObserver, Window};

const CONTAINER_ID: &str = "tabflow-floating-panel-container";
const PANEL_PAGE: &str = "floating-panel.html";

const CONTAINER_STYLE: &str = "position: fixed; z-index: 2147483647; background-color: #fff; \
    border-radius: 10px; box-shadow: 0 8px 32px rgba(0,0,0,0.18), 0 2px 8px rgba(0,0,0,0.08); \
    overflow: hidden; resize: both;";
const IFRAME_STYLE: &str = "width: 100%; height: 100%; border: none; display: block;";

/// DOM owned by an open panel
struct Mounted {
    container: HtmlElement,
    iframe: HtmlElement,
    observer: ResizeObserver,
    _on_resize: Closure<dyn FnMut()>,
    _on_mousedown: Closure<dyn FnMut(MouseEvent)>,
}

/// Document listeners installed for one drag
struct DragListeners {
    on_move: Closure<dyn FnMut(MouseEvent)>,
    on_up: Closure<dyn FnMut(MouseEvent)>,
}

#[derive(Default)]
struct Overlay {
    panel: FloatingPanel,
    mounted: Option<Mounted>,
    drag: Option<DragListeners>,
    /// Listeners of the last finished drag; the mouseup closure cannot drop itself
    spent_drag: Option<DragListeners>,
    /// Stored geometry is being loaded for an open
    pending_open: bool,
}

type Shared = Rc<RefCell<Overlay>>;

fn unavailable(what: &str) -> HostError {
    HostError::Unavailable(what.to_string())
}

fn window() -> Result<Window, HostError> {
    web_sys::window().ok_or_else(|| unavailable("window"))
}

fn document(window: &Window) -> Result<Document, HostError> {
    window.document().ok_or_else(|| unavailable("document"))
}

fn viewport(window: &Window) -> Viewport {
    let measure = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let client = window
        .document()
        .and_then(|document| document.document_element())
        .map(|root| (root.client_width(), root.client_height()))
        .unwrap_or((0, 0));
    Viewport::from_layout(client, (measure(window.inner_width()), measure(window.inner_height())))
}

fn create_html(document: &Document, tag: &str) -> Result<HtmlElement, HostError> {
    document
        .create_element(tag)
        .map_err(HostError::from_js)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| HostError::Decode(format!("<{}> is not an HTML element", tag)))
}

/// Write the geometry onto the container's inline style
fn project(container: &HtmlElement, geometry: &PanelGeometry) -> Result<(), HostError> {
    let (left, right) = match geometry.horizontal {
        Horizontal::Left(left) => (px(left), String::new()),
        Horizontal::Right(right) => (String::new(), px(right)),
    };
    let style = container.style();
    for (property, value) in [
        ("left", left),
        ("right", right),
        ("top", px(geometry.top)),
        ("width", px(geometry.width)),
        ("height", px(geometry.height)),
    ] {
        style.set_property(property, &value).map_err(HostError::from_js)?;
    }
    Ok(())
}

fn persist(state: FloatingPanelState) {
    spawn_local(async move {
        if let Err(e) = host::save_panel_state(&state).await {
            warn!("Could not save floating panel geometry: {}", e);
        }
    });
}

fn open_panel(overlay: &Shared, side: AnchorSide) {
    {
        let mut state = overlay.borrow_mut();
        if state.pending_open || state.panel.is_open() {
            return;
        }
        state.pending_open = true;
    }

    let weak = Rc::downgrade(overlay);
    spawn_local(async move {
        let saved = match host::load_panel_state().await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Ignoring stored floating panel geometry: {}", e);
                None
            }
        };
        let Some(overlay) = weak.upgrade() else {
            return;
        };
        overlay.borrow_mut().pending_open = false;
        if let Err(e) = mount(&overlay, saved.as_ref(), side) {
            warn!("Could not open the floating panel: {}", e);
            overlay.borrow_mut().panel = FloatingPanel::new();
        }
    });
}

/// Build the container, attach it to the page and start observing it
fn mount(overlay: &Shared, saved: Option<&FloatingPanelState>, side: AnchorSide) -> Result<(), HostError> {
    let window = window()?;
    let document = document(&window)?;
    let body = document.body().ok_or_else(|| unavailable("document body"))?;

    let Some(geometry) = overlay.borrow_mut().panel.open(saved, side) else {
        return Ok(());
    };

    let container = create_html(&document, "div")?;
    container.set_id(CONTAINER_ID);
    let style = container.style();
    style.set_css_text(CONTAINER_STYLE);
    style.set_property("min-width", &px(MIN_WIDTH)).map_err(HostError::from_js)?;
    style.set_property("min-height", &px(MIN_HEIGHT)).map_err(HostError::from_js)?;
    project(&container, &geometry)?;

    let iframe = create_html(&document, "iframe")?;
    iframe
        .set_attribute("src", &host::extension_url(PANEL_PAGE))
        .map_err(HostError::from_js)?;
    iframe.style().set_css_text(IFRAME_STYLE);
    container.append_child(&iframe).map_err(HostError::from_js)?;

    let weak = Rc::downgrade(overlay);
    let on_mousedown = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        if let Some(overlay) = weak.upgrade() {
            container_pressed(&overlay, &event);
        }
    });
    container
        .add_event_listener_with_callback("mousedown", on_mousedown.as_ref().unchecked_ref())
        .map_err(HostError::from_js)?;

    let weak = Rc::downgrade(overlay);
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        if let Some(overlay) = weak.upgrade() {
            container_resized(&overlay);
        }
    });
    let observer = ResizeObserver::new(on_resize.as_ref().unchecked_ref()).map_err(HostError::from_js)?;

    body.append_child(&container).map_err(HostError::from_js)?;
    observer.observe(&container);

    overlay.borrow_mut().mounted = Some(Mounted {
        container,
        iframe,
        observer,
        _on_resize: on_resize,
        _on_mousedown: on_mousedown,
    });
    info!("Floating panel opened ({} side)", side.as_str());
    Ok(())
}

fn close_panel(overlay: &Shared) {
    if overlay.borrow().panel.is_dragging() {
        end_drag(overlay);
    }
    let Ok(window) = window() else {
        return;
    };

    let mut state = overlay.borrow_mut();
    let saved = state.panel.close(viewport(&window));
    let mounted = state.mounted.take();
    drop(state);

    if let Some(mounted) = mounted {
        mounted.observer.disconnect();
        mounted.container.remove();
        info!("Floating panel closed");
    }
    if let Some(saved) = saved {
        persist(saved);
    }
}

/// Pointer-down on the container: only the strip along the top edge starts a drag
fn container_pressed(overlay: &Shared, event: &MouseEvent) {
    let grabbed = {
        let state = overlay.borrow();
        let Some(geometry) = state.panel.geometry() else {
            return;
        };
        state.panel.in_drag_handle(f64::from(event.client_y()) - geometry.top)
    };
    if grabbed {
        event.prevent_default();
        begin_drag(overlay, f64::from(event.screen_x()), f64::from(event.screen_y()));
    }
}

fn begin_drag(overlay: &Shared, x: f64, y: f64) {
    if let Err(e) = install_drag(overlay, x, y) {
        warn!("Could not start dragging: {}", e);
        end_drag(overlay);
    }
}

fn install_drag(overlay: &Shared, x: f64, y: f64) -> Result<(), HostError> {
    let window = window()?;
    let document = document(&window)?;

    let mut state = overlay.borrow_mut();
    if state.panel.is_dragging() {
        return Ok(());
    }
    let Some(geometry) = state.panel.begin_drag(x, y, viewport(&window)) else {
        return Ok(());
    };
    if let Some(mounted) = &state.mounted {
        project(&mounted.container, &geometry)?;
        // Keep mouse events on this document while the pointer crosses the iframe
        mounted
            .iframe
            .style()
            .set_property("pointer-events", "none")
            .map_err(HostError::from_js)?;
    }

    let weak = Rc::downgrade(overlay);
    let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        if let Some(overlay) = weak.upgrade() {
            drag_moved(&overlay, &event);
        }
    });
    let weak = Rc::downgrade(overlay);
    let on_up = Closure::<dyn FnMut(MouseEvent)>::new(move |_: MouseEvent| {
        if let Some(overlay) = weak.upgrade() {
            end_drag(&overlay);
        }
    });

    let listeners = DragListeners { on_move, on_up };
    // Stored first so a failure below is cleaned up by end_drag
    state.spent_drag = None;
    state.drag = Some(listeners);
    if let Some(listeners) = &state.drag {
        document
            .add_event_listener_with_callback("mousemove", listeners.on_move.as_ref().unchecked_ref())
            .map_err(HostError::from_js)?;
        document
            .add_event_listener_with_callback("mouseup", listeners.on_up.as_ref().unchecked_ref())
            .map_err(HostError::from_js)?;
    }
    debug!("Drag started at ({}, {})", x, y);
    Ok(())
}

fn drag_moved(overlay: &Shared, event: &MouseEvent) {
    let Ok(window) = window() else {
        return;
    };
    let mut state = overlay.borrow_mut();
    let moved = state.panel.drag_to(
        f64::from(event.screen_x()),
        f64::from(event.screen_y()),
        viewport(&window),
    );
    if let (Some(geometry), Some(mounted)) = (moved, &state.mounted) {
        if let Err(e) = project(&mounted.container, &geometry) {
            warn!("Could not move the floating panel: {}", e);
        }
    }
}

/// Release the drag listeners, restore the iframe and persist the final geometry
fn end_drag(overlay: &Shared) {
    let Ok(window) = window() else {
        return;
    };
    let mut state = overlay.borrow_mut();

    if let Some(listeners) = state.drag.take() {
        if let Some(document) = window.document() {
            for (event, callback) in [("mousemove", &listeners.on_move), ("mouseup", &listeners.on_up)] {
                if let Err(e) = document.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
                    warn!("Could not remove {} listener: {:?}", event, e);
                }
            }
        }
        state.spent_drag = Some(listeners);
    }
    if let Some(mounted) = &state.mounted {
        if let Err(e) = mounted.iframe.style().remove_property("pointer-events") {
            warn!("Could not restore iframe pointer events: {:?}", e);
        }
    }

    let saved = state.panel.end_drag(viewport(&window));
    drop(state);
    if let Some(saved) = saved {
        debug!("Drag ended at left {:?}, top {:?}", saved.left, saved.top);
        persist(saved);
    }
}

fn container_resized(overlay: &Shared) {
    let Ok(window) = window() else {
        return;
    };
    let mut state = overlay.borrow_mut();
    let Some(mounted) = &state.mounted else {
        return;
    };
    if !mounted.container.is_connected() {
        return;
    }
    let width = f64::from(mounted.container.offset_width());
    let height = f64::from(mounted.container.offset_height());

    let saved = state.panel.resized(width, height, viewport(&window));
    drop(state);
    if let Some(saved) = saved {
        persist(saved);
    }
}

/// Floating panel controller for one page, held by the content script
#[wasm_bindgen]
pub struct OverlayController {
    overlay: Shared,
    on_message: Closure<dyn FnMut(MessageEvent)>,
}

#[wasm_bindgen]
impl OverlayController {
    /// Listen for messages from the embedded panel; only the extension's own origin is trusted
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<OverlayController, JsValue> {
        let window = window()?;
        let overlay: Shared = Rc::new(RefCell::new(Overlay::default()));
        let trusted_origin = host::extension_origin();

        let weak = Rc::downgrade(&overlay);
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            if event.origin() != trusted_origin {
                return;
            }
            let Some(overlay) = weak.upgrade() else {
                return;
            };
            match PanelMessage::from_js(event.data()) {
                Some(PanelMessage::ClosePanel) => close_panel(&overlay),
                Some(PanelMessage::DragStart { client_x, client_y }) => begin_drag(&overlay, client_x, client_y),
                None => debug!("Ignoring unrecognized panel message"),
            }
        });
        window
            .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
            .map_err(HostError::from_js)?;

        Ok(OverlayController { overlay, on_message })
    }

    /// Open the panel anchored to `side` ("left" or "right"), or close it when open
    pub fn toggle(&self, side: &str) {
        let intent = self.overlay.borrow().panel.toggle_intent();
        match intent {
            ToggleIntent::Open => open_panel(&self.overlay, AnchorSide::parse(side)),
            ToggleIntent::Close => close_panel(&self.overlay),
        }
    }

    pub fn close(&self) {
        close_panel(&self.overlay);
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.overlay.borrow().panel.is_open()
    }
}

impl Drop for OverlayController {
    fn drop(&mut self) {
        close_panel(&self.overlay);
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.remove_event_listener_with_callback("message", self.on_message.as_ref().unchecked_ref()) {
                warn!("Could not remove message listener: {:?}", e);
            }
        }
    }
}
