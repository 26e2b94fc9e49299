/// Floating panel lifecycle, drag and resize over an explicit geometry value
///
/// Nothing here touches the DOM: `ui::overlay` feeds pointer positions,
/// observed sizes and the viewport in, and projects the resulting geometry
/// back onto the container element.

use crate::storage::{AnchorSide, FloatingPanelState, parse_px, px};
use serde::{Deserialize, Serialize};

/// Height of the grab strip at the top of the container (px)
pub const DRAG_HANDLE_HEIGHT: f64 = 40.0;
/// Distance from the anchored viewport edge for a fresh panel (px)
pub const EDGE_MARGIN: f64 = 20.0;
pub const DEFAULT_TOP: f64 = 20.0;
pub const DEFAULT_WIDTH: f64 = 380.0;
pub const DEFAULT_HEIGHT: f64 = 560.0;
pub const MIN_WIDTH: f64 = 300.0;
pub const MIN_HEIGHT: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Layout viewport from the root element's client size, which excludes
    /// scrollbars; the window's inner size is used when the root reports 0
    pub fn from_layout(client: (i32, i32), inner: (f64, f64)) -> Viewport {
        let pick = |client: i32, inner: f64| if client > 0 { f64::from(client) } else { inner };
        Viewport {
            width: pick(client.0, inner.0),
            height: pick(client.1, inner.1),
        }
    }
}

/// Horizontal placement of the container
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Horizontal {
    /// Offset of the left edge from the viewport's left edge
    Left(f64),
    /// Offset of the right edge from the viewport's right edge
    Right(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGeometry {
    pub horizontal: Horizontal,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PanelGeometry {
    /// Geometry for a panel being opened
    ///
    /// A stored left offset wins over the requested side; the side only
    /// applies when nothing has been stored yet.
    pub fn restore(saved: Option<&FloatingPanelState>, side: AnchorSide) -> PanelGeometry {
        let stored = |value: Option<&Option<String>>| value.and_then(|v| v.as_deref()).and_then(parse_px);

        let horizontal = match stored(saved.map(|s| &s.left)) {
            Some(left) => Horizontal::Left(left),
            None => match side {
                AnchorSide::Left => Horizontal::Left(EDGE_MARGIN),
                AnchorSide::Right => Horizontal::Right(EDGE_MARGIN),
            },
        };

        PanelGeometry {
            horizontal,
            top: stored(saved.map(|s| &s.top)).unwrap_or(DEFAULT_TOP),
            width: stored(saved.map(|s| &s.width)).unwrap_or(DEFAULT_WIDTH),
            height: stored(saved.map(|s| &s.height)).unwrap_or(DEFAULT_HEIGHT),
        }
    }

    /// Left edge in viewport coordinates
    pub fn left(&self, viewport: Viewport) -> f64 {
        match self.horizontal {
            Horizontal::Left(left) => left,
            Horizontal::Right(right) => viewport.width - right - self.width,
        }
    }

    /// Record to persist; the resolved left offset is always written
    pub fn snapshot(&self, side: AnchorSide, viewport: Viewport) -> FloatingPanelState {
        FloatingPanelState {
            position: side,
            left: Some(px(self.left(viewport))),
            top: Some(px(self.top)),
            width: Some(px(self.width)),
            height: Some(px(self.height)),
        }
    }

    /// Keep the container inside the viewport
    ///
    /// Left/top are floored at 0 first; the right/bottom bound is applied
    /// last, so a container larger than the viewport sticks out on the
    /// top-left instead of the bottom-right.
    fn clamp(&self, mut left: f64, mut top: f64, viewport: Viewport) -> (f64, f64) {
        if left < 0.0 {
            left = 0.0;
        }
        if top < 0.0 {
            top = 0.0;
        }
        if left + self.width > viewport.width {
            left = viewport.width - self.width;
        }
        if top + self.height > viewport.height {
            top = viewport.height - self.height;
        }
        (left, top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    start_x: f64,
    start_y: f64,
    start_left: f64,
    start_top: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct OpenPanel {
    side: AnchorSide,
    geometry: PanelGeometry,
    drag: Option<DragSession>,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum PanelState {
    #[default]
    Closed,
    Open(OpenPanel),
}

/// What a toggle request should do given the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleIntent {
    Open,
    Close,
}

/// The floating panel controller for one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatingPanel {
    state: PanelState,
}

impl FloatingPanel {
    pub fn new() -> Self {
        FloatingPanel {
            state: PanelState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Open(_))
    }

    pub fn is_dragging(&self) -> bool {
        matches!(&self.state, PanelState::Open(open) if open.drag.is_some())
    }

    pub fn geometry(&self) -> Option<&PanelGeometry> {
        match &self.state {
            PanelState::Open(open) => Some(&open.geometry),
            PanelState::Closed => None,
        }
    }

    pub fn toggle_intent(&self) -> ToggleIntent {
        if self.is_open() { ToggleIntent::Close } else { ToggleIntent::Open }
    }

    /// closed → open; `None` when already open
    pub fn open(&mut self, saved: Option<&FloatingPanelState>, side: AnchorSide) -> Option<PanelGeometry> {
        if self.is_open() {
            return None;
        }
        let geometry = PanelGeometry::restore(saved, side);
        self.state = PanelState::Open(OpenPanel {
            side,
            geometry,
            drag: None,
        });
        Some(geometry)
    }

    /// open → closed; returns the geometry to persist, `None` when already closed
    pub fn close(&mut self, viewport: Viewport) -> Option<FloatingPanelState> {
        match std::mem::take(&mut self.state) {
            PanelState::Open(open) => Some(open.geometry.snapshot(open.side, viewport)),
            PanelState::Closed => None,
        }
    }

    /// Whether a pointer-down at `offset_y` below the container's top edge grabs it
    pub fn in_drag_handle(&self, offset_y: f64) -> bool {
        self.is_open() && (0.0..=DRAG_HANDLE_HEIGHT).contains(&offset_y)
    }

    /// Start dragging from screen position (`x`, `y`)
    ///
    /// A right-anchored panel is converted to an explicit left offset here
    /// and stays left-anchored from then on.
    pub fn begin_drag(&mut self, x: f64, y: f64, viewport: Viewport) -> Option<PanelGeometry> {
        let PanelState::Open(open) = &mut self.state else {
            return None;
        };
        let left = open.geometry.left(viewport);
        open.geometry.horizontal = Horizontal::Left(left);
        open.drag = Some(DragSession {
            start_x: x,
            start_y: y,
            start_left: left,
            start_top: open.geometry.top,
        });
        Some(open.geometry)
    }

    /// Pointer moved to screen position (`x`, `y`) during a drag
    pub fn drag_to(&mut self, x: f64, y: f64, viewport: Viewport) -> Option<PanelGeometry> {
        let PanelState::Open(open) = &mut self.state else {
            return None;
        };
        let drag = open.drag?;
        let (left, top) = open.geometry.clamp(
            drag.start_left + (x - drag.start_x),
            drag.start_top + (y - drag.start_y),
            viewport,
        );
        open.geometry.horizontal = Horizontal::Left(left);
        open.geometry.top = top;
        Some(open.geometry)
    }

    /// Pointer released; returns the geometry to persist
    pub fn end_drag(&mut self, viewport: Viewport) -> Option<FloatingPanelState> {
        let PanelState::Open(open) = &mut self.state else {
            return None;
        };
        open.drag.take()?;
        Some(open.geometry.snapshot(open.side, viewport))
    }

    /// The container was measured at a new size; returns the geometry to persist
    pub fn resized(&mut self, width: f64, height: f64, viewport: Viewport) -> Option<FloatingPanelState> {
        let PanelState::Open(open) = &mut self.state else {
            return None;
        };
        open.geometry.width = width;
        open.geometry.height = height;
        Some(open.geometry.snapshot(open.side, viewport))
    }
}

/// Messages the embedded panel posts to the host page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PanelMessage {
    ClosePanel,
    DragStart {
        #[serde(rename = "clientX")]
        client_x: f64,
        #[serde(rename = "clientY")]
        client_y: f64,
    },
}

impl PanelMessage {
    /// Decode a posted message; anything that is not exactly one of the known shapes is `None`
    pub fn from_js(data: wasm_bindgen::JsValue) -> Option<PanelMessage> {
        serde_wasm_bindgen::from_value(data).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1280.0,
        height: 800.0,
    };

    #[test]
    fn test_viewport_excludes_scrollbar() {
        let viewport = Viewport::from_layout((1265, 800), (1280.0, 800.0));
        assert_eq!(viewport, Viewport { width: 1265.0, height: 800.0 });

        // A right-anchored panel's left edge sits against the scrollbar
        let panel = open_panel(None, AnchorSide::Right);
        let geometry = panel.geometry().unwrap();
        assert_eq!(geometry.left(viewport), 1265.0 - EDGE_MARGIN - DEFAULT_WIDTH);
    }

    #[test]
    fn test_viewport_falls_back_to_window_size() {
        let viewport = Viewport::from_layout((0, 0), (1280.0, 720.0));
        assert_eq!(viewport, Viewport { width: 1280.0, height: 720.0 });
    }

    fn open_panel(saved: Option<&FloatingPanelState>, side: AnchorSide) -> FloatingPanel {
        let mut panel = FloatingPanel::new();
        panel.open(saved, side).unwrap();
        panel
    }

    #[test]
    fn test_open_without_saved_state_anchors_right() {
        let panel = open_panel(None, AnchorSide::Right);
        let geometry = panel.geometry().unwrap();

        assert_eq!(geometry.horizontal, Horizontal::Right(EDGE_MARGIN));
        assert_eq!(geometry.top, DEFAULT_TOP);
        assert_eq!(geometry.width, DEFAULT_WIDTH);
        assert_eq!(geometry.height, DEFAULT_HEIGHT);
        assert_eq!(geometry.left(VIEWPORT), 1280.0 - 20.0 - 380.0);
    }

    #[test]
    fn test_open_without_saved_state_anchors_left() {
        let panel = open_panel(None, AnchorSide::Left);
        assert_eq!(panel.geometry().unwrap().horizontal, Horizontal::Left(EDGE_MARGIN));
    }

    #[test]
    fn test_stored_left_beats_requested_side() {
        let saved = FloatingPanelState {
            position: AnchorSide::Right,
            left: Some("200px".to_string()),
            top: Some("64px".to_string()),
            width: Some("420px".to_string()),
            height: None,
        };

        let panel = open_panel(Some(&saved), AnchorSide::Right);
        let geometry = panel.geometry().unwrap();

        assert_eq!(geometry.horizontal, Horizontal::Left(200.0));
        assert_eq!(geometry.top, 64.0);
        assert_eq!(geometry.width, 420.0);
        assert_eq!(geometry.height, DEFAULT_HEIGHT);
    }

    #[test]
    fn test_open_is_idempotent() {
        let mut panel = open_panel(None, AnchorSide::Right);
        let before = panel.clone();

        assert_eq!(panel.open(None, AnchorSide::Left), None);
        assert_eq!(panel, before);
    }

    #[test]
    fn test_toggle_intent_follows_state() {
        let mut panel = FloatingPanel::new();
        assert_eq!(panel.toggle_intent(), ToggleIntent::Open);

        panel.open(None, AnchorSide::Left);
        assert_eq!(panel.toggle_intent(), ToggleIntent::Close);

        panel.close(VIEWPORT);
        assert_eq!(panel.toggle_intent(), ToggleIntent::Open);
    }

    #[test]
    fn test_close_persists_and_second_close_is_noop() {
        let mut panel = open_panel(None, AnchorSide::Left);

        let saved = panel.close(VIEWPORT).unwrap();

        assert_eq!(saved.left.as_deref(), Some("20px"));
        assert_eq!(saved.width.as_deref(), Some("380px"));
        assert!(!panel.is_open());
        assert_eq!(panel.close(VIEWPORT), None);
    }

    #[test]
    fn test_drag_converts_right_anchor_and_moves() {
        let mut panel = open_panel(None, AnchorSide::Right);
        let start_left = 1280.0 - 20.0 - 380.0;

        let geometry = panel.begin_drag(1000.0, 30.0, VIEWPORT).unwrap();
        assert_eq!(geometry.horizontal, Horizontal::Left(start_left));

        let geometry = panel.drag_to(700.0, 130.0, VIEWPORT).unwrap();
        assert_eq!(geometry.horizontal, Horizontal::Left(start_left - 300.0));
        assert_eq!(geometry.top, DEFAULT_TOP + 100.0);

        let saved = panel.end_drag(VIEWPORT).unwrap();
        assert_eq!(saved.left, Some(px(start_left - 300.0)));
        assert!(!panel.is_dragging());
    }

    #[test]
    fn test_dragged_position_survives_reopen() {
        let mut panel = open_panel(None, AnchorSide::Right);
        panel.begin_drag(500.0, 10.0, VIEWPORT);
        panel.drag_to(100.0, 10.0, VIEWPORT);
        panel.end_drag(VIEWPORT);
        let dragged_left = panel.geometry().unwrap().left(VIEWPORT);

        let saved = panel.close(VIEWPORT).unwrap();
        let reopened = open_panel(Some(&saved), AnchorSide::Right);

        assert_eq!(reopened.geometry().unwrap().horizontal, Horizontal::Left(dragged_left));
    }

    #[test]
    fn test_drag_clamps_to_viewport() {
        let mut panel = open_panel(None, AnchorSide::Left);
        panel.begin_drag(0.0, 0.0, VIEWPORT);

        let geometry = panel.drag_to(-5000.0, -5000.0, VIEWPORT).unwrap();
        assert_eq!(geometry.horizontal, Horizontal::Left(0.0));
        assert_eq!(geometry.top, 0.0);

        let geometry = panel.drag_to(5000.0, 5000.0, VIEWPORT).unwrap();
        assert_eq!(geometry.horizontal, Horizontal::Left(1280.0 - 380.0));
        assert_eq!(geometry.top, 800.0 - 560.0);
    }

    #[test]
    fn test_drag_clamp_in_small_viewport_prefers_bottom_right_bound() {
        let small = Viewport {
            width: 300.0,
            height: 500.0,
        };
        let mut panel = open_panel(None, AnchorSide::Left);
        panel.begin_drag(0.0, 0.0, small);

        let geometry = panel.drag_to(10.0, 10.0, small).unwrap();

        assert_eq!(geometry.horizontal, Horizontal::Left(300.0 - 380.0));
        assert_eq!(geometry.top, 500.0 - 560.0);
    }

    #[test]
    fn test_drag_without_begin_is_ignored() {
        let mut panel = open_panel(None, AnchorSide::Left);

        assert_eq!(panel.drag_to(10.0, 10.0, VIEWPORT), None);
        assert_eq!(panel.end_drag(VIEWPORT), None);
    }

    #[test]
    fn test_drag_on_closed_panel_is_ignored() {
        let mut panel = FloatingPanel::new();

        assert_eq!(panel.begin_drag(0.0, 0.0, VIEWPORT), None);
        assert!(!panel.in_drag_handle(10.0));
    }

    #[test]
    fn test_drag_handle_region() {
        let panel = open_panel(None, AnchorSide::Left);

        assert!(panel.in_drag_handle(0.0));
        assert!(panel.in_drag_handle(40.0));
        assert!(!panel.in_drag_handle(40.5));
        assert!(!panel.in_drag_handle(-1.0));
    }

    #[test]
    fn test_resize_updates_size_and_persists() {
        let mut panel = open_panel(None, AnchorSide::Right);

        let saved = panel.resized(500.0, 700.0, VIEWPORT).unwrap();

        assert_eq!(saved.width.as_deref(), Some("500px"));
        assert_eq!(saved.height.as_deref(), Some("700px"));
        // right-anchored: the right edge stays put while the left edge moves
        assert_eq!(saved.left, Some(px(1280.0 - 20.0 - 500.0)));
        assert_eq!(saved.position, AnchorSide::Right);
    }

    #[test]
    fn test_unparseable_saved_values_fall_back_to_defaults() {
        let saved = FloatingPanelState {
            position: AnchorSide::Left,
            left: Some("auto".to_string()),
            top: Some("10%".to_string()),
            width: None,
            height: None,
        };

        let panel = open_panel(Some(&saved), AnchorSide::Right);
        let geometry = panel.geometry().unwrap();

        assert_eq!(geometry.horizontal, Horizontal::Right(EDGE_MARGIN));
        assert_eq!(geometry.top, DEFAULT_TOP);
    }

    #[test]
    fn test_panel_message_shapes() {
        let close: PanelMessage = serde_json::from_str(r#"{"type": "close-panel"}"#).unwrap();
        assert_eq!(close, PanelMessage::ClosePanel);

        let drag: PanelMessage =
            serde_json::from_str(r#"{"type": "drag-start", "clientX": 12, "clientY": 34.5}"#).unwrap();
        assert_eq!(drag, PanelMessage::DragStart { client_x: 12.0, client_y: 34.5 });

        assert_eq!(
            serde_json::to_value(PanelMessage::ClosePanel).unwrap(),
            serde_json::json!({"type": "close-panel"})
        );
    }

    #[test]
    fn test_panel_message_rejects_unknown_shapes() {
        assert!(serde_json::from_str::<PanelMessage>(r#"{"type": "resize"}"#).is_err());
        assert!(serde_json::from_str::<PanelMessage>(r#"{"type": "drag-start"}"#).is_err());
        assert!(serde_json::from_str::<PanelMessage>(r#"{"kind": "close-panel"}"#).is_err());
        assert!(serde_json::from_str::<PanelMessage>(r#""close-panel""#).is_err());
    }
}
