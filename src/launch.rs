/// Toolbar-click policy: side panel, injected floating panel, or popup window

use crate::storage::{AnchorSide, DisplayMode};
use regex::Regex;
use std::sync::LazyLock;

/// Schemes where the host refuses script injection
static RESTRICTED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(chrome|chrome-extension|edge|about|devtools):").expect("restricted URL pattern")
});

/// Side the floating panel is anchored to when launched from the toolbar
pub const LAUNCH_ANCHOR: AnchorSide = AnchorSide::Left;

/// Fixed-size popup used when the page cannot host the floating panel
pub const FALLBACK_PAGE: &str = "side-panel.html";
pub const FALLBACK_WIDTH: u32 = 420;
pub const FALLBACK_HEIGHT: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPlan {
    /// The host's own side panel handles the click
    Ignore,
    OpenPopupWindow,
    InjectFloatingPanel { tab_id: i32, side: AnchorSide },
}

/// Whether the page at `url` cannot host injected scripts; a missing URL counts as restricted
pub fn is_restricted_url(url: Option<&str>) -> bool {
    match url {
        Some(url) if !url.is_empty() => RESTRICTED_URL.is_match(url),
        _ => true,
    }
}

/// Decide what a toolbar click on tab `tab_id` showing `url` does
pub fn plan_launch(mode: DisplayMode, tab_id: Option<i32>, url: Option<&str>) -> LaunchPlan {
    if mode.migrated() != DisplayMode::Floating {
        return LaunchPlan::Ignore;
    }
    match tab_id {
        Some(tab_id) if !is_restricted_url(url) => LaunchPlan::InjectFloatingPanel {
            tab_id,
            side: LAUNCH_ANCHOR,
        },
        _ => LaunchPlan::OpenPopupWindow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_schemes() {
        assert!(is_restricted_url(Some("chrome://newtab/")));
        assert!(is_restricted_url(Some("chrome-extension://abc/side-panel.html")));
        assert!(is_restricted_url(Some("edge://settings")));
        assert!(is_restricted_url(Some("about:blank")));
        assert!(is_restricted_url(Some("devtools://devtools/bundled/inspector.html")));
        assert!(is_restricted_url(None));
        assert!(is_restricted_url(Some("")));
    }

    #[test]
    fn test_regular_pages_are_not_restricted() {
        assert!(!is_restricted_url(Some("https://example.com")));
        assert!(!is_restricted_url(Some("http://localhost:3000/chrome://")));
        assert!(!is_restricted_url(Some("file:///tmp/index.html")));
    }

    #[test]
    fn test_restricted_page_opens_popup_without_injecting() {
        let plan = plan_launch(DisplayMode::Floating, Some(3), Some("chrome://extensions"));
        assert_eq!(plan, LaunchPlan::OpenPopupWindow);
    }

    #[test]
    fn test_regular_page_injects_on_the_left() {
        let plan = plan_launch(DisplayMode::Floating, Some(3), Some("https://example.com"));
        assert_eq!(
            plan,
            LaunchPlan::InjectFloatingPanel {
                tab_id: 3,
                side: AnchorSide::Left
            }
        );
    }

    #[test]
    fn test_legacy_floating_modes_inject() {
        let plan = plan_launch(DisplayMode::FloatingRight, Some(1), Some("https://a.com"));
        assert!(matches!(plan, LaunchPlan::InjectFloatingPanel { .. }));
    }

    #[test]
    fn test_side_panel_mode_is_ignored() {
        let plan = plan_launch(DisplayMode::SidePanel, Some(1), Some("https://a.com"));
        assert_eq!(plan, LaunchPlan::Ignore);
    }

    #[test]
    fn test_missing_tab_id_falls_back_to_popup() {
        let plan = plan_launch(DisplayMode::Floating, None, Some("https://a.com"));
        assert_eq!(plan, LaunchPlan::OpenPopupWindow);
    }
}
