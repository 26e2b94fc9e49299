/// Storage records for chrome.storage.sync and chrome.storage.local

use crate::tab_data::GroupKey;
use serde::{Deserialize, Deserializer, Serialize};

/// Local-area key holding the collapsed group keys
pub const COLLAPSED_GROUPS_KEY: &str = "collapsedGroups";

/// Local-area key holding the floating panel geometry
pub const FLOATING_PANEL_STATE_KEY: &str = "floatingPanelState";

/// Sync-area keys of [`Settings`]
pub const SETTINGS_KEYS: [&str; 4] = ["displayMode", "autoShowPanel", "compactMode", "darkMode"];

/// Set of collapsed bucket keys, stored as strings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CollapsedGroups(Vec<String>);

impl CollapsedGroups {
    pub fn new() -> Self {
        CollapsedGroups(Vec::new())
    }

    pub fn is_collapsed(&self, key: &GroupKey) -> bool {
        let key = key.storage_key();
        self.0.iter().any(|k| *k == key)
    }

    /// Add the key if absent, remove it otherwise; returns the new collapsed state
    pub fn toggle(&mut self, key: &GroupKey) -> bool {
        let key = key.storage_key();
        let original_len = self.0.len();
        self.0.retain(|k| *k != key);
        if self.0.len() < original_len {
            false
        } else {
            self.0.push(key);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for CollapsedGroups {
    /// Accepts numeric keys from older data and normalizes them to strings
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawKey {
            Text(String),
            Number(i64),
        }

        let raw: Option<Vec<RawKey>> = Option::deserialize(deserializer)?;
        let mut keys: Vec<String> = Vec::new();
        for key in raw.unwrap_or_default() {
            let key = match key {
                RawKey::Text(text) => text,
                RawKey::Number(number) => number.to_string(),
            };
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Ok(CollapsedGroups(keys))
    }
}

/// Where the toolbar button shows the tab list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    #[default]
    SidePanel,
    Floating,
    FloatingRight,
    FloatingLeft,
    /// Any value this version does not know; migrates to the default
    #[serde(other)]
    Unknown,
}

impl DisplayMode {
    /// Stored values that are rewritten on load
    pub fn is_legacy(self) -> bool {
        matches!(
            self,
            DisplayMode::FloatingRight | DisplayMode::FloatingLeft | DisplayMode::Unknown
        )
    }

    /// Legacy floating variants collapse into `Floating`, unknown values into the default
    pub fn migrated(self) -> DisplayMode {
        match self {
            DisplayMode::FloatingRight | DisplayMode::FloatingLeft => DisplayMode::Floating,
            DisplayMode::Unknown => DisplayMode::default(),
            mode => mode,
        }
    }

    pub fn uses_side_panel(self) -> bool {
        self == DisplayMode::SidePanel
    }
}

/// User preferences kept in the synced area
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub display_mode: DisplayMode,
    pub auto_show_panel: bool,
    pub compact_mode: bool,
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            display_mode: DisplayMode::SidePanel,
            auto_show_panel: true,
            compact_mode: false,
            dark_mode: false,
        }
    }
}

impl Settings {
    /// Rewrite legacy values in place; true when something changed and must be written back
    pub fn migrate(&mut self) -> bool {
        if self.display_mode.is_legacy() {
            self.display_mode = self.display_mode.migrated();
            true
        } else {
            false
        }
    }
}

/// Partial update written when only the display mode changes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayModeUpdate {
    pub display_mode: DisplayMode,
}

/// One entry of a storage change notification
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange<T> {
    pub new_value: Option<T>,
}

/// Sync-area change notification, restricted to the keys this extension reacts to
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncChanges {
    pub display_mode: Option<StorageChange<DisplayMode>>,
    pub compact_mode: Option<StorageChange<bool>>,
    pub dark_mode: Option<StorageChange<bool>>,
}

impl SyncChanges {
    pub fn display_mode(&self) -> Option<DisplayMode> {
        self.display_mode.as_ref().and_then(|c| c.new_value)
    }

    pub fn compact_mode(&self) -> Option<bool> {
        self.compact_mode.as_ref().and_then(|c| c.new_value)
    }

    pub fn dark_mode(&self) -> Option<bool> {
        self.dark_mode.as_ref().and_then(|c| c.new_value)
    }
}

/// Horizontal edge a new floating panel is anchored to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSide {
    Left,
    #[default]
    Right,
}

impl AnchorSide {
    pub fn parse(side: &str) -> AnchorSide {
        if side == "left" { AnchorSide::Left } else { AnchorSide::Right }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnchorSide::Left => "left",
            AnchorSide::Right => "right",
        }
    }
}

/// Last known floating panel geometry, pixel strings as CSS takes them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FloatingPanelState {
    #[serde(default)]
    pub position: AnchorSide,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

/// Local-area record as read back from the host
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalData {
    pub collapsed_groups: CollapsedGroups,
    pub floating_panel_state: Option<FloatingPanelState>,
}

/// Format a pixel length the way CSS accepts it ("12.5px", "20px")
pub fn px(value: f64) -> String {
    format!("{}px", value)
}

/// Parse a "<number>px" length; other units are not understood
pub fn parse_px(value: &str) -> Option<f64> {
    value
        .trim()
        .strip_suffix("px")
        .and_then(|number| number.trim().parse::<f64>().ok())
        .filter(|number| number.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_toggle_adds_then_removes() {
        let mut collapsed = CollapsedGroups::new();

        assert!(collapsed.toggle(&GroupKey::Group(5)));
        assert!(collapsed.is_collapsed(&GroupKey::Group(5)));
        assert!(!collapsed.toggle(&GroupKey::Group(5)));
        assert!(!collapsed.is_collapsed(&GroupKey::Group(5)));
        assert!(collapsed.is_empty());
    }

    #[test]
    fn test_collapsed_toggle_twice_is_involution() {
        let original: CollapsedGroups = serde_json::from_str(r#"["3", "ungrouped"]"#).unwrap();

        for key in [GroupKey::Group(3), GroupKey::Group(9), GroupKey::Ungrouped] {
            let mut collapsed = original.clone();
            collapsed.toggle(&key);
            collapsed.toggle(&key);
            assert_eq!(collapsed.is_collapsed(&key), original.is_collapsed(&key));
        }
    }

    #[test]
    fn test_collapsed_never_duplicates() {
        let mut collapsed = CollapsedGroups::new();
        collapsed.toggle(&GroupKey::Ungrouped);
        collapsed.toggle(&GroupKey::Group(1));

        assert_eq!(collapsed.len(), 2);
        assert!(collapsed.is_collapsed(&GroupKey::Ungrouped));
    }

    #[test]
    fn test_collapsed_normalizes_numeric_keys() {
        let collapsed: CollapsedGroups = serde_json::from_str(r#"[12, "12", "ungrouped"]"#).unwrap();

        assert_eq!(collapsed.len(), 2);
        assert!(collapsed.is_collapsed(&GroupKey::Group(12)));
        assert_eq!(serde_json::to_string(&collapsed).unwrap(), r#"["12","ungrouped"]"#);
    }

    #[test]
    fn test_collapsed_null_reads_as_empty() {
        let collapsed: CollapsedGroups = serde_json::from_str("null").unwrap();
        assert!(collapsed.is_empty());
    }

    #[test]
    fn test_settings_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.display_mode, DisplayMode::SidePanel);
        assert!(settings.auto_show_panel);
        assert!(!settings.compact_mode);
        assert!(!settings.dark_mode);
    }

    #[test]
    fn test_settings_migrate_legacy_modes() {
        for legacy in ["floatingRight", "floatingLeft"] {
            let json = format!(r#"{{"displayMode": "{}", "darkMode": true}}"#, legacy);
            let mut settings: Settings = serde_json::from_str(&json).unwrap();

            assert!(settings.migrate());
            assert_eq!(settings.display_mode, DisplayMode::Floating);
            assert!(settings.dark_mode);
            assert!(!settings.migrate());
        }
    }

    #[test]
    fn test_unknown_display_mode_keeps_other_settings() {
        let mut settings: Settings =
            serde_json::from_str(r#"{"displayMode": "popup", "darkMode": true}"#).unwrap();
        assert_eq!(settings.display_mode, DisplayMode::Unknown);
        assert!(settings.dark_mode);

        assert!(settings.migrate());
        assert_eq!(settings.display_mode, DisplayMode::SidePanel);
        assert!(settings.display_mode.uses_side_panel());
    }

    #[test]
    fn test_settings_serialize_camel_case() {
        let json = serde_json::to_value(Settings::default()).unwrap();

        assert_eq!(json["displayMode"], "sidePanel");
        assert_eq!(json["autoShowPanel"], true);
    }

    #[test]
    fn test_legacy_modes_do_not_use_side_panel() {
        assert!(DisplayMode::SidePanel.uses_side_panel());
        assert!(!DisplayMode::FloatingLeft.uses_side_panel());
        assert!(!DisplayMode::Floating.uses_side_panel());
    }

    #[test]
    fn test_sync_changes() {
        let json = r#"{
            "darkMode": {"oldValue": false, "newValue": true},
            "displayMode": {"oldValue": "sidePanel", "newValue": "floating"},
            "unrelated": {"newValue": 1}
        }"#;

        let changes: SyncChanges = serde_json::from_str(json).unwrap();

        assert_eq!(changes.dark_mode(), Some(true));
        assert_eq!(changes.display_mode(), Some(DisplayMode::Floating));
        assert_eq!(changes.compact_mode(), None);
    }

    #[test]
    fn test_sync_change_removed_key_has_no_new_value() {
        let changes: SyncChanges = serde_json::from_str(r#"{"compactMode": {"oldValue": true}}"#).unwrap();
        assert_eq!(changes.compact_mode(), None);
    }

    #[test]
    fn test_floating_panel_state_roundtrip_shape() {
        let json = r#"{"position": "right", "left": "812px", "top": "20px", "width": "380px", "height": "560px"}"#;
        let state: FloatingPanelState = serde_json::from_str(json).unwrap();

        assert_eq!(state.position, AnchorSide::Right);
        assert_eq!(state.left.as_deref().and_then(parse_px), Some(812.0));

        let partial: FloatingPanelState = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, FloatingPanelState::default());
        assert_eq!(serde_json::to_string(&partial).unwrap(), r#"{"position":"right"}"#);
    }

    #[test]
    fn test_local_data_defaults() {
        let data: LocalData = serde_json::from_str(r#"{"collapsedGroups": ["1"]}"#).unwrap();

        assert_eq!(data.collapsed_groups.len(), 1);
        assert_eq!(data.floating_panel_state, None);
    }

    #[test]
    fn test_anchor_side_parse() {
        assert_eq!(AnchorSide::parse("left"), AnchorSide::Left);
        assert_eq!(AnchorSide::parse("right"), AnchorSide::Right);
        assert_eq!(AnchorSide::parse("middle"), AnchorSide::Right);
        assert_eq!(AnchorSide::Left.as_str(), "left");
    }

    #[test]
    fn test_px_helpers() {
        assert_eq!(px(20.0), "20px");
        assert_eq!(px(12.5), "12.5px");
        assert_eq!(parse_px("380px"), Some(380.0));
        assert_eq!(parse_px(" 12.5px "), Some(12.5));
        assert_eq!(parse_px("50%"), None);
        assert_eq!(parse_px("px"), None);
    }
}
