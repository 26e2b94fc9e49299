/// Data structures for TabFlow
use serde::{Deserialize, Serialize};
use std::fmt;

/// Group id the host reports for tabs outside any group
pub const TAB_GROUP_ID_NONE: i32 = -1;

/// Storage key of the synthetic bucket holding ungrouped tabs
pub const UNGROUPED_KEY: &str = "ungrouped";

/// Snapshot of a browser tab as reported by the host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub window_id: i32,
    #[serde(default = "no_group")]
    pub group_id: i32,
    #[serde(default)]
    pub last_accessed: Option<f64>,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
}

fn no_group() -> i32 {
    TAB_GROUP_ID_NONE
}

impl Tab {
    pub fn new(id: i32, url: &str, title: &str, group_id: i32) -> Tab {
        Tab {
            id,
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            active: false,
            window_id: 1,
            group_id,
            last_accessed: None,
            fav_icon_url: None,
        }
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    /// Title shown to the user; "(無題)" when the host reports none
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => "(無題)".to_string(),
        }
    }

    pub fn group_key(&self) -> GroupKey {
        GroupKey::from_group_id(self.group_id)
    }
}

/// Host-native tab group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabGroup {
    pub id: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub color: GroupColor,
}

impl TabGroup {
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => "無名グループ".to_string(),
        }
    }
}

/// Fixed group palette; anything the host adds later maps to grey
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    #[default]
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    #[serde(other)]
    Unknown,
}

impl GroupColor {
    pub fn hex(self) -> &'static str {
        match self {
            GroupColor::Grey | GroupColor::Unknown => "#9CA3AF",
            GroupColor::Blue => "#2563EB",
            GroupColor::Red => "#EF4444",
            GroupColor::Yellow => "#F59E0B",
            GroupColor::Green => "#10B981",
            GroupColor::Pink => "#EC4899",
            GroupColor::Purple => "#8B5CF6",
            GroupColor::Cyan => "#06B6D4",
        }
    }
}

/// Identity of a rendered bucket, string-normalized for persistence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Group(i32),
    Ungrouped,
}

impl GroupKey {
    pub fn from_group_id(group_id: i32) -> GroupKey {
        if group_id == TAB_GROUP_ID_NONE {
            GroupKey::Ungrouped
        } else {
            GroupKey::Group(group_id)
        }
    }

    pub fn storage_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Group(id) => write!(f, "{}", id),
            GroupKey::Ungrouped => f.write_str(UNGROUPED_KEY),
        }
    }
}

/// Entry of the host reading list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListEntry {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub has_been_read: bool,
}

impl ReadingListEntry {
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => "(無題)".to_string(),
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.has_been_read { "既読" } else { "未読" }
    }
}
