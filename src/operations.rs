/// Tab operations: grouping, search filtering, inactivity labels

use crate::tab_data::{GroupColor, GroupKey, ReadingListEntry, Tab, TabGroup};
use std::collections::HashMap;

/// Tabs untouched for longer than this (ms) get an inactivity badge
pub const INACTIVE_THRESHOLD_MS: f64 = 60.0 * 60.0 * 1000.0;

const MINUTE_MS: f64 = 60_000.0;

/// One non-empty bucket of the classification
#[derive(Debug, Clone, PartialEq)]
pub struct TabBucket {
    pub key: GroupKey,
    /// Host metadata; `None` for the ungrouped bucket
    pub group: Option<TabGroup>,
    pub tabs: Vec<Tab>,
}

impl TabBucket {
    pub fn is_ungrouped(&self) -> bool {
        self.group.is_none()
    }

    pub fn title(&self) -> String {
        match &self.group {
            Some(group) => group.display_title(),
            None => "グループなし".to_string(),
        }
    }

    pub fn color(&self) -> &'static str {
        match &self.group {
            Some(group) => group.color.hex(),
            None => GroupColor::Grey.hex(),
        }
    }
}

/// Partition tabs into buckets: host group order first, ungrouped last
///
/// Tab order inside a bucket is the host-reported order. Buckets without
/// tabs are omitted, including groups the host reports but no tab points at.
/// A tab pointing at a group missing from `groups` lands in the ungrouped bucket.
pub fn classify_tabs(tabs: &[Tab], groups: &[TabGroup]) -> Vec<TabBucket> {
    let mut grouped: HashMap<i32, Vec<Tab>> =
        groups.iter().map(|group| (group.id, Vec::new())).collect();
    let mut ungrouped = Vec::new();

    for tab in tabs {
        match tab.group_key() {
            GroupKey::Group(id) if grouped.contains_key(&id) => {
                grouped.entry(id).or_default().push(tab.clone())
            }
            _ => ungrouped.push(tab.clone()),
        }
    }

    let mut buckets: Vec<TabBucket> = groups
        .iter()
        .filter_map(|group| {
            grouped
                .remove(&group.id)
                .filter(|tabs| !tabs.is_empty())
                .map(|tabs| TabBucket {
                    key: GroupKey::Group(group.id),
                    group: Some(group.clone()),
                    tabs,
                })
        })
        .collect();

    if !ungrouped.is_empty() {
        buckets.push(TabBucket {
            key: GroupKey::Ungrouped,
            group: None,
            tabs: ungrouped,
        });
    }

    buckets
}

/// Normalized search text: trimmed and lower-cased, empty when inactive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(raw: &str) -> SearchQuery {
        SearchQuery(raw.trim().to_lowercase())
    }

    pub fn is_active(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, tab: &Tab) -> bool {
        let title = tab.title.as_deref().unwrap_or_default().to_lowercase();
        let url = tab.url().to_lowercase();
        title.contains(&self.0) || url.contains(&self.0)
    }
}

/// Tabs whose title or URL contains the query; identity for an empty query
pub fn filter_tabs(tabs: &[Tab], query: &SearchQuery) -> Vec<Tab> {
    if !query.is_active() {
        return tabs.to_vec();
    }

    tabs.iter().filter(|tab| query.matches(tab)).cloned().collect()
}

/// Elapsed-time badge for a tab, `None` while it is not yet inactive
///
/// Floor division at each tier: minutes below an hour, hours below a day,
/// days beyond.
pub fn inactive_label(last_accessed: Option<f64>, now: f64) -> Option<String> {
    let elapsed = now - last_accessed?;
    if elapsed <= INACTIVE_THRESHOLD_MS {
        return None;
    }

    let minutes = (elapsed / MINUTE_MS).floor() as u64;
    if minutes < 60 {
        return Some(format!("{}分", minutes));
    }
    let hours = minutes / 60;
    if hours < 24 {
        return Some(format!("{}時間", hours));
    }
    Some(format!("{}日", hours / 24))
}

/// Unread entries first, otherwise keeping host order
pub fn sort_reading_list(entries: &[ReadingListEntry]) -> Vec<ReadingListEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|entry| entry.has_been_read);
    sorted
}
