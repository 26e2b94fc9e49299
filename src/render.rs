/// List view model: everything a surface needs to draw one render pass
///
/// Built from a fresh host snapshot on every trigger and replaced wholesale,
/// so overlapping passes converge on whichever finishes last.

use crate::domain::Favicon;
use crate::operations::{SearchQuery, TabBucket, classify_tabs, filter_tabs, inactive_label};
use crate::storage::CollapsedGroups;
use crate::tab_data::{GroupKey, Tab, TabGroup};

/// Host state pulled at the start of a render pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub groups: Vec<TabGroup>,
    pub tabs: Vec<Tab>,
    pub collapsed: CollapsedGroups,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabRow {
    pub id: i32,
    pub window_id: i32,
    pub title: String,
    pub url: String,
    pub active: bool,
    pub inactive: Option<String>,
    pub favicon: Favicon,
}

impl TabRow {
    pub fn new(tab: &Tab, now: f64) -> TabRow {
        TabRow {
            id: tab.id,
            window_id: tab.window_id,
            title: tab.display_title(),
            url: tab.url().to_string(),
            active: tab.active,
            inactive: inactive_label(tab.last_accessed, now),
            favicon: Favicon::for_tab(tab),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSection {
    pub key: GroupKey,
    pub title: String,
    pub color: &'static str,
    pub ungrouped: bool,
    pub collapsed: bool,
    pub count_label: String,
    /// Empty while collapsed
    pub rows: Vec<TabRow>,
}

impl GroupSection {
    /// Section for one bucket, `None` when an active search leaves it empty
    pub fn build(bucket: &TabBucket, collapsed: &CollapsedGroups, query: &SearchQuery, now: f64) -> Option<GroupSection> {
        let matched = filter_tabs(&bucket.tabs, query);
        if query.is_active() && matched.is_empty() {
            return None;
        }

        let count_label = if query.is_active() {
            format!("{}/{}個", matched.len(), bucket.tabs.len())
        } else {
            format!("{}個", bucket.tabs.len())
        };

        let is_collapsed = collapsed.is_collapsed(&bucket.key);
        let rows = if is_collapsed {
            Vec::new()
        } else {
            matched.iter().map(|tab| TabRow::new(tab, now)).collect()
        };

        Some(GroupSection {
            key: bucket.key.clone(),
            title: bucket.title(),
            color: bucket.color(),
            ungrouped: bucket.is_ungrouped(),
            collapsed: is_collapsed,
            count_label,
            rows,
        })
    }

    pub fn toggle_glyph(&self) -> &'static str {
        if self.collapsed { "▶" } else { "▼" }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListView {
    pub tab_count: usize,
    pub group_count: usize,
    pub sections: Vec<GroupSection>,
}

impl ListView {
    pub fn build(snapshot: &Snapshot, query: &SearchQuery, now: f64) -> ListView {
        let sections = classify_tabs(&snapshot.tabs, &snapshot.groups)
            .iter()
            .filter_map(|bucket| GroupSection::build(bucket, &snapshot.collapsed, query, now))
            .collect();

        ListView {
            tab_count: snapshot.tabs.len(),
            group_count: snapshot.groups.len(),
            sections,
        }
    }

    /// True iff no section was rendered: no tabs at all, or a search matched nothing anywhere
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::INACTIVE_THRESHOLD_MS;
    use crate::tab_data::{GroupColor, TAB_GROUP_ID_NONE};

    const NOW: f64 = 1_700_000_000_000.0;

    fn work_snapshot() -> Snapshot {
        Snapshot {
            groups: vec![TabGroup {
                id: 5,
                title: Some("Work".to_string()),
                color: GroupColor::Blue,
            }],
            tabs: vec![
                Tab::new(1, "https://a.com", "A", TAB_GROUP_ID_NONE),
                Tab::new(2, "https://b.com", "B", 5),
            ],
            collapsed: CollapsedGroups::new(),
        }
    }

    #[test]
    fn test_work_group_then_ungrouped() {
        let view = ListView::build(&work_snapshot(), &SearchQuery::default(), NOW);

        assert_eq!(view.sections.len(), 2);
        assert_eq!(view.sections[0].title, "Work");
        assert_eq!(view.sections[0].count_label, "1個");
        assert_eq!(view.sections[0].color, "#2563EB");
        assert_eq!(view.sections[1].title, "グループなし");
        assert_eq!(view.sections[1].count_label, "1個");
        assert!(view.sections[1].ungrouped);
        assert_eq!(view.tab_count, 2);
        assert_eq!(view.group_count, 1);
        assert!(!view.is_empty());
    }

    #[test]
    fn test_search_without_matches_shows_empty_state() {
        let view = ListView::build(&work_snapshot(), &SearchQuery::new("work"), NOW);

        assert!(view.sections.is_empty());
        assert!(view.is_empty());
    }

    #[test]
    fn test_search_suppresses_only_empty_sections() {
        let view = ListView::build(&work_snapshot(), &SearchQuery::new("b.com"), NOW);

        assert_eq!(view.sections.len(), 1);
        assert_eq!(view.sections[0].key, GroupKey::Group(5));
        assert_eq!(view.sections[0].count_label, "1/1個");
    }

    #[test]
    fn test_search_count_label_shows_matched_over_total() {
        let mut snapshot = work_snapshot();
        snapshot.tabs.push(Tab::new(3, "https://c.com", "Another", TAB_GROUP_ID_NONE));

        let view = ListView::build(&snapshot, &SearchQuery::new("a"), NOW);

        let ungrouped = view.sections.iter().find(|s| s.ungrouped).unwrap();
        assert_eq!(ungrouped.count_label, "2/2個");
        let narrowed = ListView::build(&snapshot, &SearchQuery::new("another"), NOW);
        assert_eq!(narrowed.sections.len(), 1);
        assert_eq!(narrowed.sections[0].count_label, "1/2個");
    }

    #[test]
    fn test_no_tabs_shows_empty_state() {
        let view = ListView::build(&Snapshot::default(), &SearchQuery::default(), NOW);
        assert!(view.is_empty());
    }

    #[test]
    fn test_collapsed_section_has_header_but_no_rows() {
        let mut snapshot = work_snapshot();
        snapshot.collapsed.toggle(&GroupKey::Group(5));

        let view = ListView::build(&snapshot, &SearchQuery::default(), NOW);

        assert!(view.sections[0].collapsed);
        assert!(view.sections[0].rows.is_empty());
        assert_eq!(view.sections[0].toggle_glyph(), "▶");
        assert_eq!(view.sections[0].count_label, "1個");
        assert_eq!(view.sections[1].rows.len(), 1);
        assert_eq!(view.sections[1].toggle_glyph(), "▼");
    }

    #[test]
    fn test_rows_carry_title_fallback_and_inactivity() {
        let mut snapshot = work_snapshot();
        snapshot.tabs[0].title = None;
        snapshot.tabs[0].last_accessed = Some(NOW - 2.0 * INACTIVE_THRESHOLD_MS);
        snapshot.tabs[1].last_accessed = Some(NOW - 1000.0);

        let view = ListView::build(&snapshot, &SearchQuery::default(), NOW);

        let row = &view.sections[1].rows[0];
        assert_eq!(row.title, "(無題)");
        assert_eq!(row.inactive.as_deref(), Some("2時間"));
        assert_eq!(row.favicon.badge.initials, "A");
        assert_eq!(view.sections[0].rows[0].inactive, None);
    }
}
