/// Reusable UI components

use crate::domain::Favicon;
use crate::notice::{Notice, NoticeKind, TOAST_DURATION_MS, TabAction};
use crate::render::{GroupSection, TabRow};
use crate::tab_data::GroupKey;
use crate::ui::schedule;
use log::warn;
use patternfly_yew::prelude::{Alert, AlertType};
use std::rc::Rc;
use uuid::Uuid;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FaviconProps {
    pub favicon: Favicon,
}

/// Host favicon, replaced by the initials badge when missing or broken
#[function_component(FaviconView)]
pub fn favicon_view(props: &FaviconProps) -> Html {
    let failed = use_state(|| false);

    {
        let failed = failed.clone();
        use_effect_with(props.favicon.image.clone(), move |_| {
            failed.set(false);
            || ()
        });
    }

    let badge = &props.favicon.badge;
    match (&props.favicon.image, *failed) {
        (Some(src), false) => {
            let onerror = {
                let failed = failed.clone();
                Callback::from(move |_: Event| failed.set(true))
            };
            html! {
                <div class="favicon-container">
                    <img class="favicon" alt="" src={src.clone()} {onerror} />
                </div>
            }
        }
        _ => html! {
            <div class="favicon-container">
                <div class="favicon-initials" style={format!("background-color: {};", badge.color)}>
                    {&badge.initials}
                </div>
            </div>
        },
    }
}

#[derive(Properties, PartialEq)]
pub struct TabRowProps {
    pub row: TabRow,
    pub on_activate: Callback<TabRow>,
    pub on_action: Callback<(TabAction, TabRow)>,
}

#[function_component(TabRowView)]
pub fn tab_row_view(props: &TabRowProps) -> Html {
    let row = &props.row;

    let onclick = {
        let on_activate = props.on_activate.clone();
        let row = row.clone();
        Callback::from(move |_: MouseEvent| on_activate.emit(row.clone()))
    };

    let action_button = |action: TabAction, class: &'static str, glyph: &'static str, label: &'static str| {
        let on_action = props.on_action.clone();
        let row = row.clone();
        let onclick = Callback::from(move |e: MouseEvent| {
            // Keep the row from activating the tab
            e.stop_propagation();
            on_action.emit((action, row.clone()));
        });
        html! {
            <button class={classes!("action-btn", class)} title={label} {onclick}>{glyph}</button>
        }
    };

    html! {
        <li class={classes!("tab-item", row.active.then_some("active"), row.inactive.is_some().then_some("inactive"))} {onclick}>
            <FaviconView favicon={row.favicon.clone()} />
            <div class="tab-info">
                <div class="tab-title-row">
                    <div class="tab-title">{&row.title}</div>
                    if let Some(label) = &row.inactive {
                        <span class="inactive-badge">{format!("💤 {}", label)}</span>
                    }
                </div>
                <div class="tab-url">{&row.url}</div>
            </div>
            <div class="tab-actions">
                {action_button(TabAction::ReadingList, "btn-reading", "📖", "リーディングリストに追加")}
                {action_button(TabAction::Bookmark, "btn-bookmark", "⭐", "ブックマークに追加")}
                {action_button(TabAction::Close, "btn-close", "✕", "このタブを閉じる")}
            </div>
        </li>
    }
}

#[derive(Properties, PartialEq)]
pub struct GroupSectionProps {
    pub section: GroupSection,
    pub on_toggle: Callback<GroupKey>,
    pub on_activate: Callback<TabRow>,
    pub on_action: Callback<(TabAction, TabRow)>,
}

/// One bucket: clickable header, then its rows unless collapsed
#[function_component(GroupSectionView)]
pub fn group_section_view(props: &GroupSectionProps) -> Html {
    let section = &props.section;

    let onclick = {
        let on_toggle = props.on_toggle.clone();
        let key = section.key.clone();
        Callback::from(move |_: MouseEvent| on_toggle.emit(key.clone()))
    };

    let border = if section.ungrouped {
        String::new()
    } else {
        format!("border-left-color: {};", section.color)
    };

    html! {
        <div class={classes!("group-section", section.ungrouped.then_some("ungrouped"), section.collapsed.then_some("collapsed"))} style={border}>
            <div class="group-header" {onclick}>
                <span class="group-toggle">{section.toggle_glyph()}</span>
                <span class="group-color-dot" style={format!("background-color: {};", section.color)}></span>
                <span class="group-name">{&section.title}</span>
                <span class="group-count">{&section.count_label}</span>
            </div>
            if !section.collapsed {
                <ul class="group-tabs">
                    {for section.rows.iter().map(|row| html! {
                        <TabRowView
                            key={row.id}
                            row={row.clone()}
                            on_activate={props.on_activate.clone()}
                            on_action={props.on_action.clone()}
                        />
                    })}
                </ul>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct EmptyMessageProps {
    pub message: AttrValue,
}

#[function_component(EmptyMessage)]
pub fn empty_message(props: &EmptyMessageProps) -> Html {
    html! {
        <div class="empty-state">
            <p class="empty-text">{props.message.clone()}</p>
        </div>
    }
}

// Toasts

#[derive(Debug, Clone, PartialEq)]
pub struct ToastEntry {
    pub id: Uuid,
    pub notice: Notice,
}

/// Visible toasts, oldest first
#[derive(Debug, Default, PartialEq)]
pub struct ToastList {
    pub entries: Vec<ToastEntry>,
}

pub enum ToastAction {
    Push(ToastEntry),
    Dismiss(Uuid),
}

impl Reducible for ToastList {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut entries = self.entries.clone();
        match action {
            ToastAction::Push(entry) => entries.push(entry),
            ToastAction::Dismiss(id) => entries.retain(|entry| entry.id != id),
        }
        Rc::new(ToastList { entries })
    }
}

/// Append a toast that removes itself after the toast duration
pub fn show_toast(toasts: &UseReducerDispatcher<ToastList>, notice: Notice) {
    let id = Uuid::new_v4();
    toasts.dispatch(ToastAction::Push(ToastEntry { id, notice }));

    let toasts = toasts.clone();
    if let Err(e) = schedule(TOAST_DURATION_MS, move || toasts.dispatch(ToastAction::Dismiss(id))) {
        warn!("Toast {} will not expire: {}", id, e);
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastRegionProps {
    pub entries: Vec<ToastEntry>,
}

#[function_component(ToastRegion)]
pub fn toast_region(props: &ToastRegionProps) -> Html {
    html! {
        <div class="toast-container">
            {for props.entries.iter().map(|entry| {
                let alert_type = match entry.notice.kind {
                    NoticeKind::Success => AlertType::Success,
                    NoticeKind::Error => AlertType::Danger,
                };
                html! {
                    <Alert key={entry.id.to_string()} r#type={alert_type} title={entry.notice.message.clone()} inline={true}>
                    </Alert>
                }
            })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> ToastEntry {
        ToastEntry {
            id: Uuid::new_v4(),
            notice: Notice::success(message),
        }
    }

    #[test]
    fn test_toast_list_push_keeps_order() {
        let list = Rc::new(ToastList::default());
        let list = list.reduce(ToastAction::Push(entry("first")));
        let list = list.reduce(ToastAction::Push(entry("second")));

        let messages: Vec<&str> = list.entries.iter().map(|e| e.notice.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn test_toast_list_dismiss_removes_only_that_toast() {
        let first = entry("first");
        let first_id = first.id;
        let list = Rc::new(ToastList::default())
            .reduce(ToastAction::Push(first))
            .reduce(ToastAction::Push(entry("second")));

        let list = list.reduce(ToastAction::Dismiss(first_id));

        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.entries[0].notice.message, "second");

        let list = list.reduce(ToastAction::Dismiss(first_id));
        assert_eq!(list.entries.len(), 1);
    }
}
