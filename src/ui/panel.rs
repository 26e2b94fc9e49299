/// Tab list surface shared by the side panel, the floating panel and the popup

use crate::errors::HostError;
use crate::floating::PanelMessage;
use crate::host;
use crate::notice::{LOAD_TABS_FAILED, Notice, PanelRequest, TabAction, failure, feedback};
use crate::operations::{SearchQuery, sort_reading_list};
use crate::render::{ListView, Snapshot, TabRow};
use crate::storage::{DisplayMode, SyncChanges};
use crate::tab_data::{GroupKey, ReadingListEntry};
use crate::ui::components::{EmptyMessage, GroupSectionView, ToastList, ToastRegion, show_toast};
use crate::ui::{now_ms, schedule};
use log::{debug, warn};
use patternfly_yew::prelude::Spinner;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlInputElement};
use yew::prelude::*;

const BOOKMARKS_MANAGER_URL: &str = "chrome://bookmarks/";

/// Delay between switching to side-panel mode and closing the floating panel (ms)
const MODE_SWITCH_CLOSE_DELAY_MS: i32 = 800;

const MODE_CHOICES: [(DisplayMode, &str); 2] = [
    (DisplayMode::SidePanel, "Side Panel"),
    (DisplayMode::Floating, "Floating"),
];

/// Which parts of the panel a surface shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSet {
    pub search: bool,
    pub mode_switcher: bool,
    /// Reading list overlay and bookmarks manager link
    pub navigation: bool,
    /// Tab and group counters; otherwise a single tab badge
    pub stats: bool,
    /// Hosted in the page overlay's iframe: close button and drag handle talk to the page
    pub embedded: bool,
}

impl FeatureSet {
    pub const SIDE_PANEL: FeatureSet = FeatureSet {
        search: true,
        mode_switcher: true,
        navigation: true,
        stats: true,
        embedded: false,
    };

    pub const FLOATING: FeatureSet = FeatureSet {
        embedded: true,
        ..FeatureSet::SIDE_PANEL
    };

    pub const POPUP: FeatureSet = FeatureSet {
        search: false,
        mode_switcher: false,
        navigation: false,
        stats: false,
        embedded: false,
    };
}

/// Bumped on every event that needs a fresh render pass
#[derive(Debug, Default, PartialEq)]
struct RenderTrigger {
    generation: u32,
}

impl Reducible for RenderTrigger {
    type Action = ();

    fn reduce(self: Rc<Self>, _: ()) -> Rc<Self> {
        Rc::new(RenderTrigger {
            generation: self.generation.wrapping_add(1),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ReadingListState {
    Loading,
    Loaded(Vec<ReadingListEntry>),
    Failed(String),
}

/// Send a message to the page hosting this panel's iframe
fn post_to_host_page(message: PanelMessage) -> Result<(), HostError> {
    let window = web_sys::window().ok_or_else(|| HostError::Unavailable("window".to_string()))?;
    let parent = window
        .parent()
        .map_err(HostError::from_js)?
        .ok_or_else(|| HostError::Unavailable("parent frame".to_string()))?;
    let data = serde_wasm_bindgen::to_value(&message).map_err(HostError::decode)?;
    parent.post_message(&data, "*").map_err(HostError::from_js)
}

async fn run_tab_action(action: TabAction, row: &TabRow) -> Result<(), HostError> {
    match action {
        TabAction::ReadingList => host::add_to_reading_list(&row.url, &row.title).await,
        TabAction::Bookmark => host::add_bookmark(&row.url, &row.title).await,
        TabAction::Close => host::close_tab(row.id).await,
    }
}

fn mode_switch_notice(mode: DisplayMode) -> Notice {
    if mode.uses_side_panel() {
        Notice::success("Side Panel モードに切り替えました")
    } else {
        Notice::success("表示モードを変更しました")
    }
}

fn empty_text(query: &SearchQuery) -> &'static str {
    if query.is_active() {
        "一致するタブがありません"
    } else {
        "タブがありません"
    }
}

#[derive(Properties, PartialEq)]
pub struct TabPanelProps {
    pub features: FeatureSet,
}

#[function_component(TabPanel)]
pub fn tab_panel(props: &TabPanelProps) -> Html {
    let features = props.features;
    let trigger = use_reducer(RenderTrigger::default);
    let snapshot = use_state(|| None::<Snapshot>);
    let load_failed = use_state(|| false);
    let search_text = use_state(String::new);
    let compact = use_state(|| false);
    let dark = use_state(|| false);
    let mode_menu = use_state(|| None::<DisplayMode>);
    let reading_list = use_state(|| None::<ReadingListState>);
    let toasts = use_reducer(ToastList::default);

    // Render pass: groups, tabs and collapse state are re-fetched every time
    {
        let snapshot = snapshot.clone();
        let load_failed = load_failed.clone();
        let toasts = toasts.dispatcher();
        use_effect_with(trigger.generation, move |generation| {
            let generation = *generation;
            spawn_local(async move {
                match host::fetch_snapshot().await {
                    Ok(fresh) => {
                        debug!(
                            "Render pass {}: {} tabs in {} groups",
                            generation,
                            fresh.tabs.len(),
                            fresh.groups.len()
                        );
                        load_failed.set(false);
                        snapshot.set(Some(fresh));
                    }
                    Err(e) => {
                        warn!("Render pass {} failed: {}", generation, e);
                        load_failed.set(true);
                        show_toast(&toasts, failure(PanelRequest::LoadTabs, &e));
                    }
                }
            });
            || ()
        });
    }

    // Display settings on load, then host notifications until unmount
    {
        let trigger = trigger.dispatcher();
        let compact = compact.clone();
        let dark = dark.clone();

        use_effect_with((), move |_| {
            {
                let compact = compact.clone();
                let dark = dark.clone();
                spawn_local(async move {
                    match host::load_settings().await {
                        Ok(settings) => {
                            compact.set(settings.compact_mode);
                            dark.set(settings.dark_mode);
                        }
                        Err(e) => warn!("Using default display settings: {}", e),
                    }
                });
            }

            let on_tabs = Closure::<dyn Fn()>::new(move || trigger.dispatch(()));
            let unsubscribe_tabs = host::subscribe_tab_events(on_tabs.as_ref().unchecked_ref());

            let on_storage = Closure::<dyn Fn(JsValue, String)>::new(move |changes: JsValue, area: String| {
                if area != "sync" {
                    return;
                }
                match serde_wasm_bindgen::from_value::<SyncChanges>(changes) {
                    Ok(changes) => {
                        if let Some(value) = changes.compact_mode() {
                            compact.set(value);
                        }
                        if let Some(value) = changes.dark_mode() {
                            dark.set(value);
                        }
                    }
                    Err(e) => warn!("Ignoring unreadable settings change: {}", e),
                }
            });
            let unsubscribe_storage = host::subscribe_storage_changes(on_storage.as_ref().unchecked_ref());

            move || {
                for unsubscribe in [unsubscribe_tabs, unsubscribe_storage] {
                    if let Err(e) = unsubscribe.call0(&JsValue::NULL) {
                        warn!("Failed to remove host listener: {:?}", e);
                    }
                }
                drop(on_tabs);
                drop(on_storage);
            }
        });
    }

    let on_toggle = {
        let trigger = trigger.dispatcher();
        let toasts = toasts.dispatcher();
        Callback::from(move |key: GroupKey| {
            let trigger = trigger.clone();
            let toasts = toasts.clone();
            spawn_local(async move {
                if let Err(e) = host::toggle_collapsed(&key).await {
                    warn!("Could not toggle group {}: {}", key, e);
                    show_toast(&toasts, failure(PanelRequest::ToggleGroup, &e));
                }
                trigger.dispatch(());
            });
        })
    };

    let on_activate = {
        let trigger = trigger.dispatcher();
        let toasts = toasts.dispatcher();
        Callback::from(move |row: TabRow| {
            let trigger = trigger.clone();
            let toasts = toasts.clone();
            spawn_local(async move {
                if let Err(e) = host::activate_tab(row.id, row.window_id).await {
                    warn!("Could not switch to tab {}: {}", row.id, e);
                    show_toast(&toasts, failure(PanelRequest::Activate, &e));
                    trigger.dispatch(());
                }
            });
        })
    };

    let on_action = {
        let toasts = toasts.dispatcher();
        Callback::from(move |(action, row): (TabAction, TabRow)| {
            let toasts = toasts.clone();
            spawn_local(async move {
                let outcome = run_tab_action(action, &row).await;
                if let Err(e) = &outcome {
                    warn!("{:?} on tab {} failed: {}", action, row.id, e);
                }
                show_toast(&toasts, feedback(action, &outcome));
            });
        })
    };

    let on_search_input = {
        let search_text = search_text.clone();
        let trigger = trigger.dispatcher();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                search_text.set(input.value());
                trigger.dispatch(());
            }
        })
    };

    let on_search_clear = {
        let search_text = search_text.clone();
        let trigger = trigger.dispatcher();
        Callback::from(move |_: MouseEvent| {
            search_text.set(String::new());
            trigger.dispatch(());
        })
    };

    let on_close = Callback::from(|_: MouseEvent| {
        if let Err(e) = post_to_host_page(PanelMessage::ClosePanel) {
            warn!("Could not ask the page to close the panel: {}", e);
        }
    });

    let on_drag_start = Callback::from(move |e: MouseEvent| {
        if !features.embedded {
            return;
        }
        let on_control = e
            .target_dyn_into::<Element>()
            .and_then(|target| target.closest(".header-actions").ok().flatten())
            .is_some();
        if on_control {
            return;
        }
        let message = PanelMessage::DragStart {
            client_x: f64::from(e.screen_x()),
            client_y: f64::from(e.screen_y()),
        };
        if let Err(e) = post_to_host_page(message) {
            warn!("Could not start dragging the panel: {}", e);
        }
    });

    let on_mode_menu = {
        let mode_menu = mode_menu.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            if mode_menu.is_some() {
                mode_menu.set(None);
                return;
            }
            let mode_menu = mode_menu.clone();
            spawn_local(async move {
                match host::load_settings().await {
                    Ok(settings) => mode_menu.set(Some(settings.display_mode.migrated())),
                    Err(e) => warn!("Could not read the display mode: {}", e),
                }
            });
        })
    };

    let on_mode_menu_close = {
        let mode_menu = mode_menu.clone();
        Callback::from(move |_: ()| mode_menu.set(None))
    };

    let on_open_reading_list = {
        let reading_list = reading_list.clone();
        Callback::from(move |_: MouseEvent| {
            reading_list.set(Some(ReadingListState::Loading));
            let reading_list = reading_list.clone();
            spawn_local(async move {
                let state = match host::query_reading_list().await {
                    Ok(entries) => ReadingListState::Loaded(sort_reading_list(&entries)),
                    Err(e) => {
                        warn!("Could not load the reading list: {}", e);
                        ReadingListState::Failed(e.to_string())
                    }
                };
                reading_list.set(Some(state));
            });
        })
    };

    let on_reading_list_back = {
        let reading_list = reading_list.clone();
        Callback::from(move |_: MouseEvent| reading_list.set(None))
    };

    let on_open_bookmarks = {
        let toasts = toasts.dispatcher();
        Callback::from(move |_: MouseEvent| {
            let toasts = toasts.clone();
            spawn_local(async move {
                if let Err(e) = host::open_tab(BOOKMARKS_MANAGER_URL).await {
                    warn!("Could not open the bookmarks manager: {}", e);
                    show_toast(&toasts, failure(PanelRequest::OpenPage, &e));
                }
            });
        })
    };

    let query = SearchQuery::new(&search_text);
    let view = (*snapshot)
        .as_ref()
        .map(|snapshot| ListView::build(snapshot, &query, now_ms()));
    let (tab_count, group_count) = view
        .as_ref()
        .map(|view| (view.tab_count, view.group_count))
        .unwrap_or((0, 0));

    let list = match &view {
        None if *load_failed => html! {
            <EmptyMessage message={LOAD_TABS_FAILED} />
        },
        None => html! {
            <div class="loading-text-center">
                <Spinner />
            </div>
        },
        Some(view) if view.is_empty() => html! {
            <EmptyMessage message={empty_text(&query)} />
        },
        Some(view) => html! {
            <div class="tab-list">
                {for view.sections.iter().map(|section| html! {
                    <GroupSectionView
                        key={section.key.storage_key()}
                        section={section.clone()}
                        on_toggle={on_toggle.clone()}
                        on_activate={on_activate.clone()}
                        on_action={on_action.clone()}
                    />
                })}
            </div>
        },
    };

    html! {
        <div class={classes!("tabflow-panel", (*compact).then_some("compact"), (*dark).then_some("dark-mode"))}>
            <header class={classes!("panel-header", features.embedded.then_some("drag-handle"))} onmousedown={on_drag_start}>
                <div class="header-title">
                    <span class="app-name">{"TabFlow"}</span>
                    if features.stats {
                        <span class="header-stat">{format!("{} タブ", tab_count)}</span>
                        <span class="header-stat">{format!("{} グループ", group_count)}</span>
                    } else {
                        <span class="tab-badge">{tab_count}</span>
                    }
                </div>
                <div class="header-actions">
                    if features.navigation {
                        <button class="header-btn" title="リーディングリスト" onclick={on_open_reading_list}>{"📚"}</button>
                        <button class="header-btn" title="ブックマーク" onclick={on_open_bookmarks}>{"🔖"}</button>
                    }
                    if features.mode_switcher {
                        <button class="header-btn" title="表示モード" onclick={on_mode_menu}>{"⚙"}</button>
                    }
                    if features.embedded {
                        <button class="header-btn" title="閉じる" onclick={on_close}>{"✕"}</button>
                    }
                </div>
            </header>

            if let Some(current) = *mode_menu {
                <ModeMenu
                    current={current}
                    embedded={features.embedded}
                    on_close={on_mode_menu_close}
                    toasts={toasts.dispatcher()}
                />
            }

            if features.search {
                <div class="search-box">
                    <input
                        type="text"
                        class="search-input"
                        placeholder="タブを検索..."
                        value={(*search_text).clone()}
                        oninput={on_search_input}
                    />
                    if query.is_active() {
                        <button class="search-clear" title="クリア" onclick={on_search_clear}>{"✕"}</button>
                    }
                </div>
            }

            if let Some(state) = (*reading_list).clone() {
                <ReadingListView state={state} on_back={on_reading_list_back} toasts={toasts.dispatcher()} />
            } else {
                {list}
            }

            <ToastRegion entries={toasts.entries.clone()} />
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ModeMenuProps {
    current: DisplayMode,
    embedded: bool,
    on_close: Callback<()>,
    toasts: UseReducerDispatcher<ToastList>,
}

/// Display-mode dropdown; clicking the backdrop closes it
#[function_component(ModeMenu)]
fn mode_menu(props: &ModeMenuProps) -> Html {
    let select = |mode: DisplayMode| {
        let on_close = props.on_close.clone();
        let toasts = props.toasts.clone();
        let embedded = props.embedded;
        Callback::from(move |_: MouseEvent| {
            let on_close = on_close.clone();
            let toasts = toasts.clone();
            spawn_local(async move {
                let saved = host::set_display_mode(mode).await;
                on_close.emit(());
                if let Err(e) = saved {
                    warn!("Could not save display mode {:?}: {}", mode, e);
                    show_toast(&toasts, Notice::error("表示モードの変更に失敗しました"));
                    return;
                }
                show_toast(&toasts, mode_switch_notice(mode));
                if embedded && mode.uses_side_panel() {
                    let close_later = schedule(MODE_SWITCH_CLOSE_DELAY_MS, || {
                        if let Err(e) = post_to_host_page(PanelMessage::ClosePanel) {
                            warn!("Could not ask the page to close the panel: {}", e);
                        }
                    });
                    if let Err(e) = close_later {
                        warn!("Could not schedule panel close: {}", e);
                    }
                }
            });
        })
    };

    let on_backdrop = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    let on_options = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| {
            host::open_options_page();
            on_close.emit(());
        })
    };

    html! {
        <>
            <div class="mode-dropdown-overlay" onclick={on_backdrop}></div>
            <div class="mode-dropdown">
                {for MODE_CHOICES.iter().map(|&(mode, label)| {
                    let active = mode == props.current;
                    html! {
                        <div class={classes!("mode-dropdown-item", active.then_some("active"))} onclick={select(mode)}>
                            <span class="mode-check">{if active { "✓" } else { "" }}</span>
                            <span class="mode-label">{label}</span>
                        </div>
                    }
                })}
                <div class="mode-dropdown-divider"></div>
                <div class="mode-dropdown-item" onclick={on_options}>
                    <span class="mode-check"></span>
                    <span class="mode-label">{"設定を開く"}</span>
                </div>
            </div>
        </>
    }
}

#[derive(Properties, PartialEq)]
struct ReadingListProps {
    state: ReadingListState,
    on_back: Callback<MouseEvent>,
    toasts: UseReducerDispatcher<ToastList>,
}

#[function_component(ReadingListView)]
fn reading_list_view(props: &ReadingListProps) -> Html {
    let body = match &props.state {
        ReadingListState::Loading => html! {
            <div class="loading-text-center">
                <Spinner />
            </div>
        },
        ReadingListState::Failed(message) => html! {
            <EmptyMessage message={format!("リーディングリストを取得できませんでした: {}", message)} />
        },
        ReadingListState::Loaded(entries) if entries.is_empty() => html! {
            <EmptyMessage message="リーディングリストは空です" />
        },
        ReadingListState::Loaded(entries) => html! {
            <ul class="reading-list">
                {for entries.iter().map(|entry| {
                    let url = entry.url.clone();
                    let toasts = props.toasts.clone();
                    let onclick = Callback::from(move |_: MouseEvent| {
                        let url = url.clone();
                        let toasts = toasts.clone();
                        spawn_local(async move {
                            if let Err(e) = host::open_tab(&url).await {
                                warn!("Could not open {}: {}", url, e);
                                show_toast(&toasts, failure(PanelRequest::OpenPage, &e));
                            }
                        });
                    });
                    html! {
                        <li key={entry.url.clone()} class={classes!("reading-item", entry.has_been_read.then_some("read"))} {onclick}>
                            <div class="reading-info">
                                <div class="reading-title">{entry.display_title()}</div>
                                <div class="reading-url">{&entry.url}</div>
                            </div>
                            <span class="reading-status">{entry.status_label()}</span>
                        </li>
                    }
                })}
            </ul>
        },
    };

    html! {
        <div class="reading-list-view">
            <div class="reading-list-header">
                <button class="header-btn" title="戻る" onclick={props.on_back.clone()}>{"←"}</button>
                <span class="reading-list-title">{"リーディングリスト"}</span>
            </div>
            {body}
        </div>
    }
}
