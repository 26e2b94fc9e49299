/// Typed access to the browser host (tabs, groups, storage, reading list,
/// bookmarks, windows, scripting) through the `host.js` bridge

use crate::errors::HostError;
use crate::launch::{FALLBACK_HEIGHT, FALLBACK_PAGE, FALLBACK_WIDTH};
use crate::render::Snapshot;
use crate::storage::{
    AnchorSide, COLLAPSED_GROUPS_KEY, CollapsedGroups, DisplayMode, DisplayModeUpdate,
    FLOATING_PANEL_STATE_KEY, FloatingPanelState, LocalData, SETTINGS_KEYS, Settings,
};
use crate::tab_data::{GroupKey, ReadingListEntry, Tab, TabGroup};
use futures_util::future::try_join3;
use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/host.js")]
extern "C" {
    #[wasm_bindgen(catch, js_name = storageGet)]
    async fn storage_get(area: &str, keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = storageSet)]
    async fn storage_set(area: &str, items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = queryTabs)]
    async fn query_tabs_js() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = queryTabGroups)]
    async fn query_tab_groups_js() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = activateTab)]
    async fn activate_tab_js(tab_id: i32, window_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = removeTab)]
    async fn remove_tab_js(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = createTab)]
    async fn create_tab_js(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = addReadingListEntry)]
    async fn add_reading_list_entry_js(url: &str, title: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = queryReadingList)]
    async fn query_reading_list_js() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = createBookmark)]
    async fn create_bookmark_js(url: &str, title: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = openPopupWindow)]
    async fn open_popup_window_js(page: &str, width: u32, height: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = injectFloatingPanel)]
    async fn inject_floating_panel_js(tab_id: i32, side: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = setPanelBehavior)]
    async fn set_panel_behavior_js(open_panel_on_action_click: bool) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = openOptionsPage)]
    pub fn open_options_page();

    #[wasm_bindgen(js_name = extensionUrl)]
    pub fn extension_url(path: &str) -> String;

    #[wasm_bindgen(js_name = extensionOrigin)]
    pub fn extension_origin() -> String;

    /// `callback()` on tab created/removed/updated/activated and group updates
    #[wasm_bindgen(js_name = subscribeTabEvents)]
    pub fn subscribe_tab_events(callback: &js_sys::Function) -> js_sys::Function;

    /// `callback(changes, areaName)` on every storage change
    #[wasm_bindgen(js_name = subscribeStorageChanges)]
    pub fn subscribe_storage_changes(callback: &js_sys::Function) -> js_sys::Function;

    /// `callback(tab)` on toolbar icon clicks
    #[wasm_bindgen(js_name = subscribeActionClicks)]
    pub fn subscribe_action_clicks(callback: &js_sys::Function) -> js_sys::Function;

    #[wasm_bindgen(js_name = subscribeInstalled)]
    pub fn subscribe_installed(callback: &js_sys::Function) -> js_sys::Function;
}

/// The two key-value scopes of the settings store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Sync,
    Local,
}

impl StorageArea {
    pub fn name(self) -> &'static str {
        match self {
            StorageArea::Sync => "sync",
            StorageArea::Local => "local",
        }
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, HostError> {
    serde_wasm_bindgen::to_value(value).map_err(HostError::decode)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, HostError> {
    serde_wasm_bindgen::from_value(value).map_err(HostError::decode)
}

async fn read<T: DeserializeOwned>(area: StorageArea, keys: &[&str]) -> Result<T, HostError> {
    let result = storage_get(area.name(), to_js(keys)?)
        .await
        .map_err(HostError::from_js)?;
    from_js(result)
}

async fn write<T: Serialize>(area: StorageArea, items: &T) -> Result<(), HostError> {
    storage_set(area.name(), to_js(items)?)
        .await
        .map_err(HostError::from_js)
}

// Collapse state

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollapsedGroupsRecord<'a> {
    collapsed_groups: &'a CollapsedGroups,
}

pub async fn load_collapsed_groups() -> Result<CollapsedGroups, HostError> {
    let data: LocalData = read(StorageArea::Local, &[COLLAPSED_GROUPS_KEY]).await?;
    Ok(data.collapsed_groups)
}

pub async fn save_collapsed_groups(collapsed: &CollapsedGroups) -> Result<(), HostError> {
    write(StorageArea::Local, &CollapsedGroupsRecord { collapsed_groups: collapsed }).await
}

/// Read-modify-write of the collapsed set; returns whether `key` is now collapsed
pub async fn toggle_collapsed(key: &GroupKey) -> Result<bool, HostError> {
    let mut collapsed = load_collapsed_groups().await?;
    let now_collapsed = collapsed.toggle(key);
    save_collapsed_groups(&collapsed).await?;
    debug!("Group {} collapsed: {}", key, now_collapsed);
    Ok(now_collapsed)
}

// Floating panel geometry

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FloatingPanelRecord<'a> {
    floating_panel_state: &'a FloatingPanelState,
}

pub async fn load_panel_state() -> Result<Option<FloatingPanelState>, HostError> {
    let data: LocalData = read(StorageArea::Local, &[FLOATING_PANEL_STATE_KEY]).await?;
    Ok(data.floating_panel_state)
}

pub async fn save_panel_state(state: &FloatingPanelState) -> Result<(), HostError> {
    debug!("Saving floating panel state: {:?}", state);
    write(StorageArea::Local, &FloatingPanelRecord { floating_panel_state: state }).await
}

// Settings

/// Read settings, migrating legacy display modes and writing the migration back
pub async fn load_settings() -> Result<Settings, HostError> {
    let mut settings: Settings = read(StorageArea::Sync, &SETTINGS_KEYS).await?;
    if settings.migrate() {
        info!("Migrating legacy display mode to {:?}", settings.display_mode);
        set_display_mode(settings.display_mode).await?;
    }
    Ok(settings)
}

pub async fn save_settings(settings: &Settings) -> Result<(), HostError> {
    write(StorageArea::Sync, settings).await
}

pub async fn set_display_mode(display_mode: DisplayMode) -> Result<(), HostError> {
    write(StorageArea::Sync, &DisplayModeUpdate { display_mode }).await
}

// Tabs and groups

pub async fn query_tabs() -> Result<Vec<Tab>, HostError> {
    let tabs_js = query_tabs_js().await.map_err(HostError::from_js)?;
    from_js(tabs_js)
}

pub async fn query_groups() -> Result<Vec<TabGroup>, HostError> {
    let groups_js = query_tab_groups_js().await.map_err(HostError::from_js)?;
    from_js(groups_js)
}

/// Groups, tabs and collapse state, fetched in parallel
pub async fn fetch_snapshot() -> Result<Snapshot, HostError> {
    let (groups, tabs, collapsed) =
        try_join3(query_groups(), query_tabs(), load_collapsed_groups()).await?;
    Ok(Snapshot { groups, tabs, collapsed })
}

/// Make the tab active and focus its window
pub async fn activate_tab(tab_id: i32, window_id: i32) -> Result<(), HostError> {
    activate_tab_js(tab_id, window_id).await.map_err(HostError::from_js)
}

pub async fn close_tab(tab_id: i32) -> Result<(), HostError> {
    remove_tab_js(tab_id).await.map_err(HostError::from_js)
}

pub async fn open_tab(url: &str) -> Result<(), HostError> {
    create_tab_js(url).await.map_err(HostError::from_js)
}

// Reading list and bookmarks

/// Fails with [`HostError::Duplicate`] when the URL is already on the list
pub async fn add_to_reading_list(url: &str, title: &str) -> Result<(), HostError> {
    add_reading_list_entry_js(url, title).await.map_err(HostError::from_js)
}

pub async fn query_reading_list() -> Result<Vec<ReadingListEntry>, HostError> {
    let entries_js = query_reading_list_js().await.map_err(HostError::from_js)?;
    from_js(entries_js)
}

pub async fn add_bookmark(url: &str, title: &str) -> Result<(), HostError> {
    create_bookmark_js(url, title).await.map_err(HostError::from_js)
}

// Windows, scripting, side panel

pub async fn open_fallback_window() -> Result<(), HostError> {
    open_popup_window_js(FALLBACK_PAGE, FALLBACK_WIDTH, FALLBACK_HEIGHT)
        .await
        .map_err(HostError::from_js)
}

/// Inject the content-script bootstrap into the tab and toggle its floating panel
pub async fn inject_floating_panel(tab_id: i32, side: AnchorSide) -> Result<(), HostError> {
    inject_floating_panel_js(tab_id, side.as_str())
        .await
        .map_err(HostError::from_js)
}

pub async fn set_side_panel_behavior(open_panel_on_action_click: bool) -> Result<(), HostError> {
    set_panel_behavior_js(open_panel_on_action_click)
        .await
        .map_err(HostError::from_js)
}
