/// Service-worker runtime: side panel behavior and toolbar clicks

use crate::errors::HostError;
use crate::host;
use crate::launch::{LaunchPlan, plan_launch};
use crate::storage::{DisplayMode, SyncChanges};
use log::{error, info, warn};
use serde::Deserialize;
use std::future::Future;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// The part of the clicked tab the dispatcher looks at
#[derive(Debug, Clone, Default, Deserialize)]
struct ClickedTab {
    #[serde(default)]
    id: Option<i32>,
    #[serde(default)]
    url: Option<String>,
}

/// Let the host open its side panel on toolbar click iff `mode` is side-panel
pub async fn apply_display_mode(mode: DisplayMode) -> Result<(), HostError> {
    let side_panel = mode.migrated().uses_side_panel();
    host::set_side_panel_behavior(side_panel).await?;
    info!("Display mode {:?} applied (side panel on click: {})", mode, side_panel);
    Ok(())
}

async fn sync_panel_behavior() -> Result<(), HostError> {
    let settings = host::load_settings().await?;
    apply_display_mode(settings.display_mode).await
}

/// Toolbar click while the host is not handling it: inject the floating panel
/// or fall back to the popup window
pub async fn handle_action_click(tab: JsValue) -> Result<(), HostError> {
    let tab: ClickedTab = serde_wasm_bindgen::from_value(tab).map_err(HostError::decode)?;
    let settings = host::load_settings().await?;

    match plan_launch(settings.display_mode, tab.id, tab.url.as_deref()) {
        LaunchPlan::Ignore => Ok(()),
        LaunchPlan::OpenPopupWindow => {
            info!("Page cannot host the floating panel, opening popup window");
            host::open_fallback_window().await
        }
        LaunchPlan::InjectFloatingPanel { tab_id, side } => {
            if let Err(e) = host::inject_floating_panel(tab_id, side).await {
                warn!("Injection into tab {} failed, opening popup window: {}", tab_id, e);
                host::open_fallback_window().await?;
            }
            Ok(())
        }
    }
}

async fn report<F>(task: F)
where
    F: Future<Output = Result<(), HostError>>,
{
    if let Err(e) = task.await {
        error!("Background task failed: {}", e);
    }
}

fn on_sync_change(changes: JsValue, area: String) {
    if area != "sync" {
        return;
    }
    match serde_wasm_bindgen::from_value::<SyncChanges>(changes) {
        Ok(changes) => {
            if let Some(mode) = changes.display_mode() {
                spawn_local(report(apply_display_mode(mode)));
            }
        }
        Err(e) => warn!("Ignoring unreadable settings change: {}", e),
    }
}

/// Register the worker's listeners; they live as long as the worker does
pub fn start() {
    info!("Background worker starting");
    spawn_local(report(sync_panel_behavior()));

    let on_installed = Closure::<dyn Fn()>::new(|| spawn_local(report(sync_panel_behavior())));
    host::subscribe_installed(on_installed.as_ref().unchecked_ref());
    on_installed.forget();

    let on_storage = Closure::<dyn Fn(JsValue, String)>::new(on_sync_change);
    host::subscribe_storage_changes(on_storage.as_ref().unchecked_ref());
    on_storage.forget();

    let on_click = Closure::<dyn Fn(JsValue)>::new(|tab: JsValue| spawn_local(report(handle_action_click(tab))));
    host::subscribe_action_clicks(on_click.as_ref().unchecked_ref());
    on_click.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clicked_tab_tolerates_missing_fields() {
        let tab: ClickedTab = serde_json::from_str(r#"{"id": 7, "windowId": 1}"#).unwrap();
        assert_eq!(tab.id, Some(7));
        assert_eq!(tab.url, None);

        let tab: ClickedTab = serde_json::from_str("{}").unwrap();
        assert_eq!(tab.id, None);
    }
}
