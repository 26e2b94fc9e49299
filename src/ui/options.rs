/// Options page: display mode and the three display flags

use crate::host;
use crate::notice::TOAST_DURATION_MS;
use crate::storage::{DisplayMode, Settings};
use crate::ui::schedule;
use log::{info, warn};
use patternfly_yew::prelude::{Alert, AlertType, Spinner};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// One form change; every change saves the whole record
#[derive(Debug, Clone, Copy, PartialEq)]
enum SettingsEdit {
    DisplayMode(DisplayMode),
    AutoShowPanel(bool),
    CompactMode(bool),
    DarkMode(bool),
}

impl SettingsEdit {
    fn apply(self, settings: &Settings) -> Settings {
        let mut updated = settings.clone();
        match self {
            SettingsEdit::DisplayMode(mode) => updated.display_mode = mode,
            SettingsEdit::AutoShowPanel(value) => updated.auto_show_panel = value,
            SettingsEdit::CompactMode(value) => updated.compact_mode = value,
            SettingsEdit::DarkMode(value) => updated.dark_mode = value,
        }
        updated
    }
}

#[derive(Clone, PartialEq)]
enum PageState {
    Loading,
    Ready(Settings),
    Error(String),
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let state = use_state(|| PageState::Loading);
    let saved_visible = use_state(|| false);

    // Load (and migrate) settings on mount
    {
        let state = state.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match host::load_settings().await {
                    Ok(settings) => state.set(PageState::Ready(settings)),
                    Err(e) => state.set(PageState::Error(format!("Failed to load settings: {}", e))),
                }
            });
            || ()
        });
    }

    let on_edit = {
        let state = state.clone();
        let saved_visible = saved_visible.clone();
        Callback::from(move |edit: SettingsEdit| {
            let PageState::Ready(current) = &*state else {
                return;
            };
            let settings = edit.apply(current);
            state.set(PageState::Ready(settings.clone()));

            let saved_visible = saved_visible.clone();
            spawn_local(async move {
                match host::save_settings(&settings).await {
                    Ok(()) => {
                        info!("Settings saved: {:?}", edit);
                        saved_visible.set(true);
                        let hide = saved_visible.clone();
                        if let Err(e) = schedule(TOAST_DURATION_MS, move || hide.set(false)) {
                            warn!("Save message will not hide: {}", e);
                        }
                    }
                    Err(e) => warn!("Failed to save settings: {}", e),
                }
            });
        })
    };

    let settings = match &*state {
        PageState::Loading => {
            return html! {
                <div class="loading-text-center">
                    <Spinner />
                </div>
            };
        }
        PageState::Error(msg) => {
            return html! {
                <div class="options-page">
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {msg.clone()}
                    </Alert>
                </div>
            };
        }
        PageState::Ready(settings) => settings.clone(),
    };

    let radio = |mode: DisplayMode, label: &'static str, description: &'static str| {
        let on_edit = on_edit.clone();
        let onchange = Callback::from(move |_: Event| on_edit.emit(SettingsEdit::DisplayMode(mode)));
        html! {
            <label class="option-radio">
                <input type="radio" name="displayMode" checked={settings.display_mode.migrated() == mode} {onchange} />
                <span class="option-label">{label}</span>
                <span class="option-description">{description}</span>
            </label>
        }
    };

    let checkbox = |checked: bool, label: &'static str, edit: fn(bool) -> SettingsEdit| {
        let on_edit = on_edit.clone();
        let onchange = Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                on_edit.emit(edit(input.checked()));
            }
        });
        html! {
            <label class="option-checkbox">
                <input type="checkbox" {checked} {onchange} />
                <span class="option-label">{label}</span>
            </label>
        }
    };

    html! {
        <div class={classes!("options-page", settings.dark_mode.then_some("dark-mode"))}>
            <h1 class="options-title">{"TabFlow 設定"}</h1>

            <section class="options-section">
                <h2 class="options-heading">{"表示モード"}</h2>
                {radio(DisplayMode::SidePanel, "Side Panel", "ブラウザのサイドパネルに表示します")}
                {radio(DisplayMode::Floating, "Floating", "ページ上にドラッグ可能なパネルを表示します")}
            </section>

            <section class="options-section">
                <h2 class="options-heading">{"表示設定"}</h2>
                {checkbox(settings.auto_show_panel, "パネルを自動表示する", SettingsEdit::AutoShowPanel)}
                {checkbox(settings.compact_mode, "コンパクト表示", SettingsEdit::CompactMode)}
                {checkbox(settings.dark_mode, "ダークモード", SettingsEdit::DarkMode)}
            </section>

            if *saved_visible {
                <Alert r#type={AlertType::Success} title={"設定を保存しました"} inline={true}>
                </Alert>
            }
        </div>
    }
}
