/// User-facing feedback for tab actions
use crate::errors::HostError;

/// How long a toast stays visible (ms)
pub const TOAST_DURATION_MS: i32 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(message: &str) -> Notice {
        Notice {
            message: message.to_string(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(message: &str) -> Notice {
        Notice {
            message: message.to_string(),
            kind: NoticeKind::Error,
        }
    }
}

/// Per-row tab actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabAction {
    ReadingList,
    Bookmark,
    Close,
}

/// Toast for the outcome of a tab action
pub fn feedback(action: TabAction, outcome: &Result<(), HostError>) -> Notice {
    match (action, outcome) {
        (TabAction::ReadingList, Ok(())) => Notice::success("リーディングリストに追加しました"),
        (TabAction::ReadingList, Err(e)) if e.is_duplicate() => {
            Notice::error("既にリーディングリストに登録済みです")
        }
        (TabAction::ReadingList, Err(_)) => Notice::error("リーディングリストへの追加に失敗しました"),
        (TabAction::Bookmark, Ok(())) => Notice::success("ブックマークに追加しました"),
        (TabAction::Bookmark, Err(_)) => Notice::error("ブックマークへの追加に失敗しました"),
        (TabAction::Close, Ok(())) => Notice::success("タブを閉じました"),
        (TabAction::Close, Err(_)) => Notice::error("タブを閉じられませんでした"),
    }
}

/// Shown when the tab list could not be fetched
pub const LOAD_TABS_FAILED: &str = "タブを取得できませんでした";

/// Host requests that only report failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRequest {
    Activate,
    ToggleGroup,
    LoadTabs,
    OpenPage,
}

/// Toast for a rejected panel request
pub fn failure(request: PanelRequest, error: &HostError) -> Notice {
    match request {
        PanelRequest::Activate if error.is_missing_tab() => Notice::error("タブが見つかりません"),
        PanelRequest::Activate => Notice::error("タブを切り替えられませんでした"),
        PanelRequest::ToggleGroup => Notice::error("グループの開閉状態を保存できませんでした"),
        PanelRequest::LoadTabs => Notice::error(LOAD_TABS_FAILED),
        PanelRequest::OpenPage => Notice::error("ページを開けませんでした"),
    }
}
