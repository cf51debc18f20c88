//! 画面遷移用のUI状態と画面種別。

/// プレビュー用に保持するログ行の上限。
pub const LOG_CAPACITY: usize = 200;

/// TUIで現在表示中の画面。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    /// 生成フォームとプレビューの画面。
    Form,
    /// ジョブAPI設定の編集画面。
    Settings,
}

/// 通知の種類（色分けに使う）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

/// 閉じられるまで表示し続けるポップアップ通知。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

impl Notification {
    /// 生成成功時の通知。
    pub fn generated() -> Self {
        Self {
            kind: NotificationKind::Success,
            title: "Video Generated".into(),
            body: "Your football analysis video is ready to view!".into(),
        }
    }

    /// 生成失敗時の通知。
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            title: "Generation Failed".into(),
            body: message.into(),
        }
    }
}

/// 描画側と共有するUI状態。
#[derive(Clone, Debug)]
pub struct UiState {
    /// 現在の画面。
    pub screen: Screen,
    /// フォームパネルの選択行。
    pub selected: usize,
    /// プレビューパネルに表示するログ。
    pub log: Vec<String>,
    /// 画面下部のステータス文言。
    pub status: String,
    /// スクリプト欄の下に出す検証エラー。
    pub error: Option<String>,
    /// 表示中の通知。
    pub notification: Option<Notification>,
    /// スピナー表示用のフレームカウンタ。
    pub tick: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            screen: Screen::Form,
            selected: 0,
            log: vec![],
            status: "Ready".into(),
            error: None,
            notification: None,
            tick: 0,
        }
    }
}

impl UiState {
    /// ログを1行追加し、上限を超えた古い行を捨てる。
    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }
}
