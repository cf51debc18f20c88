//! TUIのイベントループ、入力処理、状態管理。

mod handlers;
mod render;

use anyhow::Result;
use crossterm::event::{self, Event};
use std::{path::PathBuf, time::Duration};
use tokio::sync::mpsc;

use crate::{
    config::Config,
    events::{Notification, UiState},
    form::FormState,
    input::InputBoxState,
    sections::{self, FormRow, SectionVisibility},
    shortcuts::Shortcuts,
    submission::{PendingSubmission, SubmissionController, SubmissionError, SubmissionState},
    tui::Tui,
    worker::{self, WorkerCmd, WorkerEvent},
};

use handlers::{handle_key, handle_paste, is_ctrl_c};
use render::draw;

/// 入力処理と描画で共有するアプリ状態。
pub struct App {
    /// 永続化された設定ファイルのパス。
    pub cfg_path: PathBuf,
    /// メモリ上の現在設定。
    pub cfg: Config,
    /// 選択位置やステータスなどUI固有の状態。
    pub ui: UiState,
    /// 編集中のジョブ設定（下書き）。
    pub form: FormState,
    /// フォームセクションの開閉状態。
    pub sections: SectionVisibility,
    /// 送信状態の管理。
    pub submission: SubmissionController,
    /// 直近に送信したリクエスト（プレビュー表示用）。
    pub last_submission: Option<PendingSubmission>,
    /// Workerへのコマンド送信チャネル。
    pub worker_tx: mpsc::Sender<WorkerCmd>,
    /// Workerからのイベント受信チャネル。
    pub worker_rx: mpsc::Receiver<WorkerEvent>,

    /// 設定画面で編集するAPIエンドポイント。
    pub endpoint: String,
    /// 設定画面で編集するAPIキー。
    pub api_key: String,

    /// 入力ボックスの状態（入力中はSome）。
    pub input_box: Option<InputBoxState>,

    /// ショートカットキー設定。
    pub shortcuts: Shortcuts,
}

impl App {
    /// 設定とWorkerチャネルからアプリ状態を組み立てる。
    pub fn new(
        cfg_path: PathBuf,
        cfg: Config,
        shortcuts: Shortcuts,
        worker_tx: mpsc::Sender<WorkerCmd>,
        worker_rx: mpsc::Receiver<WorkerEvent>,
    ) -> Self {
        Self {
            cfg_path,
            sections: SectionVisibility::from_config(&cfg.sections),
            endpoint: cfg.api.endpoint.clone(),
            api_key: cfg.api.api_key.clone(),
            cfg,
            ui: UiState::default(),
            form: FormState::new(),
            submission: SubmissionController::new(),
            last_submission: None,
            worker_tx,
            worker_rx,
            input_box: None,
            shortcuts,
        }
    }

    /// 現在表示されているフォーム行。
    pub fn rows(&self) -> Vec<FormRow> {
        sections::visible_rows(&self.sections)
    }

    /// カーソル位置の行。
    pub fn selected_row(&self) -> Option<FormRow> {
        self.rows().get(self.ui.selected).copied()
    }
}

/// ユーザーが終了するまでメインTUIループを回す。
pub async fn run_app(terminal: &mut Tui) -> Result<()> {
    // 設定ファイルを読み込む（初回はデフォルトを生成）。
    let cfg_path = PathBuf::from("config.toml");
    let cfg = Config::load_or_default(&cfg_path)?;

    // ショートカット設定を読み込む（無ければデフォルト）。
    let shortcuts_path = PathBuf::from("shortcut.toml");
    let shortcuts = Shortcuts::load_or_default(&shortcuts_path)?;

    // Worker通信用のコマンド/イベントチャネルを作る。
    let (tx_cmd, rx_cmd) = mpsc::channel::<WorkerCmd>(64);
    let (tx_ev, rx_ev) = mpsc::channel::<WorkerEvent>(256);

    // 初期設定スナップショットでWorkerを起動する。
    tokio::spawn(worker::run(rx_cmd, tx_ev, cfg.clone()));

    let mut app = App::new(cfg_path, cfg, shortcuts, tx_cmd, rx_ev);

    loop {
        // 現在の状態を描画する。
        terminal.draw(|f| draw(f, &app))?;

        // 入力処理の前にWorkerイベントを消化する。
        while let Ok(ev) = app.worker_rx.try_recv() {
            handle_worker_event(&mut app, ev);
        }

        // 生成中はスピナーを進める。
        if app.submission.is_busy() {
            app.ui.tick = app.ui.tick.wrapping_add(1);
        }

        // UIの応答性確保のため短いタイムアウトで入力をポーリングする。
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(k) => {
                    // どの画面でもCtrl+Cで終了できるようにする。
                    if is_ctrl_c(&k) {
                        break;
                    }
                    if handle_key(&mut app, k).await? {
                        break;
                    }
                }
                // 貼り付けはキー入力として解釈しない。
                Event::Paste(text) => handle_paste(&mut app, &text),
                _ => {}
            }
        }
    }
    Ok(())
}

/// WorkerイベントをUI状態へ反映する。
fn handle_worker_event(app: &mut App, ev: WorkerEvent) {
    match ev {
        WorkerEvent::SubmissionFinished { id, result } => {
            // 古い送信の結果は無視される。
            if !app.submission.resolve(id, result) {
                return;
            }
            match app.submission.state() {
                SubmissionState::Succeeded(url) => {
                    app.ui.push_log(format!("video ready: {url}"));
                    app.ui.status = "Video generated".into();
                    app.ui.notification = Some(Notification::generated());
                }
                SubmissionState::Failed(msg) => {
                    app.ui.push_log("generation failed");
                    app.ui.status = "Generation failed".into();
                    app.ui.notification = Some(Notification::failed(msg.clone()));
                }
                SubmissionState::Idle | SubmissionState::Submitting => {}
            }
        }
        WorkerEvent::Log(s) => {
            // ログを追加する。
            app.ui.push_log(s);
        }
        WorkerEvent::Error(s) => {
            // ステータスにエラーを表示する。
            app.ui.status = format!("Error: {s}");
        }
    }
}

/// 下書きを検証し、問題なければWorkerへ送信を依頼する。
pub async fn request_submit(app: &mut App) -> Result<()> {
    match app.submission.submit(&app.form) {
        Ok(Some(pending)) => {
            // 前回の通知とエラーを片付けてから送る。
            app.ui.error = None;
            app.ui.notification = None;
            app.ui.status = "Generating video...".into();
            app.last_submission = Some(pending.clone());
            let id = pending.id;
            // Workerが止まっていれば、この送信は失敗として確定させる。
            if let Err(e) = app.worker_tx.send(WorkerCmd::Submit(pending)).await {
                tracing::error!("worker unavailable: {e}");
                app.submission.resolve(
                    id,
                    Err(SubmissionError::Transport("worker stopped".into())),
                );
                if let SubmissionState::Failed(msg) = app.submission.state() {
                    app.ui.notification = Some(Notification::failed(msg.clone()));
                }
                app.ui.status = "Generation failed".into();
            }
        }
        Ok(None) => {
            // 生成中は再送しない。
            app.ui.status = "Already generating, please wait".into();
        }
        Err(e) => {
            // 最初の違反項目を表示してカーソルを合わせる。
            if let Some(field) = e.violations.first().map(|v| v.field()) {
                if let Some(section) = field.section() {
                    app.sections.set_open(section, true);
                }
                let rows = app.rows();
                if let Some(idx) = rows.iter().position(|r| *r == FormRow::Field(field)) {
                    app.ui.selected = idx;
                }
            }
            app.ui.error = Some(e.to_string());
        }
    }
    Ok(())
}

/// テスト用に、Workerを起動せずチャネルの反対側を返す。
#[cfg(test)]
fn test_app(cfg: Config) -> (App, mpsc::Receiver<WorkerCmd>, mpsc::Sender<WorkerEvent>) {
    let (tx_cmd, rx_cmd) = mpsc::channel(8);
    let (tx_ev, rx_ev) = mpsc::channel(8);
    let app = App::new(
        PathBuf::from("config.toml"),
        cfg,
        Shortcuts::default(),
        tx_cmd,
        rx_ev,
    );
    (app, rx_cmd, tx_ev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::PLACEHOLDER_VIDEO_URL,
        events::NotificationKind,
        form::{FieldId, FieldValue},
        jobs::JobConfiguration,
        sections::Section,
        submission::{FAILURE_MESSAGE, SubmissionError},
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    /// スクリプト行で入力ボックスを開き、文字列を打ち込んで確定する。
    async fn type_script(app: &mut App, text: &str) {
        app.ui.selected = 0;
        handle_key(app, key(KeyCode::Enter)).await.unwrap();
        assert!(app.input_box.is_some());
        for c in text.chars() {
            handle_key(app, ch(c)).await.unwrap();
        }
        handle_key(app, key(KeyCode::Enter)).await.unwrap();
        assert!(app.input_box.is_none());
    }

    #[tokio::test]
    async fn test_scenario_valid_submit_succeeds() {
        // 既定値のままスクリプトだけ入力して送信すると成功まで進む。
        let mut cfg = Config::default();
        cfg.simulation.delay_ms = 0;
        let (tx_cmd, rx_cmd) = mpsc::channel(8);
        let (tx_ev, rx_ev) = mpsc::channel(8);
        tokio::spawn(worker::run(rx_cmd, tx_ev, cfg.clone()));
        let mut app = App::new(
            PathBuf::from("config.toml"),
            cfg,
            Shortcuts::default(),
            tx_cmd,
            rx_ev,
        );

        type_script(&mut app, "Team builds from the back").await;
        handle_key(&mut app, ch('g')).await.unwrap();
        assert_eq!(app.submission.state(), &SubmissionState::Submitting);

        while !matches!(app.submission.state(), SubmissionState::Succeeded(_)) {
            let ev = app.worker_rx.recv().await.expect("worker alive");
            handle_worker_event(&mut app, ev);
        }
        assert_eq!(app.submission.result_url(), Some(PLACEHOLDER_VIDEO_URL));
        let note = app.ui.notification.clone().expect("notification");
        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.title, "Video Generated");

        let sent = app.last_submission.as_ref().expect("request kept");
        let expected = JobConfiguration {
            script: "Team builds from the back".into(),
            ..JobConfiguration::default()
        };
        assert_eq!(sent.request, expected);
    }

    #[tokio::test]
    async fn test_scenario_empty_script_blocks_submit() {
        // スクリプト未入力では送信されず、エラーが表示される。
        let (mut app, mut rx_cmd, _tx_ev) = test_app(Config::default());
        app.ui.selected = 3;

        handle_key(&mut app, ch('g')).await.unwrap();
        assert_eq!(app.submission.state(), &SubmissionState::Idle);
        assert_eq!(app.ui.error.as_deref(), Some("Script Required"));
        assert_eq!(app.ui.selected, 0);
        assert!(rx_cmd.try_recv().is_err());

        // 入力して有効になればエラーは消える。
        type_script(&mut app, "Press high").await;
        assert!(app.ui.error.is_none());
    }

    #[tokio::test]
    async fn test_scenario_rejection_keeps_draft_and_allows_retry() {
        // API失敗時は下書きが保持され、再送信できる。
        let (mut app, mut rx_cmd, _tx_ev) = test_app(Config::default());
        type_script(&mut app, "Low block shape").await;
        let draft_before = app.form.draft().clone();

        handle_key(&mut app, ch('g')).await.unwrap();
        let Some(WorkerCmd::Submit(p)) = rx_cmd.recv().await else {
            panic!("submit command expected");
        };
        handle_worker_event(
            &mut app,
            WorkerEvent::SubmissionFinished {
                id: p.id,
                result: Err(SubmissionError::Rejected {
                    status: 500,
                    message: "render farm down".into(),
                }),
            },
        );

        assert_eq!(
            app.submission.state(),
            &SubmissionState::Failed(FAILURE_MESSAGE.into())
        );
        assert_eq!(app.form.draft(), &draft_before);
        let note = app.ui.notification.clone().expect("notification");
        assert_eq!(note.kind, NotificationKind::Failure);
        assert_eq!(note.body, FAILURE_MESSAGE);

        handle_key(&mut app, ch('g')).await.unwrap();
        assert_eq!(app.submission.state(), &SubmissionState::Submitting);
        assert!(matches!(rx_cmd.recv().await, Some(WorkerCmd::Submit(_))));
        assert!(app.ui.notification.is_none());
    }

    #[tokio::test]
    async fn test_double_submit_sends_one_request() {
        // 生成中の再送信は無視される。
        let (mut app, mut rx_cmd, _tx_ev) = test_app(Config::default());
        type_script(&mut app, "Counter").await;
        handle_key(&mut app, ch('g')).await.unwrap();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
        )
        .await
        .unwrap();

        assert!(rx_cmd.try_recv().is_ok());
        assert!(rx_cmd.try_recv().is_err());
        assert_eq!(app.ui.status, "Already generating, please wait");
    }

    #[tokio::test]
    async fn test_stale_result_is_ignored() {
        // 送信と無関係な結果はUIを変えない。
        let (mut app, _rx_cmd, _tx_ev) = test_app(Config::default());
        handle_worker_event(
            &mut app,
            WorkerEvent::SubmissionFinished {
                id: uuid::Uuid::new_v4(),
                result: Ok("https://x.example/v.mp4".into()),
            },
        );
        assert_eq!(app.submission.state(), &SubmissionState::Idle);
        assert!(app.ui.notification.is_none());
    }

    #[tokio::test]
    async fn test_toggle_section_keeps_draft() {
        // 見出しでEnterを押すと開閉のみ行い、下書きは変わらない。
        let (mut app, _rx_cmd, _tx_ev) = test_app(Config::default());
        let before = app.form.draft().clone();
        let rows = app.rows().len();

        // Tactics見出しまで移動する。
        let target = app
            .rows()
            .iter()
            .position(|r| *r == FormRow::Header(Section::Tactics))
            .unwrap();
        for _ in 0..target {
            handle_key(&mut app, ch('j')).await.unwrap();
        }
        handle_key(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert!(app.sections.is_open(Section::Tactics));
        assert_eq!(app.rows().len(), rows + 3);
        assert_eq!(app.form.draft(), &before);
    }

    #[tokio::test]
    async fn test_adjust_clamps_voice_speed() {
        // 右キーを押し続けても上限で止まる。
        let (mut app, _rx_cmd, _tx_ev) = test_app(Config::default());
        app.ui.selected = app
            .rows()
            .iter()
            .position(|r| *r == FormRow::Field(FieldId::VoiceSpeed))
            .unwrap();
        for _ in 0..30 {
            handle_key(&mut app, ch('l')).await.unwrap();
        }
        assert_eq!(app.form.value(FieldId::VoiceSpeed), FieldValue::Number(2.0));
    }

    #[tokio::test]
    async fn test_selection_stays_in_bounds() {
        // 行数を超えてカーソルが動かないことを検証する。
        let (mut app, _rx_cmd, _tx_ev) = test_app(Config::default());
        for _ in 0..50 {
            handle_key(&mut app, key(KeyCode::Down)).await.unwrap();
        }
        assert_eq!(app.ui.selected, app.rows().len() - 1);
        handle_key(&mut app, key(KeyCode::Up)).await.unwrap();
        assert_eq!(app.ui.selected, app.rows().len() - 2);
    }

    #[tokio::test]
    async fn test_submit_with_stopped_worker_fails_cleanly() {
        // Workerが停止していても送信中のまま固まらず、再送信できる。
        let (mut app, rx_cmd, _tx_ev) = test_app(Config::default());
        drop(rx_cmd);
        type_script(&mut app, "Switch play").await;

        handle_key(&mut app, ch('g')).await.unwrap();
        assert_eq!(
            app.submission.state(),
            &SubmissionState::Failed(FAILURE_MESSAGE.into())
        );
        assert!(!app.submission.is_busy());
        assert_eq!(app.ui.status, "Generation failed");
        let note = app.ui.notification.clone().expect("notification");
        assert_eq!(note.kind, NotificationKind::Failure);

        // 再度送信しても「生成中」扱いにはならない。
        handle_key(&mut app, ch('g')).await.unwrap();
        assert_ne!(app.ui.status, "Already generating, please wait");
    }

    #[tokio::test]
    async fn test_worker_logs_are_capped() {
        let (mut app, _rx_cmd, _tx_ev) = test_app(Config::default());
        for i in 0..crate::events::LOG_CAPACITY + 5 {
            handle_worker_event(&mut app, WorkerEvent::Log(format!("log {i}")));
        }
        assert_eq!(app.ui.log.len(), crate::events::LOG_CAPACITY);
        assert_eq!(app.ui.log[0], "log 5");
    }
}
