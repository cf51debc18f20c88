//! キー入力ハンドラー関数。

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    events::Screen,
    form::{FieldId, FieldKind, FieldValue},
    input::{InputBoxState, InputCallbackId},
    sections::FormRow,
    shortcuts,
    worker::WorkerCmd,
};

use super::{App, request_submit};

/// キー入力を1件処理し、終了すべきならtrueを返す。
pub async fn handle_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 入力ボックスが開いていれば最優先で処理する。
    if app.input_box.is_some() {
        return handle_input_box_key(app, k);
    }

    // 画面ごとのハンドラへ委譲する。
    match app.ui.screen {
        Screen::Form => handle_form_key(app, k).await,
        Screen::Settings => handle_settings_key(app, k).await,
    }
}

/// Ctrl+Cかどうかを判定する。
pub fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c')
}

/// フォーム画面のキー処理。
async fn handle_form_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = &app.shortcuts.form;

    // 通知が出ている間は閉じる操作を優先する。
    if app.ui.notification.is_some() && shortcuts::matches_shortcut(&k, &sc.dismiss) {
        app.ui.notification = None;
        return Ok(false);
    }

    if shortcuts::matches_shortcut(&k, &sc.quit) {
        return Ok(true);
    } else if shortcuts::matches_shortcut(&k, &sc.settings) {
        // 設定画面へ遷移し、編集バッファを更新する。
        reload_settings_buffers(app);
        app.ui.screen = Screen::Settings;
        app.ui.status = "Settings".into();
    } else if shortcuts::matches_shortcut(&k, &sc.submit) {
        request_submit(app).await?;
    } else if shortcuts::matches_shortcut(&k, &sc.down) {
        // 次の行へ移動する。
        if app.ui.selected + 1 < app.rows().len() {
            app.ui.selected += 1;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.up) {
        // 前の行へ移動する。
        app.ui.selected = app.ui.selected.saturating_sub(1);
    } else if shortcuts::matches_shortcut(&k, &sc.increase) {
        adjust_selected(app, 1);
    } else if shortcuts::matches_shortcut(&k, &sc.decrease) {
        adjust_selected(app, -1);
    } else if shortcuts::matches_shortcut(&k, &sc.activate) {
        activate_selected(app);
    } else if shortcuts::matches_shortcut(&k, &sc.open_player) {
        open_player(app);
    } else if shortcuts::matches_shortcut(&k, &sc.reset) {
        // 下書きを既定値へ戻す。送信中のリクエストには影響しない。
        app.form.reset();
        app.ui.error = None;
        app.ui.status = "Form reset".into();
    } else if shortcuts::matches_shortcut(&k, &sc.dismiss) {
        app.ui.error = None;
    }

    Ok(false)
}

/// 選択中の項目を増減する（数値は刻み幅、選択肢は巡回、フラグは反転）。
fn adjust_selected(app: &mut App, delta: i32) {
    let Some(FormRow::Field(field)) = app.selected_row() else {
        return;
    };
    if let Err(e) = app.form.adjust(field, delta) {
        tracing::warn!("adjust {} failed: {e}", field.key());
        app.ui.status = format!("Error: {e}");
    }
}

/// 見出しは開閉、テキストは入力ボックス、それ以外は次の値へ進める。
fn activate_selected(app: &mut App) {
    match app.selected_row() {
        Some(FormRow::Header(section)) => {
            app.sections.toggle(section);
            // 閉じた結果カーソルが範囲外になった場合に備える。
            let last = app.rows().len().saturating_sub(1);
            app.ui.selected = app.ui.selected.min(last);
        }
        Some(FormRow::Field(field)) => match field.kind() {
            FieldKind::Text => {
                let FieldValue::Text(value) = app.form.value(field) else {
                    return;
                };
                // 入力例があればプロンプトに添える。
                let prompt = match field.placeholder() {
                    Some(hint) => format!("{}: {hint}", field.label()),
                    None => format!("{}:", field.label()),
                };
                app.input_box = Some(match field {
                    FieldId::Script => {
                        InputBoxState::new(prompt, &value, InputCallbackId::Script).multiline()
                    }
                    _ => InputBoxState::new(prompt, &value, InputCallbackId::HighlightPlayer),
                });
            }
            FieldKind::Choice | FieldKind::Flag => adjust_selected(app, 1),
            FieldKind::Number { .. } => {}
        },
        None => {}
    }
}

/// 生成済み動画をシステムのプレーヤー（ブラウザ）で開く。
fn open_player(app: &mut App) {
    let Some(url) = app.submission.result_url() else {
        app.ui.status = "No video yet".into();
        return;
    };
    match webbrowser::open(url) {
        Ok(()) => {
            tracing::info!("opened player: {url}");
            app.ui.status = format!("Opened {url}");
        }
        Err(e) => {
            tracing::error!("failed to open player: {e}");
            app.ui.status = format!("Error: could not open player: {e}");
        }
    }
}

/// 設定画面のキー処理。
async fn handle_settings_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 設定画面のショートカットを参照する。
    let sc = &app.shortcuts.settings;

    if shortcuts::matches_shortcut(&k, &sc.cancel) {
        // 変更を破棄してフォーム画面へ戻る。
        reload_settings_buffers(app);
        app.ui.screen = Screen::Form;
        app.ui.status = "Ready".into();
    } else if shortcuts::matches_shortcut(&k, &sc.save) {
        // 編集バッファを設定へ反映する。
        app.cfg.api.endpoint = app.endpoint.trim().to_string();
        app.cfg.api.api_key = app.api_key.trim().to_string();
        // 設定ファイルを保存する。
        app.cfg.save(&app.cfg_path)?;
        tracing::info!("settings saved to {}", app.cfg_path.display());

        // Workerにも設定更新を通知する。
        app.worker_tx
            .send(WorkerCmd::SaveSettings(app.cfg.clone()))
            .await?;
        app.ui.screen = Screen::Form;
        app.ui.status = "Saved settings".into();
    } else if shortcuts::matches_shortcut(&k, &sc.endpoint) {
        app.input_box = Some(InputBoxState::new(
            "Job API endpoint (empty = simulated):",
            &app.endpoint,
            InputCallbackId::SettingsEndpoint,
        ));
    } else if shortcuts::matches_shortcut(&k, &sc.api_key) {
        app.input_box = Some(InputBoxState::new(
            "API key:",
            &app.api_key,
            InputCallbackId::SettingsApiKey,
        ));
    }

    Ok(false)
}

/// 貼り付けられた文字列を開いている入力ボックスへ流し込む。
///
/// 入力ボックスが閉じているときはショートカットとして解釈せずに捨てる。
pub fn handle_paste(app: &mut App, text: &str) {
    match &mut app.input_box {
        Some(input_state) => input_state.insert_str(text),
        None => {
            tracing::debug!("ignored paste of {} bytes", text.len());
            app.ui.status = "Paste ignored: open a text field first".into();
        }
    }
}

/// 入力ボックスのキー処理。
fn handle_input_box_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 入力ボックスが無ければ何もしない。
    let Some(input_state) = &mut app.input_box else {
        return Ok(false);
    };

    // 入力ボックス用ショートカットを参照する。
    let sc = &app.shortcuts.input_box;

    // 入力ボックス中でもCtrl+Cで終了できるようにする。
    if is_ctrl_c(&k) {
        return Ok(true);
    }

    if shortcuts::matches_shortcut(&k, &sc.confirm) {
        // 入力ボックスを閉じる前に値とコールバック種別を保存する。
        let value = input_state.value.clone();
        let callback_id = input_state.callback_id.clone();
        app.input_box = None;

        // コールバック種別に応じて値を反映する。
        apply_input_callback(app, callback_id, value)?;
    } else if shortcuts::matches_shortcut(&k, &sc.newline) {
        // 単一行の入力ボックスでは無視される。
        input_state.insert_char('\n');
    } else if shortcuts::matches_shortcut(&k, &sc.cancel) {
        // 入力を破棄して入力ボックスを閉じる。
        app.input_box = None;
    } else if shortcuts::matches_shortcut(&k, &sc.backspace) {
        input_state.backspace();
    } else if shortcuts::matches_shortcut(&k, &sc.delete) {
        input_state.delete();
    } else if shortcuts::matches_shortcut(&k, &sc.left) {
        input_state.move_left();
    } else if shortcuts::matches_shortcut(&k, &sc.right) {
        input_state.move_right();
    } else if shortcuts::matches_shortcut(&k, &sc.home) {
        input_state.move_home();
    } else if shortcuts::matches_shortcut(&k, &sc.end) {
        input_state.move_end();
    } else if shortcuts::matches_shortcut(&k, &sc.clear_line) {
        input_state.clear_line();
    } else if let KeyCode::Char(c) = k.code
        && !k.modifiers.contains(KeyModifiers::CONTROL)
    {
        // コントロールキーでない場合のみ挿入する。
        input_state.insert_char(c);
    }

    Ok(false)
}

/// 入力ボックスのコールバックを適用する。
fn apply_input_callback(app: &mut App, callback_id: InputCallbackId, value: String) -> Result<()> {
    match callback_id {
        InputCallbackId::Script => {
            app.form.update(FieldId::Script, FieldValue::Text(value))?;
            // 修正されて有効になったらエラー表示を消す。
            if app.ui.error.is_some() && app.form.validate().is_empty() {
                app.ui.error = None;
            }
        }
        InputCallbackId::HighlightPlayer => {
            app.form
                .update(FieldId::HighlightPlayer, FieldValue::Text(value))?;
        }
        InputCallbackId::SettingsEndpoint => app.endpoint = value,
        InputCallbackId::SettingsApiKey => app.api_key = value,
    }
    Ok(())
}

/// 設定画面用の編集バッファを設定値から再読み込みする。
fn reload_settings_buffers(app: &mut App) {
    app.endpoint = app.cfg.api.endpoint.clone();
    app.api_key = app.cfg.api.api_key.clone();
}
