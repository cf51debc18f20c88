//! TUI描画関連の関数。

use ratatui::{
    Frame,
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::{
    events::{NotificationKind, Screen},
    form::{FieldId, FieldKind, Violation},
    input, layout,
    sections::FormRow,
    shortcuts::{Shortcuts, format_keys},
    submission::SubmissionState,
    worker::short_id,
};

use super::App;

/// 生成中に回すスピナーの各コマ。
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// 画面全体のレイアウトを描画する。
pub fn draw(f: &mut Frame, app: &App) {
    // メインレイアウト（Body + HELP + STATUS）を作る。
    let main_layout = layout::create_main_layout(f.area());

    match app.ui.screen {
        Screen::Form => draw_form_screen(f, app, main_layout.body),
        Screen::Settings => draw_settings_screen(f, app, main_layout.body),
    }

    // HELPバー（画面ごとのショートカット）を描画する。
    let help_text = get_help_text(&app.ui.screen, &app.shortcuts);
    let help_bar = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("HELP"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_bar, main_layout.help_bar);

    // STATUSバーを描画する。
    f.render_widget(build_status_bar(app), main_layout.status_bar);

    // 通知、入力ボックスの順に重ねて描画する。
    if app.ui.notification.is_some() {
        draw_notification(f, app);
    }
    if let Some(input_state) = &app.input_box {
        input::render_input_box(f, input_state);
    }
}

/// フォーム（左）とプレビュー（右）を描画する。
fn draw_form_screen(f: &mut Frame, app: &App, area: Rect) {
    let body_layout = layout::create_body_layout(area);

    // 表示中の行からテーブル行を組み立てる。
    let rows = app.rows().into_iter().map(|row| match row {
        FormRow::Header(section) => {
            let marker = if app.sections.is_open(section) {
                "▼"
            } else {
                "▶"
            };
            Row::new(vec![
                Cell::from(format!("{marker} {}", section.title())),
                Cell::from(""),
            ])
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        }
        FormRow::Field(FieldId::Script) if app.ui.error.is_some() => {
            // 検証エラー中はスクリプト欄の下に警告を出す。
            let value = format!("{}\n⚠ {}", script_value(app), Violation::ScriptRequired);
            Row::new(vec![
                Cell::from(FieldId::Script.label()),
                Cell::from(value),
            ])
            .height(2)
            .style(Style::default().fg(Color::Red))
        }
        FormRow::Field(field) => {
            // スクリプト以外はセクション配下として字下げする。
            let indent = if field.section().is_some() { "  " } else { "" };
            let mut value = match field {
                FieldId::Script => script_value(app),
                _ => app.form.display_value(field),
            };
            if let FieldKind::Number { min, max, .. } = field.kind() {
                value = format!("{value}  ({min}-{max})");
            }
            Row::new(vec![
                Cell::from(format!("{indent}{}", field.label())),
                Cell::from(value),
            ])
        }
    });

    // 選択中の項目に説明があれば枠の下辺に出す。
    let mut block = Block::default().borders(Borders::ALL).title("FORM");
    if let Some(FormRow::Field(field)) = app.selected_row()
        && let Some(text) = field.description()
    {
        block = block.title_bottom(Line::styled(
            format!(" {text} "),
            Style::default().fg(Color::Gray),
        ));
    }

    let table = Table::new(rows, [Constraint::Length(28), Constraint::Min(10)])
        .block(block)
        .row_highlight_style(
            Style::default()
                .bg(Color::Rgb(0, 135, 62)) // ピッチの緑
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );

    // 選択中の行をハイライトする。
    let mut table_state = TableState::default();
    table_state.select(Some(app.ui.selected));
    f.render_stateful_widget(table, body_layout.form_panel, &mut table_state);

    let preview = Paragraph::new(build_preview_text(app))
        .block(Block::default().borders(Borders::ALL).title("PREVIEW"))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, body_layout.preview_panel);
}

/// スクリプト欄の表示値。複数行なら残りの行数を添える。
fn script_value(app: &App) -> String {
    let value = app.form.display_value(FieldId::Script);
    match app.form.draft().script.lines().count() {
        0 | 1 => value,
        n => format!("{value} (+{} lines)", n - 1),
    }
}

/// プレビューパネルの本文を組み立てる。
pub(super) fn build_preview_text(app: &App) -> String {
    let mut lines: Vec<String> = match app.submission.state() {
        SubmissionState::Idle => vec!["Your generated video will appear here".into()],
        SubmissionState::Submitting => {
            let frame = SPINNER[app.ui.tick % SPINNER.len()];
            vec![format!("{frame} Generating Video...")]
        }
        SubmissionState::Succeeded(url) => vec![
            "Video ready:".into(),
            url.clone(),
            String::new(),
            format!(
                "Press {} to open the player",
                format_keys(&app.shortcuts.form.open_player)
            ),
        ],
        SubmissionState::Failed(msg) => vec!["Generation failed:".into(), msg.clone()],
    };

    // 直近のリクエスト概要を添える。
    if let Some(p) = &app.last_submission {
        lines.push(String::new());
        lines.push(format!(
            "Request {} at {}",
            short_id(p.id),
            p.submitted_at.format("%H:%M:%S")
        ));
        lines.push(p.request.summary());
    }

    lines.push(String::new());
    lines.push("Log:".into());
    let skip = app.ui.log.len().saturating_sub(8);
    lines.extend(app.ui.log.iter().skip(skip).cloned());
    lines.join("\n")
}

/// 設定画面を描画する。
fn draw_settings_screen(f: &mut Frame, app: &App, area: Rect) {
    let endpoint = if app.endpoint.trim().is_empty() {
        "(none, simulated API)".to_string()
    } else {
        app.endpoint.clone()
    };
    // キーは伏せ字で表示する。
    let api_key = if app.api_key.is_empty() {
        "(none)".to_string()
    } else {
        "*".repeat(app.api_key.chars().count().min(24))
    };

    let text = format!(
        "Endpoint: {endpoint}\nAPI key:  {api_key}\n\nSimulated delay: {} ms\nPlaceholder URL: {}",
        app.cfg.simulation.delay_ms, app.cfg.simulation.video_url,
    );
    let panel = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("SETTINGS"))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

/// 通知ポップアップを描画する。
fn draw_notification(f: &mut Frame, app: &App) {
    let Some(note) = &app.ui.notification else {
        return;
    };
    let color = match note.kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Failure => Color::Red,
    };

    let area = input::centered_popup(f.area(), 60, 6);
    f.render_widget(Clear, area);
    let text = format!(
        "{}\n\n{}: dismiss",
        note.body,
        format_keys(&app.shortcuts.form.dismiss)
    );
    let popup = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(note.title.clone())
                .border_style(Style::default().fg(color)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(popup, area);
}

/// ステータスバーを構築する。
fn build_status_bar(app: &App) -> Paragraph<'static> {
    let screen_name = match app.ui.screen {
        Screen::Form => "Form",
        Screen::Settings => "Settings",
    };
    let state = app.submission.state().label();

    // エラーの有無でステータス文字列を切り替える。
    let status_text = if let Some(err) = &app.ui.error {
        format!("[{screen_name}] {state} | ERROR: {err}")
    } else {
        format!("[{screen_name}] {state} | {}", app.ui.status)
    };

    let mut status_bar = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("STATUS"))
        .wrap(Wrap { trim: true });

    // エラー時は赤色で強調表示する。
    if app.ui.error.is_some() {
        status_bar = status_bar.style(Style::default().fg(Color::Red));
    }

    status_bar
}

/// 現在画面に応じたヘルプ文字列を返す。
fn get_help_text(screen: &Screen, shortcuts: &Shortcuts) -> String {
    match screen {
        Screen::Form => format!(
            "{}: generate | {}/{}: move | {}/{}: change | {}: edit/toggle | {}: open video | {}: reset | {}: settings | {}: quit",
            format_keys(&shortcuts.form.submit),
            format_keys(&shortcuts.form.up),
            format_keys(&shortcuts.form.down),
            format_keys(&shortcuts.form.decrease),
            format_keys(&shortcuts.form.increase),
            format_keys(&shortcuts.form.activate),
            format_keys(&shortcuts.form.open_player),
            format_keys(&shortcuts.form.reset),
            format_keys(&shortcuts.form.settings),
            format_keys(&shortcuts.form.quit),
        ),
        Screen::Settings => format!(
            "{}: endpoint | {}: API key | {}: save | {}: cancel",
            format_keys(&shortcuts.settings.endpoint),
            format_keys(&shortcuts.settings.api_key),
            format_keys(&shortcuts.settings.save),
            format_keys(&shortcuts.settings.cancel),
        ),
    }
}
