//! TUI内での文字列入力コンポーネント（InputBox）。

use ratatui::{
    layout::Alignment,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// InputBox入力状態
#[derive(Clone, Debug)]
pub struct InputBoxState {
    /// プロンプトメッセージ
    pub prompt: String,
    /// 現在の入力値
    pub value: String,
    /// カーソル位置（文字単位）
    pub cursor: usize,
    /// 改行を受け付けるか（スクリプト用）
    pub multiline: bool,
    /// 入力完了時のコールバック識別子
    pub callback_id: InputCallbackId,
}

/// 複数行入力で一度に表示する行数
const MULTILINE_ROWS: usize = 5;

/// 入力完了時のコールバック識別子
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputCallbackId {
    // フォーム画面用
    Script,
    HighlightPlayer,

    // 設定画面用
    SettingsEndpoint,
    SettingsApiKey,
}

impl InputBoxState {
    /// 既存の値を持った入力ボックスを、カーソル末尾で開く。
    pub fn new(prompt: impl Into<String>, value: &str, callback_id: InputCallbackId) -> Self {
        Self {
            prompt: prompt.into(),
            value: value.to_string(),
            cursor: value.chars().count(),
            multiline: false,
            callback_id,
        }
    }

    /// 改行を受け付ける複数行モードにする。
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    /// 文字単位のカーソル位置をバイト位置へ変換する。
    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// 文字を挿入（単一行モードでは改行を無視する）
    pub fn insert_char(&mut self, c: char) {
        if c == '\r' || (c == '\n' && !self.multiline) {
            return;
        }
        // カーソル位置に挿入して1文字進める。
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// 貼り付けられた文字列をまとめて挿入する。
    pub fn insert_str(&mut self, text: &str) {
        // CRLF/CRを改行に揃え、単一行モードでは空白に置き換える。
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        for c in normalized.chars() {
            match c {
                '\n' if !self.multiline => self.insert_char(' '),
                c => self.insert_char(c),
            }
        }
    }

    /// Backspace（カーソル前の文字を削除）
    pub fn backspace(&mut self) {
        // カーソルが先頭なら何もしない。
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    /// Delete（カーソル位置の文字を削除）
    pub fn delete(&mut self) {
        // カーソルが末尾なら何もしない。
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    /// カーソルを左に移動
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// カーソルを右に移動
    pub fn move_right(&mut self) {
        // 末尾を超えないようにする。
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    /// カーソルを先頭に移動
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// カーソルを末尾に移動
    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// 行全体をクリア
    pub fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// 表示領域に収まる行と、その中でのカーソル位置（行, 桁）を返す。
    fn visible_lines(&self, width: usize, height: usize) -> (Vec<String>, usize, usize) {
        let lines: Vec<&str> = self.value.split('\n').collect();
        // カーソルのある行と、その行頭からの桁を求める。
        let before: String = self.value.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before.rsplit('\n').next().map_or(0, |l| l.chars().count());

        // カーソル行が下端に来るまで上へスクロールする。
        let first = row.saturating_sub(height.saturating_sub(1));
        let mut out = Vec::new();
        let mut cursor_col = col;
        for (i, line) in lines.iter().enumerate().skip(first).take(height) {
            if i == row {
                // カーソルが右端を越えたら左へスクロールする。
                let offset = col.saturating_sub(width.saturating_sub(2));
                out.push(line.chars().skip(offset).take(width).collect());
                cursor_col = col - offset;
            } else {
                out.push(line.chars().take(width).collect());
            }
        }
        (out, row - first, cursor_col)
    }
}

/// InputBoxをポップアップとして描画
pub fn render_input_box(f: &mut Frame, state: &InputBoxState) {
    let rows = if state.multiline { MULTILINE_ROWS } else { 1 };

    // 中央に配置されたポップアップ領域を計算する。
    let popup_area = centered_popup(f.area(), 70, rows as u16 + 6);

    // 既存の描画を消してポップアップ用の背景にする。
    f.render_widget(Clear, popup_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Input")
        .style(Style::default().bg(Color::DarkGray));
    f.render_widget(block, popup_area);

    // プロンプト + 入力フィールド + 空行 + ヘルプ。
    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(rows as u16),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(popup_area);

    let prompt = Paragraph::new(state.prompt.as_str()).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(prompt, inner[0]);

    // カーソル行に「|」を差し込んで表示する。
    let (visible, cursor_row, cursor_col) = state.visible_lines(inner[1].width as usize, rows);
    let lines: Vec<Line> = visible
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            if i != cursor_row {
                return Line::from(text);
            }
            let split = text
                .char_indices()
                .nth(cursor_col)
                .map(|(b, _)| b)
                .unwrap_or(text.len());
            Line::from(format!("{}|{}", &text[..split], &text[split..]))
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).style(Style::default().fg(Color::Green)),
        inner[1],
    );

    let help_text = if state.multiline {
        "Enter=confirm | Alt+Enter=new line | Esc=cancel | Ctrl+U=clear"
    } else {
        "Enter=confirm | Esc=cancel | Ctrl+U=clear"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, inner[3]);
}

/// 中央配置のポップアップ領域を計算
pub fn centered_popup(area: Rect, width_percent: u16, height: u16) -> Rect {
    // 縦方向の余白を作り、中央行を取り出す。
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    // 横方向も中央に寄せる。
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(rows[1])[1]
}
