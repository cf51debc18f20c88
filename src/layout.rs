//! レイアウト計算のヘルパー関数

use ratatui::prelude::*;

/// メイン画面の3つの領域
pub struct MainLayout {
    /// フォーム + プレビューの領域
    pub body: Rect,
    /// HELPバーの領域
    pub help_bar: Rect,
    /// STATUSバーの領域
    pub status_bar: Rect,
}

/// ボディ部の2つの領域
pub struct BodyLayout {
    /// 入力フォームの領域
    pub form_panel: Rect,
    /// 生成結果プレビューの領域
    pub preview_panel: Rect,
}

/// メイン画面を分割（Body + HELP + STATUS）
pub fn create_main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Body（フォーム + プレビュー）
            Constraint::Length(3), // HELPバー
            Constraint::Length(3), // STATUSバー
        ])
        .split(area);

    MainLayout {
        body: chunks[0],
        help_bar: chunks[1],
        status_bar: chunks[2],
    }
}

/// Body領域を2つに分割（フォーム 60% + プレビュー 40%）
pub fn create_body_layout(area: Rect) -> BodyLayout {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60), // フォーム
            Constraint::Percentage(40), // プレビュー
        ])
        .split(area);

    BodyLayout {
        form_panel: chunks[0],
        preview_panel: chunks[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_layout_reserves_bars() {
        // HELP/STATUSが3行ずつ確保されることを検証する。
        let l = create_main_layout(Rect::new(0, 0, 100, 40));
        assert_eq!(l.help_bar.height, 3);
        assert_eq!(l.status_bar.height, 3);
        assert_eq!(l.body.height, 34);
    }

    #[test]
    fn test_body_layout_split() {
        // フォームとプレビューが6:4で分割されることを検証する。
        let l = create_body_layout(Rect::new(0, 0, 100, 30));
        assert_eq!(l.form_panel.width, 60);
        assert_eq!(l.preview_panel.width, 40);
        assert_eq!(l.preview_panel.x, 60);
    }
}
