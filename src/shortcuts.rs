//! ショートカット設定の管理。

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// ショートカット設定の全体。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Shortcuts {
    pub form: FormShortcuts,
    pub settings: SettingsShortcuts,
    pub input_box: InputBoxShortcuts,
}

/// フォーム画面のショートカット。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormShortcuts {
    pub quit: Vec<String>,
    pub submit: Vec<String>,
    pub down: Vec<String>,
    pub up: Vec<String>,
    pub increase: Vec<String>,
    pub decrease: Vec<String>,
    /// 見出しの開閉、フラグ反転、テキスト編集。
    pub activate: Vec<String>,
    pub open_player: Vec<String>,
    pub dismiss: Vec<String>,
    pub reset: Vec<String>,
    pub settings: Vec<String>,
}

/// 設定画面のショートカット。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsShortcuts {
    pub cancel: Vec<String>,
    pub save: Vec<String>,
    pub endpoint: Vec<String>,
    pub api_key: Vec<String>,
}

/// InputBoxのショートカット。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBoxShortcuts {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub backspace: Vec<String>,
    pub delete: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub home: Vec<String>,
    pub end: Vec<String>,
    pub clear_line: Vec<String>,
    /// 複数行入力での改行。
    pub newline: Vec<String>,
}

impl Shortcuts {
    /// TOMLから読み込み、無ければデフォルトを返す。
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            // 既存ファイルを読み込んでパースする。
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            // 未作成の場合は既定値を利用する。
            Ok(Self::default())
        }
    }
}

/// 文字列リテラルの配列をVec<String>へ変換する。
fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for FormShortcuts {
    fn default() -> Self {
        Self {
            quit: keys(&["q"]),
            submit: keys(&["g", "Ctrl+s"]),
            down: keys(&["Down", "j"]),
            up: keys(&["Up", "k"]),
            increase: keys(&["Right", "l"]),
            decrease: keys(&["Left", "h"]),
            activate: keys(&["Enter", "Space"]),
            open_player: keys(&["o"]),
            dismiss: keys(&["Esc"]),
            reset: keys(&["Ctrl+r"]),
            settings: keys(&["t"]),
        }
    }
}

impl Default for SettingsShortcuts {
    fn default() -> Self {
        Self {
            cancel: keys(&["Esc"]),
            save: keys(&["Enter"]),
            endpoint: keys(&["e"]),
            api_key: keys(&["k"]),
        }
    }
}

impl Default for InputBoxShortcuts {
    fn default() -> Self {
        // 文字入力と衝突しないよう、英字単体は割り当てない。
        Self {
            confirm: keys(&["Enter"]),
            cancel: keys(&["Esc"]),
            backspace: keys(&["Backspace"]),
            delete: keys(&["Delete"]),
            left: keys(&["Left"]),
            right: keys(&["Right"]),
            home: keys(&["Home", "Ctrl+a"]),
            end: keys(&["End", "Ctrl+e"]),
            clear_line: keys(&["Ctrl+u"]),
            newline: keys(&["Alt+Enter"]),
        }
    }
}

/// KeyEventがいずれかのショートカット文字列と一致するか判定する。
pub fn matches_shortcut(key: &KeyEvent, shortcuts: &[String]) -> bool {
    shortcuts.iter().any(|s| matches_single_shortcut(key, s))
}

/// ヘルプ表示用にキー一覧を連結する。
pub fn format_keys(keys: &[String]) -> String {
    keys.join("/")
}

/// KeyEventが単一のショートカット文字列と一致するか判定する。
fn matches_single_shortcut(key: &KeyEvent, shortcut: &str) -> bool {
    // "Ctrl+u" のような形式を修飾キーとキー本体に分ける。
    let (modifiers_str, key_str) = match shortcut.rsplit_once('+') {
        Some((mods, k)) if !k.is_empty() => (mods.split('+').collect::<Vec<_>>(), k),
        _ => (vec![], shortcut),
    };

    // 修飾キーを解析して期待値を作る。
    let mut expected_modifiers = KeyModifiers::empty();
    for modifier in modifiers_str {
        match modifier.to_ascii_lowercase().as_str() {
            "ctrl" => expected_modifiers |= KeyModifiers::CONTROL,
            "alt" => expected_modifiers |= KeyModifiers::ALT,
            "shift" => expected_modifiers |= KeyModifiers::SHIFT,
            _ => return false,
        }
    }

    // 修飾キーが一致しなければ即座に不一致とする。
    if key.modifiers != expected_modifiers {
        return false;
    }

    // 名前付きキーは大文字小文字を区別せずに比較する。
    let code = match key_str.to_ascii_lowercase().as_str() {
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        _ => {
            // 単一文字は Char として比較する。
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return false,
            }
        }
    };
    key.code == code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_shortcut_simple_char() {
        // 単一文字の一致判定を検証する。
        let key = KeyEvent::new(KeyCode::Char('g'), KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("g")]));
        assert!(!matches_shortcut(&key, &[String::from("q")]));
    }

    #[test]
    fn test_matches_shortcut_special_key() {
        // 特殊キーの一致判定を検証する。
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("Enter")]));
        assert!(matches_shortcut(&key, &[String::from("enter")]));
        assert!(!matches_shortcut(&key, &[String::from("Esc")]));
    }

    #[test]
    fn test_matches_shortcut_space() {
        // Space表記がスペース文字に一致することを検証する。
        let key = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("Space")]));
    }

    #[test]
    fn test_matches_shortcut_with_modifier() {
        // 修飾キー付きの一致判定を検証する。
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(matches_shortcut(&key, &[String::from("Ctrl+s")]));
        assert!(!matches_shortcut(&key, &[String::from("s")]));
        assert!(!matches_shortcut(&key, &[String::from("Hyper+s")]));
    }

    #[test]
    fn test_plus_key_itself() {
        // 「+」単体のキーも指定できることを検証する。
        let key = KeyEvent::new(KeyCode::Char('+'), KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("+")]));
    }

    #[test]
    fn test_default_form_bindings() {
        // 既定のフォーム操作キーを検証する。
        let sc = Shortcuts::default();
        let down = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::empty());
        let submit = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(matches_shortcut(&down, &sc.form.down));
        assert!(matches_shortcut(&submit, &sc.form.submit));
        assert_eq!(format_keys(&sc.form.submit), "g/Ctrl+s");
    }

    #[test]
    fn test_input_box_has_no_bare_letters() {
        // InputBoxの既定キーに修飾なしの英字が含まれないことを検証する。
        let ib = Shortcuts::default().input_box;
        let all = [
            &ib.confirm,
            &ib.cancel,
            &ib.backspace,
            &ib.delete,
            &ib.left,
            &ib.right,
            &ib.home,
            &ib.end,
            &ib.clear_line,
            &ib.newline,
        ];
        for list in all {
            for k in list.iter() {
                assert!(k.chars().count() > 1, "bare key {k}");
            }
        }
    }

    #[test]
    fn test_partial_shortcut_file() {
        // 一部だけ書かれた設定でも残りは既定値になることを検証する。
        let sc: Shortcuts = toml::from_str("[settings]\ncancel=[\"q\"]\n").unwrap();
        assert_eq!(sc.settings.cancel, vec!["q".to_string()]);
        assert_eq!(sc.settings.save, vec!["Enter".to_string()]);
        assert_eq!(sc.form.quit, vec!["q".to_string()]);
        assert_eq!(sc.input_box.newline, vec!["Alt+Enter".to_string()]);
    }

    #[test]
    fn test_newline_is_distinct_from_confirm() {
        // Alt+Enterは改行であり、確定とは区別されることを検証する。
        let ib = Shortcuts::default().input_box;
        let alt_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::empty());
        assert!(matches_shortcut(&alt_enter, &ib.newline));
        assert!(!matches_shortcut(&alt_enter, &ib.confirm));
        assert!(!matches_shortcut(&enter, &ib.newline));
    }
}
