//! フォームの折りたたみセクションの開閉状態。

use crate::{config::SectionsCfg, form::FieldId};

/// フォーム上の論理グループ。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Voice,
    Tactics,
    Visual,
    Output,
}

impl Section {
    /// 表示順の全セクション。
    pub const ALL: [Section; 4] = [
        Section::Voice,
        Section::Tactics,
        Section::Visual,
        Section::Output,
    ];

    /// 見出しに表示するタイトル。
    pub fn title(self) -> &'static str {
        match self {
            Section::Voice => "Voice Settings",
            Section::Tactics => "Tactics Settings",
            Section::Visual => "Visual Settings",
            Section::Output => "Output Settings",
        }
    }

    /// このセクションに属する項目をフォーム順に返す。
    pub fn fields(self) -> impl Iterator<Item = FieldId> {
        FieldId::ALL
            .into_iter()
            .filter(move |f| f.section() == Some(self))
    }
}

/// セクションごとの開閉フラグ。フォームの値は一切持たない。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionVisibility {
    voice: bool,
    tactics: bool,
    visual: bool,
    output: bool,
}

impl SectionVisibility {
    /// 設定ファイルの初期開閉状態から作る。
    pub fn from_config(cfg: &SectionsCfg) -> Self {
        Self {
            voice: cfg.voice,
            tactics: cfg.tactics,
            visual: cfg.visual,
            output: cfg.output,
        }
    }

    /// 指定セクションが開いているか。
    pub fn is_open(&self, section: Section) -> bool {
        match section {
            Section::Voice => self.voice,
            Section::Tactics => self.tactics,
            Section::Visual => self.visual,
            Section::Output => self.output,
        }
    }

    /// 指定セクションの開閉を明示的に設定する。
    pub fn set_open(&mut self, section: Section, open: bool) {
        *self.slot(section) = open;
    }

    /// 指定セクションだけを開閉反転する。
    pub fn toggle(&mut self, section: Section) {
        let slot = self.slot(section);
        *slot = !*slot;
        tracing::debug!("section {:?} open={}", section, *slot);
    }

    fn slot(&mut self, section: Section) -> &mut bool {
        match section {
            Section::Voice => &mut self.voice,
            Section::Tactics => &mut self.tactics,
            Section::Visual => &mut self.visual,
            Section::Output => &mut self.output,
        }
    }
}

impl Default for SectionVisibility {
    /// 音声設定だけを開いた状態で始める。
    fn default() -> Self {
        Self::from_config(&SectionsCfg::default())
    }
}

/// フォームパネルの1行。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormRow {
    /// セクション見出し（Enterで開閉）。
    Header(Section),
    /// 編集可能な項目。
    Field(FieldId),
}

/// 現在の開閉状態で表示される行を上から順に並べる。
pub fn visible_rows(visibility: &SectionVisibility) -> Vec<FormRow> {
    // スクリプト欄は常に先頭に表示する。
    let mut rows = vec![FormRow::Field(FieldId::Script)];
    for section in Section::ALL {
        // 見出しは常に表示し、開いている場合のみ項目を続ける。
        rows.push(FormRow::Header(section));
        if visibility.is_open(section) {
            rows.extend(section.fields().map(FormRow::Field));
        }
    }
    rows
}
