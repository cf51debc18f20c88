//! 動画生成ジョブの設定モデルと選択肢の定義。

use serde::{Deserialize, Serialize};
use std::fmt;

/// ナレーション速度の下限（倍率）。
pub const VOICE_SPEED_MIN: f64 = 0.5;
/// ナレーション速度の上限（倍率）。
pub const VOICE_SPEED_MAX: f64 = 2.0;
/// スライダーの刻み幅。
pub const VOICE_SPEED_STEP: f64 = 0.1;
/// ナレーション速度の既定値。
pub const VOICE_SPEED_DEFAULT: f64 = 1.0;

/// 動画長の下限（秒）。
pub const DURATION_MIN: u32 = 15;
/// 動画長の上限（秒）。
pub const DURATION_MAX: u32 = 90;
/// 動画長の刻み幅（秒）。
pub const DURATION_STEP: u32 = 5;
/// 動画長の既定値（秒）。
pub const DURATION_DEFAULT: u32 = 45;

/// セレクト項目として扱う列挙型の共通操作。
pub trait Choice: Copy + PartialEq + Sized + 'static {
    /// 表示順に並べた全選択肢。
    const ALL: &'static [Self];

    /// API送信時に使うラベル。
    fn label(self) -> &'static str;

    /// 画面表示用のラベル。
    fn display(self) -> &'static str;

    /// 送信ラベルの完全一致で選択肢を引く。表示ラベルは受け付けない。
    fn from_label(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == s)
    }

    /// 選択肢を前後に巡回させる（末尾の次は先頭）。
    fn cycle(self, delta: i32) -> Self {
        let len = Self::ALL.len() as i32;
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0) as i32;
        Self::ALL[(idx + delta).rem_euclid(len) as usize]
    }
}

/// 選択肢列挙型と `Choice` / `Default` / `Display` 実装をまとめて生成する。
macro_rules! choice_enum {
    (@display $label:literal) => { $label };
    (@display $label:literal, $display:literal) => { $display };
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal $(as $display:literal)? ),+ $(,)?
        }
        default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant, )+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            fn display(self) -> &'static str {
                match self {
                    $(Self::$variant => choice_enum!(@display $label $(, $display)?),)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.display())
            }
        }
    };
}

choice_enum! {
    /// ナレーションの話し方。
    VoiceStyle {
        Default => "Default",
        Energetic => "Energetic",
        Calm => "Calm",
    }
    default Default
}

choice_enum! {
    /// ナレーションの声色。
    VoiceTone {
        Neutral => "Neutral",
        Excited => "Excited",
        Serious => "Serious",
    }
    default Neutral
}

choice_enum! {
    /// 解説する戦術の種類。
    TacticType {
        HighPress => "High Press",
        LowBlock => "Low Block",
        BuildUp => "Build-Up",
        Counter => "Counter" as "Counter Attack",
    }
    default BuildUp
}

choice_enum! {
    /// どちらのチーム視点で描くか。
    TeamPerspective {
        Attacking => "Attacking",
        Defending => "Defending",
        Both => "Both",
    }
    default Attacking
}

choice_enum! {
    /// ピッチの描画スタイル。
    FieldStyle {
        TacticsBoard2d => "2D Tactics Board",
        Pitch3d => "3D Pitch",
        DarkTheme => "Dark Theme",
    }
    default TacticsBoard2d
}

choice_enum! {
    /// 動きを示す矢印のスタイル。
    ArrowStyle {
        Solid => "Solid",
        Dashed => "Dashed",
        Pulsing => "Pulsing",
    }
    default Solid
}

choice_enum! {
    /// 出力解像度。
    Resolution {
        Hd720 => "720p",
        Hd1080 => "1080p",
        Uhd4k => "4K",
    }
    default Hd1080
}

choice_enum! {
    /// 出力コンテナ形式。
    OutputFormat {
        Mp4 => "mp4" as "MP4",
        Gif => "gif" as "GIF",
        Webm => "webm" as "WebM",
    }
    default Mp4
}

/// 1本の動画生成リクエストを構成する全パラメータ。
///
/// 未指定の項目は常に既定値で埋まっており、送信を妨げ得るのは `script` だけ。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobConfiguration {
    /// 解説スクリプト本文（必須）。
    pub script: String,
    pub voice_style: VoiceStyle,
    /// ナレーション速度（0.5〜2.0倍）。
    pub voice_speed: f64,
    pub voice_tone: VoiceTone,
    /// 戦術アニメーション前に間を置くか。
    pub pause_before_tactic: bool,
    pub tactic_type: TacticType,
    pub team_perspective: TeamPerspective,
    /// 強調表示する選手名（任意）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_player: Option<String>,
    pub field_style: FieldStyle,
    pub arrow_style: ArrowStyle,
    /// 戦術上重要なゾーンを強調するか。
    pub highlight_zones: bool,
    /// 字幕を付けるか。
    pub add_captions: bool,
    /// BGMを付けるか。
    pub add_music: bool,
    /// 動画長（15〜90秒、5秒刻み）。
    pub duration: u32,
    pub resolution: Resolution,
    pub output_format: OutputFormat,
}

impl Default for JobConfiguration {
    fn default() -> Self {
        Self {
            script: String::new(),
            voice_style: VoiceStyle::default(),
            voice_speed: VOICE_SPEED_DEFAULT,
            voice_tone: VoiceTone::default(),
            pause_before_tactic: false,
            tactic_type: TacticType::default(),
            team_perspective: TeamPerspective::default(),
            highlight_player: None,
            field_style: FieldStyle::default(),
            arrow_style: ArrowStyle::default(),
            highlight_zones: false,
            add_captions: true,
            add_music: false,
            duration: DURATION_DEFAULT,
            resolution: Resolution::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl JobConfiguration {
    /// プレビュー欄に出す1行サマリ。
    pub fn summary(&self) -> String {
        format!(
            "{} / {} / {}s / {} {}",
            self.tactic_type.display(),
            self.team_perspective.display(),
            self.duration,
            self.resolution.display(),
            self.output_format.display(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form_defaults() {
        // 既定値の一式を検証する。
        let cfg = JobConfiguration::default();
        assert_eq!(cfg.script, "");
        assert_eq!(cfg.voice_style, VoiceStyle::Default);
        assert_eq!(cfg.voice_speed, 1.0);
        assert_eq!(cfg.voice_tone, VoiceTone::Neutral);
        assert!(!cfg.pause_before_tactic);
        assert_eq!(cfg.tactic_type, TacticType::BuildUp);
        assert_eq!(cfg.team_perspective, TeamPerspective::Attacking);
        assert_eq!(cfg.highlight_player, None);
        assert_eq!(cfg.field_style, FieldStyle::TacticsBoard2d);
        assert_eq!(cfg.arrow_style, ArrowStyle::Solid);
        assert!(!cfg.highlight_zones);
        assert!(cfg.add_captions);
        assert!(!cfg.add_music);
        assert_eq!(cfg.duration, 45);
        assert_eq!(cfg.resolution, Resolution::Hd1080);
        assert_eq!(cfg.output_format, OutputFormat::Mp4);
    }

    #[test]
    fn test_serializes_with_wire_labels() {
        // camelCaseのキーと送信ラベルでJSON化されることを検証する。
        let cfg = JobConfiguration {
            script: "Press high".into(),
            tactic_type: TacticType::HighPress,
            field_style: FieldStyle::Pitch3d,
            resolution: Resolution::Uhd4k,
            ..JobConfiguration::default()
        };
        let v = serde_json::to_value(&cfg).unwrap();
        assert_eq!(v["script"], "Press high");
        assert_eq!(v["tacticType"], "High Press");
        assert_eq!(v["fieldStyle"], "3D Pitch");
        assert_eq!(v["resolution"], "4K");
        assert_eq!(v["outputFormat"], "mp4");
        assert_eq!(v["voiceSpeed"], 1.0);
        assert!(v.get("highlightPlayer").is_none());
    }

    #[test]
    fn test_partial_payload_is_filled_with_defaults() {
        // 一部の項目だけのJSONでも既定値で補完されることを検証する。
        let cfg: JobConfiguration =
            serde_json::from_str(r#"{"script":"Low block shape","tacticType":"Low Block"}"#)
                .unwrap();
        assert_eq!(cfg.tactic_type, TacticType::LowBlock);
        assert_eq!(cfg.duration, DURATION_DEFAULT);
        assert!(cfg.add_captions);
    }

    #[test]
    fn test_from_label_requires_wire_label() {
        // 送信ラベルのみ受け付け、表示ラベルは拒否されることを検証する。
        assert_eq!(TacticType::from_label("Counter"), Some(TacticType::Counter));
        assert_eq!(OutputFormat::from_label("webm"), Some(OutputFormat::Webm));
        assert_eq!(TacticType::from_label("Counter Attack"), None);
        assert_eq!(OutputFormat::from_label("WebM"), None);
        assert_eq!(TacticType::from_label("Tiki-Taka"), None);
        assert_eq!(Resolution::from_label("4k"), None);
    }

    #[test]
    fn test_choice_cycle_wraps() {
        // 末尾の次が先頭、先頭の前が末尾になることを検証する。
        assert_eq!(ArrowStyle::Pulsing.cycle(1), ArrowStyle::Solid);
        assert_eq!(ArrowStyle::Solid.cycle(-1), ArrowStyle::Pulsing);
        assert_eq!(TacticType::HighPress.cycle(2), TacticType::BuildUp);
    }
}
