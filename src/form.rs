//! Draft form state: per-field updates, range clamping, and validation.

use std::fmt;
use thiserror::Error;

use crate::{
    jobs::{
        ArrowStyle, Choice, DURATION_DEFAULT, DURATION_MAX, DURATION_MIN, DURATION_STEP,
        FieldStyle, JobConfiguration, OutputFormat, Resolution, TacticType, TeamPerspective,
        VOICE_SPEED_DEFAULT, VOICE_SPEED_MAX, VOICE_SPEED_MIN, VOICE_SPEED_STEP, VoiceStyle,
        VoiceTone,
    },
    sections::Section,
};

/// Identifies one editable field of the job configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldId {
    Script,
    VoiceStyle,
    VoiceTone,
    VoiceSpeed,
    PauseBeforeTactic,
    TacticType,
    TeamPerspective,
    HighlightPlayer,
    FieldStyle,
    ArrowStyle,
    HighlightZones,
    Resolution,
    OutputFormat,
    Duration,
    AddCaptions,
    AddMusic,
}

/// How a field is edited and constrained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    Choice,
    Number { min: f64, max: f64, step: f64 },
    Flag,
}

/// A raw value offered to [`FormState::update`].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Choice(String),
    Number(f64),
    Flag(bool),
}

impl FieldValue {
    fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Choice(_) => "choice",
            FieldValue::Number(_) => "number",
            FieldValue::Flag(_) => "flag",
        }
    }
}

impl FieldId {
    /// All fields in form order.
    pub const ALL: [FieldId; 16] = [
        FieldId::Script,
        FieldId::VoiceStyle,
        FieldId::VoiceTone,
        FieldId::VoiceSpeed,
        FieldId::PauseBeforeTactic,
        FieldId::TacticType,
        FieldId::TeamPerspective,
        FieldId::HighlightPlayer,
        FieldId::FieldStyle,
        FieldId::ArrowStyle,
        FieldId::HighlightZones,
        FieldId::Resolution,
        FieldId::OutputFormat,
        FieldId::Duration,
        FieldId::AddCaptions,
        FieldId::AddMusic,
    ];

    /// Label shown next to the field.
    pub fn label(self) -> &'static str {
        match self {
            FieldId::Script => "Script",
            FieldId::VoiceStyle => "Voice Style",
            FieldId::VoiceTone => "Voice Tone",
            FieldId::VoiceSpeed => "Voice Speed",
            FieldId::PauseBeforeTactic => "Pause Before Tactics",
            FieldId::TacticType => "Tactic Type",
            FieldId::TeamPerspective => "Team Perspective",
            FieldId::HighlightPlayer => "Highlight Player",
            FieldId::FieldStyle => "Field Style",
            FieldId::ArrowStyle => "Arrow Style",
            FieldId::HighlightZones => "Highlight Tactical Zones",
            FieldId::Resolution => "Resolution",
            FieldId::OutputFormat => "Output Format",
            FieldId::Duration => "Duration",
            FieldId::AddCaptions => "Add Captions",
            FieldId::AddMusic => "Add Background Music",
        }
    }

    /// Payload key, used in error messages.
    pub fn key(self) -> &'static str {
        match self {
            FieldId::Script => "script",
            FieldId::VoiceStyle => "voiceStyle",
            FieldId::VoiceTone => "voiceTone",
            FieldId::VoiceSpeed => "voiceSpeed",
            FieldId::PauseBeforeTactic => "pauseBeforeTactic",
            FieldId::TacticType => "tacticType",
            FieldId::TeamPerspective => "teamPerspective",
            FieldId::HighlightPlayer => "highlightPlayer",
            FieldId::FieldStyle => "fieldStyle",
            FieldId::ArrowStyle => "arrowStyle",
            FieldId::HighlightZones => "highlightZones",
            FieldId::Resolution => "resolution",
            FieldId::OutputFormat => "outputFormat",
            FieldId::Duration => "duration",
            FieldId::AddCaptions => "addCaptions",
            FieldId::AddMusic => "addMusic",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldId::Script | FieldId::HighlightPlayer => FieldKind::Text,
            FieldId::VoiceSpeed => FieldKind::Number {
                min: VOICE_SPEED_MIN,
                max: VOICE_SPEED_MAX,
                step: VOICE_SPEED_STEP,
            },
            FieldId::Duration => FieldKind::Number {
                min: f64::from(DURATION_MIN),
                max: f64::from(DURATION_MAX),
                step: f64::from(DURATION_STEP),
            },
            FieldId::PauseBeforeTactic
            | FieldId::HighlightZones
            | FieldId::AddCaptions
            | FieldId::AddMusic => FieldKind::Flag,
            _ => FieldKind::Choice,
        }
    }

    /// The collapsible section owning the field; the script sits outside all sections.
    pub fn section(self) -> Option<Section> {
        match self {
            FieldId::Script => None,
            FieldId::VoiceStyle
            | FieldId::VoiceTone
            | FieldId::VoiceSpeed
            | FieldId::PauseBeforeTactic => Some(Section::Voice),
            FieldId::TacticType | FieldId::TeamPerspective | FieldId::HighlightPlayer => {
                Some(Section::Tactics)
            }
            FieldId::FieldStyle | FieldId::ArrowStyle | FieldId::HighlightZones => {
                Some(Section::Visual)
            }
            FieldId::Resolution
            | FieldId::OutputFormat
            | FieldId::Duration
            | FieldId::AddCaptions
            | FieldId::AddMusic => Some(Section::Output),
        }
    }

    /// One-line help shown while the field is selected.
    pub fn description(self) -> Option<&'static str> {
        match self {
            FieldId::VoiceSpeed => Some("Adjust how fast the narration plays (0.5x to 2x)"),
            FieldId::PauseBeforeTactic => {
                Some("Add a brief pause before showing the main tactical animation")
            }
            FieldId::HighlightPlayer => {
                Some("Special focus will be given to this player in the animation")
            }
            FieldId::HighlightZones => {
                Some("Emphasize important areas of the pitch during analysis")
            }
            FieldId::Duration => Some("Video length from 15 to 90 seconds"),
            FieldId::AddCaptions => Some("Display subtitles in the video"),
            FieldId::AddMusic => Some("Include light sports background music"),
            _ => None,
        }
    }

    /// Hint for free-text fields, used as the input prompt.
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            FieldId::Script => Some("Paste your football analysis script here..."),
            FieldId::HighlightPlayer => Some("Enter player name (e.g., Odegaard)"),
            _ => None,
        }
    }
}

/// Rejection of a single field update; the draft is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{field}: unknown option \"{value}\"")]
    UnknownOption { field: &'static str, value: String },
    #[error("{field}: expected a {expected} value, got {got}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    #[error("{field}: value must be a finite number")]
    NotFinite { field: &'static str },
}

/// A constraint violated by the whole draft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Violation {
    ScriptRequired,
}

impl Violation {
    /// Field the violation is shown next to.
    pub fn field(self) -> FieldId {
        match self {
            Violation::ScriptRequired => FieldId::Script,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Violation::ScriptRequired => "Script Required",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ScriptRequired => f.write_str("Script is required"),
        }
    }
}

/// Submission blocked by one or more violations.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", join_titles(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

fn join_titles(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.title())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Report every violated constraint of a configuration.
pub fn validate(config: &JobConfiguration) -> Vec<Violation> {
    let mut violations = Vec::new();
    if config.script.trim().is_empty() {
        violations.push(Violation::ScriptRequired);
    }
    violations
}

/// Clamp a narration speed into range, rounded to the slider step.
pub fn clamp_voice_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        return VOICE_SPEED_DEFAULT;
    }
    let steps = (speed / VOICE_SPEED_STEP).round();
    let min_steps = (VOICE_SPEED_MIN / VOICE_SPEED_STEP).round();
    let max_steps = (VOICE_SPEED_MAX / VOICE_SPEED_STEP).round();
    // Work in whole steps so 1.2 stays 1.2 and not 1.2000000000000002.
    steps.clamp(min_steps, max_steps) / (1.0 / VOICE_SPEED_STEP).round()
}

/// Clamp a duration into range, snapped to the slider step.
pub fn clamp_duration(seconds: f64) -> u32 {
    if seconds.is_nan() {
        return DURATION_DEFAULT;
    }
    let step = f64::from(DURATION_STEP);
    let snapped = (seconds / step).round() * step;
    snapped.clamp(f64::from(DURATION_MIN), f64::from(DURATION_MAX)) as u32
}

/// The in-progress, possibly invalid job configuration.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    draft: JobConfiguration,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &JobConfiguration {
        &self.draft
    }

    /// Check one value against its field's constraint and store it.
    ///
    /// Numbers are clamped rather than rejected. The script is stored even
    /// when blank; [`FormState::validate`] reports that.
    pub fn update(&mut self, field: FieldId, value: FieldValue) -> Result<(), FieldError> {
        let d = &mut self.draft;
        match field {
            FieldId::Script => d.script = expect_text(field, value)?,
            FieldId::HighlightPlayer => {
                let name = expect_text(field, value)?;
                d.highlight_player = if name.trim().is_empty() {
                    None
                } else {
                    Some(name)
                };
            }
            FieldId::VoiceStyle => d.voice_style = expect_choice::<VoiceStyle>(field, value)?,
            FieldId::VoiceTone => d.voice_tone = expect_choice::<VoiceTone>(field, value)?,
            FieldId::TacticType => d.tactic_type = expect_choice::<TacticType>(field, value)?,
            FieldId::TeamPerspective => {
                d.team_perspective = expect_choice::<TeamPerspective>(field, value)?
            }
            FieldId::FieldStyle => d.field_style = expect_choice::<FieldStyle>(field, value)?,
            FieldId::ArrowStyle => d.arrow_style = expect_choice::<ArrowStyle>(field, value)?,
            FieldId::Resolution => d.resolution = expect_choice::<Resolution>(field, value)?,
            FieldId::OutputFormat => {
                d.output_format = expect_choice::<OutputFormat>(field, value)?
            }
            FieldId::VoiceSpeed => d.voice_speed = clamp_voice_speed(expect_number(field, value)?),
            FieldId::Duration => d.duration = clamp_duration(expect_number(field, value)?),
            FieldId::PauseBeforeTactic => d.pause_before_tactic = expect_flag(field, value)?,
            FieldId::HighlightZones => d.highlight_zones = expect_flag(field, value)?,
            FieldId::AddCaptions => d.add_captions = expect_flag(field, value)?,
            FieldId::AddMusic => d.add_music = expect_flag(field, value)?,
        }
        Ok(())
    }

    /// Step a field: numbers move by their step, choices cycle, flags flip.
    /// Text fields are left alone.
    pub fn adjust(&mut self, field: FieldId, delta: i32) -> Result<(), FieldError> {
        let value = match (field.kind(), self.value(field)) {
            (FieldKind::Number { step, .. }, FieldValue::Number(n)) => {
                FieldValue::Number(n + step * f64::from(delta))
            }
            (FieldKind::Flag, FieldValue::Flag(on)) if delta != 0 => FieldValue::Flag(!on),
            (FieldKind::Choice, _) => FieldValue::Choice(self.cycled_label(field, delta).into()),
            _ => return Ok(()),
        };
        self.update(field, value)
    }

    /// Current value of a field.
    pub fn value(&self, field: FieldId) -> FieldValue {
        let d = &self.draft;
        match field {
            FieldId::Script => FieldValue::Text(d.script.clone()),
            FieldId::HighlightPlayer => {
                FieldValue::Text(d.highlight_player.clone().unwrap_or_default())
            }
            FieldId::VoiceStyle => FieldValue::Choice(d.voice_style.label().into()),
            FieldId::VoiceTone => FieldValue::Choice(d.voice_tone.label().into()),
            FieldId::TacticType => FieldValue::Choice(d.tactic_type.label().into()),
            FieldId::TeamPerspective => FieldValue::Choice(d.team_perspective.label().into()),
            FieldId::FieldStyle => FieldValue::Choice(d.field_style.label().into()),
            FieldId::ArrowStyle => FieldValue::Choice(d.arrow_style.label().into()),
            FieldId::Resolution => FieldValue::Choice(d.resolution.label().into()),
            FieldId::OutputFormat => FieldValue::Choice(d.output_format.label().into()),
            FieldId::VoiceSpeed => FieldValue::Number(d.voice_speed),
            FieldId::Duration => FieldValue::Number(f64::from(d.duration)),
            FieldId::PauseBeforeTactic => FieldValue::Flag(d.pause_before_tactic),
            FieldId::HighlightZones => FieldValue::Flag(d.highlight_zones),
            FieldId::AddCaptions => FieldValue::Flag(d.add_captions),
            FieldId::AddMusic => FieldValue::Flag(d.add_music),
        }
    }

    /// Human-readable value for the form panel.
    pub fn display_value(&self, field: FieldId) -> String {
        let d = &self.draft;
        match field {
            FieldId::Script => {
                let first = d.script.lines().next().unwrap_or("").trim();
                if first.is_empty() {
                    "(empty)".into()
                } else if first.chars().count() > 48 {
                    format!("{}…", first.chars().take(47).collect::<String>())
                } else {
                    first.to_string()
                }
            }
            FieldId::HighlightPlayer => d.highlight_player.clone().unwrap_or_else(|| "-".into()),
            FieldId::VoiceStyle => d.voice_style.display().into(),
            FieldId::VoiceTone => d.voice_tone.display().into(),
            FieldId::TacticType => d.tactic_type.display().into(),
            FieldId::TeamPerspective => d.team_perspective.display().into(),
            FieldId::FieldStyle => d.field_style.display().into(),
            FieldId::ArrowStyle => d.arrow_style.display().into(),
            FieldId::Resolution => d.resolution.display().into(),
            FieldId::OutputFormat => d.output_format.display().into(),
            FieldId::VoiceSpeed => format!("{:.1}x", d.voice_speed),
            FieldId::Duration => format!("{} seconds", d.duration),
            FieldId::PauseBeforeTactic
            | FieldId::HighlightZones
            | FieldId::AddCaptions
            | FieldId::AddMusic => match self.value(field) {
                FieldValue::Flag(true) => "On".into(),
                _ => "Off".into(),
            },
        }
    }

    pub fn validate(&self) -> Vec<Violation> {
        validate(&self.draft)
    }

    /// Normalized snapshot of the draft to send as a job request.
    pub fn to_request(&self) -> JobConfiguration {
        let mut req = self.draft.clone();
        req.script = req.script.trim().to_string();
        req.highlight_player = req
            .highlight_player
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        req.voice_speed = clamp_voice_speed(req.voice_speed);
        req.duration = clamp_duration(f64::from(req.duration));
        req
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        self.draft = JobConfiguration::default();
    }

    fn cycled_label(&self, field: FieldId, delta: i32) -> &'static str {
        let d = &self.draft;
        match field {
            FieldId::VoiceStyle => d.voice_style.cycle(delta).label(),
            FieldId::VoiceTone => d.voice_tone.cycle(delta).label(),
            FieldId::TacticType => d.tactic_type.cycle(delta).label(),
            FieldId::TeamPerspective => d.team_perspective.cycle(delta).label(),
            FieldId::FieldStyle => d.field_style.cycle(delta).label(),
            FieldId::ArrowStyle => d.arrow_style.cycle(delta).label(),
            FieldId::Resolution => d.resolution.cycle(delta).label(),
            FieldId::OutputFormat => d.output_format.cycle(delta).label(),
            _ => "",
        }
    }
}

fn mismatch(field: FieldId, expected: &'static str, value: &FieldValue) -> FieldError {
    FieldError::TypeMismatch {
        field: field.key(),
        expected,
        got: value.type_name(),
    }
}

fn expect_text(field: FieldId, value: FieldValue) -> Result<String, FieldError> {
    match value {
        FieldValue::Text(s) => Ok(s),
        other => Err(mismatch(field, "text", &other)),
    }
}

fn expect_choice<C: Choice>(field: FieldId, value: FieldValue) -> Result<C, FieldError> {
    match value {
        FieldValue::Choice(s) => C::from_label(&s).ok_or(FieldError::UnknownOption {
            field: field.key(),
            value: s,
        }),
        other => Err(mismatch(field, "choice", &other)),
    }
}

fn expect_number(field: FieldId, value: FieldValue) -> Result<f64, FieldError> {
    match value {
        FieldValue::Number(n) if n.is_finite() => Ok(n),
        FieldValue::Number(_) => Err(FieldError::NotFinite { field: field.key() }),
        other => Err(mismatch(field, "number", &other)),
    }
}

fn expect_flag(field: FieldId, value: FieldValue) -> Result<bool, FieldError> {
    match value {
        FieldValue::Flag(b) => Ok(b),
        other => Err(mismatch(field, "flag", &other)),
    }
}
