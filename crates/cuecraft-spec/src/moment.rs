//! Sound moments: candidate instants in a scene worth sounding.

use serde::{Deserialize, Serialize};

/// Intensity used when a detector does not suggest one.
pub const DEFAULT_INTENSITY: f64 = 0.7;

/// The kind of event a moment marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentKind {
    /// An element fades, scales or springs into view.
    ElementAppear,
    /// An element fades out.
    ElementDisappear,
    /// Text appears character by character or word by word.
    TextReveal,
    /// A key insight or big number lands.
    Reveal,
    /// A number counts up.
    Counter,
    /// A phase or section change.
    Transition,
    /// A problem is shown.
    Warning,
    /// A solution is shown.
    Success,
    /// Something snaps into place.
    Lock,
    /// Data moves between elements.
    DataFlow,
    /// Two elements get connected.
    Connection,
    /// An element is emphasised.
    Highlight,
    /// A bar or chart grows.
    ChartGrow,
    /// A pulsing or looping accent.
    Pulse,
}

impl MomentKind {
    /// Returns the kind as its snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            MomentKind::ElementAppear => "element_appear",
            MomentKind::ElementDisappear => "element_disappear",
            MomentKind::TextReveal => "text_reveal",
            MomentKind::Reveal => "reveal",
            MomentKind::Counter => "counter",
            MomentKind::Transition => "transition",
            MomentKind::Warning => "warning",
            MomentKind::Success => "success",
            MomentKind::Lock => "lock",
            MomentKind::DataFlow => "data_flow",
            MomentKind::Connection => "connection",
            MomentKind::Highlight => "highlight",
            MomentKind::ChartGrow => "chart_grow",
            MomentKind::Pulse => "pulse",
        }
    }

    /// Returns all moment kinds.
    pub fn all() -> &'static [MomentKind] {
        &[
            MomentKind::ElementAppear,
            MomentKind::ElementDisappear,
            MomentKind::TextReveal,
            MomentKind::Reveal,
            MomentKind::Counter,
            MomentKind::Transition,
            MomentKind::Warning,
            MomentKind::Success,
            MomentKind::Lock,
            MomentKind::DataFlow,
            MomentKind::Connection,
            MomentKind::Highlight,
            MomentKind::ChartGrow,
            MomentKind::Pulse,
        ]
    }

    /// Base cue volume before intensity scaling.
    ///
    /// These stay well under the cue ceiling so narration always dominates.
    pub fn base_volume(&self) -> f64 {
        match self {
            MomentKind::ElementAppear => 0.08,
            MomentKind::ElementDisappear => 0.06,
            MomentKind::TextReveal => 0.05,
            MomentKind::Reveal => 0.12,
            MomentKind::Counter => 0.10,
            MomentKind::Transition => 0.08,
            MomentKind::Warning => 0.10,
            MomentKind::Success => 0.10,
            MomentKind::Lock => 0.08,
            MomentKind::DataFlow => 0.08,
            MomentKind::Connection => 0.08,
            MomentKind::Highlight => 0.07,
            MomentKind::ChartGrow => 0.08,
            MomentKind::Pulse => 0.07,
        }
    }

    /// Name of the pre-rendered library sound used in library mode.
    pub fn library_sound(&self) -> &'static str {
        match self {
            MomentKind::ElementAppear
            | MomentKind::ElementDisappear
            | MomentKind::Highlight
            | MomentKind::Pulse => "ui_pop",
            MomentKind::TextReveal => "text_tick",
            MomentKind::Reveal => "reveal_hit",
            MomentKind::Counter | MomentKind::ChartGrow => "counter_sweep",
            MomentKind::Transition => "transition_whoosh",
            MomentKind::Warning => "warning_tone",
            MomentKind::Success => "success_tone",
            MomentKind::Lock | MomentKind::Connection => "lock_click",
            MomentKind::DataFlow => "data_flow",
        }
    }

    /// Name of the catalog generator used to synthesize a custom cue.
    pub fn custom_generator(&self) -> &'static str {
        match self {
            MomentKind::ElementAppear | MomentKind::ElementDisappear | MomentKind::Pulse => {
                "ui_pop"
            }
            MomentKind::Highlight => "cache_click",
            MomentKind::TextReveal => "text_tick",
            MomentKind::Reveal => "reveal_hit",
            MomentKind::Counter => "counter_sweep",
            MomentKind::ChartGrow => "bar_grow",
            MomentKind::Transition => "transition_whoosh",
            MomentKind::Warning => "warning_tone",
            MomentKind::Success => "success_tone",
            MomentKind::Lock | MomentKind::Connection => "lock_click",
            MomentKind::DataFlow => "data_flow",
        }
    }

    /// Base duration in seconds for a synthesized cue of this kind.
    pub fn base_duration_seconds(&self) -> f64 {
        match self {
            MomentKind::ElementAppear => 0.15,
            MomentKind::ElementDisappear => 0.12,
            MomentKind::TextReveal => 0.05,
            MomentKind::Reveal => 0.5,
            MomentKind::Counter => 0.3,
            MomentKind::Transition => 0.35,
            MomentKind::Warning => 0.4,
            MomentKind::Success => 0.35,
            MomentKind::Lock => 0.12,
            MomentKind::DataFlow => 0.4,
            MomentKind::Connection => 0.15,
            MomentKind::Highlight => 0.1,
            MomentKind::ChartGrow => 0.3,
            MomentKind::Pulse => 0.15,
        }
    }
}

impl std::fmt::Display for MomentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MomentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MomentKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown moment kind: {}", s))
    }
}

/// Which analyzer produced a moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentSource {
    /// Static analysis of the scene's animation timeline.
    Code,
    /// Lexical patterns in the narration.
    Narration,
    /// The external semantic analyzer.
    Llm,
}

impl MomentSource {
    /// Returns the source as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MomentSource::Code => "code",
            MomentSource::Narration => "narration",
            MomentSource::Llm => "llm",
        }
    }
}

impl std::fmt::Display for MomentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate sound-worthy instant in a scene.
///
/// Moments are immutable once built. Frame, confidence and intensity are
/// corrected at construction, so every moment in flight satisfies
/// `frame >= 0` and `confidence, intensity in [0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundMoment {
    kind: MomentKind,
    frame: u32,
    confidence: f64,
    intensity: f64,
    context: String,
    source: MomentSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_frames: Option<u32>,
}

impl SoundMoment {
    /// Creates a code-sourced moment with default intensity.
    ///
    /// `frame` is signed so callers can pass raw arithmetic results; negative
    /// values become frame 0.
    pub fn new(kind: MomentKind, frame: i64, confidence: f64, context: impl Into<String>) -> Self {
        Self {
            kind,
            frame: clamp_frame(frame),
            confidence: clamp_unit(confidence),
            intensity: DEFAULT_INTENSITY,
            context: context.into(),
            source: MomentSource::Code,
            duration_frames: None,
        }
    }

    /// Sets the intensity (clamped to `[0, 1]`).
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = clamp_unit(intensity);
        self
    }

    /// Sets the producing analyzer.
    pub fn with_source(mut self, source: MomentSource) -> Self {
        self.source = source;
        self
    }

    /// Sets a sustain length in frames. Negative lengths are dropped.
    pub fn with_duration_frames(mut self, duration: i64) -> Self {
        self.duration_frames = u32::try_from(duration).ok();
        self
    }

    pub fn kind(&self) -> MomentKind {
        self.kind
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn source(&self) -> MomentSource {
        self.source
    }

    pub fn duration_frames(&self) -> Option<u32> {
        self.duration_frames
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn clamp_frame(frame: i64) -> u32 {
    frame.clamp(0, u32::MAX as i64) as u32
}
