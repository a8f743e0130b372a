//! Scene timeline analysis.
//!
//! Scene sources are scanned for a handful of keyframe-expression shapes
//! (interpolations, springs, named frame constants) rather than parsed. Each
//! shape maps to one kind of [`SoundMoment`]:
//!
//! | Shape | Kind | Confidence |
//! |---|---|---|
//! | `opacity: interpolate(frame, [a, b], [0, 1])` | element_appear | 0.9 |
//! | `opacity: interpolate(frame, [a, b], [1, 0])` | element_disappear | 0.8 |
//! | `opacity: interpolate(frame, [x, ...], [v0, ..., vn])` | appear / disappear | 0.85 / 0.75 |
//! | `Math.round(interpolate(frame, [a, b]` | counter | 0.95 |
//! | `width:` / `height: interpolate(frame, [a, b]` | chart_grow | 0.85 |
//! | `const PHASE_2_START = n` | transition | 0.8 |
//! | `spring({ ... frame: frame - n` | element_appear | 0.85 |
//! | `scale(frame, [a, b]` | element_appear | 0.8 |
//! | `boxShadow: \`...rgba(` after `frame > n` | highlight | 0.7 |

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use cuecraft_spec::{MomentKind, SceneAnalysisResult, SoundMoment};
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{AnalysisError, AnalysisResult};

/// Phase constants closer than this to an emitted one are skipped.
const PHASE_DEDUPE_FRAMES: i64 = 15;

/// How far back a glow expression looks for its frame guard, in characters.
const GLOW_LOOKBACK_CHARS: usize = 200;

/// Scene length assumed when the source declares none.
const DEFAULT_DURATION_SECONDS: u32 = 10;

/// Stems never treated as scenes.
const INDEX_STEMS: [&str; 3] = ["index", "Index", "_index"];

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("invalid regex pattern"))
        }
    };
}

static_regex!(
    opacity_fade_in,
    r"(?i)opacity:\s*interpolate\s*\(\s*(?:local)?[fF]rame\s*,\s*\[(\d+)\s*,\s*(\d+)\]\s*,\s*\[0\s*,\s*1\]"
);
static_regex!(
    opacity_fade_out,
    r"(?i)opacity:\s*interpolate\s*\(\s*(?:local)?[fF]rame\s*,\s*\[(\d+)\s*,\s*(\d+)\]\s*,\s*\[1\s*,\s*0\]"
);
static_regex!(
    opacity_generic,
    r"(?i)opacity:\s*interpolate\s*\(\s*(?:local)?[fF]rame\s*,\s*\[([^\]]+)\]\s*,\s*\[([^\]]+)\]"
);
static_regex!(
    counter_animation,
    r"(?i)Math\.(?:round|floor|ceil)\s*\(\s*interpolate\s*\(\s*(?:local)?[fF]rame\s*,\s*\[(\d+)\s*,\s*(\d+)\]"
);
static_regex!(
    width_interpolate,
    r"(?i)width:\s*(?:interpolate|`\$\{interpolate)\s*\(\s*(?:local)?[fF]rame\s*,\s*\[(\d+)\s*,\s*(\d+)\]"
);
static_regex!(
    height_interpolate,
    r"(?i)height:\s*(?:interpolate|`\$\{interpolate)\s*\(\s*(?:local)?[fF]rame\s*,\s*\[(\d+)\s*,\s*(\d+)\]"
);
static_regex!(
    spring_offset,
    r"(?is)spring\s*\(\s*\{[^}]*frame:\s*(?:local)?[fF]rame\s*-?\s*(\d+)?"
);
static_regex!(
    scale_interpolate,
    r"(?i)(?:scale|transform:\s*`scale\()\s*(?:interpolate|`\$\{interpolate)?\s*\(\s*(?:local)?[fF]rame\s*,\s*\[(\d+)\s*,\s*(\d+)\]"
);
static_regex!(
    glow_animation,
    r"(?i)boxShadow:\s*(?:`|').*(?:interpolate|rgb|rgba)"
);
static_regex!(frame_guard, r"(?:local)?[fF]rame\s*[><=]+\s*(\d+)");
static_regex!(const_definition, r"(?i)const\s+(\w+)\s*=\s*(\d+)");

fn duration_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            r"(?i)const\s+(?:TOTAL_)?DURATION\s*=\s*(\d+)",
            r"(?i)durationInFrames\s*[=:]\s*(\d+)",
            r"(?i)const\s+SCENE_DURATION\s*=\s*(\d+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("invalid regex pattern"))
        .collect()
    })
}

/// Named integer constants in declaration order.
///
/// Redefining a name updates its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameConstants {
    entries: Vec<(String, i64)>,
}

impl FrameConstants {
    /// Collects every `const NAME = <digits>` in the source.
    pub fn parse(code: &str) -> Self {
        let mut constants = Self::default();
        for caps in const_definition().captures_iter(code) {
            if let Some(value) = parse_number(&caps[2]) {
                constants.insert(&caps[1], value);
            }
        }
        constants
    }

    fn insert(&mut self, name: &str, value: i64) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Value of a constant.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Iterates `(name, value)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a frame reference: a literal, a constant name, or a name
    /// completed by one of the `Start`/`End`/`_START`/`_END` suffixes.
    pub fn resolve(&self, value: &str) -> Option<i64> {
        if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
            return parse_number(value);
        }
        if let Some(v) = self.get(value) {
            return Some(v);
        }
        ["Start", "End", "_START", "_END"]
            .iter()
            .find_map(|suffix| self.get(&format!("{}{}", value, suffix)))
    }
}

/// Detects sound moments in scene sources.
#[derive(Debug, Clone, Copy)]
pub struct SceneAnalyzer {
    fps: u32,
}

impl SceneAnalyzer {
    pub fn new(fps: u32) -> Self {
        Self { fps }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Analyzes a scene file.
    ///
    /// A missing file yields an empty result noted "Scene file not found";
    /// any other read failure is an error.
    pub fn analyze_scene(&self, path: &Path) -> AnalysisResult<SceneAnalysisResult> {
        let scene_id = file_stem(path);
        let scene_type = scene_type_from_path(path);

        let code = match std::fs::read_to_string(path) {
            Ok(code) => code,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "scene file not found");
                let mut result =
                    SceneAnalysisResult::new(scene_id, scene_type, self.default_duration())
                        .with_note("Scene file not found");
                result.source_file = Some(path.to_path_buf());
                return Ok(result);
            }
            Err(source) => {
                return Err(AnalysisError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut result = self.analyze_source(&code, &scene_id, &scene_type);
        result.source_file = Some(path.to_path_buf());
        Ok(result)
    }

    /// Analyzes scene source text already in memory.
    pub fn analyze_source(
        &self,
        code: &str,
        scene_id: &str,
        scene_type: &str,
    ) -> SceneAnalysisResult {
        let duration = self.estimate_duration(code);
        let mut result = SceneAnalysisResult::new(scene_id, scene_type, duration);
        let constants = FrameConstants::parse(code);

        let moments = &mut result.moments;
        detect_opacity_fades(code, &constants, moments);
        detect_counters(code, moments);
        detect_chart_growth(code, moments);
        detect_phase_transitions(&constants, moments);
        detect_springs(code, moments);
        detect_scales(code, moments);
        detect_glows(code, moments);

        moments.sort_by_key(|m| m.frame());

        debug!(
            scene_id,
            moments = result.moments.len(),
            duration_frames = result.duration_frames,
            "analyzed scene source"
        );
        result
    }

    /// Scene length from the first duration constant found, else ten seconds.
    pub fn estimate_duration(&self, code: &str) -> u32 {
        duration_patterns()
            .iter()
            .find_map(|re| re.captures(code))
            .map(|caps| {
                caps[1]
                    .parse::<u64>()
                    .map_or(u32::MAX, |v| u32::try_from(v).unwrap_or(u32::MAX))
            })
            .unwrap_or_else(|| self.default_duration())
    }

    fn default_duration(&self) -> u32 {
        DEFAULT_DURATION_SECONDS.saturating_mul(self.fps)
    }
}

impl Default for SceneAnalyzer {
    fn default() -> Self {
        Self::new(cuecraft_spec::DEFAULT_FPS)
    }
}

fn parse_number(digits: &str) -> Option<i64> {
    digits.parse().ok()
}

fn code_moment(
    kind: MomentKind,
    frame: i64,
    confidence: f64,
    intensity: f64,
    context: impl Into<String>,
) -> SoundMoment {
    SoundMoment::new(kind, frame, confidence, context).with_intensity(intensity)
}

fn detect_opacity_fades(code: &str, constants: &FrameConstants, out: &mut Vec<SoundMoment>) {
    for caps in opacity_fade_in().captures_iter(code) {
        if let Some(frame) = parse_number(&caps[1]) {
            out.push(code_moment(
                MomentKind::ElementAppear,
                frame,
                0.9,
                0.7,
                "Opacity fade in detected",
            ));
        }
    }

    for caps in opacity_fade_out().captures_iter(code) {
        if let Some(frame) = parse_number(&caps[1]) {
            out.push(code_moment(
                MomentKind::ElementDisappear,
                frame,
                0.8,
                0.5,
                "Opacity fade out detected",
            ));
        }
    }

    for caps in opacity_generic().captures_iter(code) {
        let frames: Vec<&str> = caps[1].split(',').map(str::trim).collect();
        if frames.len() < 2 {
            continue;
        }
        let Some(frame) = constants.resolve(frames[0]) else {
            continue;
        };
        let values: Vec<&str> = caps[2].split(',').map(str::trim).collect();
        if values.len() < 2 {
            continue;
        }
        let first = values[0].parse::<f64>();
        let last = values[values.len() - 1].parse::<f64>();
        let (Ok(from), Ok(to)) = (first, last) else {
            continue;
        };

        let context = format!("Opacity change from {:?} to {:?}", from, to);
        let moment = if from < to {
            code_moment(MomentKind::ElementAppear, frame, 0.85, 0.7, context)
        } else {
            code_moment(MomentKind::ElementDisappear, frame, 0.75, 0.5, context)
        };
        out.push(moment);
    }
}

fn detect_counters(code: &str, out: &mut Vec<SoundMoment>) {
    for caps in counter_animation().captures_iter(code) {
        let (Some(start), Some(end)) = (parse_number(&caps[1]), parse_number(&caps[2])) else {
            continue;
        };
        out.push(
            code_moment(MomentKind::Counter, start, 0.95, 0.8, "Number counter animation")
                .with_duration_frames(end - start),
        );
    }
}

fn detect_chart_growth(code: &str, out: &mut Vec<SoundMoment>) {
    let shapes = [
        (width_interpolate(), "Width animation (bar/chart growth)"),
        (height_interpolate(), "Height animation (bar/chart growth)"),
    ];
    for (re, context) in shapes {
        for caps in re.captures_iter(code) {
            if let Some(frame) = parse_number(&caps[1]) {
                out.push(code_moment(MomentKind::ChartGrow, frame, 0.85, 0.7, context));
            }
        }
    }
}

fn detect_phase_transitions(constants: &FrameConstants, out: &mut Vec<SoundMoment>) {
    let mut phases: Vec<(&str, i64)> = constants
        .iter()
        .filter(|(name, _)| {
            let upper = name.to_uppercase();
            upper.contains("PHASE") || upper.contains("START")
        })
        .collect();
    phases.sort_by_key(|(_, frame)| *frame);

    let mut seen: Vec<i64> = Vec::new();
    for (name, frame) in phases {
        if seen.iter().any(|f| (frame - f).abs() < PHASE_DEDUPE_FRAMES) {
            continue;
        }
        seen.push(frame);
        out.push(code_moment(
            MomentKind::Transition,
            frame,
            0.8,
            0.7,
            format!("Phase transition: {}", name),
        ));
    }
}

fn detect_springs(code: &str, out: &mut Vec<SoundMoment>) {
    for caps in spring_offset().captures_iter(code) {
        let frame = match caps.get(1) {
            Some(offset) => match parse_number(offset.as_str()) {
                Some(frame) => frame,
                None => continue,
            },
            None => 0,
        };
        out.push(code_moment(
            MomentKind::ElementAppear,
            frame,
            0.85,
            0.8,
            "Spring animation (pop-in effect)",
        ));
    }
}

fn detect_scales(code: &str, out: &mut Vec<SoundMoment>) {
    for caps in scale_interpolate().captures_iter(code) {
        if let Some(frame) = parse_number(&caps[1]) {
            out.push(code_moment(MomentKind::ElementAppear, frame, 0.8, 0.75, "Scale animation"));
        }
    }
}

fn detect_glows(code: &str, out: &mut Vec<SoundMoment>) {
    for m in glow_animation().find_iter(code) {
        let before = tail_chars(&code[..m.start()], GLOW_LOOKBACK_CHARS);
        let Some(caps) = frame_guard().captures(before) else {
            continue;
        };
        if let Some(frame) = parse_number(&caps[1]) {
            out.push(code_moment(
                MomentKind::Highlight,
                frame,
                0.7,
                0.6,
                "Glow/highlight animation",
            ));
        }
    }
}

/// The last `n` characters of `s`.
fn tail_chars(s: &str, n: usize) -> &str {
    match s.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) if n > 0 => &s[idx..],
        Some(_) => "",
        None => s,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<project>/<stem>` for `.../scenes/<project>/<stem>.tsx`, else the stem.
pub fn scene_type_from_path(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::RootDir => Some("/".to_string()),
            _ => None,
        })
        .collect();

    if let Some(idx) = parts.iter().position(|p| p == "scenes") {
        if idx + 2 < parts.len() {
            return format!("{}/{}", parts[idx + 1], file_stem(path));
        }
    }
    file_stem(path)
}

/// Scene sources directly under `dir`, skipping index files, sorted.
///
/// A missing directory yields an empty list.
pub fn find_scene_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "tsx"))
        .filter(|p| !INDEX_STEMS.contains(&file_stem(p).as_str()))
        .collect();
    files.sort();
    files
}
