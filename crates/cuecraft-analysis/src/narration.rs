//! Narration pattern analysis.
//!
//! Narration is scanned with a fixed, ordered table of lexical patterns. Each
//! hit is anchored to the enclosing word's start time, taken from the word
//! timestamps. Repeated words are matched to successive occurrences.

use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

use cuecraft_spec::{MomentKind, MomentSource, SoundMoment, WordTimestamp};
use regex::Regex;
use tracing::debug;

/// Moments closer than this to the previous kept one are deduplicated.
pub const NARRATION_DEDUPE_GAP_FRAMES: u32 = 15;

/// Seconds per word when timing has to be estimated.
pub const DEFAULT_WORD_DURATION: f64 = 0.3;

/// Punctuation stripped from both ends of a word before lookup.
const WORD_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"'];

/// One row of the lexical trigger table.
#[derive(Debug)]
pub struct NarrationPattern {
    /// Table name, shown in moment contexts.
    pub name: &'static str,
    /// Compiled matcher.
    pub regex: Regex,
    /// Kind of moment produced.
    pub kind: MomentKind,
    /// Suggested intensity.
    pub intensity: f64,
    /// Detector confidence.
    pub confidence: f64,
}

/// The trigger table, in match order.
pub fn patterns() -> &'static [NarrationPattern] {
    static PATTERNS: OnceLock<Vec<NarrationPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let rows: [(&str, &str, MomentKind, f64, f64); 8] = [
            (
                "large_number",
                r"(?i)\b(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?[xX%]|\d+\s*(?:billion|million|thousand|hundred))\b",
                MomentKind::Counter,
                0.8,
                0.85,
            ),
            ("multiplier", r"\b(\d+)[xX]\b", MomentKind::Reveal, 0.9, 0.9),
            (
                "problem_word",
                r"(?i)\b(bottleneck|problem|issue|challenge|difficult|slow|inefficient|waste|fail|error)\b",
                MomentKind::Warning,
                0.7,
                0.75,
            ),
            (
                "solution_word",
                r"(?i)\b(solution|solve|key|insight|answer|fix|optimize|improve|faster|better|efficient)\b",
                MomentKind::Success,
                0.8,
                0.8,
            ),
            (
                "revelation_word",
                r"(?i)\b(secret|trick|magic|amazing|incredible|powerful|breakthrough|discover|realize|reveal)\b",
                MomentKind::Reveal,
                0.85,
                0.8,
            ),
            (
                "attention_word",
                r"(?i)\b(watch|look|see|notice|observe|here|now|this)\b",
                MomentKind::Highlight,
                0.6,
                0.6,
            ),
            (
                "emphasis_word",
                r"(?i)\b(important|crucial|critical|essential|key|main|primary)\b",
                MomentKind::Highlight,
                0.7,
                0.7,
            ),
            (
                "transition_word",
                r"(?i)\b(but|however|instead|actually|surprisingly|interestingly)\b",
                MomentKind::Transition,
                0.6,
                0.65,
            ),
        ];
        rows.into_iter()
            .map(|(name, pattern, kind, intensity, confidence)| NarrationPattern {
                name,
                regex: Regex::new(pattern).expect("invalid regex pattern"),
                kind,
                intensity,
                confidence,
            })
            .collect()
    })
}

/// Finds sound moments in narration.
#[derive(Debug, Clone, Copy)]
pub struct NarrationAnalyzer {
    fps: u32,
}

impl NarrationAnalyzer {
    pub fn new(fps: u32) -> Self {
        Self { fps }
    }

    /// Matches the trigger table against `narration`, anchoring each hit to a
    /// word timestamp. Hits whose word has no remaining timestamp are dropped.
    ///
    /// `scene_type` is accepted for context but does not change matching.
    pub fn analyze(
        &self,
        narration: &str,
        timestamps: &[WordTimestamp],
        scene_type: Option<&str>,
    ) -> Vec<SoundMoment> {
        let mut lookup = WordLookup::new(timestamps);
        let mut moments = Vec::new();

        for pattern in patterns() {
            for m in pattern.regex.find_iter(narration) {
                let word = word_at(narration, m.start());
                let Some(timestamp) = lookup.take(&word) else {
                    continue;
                };
                moments.push(
                    SoundMoment::new(
                        pattern.kind,
                        i64::from(timestamp.start_frame_at(self.fps)),
                        pattern.confidence,
                        format!("Narration: '{}' ({})", m.as_str(), pattern.name),
                    )
                    .with_intensity(pattern.intensity)
                    .with_source(MomentSource::Narration),
                );
            }
        }

        let moments = dedupe_nearby(moments, NARRATION_DEDUPE_GAP_FRAMES);
        debug!(
            scene_type = scene_type.unwrap_or(""),
            words = timestamps.len(),
            moments = moments.len(),
            "analyzed narration"
        );
        moments
    }

    /// Analyzes narration with no timing data, using evenly spaced estimates.
    pub fn analyze_text(&self, narration: &str, avg_word_duration: f64) -> Vec<SoundMoment> {
        let timestamps = estimate_word_timestamps(narration, avg_word_duration);
        self.analyze(narration, &timestamps, None)
    }
}

impl Default for NarrationAnalyzer {
    fn default() -> Self {
        Self::new(cuecraft_spec::DEFAULT_FPS)
    }
}

/// Word timestamps queued per normalized word.
struct WordLookup<'a> {
    queues: HashMap<String, VecDeque<&'a WordTimestamp>>,
}

impl<'a> WordLookup<'a> {
    fn new(timestamps: &'a [WordTimestamp]) -> Self {
        let mut queues: HashMap<String, VecDeque<&'a WordTimestamp>> = HashMap::new();
        for ts in timestamps {
            queues.entry(normalize_word(&ts.word)).or_default().push_back(ts);
        }
        Self { queues }
    }

    /// Next unused timestamp for `word`.
    fn take(&mut self, word: &str) -> Option<&'a WordTimestamp> {
        self.queues.get_mut(word).and_then(VecDeque::pop_front)
    }
}

fn normalize_word(word: &str) -> String {
    word.to_lowercase()
        .trim_matches(WORD_PUNCTUATION)
        .to_string()
}

/// The alphanumeric run around byte offset `pos`, lowercased.
fn word_at(text: &str, pos: usize) -> String {
    let start = text[..pos]
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric())
        .last()
        .map_or(pos, |(i, _)| i);
    let end = text[pos..]
        .char_indices()
        .find(|(_, c)| !c.is_alphanumeric())
        .map_or(text.len(), |(i, _)| pos + i);
    text[start..end].to_lowercase()
}

/// Sorts by frame and keeps one moment per `min_gap` neighbourhood.
///
/// A moment too close to the last kept one replaces it only when its
/// confidence is strictly higher.
fn dedupe_nearby(mut moments: Vec<SoundMoment>, min_gap: u32) -> Vec<SoundMoment> {
    moments.sort_by_key(|m| m.frame());

    let mut kept: Vec<SoundMoment> = Vec::with_capacity(moments.len());
    for moment in moments {
        match kept.last_mut() {
            Some(last) if moment.frame() - last.frame() < min_gap => {
                if moment.confidence() > last.confidence() {
                    *last = moment;
                }
            }
            _ => kept.push(moment),
        }
    }
    kept
}

/// Evenly spaced timestamps for narration with no aligner output.
///
/// Words are split on whitespace and stripped of surrounding punctuation;
/// words that strip to nothing take no time.
pub fn estimate_word_timestamps(narration: &str, avg_word_duration: f64) -> Vec<WordTimestamp> {
    let mut current = 0.0;
    narration
        .split_whitespace()
        .map(|w| w.trim_matches(WORD_PUNCTUATION))
        .filter(|w| !w.is_empty())
        .map(|word| {
            let ts = WordTimestamp::new(word, current, current + avg_word_duration);
            current += avg_word_duration;
            ts
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn timed(words: &[(&str, f64, f64)]) -> Vec<WordTimestamp> {
        words
            .iter()
            .map(|(w, s, e)| WordTimestamp::new(*w, *s, *e))
            .collect()
    }

    #[test]
    fn test_multiplier_anchored_to_word() {
        let narration = "This system is 87x faster than the baseline.";
        let timestamps = timed(&[
            ("This", 0.0, 0.3),
            ("system", 0.3, 0.6),
            ("is", 0.6, 0.75),
            ("87x", 0.75, 1.05),
            ("faster", 1.05, 1.35),
            ("than", 1.35, 1.5),
            ("the", 1.5, 1.6),
            ("baseline.", 1.6, 1.9),
        ]);
        let moments = NarrationAnalyzer::new(30).analyze(narration, &timestamps, None);

        let anchored: Vec<&SoundMoment> = moments
            .iter()
            .filter(|m| matches!(m.kind(), MomentKind::Reveal | MomentKind::Counter))
            .filter(|m| m.context().contains("'87x'"))
            .collect();
        assert_eq!(anchored.len(), 1);
        assert_eq!(anchored[0].frame(), 22);
        assert_eq!(anchored[0].source(), MomentSource::Narration);
    }

    #[test]
    fn test_repeated_words_take_successive_timestamps() {
        let timestamps = timed(&[("now", 0.0, 0.2), ("look", 1.0, 1.2), ("now", 2.0, 2.2)]);
        let moments = NarrationAnalyzer::new(30).analyze("now look now", &timestamps, None);
        let frames: Vec<u32> = moments.iter().map(|m| m.frame()).collect();
        assert_eq!(frames, vec![0, 30, 60]);
        assert!(moments.iter().all(|m| m.kind() == MomentKind::Highlight));
    }

    #[test]
    fn test_word_without_timestamp_is_skipped() {
        let timestamps = timed(&[("fine", 0.0, 0.3)]);
        let moments = NarrationAnalyzer::new(30).analyze("a bottleneck", &timestamps, None);
        assert!(moments.is_empty());
    }

    #[test]
    fn test_lookup_strips_punctuation() {
        let timestamps = timed(&[("\"Problem!\"", 2.0, 2.4)]);
        let moments = NarrationAnalyzer::new(30).analyze("\"Problem!\"", &timestamps, None);
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].kind(), MomentKind::Warning);
        assert_eq!(moments[0].frame(), 60);
        assert_eq!(moments[0].context(), "Narration: 'Problem' (problem_word)");
    }

    #[test]
    fn test_frames_use_configured_rate() {
        let timestamps = timed(&[("secret", 1.0, 1.4)]);
        let moments = NarrationAnalyzer::new(60).analyze("secret", &timestamps, None);
        assert_eq!(moments[0].frame(), 60);
    }

    #[test]
    fn test_dedupe_replaces_only_on_higher_confidence() {
        let moments = vec![
            SoundMoment::new(MomentKind::Highlight, 0, 0.6, "a"),
            SoundMoment::new(MomentKind::Reveal, 10, 0.9, "b"),
            SoundMoment::new(MomentKind::Warning, 20, 0.75, "c"),
            SoundMoment::new(MomentKind::Success, 40, 0.8, "d"),
        ];
        let kept = dedupe_nearby(moments, 15);
        let contexts: Vec<&str> = kept.iter().map(|m| m.context()).collect();
        assert_eq!(contexts, vec!["b", "d"]);
    }

    #[test]
    fn test_dedupe_equal_confidence_keeps_first() {
        let moments = vec![
            SoundMoment::new(MomentKind::Highlight, 5, 0.7, "first"),
            SoundMoment::new(MomentKind::Highlight, 10, 0.7, "second"),
        ];
        let kept = dedupe_nearby(moments, 15);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].context(), "first");
    }

    #[test]
    fn test_estimate_word_timestamps() {
        let timestamps = estimate_word_timestamps("Hello, world! ...", 0.3);
        assert_eq!(timestamps.len(), 2);
        assert_eq!(timestamps[0].word, "Hello");
        assert_eq!(timestamps[1].word, "world");
        assert!((timestamps[1].start_seconds - 0.3).abs() < 1e-9);
        assert!((timestamps[1].end_seconds - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_text_estimates_timing() {
        let moments = NarrationAnalyzer::new(30).analyze_text(
            "one two three four five six seven eight however",
            DEFAULT_WORD_DURATION,
        );
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].kind(), MomentKind::Transition);
        assert_eq!(moments[0].frame(), 72);
    }

    #[test]
    fn test_word_at_handles_multibyte_text() {
        let text = "café 87x más";
        let pos = text.find("87x").unwrap();
        assert_eq!(word_at(text, pos), "87x");
        assert_eq!(word_at(text, 2), "café");
    }

    #[test]
    fn test_pattern_table_order() {
        let names: Vec<&str> = patterns().iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "large_number",
                "multiplier",
                "problem_word",
                "solution_word",
                "revelation_word",
                "attention_word",
                "emphasis_word",
                "transition_word",
            ]
        );
    }
}
