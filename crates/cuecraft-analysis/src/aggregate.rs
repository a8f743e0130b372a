//! Fusion of the code, narration and semantic moment streams.
//!
//! Three passes run in order:
//!
//! 1. **Merge**: frame-sorted moments are grouped while each stays within
//!    `merge_window_frames` of its group's first moment. Each group keeps one
//!    moment, the lexicographic max of `(confidence, source priority,
//!    intensity)`; on a full tie the earliest wins.
//! 2. **Edge buffer**: when the scene length is known, moments closer than
//!    `edge_buffer_frames` to either end are dropped.
//! 3. **Density**: in descending confidence order, a moment is admitted only
//!    if no admitted moment is within `min_gap_frames` and fewer than
//!    `max_per_second` admitted moments lie within `fps / 2` frames of it.
//!
//! Merging first means density limits bound distinct events rather than the
//! same event reported by several sources.

use std::collections::BTreeMap;

use cuecraft_spec::{AggregationConfig, MomentKind, SoundMoment};
use serde::Serialize;
use tracing::debug;

/// Same-kind moments closer than this collapse in [`dedupe_consecutive_kinds`].
pub const SAME_KIND_GAP_FRAMES: u32 = 20;

/// Fuses the three moment streams into one frame-sorted list.
///
/// `scene_duration_frames` of `None` or `Some(0)` disables the edge buffer.
pub fn aggregate_moments(
    code: &[SoundMoment],
    narration: &[SoundMoment],
    semantic: &[SoundMoment],
    config: &AggregationConfig,
    scene_duration_frames: Option<u32>,
    fps: u32,
) -> Vec<SoundMoment> {
    let mut all: Vec<SoundMoment> = code
        .iter()
        .chain(narration)
        .chain(semantic)
        .cloned()
        .collect();
    if all.is_empty() {
        return all;
    }
    all.sort_by_key(|m| m.frame());
    let input = all.len();

    let merged = merge_nearby(all, config);
    let merged_count = merged.len();

    let trimmed = match scene_duration_frames.filter(|d| *d > 0) {
        Some(duration) => apply_edge_buffer(merged, config.edge_buffer_frames, duration),
        None => merged,
    };
    let trimmed_count = trimmed.len();

    let admitted = enforce_density(trimmed, config, fps);
    debug!(
        input,
        merged = merged_count,
        trimmed = trimmed_count,
        admitted = admitted.len(),
        "aggregated moments"
    );
    admitted
}

fn merge_nearby(sorted: Vec<SoundMoment>, config: &AggregationConfig) -> Vec<SoundMoment> {
    let mut merged = Vec::new();
    let mut group: Vec<SoundMoment> = Vec::new();

    for moment in sorted {
        let starts_new_group = group
            .first()
            .is_some_and(|first| moment.frame() - first.frame() > config.merge_window_frames);
        if starts_new_group {
            merged.extend(select_best(std::mem::take(&mut group), config));
        }
        group.push(moment);
    }
    merged.extend(select_best(group, config));
    merged
}

fn select_best(group: Vec<SoundMoment>, config: &AggregationConfig) -> Option<SoundMoment> {
    let score = |m: &SoundMoment| (m.confidence(), config.priority(m.source()), m.intensity());

    let mut iter = group.into_iter();
    let mut best = iter.next()?;
    for candidate in iter {
        if score(&candidate) > score(&best) {
            best = candidate;
        }
    }
    Some(best)
}

fn apply_edge_buffer(moments: Vec<SoundMoment>, buffer: u32, duration: u32) -> Vec<SoundMoment> {
    let last_allowed = i64::from(duration) - i64::from(buffer);
    moments
        .into_iter()
        .filter(|m| m.frame() >= buffer && i64::from(m.frame()) <= last_allowed)
        .collect()
}

fn enforce_density(
    mut moments: Vec<SoundMoment>,
    config: &AggregationConfig,
    fps: u32,
) -> Vec<SoundMoment> {
    moments.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));

    let half_window = i64::from(fps / 2);
    let min_gap = i64::from(config.min_gap_frames);
    let mut admitted: Vec<SoundMoment> = Vec::with_capacity(moments.len());

    for moment in moments {
        let frame = i64::from(moment.frame());

        let too_close = admitted
            .iter()
            .any(|a| (i64::from(a.frame()) - frame).abs() < min_gap);
        if too_close {
            continue;
        }

        let window = (frame - half_window)..=(frame + half_window);
        let in_window = admitted
            .iter()
            .filter(|a| window.contains(&i64::from(a.frame())))
            .count();
        if in_window as f64 >= config.max_per_second {
            continue;
        }

        admitted.push(moment);
    }

    admitted.sort_by_key(|m| m.frame());
    admitted
}

/// Drops a moment when the previous kept moment has the same kind and is
/// fewer than 20 frames earlier. Expects frame-sorted input.
pub fn dedupe_consecutive_kinds(moments: &[SoundMoment]) -> Vec<SoundMoment> {
    let mut kept: Vec<SoundMoment> = Vec::with_capacity(moments.len());
    for moment in moments {
        let repeat = kept.last().is_some_and(|prev| {
            let gap = i64::from(moment.frame()) - i64::from(prev.frame());
            prev.kind() == moment.kind() && gap < i64::from(SAME_KIND_GAP_FRAMES)
        });
        if !repeat {
            kept.push(moment.clone());
        }
    }
    kept
}

/// Moments keyed by the whole second they fall in.
pub fn group_by_second(moments: &[SoundMoment], fps: u32) -> BTreeMap<u32, Vec<SoundMoment>> {
    let fps = fps.max(1);
    let mut groups: BTreeMap<u32, Vec<SoundMoment>> = BTreeMap::new();
    for moment in moments {
        groups
            .entry(moment.frame() / fps)
            .or_default()
            .push(moment.clone());
    }
    groups
}

/// Summary statistics of a moment list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityReport {
    pub total_moments: usize,
    /// Moments per second over the span up to the last occupied second.
    pub avg_per_second: f64,
    /// Most moments in any one whole second.
    pub max_per_second: usize,
    /// Smallest gap between neighbouring moments; `None` for fewer than two.
    pub min_gap_frames: Option<u32>,
    pub kind_distribution: BTreeMap<MomentKind, usize>,
}

impl DensityReport {
    pub fn from_moments(moments: &[SoundMoment], fps: u32) -> Self {
        if moments.is_empty() {
            return Self {
                total_moments: 0,
                avg_per_second: 0.0,
                max_per_second: 0,
                min_gap_frames: None,
                kind_distribution: BTreeMap::new(),
            };
        }

        let by_second = group_by_second(moments, fps);
        let span_seconds = by_second.keys().next_back().map_or(1, |last| last + 1);
        let max_per_second = by_second.values().map(Vec::len).max().unwrap_or(0);

        let mut frames: Vec<u32> = moments.iter().map(|m| m.frame()).collect();
        frames.sort_unstable();
        let min_gap_frames = frames.windows(2).map(|w| w[1] - w[0]).min();

        let mut kind_distribution = BTreeMap::new();
        for m in moments {
            *kind_distribution.entry(m.kind()).or_insert(0) += 1;
        }

        Self {
            total_moments: moments.len(),
            avg_per_second: moments.len() as f64 / f64::from(span_seconds),
            max_per_second,
            min_gap_frames,
            kind_distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuecraft_spec::MomentSource;
    use pretty_assertions::assert_eq;

    fn moment(frame: i64, confidence: f64, source: MomentSource) -> SoundMoment {
        SoundMoment::new(MomentKind::ElementAppear, frame, confidence, format!("{}", frame))
            .with_source(source)
    }

    fn frames(moments: &[SoundMoment]) -> Vec<u32> {
        moments.iter().map(|m| m.frame()).collect()
    }

    #[test]
    fn test_merge_tie_break_prefers_code() {
        let narration = [moment(10, 0.9, MomentSource::Narration)];
        let code = [moment(12, 0.9, MomentSource::Code)];
        let out =
            aggregate_moments(&code, &narration, &[], &AggregationConfig::default(), None, 30);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source(), MomentSource::Code);
        assert_eq!(out[0].frame(), 12);
    }

    #[test]
    fn test_merge_prefers_confidence_over_source() {
        let code = [moment(40, 0.7, MomentSource::Code)];
        let semantic = [moment(45, 0.8, MomentSource::Llm)];
        let out = aggregate_moments(&code, &[], &semantic, &AggregationConfig::default(), None, 30);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source(), MomentSource::Llm);
    }

    #[test]
    fn test_merge_uses_intensity_last() {
        let a = moment(40, 0.8, MomentSource::Code).with_intensity(0.5);
        let b = moment(42, 0.8, MomentSource::Code).with_intensity(0.9);
        let out = aggregate_moments(&[a, b], &[], &[], &AggregationConfig::default(), None, 30);
        assert_eq!(frames(&out), vec![42]);
    }

    #[test]
    fn test_merge_full_tie_keeps_earliest() {
        let a = moment(40, 0.8, MomentSource::Code);
        let b = moment(45, 0.8, MomentSource::Code);
        let out = aggregate_moments(&[a, b], &[], &[], &AggregationConfig::default(), None, 30);
        assert_eq!(frames(&out), vec![40]);
    }

    #[test]
    fn test_merge_window_anchors_on_group_start() {
        let config = AggregationConfig {
            min_gap_frames: 0,
            ..Default::default()
        };
        let moments = [
            moment(100, 0.9, MomentSource::Code),
            moment(108, 0.5, MomentSource::Code),
            moment(115, 0.6, MomentSource::Code),
        ];
        let out = aggregate_moments(&moments, &[], &[], &config, None, 30);
        assert_eq!(frames(&out), vec![100, 115]);
    }

    #[test]
    fn test_edge_buffer_boundaries() {
        let config = AggregationConfig::default();
        let low = [moment(14, 0.9, MomentSource::Code)];
        assert!(aggregate_moments(&low, &[], &[], &config, Some(300), 30).is_empty());

        let at = [moment(15, 0.9, MomentSource::Code)];
        assert_eq!(frames(&aggregate_moments(&at, &[], &[], &config, Some(300), 30)), vec![15]);

        let end = [moment(285, 0.9, MomentSource::Code)];
        assert_eq!(frames(&aggregate_moments(&end, &[], &[], &config, Some(300), 30)), vec![285]);

        let past = [moment(286, 0.9, MomentSource::Code)];
        assert!(aggregate_moments(&past, &[], &[], &config, Some(300), 30).is_empty());
    }

    #[test]
    fn test_edge_buffer_skipped_without_duration() {
        let config = AggregationConfig::default();
        let early = [moment(2, 0.9, MomentSource::Code)];
        assert_eq!(frames(&aggregate_moments(&early, &[], &[], &config, None, 30)), vec![2]);
        assert_eq!(frames(&aggregate_moments(&early, &[], &[], &config, Some(0), 30)), vec![2]);
    }

    #[test]
    fn test_short_scene_drops_everything() {
        let config = AggregationConfig::default();
        let m = [moment(20, 0.9, MomentSource::Code)];
        assert!(aggregate_moments(&m, &[], &[], &config, Some(20), 30).is_empty());
    }

    #[test]
    fn test_dense_cluster_is_thinned() {
        let config = AggregationConfig {
            max_per_second: 2.0,
            min_gap_frames: 10,
            ..Default::default()
        };
        let moments: Vec<SoundMoment> = (0..10)
            .map(|i| moment(100 + i * 5, 0.8, MomentSource::Code))
            .collect();
        let out = aggregate_moments(&moments, &[], &[], &config, None, 30);
        assert!(out.len() < 10);
    }

    #[test]
    fn test_density_prefers_confidence() {
        let config = AggregationConfig {
            merge_window_frames: 0,
            min_gap_frames: 10,
            ..Default::default()
        };
        let moments = [
            moment(100, 0.6, MomentSource::Code),
            moment(105, 0.95, MomentSource::Code),
        ];
        let out = aggregate_moments(&moments, &[], &[], &config, None, 30);
        assert_eq!(frames(&out), vec![105]);
    }

    #[test]
    fn test_density_caps_per_second() {
        let config = AggregationConfig {
            merge_window_frames: 0,
            min_gap_frames: 1,
            max_per_second: 2.0,
            ..Default::default()
        };
        let moments = [
            moment(100, 0.9, MomentSource::Code),
            moment(104, 0.8, MomentSource::Code),
            moment(108, 0.7, MomentSource::Code),
            moment(200, 0.6, MomentSource::Code),
        ];
        let out = aggregate_moments(&moments, &[], &[], &config, None, 30);
        assert_eq!(frames(&out), vec![100, 104, 200]);
    }

    #[test]
    fn test_empty_input() {
        let out = aggregate_moments(&[], &[], &[], &AggregationConfig::default(), Some(300), 30);
        assert!(out.is_empty());
    }

    #[test]
    fn test_dedupe_consecutive_kinds() {
        let moments = vec![
            SoundMoment::new(MomentKind::Highlight, 0, 0.6, "a"),
            SoundMoment::new(MomentKind::Highlight, 19, 0.6, "b"),
            SoundMoment::new(MomentKind::Reveal, 25, 0.6, "c"),
            SoundMoment::new(MomentKind::Reveal, 45, 0.6, "d"),
        ];
        let kept = dedupe_consecutive_kinds(&moments);
        let contexts: Vec<&str> = kept.iter().map(|m| m.context()).collect();
        assert_eq!(contexts, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_group_by_second() {
        let moments = [
            moment(0, 0.5, MomentSource::Code),
            moment(29, 0.5, MomentSource::Code),
            moment(30, 0.5, MomentSource::Code),
            moment(95, 0.5, MomentSource::Code),
        ];
        let groups = group_by_second(&moments, 30);
        let sizes: Vec<(u32, usize)> = groups.iter().map(|(s, v)| (*s, v.len())).collect();
        assert_eq!(sizes, vec![(0, 2), (1, 1), (3, 1)]);
    }

    #[test]
    fn test_density_report() {
        let moments = [
            SoundMoment::new(MomentKind::Reveal, 0, 0.5, ""),
            SoundMoment::new(MomentKind::Reveal, 12, 0.5, ""),
            SoundMoment::new(MomentKind::Warning, 90, 0.5, ""),
        ];
        let report = DensityReport::from_moments(&moments, 30);
        assert_eq!(report.total_moments, 3);
        assert_eq!(report.avg_per_second, 0.75);
        assert_eq!(report.max_per_second, 2);
        assert_eq!(report.min_gap_frames, Some(12));
        assert_eq!(report.kind_distribution.get(&MomentKind::Reveal), Some(&2));
        assert_eq!(report.kind_distribution.get(&MomentKind::Warning), Some(&1));
    }

    #[test]
    fn test_density_report_empty_and_single() {
        let empty = DensityReport::from_moments(&[], 30);
        assert_eq!(empty.total_moments, 0);
        assert_eq!(empty.min_gap_frames, None);

        let single = DensityReport::from_moments(&[moment(45, 0.5, MomentSource::Code)], 30);
        assert_eq!(single.min_gap_frames, None);
        assert_eq!(single.avg_per_second, 0.5);
    }
}
