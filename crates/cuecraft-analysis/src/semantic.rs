//! Semantic analysis boundary.
//!
//! An external text-generation model proposes moments from scene context.
//! This module builds its prompt, runs it through a [`SemanticClient`], and
//! validates and bounds whatever comes back. Any failure degrades to an empty
//! moment list.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use cuecraft_spec::{MomentKind, MomentSource, SemanticConfig, SoundMoment};
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{AnalysisError, AnalysisResult};

/// Confidence given to every model-proposed moment.
pub const SEMANTIC_CONFIDENCE: f64 = 0.7;

/// Intensity bounds applied to model-proposed moments.
pub const MIN_SEMANTIC_INTENSITY: f64 = 0.3;
pub const MAX_SEMANTIC_INTENSITY: f64 = 1.0;

/// Kinds a model may propose; anything else becomes `element_appear`.
pub const ACCEPTED_KINDS: [MomentKind; 11] = [
    MomentKind::ElementAppear,
    MomentKind::Reveal,
    MomentKind::Transition,
    MomentKind::Counter,
    MomentKind::Warning,
    MomentKind::Success,
    MomentKind::Highlight,
    MomentKind::DataFlow,
    MomentKind::TextReveal,
    MomentKind::Lock,
    MomentKind::Connection,
];

/// Scene context handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticRequest {
    pub scene_id: String,
    pub scene_type: String,
    pub narration: String,
    /// Visual element descriptions, if known.
    pub elements: Vec<String>,
    pub duration_seconds: f64,
}

impl SemanticRequest {
    pub fn new(
        scene_id: impl Into<String>,
        scene_type: impl Into<String>,
        narration: impl Into<String>,
        duration_seconds: f64,
    ) -> Self {
        Self {
            scene_id: scene_id.into(),
            scene_type: scene_type.into(),
            narration: narration.into(),
            elements: Vec::new(),
            duration_seconds,
        }
    }

    pub fn with_elements(mut self, elements: Vec<String>) -> Self {
        self.elements = elements;
        self
    }
}

/// Something that answers a prompt with text.
pub trait SemanticClient: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Returns the raw reply to `prompt`.
    fn complete(&self, request: &SemanticRequest, prompt: &str) -> AnalysisResult<String>;
}

/// Runs an external command, writing the prompt to its stdin and reading the
/// reply from its stdout.
#[derive(Debug, Clone)]
pub struct CommandClient {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandClient {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_secs(60),
        }
    }

    /// Builds a client from a full argv; `None` when it is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    /// Sets the wall-clock bound on one call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl SemanticClient for CommandClient {
    fn name(&self) -> &str {
        &self.program
    }

    fn complete(&self, _request: &SemanticRequest, prompt: &str) -> AnalysisResult<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AnalysisError::command(format!("failed to spawn '{}': {}", self.program, e))
            })?;

        // Feed and drain every pipe on helper threads so a chatty child cannot
        // block on a full buffer.
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_string();
            std::thread::spawn(move || {
                let _ = stdin.write_all(prompt.as_bytes());
            })
        });
        let reader = child.stdout.take().map(|mut stdout| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                stdout.read_to_string(&mut buf).map(|_| buf)
            })
        });
        let err_reader = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        let status = wait_with_timeout(&mut child, self.timeout)?;

        if let Some(writer) = writer {
            let _ = writer.join();
        }
        let stdout = match reader {
            Some(reader) => reader
                .join()
                .map_err(|_| AnalysisError::command("stdout reader panicked"))?
                .map_err(|e| AnalysisError::command(format!("failed to read stdout: {}", e)))?,
            None => String::new(),
        };
        let stderr = err_reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(AnalysisError::command(format!(
                "'{}' exited with {}: {}",
                self.program,
                status,
                stderr.trim()
            )));
        }

        Ok(stdout)
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> AnalysisResult<ExitStatus> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(AnalysisError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(AnalysisError::command(format!("failed to wait: {}", e))),
        }
    }
}

/// Offline stand-in for a model: an opening appear, a mid-scene beat chosen
/// from the scene type, and a closing reveal for scenes longer than 5 s.
///
/// Replies in the same JSON shape a model would, so its output goes through
/// the same validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClient;

impl SemanticClient for HeuristicClient {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn complete(&self, request: &SemanticRequest, _prompt: &str) -> AnalysisResult<String> {
        let duration = request.duration_seconds;
        let scene_type = request.scene_type.to_lowercase();

        let mut items = vec![json!({
            "timestamp_seconds": 0.5,
            "type": "element_appear",
            "intensity": 0.7,
            "context": "Scene opening",
        })];

        let (kind, intensity, context) =
            if scene_type.contains("problem") || scene_type.contains("bottleneck") {
                ("warning", 0.8, "Problem visualization")
            } else if scene_type.contains("solution") || scene_type.contains("result") {
                ("success", 0.8, "Solution reveal")
            } else {
                ("transition", 0.7, "Key moment")
            };
        items.push(json!({
            "timestamp_seconds": duration / 2.0,
            "type": kind,
            "intensity": intensity,
            "context": context,
        }));

        if duration > 5.0 {
            items.push(json!({
                "timestamp_seconds": duration - 1.0,
                "type": "reveal",
                "intensity": 0.75,
                "context": "Scene conclusion",
            }));
        }

        serde_json::to_string(&items).map_err(|e| AnalysisError::malformed(e.to_string()))
    }
}

/// Picks the client a config asks for: its command when one is set,
/// otherwise the heuristic.
pub fn client_from_config(config: &SemanticConfig) -> Box<dyn SemanticClient> {
    match CommandClient::from_argv(&config.command) {
        Some(client) => Box::new(client.timeout(Duration::from_secs(config.timeout_secs))),
        None => Box::new(HeuristicClient),
    }
}

/// The prompt sent to the model.
pub fn build_prompt(request: &SemanticRequest) -> String {
    let elements = if request.elements.is_empty() {
        "Not specified".to_string()
    } else {
        request.elements.join(", ")
    };
    let duration = request.duration_seconds;

    format!(
        "Analyze this video scene for sound design opportunities.

Scene ID: {scene_id}
Scene Type: {scene_type}
Narration: {narration}
Visual Elements: {elements}
Scene Duration: {duration:.1} seconds

Identify 3-8 moments that would benefit from subtle sound effects. For each moment:
- timestamp_seconds: When in the scene (0 to {duration:.1})
- type: One of [element_appear, reveal, transition, counter, warning, success, highlight, data_flow]
- intensity: 0.3 (very subtle) to 1.0 (emphatic)
- context: Brief description of what's happening

Guidelines:
- Keep sounds subtle and non-distracting (max 3 per 10 seconds)
- Prioritize key narrative moments over minor visual changes
- Match sound type to the emotional tone (warning for problems, success for solutions)
- Space sounds at least 0.5 seconds apart

Return as JSON array only:
[
  {{\"timestamp_seconds\": 2.5, \"type\": \"element_appear\", \"intensity\": 0.6, \"context\": \"Main diagram appears\"}},
  ...
]",
        scene_id = request.scene_id,
        scene_type = request.scene_type,
        narration = request.narration,
    )
}

fn json_array() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[\s\S]*\]").expect("invalid regex pattern"))
}

/// Parses a model reply into moments, before gap and count limits.
///
/// The outermost `[...]` span is read as a JSON array. Entries that are not
/// objects, lack numeric fields, or fall outside `[0, duration]` are
/// skipped.
pub fn parse_response(
    response: &str,
    duration_seconds: f64,
    fps: u32,
) -> AnalysisResult<Vec<SoundMoment>> {
    let span = json_array()
        .find(response)
        .ok_or_else(|| AnalysisError::malformed("no JSON array in response"))?;
    let items: Vec<Value> = serde_json::from_str(span.as_str())
        .map_err(|e| AnalysisError::malformed(e.to_string()))?;

    let mut moments = Vec::with_capacity(items.len());
    for item in &items {
        let Some(obj) = item.as_object() else {
            continue;
        };

        let timestamp = match obj.get("timestamp_seconds") {
            None => 0.0,
            Some(v) => match v.as_f64() {
                Some(t) => t,
                None => continue,
            },
        };
        let intensity = match obj.get("intensity") {
            None => cuecraft_spec::DEFAULT_INTENSITY,
            Some(v) => match v.as_f64() {
                Some(i) => i,
                None => continue,
            },
        };
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<MomentKind>().ok())
            .filter(|k| ACCEPTED_KINDS.contains(k))
            .unwrap_or(MomentKind::ElementAppear);
        let context = match obj.get("context") {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        if !(0.0..=duration_seconds).contains(&timestamp) {
            continue;
        }

        let frame = (timestamp * fps as f64) as i64;
        moments.push(
            SoundMoment::new(kind, frame, SEMANTIC_CONFIDENCE, context)
                .with_intensity(intensity.clamp(MIN_SEMANTIC_INTENSITY, MAX_SEMANTIC_INTENSITY))
                .with_source(MomentSource::Llm),
        );
    }
    Ok(moments)
}

/// Validates and bounds model-proposed moments.
#[derive(Debug, Clone, Copy)]
pub struct SemanticAnalyzer {
    fps: u32,
    max_moments: usize,
    min_gap_seconds: f64,
}

impl SemanticAnalyzer {
    pub fn new(fps: u32) -> Self {
        Self::from_config(&SemanticConfig::default(), fps)
    }

    pub fn from_config(config: &SemanticConfig, fps: u32) -> Self {
        Self {
            fps,
            max_moments: config.max_moments,
            min_gap_seconds: config.min_gap_seconds,
        }
    }

    /// Smallest frame gap between kept moments.
    pub fn min_gap_frames(&self) -> u32 {
        (self.min_gap_seconds * self.fps as f64) as u32
    }

    /// Asks `client` for moments. Never fails: errors are logged and yield
    /// an empty list.
    pub fn analyze(
        &self,
        client: &dyn SemanticClient,
        request: &SemanticRequest,
    ) -> Vec<SoundMoment> {
        let prompt = build_prompt(request);
        let parsed = client
            .complete(request, &prompt)
            .and_then(|reply| parse_response(&reply, request.duration_seconds, self.fps));

        match parsed {
            Ok(moments) => {
                let moments = self.apply_constraints(moments);
                debug!(
                    scene_id = %request.scene_id,
                    client = client.name(),
                    moments = moments.len(),
                    "semantic analysis complete"
                );
                moments
            }
            Err(e) => {
                warn!(
                    scene_id = %request.scene_id,
                    client = client.name(),
                    error = %e,
                    "semantic analysis failed, continuing without it"
                );
                Vec::new()
            }
        }
    }

    /// Enforces the minimum gap (earliest wins), then caps the count by
    /// dropping the lowest-intensity moments.
    pub fn apply_constraints(&self, mut moments: Vec<SoundMoment>) -> Vec<SoundMoment> {
        moments.sort_by_key(|m| m.frame());

        let min_gap = self.min_gap_frames();
        let mut kept: Vec<SoundMoment> = Vec::with_capacity(moments.len());
        for moment in moments {
            let far_enough = kept
                .last()
                .map_or(true, |last| moment.frame() - last.frame() >= min_gap);
            if far_enough {
                kept.push(moment);
            }
        }

        if kept.len() > self.max_moments {
            kept.sort_by(|a, b| b.intensity().total_cmp(&a.intensity()));
            kept.truncate(self.max_moments);
            kept.sort_by_key(|m| m.frame());
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Canned(AnalysisResult<String>);

    impl SemanticClient for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn complete(&self, _request: &SemanticRequest, _prompt: &str) -> AnalysisResult<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(AnalysisError::Timeout { timeout_secs: 1 }),
            }
        }
    }

    fn request(duration: f64) -> SemanticRequest {
        SemanticRequest::new("intro", "demo/intro", "Watch this.", duration)
    }

    #[test]
    fn test_prompt_contents() {
        let prompt = build_prompt(&request(12.0));
        assert!(prompt.starts_with("Analyze this video scene for sound design opportunities."));
        assert!(prompt.contains("Scene ID: intro"));
        assert!(prompt.contains("Visual Elements: Not specified"));
        assert!(prompt.contains("Scene Duration: 12.0 seconds"));
        assert!(prompt.contains("(0 to 12.0)"));
        assert!(prompt.contains(r#"{"timestamp_seconds": 2.5,"#));

        let with_elements =
            build_prompt(&request(3.0).with_elements(vec!["chart".into(), "logo".into()]));
        assert!(with_elements.contains("Visual Elements: chart, logo"));
    }

    #[test]
    fn test_parse_extracts_array_from_prose() {
        let reply = r#"Sure! Here you go:
[{"timestamp_seconds": 1.0, "type": "reveal", "intensity": 0.9, "context": "Big number"}]
Hope that helps."#;
        let moments = parse_response(reply, 10.0, 30).unwrap();
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].kind(), MomentKind::Reveal);
        assert_eq!(moments[0].frame(), 30);
        assert_eq!(moments[0].confidence(), 0.7);
        assert_eq!(moments[0].source(), MomentSource::Llm);
        assert_eq!(moments[0].context(), "Big number");
    }

    #[test]
    fn test_parse_validates_fields() {
        let reply = r#"[
            {"timestamp_seconds": -1.0, "type": "reveal"},
            {"timestamp_seconds": 11.0, "type": "reveal"},
            {"timestamp_seconds": 2.0, "type": "explosion", "intensity": 0.1},
            {"timestamp_seconds": 4.0, "type": "pulse", "intensity": 3.0},
            {"type": "warning"},
            "not an object",
            {"timestamp_seconds": "soon"}
        ]"#;
        let moments = parse_response(reply, 10.0, 30).unwrap();
        assert_eq!(moments.len(), 3);

        assert_eq!(moments[0].kind(), MomentKind::ElementAppear);
        assert_eq!(moments[0].intensity(), 0.3);
        assert_eq!(moments[1].kind(), MomentKind::ElementAppear);
        assert_eq!(moments[1].intensity(), 1.0);
        assert_eq!(moments[2].kind(), MomentKind::Warning);
        assert_eq!(moments[2].frame(), 0);
        assert_eq!(moments[2].intensity(), 0.7);
        assert_eq!(moments[2].context(), "");
    }

    #[test]
    fn test_parse_rejects_missing_or_broken_json() {
        assert!(parse_response("no moments today", 10.0, 30).is_err());
        assert!(parse_response("[{broken", 10.0, 30).is_err());
        assert!(parse_response("[1, 2]", 10.0, 30).unwrap().is_empty());
    }

    #[test]
    fn test_constraints_enforce_gap() {
        let analyzer = SemanticAnalyzer::new(30);
        assert_eq!(analyzer.min_gap_frames(), 15);
        let moments = vec![
            SoundMoment::new(MomentKind::Reveal, 40, 0.7, "c"),
            SoundMoment::new(MomentKind::Reveal, 0, 0.7, "a"),
            SoundMoment::new(MomentKind::Reveal, 10, 0.7, "b"),
        ];
        let kept = analyzer.apply_constraints(moments);
        let contexts: Vec<&str> = kept.iter().map(|m| m.context()).collect();
        assert_eq!(contexts, vec!["a", "c"]);
    }

    #[test]
    fn test_constraints_cap_by_intensity() {
        let config = SemanticConfig {
            max_moments: 2,
            ..Default::default()
        };
        let analyzer = SemanticAnalyzer::from_config(&config, 30);
        let moments = vec![
            SoundMoment::new(MomentKind::Reveal, 0, 0.7, "quiet").with_intensity(0.3),
            SoundMoment::new(MomentKind::Reveal, 30, 0.7, "loud").with_intensity(0.9),
            SoundMoment::new(MomentKind::Reveal, 60, 0.7, "medium").with_intensity(0.6),
        ];
        let kept = analyzer.apply_constraints(moments);
        let contexts: Vec<&str> = kept.iter().map(|m| m.context()).collect();
        assert_eq!(contexts, vec!["loud", "medium"]);
    }

    #[test]
    fn test_client_failure_yields_empty() {
        let analyzer = SemanticAnalyzer::new(30);
        let failing = Canned(Err(AnalysisError::command("boom")));
        assert!(analyzer.analyze(&failing, &request(10.0)).is_empty());

        let garbage = Canned(Ok("I cannot help with that".to_string()));
        assert!(analyzer.analyze(&garbage, &request(10.0)).is_empty());
    }

    #[test]
    fn test_heuristic_client_by_scene_type() {
        let analyzer = SemanticAnalyzer::new(30);

        let problem = SemanticRequest::new("s1", "demo/the_bottleneck", "", 10.0);
        let moments = analyzer.analyze(&HeuristicClient, &problem);
        let kinds: Vec<MomentKind> = moments.iter().map(|m| m.kind()).collect();
        assert_eq!(
            kinds,
            vec![MomentKind::ElementAppear, MomentKind::Warning, MomentKind::Reveal]
        );
        let frames: Vec<u32> = moments.iter().map(|m| m.frame()).collect();
        assert_eq!(frames, vec![15, 150, 270]);

        let short = SemanticRequest::new("s2", "demo/results", "", 4.0);
        let moments = analyzer.analyze(&HeuristicClient, &short);
        assert_eq!(moments.len(), 2);
        assert_eq!(moments[1].kind(), MomentKind::Success);

        let other = SemanticRequest::new("s3", "demo/overview", "", 4.0);
        let moments = analyzer.analyze(&HeuristicClient, &other);
        assert_eq!(moments[1].kind(), MomentKind::Transition);
        assert_eq!(moments[1].context(), "Key moment");
    }

    #[test]
    fn test_client_from_config() {
        let config = SemanticConfig::default();
        assert_eq!(client_from_config(&config).name(), "heuristic");

        let config = SemanticConfig {
            command: vec!["llm".into(), "-m".into(), "fast".into()],
            ..Default::default()
        };
        assert_eq!(client_from_config(&config).name(), "llm");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_client_reads_stdout() {
        let client = CommandClient::new(
            "sh",
            vec![
                "-c".into(),
                r#"cat > /dev/null; echo '[{"timestamp_seconds": 2.0, "type": "success"}]'"#.into(),
            ],
        );
        let moments = SemanticAnalyzer::new(30).analyze(&client, &request(10.0));
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].kind(), MomentKind::Success);
        assert_eq!(moments[0].frame(), 60);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_client_nonzero_exit() {
        let client = CommandClient::new("sh", vec!["-c".into(), "echo nope >&2; exit 3".into()]);
        let err = client.complete(&request(1.0), "prompt").unwrap_err();
        assert!(matches!(err, AnalysisError::Command { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_client_survives_chatty_stderr() {
        // Well past a pipe buffer's worth of stderr before the reply.
        let client = CommandClient::new(
            "sh",
            vec![
                "-c".into(),
                "cat > /dev/null; head -c 200000 /dev/zero >&2; echo '[]'".into(),
            ],
        )
        .timeout(Duration::from_secs(10));
        let reply = client.complete(&request(1.0), "prompt").unwrap();
        assert_eq!(reply.trim(), "[]");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_client_timeout() {
        let client =
            CommandClient::new("sleep", vec!["5".into()]).timeout(Duration::from_millis(300));
        let err = client.complete(&request(1.0), "prompt").unwrap_err();
        assert!(matches!(err, AnalysisError::Timeout { .. }));
    }

    #[test]
    fn test_missing_command_is_an_error() {
        let client = CommandClient::new("cuecraft-no-such-binary", Vec::new());
        let err = client.complete(&request(1.0), "prompt").unwrap_err();
        assert!(matches!(err, AnalysisError::Command { .. }));
    }
}
