use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use canvas::geometry::Point;
use canvas::history::Origin;
use canvas::input::{Key, Modifiers, Shortcut};
use canvas::layout::layout_diagram;
use canvas::model::{DiagramEdge, DiagramKind, DiagramNode};
use tokio::sync::Notify;

use super::*;
use crate::generate::heuristic::HeuristicGenerator;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn org_chart() -> DiagramData {
    DiagramData::new(
        DiagramKind::OrgChart,
        vec![DiagramNode::new("1", "CEO"), DiagramNode::new("2", "CTO"), DiagramNode::new("3", "CFO")],
        vec![DiagramEdge::new("1", "2"), DiagramEdge::new("1", "3")],
    )
}

fn timeline() -> DiagramData {
    DiagramData::new(
        DiagramKind::Timeline,
        vec![DiagramNode::new("a", "Q1"), DiagramNode::new("b", "Q2")],
        vec![],
    )
}

fn ctrl(key: &str) -> InputEvent {
    InputEvent::KeyDown {
        key: Key::new(key),
        modifiers: Modifiers { ctrl: true, ..Modifiers::default() },
        in_text_field: false,
    }
}

/// Session with `data` already applied.
fn session_with(data: DiagramData) -> Session {
    let mut session = Session::new();
    let ticket = session.begin_generation("make it", Some("Team"), None).unwrap();
    assert!(matches!(session.complete_generation(ticket, Ok(data)), Completion::Applied(_)));
    session
}

/// Generator that waits on an optional gate, then pops scripted results.
struct ScriptedGenerator {
    results: Mutex<Vec<Result<DiagramData, GenerateError>>>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(results: Vec<Result<DiagramData, GenerateError>>) -> Self {
        Self { results: Mutex::new(results), gate: None, calls: AtomicUsize::new(0) }
    }

    fn gated(results: Vec<Result<DiagramData, GenerateError>>, gate: Arc<Notify>) -> Self {
        Self { gate: Some(gate), ..Self::new(results) }
    }
}

#[async_trait::async_trait]
impl DiagramGenerator for ScriptedGenerator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> Result<DiagramData, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let mut results = self.results.lock().unwrap();
        if results.is_empty() { Err(GenerateError::EmptyResponse) } else { results.remove(0) }
    }
}

async fn wait_for(handle: &SessionHandle, generating: bool) {
    for _ in 0..1000 {
        if handle.read().await.is_generating() == generating {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("generating never became {generating}");
}

async fn wait_until_generating(handle: &SessionHandle) {
    wait_for(handle, true).await;
}

struct PanickingGenerator;

#[async_trait::async_trait]
impl DiagramGenerator for PanickingGenerator {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn generate(&self, _prompt: &str) -> Result<DiagramData, GenerateError> {
        panic!("generator blew up");
    }
}

// =============================================================================
// begin / complete
// =============================================================================

#[test]
fn new_session_is_empty() {
    let session = Session::new();
    assert!(session.editor().is_none());
    assert!(!session.is_generating());
    assert_eq!(session.epoch(), 0);
    assert_eq!(session.theme(), Theme::Classic);
    assert_eq!(session.name(), "");
}

#[test]
fn blank_prompt_rejected_before_generation() {
    let mut session = Session::new();
    let err = session.begin_generation("   \n", None, None).unwrap_err();
    assert!(matches!(err, SessionError::Generate(GenerateError::EmptyPrompt)));
    assert!(!session.is_generating());
    assert_eq!(session.last_error().map(|e| e.code), Some("E_EMPTY_PROMPT"));
}

#[test]
fn second_generation_rejected_while_in_flight() {
    let mut session = Session::new();
    let first = session.begin_generation("org chart", None, None).unwrap();
    let err = session.begin_generation("flowchart", None, None).unwrap_err();
    assert!(matches!(err, SessionError::AlreadyGenerating));
    assert_eq!(err.error_code(), "E_GENERATION_IN_PROGRESS");
    assert!(session.is_generating());
    assert_eq!(session.last_prompt(), Some("org chart"));

    session.complete_generation(first, Ok(org_chart()));
    assert!(!session.is_generating());
    assert!(session.begin_generation("flowchart", None, None).is_ok());
}

#[test]
fn prompt_is_trimmed_in_ticket() {
    let mut session = Session::new();
    let ticket = session.begin_generation("  team chart  ", None, None).unwrap();
    assert_eq!(ticket.prompt(), "team chart");
    assert_eq!(ticket.epoch(), 0);
}

#[test]
fn successful_regenerate_leaves_single_entry_ledger() {
    let mut session = session_with(org_chart());
    session.handle(ctrl("n"), Instant::now());
    session.handle(ctrl("a"), Instant::now());
    assert!(session.editor().unwrap().ledger().len() > 1);

    let ticket = session.begin_generation("timeline", None, None).unwrap();
    let completion = session.complete_generation(ticket, Ok(timeline()));

    let editor = session.editor().unwrap();
    assert_eq!(editor.ledger().len(), 1);
    assert_eq!(*editor.snapshot(), layout_diagram(&timeline()));
    assert!(!editor.can_undo());
    match completion {
        Completion::Applied(transition) => {
            assert_eq!(transition.origin, Origin::Replay);
            assert_eq!(*transition.snapshot, layout_diagram(&timeline()));
        }
        other => panic!("expected Applied, got {other:?}"),
    }
}

#[test]
fn failed_generation_leaves_graph_untouched() {
    let mut session = session_with(org_chart());
    session.handle(ctrl("n"), Instant::now());
    let before = session.editor().unwrap().snapshot().clone();
    let ledger_len = session.editor().unwrap().ledger().len();

    let ticket = session.begin_generation("again", Some("Other"), Some(Theme::Dark)).unwrap();
    let completion = session.complete_generation(ticket, Err(GenerateError::UnknownKind("venn".into())));

    let Completion::Failed(user_error) = completion else { panic!("expected failure") };
    assert_eq!(user_error.code, "E_UNKNOWN_KIND");
    assert!(user_error.retryable);
    assert_eq!(session.last_error(), Some(&user_error));
    assert!(!session.is_generating());

    let editor = session.editor().unwrap();
    assert_eq!(*editor.snapshot(), before);
    assert_eq!(editor.ledger().len(), ledger_len);
    assert_eq!(session.name(), "Team");
    assert_eq!(session.theme(), Theme::Classic);
}

#[test]
fn success_clears_previous_error() {
    let mut session = Session::new();
    let ticket = session.begin_generation("x", None, None).unwrap();
    session.complete_generation(ticket, Err(GenerateError::EmptyResponse));
    assert!(session.last_error().is_some());

    let ticket = session.begin_generation("x", None, None).unwrap();
    assert!(session.last_error().is_none(), "begin clears the banner");
    session.complete_generation(ticket, Ok(timeline()));
    assert!(session.last_error().is_none());
}

#[test]
fn abandon_releases_only_current_flight() {
    let mut session = Session::new();
    assert!(!session.abandon_generation(0), "nothing in flight");

    let ticket = session.begin_generation("x", None, None).unwrap();
    assert!(!session.abandon_generation(ticket.epoch() + 1));
    assert!(session.is_generating());

    assert!(session.abandon_generation(ticket.epoch()));
    assert!(!session.is_generating());
    assert_eq!(session.last_error().map(|e| e.code), Some("E_GENERATION_INTERRUPTED"));
    assert!(session.begin_generation("again", None, None).is_ok());
}

#[test]
fn stale_response_after_new_diagram_is_discarded() {
    let mut session = Session::new();
    let ticket = session.begin_generation("org chart", None, None).unwrap();
    session.new_diagram();
    assert_eq!(session.epoch(), 1);
    assert!(!session.is_generating());

    assert_eq!(session.complete_generation(ticket, Ok(org_chart())), Completion::Stale);
    assert!(session.editor().is_none());
}

#[test]
fn stale_response_does_not_clear_newer_flight() {
    let mut session = Session::new();
    let old = session.begin_generation("one", None, None).unwrap();
    session.new_diagram();
    let fresh = session.begin_generation("two", None, None).unwrap();

    assert_eq!(session.complete_generation(old, Ok(org_chart())), Completion::Stale);
    assert!(session.is_generating());
    assert!(matches!(session.complete_generation(fresh, Ok(timeline())), Completion::Applied(_)));
    assert_eq!(session.editor().unwrap().data().kind, DiagramKind::Timeline);
}

#[test]
fn name_and_theme_apply_on_success() {
    let mut session = Session::new();
    let ticket = session.begin_generation("x", None, None).unwrap();
    session.complete_generation(ticket, Ok(timeline()));
    assert_eq!(session.name(), DEFAULT_DIAGRAM_NAME);

    let ticket = session.begin_generation("x", Some("  Roadmap "), Some(Theme::Nature)).unwrap();
    session.complete_generation(ticket, Ok(timeline()));
    assert_eq!(session.name(), "Roadmap");
    assert_eq!(session.theme(), Theme::Nature);

    // Blank name keeps the current one.
    let ticket = session.begin_generation("x", Some(" "), None).unwrap();
    session.complete_generation(ticket, Ok(timeline()));
    assert_eq!(session.name(), "Roadmap");
    assert_eq!(session.theme(), Theme::Nature);
}

#[test]
fn clipboard_survives_regenerate() {
    let mut session = session_with(org_chart());
    session.handle(ctrl("a"), Instant::now());
    session.handle(ctrl("c"), Instant::now());
    assert_eq!(session.editor().unwrap().clipboard().len(), 3);

    let ticket = session.begin_generation("x", None, None).unwrap();
    session.complete_generation(ticket, Ok(timeline()));
    assert_eq!(session.editor().unwrap().clipboard().len(), 3);
}

#[test]
fn new_diagram_resets_everything_but_theme() {
    let mut session = session_with(org_chart());
    session.set_theme(Theme::Modern);
    session.new_diagram();
    assert!(session.editor().is_none());
    assert_eq!(session.name(), "");
    assert_eq!(session.theme(), Theme::Modern);
    assert!(session.notices().current().is_none());
}

// =============================================================================
// events, notices, export
// =============================================================================

#[test]
fn events_ignored_without_diagram() {
    let mut session = Session::new();
    assert!(session.handle(ctrl("n"), Instant::now()).is_empty());
}

#[test]
fn notify_actions_post_notices() {
    let mut session = session_with(org_chart());
    let now = Instant::now();
    session.handle(ctrl("a"), now);
    let actions = session.handle(ctrl("c"), now);
    assert!(actions.contains(&Action::Notify("Copied 3 node(s)".into())));

    let notice = session.notices().current_at(now).unwrap();
    assert_eq!(notice.message, "Copied 3 node(s)");
    assert_eq!(notice.level, NoticeLevel::Info);
    assert!(session.notices().current_at(now + Duration::from_secs(2)).is_none());
}

#[test]
fn reset_layout_restores_fresh_layout() {
    let mut session = session_with(org_chart());
    let now = Instant::now();
    session.handle(InputEvent::NodeMoved { id: "2".into(), position: Point::new(900.0, 900.0) }, now);
    assert_ne!(*session.editor().unwrap().snapshot(), layout_diagram(&org_chart()));

    let actions = session.handle(InputEvent::ResetLayout, now);
    assert!(matches!(actions.as_slice(), [Action::StateChanged(_)]));
    let editor = session.editor().unwrap();
    assert_eq!(*editor.snapshot(), layout_diagram(&org_chart()));
    assert_eq!(editor.ledger().len(), 3);
}

#[test]
fn toolbar_undo_redo_reach_editor() {
    let mut session = session_with(org_chart());
    let now = Instant::now();
    session.handle(InputEvent::Command(Shortcut::AddNode), now);
    assert_eq!(session.editor().unwrap().snapshot().nodes.len(), 4);
    assert_eq!(session.notices().current_at(now).unwrap().message, "Added new node");

    session.handle(InputEvent::Command(Shortcut::Undo), now);
    assert_eq!(session.editor().unwrap().snapshot().nodes.len(), 3);
    assert!(session.editor().unwrap().can_redo());
    session.handle(InputEvent::Command(Shortcut::Redo), now);
    assert_eq!(session.editor().unwrap().snapshot().nodes.len(), 4);
}

#[test]
fn rejected_edit_posts_error_notice() {
    let mut session = session_with(org_chart());
    let now = Instant::now();
    let actions = session.handle(InputEvent::Connect { from: "1".into(), to: "ghost".into() }, now);
    assert!(matches!(actions.as_slice(), [Action::Rejected(_)]));
    assert_eq!(session.notices().current_at(now).unwrap().level, NoticeLevel::Error);
}

#[test]
fn export_requires_diagram() {
    let mut session = Session::new();
    let err = session.export(ExportFormat::Svg, Instant::now()).unwrap_err();
    assert!(matches!(err, SessionError::NoDiagram));
    assert_eq!(err.error_code(), "E_NO_DIAGRAM");
}

#[test]
fn export_uses_name_theme_and_posts_notice() {
    let mut session = session_with(org_chart());
    session.set_theme(Theme::Dark);
    let now = Instant::now();
    let exported = session.export(ExportFormat::Svg, now).unwrap();
    assert_eq!(exported.file_name, "team.svg");
    assert!(String::from_utf8(exported.bytes).unwrap().contains("#1e293b"));
    assert_eq!(session.notices().current_at(now).unwrap().message, "SVG exported successfully!");
}

#[test]
fn settings_helpers() {
    let mut session = Session::new();
    session.set_name("  Plan  ");
    assert_eq!(session.name(), "Plan");
    assert_eq!(session.toggle_app_mode(), AppMode::Dark);
    assert_eq!(session.app_mode(), AppMode::Dark);

    let _ = session.begin_generation("", None, None);
    session.dismiss_error();
    assert!(session.last_error().is_none());
}

// =============================================================================
// SessionHandle
// =============================================================================

#[tokio::test]
async fn handle_generates_with_local_generator() {
    init_tracing();
    let handle = SessionHandle::new(Arc::new(HeuristicGenerator));
    assert_eq!(handle.generator_name(), "local");

    let completion = handle.generate("our company org chart", Some("Org"), None).await.unwrap();
    assert!(matches!(completion, Completion::Applied(_)));

    let session = handle.read().await;
    let editor = session.editor().unwrap();
    assert_eq!(editor.data().kind, DiagramKind::OrgChart);
    assert_eq!(editor.ledger().len(), 1);
    assert_eq!(*editor.snapshot(), layout_diagram(editor.data()));
    assert_eq!(session.name(), "Org");
}

#[tokio::test]
async fn handle_surfaces_adapter_failure() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Err(GenerateError::EmptyResponse)]));
    let handle = SessionHandle::new(generator.clone());

    let completion = handle.generate("x", None, None).await.unwrap();
    assert!(matches!(completion, Completion::Failed(ref e) if e.code == "E_EMPTY_RESPONSE"));
    assert!(!handle.read().await.is_generating());
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn handle_rejects_blank_prompt_without_calling_generator() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(timeline())]));
    let handle = SessionHandle::new(generator.clone());
    let err = handle.generate("  ", None, None).await.unwrap_err();
    assert!(matches!(err, SessionError::Generate(GenerateError::EmptyPrompt)));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lock_is_released_while_generating() {
    init_tracing();
    let gate = Arc::new(Notify::new());
    let generator = Arc::new(ScriptedGenerator::gated(vec![Ok(org_chart()), Ok(timeline())], gate.clone()));
    let handle = SessionHandle::new(generator);

    // First diagram.
    gate.notify_one();
    handle.generate("first", None, None).await.unwrap();

    // Second generation parks on the gate.
    let task = handle.spawn_generate("second".into(), None, None);
    wait_until_generating(&handle).await;

    // Interaction still works and a second request is refused.
    let actions = handle.handle(ctrl("a")).await;
    assert!(matches!(actions.first(), Some(Action::StateChanged(_))));
    let err = handle.generate("third", None, None).await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyGenerating));

    gate.notify_one();
    let completion = task.await.unwrap().unwrap();
    assert!(matches!(completion, Completion::Applied(_)));
    let session = handle.read().await;
    assert_eq!(session.editor().unwrap().data().kind, DiagramKind::Timeline);
    assert_eq!(session.editor().unwrap().ledger().len(), 1);
}

#[tokio::test]
async fn new_diagram_discards_in_flight_result() {
    let gate = Arc::new(Notify::new());
    let generator = Arc::new(ScriptedGenerator::gated(vec![Ok(org_chart())], gate.clone()));
    let handle = SessionHandle::new(generator);

    let task = handle.spawn_generate("slow".into(), None, None);
    wait_until_generating(&handle).await;
    handle.new_diagram().await;
    gate.notify_one();

    assert_eq!(task.await.unwrap().unwrap(), Completion::Stale);
    let session = handle.read().await;
    assert!(session.editor().is_none());
    assert!(!session.is_generating());
}

#[tokio::test]
async fn handle_export_round_trip() {
    let handle = SessionHandle::new(Arc::new(ScriptedGenerator::new(vec![Ok(timeline())])));
    assert!(matches!(handle.export(ExportFormat::Json).await, Err(SessionError::NoDiagram)));
    handle.generate("x", Some("Road Map"), None).await.unwrap();
    let exported = handle.export(ExportFormat::Json).await.unwrap();
    assert_eq!(exported.file_name, "road-map.json");
}

#[tokio::test]
async fn aborted_caller_does_not_wedge_session() {
    let gate = Arc::new(Notify::new());
    let generator = Arc::new(ScriptedGenerator::gated(vec![Ok(org_chart()), Ok(timeline())], gate.clone()));
    let handle = SessionHandle::new(generator);

    let task = handle.spawn_generate("slow".into(), None, None);
    wait_until_generating(&handle).await;
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    // The generator keeps running detached and still completes the session.
    gate.notify_one();
    wait_for(&handle, false).await;
    assert_eq!(handle.read().await.editor().unwrap().data().kind, DiagramKind::OrgChart);

    gate.notify_one();
    let retry = handle.generate("retry", None, None).await.unwrap();
    assert!(matches!(retry, Completion::Applied(_)));
    assert_eq!(handle.read().await.editor().unwrap().data().kind, DiagramKind::Timeline);
}

#[tokio::test]
async fn caller_timeout_does_not_wedge_session() {
    let gate = Arc::new(Notify::new());
    let generator = Arc::new(ScriptedGenerator::gated(vec![Ok(timeline())], gate.clone()));
    let handle = SessionHandle::new(generator);

    let outcome = tokio::time::timeout(Duration::from_millis(20), handle.generate("slow", None, None)).await;
    assert!(outcome.is_err(), "gate is closed, so the call times out");
    assert!(handle.read().await.is_generating());

    gate.notify_one();
    wait_for(&handle, false).await;
    assert!(handle.read().await.editor().is_some());
}

#[tokio::test]
async fn panicking_generator_releases_slot() {
    let handle = SessionHandle::new(Arc::new(PanickingGenerator));

    let err = handle.generate("boom", None, None).await.unwrap_err();
    assert!(matches!(err, SessionError::Interrupted));
    assert!(err.retryable());

    let session = handle.read().await;
    assert!(!session.is_generating());
    assert_eq!(session.last_error().map(|e| e.code), Some("E_GENERATION_INTERRUPTED"));
}
