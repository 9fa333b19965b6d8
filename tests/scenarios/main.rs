use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use egui::{pos2, vec2};
use node_chrome::{
    CanvasHost, ChromeHook, ChromeIntent, ChromeSettings, DialogSink, ExecutionErrorEvent,
    HookChain, LogChunk, LogStreamer, LogsUpdatedEvent, NodeChrome, NodeDecoration, NodeGeometry,
    NodeHooks, VERSION, WidgetHandle, apply_logs_updated,
};
use tokio::sync::mpsc;

#[test]
fn scenarios_smoke_runs() {
    assert!(!VERSION.is_empty());
}

#[derive(Default)]
struct MockHost {
    next_handle: u64,
    widget_count: usize,
    detached: Vec<WidgetHandle>,
    dirty_marks: usize,
}

impl CanvasHost for MockHost {
    fn widget_count(&self, _node_id: &str) -> usize {
        self.widget_count
    }

    fn create_text_display(&mut self, _node_id: &str, _name: &str) -> WidgetHandle {
        self.next_handle += 1;
        self.widget_count += 1;
        WidgetHandle(self.next_handle)
    }

    fn truncate_widgets(&mut self, _node_id: &str, len: usize) {
        self.widget_count = self.widget_count.min(len);
    }

    fn detach_widget(&mut self, handle: WidgetHandle) {
        self.detached.push(handle);
    }

    fn set_node_size(&mut self, _node_id: &str, _width: Option<f32>, _height: Option<f32>) {}

    fn recompute_node_size(&mut self, _node_id: &str) {}

    fn mark_canvas_dirty(&mut self) {
        self.dirty_marks += 1;
    }
}

struct RecordingDialog(Rc<RefCell<Vec<String>>>);

impl DialogSink for RecordingDialog {
    fn show_dialog(&mut self, html: &str) {
        self.0.borrow_mut().push(html.to_string());
    }
}

#[derive(Default)]
struct RecordingStreamer {
    starts: Rc<RefCell<Vec<(String, u64)>>>,
    tx: Rc<RefCell<Option<mpsc::UnboundedSender<LogChunk>>>>,
}

impl LogStreamer for RecordingStreamer {
    fn start(&mut self, node_id: &str, token: u64, tx: mpsc::UnboundedSender<LogChunk>) {
        self.starts.borrow_mut().push((node_id.to_string(), token));
        *self.tx.borrow_mut() = Some(tx);
    }
}

struct TestHarness {
    chrome: Rc<RefCell<NodeChrome>>,
    host: MockHost,
    shown_dialogs: Rc<RefCell<Vec<String>>>,
    stream_starts: Rc<RefCell<Vec<(String, u64)>>>,
    stream_tx: Rc<RefCell<Option<mpsc::UnboundedSender<LogChunk>>>>,
    now: Instant,
}

impl TestHarness {
    fn new(settings: ChromeSettings) -> Self {
        let shown_dialogs = Rc::new(RefCell::new(Vec::new()));
        let streamer = RecordingStreamer::default();
        let stream_starts = streamer.starts.clone();
        let stream_tx = streamer.tx.clone();
        let chrome = NodeChrome::new(
            settings,
            Box::new(RecordingDialog(shown_dialogs.clone())),
            Box::new(streamer),
        )
        .into_shared();
        Self {
            chrome,
            host: MockHost::default(),
            shown_dialogs,
            stream_starts,
            stream_tx,
            now: Instant::now(),
        }
    }

    fn chain_for_type(&self, type_description: &str) -> HookChain {
        let mut chain = HookChain::new();
        if let Some(hook) = ChromeHook::for_node_type(self.chrome.clone(), type_description) {
            chain.push(Box::new(hook));
        }
        chain
    }

    fn send_chunk(&self, token: u64, text: &str) {
        self.stream_tx
            .borrow()
            .as_ref()
            .expect("a stream was started")
            .send(LogChunk {
                token,
                text: text.to_string(),
            })
            .expect("viewer alive");
    }

    fn advance(&mut self, millis: u64) {
        self.now += Duration::from_millis(millis);
        self.chrome.borrow_mut().tick(self.now);
    }
}

const MARKED_TYPE: &str = "EasyNodesInfo={\"color\": \"#224488\", \
                           \"sourceLocation\": \"nodes/math.py:12\"}\nAdds two numbers.";

fn standard_geometry() -> NodeGeometry {
    NodeGeometry::new(pos2(0.0, 100.0), vec2(200.0, 80.0))
}

#[test]
fn hover_log_icon_streams_and_debounced_hide_scenario() {
    let mut harness = TestHarness::new(ChromeSettings::default());
    let mut chain = harness.chain_for_type(MARKED_TYPE);
    assert_eq!(chain.len(), 1);

    let mut deco = NodeDecoration::new("17", "");
    chain.on_node_created(&mut deco, &mut harness.host);

    apply_logs_updated(
        &LogsUpdatedEvent {
            nodes_with_logs: vec!["17".to_string()],
        },
        std::iter::once(&mut deco),
    );
    assert!(deco.has_log);
    deco.log_width = 16.0;

    // Pointer over the log region (x ∈ (174, 190), y ∈ (70, 100)).
    let geometry = standard_geometry();
    let over_log = pos2(180.0, 85.0);
    let cursor =
        harness
            .chrome
            .borrow_mut()
            .pointer_move(harness.now, over_log, Some((&deco, &geometry)));
    assert!(cursor.is_some());
    assert_eq!(
        *harness.stream_starts.borrow(),
        vec![("17".to_string(), 1)]
    );

    harness.send_chunk(1, "step 1 done\n");
    harness.send_chunk(1, "step 2 done\n");
    harness.advance(10);
    {
        let chrome = harness.chrome.borrow();
        assert!(chrome.log_viewer().is_visible());
        assert_eq!(chrome.log_viewer().content(), "step 1 done\nstep 2 done\n");
    }

    // Same node again: no restart, content intact.
    harness
        .chrome
        .borrow_mut()
        .pointer_move(harness.now, over_log, Some((&deco, &geometry)));
    assert_eq!(harness.stream_starts.borrow().len(), 1);

    // Off the icon: the hide is debounced, then fires.
    harness
        .chrome
        .borrow_mut()
        .pointer_move(harness.now, pos2(10.0, 150.0), Some((&deco, &geometry)));
    harness.advance(100);
    assert!(harness.chrome.borrow().log_viewer().is_visible());
    harness.advance(300);
    assert!(!harness.chrome.borrow().log_viewer().is_visible());
}

#[test]
fn switching_nodes_restarts_stream_and_drops_stale_chunks_scenario() {
    let mut harness = TestHarness::new(ChromeSettings::default());
    let mut deco_a = NodeDecoration::new("17", "");
    let mut deco_b = NodeDecoration::new("18", "");
    for deco in [&mut deco_a, &mut deco_b] {
        deco.has_log = true;
        deco.log_width = 16.0;
    }
    let geometry = standard_geometry();
    let over_log = pos2(180.0, 85.0);

    harness
        .chrome
        .borrow_mut()
        .pointer_move(harness.now, over_log, Some((&deco_a, &geometry)));
    let first_tx = harness.stream_tx.borrow().clone().expect("first stream");
    harness
        .chrome
        .borrow_mut()
        .pointer_move(harness.now, over_log, Some((&deco_b, &geometry)));
    assert_eq!(
        *harness.stream_starts.borrow(),
        vec![("17".to_string(), 1), ("18".to_string(), 2)]
    );

    first_tx
        .send(LogChunk {
            token: 1,
            text: "stale from 17".to_string(),
        })
        .expect("viewer alive");
    harness.send_chunk(2, "fresh from 18");
    harness.advance(10);

    let chrome = harness.chrome.borrow();
    assert_eq!(chrome.log_viewer().current_node(), Some("18"));
    assert_eq!(chrome.log_viewer().content(), "fresh from 18");
}

#[test]
fn execution_error_event_reformats_dialog_scenario() {
    let mut settings = ChromeSettings::default();
    settings.editor_path_prefix = "vscode://file".to_string();
    let harness = TestHarness::new(settings);

    let event: ExecutionErrorEvent = serde_json::from_str(
        r#"{
            "traceback": ["Traceback (most recent call last):\n",
                          "  File \"/proj/nodes/math.py\", line 12, in add\n"],
            "exception_message": "unsupported operand",
            "node_id": "17",
            "node_type": "Add"
        }"#,
    )
    .expect("event payload");

    harness.chrome.borrow_mut().handle_execution_error(Some(&event));
    {
        let shown = harness.shown_dialogs.borrow();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].starts_with("Error occurred when executing"));
        assert!(shown[0].contains("class=\"custom-error\">Add [17]</span>"));
        assert!(
            shown[0].contains("<a href=\"vscode://file/proj/nodes/math.py:12\"")
        );
    }
    assert_eq!(
        harness.chrome.borrow_mut().drain_intents(),
        vec![ChromeIntent::RedrawCanvas]
    );

    // The backend's own raw dialog for the same error is suppressed, and
    // replaying the formatted HTML never re-wraps it.
    let formatted = harness.shown_dialogs.borrow()[0].clone();
    harness
        .chrome
        .borrow_mut()
        .show_dialog("Error occurred when executing Add [17]: unsupported operand");
    harness.chrome.borrow_mut().show_dialog(&formatted);
    let shown = harness.shown_dialogs.borrow();
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[1], formatted);
}

#[test]
fn executed_output_grows_and_shrinks_show_values_scenario() {
    let mut harness = TestHarness::new(ChromeSettings::default());
    let mut chain = harness.chain_for_type(MARKED_TYPE);
    let mut deco = NodeDecoration::new("17", "");
    harness.host.widget_count = 2;
    chain.on_node_created(&mut deco, &mut harness.host);
    assert_eq!(deco.base_widget_count, 2);

    let outputs: Vec<String> = vec!["1".into(), "2".into(), "3".into()];
    chain.on_executed(&mut deco, Some(outputs.as_slice()), &mut harness.host);
    assert_eq!(deco.show_values.len(), 3);
    assert_eq!(harness.host.widget_count, 5);
    assert_eq!(harness.host.dirty_marks, 1);

    let outputs: Vec<String> = vec!["only".into()];
    chain.on_executed(&mut deco, Some(outputs.as_slice()), &mut harness.host);
    assert_eq!(deco.show_values.len(), 1);
    assert_eq!(deco.show_values[0].value, "only");
    assert_eq!(harness.host.widget_count, 3);
    assert_eq!(harness.host.detached.len(), 2);

    // A result without text leaves the tail untouched.
    chain.on_executed(&mut deco, None, &mut harness.host);
    assert_eq!(deco.show_values.len(), 1);

    let entries = chain.extra_menu_options(&deco);
    assert!(entries.is_empty(), "no source link or log on this node yet");
}
