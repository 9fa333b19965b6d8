/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Floating log viewer.
//!
//! Hover-triggered overlay that streams one node's log text incrementally.
//! The state machine is Hidden / Showing(node): `show` is idempotent for the
//! node already on display and restarts the stream for a different one;
//! hiding is debounced through a deadline so the pointer can travel from the
//! log icon onto the overlay without dismissing it.
//!
//! Stream reads are never aborted when the session changes. Every read is
//! tagged with the token it was started under and [`FloatingLogViewer::tick`]
//! drops chunks whose token is stale, so an abandoned read can keep draining
//! without ever reaching the display.

use std::time::{Duration, Instant};

use egui::{Color32, Pos2, Stroke, vec2};
use tokio::sync::mpsc;

pub mod stream;

pub use stream::HttpLogStreamer;

/// Debounce applied between the pointer leaving the log icon (or overlay)
/// and the overlay disappearing.
pub const HIDE_DELAY: Duration = Duration::from_millis(300);

/// Log-retrieval endpoint path on the execution backend.
pub const LOG_ENDPOINT_PATH: &str = "/easy_nodes/show_log";

/// Fixed overlay size.
const WINDOW_SIZE: egui::Vec2 = vec2(400.0, 300.0);

/// Relative URL of one node's log page, also used for the click/menu
/// affordances.
pub fn show_log_path(node_id: &str) -> String {
    format!("{LOG_ENDPOINT_PATH}?node={node_id}")
}

/// One decoded piece of streamed log text, tagged with the stream token it
/// was started under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogChunk {
    pub token: u64,
    pub text: String,
}

/// Boundary for starting an incremental log read. The production
/// implementation is [`HttpLogStreamer`]; tests inject chunks directly.
pub trait LogStreamer {
    fn start(&mut self, node_id: &str, token: u64, tx: mpsc::UnboundedSender<LogChunk>);
}

/// Overlay state, built lazily on the first `show`.
struct OverlayState {
    content: String,
}

impl OverlayState {
    fn new() -> Self {
        Self {
            content: String::new(),
        }
    }
}

pub struct FloatingLogViewer {
    overlay: Option<OverlayState>,
    current_node: Option<String>,
    visible: bool,
    pos: Pos2,
    hide_deadline: Option<Instant>,
    stream_token: u64,
    pointer_was_inside: bool,
    chunk_tx: mpsc::UnboundedSender<LogChunk>,
    chunk_rx: mpsc::UnboundedReceiver<LogChunk>,
}

impl Default for FloatingLogViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl FloatingLogViewer {
    pub fn new() -> Self {
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        Self {
            overlay: None,
            current_node: None,
            visible: false,
            pos: Pos2::ZERO,
            hide_deadline: None,
            stream_token: 0,
            pointer_was_inside: false,
            chunk_tx,
            chunk_rx,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn current_node(&self) -> Option<&str> {
        self.current_node.as_deref()
    }

    pub fn content(&self) -> &str {
        self.overlay.as_ref().map(|o| o.content.as_str()).unwrap_or("")
    }

    /// Show the overlay at `pos` for `node_id`.
    ///
    /// Any pending hide is canceled before a stream can start, so a rapid
    /// show→hide→show on the same node never clears buffered content. A
    /// re-show for the node already on display changes nothing else; a
    /// different node clears the buffer and starts a fresh read under a new
    /// token.
    pub fn show(&mut self, pos: Pos2, node_id: &str, streamer: &mut dyn LogStreamer) {
        self.pos = pos;
        self.visible = true;
        self.hide_deadline = None;
        let overlay = self.overlay.get_or_insert_with(OverlayState::new);
        if self.current_node.as_deref() != Some(node_id) {
            self.current_node = Some(node_id.to_string());
            overlay.content.clear();
            self.stream_token += 1;
            streamer.start(node_id, self.stream_token, self.chunk_tx.clone());
        }
    }

    /// Arm the debounced hide. Re-arming while already armed keeps the
    /// earlier deadline.
    pub fn schedule_hide(&mut self, now: Instant) {
        self.hide_deadline.get_or_insert(now + HIDE_DELAY);
    }

    pub fn cancel_hide(&mut self) {
        self.hide_deadline = None;
    }

    /// Hide immediately. Buffered content is kept; it is cleared by the next
    /// `show` because the tracked node id is gone and any id then differs.
    pub fn hide(&mut self) {
        self.visible = false;
        self.current_node = None;
    }

    /// Per-frame maintenance: drain streamed chunks (dropping stale ones)
    /// and fire an expired hide deadline.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(chunk) = self.chunk_rx.try_recv() {
            if chunk.token != self.stream_token {
                log::debug!("dropping log chunk from a superseded stream");
                continue;
            }
            if let Some(overlay) = &mut self.overlay {
                overlay.content.push_str(&chunk.text);
            }
        }
        if let Some(deadline) = self.hide_deadline
            && now >= deadline
        {
            self.hide_deadline = None;
            self.hide();
        }
    }

    /// Draw the overlay and maintain hover intent: the pointer entering the
    /// overlay cancels a pending hide, leaving it re-arms one.
    pub fn ui(&mut self, ctx: &egui::Context, now: Instant) {
        if !self.visible {
            self.pointer_was_inside = false;
            return;
        }
        let Some(overlay) = &self.overlay else {
            return;
        };

        let response = egui::Area::new(egui::Id::new("node_chrome_log_window"))
            .order(egui::Order::Foreground)
            .fixed_pos(self.pos)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(Color32::from_rgb(0x1e, 0x1e, 0x1e))
                    .stroke(Stroke::new(1.0, Color32::from_gray(0x44)))
                    .corner_radius(5)
                    .inner_margin(10)
                    .show(ui, |ui| {
                        ui.set_min_size(WINDOW_SIZE);
                        ui.set_max_size(WINDOW_SIZE);
                        ui.heading("Node Log");
                        egui::ScrollArea::vertical()
                            .stick_to_bottom(true)
                            .show(ui, |ui| {
                                ui.monospace(&overlay.content);
                            });
                    });
            });

        let inside = ctx
            .pointer_latest_pos()
            .is_some_and(|p| response.response.rect.contains(p));
        if inside {
            self.cancel_hide();
        } else if self.pointer_was_inside {
            self.schedule_hide(now);
        }
        self.pointer_was_inside = inside;
    }
}
