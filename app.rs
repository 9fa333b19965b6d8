/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Chrome controller for one canvas instance.
//!
//! [`NodeChrome`] owns the shared mutable chrome state: the tooltip, the
//! floating log viewer, the dialog gate, the settings, and the pending
//! outward intents. All of it runs on the UI thread; background
//! stream reads reach it only through the viewer's chunk channel.
//!
//! Hosts drive it from four places each frame: pointer-move routing, `tick`
//! (timers + chunk drain), the overlay passes, and `drain_intents`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use egui::{CursorIcon, Pos2};

use crate::diagnostics::{DialogGate, DialogSink, format_execution_error};
use crate::events::ExecutionErrorEvent;
use crate::input::{self, PointerOutcome};
use crate::layout::{NodeGeometry, RegionKind};
use crate::logview::{FloatingLogViewer, LogStreamer};
use crate::model::NodeDecoration;
use crate::render::{self, TooltipState};
use crate::settings::ChromeSettings;

/// Outward action request, drained by the host each frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChromeIntent {
    /// Open a URL outside the canvas (editor deep link, log page).
    OpenExternal(String),
    /// Redraw the canvas after a dialog replaced its content.
    RedrawCanvas,
}

pub struct NodeChrome {
    pub settings: ChromeSettings,
    tooltip: TooltipState,
    log_viewer: FloatingLogViewer,
    dialog: DialogGate,
    streamer: Box<dyn LogStreamer>,
    intents: Vec<ChromeIntent>,
}

impl NodeChrome {
    pub fn new(
        settings: ChromeSettings,
        dialog: Box<dyn DialogSink>,
        streamer: Box<dyn LogStreamer>,
    ) -> Self {
        Self {
            settings,
            tooltip: TooltipState::new(),
            log_viewer: FloatingLogViewer::new(),
            dialog: DialogGate::new(dialog),
            streamer,
            intents: Vec::new(),
        }
    }

    /// Wrap in the shared handle the lifecycle hooks hold.
    pub fn into_shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    pub fn log_viewer(&self) -> &FloatingLogViewer {
        &self.log_viewer
    }

    pub(crate) fn push_intent(&mut self, intent: ChromeIntent) {
        self.intents.push(intent);
    }

    /// Take all pending outward intents. Call once per frame.
    pub fn drain_intents(&mut self) -> Vec<ChromeIntent> {
        std::mem::take(&mut self.intents)
    }

    /// Route one pointer-move, after the canvas's own handling. `hit` is the
    /// host's spatial query result for the pointer position. Returns the
    /// cursor to apply, or `None` to leave the cursor alone.
    pub fn pointer_move(
        &mut self,
        now: Instant,
        pointer: Pos2,
        hit: Option<(&NodeDecoration, &NodeGeometry)>,
    ) -> Option<CursorIcon> {
        if !self.settings.render_icons {
            return None;
        }
        match input::route_pointer_move(pointer, hit) {
            PointerOutcome::Clear => {
                self.tooltip.clear();
                self.log_viewer.schedule_hide(now);
                None
            }
            PointerOutcome::Hit {
                kind,
                cursor,
                tooltip,
            } => {
                self.tooltip.set(tooltip, pointer);
                if kind == RegionKind::Log
                    && let Some((deco, _)) = hit
                {
                    self.log_viewer
                        .show(pointer, &deco.node_id, self.streamer.as_mut());
                }
                Some(cursor)
            }
        }
    }

    /// Per-frame maintenance: hide debounce and stream-chunk drain.
    pub fn tick(&mut self, now: Instant) {
        self.log_viewer.tick(now);
    }

    /// The shared "show dialog" entry point, routed through the gate. Hosts
    /// call this instead of their raw dialog so the interception rules apply
    /// once installed.
    pub fn show_dialog(&mut self, html: &str) {
        self.dialog.show(html);
    }

    /// Handle an inbound `execution_error` event.
    ///
    /// Strictly opt-in: with neither path prefix configured nothing is
    /// installed and dialogs pass through unmodified. Otherwise the gate is
    /// installed (at most once), the record is formatted, and the formatted
    /// HTML, which carries the marker class, is shown through the gate.
    pub fn handle_execution_error(&mut self, error: Option<&ExecutionErrorEvent>) {
        if self.settings.error_links_disabled() {
            log::debug!("execution-error dialog upgrade is off: no path prefixes configured");
            return;
        }
        if self.dialog.install() {
            log::debug!("installed execution-error dialog interception");
        }
        let html = format_execution_error(
            error,
            &self.settings.editor_path_prefix,
            &self.settings.source_path_prefix,
        );
        self.dialog.show(&html);
        self.push_intent(ChromeIntent::RedrawCanvas);
    }

    /// Post-composition overlay passes: the floating log viewer and the
    /// tooltip bubble, in that order, so the tooltip draws above everything.
    pub fn overlay_ui(&mut self, ctx: &egui::Context, now: Instant) {
        self.log_viewer.ui(ctx, now);
        self.tooltip_pass(ctx);
    }

    /// Draw the active tooltip on a device-space foreground layer.
    pub fn tooltip_pass(&self, ctx: &egui::Context) {
        if !self.tooltip.is_active() {
            return;
        }
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Tooltip,
            egui::Id::new("node_chrome_tooltip"),
        ));
        render::draw_tooltip(&painter, &self.tooltip);
    }
}

#[cfg(test)]
pub(crate) struct NullDialog;

#[cfg(test)]
impl DialogSink for NullDialog {
    fn show_dialog(&mut self, _html: &str) {}
}

#[cfg(test)]
pub(crate) struct NullStreamer;

#[cfg(test)]
impl LogStreamer for NullStreamer {
    fn start(
        &mut self,
        _node_id: &str,
        _token: u64,
        _tx: tokio::sync::mpsc::UnboundedSender<crate::logview::LogChunk>,
    ) {
    }
}

#[cfg(test)]
impl NodeChrome {
    pub(crate) fn new_for_testing() -> Rc<RefCell<Self>> {
        Self::new(
            ChromeSettings::default(),
            Box::new(NullDialog),
            Box::new(NullStreamer),
        )
        .into_shared()
    }
}
