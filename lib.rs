/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Node chrome for an egui graph canvas.
//!
//! Decorates host-owned graph nodes with title-bar affordances (a source-jump
//! link, an info tooltip, a log icon), a single-active tooltip overlay, a
//! hover-triggered floating log viewer that streams a node's log over HTTP,
//! trailing read-only "show value" widgets mirroring execution output, and
//! linkified execution-error dialogs behind an install-once interception gate.
//!
//! The canvas engine itself stays on the host side: node storage, positions,
//! pan/zoom, and widget rendering are reached only through [`hooks::CanvasHost`],
//! plain geometry ([`layout::NodeGeometry`]), and drained [`app::ChromeIntent`]s.

pub mod app;
pub mod diagnostics;
pub mod events;
pub mod hooks;
pub mod input;
pub mod layout;
pub mod logview;
pub mod model;
pub mod render;
pub mod settings;

pub use app::{ChromeIntent, NodeChrome};
pub use diagnostics::{DialogGate, DialogSink, format_execution_error};
pub use events::{ExecutionErrorEvent, LogsUpdatedEvent, apply_logs_updated};
pub use hooks::{CanvasHost, ChromeHook, HookChain, MenuEntry, NodeHooks, WidgetHandle};
pub use layout::{NodeGeometry, Region, RegionKind};
pub use logview::{FloatingLogViewer, HttpLogStreamer, LogChunk, LogStreamer};
pub use model::{DisplayWidget, NodeDecoration, NodeTypeDecor};
pub use render::TooltipState;
pub use settings::ChromeSettings;

/// Crate version, surfaced for host diagnostics panels.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
