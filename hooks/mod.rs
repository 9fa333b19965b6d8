/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Node lifecycle decorator interface.
//!
//! Hosts keep a [`HookChain`] per node type and invoke it from their own
//! lifecycle callbacks in a defined order. Implementations compose: every
//! registered hook runs (registration order), and mouse-down stops at the
//! first hook that consumes the event. [`ChromeHook`] is this crate's
//! implementation, built per node type from parsed description metadata.
//!
//! Boundary: all host side effects (widget creation, node sizing, redraw
//! marking) go through [`CanvasHost`]; outward actions are queued as
//! [`ChromeIntent`]s on the controller instead of being performed here.

use std::cell::RefCell;
use std::rc::Rc;

use egui::Pos2;

use crate::app::{ChromeIntent, NodeChrome};
use crate::layout::{self, NodeGeometry, RegionKind};
use crate::logview::show_log_path;
use crate::model::show_values;
use crate::model::{self, INITIAL_SRC_LINK_WIDTH, NodeDecoration, NodeTypeDecor};
use crate::render;

/// Host-side handle for a widget's backing UI element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetHandle(pub u64);

/// The canvas-side operations the chrome needs from its host.
pub trait CanvasHost {
    /// Current length of the node's general widget list.
    fn widget_count(&self, node_id: &str) -> usize;

    /// Create a read-only text-display widget and append it to the node's
    /// general widget list.
    fn create_text_display(&mut self, node_id: &str, name: &str) -> WidgetHandle;

    /// Truncate the node's general widget list to `len` entries.
    fn truncate_widgets(&mut self, node_id: &str, len: usize);

    /// Detach a removed widget's backing element from its parent container.
    fn detach_widget(&mut self, handle: WidgetHandle);

    /// Override the node's size; `None` leaves that axis unchanged.
    fn set_node_size(&mut self, node_id: &str, width: Option<f32>, height: Option<f32>);

    /// Ask the node to recompute its visual size from its content.
    fn recompute_node_size(&mut self, node_id: &str);

    /// Mark the node and its owning graph for redraw.
    fn mark_canvas_dirty(&mut self);
}

/// One context-menu entry contributed by a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub intent: ChromeIntent,
}

/// Optional node lifecycle callbacks, invoked by the host in this order:
/// created, configure, executed, draw-foreground, mouse-down, extra-menu.
pub trait NodeHooks {
    fn on_node_created(&mut self, _deco: &mut NodeDecoration, _host: &mut dyn CanvasHost) {}

    fn on_configure(
        &mut self,
        _deco: &mut NodeDecoration,
        _persisted_values: &[String],
        _host: &mut dyn CanvasHost,
    ) {
    }

    /// `output_text` is `None` when the execution result carried no text
    /// payload; the show-value tail is left untouched in that case.
    fn on_executed(
        &mut self,
        _deco: &mut NodeDecoration,
        _output_text: Option<&[String]>,
        _host: &mut dyn CanvasHost,
    ) {
    }

    fn on_draw_foreground(
        &mut self,
        _deco: &mut NodeDecoration,
        _geom: &NodeGeometry,
        _painter: &egui::Painter,
    ) {
    }

    /// `local_pos` is in node-local coordinates (title bar above `y = 0`).
    /// Return true to consume the press.
    fn on_mouse_down(
        &mut self,
        _deco: &NodeDecoration,
        _geom: &NodeGeometry,
        _local_pos: Pos2,
    ) -> bool {
        false
    }

    fn extra_menu_options(&mut self, _deco: &NodeDecoration) -> Vec<MenuEntry> {
        Vec::new()
    }
}

/// Ordered composition of hooks. Every hook sees every callback except
/// mouse-down, which stops at the first consumer.
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Box<dyn NodeHooks>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hook: Box<dyn NodeHooks>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl NodeHooks for HookChain {
    fn on_node_created(&mut self, deco: &mut NodeDecoration, host: &mut dyn CanvasHost) {
        for hook in &mut self.hooks {
            hook.on_node_created(deco, host);
        }
    }

    fn on_configure(
        &mut self,
        deco: &mut NodeDecoration,
        persisted_values: &[String],
        host: &mut dyn CanvasHost,
    ) {
        for hook in &mut self.hooks {
            hook.on_configure(deco, persisted_values, host);
        }
    }

    fn on_executed(
        &mut self,
        deco: &mut NodeDecoration,
        output_text: Option<&[String]>,
        host: &mut dyn CanvasHost,
    ) {
        for hook in &mut self.hooks {
            hook.on_executed(deco, output_text, host);
        }
    }

    fn on_draw_foreground(
        &mut self,
        deco: &mut NodeDecoration,
        geom: &NodeGeometry,
        painter: &egui::Painter,
    ) {
        for hook in &mut self.hooks {
            hook.on_draw_foreground(deco, geom, painter);
        }
    }

    fn on_mouse_down(&mut self, deco: &NodeDecoration, geom: &NodeGeometry, local_pos: Pos2) -> bool {
        for hook in &mut self.hooks {
            if hook.on_mouse_down(deco, geom, local_pos) {
                return true;
            }
        }
        false
    }

    fn extra_menu_options(&mut self, deco: &NodeDecoration) -> Vec<MenuEntry> {
        let mut entries = Vec::new();
        for hook in &mut self.hooks {
            entries.extend(hook.extra_menu_options(deco));
        }
        entries
    }
}

/// The node-chrome decorator for one node type.
pub struct ChromeHook {
    chrome: Rc<RefCell<NodeChrome>>,
    decor: NodeTypeDecor,
    description: String,
}

impl ChromeHook {
    /// Build the hook for a node type whose description carries the
    /// metadata marker. Returns `None` (and registers nothing) for plain
    /// descriptions or a malformed marked line.
    pub fn for_node_type(
        chrome: Rc<RefCell<NodeChrome>>,
        type_description: &str,
    ) -> Option<Self> {
        let (decor, description) = model::decor_from_description(type_description)?;
        Some(Self {
            chrome,
            decor,
            description,
        })
    }

    /// The display description with the metadata line stripped; hosts show
    /// this instead of the raw type description.
    pub fn description(&self) -> &str {
        &self.description
    }

    fn apply_colors_and_source(&self, deco: &mut NodeDecoration) {
        if let Some(color) = &self.decor.color {
            deco.color = Some(color.clone());
        }
        if let Some(bg_color) = &self.decor.bg_color {
            deco.bg_color = Some(bg_color.clone());
        }
        let chrome = self.chrome.borrow();
        let editor_prefix = chrome.settings.editor_path_prefix.as_str();
        deco.source_link = match (&self.decor.source_location, editor_prefix.is_empty()) {
            (Some(location), false) => Some(format!("{editor_prefix}{location}")),
            _ => None,
        };
        deco.description = self.description.clone();
    }

    fn region_hit(&self, deco: &NodeDecoration, geom: &NodeGeometry, local_pos: Pos2) -> Option<RegionKind> {
        layout::regions_from_cached(deco, geom)
            .into_iter()
            .find(|region| layout::is_inside_rect(local_pos, region.rect))
            .map(|region| region.kind)
    }
}

impl NodeHooks for ChromeHook {
    fn on_node_created(&mut self, deco: &mut NodeDecoration, host: &mut dyn CanvasHost) {
        self.apply_colors_and_source(deco);
        if self.decor.width.is_some() || self.decor.height.is_some() {
            host.set_node_size(&deco.node_id, self.decor.width, self.decor.height);
        }
        deco.base_widget_count = host.widget_count(&deco.node_id);
        deco.src_link_width = INITIAL_SRC_LINK_WIDTH;
    }

    fn on_configure(
        &mut self,
        deco: &mut NodeDecoration,
        persisted_values: &[String],
        host: &mut dyn CanvasHost,
    ) {
        self.apply_colors_and_source(deco);
        deco.base_widget_count = host
            .widget_count(&deco.node_id)
            .saturating_sub(deco.show_values.len());
        show_values::apply_configured_values(deco, persisted_values, host);
    }

    fn on_executed(
        &mut self,
        deco: &mut NodeDecoration,
        output_text: Option<&[String]>,
        host: &mut dyn CanvasHost,
    ) {
        let Some(output_text) = output_text else {
            return;
        };
        show_values::apply_executed_values(deco, output_text, host);
    }

    fn on_draw_foreground(
        &mut self,
        deco: &mut NodeDecoration,
        geom: &NodeGeometry,
        painter: &egui::Painter,
    ) {
        if self.chrome.borrow().settings.render_icons {
            render::draw_node_chrome(deco, geom, painter);
        }
    }

    fn on_mouse_down(&mut self, deco: &NodeDecoration, geom: &NodeGeometry, local_pos: Pos2) -> bool {
        if !self.chrome.borrow().settings.render_icons || geom.collapsed {
            return false;
        }
        let intent = match self.region_hit(deco, geom, local_pos) {
            Some(RegionKind::Src) => deco
                .source_link
                .clone()
                .map(ChromeIntent::OpenExternal),
            Some(RegionKind::Log) => Some(ChromeIntent::OpenExternal(show_log_path(&deco.node_id))),
            _ => None,
        };
        match intent {
            Some(intent) => {
                self.chrome.borrow_mut().push_intent(intent);
                true
            }
            None => false,
        }
    }

    fn extra_menu_options(&mut self, deco: &NodeDecoration) -> Vec<MenuEntry> {
        let mut entries = Vec::new();
        if let Some(link) = &deco.source_link {
            entries.push(MenuEntry {
                label: "Open Source".to_string(),
                intent: ChromeIntent::OpenExternal(link.clone()),
            });
        }
        if deco.has_log {
            entries.push(MenuEntry {
                label: "View Log".to_string(),
                intent: ChromeIntent::OpenExternal(show_log_path(&deco.node_id)),
            });
        }
        entries
    }
}
