/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Show-value widget resizing.
//!
//! Invariant: a node's total widget count is always
//! `base_widget_count + show_values.len()`, and `show_values.len()` equals
//! the most recently reported value count. Growth appends fresh read-only
//! display widgets; shrinkage removes trailing widgets, truncates the host's
//! general widget list, and detaches the removed backing elements.

use crate::hooks::CanvasHost;
use crate::model::{DisplayWidget, NodeDecoration};

/// Resize the show-value tail to exactly `target` widgets.
pub fn resize_show_values(
    deco: &mut NodeDecoration,
    target: usize,
    host: &mut dyn CanvasHost,
) {
    let current = deco.show_values.len();
    if target > current {
        for i in current..target {
            let handle = host.create_text_display(&deco.node_id, &format!("output{i}"));
            deco.show_values.push(DisplayWidget::new(handle));
        }
    } else if target < current {
        let removed = deco.show_values.split_off(target);
        host.truncate_widgets(&deco.node_id, deco.base_widget_count + target);
        for widget in removed {
            host.detach_widget(widget.handle);
        }
    }
}

/// Configuration-load call site: the persisted widget values carry the base
/// widgets first, then the show-value tail. A persisted count below the base
/// count clamps the target to zero.
pub fn apply_configured_values(
    deco: &mut NodeDecoration,
    persisted_values: &[String],
    host: &mut dyn CanvasHost,
) {
    let target = persisted_values.len().saturating_sub(deco.base_widget_count);
    resize_show_values(deco, target, host);
    let tail = persisted_values
        .get(deco.base_widget_count..)
        .unwrap_or_default();
    for (widget, value) in deco.show_values.iter_mut().zip(tail) {
        widget.value = value.clone();
    }
}

/// Execution-result call site: one widget per reported output line, then the
/// node recomputes its visual size and the canvas is redrawn.
pub fn apply_executed_values(
    deco: &mut NodeDecoration,
    output_text: &[String],
    host: &mut dyn CanvasHost,
) {
    resize_show_values(deco, output_text.len(), host);
    for (widget, value) in deco.show_values.iter_mut().zip(output_text) {
        widget.value = value.clone();
    }
    host.recompute_node_size(&deco.node_id);
    host.mark_canvas_dirty();
}
