/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Pointer hit-test routing for title-bar affordances.
//!
//! Runs after the canvas's own pointer handling, never instead of it. This
//! module decouples hit detection (pure geometry over cached widths) from
//! state application on the controller, making the routing testable without
//! a canvas.

use egui::{CursorIcon, Pos2};

use crate::layout::{self, NodeGeometry, RegionKind};
use crate::model::NodeDecoration;

/// Fixed tooltip shown while hovering the log affordance.
pub const LOG_TOOLTIP_LABEL: &str = "View Log";

/// Result of routing one pointer-move.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// No node, collapsed node, or no active region under the pointer:
    /// clear the tooltip and arm the log-viewer hide.
    Clear,
    /// The pointer is strictly inside an active region.
    Hit {
        kind: RegionKind,
        cursor: CursorIcon,
        tooltip: String,
    },
}

/// Resolve the region under the pointer for the node returned by the host's
/// spatial query. Region rectangles come from the widths cached by the last
/// draw pass; nothing is re-measured here. Priority is Src, then Info, then
/// Log; the first strict hit wins.
pub fn route_pointer_move(
    pointer: Pos2,
    hit: Option<(&NodeDecoration, &NodeGeometry)>,
) -> PointerOutcome {
    let Some((deco, geom)) = hit else {
        return PointerOutcome::Clear;
    };
    if geom.collapsed {
        return PointerOutcome::Clear;
    }
    let local = geom.to_local(pointer);
    for region in layout::regions_from_cached(deco, geom) {
        if !layout::is_inside_rect(local, region.rect) {
            continue;
        }
        return match region.kind {
            RegionKind::Src => PointerOutcome::Hit {
                kind: RegionKind::Src,
                cursor: CursorIcon::PointingHand,
                tooltip: deco.source_link.clone().unwrap_or_default(),
            },
            RegionKind::Info => PointerOutcome::Hit {
                kind: RegionKind::Info,
                cursor: CursorIcon::Help,
                tooltip: deco.description.trim().to_string(),
            },
            RegionKind::Log => PointerOutcome::Hit {
                kind: RegionKind::Log,
                cursor: CursorIcon::PointingHand,
                tooltip: LOG_TOOLTIP_LABEL.to_string(),
            },
        };
    }
    PointerOutcome::Clear
}
