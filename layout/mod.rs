/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Title-bar region layout and hit geometry.
//!
//! Icon regions stack right-to-left from the node's right edge in fixed
//! priority order Src, Info, Log. Rectangles are ephemeral: the draw pass
//! recomputes them from the live measurement context every frame (recording
//! widths on the decoration), and the pointer path recomputes them from
//! those cached widths without re-measuring. Nothing here is persisted.

use egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::model::NodeDecoration;

/// Gap between the node's right edge and the first (rightmost) region.
pub const START_OFFSET: f32 = 10.0;

/// Height of the title bar the regions live in. The title bar sits above the
/// node body, so region rects span `y ∈ [-TITLE_BAR_HEIGHT, 0)` in node-local
/// coordinates.
pub const TITLE_BAR_HEIGHT: f32 = 30.0;

/// Fixed label drawn for the source-jump affordance.
pub const SRC_LABEL: &str = "src";
/// Fixed label drawn for the info affordance.
pub const INFO_LABEL: &str = "  ℹ️  ";
/// Fixed label drawn for the log affordance.
pub const LOG_LABEL: &str = "📜";

/// Host-owned node placement, passed in by the canvas each call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeGeometry {
    /// Top-left of the node body in the painter's coordinate space.
    pub pos: Pos2,
    /// Node body size.
    pub size: Vec2,
    /// Collapsed nodes get no regions and no icons.
    pub collapsed: bool,
}

impl NodeGeometry {
    pub fn new(pos: Pos2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            collapsed: false,
        }
    }

    /// Translate a pointer position into node-local coordinates.
    pub fn to_local(&self, pointer: Pos2) -> Pos2 {
        (pointer - self.pos).to_pos2()
    }
}

/// Which title-bar affordance a region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Src,
    Info,
    Log,
}

impl RegionKind {
    /// Fixed stacking order, rightmost first.
    pub const ORDER: [Self; 3] = [Self::Src, Self::Info, Self::Log];

    pub fn label(self) -> &'static str {
        match self {
            Self::Src => SRC_LABEL,
            Self::Info => INFO_LABEL,
            Self::Log => LOG_LABEL,
        }
    }
}

/// One hit-test/draw rectangle for a title-bar affordance, in node-local
/// coordinates (origin at the node body's top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub kind: RegionKind,
    pub rect: Rect,
}

fn is_active(kind: RegionKind, deco: &NodeDecoration) -> bool {
    match kind {
        RegionKind::Src => deco.source_link.is_some(),
        RegionKind::Info => !deco.description.trim().is_empty(),
        RegionKind::Log => deco.has_log,
    }
}

fn stack_regions(deco: &NodeDecoration, node_width: f32) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut cursor = node_width - START_OFFSET;
    for kind in RegionKind::ORDER {
        if !is_active(kind, deco) {
            continue;
        }
        let width = deco.region_width(kind);
        cursor -= width;
        regions.push(Region {
            kind,
            rect: Rect::from_min_size(
                pos2(cursor, -TITLE_BAR_HEIGHT),
                vec2(width, TITLE_BAR_HEIGHT),
            ),
        });
    }
    regions
}

/// Measure and place the active regions for one node, recording the measured
/// widths on the decoration. Inactive affordances get width 0. Collapsed
/// nodes produce nothing.
///
/// `measure` is the title-bar text measurement (an egui galley width in
/// production, a stub in tests).
pub fn layout_regions(
    deco: &mut NodeDecoration,
    node_width: f32,
    collapsed: bool,
    measure: &mut dyn FnMut(&str) -> f32,
) -> Vec<Region> {
    if collapsed {
        return Vec::new();
    }
    for kind in RegionKind::ORDER {
        let width = if is_active(kind, deco) {
            measure(kind.label())
        } else {
            0.0
        };
        deco.set_region_width(kind, width);
    }
    stack_regions(deco, node_width)
}

/// Rebuild region rectangles from the widths cached by the last draw pass.
///
/// The pointer path runs every mouse move; reusing cached widths avoids
/// touching the measurement context per frame.
pub fn regions_from_cached(deco: &NodeDecoration, geom: &NodeGeometry) -> Vec<Region> {
    if geom.collapsed {
        return Vec::new();
    }
    stack_regions(deco, geom.size.x)
}

/// Strictly-inside point test: points on any edge do not hit.
pub fn is_inside_rect(p: Pos2, rect: Rect) -> bool {
    rect.min.x < p.x && p.x < rect.max.x && rect.min.y < p.y && p.y < rect.max.y
}
