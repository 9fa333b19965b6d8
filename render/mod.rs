/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Title-bar icon drawing and the tooltip overlay pass.
//!
//! Icons are drawn inside the host's node paint pass and refresh the
//! decoration's cached region widths. The tooltip renders in a dedicated
//! post-composition pass on a foreground layer painter in device space, so
//! it stays upright and correctly placed under pan/zoom.

use std::sync::LazyLock;

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, pos2, vec2};
use regex::Regex;

use crate::layout::{self, NodeGeometry};
use crate::model::NodeDecoration;

const FONT_SIZE: f32 = 14.0;
const TOOLTIP_LINE_HEIGHT: f32 = 18.0;
const TOOLTIP_PADDING: f32 = 20.0;
const TOOLTIP_TEXT_INSET: f32 = 10.0;
/// Vertical gap between the anchor and the bubble's bottom edge; the tail
/// spans it.
const TOOLTIP_TAIL_HEIGHT: f32 = 15.0;

const SRC_LINK_COLOR: Color32 = Color32::from_rgb(0x22, 0x77, 0xFF);
const ICON_COLOR: Color32 = Color32::from_gray(0xDD);
const TOOLTIP_BG: Color32 = Color32::from_rgb(0x2E, 0x2E, 0x2E);
const TOOLTIP_TEXT_COLOR: Color32 = Color32::from_rgb(0xE4, 0xE4, 0xE4);

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static pattern compiles"));

/// Single active tooltip for the whole canvas; the last hit-test result wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipState {
    text: Option<String>,
    anchor: Pos2,
}

impl TooltipState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, text: impl Into<String>, anchor: Pos2) {
        self.text = Some(text.into());
        self.anchor = anchor;
    }

    pub fn clear(&mut self) {
        self.text = None;
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn anchor(&self) -> Pos2 {
        self.anchor
    }

    pub fn is_active(&self) -> bool {
        self.text.is_some()
    }
}

/// Flatten an HTML-like fragment to its text-node content, discarding tag
/// markup and per-span coloring.
pub fn flatten_markup(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

/// Bubble rectangle for a tooltip: centered above the anchor, clear of the
/// tail gap.
pub(crate) fn tooltip_bubble_rect(anchor: Pos2, max_line_width: f32, line_count: usize) -> Rect {
    let width = max_line_width + TOOLTIP_PADDING;
    let height = line_count as f32 * TOOLTIP_LINE_HEIGHT;
    Rect::from_min_size(
        pos2(
            anchor.x - width / 2.0,
            anchor.y - TOOLTIP_TAIL_HEIGHT - height,
        ),
        vec2(width, height),
    )
}

/// Draw a node's title-bar icons, refreshing the decoration's cached region
/// widths from the live font. `painter` must be in the same space as
/// `geom.pos`.
pub fn draw_node_chrome(deco: &mut NodeDecoration, geom: &NodeGeometry, painter: &Painter) {
    if geom.collapsed {
        return;
    }
    let font = FontId::proportional(FONT_SIZE);
    let mut measure = |text: &str| {
        painter
            .layout_no_wrap(text.to_owned(), font.clone(), ICON_COLOR)
            .size()
            .x
    };
    let regions = layout::layout_regions(deco, geom.size.x, geom.collapsed, &mut measure);
    for region in regions {
        let color = match region.kind {
            layout::RegionKind::Src => SRC_LINK_COLOR,
            _ => ICON_COLOR,
        };
        let anchor = geom.pos + region.rect.left_center().to_vec2();
        painter.text(
            anchor,
            Align2::LEFT_CENTER,
            region.kind.label(),
            font.clone(),
            color,
        );
    }
}

/// Render the active tooltip, if any: a shadowed rounded bubble with a
/// downward tail, one line per literal newline, no wrapping.
pub fn draw_tooltip(painter: &Painter, state: &TooltipState) {
    let Some(text) = state.text() else {
        return;
    };
    let font = FontId::monospace(FONT_SIZE);
    let galleys: Vec<_> = text
        .split('\n')
        .map(|line| {
            painter.layout_no_wrap(flatten_markup(line.trim()), font.clone(), TOOLTIP_TEXT_COLOR)
        })
        .collect();
    let max_line_width = galleys.iter().map(|g| g.size().x).fold(0.0_f32, f32::max);
    let anchor = state.anchor();
    let bubble = tooltip_bubble_rect(anchor, max_line_width, galleys.len());

    painter.rect_filled(
        bubble.translate(vec2(2.0, 2.0)),
        5.0,
        Color32::from_black_alpha(128),
    );
    painter.rect_filled(bubble, 5.0, TOOLTIP_BG);
    painter.add(Shape::convex_polygon(
        vec![
            pos2(anchor.x - 10.0, anchor.y - TOOLTIP_TAIL_HEIGHT),
            pos2(anchor.x + 10.0, anchor.y - TOOLTIP_TAIL_HEIGHT),
            pos2(anchor.x, anchor.y - 5.0),
        ],
        TOOLTIP_BG,
        Stroke::NONE,
    ));

    for (i, galley) in galleys.into_iter().enumerate() {
        let line_top = bubble.min.y + i as f32 * TOOLTIP_LINE_HEIGHT;
        let pos = pos2(
            bubble.min.x + TOOLTIP_TEXT_INSET,
            line_top + (TOOLTIP_LINE_HEIGHT - galley.size().y) / 2.0,
        );
        painter.galley(pos, galley, TOOLTIP_TEXT_COLOR);
    }
}
