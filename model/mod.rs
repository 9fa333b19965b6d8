/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Per-node decoration state and the node-type metadata convention.
//!
//! A [`NodeDecoration`] is owned by the host alongside its node and mutated
//! only through the lifecycle hooks and event handlers in this crate. The
//! node-type side carries its decoration data crammed into the first line of
//! the type description as JSON behind the [`METADATA_MARKER`] prefix.

use serde::Deserialize;

use crate::hooks::WidgetHandle;
use crate::layout::RegionKind;

pub mod show_values;

/// Width seeded for the source-link region at node creation, before the
/// first draw pass has measured the real label.
pub const INITIAL_SRC_LINK_WIDTH: f32 = 20.0;

/// A node-type description starting with this marker carries first-line JSON
/// metadata; the remaining lines are the actual display description.
pub const METADATA_MARKER: &str = "EasyNodesInfo=";

/// One trailing read-only display widget mirroring one element of a node's
/// multi-value output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayWidget {
    /// Host-side handle for the backing UI element.
    pub handle: WidgetHandle,
    pub value: String,
}

impl DisplayWidget {
    pub fn new(handle: WidgetHandle) -> Self {
        Self {
            handle,
            value: String::new(),
        }
    }
}

/// Decoration state for one visual node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDecoration {
    /// Host node id, matching the string ids used on the wire.
    pub node_id: String,
    pub color: Option<String>,
    pub bg_color: Option<String>,
    /// Full editor deep link (editor prefix + source location). Set only
    /// when an editor prefix is configured; gates the Src affordance.
    pub source_link: Option<String>,
    pub description: String,
    pub has_log: bool,
    /// Region widths cached by the last draw pass for the pointer path.
    pub src_link_width: f32,
    pub info_width: f32,
    pub log_width: f32,
    /// Number of host-owned widgets preceding the show-value tail.
    pub base_widget_count: usize,
    pub show_values: Vec<DisplayWidget>,
}

impl NodeDecoration {
    pub fn new(node_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            color: None,
            bg_color: None,
            source_link: None,
            description: description.into(),
            has_log: false,
            src_link_width: INITIAL_SRC_LINK_WIDTH,
            info_width: 0.0,
            log_width: 0.0,
            base_widget_count: 0,
            show_values: Vec::new(),
        }
    }

    pub fn region_width(&self, kind: RegionKind) -> f32 {
        match kind {
            RegionKind::Src => self.src_link_width,
            RegionKind::Info => self.info_width,
            RegionKind::Log => self.log_width,
        }
    }

    pub(crate) fn set_region_width(&mut self, kind: RegionKind, width: f32) {
        match kind {
            RegionKind::Src => self.src_link_width = width,
            RegionKind::Info => self.info_width = width,
            RegionKind::Log => self.log_width = width,
        }
    }
}

/// Decoration metadata parsed from a node type's first description line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeTypeDecor {
    pub color: Option<String>,
    pub bg_color: Option<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub source_location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    Json(String),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Json(e) => write!(f, "metadata JSON error: {e}"),
        }
    }
}

/// Parse the metadata convention out of a node-type description.
///
/// Returns `Ok(None)` when the description does not carry the marker,
/// `Ok(Some((decor, remaining_description)))` when it does, and
/// `Err` when the first line is marked but malformed.
pub fn parse_node_type_metadata(
    description: &str,
) -> Result<Option<(NodeTypeDecor, String)>, MetadataError> {
    let Some(marked) = description.strip_prefix(METADATA_MARKER) else {
        return Ok(None);
    };
    let (json_line, remainder) = match marked.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (marked, ""),
    };
    let decor: NodeTypeDecor =
        serde_json::from_str(json_line).map_err(|e| MetadataError::Json(e.to_string()))?;
    Ok(Some((decor, remainder.to_string())))
}

/// Hardened entry point for registration: a malformed marked line is logged
/// and the node type registers undecorated.
pub fn decor_from_description(description: &str) -> Option<(NodeTypeDecor, String)> {
    match parse_node_type_metadata(description) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("ignoring malformed node-type metadata: {e}");
            None
        }
    }
}
