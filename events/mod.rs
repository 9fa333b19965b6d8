/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Inbound event payloads from the execution backend.

use std::collections::HashSet;

use serde::Deserialize;

use crate::model::NodeDecoration;

/// Payload of an `execution_error` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutionErrorEvent {
    pub traceback: Traceback,
    pub exception_message: String,
    pub node_id: String,
    pub node_type: String,
}

/// A traceback arrives either as one string or as an ordered sequence of
/// fragments; the fragments concatenate without separators.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Traceback {
    Text(String),
    Lines(Vec<String>),
}

impl Traceback {
    pub fn joined(&self) -> String {
        match self {
            Traceback::Text(text) => text.clone(),
            Traceback::Lines(lines) => lines.concat(),
        }
    }
}

/// Payload of a `logs_updated` event: the node ids that currently have log
/// output available, as strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogsUpdatedEvent {
    pub nodes_with_logs: Vec<String>,
}

/// Set each live node's `has_log` flag to its membership in the event set.
pub fn apply_logs_updated<'a>(
    event: &LogsUpdatedEvent,
    nodes: impl IntoIterator<Item = &'a mut NodeDecoration>,
) {
    let with_logs: HashSet<&str> = event.nodes_with_logs.iter().map(String::as_str).collect();
    for deco in nodes {
        deco.has_log = with_logs.contains(deco.node_id.as_str());
    }
}
