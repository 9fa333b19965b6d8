/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! HTTP log streaming worker.
//!
//! Each `start` spawns one tokio task that reads the chunked response body
//! incrementally and forwards decoded text over the viewer's channel. Tasks
//! are not aborted when the viewer moves to another node; their chunks are
//! discarded by the token guard on the receiving side. A shared cancellation
//! token stops all in-flight reads at shutdown.
//!
//! No retry or reconnect: a failed read logs a warning and ends the stream,
//! leaving whatever was buffered on display.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{LOG_ENDPOINT_PATH, LogChunk, LogStreamer};

pub struct HttpLogStreamer {
    client: reqwest::Client,
    base_url: Url,
    runtime: tokio::runtime::Handle,
    cancel: CancellationToken,
}

impl HttpLogStreamer {
    pub fn new(base_url: Url, runtime: tokio::runtime::Handle) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            runtime,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop all in-flight reads.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn endpoint_for(&self, node_id: &str) -> Result<Url, url::ParseError> {
        let mut url = self
            .base_url
            .join(LOG_ENDPOINT_PATH.trim_start_matches('/'))?;
        url.query_pairs_mut().append_pair("node", node_id);
        Ok(url)
    }
}

impl LogStreamer for HttpLogStreamer {
    fn start(&mut self, node_id: &str, token: u64, tx: mpsc::UnboundedSender<LogChunk>) {
        let url = match self.endpoint_for(node_id) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("bad log endpoint for node {node_id}: {e}");
                return;
            }
        };
        let client = self.client.clone();
        let cancel = self.cancel.clone();
        let node_id = node_id.to_string();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = stream_log(client, url, node_id, token, tx) => {}
            }
        });
    }
}

async fn stream_log(
    client: reqwest::Client,
    url: Url,
    node_id: String,
    token: u64,
    tx: mpsc::UnboundedSender<LogChunk>,
) {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("log request for node {node_id} failed: {e}");
            return;
        }
    };
    let mut body = response.bytes_stream();
    let mut carry = Utf8Carry::default();
    while let Some(next) = body.next().await {
        match next {
            Ok(bytes) => {
                let text = carry.push(&bytes);
                // A closed receiver means the viewer is gone.
                if !text.is_empty() && tx.send(LogChunk { token, text }).is_err() {
                    return;
                }
            }
            Err(e) => {
                log::warn!("log stream for node {node_id} ended early: {e}");
                return;
            }
        }
    }
}

/// Incremental UTF-8 decoding across chunk boundaries.
///
/// A multi-byte scalar split across two network chunks must not be decoded
/// lossily; the incomplete suffix is carried into the next push.
#[derive(Default)]
pub(crate) struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let out = text.to_owned();
                self.pending.clear();
                out
            }
            Err(e) if e.error_len().is_none() => {
                // Incomplete trailing sequence: emit the valid prefix, keep
                // the tail for the next chunk.
                let valid = e.valid_up_to();
                let out = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                out
            }
            Err(_) => {
                // Truly invalid bytes: decode lossily and move on.
                let out = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                out
            }
        }
    }
}
