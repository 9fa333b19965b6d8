/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Chrome configuration values.
//!
//! Persistence is host-owned; this module only defines the values, their
//! defaults, and the descriptors a host settings panel registers.

use serde::{Deserialize, Serialize};

pub const SETTING_EDITOR_PATH_PREFIX: &str = "node_chrome.editor_path_prefix";
pub const SETTING_SOURCE_PATH_PREFIX: &str = "node_chrome.source_path_prefix";
pub const SETTING_RELOAD_ON_EDIT: &str = "node_chrome.reload_on_edit";
pub const SETTING_RENDER_ICONS: &str = "node_chrome.render_icons";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeSettings {
    /// URI prefix turning a bare file path into an editor deep link. Empty
    /// disables source links and the error-dialog upgrade.
    pub editor_path_prefix: String,
    /// Filesystem prefix stripped from displayed (but not linked) paths.
    pub source_path_prefix: String,
    /// Auto-reload node source files on edits.
    pub reload_on_edit: bool,
    /// Draw the src/info/log icons in node title bars. When off the icons,
    /// hover routing, and click affordances are disabled; the context-menu
    /// entries remain available.
    pub render_icons: bool,
}

impl Default for ChromeSettings {
    fn default() -> Self {
        Self {
            editor_path_prefix: String::new(),
            source_path_prefix: String::new(),
            reload_on_edit: false,
            render_icons: true,
        }
    }
}

impl ChromeSettings {
    /// True when neither path prefix is configured; the error-dialog
    /// upgrade stays entirely opt-in in that case.
    pub fn error_links_disabled(&self) -> bool {
        self.editor_path_prefix.is_empty() && self.source_path_prefix.is_empty()
    }
}

/// Value shape of one registerable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Text,
    Boolean,
}

/// Descriptor a host settings panel registers for one chrome setting.
#[derive(Debug, Clone, Copy)]
pub struct SettingDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: SettingKind,
}

/// All chrome settings, in registration order.
pub fn setting_descriptors() -> [SettingDescriptor; 4] {
    [
        SettingDescriptor {
            id: SETTING_EDITOR_PATH_PREFIX,
            label: "🪄 Stack trace link prefix (makes stack traces clickable, e.g. 'vscode://vscode-remote/wsl+Ubuntu')",
            kind: SettingKind::Text,
        },
        SettingDescriptor {
            id: SETTING_SOURCE_PATH_PREFIX,
            label: "🪄 Stack trace remove prefix (common prefix to remove, e.g '/home/user/project/')",
            kind: SettingKind::Text,
        },
        SettingDescriptor {
            id: SETTING_RELOAD_ON_EDIT,
            label: "🪄 Auto-reload node source files on edits.",
            kind: SettingKind::Boolean,
        },
        SettingDescriptor {
            id: SETTING_RENDER_ICONS,
            label: "🪄 Render src, log, and info icons in node titlebars. If false, can still be accessed via menu.",
            kind: SettingKind::Boolean,
        },
    ]
}
