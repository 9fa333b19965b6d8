/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Execution-error reformatting and the dialog interception gate.
//!
//! The text transforms are pure functions: [`rewrite_file_line_refs`]
//! canonicalizes `File "<path>", line <n>, in <name>` traceback lines to
//! `<path>:<n>`, and [`linkify_path_line`] turns `<path>:<line>` occurrences
//! into editor deep-link anchors. [`format_execution_error`] composes them
//! into the dialog HTML, tagged with a marker class the gate recognizes.
//!
//! The gate wraps the host's shared "show dialog" entry point. It installs at
//! most once per controller lifetime; once installed, execution-error HTML
//! without the marker class is suppressed so only the reformatted version
//! reaches the user, while every other dialog passes straight through.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::events::ExecutionErrorEvent;

/// Phrase identifying an execution-error dialog; also the header lead-in.
pub const ERROR_HEADER_PHRASE: &str = "Error occurred when executing";

/// Marker class stamped on formatted error headers; its presence lets an
/// already-processed dialog through the gate unchanged.
pub const ERROR_MARKER_CLASS: &str = "custom-error";

const ERROR_MARKER_ATTR: &str = "class=\"custom-error\"";

/// Placeholder shown when an error event arrives without a usable record.
pub const UNKNOWN_ERROR_PLACEHOLDER: &str = "(unknown error)";

static FILE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"File "(.+)", line (\d+), in .+"#).expect("static pattern compiles")
});

/// Rewrite every `File "<path>", line <n>, in <name>` occurrence to the
/// canonical short form `<path>:<n>`.
pub fn rewrite_file_line_refs(text: &str) -> String {
    FILE_LINE_RE.replace_all(text, "${1}:${2}").into_owned()
}

/// Compile the `<prefix><path>:<line>` matcher for a configured strip
/// prefix. The prefix is regex-escaped, so compilation cannot realistically
/// fail; if it ever does the linkifier is disabled for the call rather than
/// panicking.
fn path_line_regex(strip_prefix: &str) -> Option<Regex> {
    // Without a configured prefix there is nothing anchoring the start of a
    // path, so the path part must not cross whitespace; with one, the
    // escaped prefix anchors the match and the path may contain spaces.
    let (prefix_pattern, path_pattern) = if strip_prefix.is_empty() {
        ("/?".to_string(), r"\S*?")
    } else {
        (regex::escape(strip_prefix), r".*?")
    };
    match Regex::new(&format!(r"({prefix_pattern})({path_pattern}):(\d+)")) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("path linkifier disabled for this message: {e}");
            None
        }
    }
}

/// Replace `<path>:<line>` occurrences with editor deep-link anchors.
///
/// The displayed path has `strip_prefix` removed when one is configured and
/// is shown unstripped otherwise; the link target always carries the full
/// path. Empty `editor_prefix` disables the transform.
pub fn linkify_path_line(text: &str, editor_prefix: &str, strip_prefix: &str) -> String {
    if editor_prefix.is_empty() {
        return text.to_owned();
    }
    let Some(re) = path_line_regex(strip_prefix) else {
        return text.to_owned();
    };
    re.replace_all(text, |caps: &Captures<'_>| {
        let prefix = &caps[1];
        let path = &caps[2];
        let line = &caps[3];
        let display = if strip_prefix.is_empty() {
            format!("{prefix}{path}")
        } else {
            path.to_string()
        };
        format!(
            r#"<a href="{editor_prefix}{prefix}{path}:{line}" style="color:orange">{display}:{line}</a>"#
        )
    })
    .into_owned()
}

/// Format an execution-error record into dialog HTML.
///
/// Location references are canonicalized in both the message and the
/// traceback. Link injection applies to the message; the traceback is only
/// linkified when the message had no location matches, so a location that
/// appears in both is not linkified twice. The traceback span is appended
/// only when it differs from the formatted message.
pub fn format_execution_error(
    error: Option<&ExecutionErrorEvent>,
    editor_prefix: &str,
    strip_prefix: &str,
) -> String {
    let Some(error) = error else {
        return UNKNOWN_ERROR_PLACEHOLDER.to_string();
    };

    let message = rewrite_file_line_refs(&error.exception_message);
    let traceback = rewrite_file_line_refs(&error.traceback.joined());

    let (formatted_message, formatted_traceback) = if editor_prefix.is_empty() {
        (message, traceback)
    } else {
        let message_has_locations = path_line_regex(strip_prefix)
            .map(|re| re.is_match(&message))
            .unwrap_or(false);
        let formatted_message = linkify_path_line(&message, editor_prefix, strip_prefix);
        let formatted_traceback = if message_has_locations {
            traceback
        } else {
            linkify_path_line(&traceback, editor_prefix, strip_prefix)
        };
        (formatted_message, formatted_traceback)
    };

    let mut out = format!(
        "{ERROR_HEADER_PHRASE} <span style=\"color:red\" {ERROR_MARKER_ATTR}>{} [{}]</span>:\n\n\
         <span style=\"color:white\">{formatted_message}</span>",
        error.node_type, error.node_id,
    );
    if formatted_traceback != formatted_message {
        out.push_str(&format!(
            "\n\n<span style=\"color:lightblue\">{formatted_traceback}</span>"
        ));
    }
    out
}

/// The host's shared "show dialog" entry point.
pub trait DialogSink {
    fn show_dialog(&mut self, html: &str);
}

/// Install-at-most-once interception of a [`DialogSink`].
pub struct DialogGate {
    inner: Box<dyn DialogSink>,
    installed: bool,
}

impl DialogGate {
    pub fn new(inner: Box<dyn DialogSink>) -> Self {
        Self {
            inner,
            installed: false,
        }
    }

    /// Arm the interception. Returns true the first time only; later calls
    /// are no-ops so repeated error events never stack wrappers.
    pub fn install(&mut self) -> bool {
        let newly_installed = !self.installed;
        self.installed = true;
        newly_installed
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Route HTML to the underlying sink, applying the interception rules
    /// once installed: non-error dialogs and already-formatted error dialogs
    /// (marker class present) pass through; raw execution-error dialogs are
    /// suppressed at this call site.
    pub fn show(&mut self, html: &str) {
        if !self.installed
            || !html.contains(ERROR_HEADER_PHRASE)
            || html.contains(ERROR_MARKER_ATTR)
        {
            self.inner.show_dialog(html);
            return;
        }
        log::debug!("suppressed unformatted execution-error dialog");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Traceback;

    fn event(message: &str, traceback: &str) -> ExecutionErrorEvent {
        ExecutionErrorEvent {
            traceback: Traceback::Text(traceback.to_string()),
            exception_message: message.to_string(),
            node_id: "17".to_string(),
            node_type: "Add".to_string(),
        }
    }

    #[test]
    fn test_rewrite_file_line_refs() {
        assert_eq!(
            rewrite_file_line_refs("File \"a.py\", line 5, in f"),
            "a.py:5"
        );
        assert_eq!(
            rewrite_file_line_refs("before\nFile \"/x/y.py\", line 12, in <module>\nafter"),
            "before\n/x/y.py:12\nafter"
        );
        assert_eq!(rewrite_file_line_refs("no refs here"), "no refs here");
    }

    #[test]
    fn test_linkify_without_strip_prefix() {
        let out = linkify_path_line("boom at a.py:5", "vscode://x/", "");
        assert_eq!(
            out,
            "boom at <a href=\"vscode://x/a.py:5\" style=\"color:orange\">a.py:5</a>"
        );
    }

    #[test]
    fn test_linkify_keeps_leading_slash_in_display_and_link() {
        let out = linkify_path_line("at /src/a.py:5", "vscode://x", "");
        assert_eq!(
            out,
            "at <a href=\"vscode://x/src/a.py:5\" style=\"color:orange\">/src/a.py:5</a>"
        );
    }

    #[test]
    fn test_linkify_strips_configured_prefix_from_display_only() {
        let out = linkify_path_line("at /home/u/proj/a.py:5", "vscode://x", "/home/u/proj/");
        assert_eq!(
            out,
            "at <a href=\"vscode://x/home/u/proj/a.py:5\" style=\"color:orange\">a.py:5</a>"
        );
    }

    #[test]
    fn test_linkify_escapes_strip_prefix_metacharacters() {
        let out = linkify_path_line("at C:\\proj(x)\\a.py:5", "vscode://x/", "C:\\proj(x)\\");
        assert!(out.contains("style=\"color:orange\">a.py:5</a>"));
    }

    #[test]
    fn test_linkify_disabled_without_editor_prefix() {
        assert_eq!(linkify_path_line("at a.py:5", "", "/x/"), "at a.py:5");
    }

    #[test]
    fn test_format_rewrites_and_links_message() {
        let ev = event("fail in File \"a.py\", line 5, in f", "trace body");
        let html = format_execution_error(Some(&ev), "vscode://x/", "");
        assert!(html.contains("Error occurred when executing"));
        assert!(html.contains("class=\"custom-error\">Add [17]</span>"));
        assert!(
            html.contains("<a href=\"vscode://x/a.py:5\" style=\"color:orange\">a.py:5</a>")
        );
    }

    #[test]
    fn test_format_does_not_linkify_traceback_when_message_matched() {
        let ev = event(
            "boom at /src/a.py:5",
            "Traceback:\nFile \"/src/a.py\", line 5, in f\n",
        );
        let html = format_execution_error(Some(&ev), "vscode://x", "");
        // One anchor from the message; the traceback's occurrence stays bare.
        assert_eq!(html.matches("<a href=").count(), 1);
        assert!(html.contains("color:lightblue"));
        assert!(html.contains("/src/a.py:5\n"));
    }

    #[test]
    fn test_format_linkifies_traceback_when_message_has_no_locations() {
        let ev = event("boom", "Traceback:\nFile \"/src/a.py\", line 5, in f\n");
        let html = format_execution_error(Some(&ev), "vscode://x", "");
        assert_eq!(html.matches("<a href=").count(), 1);
        assert!(html.contains("color:lightblue"));
    }

    #[test]
    fn test_format_omits_traceback_when_identical_to_message() {
        let ev = event("same text", "same text");
        let html = format_execution_error(Some(&ev), "", "");
        assert!(!html.contains("lightblue"));
    }

    #[test]
    fn test_format_missing_record_yields_placeholder() {
        assert_eq!(format_execution_error(None, "e", "s"), "(unknown error)");
    }

    #[derive(Default)]
    struct RecordingSink(std::rc::Rc<std::cell::RefCell<Vec<String>>>);

    impl DialogSink for RecordingSink {
        fn show_dialog(&mut self, html: &str) {
            self.0.borrow_mut().push(html.to_string());
        }
    }

    fn recording_gate() -> (DialogGate, std::rc::Rc<std::cell::RefCell<Vec<String>>>) {
        let shown = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let gate = DialogGate::new(Box::new(RecordingSink(shown.clone())));
        (gate, shown)
    }

    #[test]
    fn test_uninstalled_gate_passes_everything_through() {
        let (mut gate, shown) = recording_gate();
        gate.show("Error occurred when executing raw");
        assert_eq!(shown.borrow().len(), 1);
    }

    #[test]
    fn test_installed_gate_suppresses_raw_error_dialogs_only() {
        let (mut gate, shown) = recording_gate();
        assert!(gate.install());
        assert!(!gate.install());

        gate.show("plain informational dialog");
        gate.show("Error occurred when executing raw");
        gate.show("Error occurred when executing <span class=\"custom-error\">Add [17]</span>");
        let shown = shown.borrow();
        assert_eq!(shown.len(), 2);
        assert!(shown[1].contains("custom-error"));
    }

    #[test]
    fn test_gate_never_double_formats_marked_html() {
        let (mut gate, shown) = recording_gate();
        gate.install();
        let ev = event("boom", "trace");
        let html = format_execution_error(Some(&ev), "vscode://x/", "");
        gate.show(&html);
        gate.show(&html);
        let shown = shown.borrow();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0], html);
        assert_eq!(shown[1], html);
    }
}
