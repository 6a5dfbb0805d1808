//! Attribute directives: assignment, deletion and multi-line continuation.
//!
//! Writes go straight into the [`Document`] attribute store, in line order.
//! Externally supplied overrides silently win over any directive touching
//! the same name.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;
use crate::substitution::{PASS_SUBS, SubName, Substitutor};

/// Continuation marker on an attribute value line.
const CONTINUATION_MARKER: &str = " +";

/// Inline passthrough macro spanning a whole attribute value:
/// `pass:[text]` or `pass:a,q[text]`.
static PASS_MACRO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pass:([a-z_,]*)\[(.*)\]$").unwrap());

/// Sanitize a raw attribute name: keep word characters and hyphens,
/// lowercase the result.
pub(crate) fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Open continuation: an assignment whose value is still being collected.
#[derive(Debug)]
struct Continuation {
    name: String,
    value: String,
}

/// What the continuation stage did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContinuationOutcome {
    /// The line was absorbed into (or closed) the continuation.
    Absorbed,
    /// The line closed the continuation but must be reprocessed normally.
    Reprocess,
}

/// Applies attribute directives to the document's attribute store.
#[derive(Debug)]
pub(crate) struct AttributeProcessor {
    overrides: HashMap<String, String>,
    continuation: Option<Continuation>,
}

impl AttributeProcessor {
    pub(crate) fn new(overrides: HashMap<String, String>) -> Self {
        Self {
            overrides,
            continuation: None,
        }
    }

    /// Whether a continuation is currently open.
    pub(crate) fn is_continuing(&self) -> bool {
        self.continuation.is_some()
    }

    /// Handle an assignment directive `:name: value`.
    pub(crate) fn assign(
        &mut self,
        raw_name: &str,
        value: &str,
        doc: &mut dyn Document,
        substitutor: &dyn Substitutor,
    ) {
        let name = sanitize_name(raw_name);
        if let Some(partial) = value.strip_suffix(CONTINUATION_MARKER) {
            self.continuation = Some(Continuation {
                name,
                value: partial.trim().to_owned(),
            });
        } else {
            self.store(&name, value, doc, substitutor);
        }
    }

    /// Handle a deletion directive `:name!:`.
    pub(crate) fn delete(&mut self, raw_name: &str, doc: &mut dyn Document) {
        let name = sanitize_name(raw_name);
        if self.is_overridden(&name) {
            tracing::debug!(%name, "attribute deletion suppressed by override");
            return;
        }
        doc.delete_attribute(&name);
        if name == "backend" {
            doc.backend_updated();
        }
    }

    /// Feed a line into the open continuation.
    ///
    /// A line ending with the marker extends the value and stays open; a
    /// blank line closes the continuation and is handed back for normal
    /// processing; any other line extends the value and closes it.
    pub(crate) fn continue_line(
        &mut self,
        text: &str,
        doc: &mut dyn Document,
        substitutor: &dyn Substitutor,
    ) -> ContinuationOutcome {
        if text.trim().is_empty() {
            if let Some(open) = self.continuation.take() {
                self.store(&open.name, &open.value, doc, substitutor);
            }
            return ContinuationOutcome::Reprocess;
        }
        if let Some(chunk) = text.strip_suffix(CONTINUATION_MARKER) {
            if let Some(open) = &mut self.continuation {
                append_chunk(&mut open.value, chunk.trim());
            }
            return ContinuationOutcome::Absorbed;
        }
        if let Some(mut open) = self.continuation.take() {
            append_chunk(&mut open.value, text.trim());
            self.store(&open.name, &open.value, doc, substitutor);
        }
        ContinuationOutcome::Absorbed
    }

    fn is_overridden(&self, name: &str) -> bool {
        self.overrides.contains_key(name) || self.overrides.contains_key(&format!("{name}!"))
    }

    /// Override-check-then-store, shared by direct assignment and
    /// continuation close.
    fn store(
        &self,
        name: &str,
        raw_value: &str,
        doc: &mut dyn Document,
        substitutor: &dyn Substitutor,
    ) {
        if self.is_overridden(name) {
            tracing::debug!(name, "attribute assignment suppressed by override");
            return;
        }
        let value = substitute_value(raw_value, doc, substitutor);
        tracing::debug!(name, %value, "attribute set");
        doc.set_attribute(name, value);
        if name == "backend" {
            doc.backend_updated();
        }
    }
}

/// Join a continuation chunk onto the collected value with a single space.
fn append_chunk(value: &mut String, chunk: &str) {
    if value.is_empty() {
        value.push_str(chunk);
    } else if !chunk.is_empty() {
        value.push(' ');
        value.push_str(chunk);
    }
}

/// Compute the stored form of an assigned value.
///
/// A value that is exactly a `pass:[...]` macro gets only the listed
/// substitutions that are legal for the macro, or the inner text verbatim
/// when none are; any other value gets the default header substitution set.
fn substitute_value(value: &str, doc: &dyn Document, substitutor: &dyn Substitutor) -> String {
    if let Some(caps) = PASS_MACRO_RE.captures(value) {
        let subs: Vec<SubName> = caps[1]
            .split(',')
            .filter_map(SubName::from_keyword)
            .filter(|sub| PASS_SUBS.contains(sub))
            .collect();
        let inner = &caps[2];
        if subs.is_empty() {
            return inner.to_owned();
        }
        return substitutor.apply(inner, &subs, doc);
    }
    substitutor.apply_header(value, doc)
}
