//! Conditional-compilation directives: `ifdef` / `ifndef` / `endif`.
//!
//! A single optional skip target; nested conditional blocks are not
//! supported. While a skip is active every line is dropped, including the
//! terminating `endif` itself, and a conditional directive encountered
//! mid-skip is swallowed rather than stacked.

use crate::directive::{Directive, is_endif_for};
use crate::document::Document;

/// What the conditional stage decided about a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConditionalOutcome {
    /// The line stays in the surviving stream.
    Retain,
    /// The line is dropped (directive line, or inside a skipped branch).
    Drop,
}

/// Skip-state machine over the surviving line stream.
#[derive(Debug, Default)]
pub(crate) struct ConditionalProcessor {
    /// Name whose `endif::NAME[]` line terminates the active skip.
    skip_until: Option<String>,
}

impl ConditionalProcessor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Evaluate one line against the current skip state.
    ///
    /// `text` is the line without its terminator; `directive` is its
    /// classification.
    pub(crate) fn process(
        &mut self,
        text: &str,
        directive: &Directive,
        doc: &dyn Document,
    ) -> ConditionalOutcome {
        if let Some(name) = &self.skip_until {
            if is_endif_for(text, name) {
                tracing::debug!(%name, "conditional skip ended");
                self.skip_until = None;
            } else if matches!(directive, Directive::ConditionalOpen { .. }) {
                tracing::warn!(
                    line = text,
                    "conditional directive inside skipped branch; nesting is unsupported"
                );
            }
            return ConditionalOutcome::Drop;
        }

        match directive {
            Directive::ConditionalOpen { negated, name } => {
                let defined = doc.has_attribute(name);
                if defined == *negated {
                    tracing::debug!(%name, negated = *negated, "conditional skip started");
                    self.skip_until = Some(name.clone());
                }
                ConditionalOutcome::Drop
            }
            // endif lines never survive, active skip or not
            Directive::ConditionalClose { .. } => ConditionalOutcome::Drop,
            _ => ConditionalOutcome::Retain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::classify;
    use crate::document::InMemoryDocument;

    fn run(lines: &[&str], doc: &InMemoryDocument) -> Vec<String> {
        let mut processor = ConditionalProcessor::new();
        let mut retained = Vec::new();
        for line in lines {
            if processor.process(line, &classify(line), doc) == ConditionalOutcome::Retain {
                retained.push((*line).to_owned());
            }
        }
        retained
    }

    #[test]
    fn test_ifdef_undefined_drops_interior() {
        let doc = InMemoryDocument::new();
        let out = run(
            &["before", "ifdef::x[]", "hidden", "endif::x[]", "after"],
            &doc,
        );
        assert_eq!(out, ["before", "after"]);
    }

    #[test]
    fn test_ifdef_defined_retains_interior() {
        let mut doc = InMemoryDocument::new();
        doc.set_attribute("x", String::new());
        let out = run(
            &["before", "ifdef::x[]", "shown", "endif::x[]", "after"],
            &doc,
        );
        assert_eq!(out, ["before", "shown", "after"]);
    }

    #[test]
    fn test_ifndef_inverts() {
        let mut doc = InMemoryDocument::new();
        let shown = run(&["ifndef::x[]", "shown", "endif::x[]"], &doc);
        assert_eq!(shown, ["shown"]);

        doc.set_attribute("x", String::new());
        let hidden = run(&["ifndef::x[]", "hidden", "endif::x[]"], &doc);
        assert!(hidden.is_empty());
    }

    #[test]
    fn test_endif_always_dropped() {
        let doc = InMemoryDocument::new();
        let out = run(&["endif::stray[]", "text"], &doc);
        assert_eq!(out, ["text"]);
    }

    #[test]
    fn test_open_and_close_lines_never_survive() {
        let mut doc = InMemoryDocument::new();
        doc.set_attribute("x", String::new());
        let out = run(&["ifdef::x[]", "body", "endif::x[]"], &doc);
        assert_eq!(out, ["body"]);
    }

    #[test]
    fn test_no_nesting_first_endif_wins() {
        let doc = InMemoryDocument::new();
        // The inner same-name open is swallowed; the first endif ends the
        // skip, so the trailing endif is dropped as a stray.
        let out = run(
            &[
                "ifdef::x[]",
                "one",
                "ifdef::x[]",
                "two",
                "endif::x[]",
                "three",
                "endif::x[]",
                "after",
            ],
            &doc,
        );
        assert_eq!(out, ["three", "after"]);
    }

    #[test]
    fn test_skip_ignores_other_endif_names() {
        let doc = InMemoryDocument::new();
        let out = run(
            &["ifdef::x[]", "endif::y[]", "still hidden", "endif::x[]", "after"],
            &doc,
        );
        assert_eq!(out, ["after"]);
    }
}
