//! The preprocessing pass tying the stages together.

use std::collections::HashMap;
use std::io;

use crate::attributes::{AttributeProcessor, ContinuationOutcome};
use crate::buffer::{GrabOptions, LineBuffer, Segment, chomp};
use crate::comments::consume_comments;
use crate::conditional::{ConditionalOutcome, ConditionalProcessor};
use crate::directive::{Directive, classify};
use crate::document::{Document, InMemoryDocument};
use crate::include::{IncludeError, IncludeResolver, expand_includes};
use crate::substitution::{BasicSubstitutor, SubName, Substitutor};

/// Line-oriented preprocessor for a markup document source.
///
/// Consumes an ordered line sequence, expands include directives, evaluates
/// `ifdef`/`ifndef`/`endif` conditionals, applies attribute directives to
/// the document's attribute store, and rewrites inline attribute references
/// in the surviving lines. After [`process`](Self::process) the buffer
/// holds the final line stream, which downstream block parsing pulls apart
/// through the segment and comment operations.
///
/// # Example
///
/// ```
/// use markprep::Preprocessor;
///
/// let mut pp = Preprocessor::new(":product: Widget\n\nTry {product} today.\n");
/// pp.process().unwrap();
/// assert_eq!(pp.source(), "\nTry Widget today.\n");
/// ```
pub struct Preprocessor<D: Document = InMemoryDocument, S: Substitutor = BasicSubstitutor> {
    buffer: LineBuffer,
    document: D,
    substitutor: S,
    overrides: HashMap<String, String>,
    resolver: Option<IncludeResolver>,
}

impl Preprocessor {
    /// Create a preprocessor from a source string.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self::from_lines(source.split_inclusive('\n').map(ToOwned::to_owned).collect())
    }

    /// Create a preprocessor from an ordered line sequence.
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self {
            buffer: LineBuffer::from_lines(lines),
            document: InMemoryDocument::new(),
            substitutor: BasicSubstitutor,
            overrides: HashMap::new(),
            resolver: None,
        }
    }
}

impl<D: Document, S: Substitutor> Preprocessor<D, S> {
    /// Replace the document collaborator.
    #[must_use]
    pub fn with_document<D2: Document>(self, document: D2) -> Preprocessor<D2, S> {
        Preprocessor {
            buffer: self.buffer,
            document,
            substitutor: self.substitutor,
            overrides: self.overrides,
            resolver: self.resolver,
        }
    }

    /// Replace the substitution collaborator.
    #[must_use]
    pub fn with_substitutor<S2: Substitutor>(self, substitutor: S2) -> Preprocessor<D, S2> {
        Preprocessor {
            buffer: self.buffer,
            document: self.document,
            substitutor,
            overrides: self.overrides,
            resolver: self.resolver,
        }
    }

    /// Supply attribute overrides.
    ///
    /// An override for a name (optionally suffixed with `!`) wins over any
    /// directive touching that name.
    #[must_use]
    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Supply an include-resolution callback.
    ///
    /// Without one, include directives read the referenced file directly.
    #[must_use]
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: FnMut(&str) -> io::Result<Vec<String>> + 'static,
    {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Run the full preprocessing pass.
    ///
    /// Include expansion runs first as its own forward pass; conditionals,
    /// attribute directives and inline substitution are then applied in one
    /// combined per-line pass, in line order. The buffer afterwards holds
    /// only the surviving content lines.
    ///
    /// # Errors
    ///
    /// Returns [`IncludeError`] if an include directive cannot be resolved;
    /// the pass is aborted.
    pub fn process(&mut self) -> Result<(), IncludeError> {
        expand_includes(&mut self.buffer, self.resolver.as_mut())?;

        let mut conditionals = ConditionalProcessor::new();
        let mut attributes = AttributeProcessor::new(self.overrides.clone());
        let mut surviving: Vec<String> = Vec::with_capacity(self.buffer.len());

        while let Some(line) = self.buffer.get_line() {
            let (text, terminator) = line.split_at(chomp(&line).len());
            let directive = classify(text);

            // Skip state takes priority over everything, continuation
            // included; conditional directive lines never survive.
            if conditionals.process(text, &directive, &self.document) == ConditionalOutcome::Drop {
                continue;
            }

            if attributes.is_continuing() {
                match attributes.continue_line(text, &mut self.document, &self.substitutor) {
                    ContinuationOutcome::Absorbed => continue,
                    ContinuationOutcome::Reprocess => {}
                }
            }

            match directive {
                Directive::AttrAssign { name, value } => {
                    attributes.assign(&name, &value, &mut self.document, &self.substitutor);
                }
                Directive::AttrDelete { name } => {
                    attributes.delete(&name, &mut self.document);
                }
                Directive::Include { .. } | Directive::Plain => {
                    let rewritten =
                        self.substitutor
                            .apply(text, &[SubName::Attributes], &self.document);
                    surviving.push(format!("{rewritten}{terminator}"));
                }
                Directive::ConditionalOpen { .. } | Directive::ConditionalClose { .. } => {
                    // Already dropped by the conditional stage
                }
            }
        }

        self.buffer = LineBuffer::from_lines(surviving);
        Ok(())
    }

    /// The document collaborator.
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Mutable access to the document collaborator.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// Consume the preprocessor, returning the document.
    #[must_use]
    pub fn into_document(self) -> D {
        self.document
    }

    /// Concatenation of the current buffer.
    #[must_use]
    pub fn source(&self) -> String {
        self.buffer.source()
    }

    /// Check whether any lines remain.
    #[must_use]
    pub fn has_lines(&self) -> bool {
        self.buffer.has_lines()
    }

    /// Check whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Pop the front line.
    pub fn get_line(&mut self) -> Option<String> {
        self.buffer.get_line()
    }

    /// Read-only view of the front line.
    #[must_use]
    pub fn peek_line(&self) -> Option<&str> {
        self.buffer.peek_line()
    }

    /// Push a sequence of lines back onto the front.
    pub fn unshift<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: DoubleEndedIterator,
    {
        self.buffer.unshift(lines);
    }

    /// Drop leading whitespace-only lines.
    pub fn skip_blank_lines(&mut self) {
        self.buffer.skip_blank_lines();
    }

    /// Drop a leading list-continuation marker line.
    pub fn skip_list_continuation(&mut self) {
        self.buffer.skip_list_continuation();
    }

    /// Strip the trailing terminator from the final line.
    pub fn chomp_last(&mut self) {
        self.buffer.chomp_last();
    }

    /// Extract lines from the front until a stop condition fires.
    pub fn grab_lines_until(&mut self, options: &GrabOptions<'_>) -> Segment {
        self.buffer.grab_lines_until(options)
    }

    /// Consume leading comment lines (single-line and fenced blocks).
    pub fn consume_comments(&mut self) -> Vec<String> {
        consume_comments(&mut self.buffer)
    }
}

impl<D: Document + std::fmt::Debug, S: Substitutor> std::fmt::Debug for Preprocessor<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preprocessor")
            .field("buffer", &self.buffer)
            .field("document", &self.document)
            .field("overrides", &self.overrides)
            .field("resolver", &self.resolver.as_ref().map(|_| "<resolver>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn processed(source: &str) -> Preprocessor {
        let mut pp = Preprocessor::new(source);
        pp.process().unwrap();
        pp
    }

    #[test]
    fn test_attribute_lines_removed_from_output() {
        let pp = processed(":author: J. Smith\ncontent\n");
        assert_eq!(pp.source(), "content\n");
        assert_eq!(pp.document().attribute("author"), Some("J. Smith"));
    }

    #[test]
    fn test_inline_reference_resolution() {
        let pp = processed(":name: World\nHello, {name}!\n");
        assert_eq!(pp.source(), "Hello, World!\n");
    }

    #[test]
    fn test_references_observe_store_in_line_order() {
        let pp = processed("{name} before\n:name: defined\n{name} after\n");
        // The first reference sees an undefined attribute
        assert_eq!(pp.source(), " before\ndefined after\n");
    }

    #[test]
    fn test_conditional_block_with_attribute() {
        let pp = processed(":draft:\nifdef::draft[]\ndraft note\nendif::draft[]\ndone\n");
        assert_eq!(pp.source(), "draft note\ndone\n");

        let pp = processed("ifdef::draft[]\ndraft note\nendif::draft[]\ndone\n");
        assert_eq!(pp.source(), "done\n");
    }

    #[test]
    fn test_backend_conditional_via_flag_attribute() {
        let pp = processed(
            ":backend: html\nifdef::backend-html[]\nhtml only\nendif::backend-html[]\n",
        );
        assert_eq!(pp.source(), "html only\n");
    }

    #[test]
    fn test_continuation_through_full_pass() {
        let pp = processed(":key: part1 +\nmore +\nlast\nbody\n");
        assert_eq!(pp.document().attribute("key"), Some("part1 more last"));
        assert_eq!(pp.source(), "body\n");
    }

    #[test]
    fn test_continuation_closed_by_blank_line_survives() {
        let pp = processed(":key: value +\n\nbody\n");
        assert_eq!(pp.document().attribute("key"), Some("value"));
        // The closing blank line is reprocessed as ordinary content
        assert_eq!(pp.source(), "\nbody\n");
    }

    #[test]
    fn test_attribute_deletion_through_pass() {
        let pp = processed(":toc:\n:toc!:\ncontent\n");
        assert!(!pp.document().has_attribute("toc"));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = HashMap::from([("foo".to_owned(), "bar".to_owned())]);
        let mut pp = Preprocessor::new(":foo: baz\n").with_overrides(overrides);
        pp.process().unwrap();
        assert!(!pp.document().has_attribute("foo"));
    }

    #[test]
    fn test_include_then_directives() {
        let mut pp = Preprocessor::new("include::attrs.txt[]\nHello, {name}!\n").with_resolver(
            |path| {
                assert_eq!(path, "attrs.txt");
                Ok(vec![":name: World\n".to_owned()])
            },
        );
        pp.process().unwrap();
        assert_eq!(pp.source(), "Hello, World!\n");
    }

    #[test]
    fn test_include_failure_aborts() {
        let mut pp = Preprocessor::new("include::missing.txt[]\n").with_resolver(|path| {
            Err(io::Error::new(io::ErrorKind::NotFound, path.to_owned()))
        });
        let err = pp.process().unwrap_err();
        assert_eq!(err.path, "missing.txt");
    }

    #[test]
    fn test_comment_lines_survive_the_pass() {
        let mut pp = processed("// note\ncontent\n");
        assert_eq!(pp.source(), "// note\ncontent\n");
        let comments = pp.consume_comments();
        assert_eq!(comments, vec!["// note\n".to_owned()]);
        assert_eq!(pp.source(), "content\n");
    }

    #[test]
    fn test_source_equals_concatenation_after_pass() {
        let mut pp = processed("a\n\nb\nc\n");
        let mut collected = String::new();
        while let Some(line) = pp.get_line() {
            collected.push_str(&line);
        }
        assert_eq!(collected, "a\n\nb\nc\n");
    }

    #[test]
    fn test_skip_priority_over_continuation() {
        // The ifdef opens a skip while a continuation is pending; skipped
        // lines never feed the continuation.
        let pp = processed(":key: a +\nifdef::missing[]\nhidden +\nendif::missing[]\nclose\n");
        assert_eq!(pp.document().attribute("key"), Some("a close"));
    }

    #[test]
    fn test_custom_document_collaborator() {
        #[derive(Debug, Default)]
        struct RecordingDocument {
            inner: InMemoryDocument,
            backend_updates: usize,
        }

        impl Document for RecordingDocument {
            fn attribute(&self, name: &str) -> Option<&str> {
                self.inner.attribute(name)
            }
            fn set_attribute(&mut self, name: &str, value: String) {
                self.inner.set_attribute(name, value);
            }
            fn delete_attribute(&mut self, name: &str) {
                self.inner.delete_attribute(name);
            }
            fn backend_updated(&mut self) {
                self.backend_updates += 1;
            }
        }

        let mut pp = Preprocessor::new(":backend: html\n:backend!:\n")
            .with_document(RecordingDocument::default());
        pp.process().unwrap();
        let doc = pp.into_document();
        assert_eq!(doc.backend_updates, 2);
    }

    #[test]
    fn test_trailing_line_never_empty() {
        let pp = Preprocessor::from_lines(vec!["a\n".to_owned(), String::new(), String::new()]);
        assert_eq!(pp.source(), "a\n");
    }
}
