//! Line buffer shared by every preprocessing stage.
//!
//! Lines keep their trailing terminators so the original source can always be
//! re-derived by concatenating the buffer. All consumers work strictly
//! front-to-back; lookahead beyond one line goes through [`LineBuffer::grab_lines_until`]
//! and explicit push-back via [`LineBuffer::unshift`].

use std::collections::VecDeque;

/// Strip a single trailing line terminator (`\n` or `\r\n`).
pub(crate) fn chomp(line: &str) -> &str {
    let s = line.strip_suffix('\n').unwrap_or(line);
    s.strip_suffix('\r').unwrap_or(s)
}

/// Check whether a line is empty or whitespace-only.
pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Why a [`grab_lines_until`](LineBuffer::grab_lines_until) call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStop {
    /// The stop predicate or the blank-line rule matched a line.
    Matched,
    /// The buffer ran out before any stop condition fired.
    Exhausted,
}

/// A contiguous run of lines extracted from the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Extracted lines, in original order.
    pub lines: Vec<String>,
    /// How extraction terminated.
    pub stop: SegmentStop,
}

/// Options for [`LineBuffer::grab_lines_until`].
///
/// The three booleans are independent: a stopping line can be pushed back
/// onto the buffer, appended to the returned segment, both, or neither.
#[derive(Default)]
pub struct GrabOptions<'a> {
    /// Treat a blank line as a stop condition.
    pub break_on_blank: bool,
    /// Push the stopping line back onto the front of the buffer.
    pub preserve_last: bool,
    /// Append the stopping line to the returned segment.
    pub grab_last: bool,
    /// Extra stop predicate, checked per line.
    pub until: Option<&'a dyn Fn(&str) -> bool>,
}

impl<'a> GrabOptions<'a> {
    /// Create options with no stop condition beyond buffer exhaustion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop when a blank line is reached.
    #[must_use]
    pub fn break_on_blank(mut self) -> Self {
        self.break_on_blank = true;
        self
    }

    /// Push the stopping line back onto the buffer.
    #[must_use]
    pub fn preserve_last(mut self) -> Self {
        self.preserve_last = true;
        self
    }

    /// Include the stopping line in the returned segment.
    #[must_use]
    pub fn grab_last(mut self) -> Self {
        self.grab_last = true;
        self
    }

    /// Stop when `pred` returns true for a line.
    #[must_use]
    pub fn until(mut self, pred: &'a dyn Fn(&str) -> bool) -> Self {
        self.until = Some(pred);
        self
    }
}

impl std::fmt::Debug for GrabOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrabOptions")
            .field("break_on_blank", &self.break_on_blank)
            .field("preserve_last", &self.preserve_last)
            .field("grab_last", &self.grab_last)
            .field("until", &self.until.map(|_| "<predicate>"))
            .finish()
    }
}

/// Ordered, mutable, double-ended sequence of source lines.
///
/// Backed by a `VecDeque` so pop-from-front and push-sequence-to-front are
/// cheap; no index-based random access is offered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: VecDeque<String>,
}

impl LineBuffer {
    /// Build a buffer from an ordered line sequence.
    ///
    /// Trailing empty lines are trimmed so the last line, if present, is
    /// never an empty sentinel.
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut lines: VecDeque<String> = lines.into();
        while lines.back().is_some_and(|line| line.is_empty()) {
            lines.pop_back();
        }
        Self { lines }
    }

    /// Build a buffer by splitting a source string, keeping terminators.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        Self::from_lines(source.split_inclusive('\n').map(ToOwned::to_owned).collect())
    }

    /// Check whether any lines remain.
    #[must_use]
    pub fn has_lines(&self) -> bool {
        !self.lines.is_empty()
    }

    /// Check whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of remaining lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Pop the front line, or `None` if the buffer is empty.
    pub fn get_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    /// Read-only view of the front line without consuming it.
    #[must_use]
    pub fn peek_line(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }

    /// Push a sequence of lines back onto the front, preserving order.
    ///
    /// No-op for an empty sequence.
    pub fn unshift<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: DoubleEndedIterator,
    {
        for line in lines.into_iter().rev() {
            self.lines.push_front(line);
        }
    }

    /// Drop leading whitespace-only lines.
    pub fn skip_blank_lines(&mut self) {
        while self.peek_line().is_some_and(is_blank) {
            self.lines.pop_front();
        }
    }

    /// Drop the front line if it is exactly the list-continuation marker `+`.
    pub fn skip_list_continuation(&mut self) {
        if self.peek_line().is_some_and(|line| chomp(line) == "+") {
            self.lines.pop_front();
        }
    }

    /// Strip the trailing line terminator from the final line, if any.
    pub fn chomp_last(&mut self) {
        if let Some(last) = self.lines.back_mut() {
            let trimmed = chomp(last).len();
            last.truncate(trimmed);
        }
    }

    /// Concatenation of all remaining lines.
    #[must_use]
    pub fn source(&self) -> String {
        self.lines.iter().map(String::as_str).collect()
    }

    /// Extract lines from the front until a stop condition fires.
    ///
    /// A stop condition is buffer exhaustion, a blank line (when
    /// `break_on_blank` is set), or the `until` predicate returning true.
    /// Lines consumed strictly before the stop are always included; the
    /// stopping line itself is pushed back and/or included per the options.
    /// Exhaustion is reported as [`SegmentStop::Exhausted`] and never
    /// triggers push-back or inclusion handling.
    pub fn grab_lines_until(&mut self, options: &GrabOptions<'_>) -> Segment {
        let mut grabbed = Vec::new();
        loop {
            let Some(line) = self.get_line() else {
                return Segment {
                    lines: grabbed,
                    stop: SegmentStop::Exhausted,
                };
            };
            let stopped = (options.break_on_blank && is_blank(&line))
                || options.until.is_some_and(|pred| pred(&line));
            if stopped {
                if options.preserve_last {
                    self.lines.push_front(line.clone());
                }
                if options.grab_last {
                    grabbed.push(line);
                }
                return Segment {
                    lines: grabbed,
                    stop: SegmentStop::Matched,
                };
            }
            grabbed.push(line);
        }
    }
}
