//! Comment consumption: single-line `//` comments and `////` block fences.
//!
//! Comment lines survive the main preprocessing pass as ordinary content
//! (they can act as separators between adjacent blocks); block-level
//! callers pull them out of the buffer on demand through
//! [`consume_comments`].

use crate::buffer::{GrabOptions, LineBuffer, chomp};

/// Single-line comment marker.
const COMMENT_PREFIX: &str = "//";

/// Minimum length of a block-comment fence line.
const FENCE_MIN_LEN: usize = 4;

/// Check whether a line (without terminator) is a block-comment fence:
/// four or more repeated `/` characters and nothing else.
fn is_comment_fence(text: &str) -> bool {
    let text = text.trim_end();
    text.len() >= FENCE_MIN_LEN && text.chars().all(|c| c == '/')
}

/// Consume leading comment lines from the buffer.
///
/// A block-comment fence consumes everything through the matching closing
/// fence (or to the end of the buffer when unterminated); single-line
/// comments are consumed one at a time. Stops at the first non-comment
/// line, which is left untouched. Returns the accumulated comment lines,
/// possibly empty.
pub(crate) fn consume_comments(buffer: &mut LineBuffer) -> Vec<String> {
    let mut comments = Vec::new();
    loop {
        let Some(front) = buffer.peek_line() else {
            break;
        };
        let text = chomp(front);
        if is_comment_fence(text) {
            if let Some(opening) = buffer.get_line() {
                comments.push(opening);
            }
            let stop = |line: &str| is_comment_fence(chomp(line));
            let interior =
                buffer.grab_lines_until(&GrabOptions::new().until(&stop).preserve_last());
            comments.extend(interior.lines);
            if let Some(closing) = buffer.get_line() {
                comments.push(closing);
            }
        } else if text.starts_with(COMMENT_PREFIX) {
            if let Some(line) = buffer.get_line() {
                comments.push(line);
            }
        } else {
            break;
        }
    }
    comments
}
