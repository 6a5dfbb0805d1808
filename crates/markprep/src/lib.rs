//! Line-oriented preprocessor for markup document sources.
//!
//! A single stateful pass over a materialized line sequence: include
//! directives are expanded, `ifdef`/`ifndef`/`endif` conditionals are
//! evaluated, attribute directives (with multi-line continuation) are
//! written into the document's attribute store, and inline attribute
//! references in surviving lines are resolved. The resulting buffer is then
//! pulled apart on demand by block-level callers through the segment and
//! comment operations.
//!
//! # Architecture
//!
//! [`Preprocessor`] drives the pass over a [`LineBuffer`] and delegates to
//! two collaborator seams:
//! - [`Document`]: the attribute store (get/set/delete plus a hook fired
//!   when the `backend` attribute changes); [`InMemoryDocument`] is the
//!   default.
//! - [`Substitutor`]: named substitution sets over text, owning the inline
//!   attribute-reference token syntax; [`BasicSubstitutor`] is the default.
//!
//! # Example
//!
//! ```
//! use markprep::{GrabOptions, Preprocessor};
//!
//! let source = ":version: 2.1\n\nRelease {version}.\n\nNext block.\n";
//! let mut pp = Preprocessor::new(source);
//! pp.process().unwrap();
//!
//! pp.skip_blank_lines();
//! let segment = pp.grab_lines_until(&GrabOptions::new().break_on_blank());
//! assert_eq!(segment.lines, ["Release 2.1.\n"]);
//! ```

mod attributes;
mod buffer;
mod comments;
mod conditional;
mod directive;
mod document;
mod include;
mod preprocessor;
mod substitution;

pub use buffer::{GrabOptions, LineBuffer, Segment, SegmentStop};
pub use document::{Document, InMemoryDocument};
pub use include::{IncludeError, IncludeResolver};
pub use preprocessor::Preprocessor;
pub use substitution::{BasicSubstitutor, HEADER_SUBS, PASS_SUBS, SubName, Substitutor};
