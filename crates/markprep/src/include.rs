//! Include directive expansion.
//!
//! One forward pass over the buffer; `include::PATH[]` lines are replaced
//! in place by the resolver's output (or a direct file read). Spliced lines
//! are not rescanned, so includes do not expand recursively; a resolver
//! that wants recursion recurses internally.

use std::fs;
use std::io;

use crate::buffer::{LineBuffer, chomp};
use crate::directive::{Directive, classify};

/// Callback resolving an include path to its ordered line sequence.
pub type IncludeResolver = Box<dyn FnMut(&str) -> io::Result<Vec<String>>>;

/// Failure to resolve an include directive.
///
/// This is the single fatal path of the preprocessing pass.
#[derive(Debug, thiserror::Error)]
#[error("failed to include {path}: {source}")]
pub struct IncludeError {
    /// Path from the directive's `include::PATH[]` form.
    pub path: String,
    /// Underlying read failure.
    #[source]
    pub source: io::Error,
}

/// Expand all include directives in a single forward pass.
pub(crate) fn expand_includes(
    buffer: &mut LineBuffer,
    mut resolver: Option<&mut IncludeResolver>,
) -> Result<(), IncludeError> {
    let mut expanded: Vec<String> = Vec::with_capacity(buffer.len());
    while let Some(line) = buffer.get_line() {
        let Directive::Include { path } = classify(chomp(&line)) else {
            expanded.push(line);
            continue;
        };
        let included = match resolver.as_deref_mut() {
            Some(resolve) => resolve(&path),
            None => read_lines(&path),
        }
        .map_err(|source| IncludeError {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(%path, line_count = included.len(), "include expanded");
        expanded.extend(included);
    }
    *buffer = LineBuffer::from_lines(expanded);
    Ok(())
}

/// Read a file as lines, keeping terminators.
fn read_lines(path: &str) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content.split_inclusive('\n').map(ToOwned::to_owned).collect())
}
