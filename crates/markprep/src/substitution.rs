//! Substitution collaborator: named substitution sets applied to text.
//!
//! The catalog of legal substitution names lives here, along with the
//! inline attribute-reference token syntax (`{name}`), which other
//! components treat as opaque.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;

/// Inline attribute-reference token: `{name}`.
static ATTR_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z0-9_][a-zA-Z0-9_-]*)\}").unwrap());

/// Bound on repeated replacement rounds for a single piece of text.
/// Mutually-referential attribute values would otherwise never settle.
const MAX_SUBSTITUTION_ROUNDS: usize = 64;

/// Named substitution in the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubName {
    /// Special-character escaping (`&`, `<`, `>`).
    SpecialChars,
    /// Quoted-text formatting.
    Quotes,
    /// Attribute-reference replacement.
    Attributes,
    /// Textual replacements.
    Replacements,
    /// Inline macros.
    Macros,
    /// Post-processing replacements.
    PostReplacements,
}

impl SubName {
    /// Parse a substitution keyword, accepting both the short and the long
    /// spelling (`"a"` / `"attributes"`).
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "c" | "specialchars" | "specialcharacters" => Some(Self::SpecialChars),
            "q" | "quotes" => Some(Self::Quotes),
            "a" | "attributes" => Some(Self::Attributes),
            "r" | "replacements" => Some(Self::Replacements),
            "m" | "macros" => Some(Self::Macros),
            "p" | "post_replacements" => Some(Self::PostReplacements),
            _ => None,
        }
    }
}

/// Substitutions applied to document-header attribute values.
pub const HEADER_SUBS: &[SubName] = &[SubName::SpecialChars, SubName::Attributes];

/// Substitutions legal inside the `pass:[...]` macro's name list.
pub const PASS_SUBS: &[SubName] = &[
    SubName::SpecialChars,
    SubName::Quotes,
    SubName::Attributes,
    SubName::Replacements,
    SubName::Macros,
];

/// Applies named substitution sets to text.
pub trait Substitutor {
    /// Apply the given substitutions to `text`, in order.
    fn apply(&self, text: &str, subs: &[SubName], doc: &dyn Document) -> String;

    /// Apply the default header-level substitution set.
    fn apply_header(&self, text: &str, doc: &dyn Document) -> String {
        self.apply(text, HEADER_SUBS, doc)
    }
}

/// Default [`Substitutor`].
///
/// Implements special-character escaping and attribute-reference
/// replacement; the remaining catalog names are accepted but are identity
/// transforms here (their rule catalogs belong to the downstream markup
/// grammar).
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicSubstitutor;

impl Substitutor for BasicSubstitutor {
    fn apply(&self, text: &str, subs: &[SubName], doc: &dyn Document) -> String {
        let mut out = text.to_owned();
        for sub in subs {
            out = match sub {
                SubName::SpecialChars => escape_special_chars(&out),
                SubName::Attributes => resolve_attribute_refs(&out, doc),
                SubName::Quotes
                | SubName::Replacements
                | SubName::Macros
                | SubName::PostReplacements => out,
            };
        }
        out
    }
}

/// Escape `&`, `<` and `>`.
fn escape_special_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Replace `{name}` tokens until no further match exists.
///
/// A defined attribute resolves to its value as of this point in the pass;
/// an undefined one resolves to the empty string. Replacement repeats so
/// tokens introduced by attribute values are resolved too, bounded by
/// [`MAX_SUBSTITUTION_ROUNDS`].
pub(crate) fn resolve_attribute_refs(text: &str, doc: &dyn Document) -> String {
    let mut current = text.to_owned();
    for _ in 0..MAX_SUBSTITUTION_ROUNDS {
        if !ATTR_REF_RE.is_match(&current) {
            return current;
        }
        let next = ATTR_REF_RE
            .replace_all(&current, |caps: &regex::Captures<'_>| {
                doc.attribute(&caps[1]).unwrap_or("").to_owned()
            })
            .into_owned();
        if next == current {
            // Self-referential value; nothing further to resolve
            return next;
        }
        current = next;
    }
    tracing::warn!(text, "attribute reference substitution did not settle");
    current
}
