//! Per-line directive classification.
//!
//! One ordered chain of pattern checks producing a tagged [`Directive`]
//! variant, consumed by a single dispatch step in the preprocessing pass.
//! A line that matches nothing is plain content; non-matching is the only
//! rejection signal.

use std::sync::LazyLock;

use regex::Regex;

static INCLUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^include::([^\[\]]+)\[\]\s*$").unwrap());

static ATTR_DELETE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:]+)!:\s*$").unwrap());

static ATTR_ASSIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:!]+):(?:\s+(.*))?$").unwrap());

static IFDEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ifdef::([^\[\]]+)\[\]\s*$").unwrap());

static IFNDEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ifndef::([^\[\]]+)\[\]\s*$").unwrap());

static ENDIF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^endif::([^\[\]]+)\[\]\s*$").unwrap());

/// Classified form of a single source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive {
    /// `include::PATH[]`
    Include { path: String },
    /// `:name: value` (value may be empty)
    AttrAssign { name: String, value: String },
    /// `:name!:`
    AttrDelete { name: String },
    /// `ifdef::NAME[]` / `ifndef::NAME[]`
    ConditionalOpen { negated: bool, name: String },
    /// `endif::NAME[]`
    ConditionalClose { name: String },
    /// Ordinary content.
    Plain,
}

/// Classify a line (without its terminator) as a directive or plain content.
pub(crate) fn classify(text: &str) -> Directive {
    if let Some(caps) = INCLUDE_RE.captures(text) {
        return Directive::Include {
            path: caps[1].to_owned(),
        };
    }
    if let Some(caps) = ATTR_DELETE_RE.captures(text) {
        return Directive::AttrDelete {
            name: caps[1].to_owned(),
        };
    }
    if let Some(caps) = ATTR_ASSIGN_RE.captures(text) {
        return Directive::AttrAssign {
            name: caps[1].to_owned(),
            value: caps.get(2).map_or_else(String::new, |m| m.as_str().to_owned()),
        };
    }
    if let Some(caps) = IFDEF_RE.captures(text) {
        return Directive::ConditionalOpen {
            negated: false,
            name: caps[1].to_owned(),
        };
    }
    if let Some(caps) = IFNDEF_RE.captures(text) {
        return Directive::ConditionalOpen {
            negated: true,
            name: caps[1].to_owned(),
        };
    }
    if let Some(caps) = ENDIF_RE.captures(text) {
        return Directive::ConditionalClose {
            name: caps[1].to_owned(),
        };
    }
    Directive::Plain
}

/// Check whether a line matches `endif::NAME[]` for a specific name.
pub(crate) fn is_endif_for(text: &str, name: &str) -> bool {
    ENDIF_RE
        .captures(text)
        .is_some_and(|caps| &caps[1] == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include() {
        assert_eq!(
            classify("include::chapter-one.txt[]"),
            Directive::Include {
                path: "chapter-one.txt".to_owned()
            }
        );
        // Anything inside the brackets disqualifies the match
        assert_eq!(classify("include::file.txt[lines=1..2]"), Directive::Plain);
    }

    #[test]
    fn test_attr_assign() {
        assert_eq!(
            classify(":author: J. Smith"),
            Directive::AttrAssign {
                name: "author".to_owned(),
                value: "J. Smith".to_owned(),
            }
        );
    }

    #[test]
    fn test_attr_assign_empty_value() {
        assert_eq!(
            classify(":toc:"),
            Directive::AttrAssign {
                name: "toc".to_owned(),
                value: String::new(),
            }
        );
    }

    #[test]
    fn test_attr_delete() {
        assert_eq!(
            classify(":toc!:"),
            Directive::AttrDelete {
                name: "toc".to_owned()
            }
        );
    }

    #[test]
    fn test_conditionals() {
        assert_eq!(
            classify("ifdef::backend-html[]"),
            Directive::ConditionalOpen {
                negated: false,
                name: "backend-html".to_owned(),
            }
        );
        assert_eq!(
            classify("ifndef::draft[]"),
            Directive::ConditionalOpen {
                negated: true,
                name: "draft".to_owned(),
            }
        );
        assert_eq!(
            classify("endif::draft[]"),
            Directive::ConditionalClose {
                name: "draft".to_owned()
            }
        );
    }

    #[test]
    fn test_plain() {
        assert_eq!(classify("ordinary text"), Directive::Plain);
        assert_eq!(classify(""), Directive::Plain);
        assert_eq!(classify("not :a: directive"), Directive::Plain);
        assert_eq!(classify("// comment"), Directive::Plain);
    }

    #[test]
    fn test_is_endif_for() {
        assert!(is_endif_for("endif::draft[]", "draft"));
        assert!(!is_endif_for("endif::other[]", "draft"));
        assert!(!is_endif_for("plain line", "draft"));
    }
}
