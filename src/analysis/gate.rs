//! Decides whether an existing function comment must be preserved.
//!
//! Any non-empty comment is assumed to be an analyst's note and is kept,
//! except for a few fixed texts that tooling stamps on functions by itself.

/// How a signature is compared against a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Whole comment equals the signature text.
    Exact,
    /// Signature text appears anywhere in the comment.
    Contains,
}

/// A comment text known to be generated automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub kind: MatchKind,
    pub text: &'static str,
}

impl Signature {
    pub fn matches(&self, comment: &str) -> bool {
        match self.kind {
            MatchKind::Exact => comment == self.text,
            MatchKind::Contains => comment.contains(self.text),
        }
    }
}

/// Auto-generated comments that may be overwritten.
pub const AUTO_GENERATED_SIGNATURES: &[Signature] = &[
    // Compiler library signature stamp.
    Signature {
        kind: MatchKind::Exact,
        text: "Microsoft VisualC ",
    },
    // Appended by the disassembler when a name guess is unreliable.
    Signature {
        kind: MatchKind::Contains,
        text: "\ndoubtful name",
    },
];

/// Whether `comment` is one of the known auto-generated texts.
pub fn is_auto_generated(comment: &str) -> bool {
    AUTO_GENERATED_SIGNATURES.iter().any(|s| s.matches(comment))
}

/// Whether a function carrying these comments should be left alone.
///
/// Only the effective comment is judged: the repeatable one, or the regular
/// one when the repeatable slot is empty.
pub fn should_skip(repeatable: &str, regular: &str) -> bool {
    let effective = if repeatable.is_empty() {
        regular
    } else {
        repeatable
    };

    !effective.is_empty() && !is_auto_generated(effective)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_comments() {
        assert!(!should_skip("", ""));
    }

    #[test]
    fn test_user_comment_in_either_slot() {
        assert!(should_skip("decrypts config blob", ""));
        assert!(should_skip("", "called from WinMain"));
        assert!(should_skip("STR: \"old\"", ""));
    }

    #[test]
    fn test_exact_placeholder_is_overwritten() {
        assert!(!should_skip("Microsoft VisualC ", ""));
        assert!(!should_skip("", "Microsoft VisualC "));
        // Only the exact text is exempt.
        assert!(should_skip("Microsoft VisualC 2019", ""));
        assert!(should_skip("Microsoft VisualC", ""));
    }

    #[test]
    fn test_doubtful_name_marker_is_overwritten() {
        assert!(!should_skip("sub_401000\ndoubtful name", ""));
        assert!(should_skip("doubtful name", ""));
    }

    #[test]
    fn test_repeatable_slot_takes_precedence() {
        // A placeholder in the repeatable slot wins over a regular note.
        assert!(!should_skip("Microsoft VisualC ", "my note"));
        // A user note in the repeatable slot wins over a regular placeholder.
        assert!(should_skip("my note", "Microsoft VisualC "));
        assert!(should_skip("my note", "sub_401000\ndoubtful name"));
    }

    #[test]
    fn test_signature_matching() {
        let exact = Signature {
            kind: MatchKind::Exact,
            text: "abc",
        };
        let contains = Signature {
            kind: MatchKind::Contains,
            text: "abc",
        };

        assert!(exact.matches("abc"));
        assert!(!exact.matches("xabc"));
        assert!(contains.matches("xabcx"));
        assert!(!contains.matches("ab c"));
    }
}
