//! Comment composition.
//!
//! Packs ranked strings into a single `STR: "a", "b", ...` line. Items are
//! appended whole or not at all, so a comment that runs out of budget ends
//! cleanly after the last item that fit.

use super::Limits;
use crate::models::StringEntry;

/// Literal prefix of every generated comment.
pub const COMMENT_PREFIX: &str = "STR: ";

const SEPARATOR: &str = ", ";

/// Remaining budget at or below which no further separator is started.
const MIN_FREE_FOR_NEXT: usize = 6;

/// String builder with a hard size limit.
#[derive(Debug)]
struct BoundedText {
    text: String,
    limit: usize,
}

impl BoundedText {
    fn new(prefix: &str, limit: usize) -> Self {
        Self {
            text: prefix.to_string(),
            limit,
        }
    }

    /// Bytes that may still be appended. One byte of the limit is reserved,
    /// matching the terminator of the host's fixed comment buffer.
    fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.text.len()).saturating_sub(1)
    }

    /// Append all parts, or nothing if they do not fit together.
    fn try_push(&mut self, parts: &[&str]) -> bool {
        let needed: usize = parts.iter().map(|p| p.len()).sum();
        if needed > self.remaining() {
            return false;
        }

        for part in parts {
            self.text.push_str(part);
        }
        true
    }

    fn into_string(self) -> String {
        self.text
    }
}

/// Build the comment for `ranked` entries, in the given order.
///
/// Returns `None` when there is nothing to write: either no entries, or not
/// even the first item fits the budget.
pub fn compose(ranked: &[StringEntry], limits: &Limits) -> Option<String> {
    let mut builder = BoundedText::new(COMMENT_PREFIX, limits.max_comment);
    let mut appended = 0usize;

    for entry in ranked {
        let quoted = format!("\"{}\"", entry.content);

        let pushed = if appended == 0 {
            builder.try_push(&[&quoted])
        } else {
            if builder.remaining() <= MIN_FREE_FOR_NEXT {
                break;
            }
            builder.try_push(&[SEPARATOR, &quoted])
        };

        if !pushed {
            break;
        }
        appended += 1;
    }

    if appended == 0 {
        return None;
    }

    Some(builder.into_string())
}
