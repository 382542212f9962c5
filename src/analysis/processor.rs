//! Per-function processing.
//!
//! Each call works on a single function with freshly scoped state, so
//! functions never influence one another.

use super::aggregator::{rank, StringAggregator};
use super::composer::compose;
use super::gate::should_skip;
use super::Limits;
use crate::database::ProgramDatabase;
use crate::models::{CommentKind, FunctionHandle, FunctionOutcome, SkipReason};
use tracing::trace;

/// Annotate one function with the strings it references.
///
/// Writes the repeatable comment only when the outcome is
/// [`FunctionOutcome::Committed`].
pub fn process_function<D>(
    db: &mut D,
    function: &FunctionHandle,
    limits: &Limits,
) -> FunctionOutcome
where
    D: ProgramDatabase + ?Sized,
{
    if function.size() < limits.min_function_size {
        return FunctionOutcome::Skipped(SkipReason::TooSmall);
    }

    let repeatable = db.comment(function, CommentKind::Repeatable);
    let regular = db.comment(function, CommentKind::Regular);
    if should_skip(&repeatable, &regular) {
        trace!("{}: keeping existing comment", function.name);
        return FunctionOutcome::Skipped(SkipReason::ExistingComment);
    }

    let aggregator = collect_strings(&*db, function, limits);
    if aggregator.is_empty() {
        return FunctionOutcome::NoStrings;
    }
    trace!("{}: {} distinct strings", function.name, aggregator.len());

    let ranked = rank(aggregator.into_entries());
    match compose(&ranked, limits) {
        Some(comment) => {
            db.set_comment(function, &comment, CommentKind::Repeatable);
            FunctionOutcome::Committed { comment }
        }
        None => FunctionOutcome::NoStrings,
    }
}

/// Walk the function body and count every string literal it references.
pub fn collect_strings<D>(
    db: &D,
    function: &FunctionHandle,
    limits: &Limits,
) -> StringAggregator
where
    D: ProgramDatabase + ?Sized,
{
    let mut aggregator = StringAggregator::new(limits);

    'body: for address in db.body(function) {
        for target in db.data_refs_from(address) {
            if !db.is_string_literal(target) {
                continue;
            }

            match db.decode_string(target) {
                Ok(text) => {
                    aggregator.offer(&text);
                }
                Err(e) => {
                    trace!("{}: {}", function.name, e);
                    continue;
                }
            }

            if limits.stop_when_full && aggregator.is_full() {
                break 'body;
            }
        }
    }

    aggregator
}
