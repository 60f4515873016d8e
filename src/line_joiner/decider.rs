// Join-strategy decision for one pair of adjacent lines
// Rule order is significant: later rules are broader and would swallow the exceptions above them

use tracing::trace;

use super::patterns::{
    ends_terminal_soft, ends_terminal_strong, starts_lowercase_or_hangul, starts_with_opening_quote,
    LinePatterns,
};
use super::{JoinStrategy, JoinerOptions};

/// Which rule produced a decision; reported in trace logs and used by tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRule {
    JoiningDisabled,
    StructuralNext,
    HyphenRepair,
    StrongTerminator,
    InsideQuoteBlock,
    SoftPunctuation,
    ContinuationStart,
    MergeByDefault,
    Fallthrough,
}

/// Inputs of a single decision besides the two lines themselves
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub options: &'a JoinerOptions,
    pub inside_quote_block: bool,
    pub allow_hyphen_repair: bool,
}

/// Decide how `next` attaches to the accumulated `prev` line
pub fn decide(patterns: &LinePatterns, prev: &str, next: &str, ctx: DecisionContext<'_>) -> JoinStrategy {
    decide_with_rule(patterns, prev, next, ctx).0
}

/// Same as [`decide`], also reporting the rule that fired
pub fn decide_with_rule(
    patterns: &LinePatterns,
    prev: &str,
    next: &str,
    ctx: DecisionContext<'_>,
) -> (JoinStrategy, JoinRule) {
    let decision = evaluate(patterns, prev, next, ctx);
    trace!(strategy = ?decision.0, rule = ?decision.1, "join decision");
    decision
}

fn evaluate(
    patterns: &LinePatterns,
    prev: &str,
    next: &str,
    ctx: DecisionContext<'_>,
) -> (JoinStrategy, JoinRule) {
    let options = ctx.options;

    if !options.line_joining_enabled {
        return (JoinStrategy::NoJoin, JoinRule::JoiningDisabled);
    }

    if options.keep_list_and_heading_breaks && patterns.is_structural(next) {
        return (JoinStrategy::NoJoin, JoinRule::StructuralNext);
    }

    if ctx.allow_hyphen_repair && patterns.is_hyphen_break(prev, next) {
        return (JoinStrategy::NoSpaceJoin, JoinRule::HyphenRepair);
    }

    let closed = ends_terminal_strong(prev);
    if closed {
        return (JoinStrategy::NoJoin, JoinRule::StrongTerminator);
    }

    if options.respect_quote_blocks && ctx.inside_quote_block {
        return (JoinStrategy::SpaceJoin, JoinRule::InsideQuoteBlock);
    }

    if options.merge_after_soft_punctuation && ends_terminal_soft(prev) {
        return (JoinStrategy::SpaceJoin, JoinRule::SoftPunctuation);
    }

    if options.merge_continuation_lines
        && (starts_lowercase_or_hangul(next) || starts_with_opening_quote(next))
    {
        return (JoinStrategy::SpaceJoin, JoinRule::ContinuationStart);
    }

    // Wrapped lines are fragments of one paragraph unless proven otherwise
    if !closed {
        return (JoinStrategy::SpaceJoin, JoinRule::MergeByDefault);
    }

    (JoinStrategy::NoJoin, JoinRule::Fallthrough)
}
