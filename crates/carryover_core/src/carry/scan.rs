//! Read-only subtree existence checks.

use crate::model::block::BlockId;
use crate::model::outline::Outline;

/// Returns whether `predicate` holds for `id` or any of its descendants.
///
/// Stops at the first match.
pub fn subtree_matches<F>(outline: &Outline, id: BlockId, predicate: &F) -> bool
where
    F: Fn(&str) -> bool + ?Sized,
{
    predicate(outline.content(id))
        || outline
            .children(id)
            .iter()
            .any(|child| subtree_matches(outline, *child, predicate))
}

/// Returns whether `predicate` holds for any block on the page.
pub fn page_matches<F>(outline: &Outline, predicate: &F) -> bool
where
    F: Fn(&str) -> bool + ?Sized,
{
    outline
        .roots()
        .iter()
        .any(|root| subtree_matches(outline, *root, predicate))
}
