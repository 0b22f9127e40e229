//! Prune engine: removes carried and vacuous blocks from the source page.
//!
//! Runs post-order over the same snapshot the transfer engine walked.
//! Deleted: open tasks, empty blocks, and blocks whose children were all
//! deleted. Survivors lose any enveloped done marker.
//!
//! Deletion takes the whole subtree, so an ignored block below a deleted
//! open task goes with it.

use crate::carry::predicate::is_open_task;
use crate::carry::writer::OutlineWriter;
use crate::carry::CarryRules;
use crate::model::block::BlockId;
use crate::model::outline::Outline;

/// Prunes the subtree at `node`. Returns whether `node` was deleted.
///
/// Ignored blocks are never deleted here and their children are not visited;
/// only the marker strip applies to the block itself.
pub fn prune_subtree<W: OutlineWriter>(
    source: &Outline,
    node: BlockId,
    rules: &CarryRules,
    writer: &mut W,
) -> Result<bool, W::Error> {
    let content = source.content(node);

    if !rules.is_ignored(content) {
        let children = source.children(node);
        let mut removed = 0;
        for child in children {
            if prune_subtree(source, *child, rules, &mut *writer)? {
                removed += 1;
            }
        }

        let lost_all_children = !children.is_empty() && removed == children.len();
        if is_open_task(content) || content.is_empty() || lost_all_children {
            writer.delete_block(node)?;
            return Ok(true);
        }
    }

    let stripped = rules.strip_done_markers(content);
    if stripped != content {
        writer.update_block(node, &stripped)?;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::prune_subtree;
    use crate::carry::CarryRules;
    use crate::model::outline::Outline;

    fn prune_all(source: &Outline) -> Outline {
        let rules = CarryRules::new("", "").expect("default rules");
        let mut pruned = source.clone();
        for root in source.roots() {
            prune_subtree(source, *root, &rules, &mut pruned).expect("in-memory prune");
        }
        pruned
    }

    #[test]
    fn open_task_leaf_is_deleted() {
        let mut source = Outline::new();
        source.push_root("TODO buy milk");
        source.push_root("DONE walk dog");

        assert_eq!(prune_all(&source).render(), "- DONE walk dog\n");
    }

    #[test]
    fn parent_of_only_tasks_collapses() {
        let mut source = Outline::new();
        let notes = source.push_root("Notes");
        source.push_child(notes, "TODO call Bob").expect("child");

        assert!(prune_all(&source).is_empty());
    }

    #[test]
    fn collapse_propagates_through_three_levels() {
        let mut source = Outline::new();
        let top = source.push_root("Area");
        let mid = source.push_child(top, "Project").expect("mid");
        let low = source.push_child(mid, "Phase").expect("low");
        source.push_child(low, "TODO step one").expect("task");
        source.push_child(low, "").expect("blank");
        source.push_root("kept");

        assert_eq!(prune_all(&source).render(), "- kept\n");
    }

    #[test]
    fn parent_with_surviving_child_is_kept() {
        let mut source = Outline::new();
        let notes = source.push_root("Notes");
        source.push_child(notes, "TODO call Bob").expect("task");
        source.push_child(notes, "Bob's number is on the fridge").expect("note");

        assert_eq!(
            prune_all(&source).render(),
            "- Notes\n  - Bob's number is on the fridge\n"
        );
    }

    #[test]
    fn ignored_block_and_subtree_survive() {
        let mut source = Outline::new();
        let secret = source.push_root("TODO secret dont_transfer");
        source.push_child(secret, "TODO nested").expect("child");

        assert_eq!(
            prune_all(&source).render(),
            "- TODO secret dont_transfer\n  - TODO nested\n"
        );
    }

    #[test]
    fn ignored_child_goes_with_deleted_task() {
        let mut source = Outline::new();
        let parent = source.push_root("TODO parent");
        source.push_child(parent, "secret dont_transfer").expect("child");

        assert_eq!(prune_all(&source).render(), "");
    }

    #[test]
    fn surviving_blocks_lose_done_markers() {
        let mut source = Outline::new();
        source.push_root("[^todos_transferred]");
        source.push_root("#+BEGIN_COMMENT\ntodos_transferred\n#+END_COMMENT");
        source.push_root("journal [^todos_transferred] dont_transfer");

        assert_eq!(
            prune_all(&source).render(),
            "- \n- \n- journal  dont_transfer\n"
        );
    }
}
