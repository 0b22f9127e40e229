//! Transfer engine: copies task-bearing subtrees of a source outline into
//! the destination page.
//!
//! # Invariants
//! - Source order and nesting are preserved.
//! - A block is copied when it is an open task, sits under a copied task, or
//!   has an open task somewhere below it (context grouping).
//! - Ignored blocks stop the walk for their whole subtree.
//! - A seeded child placeholder that no child filled is deleted again.

use crate::carry::predicate::is_open_task;
use crate::carry::scan::subtree_matches;
use crate::carry::writer::OutlineWriter;
use crate::carry::CarryRules;
use crate::model::block::{BlockId, BlockPlacement};
use crate::model::outline::Outline;

/// Destination anchor threaded through the sibling fold.
///
/// A cursor without content and without children is a placeholder: the next
/// copied block overwrites it in place instead of landing after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestCursor {
    pub id: BlockId,
    pub has_content: bool,
    pub has_children: bool,
}

impl DestCursor {
    /// Cursor for an existing destination block.
    pub fn at(outline: &Outline, id: BlockId) -> Self {
        Self {
            id,
            has_content: !outline.content(id).is_empty(),
            has_children: !outline.children(id).is_empty(),
        }
    }

    fn placeholder(id: BlockId) -> Self {
        Self {
            id,
            has_content: false,
            has_children: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        !self.has_content && !self.has_children
    }
}

/// Copies the subtree at `node` after (or into) `cursor`.
///
/// Returns the cursor the caller continues its sibling fold with: the block
/// written for `node`, or `cursor` unchanged when `node` was skipped.
pub fn transfer_subtree<W: OutlineWriter>(
    source: &Outline,
    node: BlockId,
    cursor: DestCursor,
    parent_was_task: bool,
    rules: &CarryRules,
    writer: &mut W,
) -> Result<DestCursor, W::Error> {
    let content = source.content(node);
    let child_has_task = subtree_matches(source, node, &is_open_task);
    let effective_task = parent_was_task || is_open_task(content);

    if rules.is_ignored(content) || !(effective_task || child_has_task) {
        return Ok(cursor);
    }

    let target = if cursor.is_placeholder() {
        writer.update_block(cursor.id, content)?;
        cursor.id
    } else {
        writer.create_block(cursor.id, content, BlockPlacement::SiblingAfter)?
    };
    let mut placed = DestCursor {
        id: target,
        has_content: !content.is_empty(),
        has_children: false,
    };

    let children = source.children(node);
    if !children.is_empty() {
        let seed = DestCursor::placeholder(writer.create_block(
            target,
            "",
            BlockPlacement::FirstChild,
        )?);
        let last = children.iter().try_fold(seed, |acc, child| {
            transfer_subtree(source, *child, acc, effective_task, rules, &mut *writer)
        })?;

        if last == seed {
            writer.delete_block(seed.id)?;
        } else {
            placed.has_children = true;
        }
    }

    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::{transfer_subtree, DestCursor};
    use crate::carry::CarryRules;
    use crate::model::outline::Outline;

    fn rules() -> CarryRules {
        CarryRules::new("", "").expect("default rules")
    }

    fn run(source: &Outline, dest: &mut Outline) -> DestCursor {
        let start = dest.last_root().expect("destination anchor");
        let mut cursor = DestCursor::at(dest, start);
        for root in source.roots().to_vec() {
            cursor = transfer_subtree(source, root, cursor, false, &rules(), dest)
                .expect("in-memory transfer");
        }
        cursor
    }

    #[test]
    fn single_task_fills_empty_placeholder() {
        let mut source = Outline::new();
        source.push_root("TODO buy milk");
        let mut dest = Outline::new();
        let placeholder = dest.push_root("");

        let cursor = run(&source, &mut dest);

        assert_eq!(dest.render(), "- TODO buy milk\n");
        assert_eq!(cursor.id, placeholder);
        assert!(cursor.has_content);
    }

    #[test]
    fn non_empty_anchor_gets_new_sibling() {
        let mut source = Outline::new();
        source.push_root("TODO buy milk");
        let mut dest = Outline::new();
        dest.push_root("[^todos_transferred]");

        run(&source, &mut dest);

        assert_eq!(dest.render(), "- [^todos_transferred]\n- TODO buy milk\n");
    }

    #[test]
    fn context_parent_is_copied_with_task_child() {
        let mut source = Outline::new();
        let notes = source.push_root("Notes");
        source.push_child(notes, "just a thought").expect("child");
        source.push_child(notes, "TODO call Bob").expect("child");
        let mut dest = Outline::new();
        dest.push_root("");

        run(&source, &mut dest);

        assert_eq!(dest.render(), "- Notes\n  - TODO call Bob\n");
    }

    #[test]
    fn children_of_task_are_copied_even_without_tasks() {
        let mut source = Outline::new();
        let task = source.push_root("TODO plan trip");
        let detail = source.push_child(task, "flights").expect("child");
        source.push_child(detail, "compare prices").expect("grandchild");
        let mut dest = Outline::new();
        dest.push_root("");

        run(&source, &mut dest);

        assert_eq!(
            dest.render(),
            "- TODO plan trip\n  - flights\n    - compare prices\n"
        );
    }

    #[test]
    fn ignored_subtree_is_skipped_entirely() {
        let mut source = Outline::new();
        let private = source.push_root("Private dont_transfer");
        source.push_child(private, "TODO secret").expect("child");
        source.push_root("TODO public");
        let mut dest = Outline::new();
        dest.push_root("");

        run(&source, &mut dest);

        assert_eq!(dest.render(), "- TODO public\n");
    }

    #[test]
    fn unfilled_seed_placeholder_is_removed() {
        let mut source = Outline::new();
        let parent = source.push_root("Notes");
        source
            .push_child(parent, "TODO hidden dont_transfer")
            .expect("child");
        let mut dest = Outline::new();
        dest.push_root("");

        run(&source, &mut dest);

        assert_eq!(dest.render(), "- Notes\n");
        assert_eq!(dest.len(), 1);
    }

    #[test]
    fn no_task_means_no_writes() {
        let mut source = Outline::new();
        let parent = source.push_root("Meeting notes");
        source.push_child(parent, "DONE agenda").expect("child");
        let mut dest = Outline::new();
        let placeholder = dest.push_root("");

        let cursor = run(&source, &mut dest);

        assert_eq!(cursor, DestCursor::at(&dest, placeholder));
        assert_eq!(dest.render(), "- \n");
    }

    #[test]
    fn sibling_groups_keep_source_order() {
        let mut source = Outline::new();
        source.push_root("TODO first");
        source.push_root("DONE skipped");
        let group = source.push_root("Work");
        source.push_child(group, "TODO second").expect("child");
        source.push_root("TODO third");
        let mut dest = Outline::new();
        dest.push_root("");

        run(&source, &mut dest);

        assert_eq!(
            dest.render(),
            "- TODO first\n- Work\n  - TODO second\n- TODO third\n"
        );
    }

    #[test]
    fn empty_block_with_children_under_task_is_not_overwritten() {
        let mut source = Outline::new();
        let task = source.push_root("TODO parent");
        let blank = source.push_child(task, "").expect("blank");
        source.push_child(blank, "nested detail").expect("nested");
        source.push_child(task, "TODO sibling").expect("sibling");
        let mut dest = Outline::new();
        dest.push_root("");

        run(&source, &mut dest);

        assert_eq!(
            dest.render(),
            "- TODO parent\n  - \n    - nested detail\n  - TODO sibling\n"
        );
    }
}
