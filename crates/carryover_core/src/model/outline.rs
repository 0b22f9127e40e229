//! In-memory outline arena.
//!
//! # Responsibility
//! - Hold one page's block forest as an arena keyed by `BlockId`.
//! - Apply create/update/delete as explicit arena edits.
//!
//! # Invariants
//! - Every node is reachable from exactly one root (strict tree).
//! - `roots` and every `children` list are in document order.
//! - Removing a node removes its whole subtree; removing an unknown id is a
//!   no-op.

use crate::model::block::{Block, BlockId, BlockPlacement};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from arena construction and edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineError {
    /// Referenced block is not part of this outline.
    UnknownBlock(BlockId),
    /// Placement needs an anchor but none was given.
    MissingAnchor(BlockPlacement),
    /// Block points at a parent that is not part of this outline.
    DanglingParent { block: BlockId, parent: BlockId },
    /// Parent edges do not form a tree.
    NotATree { reachable: usize, total: usize },
}

impl Display for OutlineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBlock(id) => write!(f, "block not in outline: {id}"),
            Self::MissingAnchor(placement) => {
                write!(f, "placement {placement:?} requires an anchor block")
            }
            Self::DanglingParent { block, parent } => {
                write!(f, "block {block} references missing parent {parent}")
            }
            Self::NotATree { reachable, total } => write!(
                f,
                "outline is not a tree: {reachable} of {total} blocks reachable from roots"
            ),
        }
    }
}

impl Error for OutlineError {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OutlineNode {
    content: String,
    parent: Option<BlockId>,
    children: Vec<BlockId>,
}

/// Block forest of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    nodes: HashMap<BlockId, OutlineNode>,
    roots: Vec<BlockId>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an arena from active stored blocks.
    ///
    /// `blocks` must already be sorted in sibling order
    /// (`sort_order ASC, block_uuid ASC`); grouping by parent keeps that order.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, OutlineError> {
        let mut outline = Self::new();
        let mut pending_children: Vec<(BlockId, BlockId)> = Vec::new();

        for block in &blocks {
            outline.nodes.insert(
                block.block_uuid,
                OutlineNode {
                    content: block.content.clone(),
                    parent: block.parent_uuid,
                    children: Vec::new(),
                },
            );
        }

        for block in &blocks {
            match block.parent_uuid {
                None => outline.roots.push(block.block_uuid),
                Some(parent) => pending_children.push((parent, block.block_uuid)),
            }
        }

        for (parent, child) in pending_children {
            let node = outline
                .nodes
                .get_mut(&parent)
                .ok_or(OutlineError::DanglingParent {
                    block: child,
                    parent,
                })?;
            node.children.push(child);
        }

        let reachable = outline.descendants_of_roots().len();
        if reachable != outline.nodes.len() {
            return Err(OutlineError::NotATree {
                reachable,
                total: outline.nodes.len(),
            });
        }
        Ok(outline)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level blocks in document order.
    pub fn roots(&self) -> &[BlockId] {
        &self.roots
    }

    pub fn last_root(&self) -> Option<BlockId> {
        self.roots.last().copied()
    }

    /// Content of one block, empty when the id is unknown.
    pub fn content(&self, id: BlockId) -> &str {
        self.nodes.get(&id).map_or("", |node| node.content.as_str())
    }

    /// Children of one block in document order, empty when unknown.
    pub fn children(&self, id: BlockId) -> &[BlockId] {
        self.nodes
            .get(&id)
            .map_or(&[][..], |node| node.children.as_slice())
    }

    /// Pre-order walk of the subtree rooted at `id`, including `id`.
    pub fn subtree(&self, id: BlockId) -> Vec<BlockId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Pre-order walk of the whole page.
    pub fn descendants_of_roots(&self) -> Vec<BlockId> {
        self.roots
            .iter()
            .flat_map(|root| self.subtree(*root))
            .collect()
    }

    /// Contents of the whole page in document order.
    pub fn contents(&self) -> Vec<&str> {
        self.descendants_of_roots()
            .into_iter()
            .map(|id| self.content(id))
            .collect()
    }

    /// Appends a new top-level block.
    pub fn push_root(&mut self, content: impl Into<String>) -> BlockId {
        let id = Uuid::new_v4();
        self.nodes.insert(id, new_node(content.into(), None));
        self.roots.push(id);
        id
    }

    /// Appends a new last child under `parent`.
    pub fn push_child(
        &mut self,
        parent: BlockId,
        content: impl Into<String>,
    ) -> Result<BlockId, OutlineError> {
        self.insert(Some(parent), content, BlockPlacement::LastChild)
    }

    /// Inserts a new block relative to `anchor`.
    pub fn insert(
        &mut self,
        anchor: Option<BlockId>,
        content: impl Into<String>,
        placement: BlockPlacement,
    ) -> Result<BlockId, OutlineError> {
        let id = Uuid::new_v4();
        let content = content.into();
        let anchor = match (placement.needs_anchor(), anchor) {
            (true, Some(anchor)) => {
                if !self.nodes.contains_key(&anchor) {
                    return Err(OutlineError::UnknownBlock(anchor));
                }
                Some(anchor)
            }
            (true, None) => return Err(OutlineError::MissingAnchor(placement)),
            (false, _) => None,
        };

        match (placement, anchor) {
            (BlockPlacement::PageStart, _) => {
                self.nodes.insert(id, new_node(content, None));
                self.roots.insert(0, id);
            }
            (BlockPlacement::PageEnd, _) => {
                self.nodes.insert(id, new_node(content, None));
                self.roots.push(id);
            }
            (BlockPlacement::FirstChild | BlockPlacement::LastChild, Some(parent)) => {
                self.nodes.insert(id, new_node(content, Some(parent)));
                let children = &mut self
                    .nodes
                    .get_mut(&parent)
                    .ok_or(OutlineError::UnknownBlock(parent))?
                    .children;
                if placement == BlockPlacement::FirstChild {
                    children.insert(0, id);
                } else {
                    children.push(id);
                }
            }
            (BlockPlacement::SiblingAfter | BlockPlacement::SiblingBefore, Some(sibling)) => {
                let parent = self.nodes[&sibling].parent;
                self.nodes.insert(id, new_node(content, parent));
                let siblings = self.sibling_list_mut(parent)?;
                let index = siblings
                    .iter()
                    .position(|candidate| *candidate == sibling)
                    .ok_or(OutlineError::UnknownBlock(sibling))?;
                let at = if placement == BlockPlacement::SiblingAfter {
                    index + 1
                } else {
                    index
                };
                siblings.insert(at, id);
            }
            (_, None) => return Err(OutlineError::MissingAnchor(placement)),
        }
        Ok(id)
    }

    /// Overwrites one block's content in place.
    pub fn set_content(
        &mut self,
        id: BlockId,
        content: impl Into<String>,
    ) -> Result<(), OutlineError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(OutlineError::UnknownBlock(id))?;
        node.content = content.into();
        Ok(())
    }

    /// Removes one block and its subtree. Unknown ids are ignored.
    pub fn remove(&mut self, id: BlockId) {
        let Some(parent) = self.nodes.get(&id).map(|node| node.parent) else {
            return;
        };
        if let Ok(siblings) = self.sibling_list_mut(parent) {
            siblings.retain(|candidate| *candidate != id);
        }
        for removed in self.subtree(id) {
            self.nodes.remove(&removed);
        }
    }

    /// Renders the outline as indented `- ` bullet lines.
    ///
    /// Continuation lines of multi-line content are indented under their bullet.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            self.render_into(*root, 0, &mut out);
        }
        out
    }

    fn render_into(&self, id: BlockId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let mut lines = node.content.split('\n');
        out.push_str(&indent);
        out.push_str("- ");
        out.push_str(lines.next().unwrap_or_default());
        out.push('\n');
        for line in lines {
            out.push_str(&indent);
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        for child in &node.children {
            self.render_into(*child, depth + 1, out);
        }
    }

    fn sibling_list_mut(
        &mut self,
        parent: Option<BlockId>,
    ) -> Result<&mut Vec<BlockId>, OutlineError> {
        match parent {
            None => Ok(&mut self.roots),
            Some(parent) => self
                .nodes
                .get_mut(&parent)
                .map(|node| &mut node.children)
                .ok_or(OutlineError::UnknownBlock(parent)),
        }
    }
}

fn new_node(content: String, parent: Option<BlockId>) -> OutlineNode {
    OutlineNode {
        content,
        parent,
        children: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Outline, OutlineError};
    use crate::model::block::{Block, BlockPlacement};
    use uuid::Uuid;

    fn stored(id: Uuid, parent: Option<Uuid>, content: &str, sort_order: i64) -> Block {
        Block {
            block_uuid: id,
            page_uuid: Uuid::nil(),
            parent_uuid: parent,
            content: content.to_string(),
            sort_order,
            is_deleted: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn from_blocks_keeps_sibling_order() {
        let root = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let outline = Outline::from_blocks(vec![
            stored(root, None, "root", 0),
            stored(first, Some(root), "first", 0),
            stored(second, Some(root), "second", 1),
        ])
        .expect("valid tree");

        assert_eq!(outline.roots(), &[root]);
        assert_eq!(outline.children(root), &[first, second]);
    }

    #[test]
    fn from_blocks_rejects_dangling_parent() {
        let orphan = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let err = Outline::from_blocks(vec![stored(orphan, Some(missing), "x", 0)])
            .expect_err("dangling parent must be rejected");
        assert_eq!(
            err,
            OutlineError::DanglingParent {
                block: orphan,
                parent: missing
            }
        );
    }

    #[test]
    fn from_blocks_rejects_cycles() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let err = Outline::from_blocks(vec![
            stored(a, Some(b), "a", 0),
            stored(b, Some(a), "b", 0),
        ])
        .expect_err("cycle must be rejected");
        assert!(matches!(
            err,
            OutlineError::NotATree {
                reachable: 0,
                total: 2
            }
        ));
    }

    #[test]
    fn sibling_insert_lands_next_to_anchor() {
        let mut outline = Outline::new();
        let a = outline.push_root("a");
        let c = outline.push_root("c");
        let b = outline
            .insert(Some(a), "b", BlockPlacement::SiblingAfter)
            .expect("insert after");
        let start = outline
            .insert(None, "start", BlockPlacement::PageStart)
            .expect("prepend");

        assert_eq!(outline.roots(), &[start, a, b, c]);
    }

    #[test]
    fn remove_drops_whole_subtree_and_is_idempotent() {
        let mut outline = Outline::new();
        let root = outline.push_root("root");
        let child = outline.push_child(root, "child").expect("child");
        outline.push_child(child, "grandchild").expect("grandchild");

        outline.remove(child);
        outline.remove(child);

        assert_eq!(outline.len(), 1);
        assert!(outline.children(root).is_empty());
    }

    #[test]
    fn render_indents_children_and_continuation_lines() {
        let mut outline = Outline::new();
        let root = outline.push_root("Notes\nmore");
        outline.push_child(root, "TODO call Bob").expect("child");

        assert_eq!(outline.render(), "- Notes\n  more\n  - TODO call Bob\n");
    }
}
