//! Outline block record.
//!
//! # Invariants
//! - `block_uuid` is stable and never reused for another block.
//! - `parent_uuid == None` means the block is top-level on its page.
//! - Siblings are ordered by `sort_order ASC, block_uuid ASC`.

use crate::model::page::PageId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one outline block.
pub type BlockId = Uuid;

/// Stored outline block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub block_uuid: BlockId,
    /// Owning page.
    pub page_uuid: PageId,
    /// Parent block. `None` means top-level.
    pub parent_uuid: Option<BlockId>,
    /// Plain text content. May be empty.
    pub content: String,
    /// Stable child order key within one parent.
    pub sort_order: i64,
    /// Soft-delete marker.
    pub is_deleted: bool,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Where a new block lands relative to an anchor.
///
/// Anchor-free placements (`PageStart`, `PageEnd`) ignore the anchor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPlacement {
    /// Directly after the anchor, same parent.
    SiblingAfter,
    /// Directly before the anchor, same parent.
    SiblingBefore,
    /// First child of the anchor.
    FirstChild,
    /// Last child of the anchor.
    LastChild,
    /// First top-level block of the page.
    PageStart,
    /// Last top-level block of the page.
    PageEnd,
}

impl BlockPlacement {
    /// Returns whether this placement needs an anchor block.
    pub fn needs_anchor(self) -> bool {
        !matches!(self, Self::PageStart | Self::PageEnd)
    }
}
