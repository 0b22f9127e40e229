//! Write seam shared by the transfer and prune engines.
//!
//! `Outline` applies edits to the in-memory arena; `RepoWriter` forwards
//! each edit to a `JournalRepository` immediately, so storage sees the same
//! document-ordered sequence the engine issued.

use crate::model::block::{BlockId, BlockPlacement};
use crate::model::outline::{Outline, OutlineError};
use crate::model::page::PageId;
use crate::repo::journal_repo::{JournalRepoError, JournalRepository};

/// Block mutations issued by the engines.
pub trait OutlineWriter {
    type Error;

    /// Creates one block relative to `anchor` and returns its id.
    fn create_block(
        &mut self,
        anchor: BlockId,
        content: &str,
        placement: BlockPlacement,
    ) -> Result<BlockId, Self::Error>;
    /// Overwrites content in place.
    fn update_block(&mut self, id: BlockId, content: &str) -> Result<(), Self::Error>;
    /// Removes a block with its subtree. Already removed ids are ignored.
    fn delete_block(&mut self, id: BlockId) -> Result<(), Self::Error>;
}

impl OutlineWriter for Outline {
    type Error = OutlineError;

    fn create_block(
        &mut self,
        anchor: BlockId,
        content: &str,
        placement: BlockPlacement,
    ) -> Result<BlockId, OutlineError> {
        self.insert(Some(anchor), content, placement)
    }

    fn update_block(&mut self, id: BlockId, content: &str) -> Result<(), OutlineError> {
        self.set_content(id, content)
    }

    fn delete_block(&mut self, id: BlockId) -> Result<(), OutlineError> {
        self.remove(id);
        Ok(())
    }
}

/// Counts of writes issued through one `RepoWriter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Writer bound to one page of a repository.
pub struct RepoWriter<'r, R: JournalRepository + ?Sized> {
    repo: &'r R,
    page_uuid: PageId,
    stats: WriteStats,
}

impl<'r, R: JournalRepository + ?Sized> RepoWriter<'r, R> {
    pub fn new(repo: &'r R, page_uuid: PageId) -> Self {
        Self {
            repo,
            page_uuid,
            stats: WriteStats::default(),
        }
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }
}

impl<R: JournalRepository + ?Sized> OutlineWriter for RepoWriter<'_, R> {
    type Error = JournalRepoError;

    fn create_block(
        &mut self,
        anchor: BlockId,
        content: &str,
        placement: BlockPlacement,
    ) -> Result<BlockId, JournalRepoError> {
        let block = self
            .repo
            .create_block(self.page_uuid, Some(anchor), content, placement)?;
        self.stats.created += 1;
        Ok(block.block_uuid)
    }

    fn update_block(&mut self, id: BlockId, content: &str) -> Result<(), JournalRepoError> {
        self.repo.update_block(id, content)?;
        self.stats.updated += 1;
        Ok(())
    }

    fn delete_block(&mut self, id: BlockId) -> Result<(), JournalRepoError> {
        self.repo.delete_block(id)?;
        self.stats.deleted += 1;
        Ok(())
    }
}
