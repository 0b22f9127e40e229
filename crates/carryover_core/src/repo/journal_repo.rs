//! Journal page/block repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the storage operations the carry-over run needs: page lookup,
//!   block tree reads, positional block create/update/delete, template
//!   expansion, and per-day run claims.
//! - Keep SQL details and ordering behavior inside repository boundary.
//!
//! # Invariants
//! - Only active (`is_deleted=0`) blocks are returned.
//! - Sibling listing is deterministic: `sort_order ASC, block_uuid ASC`.
//! - Deleting a block soft-deletes its whole subtree and is idempotent.
//! - A journal day can be claimed by at most one run.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::block::{Block, BlockId, BlockPlacement};
use crate::model::outline::{Outline, OutlineError};
use crate::model::page::{Page, PageId, PageKind};
use crate::model::run_state::RunState;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PAGE_COLUMNS: &str = "page_uuid, name, kind, journal_day, created_at";
const BLOCK_COLUMNS: &str =
    "block_uuid, page_uuid, parent_uuid, content, sort_order, is_deleted, created_at, updated_at";

/// Result type used by journal repository operations.
pub type JournalRepoResult<T> = Result<T, JournalRepoError>;

/// Errors from journal repository operations.
#[derive(Debug)]
pub enum JournalRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target page does not exist.
    PageNotFound(PageId),
    /// Target block does not exist or is soft-deleted.
    BlockNotFound(BlockId),
    /// Another page already uses this name.
    DuplicatePageName(String),
    /// Another journal page already covers this day.
    DuplicateJournalDay(i64),
    /// Page fields are inconsistent with its kind.
    InvalidPage(String),
    /// Placement needs an anchor block but none was given.
    AnchorRequired(BlockPlacement),
    /// Anchor block belongs to a different page than the write targets.
    AnchorOnOtherPage { anchor: BlockId, page_uuid: PageId },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Stored parent edges do not form a tree.
    Outline(OutlineError),
    /// Persisted data cannot be converted to valid read model.
    InvalidData(String),
}

impl Display for JournalRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::PageNotFound(id) => write!(f, "page not found: {id}"),
            Self::BlockNotFound(id) => write!(f, "block not found: {id}"),
            Self::DuplicatePageName(name) => write!(f, "page name already in use: `{name}`"),
            Self::DuplicateJournalDay(day) => write!(f, "journal page already exists for {day}"),
            Self::InvalidPage(message) => write!(f, "invalid page: {message}"),
            Self::AnchorRequired(placement) => {
                write!(f, "placement {placement:?} requires an anchor block")
            }
            Self::AnchorOnOtherPage { anchor, page_uuid } => {
                write!(f, "anchor block {anchor} is not on page {page_uuid}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "journal repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "journal repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "journal repository requires column `{column}` in table `{table}`"
            ),
            Self::Outline(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid journal data: {message}"),
        }
    }
}

impl Error for JournalRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Outline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for JournalRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for JournalRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<OutlineError> for JournalRepoError {
    fn from(value: OutlineError) -> Self {
        Self::Outline(value)
    }
}

/// Repository interface for journal pages and their block trees.
pub trait JournalRepository {
    /// Loads one page by id.
    fn get_page(&self, page_uuid: PageId) -> JournalRepoResult<Option<Page>>;
    /// Loads one page by its unique name.
    fn get_page_by_name(&self, name: &str) -> JournalRepoResult<Option<Page>>;
    /// Loads the journal page of one `YYYYMMDD` day.
    fn get_journal_page(&self, journal_day: i64) -> JournalRepoResult<Option<Page>>;
    /// Creates one page, optionally seeded with one empty top-level block.
    fn create_page(
        &self,
        name: &str,
        kind: PageKind,
        journal_day: Option<i64>,
        with_first_block: bool,
    ) -> JournalRepoResult<Page>;
    /// Journal pages strictly before `journal_day` that hold at least one
    /// active block, newest first.
    fn journal_pages_before(&self, journal_day: i64) -> JournalRepoResult<Vec<Page>>;
    /// Newest journal page strictly before `journal_day` with at least one
    /// active block.
    fn latest_journal_page_before(&self, journal_day: i64) -> JournalRepoResult<Option<Page>> {
        Ok(self.journal_pages_before(journal_day)?.into_iter().next())
    }
    /// Reads the active block tree of a page. Unknown pages yield an empty
    /// outline.
    fn get_tree(&self, page_uuid: PageId) -> JournalRepoResult<Outline>;
    /// Loads one active block.
    fn get_block(&self, block_uuid: BlockId) -> JournalRepoResult<Option<Block>>;
    /// Creates one block relative to an anchor on `page_uuid`.
    fn create_block(
        &self,
        page_uuid: PageId,
        anchor: Option<BlockId>,
        content: &str,
        placement: BlockPlacement,
    ) -> JournalRepoResult<Block>;
    /// Overwrites block content without moving it.
    fn update_block(&self, block_uuid: BlockId, content: &str) -> JournalRepoResult<()>;
    /// Soft-deletes a block and its subtree. Unknown or deleted ids are a no-op.
    fn delete_block(&self, block_uuid: BlockId) -> JournalRepoResult<()>;
    /// Returns whether a template page with this name exists.
    fn template_exists(&self, name: &str) -> JournalRepoResult<bool>;
    /// Expands template `name` into `anchor`.
    ///
    /// The first template root replaces the anchor content and receives its
    /// children; further roots land as siblings after it. Returns `false`
    /// when the template does not exist.
    fn apply_template(&self, anchor: BlockId, name: &str) -> JournalRepoResult<bool>;
    /// Atomically claims a day for one run. `false` when already claimed.
    fn claim_run(&self, journal_day: i64) -> JournalRepoResult<bool>;
    /// Records run progress for a day.
    fn set_run_state(&self, journal_day: i64, state: RunState) -> JournalRepoResult<()>;
    /// Loads run progress for a day.
    fn run_state(&self, journal_day: i64) -> JournalRepoResult<Option<RunState>>;
}

/// SQLite-backed journal repository.
pub struct SqliteJournalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> JournalRepoResult<Self> {
        ensure_journal_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl JournalRepository for SqliteJournalRepository<'_> {
    fn get_page(&self, page_uuid: PageId) -> JournalRepoResult<Option<Page>> {
        query_optional_page(
            self.conn,
            &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE page_uuid = ?1;"),
            page_uuid.to_string(),
        )
    }

    fn get_page_by_name(&self, name: &str) -> JournalRepoResult<Option<Page>> {
        query_optional_page(
            self.conn,
            &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE name = ?1;"),
            name.trim(),
        )
    }

    fn get_journal_page(&self, journal_day: i64) -> JournalRepoResult<Option<Page>> {
        query_optional_page(
            self.conn,
            &format!(
                "SELECT {PAGE_COLUMNS} FROM pages WHERE kind = 'journal' AND journal_day = ?1;"
            ),
            journal_day,
        )
    }

    fn create_page(
        &self,
        name: &str,
        kind: PageKind,
        journal_day: Option<i64>,
        with_first_block: bool,
    ) -> JournalRepoResult<Page> {
        let name = name.trim();
        if name.is_empty() {
            return Err(JournalRepoError::InvalidPage(
                "page name must not be blank".to_string(),
            ));
        }
        match (kind, journal_day) {
            (PageKind::Journal, None) => {
                return Err(JournalRepoError::InvalidPage(format!(
                    "journal page `{name}` requires a journal day"
                )));
            }
            (PageKind::Template, Some(_)) => {
                return Err(JournalRepoError::InvalidPage(format!(
                    "template page `{name}` must not carry a journal day"
                )));
            }
            _ => {}
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if page_name_taken(&tx, name)? {
            return Err(JournalRepoError::DuplicatePageName(name.to_string()));
        }
        if let Some(day) = journal_day {
            if query_optional_page(
                &tx,
                &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE journal_day = ?1;"),
                day,
            )?
            .is_some()
            {
                return Err(JournalRepoError::DuplicateJournalDay(day));
            }
        }

        let page_uuid = Uuid::new_v4();
        tx.execute(
            "INSERT INTO pages (page_uuid, name, kind, journal_day)
             VALUES (?1, ?2, ?3, ?4);",
            params![page_uuid.to_string(), name, kind.as_str(), journal_day],
        )?;
        if with_first_block {
            insert_block(&tx, page_uuid, None, "", BlockPlacement::PageEnd)?;
        }
        tx.commit()?;

        self.get_page(page_uuid)?
            .ok_or(JournalRepoError::PageNotFound(page_uuid))
    }

    fn journal_pages_before(&self, journal_day: i64) -> JournalRepoResult<Vec<Page>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.page_uuid, p.name, p.kind, p.journal_day, p.created_at
             FROM pages p
             WHERE p.kind = 'journal'
               AND p.journal_day < ?1
               AND EXISTS(
                 SELECT 1
                 FROM blocks b
                 WHERE b.page_uuid = p.page_uuid
                   AND b.is_deleted = 0
               )
             ORDER BY p.journal_day DESC;",
        )?;
        let mut rows = stmt.query([journal_day])?;
        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(parse_page_row(row)?);
        }
        Ok(pages)
    }

    fn get_tree(&self, page_uuid: PageId) -> JournalRepoResult<Outline> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BLOCK_COLUMNS}
             FROM blocks
             WHERE page_uuid = ?1
               AND is_deleted = 0
             ORDER BY sort_order ASC, block_uuid ASC;"
        ))?;
        let mut rows = stmt.query([page_uuid.to_string()])?;
        let mut blocks = Vec::new();
        while let Some(row) = rows.next()? {
            blocks.push(parse_block_row(row)?);
        }
        Ok(Outline::from_blocks(blocks)?)
    }

    fn get_block(&self, block_uuid: BlockId) -> JournalRepoResult<Option<Block>> {
        load_active_block(self.conn, block_uuid)
    }

    fn create_block(
        &self,
        page_uuid: PageId,
        anchor: Option<BlockId>,
        content: &str,
        placement: BlockPlacement,
    ) -> JournalRepoResult<Block> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let block_uuid = insert_block(&tx, page_uuid, anchor, content, placement)?;
        tx.commit()?;
        load_active_block(self.conn, block_uuid)?
            .ok_or(JournalRepoError::BlockNotFound(block_uuid))
    }

    fn update_block(&self, block_uuid: BlockId, content: &str) -> JournalRepoResult<()> {
        update_block_content(self.conn, block_uuid, content)
    }

    fn delete_block(&self, block_uuid: BlockId) -> JournalRepoResult<()> {
        self.conn.execute(
            "WITH RECURSIVE subtree(block_uuid) AS (
                SELECT block_uuid
                FROM blocks
                WHERE block_uuid = ?1
                  AND is_deleted = 0
                UNION ALL
                SELECT child.block_uuid
                FROM blocks child
                INNER JOIN subtree parent ON child.parent_uuid = parent.block_uuid
                WHERE child.is_deleted = 0
            )
            UPDATE blocks
            SET is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
            WHERE block_uuid IN (SELECT block_uuid FROM subtree)
              AND is_deleted = 0;",
            [block_uuid.to_string()],
        )?;
        Ok(())
    }

    fn template_exists(&self, name: &str) -> JournalRepoResult<bool> {
        Ok(find_template(self.conn, name)?.is_some())
    }

    fn apply_template(&self, anchor: BlockId, name: &str) -> JournalRepoResult<bool> {
        let Some(template) = find_template(self.conn, name)? else {
            return Ok(false);
        };
        let anchor_block =
            load_active_block(self.conn, anchor)?.ok_or(JournalRepoError::BlockNotFound(anchor))?;
        let tree = self.get_tree(template.page_uuid)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut previous: Option<BlockId> = None;
        for root in tree.roots() {
            let target = match previous {
                None => {
                    update_block_content(&tx, anchor, tree.content(*root))?;
                    anchor
                }
                Some(previous) => insert_block(
                    &tx,
                    anchor_block.page_uuid,
                    Some(previous),
                    tree.content(*root),
                    BlockPlacement::SiblingAfter,
                )?,
            };
            copy_children(&tx, anchor_block.page_uuid, &tree, *root, target)?;
            previous = Some(target);
        }
        tx.commit()?;
        Ok(true)
    }

    fn claim_run(&self, journal_day: i64) -> JournalRepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO carry_runs (journal_day, state)
             VALUES (?1, ?2);",
            params![journal_day, RunState::Pending.as_str()],
        )?;
        Ok(inserted == 1)
    }

    fn set_run_state(&self, journal_day: i64, state: RunState) -> JournalRepoResult<()> {
        self.conn.execute(
            "INSERT INTO carry_runs (journal_day, state)
             VALUES (?1, ?2)
             ON CONFLICT(journal_day) DO UPDATE
             SET state = excluded.state,
                 updated_at = (strftime('%s', 'now') * 1000);",
            params![journal_day, state.as_str()],
        )?;
        Ok(())
    }

    fn run_state(&self, journal_day: i64) -> JournalRepoResult<Option<RunState>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT state FROM carry_runs WHERE journal_day = ?1;",
                [journal_day],
                |row| row.get(0),
            )
            .optional()?;
        value
            .map(|text| {
                RunState::parse(&text).ok_or_else(|| {
                    JournalRepoError::InvalidData(format!(
                        "invalid run state `{text}` in carry_runs.state"
                    ))
                })
            })
            .transpose()
    }
}

/// Inserts one block without opening a transaction of its own.
fn insert_block(
    conn: &Connection,
    page_uuid: PageId,
    anchor: Option<BlockId>,
    content: &str,
    placement: BlockPlacement,
) -> JournalRepoResult<BlockId> {
    if !page_exists(conn, page_uuid)? {
        return Err(JournalRepoError::PageNotFound(page_uuid));
    }

    // `None` index appends after the current last sibling.
    let (parent_uuid, index): (Option<BlockId>, Option<usize>) = match placement {
        BlockPlacement::PageStart => (None, Some(0)),
        BlockPlacement::PageEnd => (None, None),
        BlockPlacement::FirstChild
        | BlockPlacement::LastChild
        | BlockPlacement::SiblingAfter
        | BlockPlacement::SiblingBefore => {
            let anchor = anchor.ok_or(JournalRepoError::AnchorRequired(placement))?;
            let anchor_block = load_active_block(conn, anchor)?
                .ok_or(JournalRepoError::BlockNotFound(anchor))?;
            if anchor_block.page_uuid != page_uuid {
                return Err(JournalRepoError::AnchorOnOtherPage { anchor, page_uuid });
            }
            match placement {
                BlockPlacement::FirstChild => (Some(anchor), Some(0)),
                BlockPlacement::LastChild => (Some(anchor), None),
                _ => {
                    let siblings = list_child_ids(conn, page_uuid, anchor_block.parent_uuid)?;
                    let position = siblings
                        .iter()
                        .position(|id| *id == anchor)
                        .ok_or(JournalRepoError::BlockNotFound(anchor))?;
                    let index = if placement == BlockPlacement::SiblingAfter {
                        position + 1
                    } else {
                        position
                    };
                    (anchor_block.parent_uuid, Some(index))
                }
            }
        }
    };

    let block_uuid = Uuid::new_v4();
    let insert = |sort_order: i64| {
        conn.execute(
            "INSERT INTO blocks (block_uuid, page_uuid, parent_uuid, content, sort_order, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, 0);",
            params![
                block_uuid.to_string(),
                page_uuid.to_string(),
                parent_uuid.map(|value| value.to_string()),
                content,
                sort_order,
            ],
        )
    };

    match index {
        None => {
            insert(next_sort_order(conn, page_uuid, parent_uuid)?)?;
        }
        Some(index) => {
            let mut sibling_ids = list_child_ids(conn, page_uuid, parent_uuid)?;
            let index = index.min(sibling_ids.len());
            insert(index as i64)?;
            sibling_ids.insert(index, block_uuid);
            for (order, id) in sibling_ids.into_iter().enumerate() {
                conn.execute(
                    "UPDATE blocks
                     SET sort_order = ?2
                     WHERE block_uuid = ?1;",
                    params![id.to_string(), order as i64],
                )?;
            }
        }
    }

    Ok(block_uuid)
}

fn update_block_content(
    conn: &Connection,
    block_uuid: BlockId,
    content: &str,
) -> JournalRepoResult<()> {
    let changed = conn.execute(
        "UPDATE blocks
         SET content = ?2,
             updated_at = (strftime('%s', 'now') * 1000)
         WHERE block_uuid = ?1
           AND is_deleted = 0;",
        params![block_uuid.to_string(), content],
    )?;
    if changed == 0 {
        return Err(JournalRepoError::BlockNotFound(block_uuid));
    }
    Ok(())
}

fn copy_children(
    conn: &Connection,
    page_uuid: PageId,
    tree: &Outline,
    source: BlockId,
    target: BlockId,
) -> JournalRepoResult<()> {
    for child in tree.children(source) {
        let copied = insert_block(
            conn,
            page_uuid,
            Some(target),
            tree.content(*child),
            BlockPlacement::LastChild,
        )?;
        copy_children(conn, page_uuid, tree, *child, copied)?;
    }
    Ok(())
}

fn find_template(conn: &Connection, name: &str) -> JournalRepoResult<Option<Page>> {
    query_optional_page(
        conn,
        &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE kind = 'template' AND name = ?1;"),
        name.trim(),
    )
}

fn query_optional_page(
    conn: &Connection,
    sql: &str,
    param: impl rusqlite::ToSql,
) -> JournalRepoResult<Option<Page>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([param])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_page_row(row)?));
    }
    Ok(None)
}

fn page_exists(conn: &Connection, page_uuid: PageId) -> JournalRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM pages WHERE page_uuid = ?1);",
        [page_uuid.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn page_name_taken(conn: &Connection, name: &str) -> JournalRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM pages WHERE name = ?1);",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn load_active_block(conn: &Connection, block_uuid: BlockId) -> JournalRepoResult<Option<Block>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BLOCK_COLUMNS}
         FROM blocks
         WHERE block_uuid = ?1
           AND is_deleted = 0;"
    ))?;
    let mut rows = stmt.query([block_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_block_row(row)?));
    }
    Ok(None)
}

fn list_child_ids(
    conn: &Connection,
    page_uuid: PageId,
    parent_uuid: Option<BlockId>,
) -> JournalRepoResult<Vec<BlockId>> {
    // `IS` compares NULL parents as equal, covering top-level siblings.
    let mut stmt = conn.prepare(
        "SELECT block_uuid
         FROM blocks
         WHERE page_uuid = ?1
           AND parent_uuid IS ?2
           AND is_deleted = 0
         ORDER BY sort_order ASC, block_uuid ASC;",
    )?;
    let mut rows = stmt.query(params![
        page_uuid.to_string(),
        parent_uuid.map(|value| value.to_string()),
    ])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "blocks.block_uuid")?);
    }
    Ok(ids)
}

fn next_sort_order(
    conn: &Connection,
    page_uuid: PageId,
    parent_uuid: Option<BlockId>,
) -> JournalRepoResult<i64> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1
         FROM blocks
         WHERE page_uuid = ?1
           AND parent_uuid IS ?2
           AND is_deleted = 0;",
        params![
            page_uuid.to_string(),
            parent_uuid.map(|value| value.to_string()),
        ],
        |row| row.get(0),
    )?;
    Ok(next)
}

fn parse_page_row(row: &Row<'_>) -> JournalRepoResult<Page> {
    let page_uuid_text: String = row.get("page_uuid")?;
    let kind_text: String = row.get("kind")?;
    let kind = PageKind::parse(&kind_text).ok_or_else(|| {
        JournalRepoError::InvalidData(format!("invalid page kind `{kind_text}` in pages.kind"))
    })?;

    Ok(Page {
        page_uuid: parse_uuid(&page_uuid_text, "pages.page_uuid")?,
        name: row.get("name")?,
        kind,
        journal_day: row.get("journal_day")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_block_row(row: &Row<'_>) -> JournalRepoResult<Block> {
    let block_uuid_text: String = row.get("block_uuid")?;
    let page_uuid_text: String = row.get("page_uuid")?;
    let parent_uuid = row
        .get::<_, Option<String>>("parent_uuid")?
        .map(|value| parse_uuid(&value, "blocks.parent_uuid"))
        .transpose()?;

    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(JournalRepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in blocks.is_deleted"
            )));
        }
    };

    Ok(Block {
        block_uuid: parse_uuid(&block_uuid_text, "blocks.block_uuid")?,
        page_uuid: parse_uuid(&page_uuid_text, "blocks.page_uuid")?,
        parent_uuid,
        content: row.get("content")?,
        sort_order: row.get("sort_order")?,
        is_deleted,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> JournalRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| JournalRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_journal_connection_ready(conn: &Connection) -> JournalRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(JournalRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["pages", "blocks", "carry_runs"] {
        if !table_exists(conn, table)? {
            return Err(JournalRepoError::MissingRequiredTable(table));
        }
    }

    for column in [
        "block_uuid",
        "page_uuid",
        "parent_uuid",
        "content",
        "sort_order",
        "is_deleted",
        "created_at",
        "updated_at",
    ] {
        if !table_has_column(conn, "blocks", column)? {
            return Err(JournalRepoError::MissingRequiredColumn {
                table: "blocks",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> JournalRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> JournalRepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
