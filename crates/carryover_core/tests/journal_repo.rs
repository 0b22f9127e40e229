use carryover_core::db::open_db_in_memory;
use carryover_core::{
    BlockPlacement, JournalRepoError, JournalRepository, PageKind, RunState,
    SqliteJournalRepository,
};

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

#[test]
fn create_page_seeds_optional_first_block() {
    let conn = setup();
    let repo = SqliteJournalRepository::try_new(&conn).unwrap();

    let seeded = repo
        .create_page("2026-10-19", PageKind::Journal, Some(20261019), true)
        .unwrap();
    let bare = repo
        .create_page("daily", PageKind::Template, None, false)
        .unwrap();

    assert!(seeded.is_journal());
    assert_eq!(repo.get_tree(seeded.page_uuid).unwrap().contents(), vec![""]);
    assert!(repo.get_tree(bare.page_uuid).unwrap().is_empty());
    assert_eq!(
        repo.get_journal_page(20261019).unwrap().map(|page| page.name),
        Some("2026-10-19".to_string())
    );
}

#[test]
fn create_page_rejects_duplicates_and_inconsistent_kinds() {
    let conn = setup();
    let repo = SqliteJournalRepository::try_new(&conn).unwrap();
    repo.create_page("2026-10-19", PageKind::Journal, Some(20261019), false)
        .unwrap();

    assert!(matches!(
        repo.create_page("2026-10-19", PageKind::Template, None, false),
        Err(JournalRepoError::DuplicatePageName(_))
    ));
    assert!(matches!(
        repo.create_page("Oct 19th", PageKind::Journal, Some(20261019), false),
        Err(JournalRepoError::DuplicateJournalDay(20261019))
    ));
    assert!(matches!(
        repo.create_page("orphan", PageKind::Journal, None, false),
        Err(JournalRepoError::InvalidPage(_))
    ));
    assert!(matches!(
        repo.create_page("  ", PageKind::Template, None, false),
        Err(JournalRepoError::InvalidPage(_))
    ));
}

#[test]
fn placements_build_expected_outline() {
    let conn = setup();
    let repo = SqliteJournalRepository::try_new(&conn).unwrap();
    let page = repo
        .create_page("2026-10-19", PageKind::Journal, Some(20261019), false)
        .unwrap();
    let id = page.page_uuid;

    let middle = repo
        .create_block(id, None, "middle", BlockPlacement::PageEnd)
        .unwrap();
    repo.create_block(id, None, "first", BlockPlacement::PageStart)
        .unwrap();
    repo.create_block(id, None, "last", BlockPlacement::PageEnd)
        .unwrap();
    repo.create_block(id, Some(middle.block_uuid), "before middle", BlockPlacement::SiblingBefore)
        .unwrap();
    repo.create_block(id, Some(middle.block_uuid), "after middle", BlockPlacement::SiblingAfter)
        .unwrap();
    repo.create_block(id, Some(middle.block_uuid), "second child", BlockPlacement::LastChild)
        .unwrap();
    repo.create_block(id, Some(middle.block_uuid), "first child", BlockPlacement::FirstChild)
        .unwrap();

    assert_eq!(
        repo.get_tree(id).unwrap().render(),
        "- first\n- before middle\n- middle\n  - first child\n  - second child\n- after middle\n- last\n"
    );
}

#[test]
fn relative_placements_require_anchor_on_same_page() {
    let conn = setup();
    let repo = SqliteJournalRepository::try_new(&conn).unwrap();
    let today = repo
        .create_page("2026-10-19", PageKind::Journal, Some(20261019), true)
        .unwrap();
    let other = repo
        .create_page("2026-10-18", PageKind::Journal, Some(20261018), true)
        .unwrap();
    let foreign = repo.get_tree(other.page_uuid).unwrap().roots()[0];

    assert!(matches!(
        repo.create_block(today.page_uuid, None, "x", BlockPlacement::SiblingAfter),
        Err(JournalRepoError::AnchorRequired(BlockPlacement::SiblingAfter))
    ));
    assert!(matches!(
        repo.create_block(today.page_uuid, Some(foreign), "x", BlockPlacement::LastChild),
        Err(JournalRepoError::AnchorOnOtherPage { .. })
    ));
}

#[test]
fn update_and_delete_respect_soft_deletion() {
    let conn = setup();
    let repo = SqliteJournalRepository::try_new(&conn).unwrap();
    let page = repo
        .create_page("2026-10-19", PageKind::Journal, Some(20261019), false)
        .unwrap();
    let parent = repo
        .create_block(page.page_uuid, None, "Project", BlockPlacement::PageEnd)
        .unwrap();
    let child = repo
        .create_block(
            page.page_uuid,
            Some(parent.block_uuid),
            "TODO step",
            BlockPlacement::LastChild,
        )
        .unwrap();

    repo.update_block(child.block_uuid, "TODO step two").unwrap();
    assert_eq!(
        repo.get_block(child.block_uuid).unwrap().map(|block| block.content),
        Some("TODO step two".to_string())
    );

    repo.delete_block(parent.block_uuid).unwrap();
    repo.delete_block(parent.block_uuid).unwrap();
    repo.delete_block(uuid::Uuid::new_v4()).unwrap();

    assert!(repo.get_block(child.block_uuid).unwrap().is_none());
    assert!(repo.get_tree(page.page_uuid).unwrap().is_empty());
    assert!(matches!(
        repo.update_block(child.block_uuid, "again"),
        Err(JournalRepoError::BlockNotFound(_))
    ));
}

#[test]
fn journal_pages_before_skips_empty_and_later_pages() {
    let conn = setup();
    let repo = SqliteJournalRepository::try_new(&conn).unwrap();
    let older = repo
        .create_page("2026-10-16", PageKind::Journal, Some(20261016), true)
        .unwrap();
    repo.create_page("2026-10-17", PageKind::Journal, Some(20261017), true)
        .unwrap();
    let emptied = repo
        .create_page("2026-10-18", PageKind::Journal, Some(20261018), false)
        .unwrap();
    let gone = repo
        .create_block(emptied.page_uuid, None, "TODO moved", BlockPlacement::PageEnd)
        .unwrap();
    repo.delete_block(gone.block_uuid).unwrap();
    repo.create_page("2026-10-20", PageKind::Journal, Some(20261020), true)
        .unwrap();
    repo.create_page("daily", PageKind::Template, None, true)
        .unwrap();

    let names: Vec<String> = repo
        .journal_pages_before(20261019)
        .unwrap()
        .into_iter()
        .map(|page| page.name)
        .collect();

    assert_eq!(names, vec!["2026-10-17", "2026-10-16"]);
    assert_eq!(
        repo.latest_journal_page_before(20261019)
            .unwrap()
            .map(|page| page.journal_day),
        Some(Some(20261017))
    );
    assert!(repo
        .latest_journal_page_before(older.journal_day.unwrap())
        .unwrap()
        .is_none());
}

#[test]
fn apply_template_expands_roots_into_anchor() {
    let conn = setup();
    let repo = SqliteJournalRepository::try_new(&conn).unwrap();
    let template = repo
        .create_page("daily", PageKind::Template, None, false)
        .unwrap();
    let plan = repo
        .create_block(template.page_uuid, None, "## Plan", BlockPlacement::PageEnd)
        .unwrap();
    repo.create_block(template.page_uuid, Some(plan.block_uuid), "", BlockPlacement::LastChild)
        .unwrap();
    repo.create_block(template.page_uuid, None, "## Log", BlockPlacement::PageEnd)
        .unwrap();

    let page = repo
        .create_page("2026-10-19", PageKind::Journal, Some(20261019), true)
        .unwrap();
    let anchor = repo.get_tree(page.page_uuid).unwrap().roots()[0];

    assert!(repo.apply_template(anchor, "daily").unwrap());
    assert!(!repo.apply_template(anchor, "weekly").unwrap());
    assert!(repo.template_exists("daily").unwrap());
    assert!(!repo.template_exists("2026-10-19").unwrap());

    let tree = repo.get_tree(page.page_uuid).unwrap();
    assert_eq!(tree.render(), "- ## Plan\n  - \n- ## Log\n");
    assert_eq!(tree.roots()[0], anchor);
    assert_eq!(
        repo.get_tree(template.page_uuid).unwrap().len(),
        3,
        "template page must stay untouched"
    );
}

#[test]
fn claim_run_is_exclusive_per_day() {
    let conn = setup();
    let repo = SqliteJournalRepository::try_new(&conn).unwrap();

    assert_eq!(repo.run_state(20261019).unwrap(), None);
    assert!(repo.claim_run(20261019).unwrap());
    assert!(!repo.claim_run(20261019).unwrap());
    assert_eq!(repo.run_state(20261019).unwrap(), Some(RunState::Pending));

    repo.set_run_state(20261019, RunState::Complete).unwrap();
    assert_eq!(repo.run_state(20261019).unwrap(), Some(RunState::Complete));
    assert!(!repo.claim_run(20261019).unwrap());

    assert!(repo.claim_run(20261020).unwrap());
}
