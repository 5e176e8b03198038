//! Push then write back into a JSON workbook file

use kbsync_api::HelpdeskClient;
use kbsync_engine::{write_back, CreateOptions, SyncEngine, SyncError};
use kbsync_model::{CellRef, NodeRef, RemoteId};
use kbsync_sheet::{parse_workbook, JsonWorkbookFile, ParseOptions, SheetSource};
use kbsync_test_utils::{scenario_workbook, FakeHelpdesk, FIRST_ID, WORKBOOK_ID};

#[test]
fn written_ids_make_the_next_push_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let file = JsonWorkbookFile::new(dir.path().join("workbook.json"));
    file.store(&scenario_workbook()).unwrap();

    let fake = FakeHelpdesk::new();
    let mut engine = SyncEngine::new(HelpdeskClient::new(&fake));

    let workbook = file.fetch_workbook(WORKBOOK_ID).unwrap();
    let mut portal = parse_workbook(&workbook, &ParseOptions::default()).portal;
    let category = portal.category_ids()[0];
    engine
        .create_category(&mut portal, category, &CreateOptions::recursive())
        .unwrap();

    let done = write_back(&portal, category.into(), &file).unwrap();
    assert_eq!(done.cell, CellRef::new(1, 1));

    let workbook = file.fetch_workbook(WORKBOOK_ID).unwrap();
    let sheet = workbook.sheet("Cat A").unwrap();
    assert_eq!(sheet.grid.at(CellRef::new(1, 1)), Some(FIRST_ID.to_string().as_str()));

    let mut reparsed = parse_workbook(&workbook, &ParseOptions::default()).portal;
    let category = reparsed.category_ids()[0];
    assert_eq!(
        reparsed.category(category).unwrap().meta.remote_id(),
        Some(RemoteId(FIRST_ID))
    );
    fake.clear_calls();
    engine
        .create_category(&mut reparsed, category, &CreateOptions::recursive())
        .unwrap();
    assert_eq!(fake.call_count(), 0);
}

#[test]
fn folder_write_back_leaves_the_article_title_alone() {
    let dir = tempfile::tempdir().unwrap();
    let file = JsonWorkbookFile::new(dir.path().join("workbook.json"));
    file.store(&scenario_workbook()).unwrap();

    let workbook = file.fetch_workbook(WORKBOOK_ID).unwrap();
    let mut portal = parse_workbook(&workbook, &ParseOptions::default()).portal;
    let category = portal.category_ids()[0];
    let folder = portal.category(category).unwrap().folders()[0];
    let node = NodeRef::from(folder);
    portal.assign_remote_id(node, RemoteId(999)).unwrap();

    let err = write_back(&portal, node, &file).unwrap_err();
    assert!(matches!(err, SyncError::NotWritable(n) if n == node));

    let workbook = file.fetch_workbook(WORKBOOK_ID).unwrap();
    let sheet = workbook.sheet("Cat A").unwrap();
    assert_eq!(sheet.grid.at(CellRef::new(3, 0)), Some("Folder 1"));
    assert_eq!(sheet.grid.at(CellRef::new(3, 1)), Some("Art 1"));
}
