//! Delete outcomes against the fake helpdesk

use kbsync_api::{HelpdeskClient, Method, ResourceKind};
use kbsync_engine::{CreateOptions, DeleteOutcome, SyncEngine, SyncError};
use kbsync_model::{Category, Portal, RemoteId};
use kbsync_test_utils::FakeHelpdesk;

fn synced(fake: &FakeHelpdesk) -> (Portal, kbsync_model::CategoryId, u64) {
    let remote = fake.seed_category("Billing");
    let mut portal = Portal::new("Help");
    let id = portal.add_category(Category::new("Billing").with_remote_id(RemoteId(remote)));
    (portal, id, remote)
}

#[test]
fn delete_clears_remote_id() {
    let fake = FakeHelpdesk::new();
    let (mut portal, id, remote) = synced(&fake);
    let mut engine = SyncEngine::new(HelpdeskClient::new(&fake));

    let outcome = engine.delete_category(&mut portal, id).unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted(RemoteId(remote)));
    assert_eq!(portal.category(id).unwrap().meta.remote_id(), None);
    assert!(fake.resource(ResourceKind::Category, remote).is_none());
    assert_eq!(engine.report().deleted, 1);

    // The node can be created again afterwards.
    engine
        .create_category(&mut portal, id, &CreateOptions::default())
        .unwrap();
    assert!(portal.category(id).unwrap().meta.remote_id().is_some());
}

#[test]
fn gone_and_refused_are_soft_successes() {
    let fake = FakeHelpdesk::new();
    let mut engine = SyncEngine::new(HelpdeskClient::new(&fake));

    let mut portal = Portal::new("Help");
    let gone = portal.add_category(Category::new("Gone").with_remote_id(RemoteId(404_404)));
    assert_eq!(
        engine.delete_category(&mut portal, gone).unwrap(),
        DeleteOutcome::AlreadyGone(RemoteId(404_404))
    );
    assert_eq!(portal.category(gone).unwrap().meta.remote_id(), None);

    let (mut portal, id, remote) = synced(&fake);
    fake.fail(Method::Delete, &format!("v2/solutions/categories/{remote}"), 405, "{}");
    assert_eq!(
        engine.delete_category(&mut portal, id).unwrap(),
        DeleteOutcome::Refused(RemoteId(remote))
    );
    assert_eq!(portal.category(id).unwrap().meta.remote_id(), None);
    assert!(engine.report().is_clean());
}

#[test]
fn hard_failures_keep_the_remote_id() {
    let fake = FakeHelpdesk::new();
    let (mut portal, id, remote) = synced(&fake);
    fake.fail(Method::Delete, "v2/solutions/*", 500, "boom");
    let mut engine = SyncEngine::new(HelpdeskClient::new(&fake));

    let err = engine.delete_category(&mut portal, id).unwrap_err();
    assert!(matches!(err, SyncError::Api { .. }));
    assert_eq!(portal.category(id).unwrap().meta.remote_id(), Some(RemoteId(remote)));
    assert_eq!(engine.report().failed, 1);
}

#[test]
fn unsynced_node_has_nothing_to_delete() {
    let fake = FakeHelpdesk::new();
    let mut portal = Portal::new("Help");
    let id = portal.add_category(Category::new("Local"));
    let err = SyncEngine::new(HelpdeskClient::new(&fake))
        .delete_category(&mut portal, id)
        .unwrap_err();
    assert!(matches!(err, SyncError::NoRemoteId(_)));
    assert_eq!(fake.call_count(), 0);
}
