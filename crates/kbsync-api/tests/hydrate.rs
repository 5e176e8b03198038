//! Hydrating a tree from the fake helpdesk

use kbsync_api::{
    HelpdeskClient, HelpdeskConfig, HydrateError, HydrateOptions, Hydrator, Method, ResourceKind,
};
use kbsync_model::{ArticleType, Language, RemoteId, Status};
use kbsync_test_utils::FakeHelpdesk;
use pretty_assertions::assert_eq;
use serde_json::json;

fn seeded() -> (FakeHelpdesk, u64, u64, u64) {
    let fake = FakeHelpdesk::new().with_settings("en", &["en", "fr", "de"]);
    let category = fake.seed_category("Billing");
    let folder = fake.seed_folder(category, "Invoices");
    let article = fake.seed_article(folder, "Download", "<p>Click <b>Download</b></p>");
    fake.seed_category("Shipping");
    fake.seed_translation(
        ResourceKind::Category,
        category,
        Language::Fr,
        json!({"name": "Facturation", "description": "Argent"}),
    );
    fake.seed_translation(
        ResourceKind::Article,
        article,
        Language::De,
        json!({"title": "Herunterladen", "description": "<p>Klicken</p>", "status": 1, "type": "odd"}),
    );
    (fake, category, folder, article)
}

#[test]
fn rebuilds_tree_with_translations() {
    let (fake, category, folder, article) = seeded();
    let config = HelpdeskConfig::new("key", "acme");
    let client = HelpdeskClient::connect(&fake, &config);
    let report = Hydrator::new(&client).hydrate("Help").unwrap();
    assert!(report.is_complete());
    let portal = report.portal;

    assert_eq!(portal.name, "Help");
    assert_eq!(portal.primary_language, Language::En);
    let ids = portal.category_ids();
    assert_eq!(ids.len(), 2);

    let billing = portal.category(ids[0]).unwrap();
    assert_eq!(billing.name, "Billing");
    assert_eq!(billing.meta.remote_id(), Some(RemoteId(category)));
    let fr = portal.category(billing.translations()[&Language::Fr]).unwrap();
    assert_eq!(fr.name, "Facturation");
    assert_eq!(fr.description.as_deref(), Some("Argent"));
    assert_eq!(billing.translations().len(), 1);

    let invoices = portal.folder(billing.folders()[0]).unwrap();
    assert_eq!(invoices.meta.remote_id(), Some(RemoteId(folder)));
    assert!(invoices.translations().is_empty());

    let download = portal.article(invoices.articles()[0]).unwrap();
    assert_eq!(download.meta.remote_id(), Some(RemoteId(article)));
    assert_eq!(download.description_text, "Click Download");
    let de = portal.article(download.translations()[&Language::De]).unwrap();
    assert_eq!(de.title, "Herunterladen");
    assert_eq!(de.status, Status::Draft);
    assert_eq!(de.article_type, ArticleType::Permanent);

    let shipping = portal.category(ids[1]).unwrap();
    assert!(shipping.folders().is_empty());
}

#[test]
fn translation_lookups_follow_supported_languages() {
    let (fake, ..) = seeded();
    let client = HelpdeskClient::connect(&fake, &HelpdeskConfig::default());
    fake.clear_calls();
    Hydrator::new(&client).hydrate("Help").unwrap();

    // fr + de for two categories, one folder and one article
    let translation_gets = fake
        .calls()
        .iter()
        .filter(|c| c.method == Method::Get && (c.endpoint.ends_with("/fr") || c.endpoint.ends_with("/de")))
        .count();
    assert_eq!(translation_gets, 8);
    // plus one folder list per category
    assert_eq!(fake.calls_to(Method::Get, "v2/solutions/categories/"), 6);
}

#[test]
fn category_subset_limits_the_walk() {
    let (fake, ..) = seeded();
    let client = HelpdeskClient::connect(&fake, &HelpdeskConfig::default());
    let portal = Hydrator::new(&client)
        .with_options(HydrateOptions::default().with_categories(vec![1]).with_verbosity(1))
        .hydrate("Help")
        .unwrap()
        .portal;
    assert_eq!(portal.stats().categories, 1);
    assert_eq!(portal.category(portal.category_ids()[0]).unwrap().name, "Shipping");
}

#[test]
fn missing_settings_fall_back_to_all_languages() {
    let fake = FakeHelpdesk::new();
    fake.seed_category("Only");
    let client = HelpdeskClient::connect(&fake, &HelpdeskConfig::default());
    assert_eq!(client.settings().translation_languages().len(), 5);
    let portal = Hydrator::new(&client).hydrate("Help").unwrap().portal;
    assert_eq!(portal.stats().translations, 0);
}

#[test]
fn failing_folder_list_skips_only_that_category() {
    let (fake, category, ..) = seeded();
    fake.fail(
        Method::Get,
        &format!("v2/solutions/categories/{category}/folders"),
        500,
        "boom",
    );
    let client = HelpdeskClient::connect(&fake, &HelpdeskConfig::default());
    let report = Hydrator::new(&client).hydrate("Help").unwrap();

    assert_eq!(report.issues.len(), 1);
    let issue = &report.issues[0];
    assert_eq!(issue.kind, ResourceKind::Category);
    assert_eq!(issue.remote_id, Some(RemoteId(category)));
    assert!(matches!(issue.error, HydrateError::Api(_)));

    let portal = report.portal;
    let ids = portal.category_ids();
    assert_eq!(ids.len(), 2);
    let billing = portal.category(ids[0]).unwrap();
    assert!(billing.folders().is_empty());
    // translations read before the failure are kept
    assert_eq!(billing.translations().len(), 1);
    assert_eq!(portal.category(ids[1]).unwrap().name, "Shipping");
}

#[test]
fn failing_translation_keeps_the_node_and_its_children() {
    let (fake, _, folder, _) = seeded();
    fake.fail(
        Method::Get,
        &format!("v2/solutions/folders/{folder}/fr"),
        503,
        "busy",
    );
    let client = HelpdeskClient::connect(&fake, &HelpdeskConfig::default());
    let report = Hydrator::new(&client).hydrate("Help").unwrap();

    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, ResourceKind::Folder);
    assert_eq!(report.portal.stats().articles, 1);
    assert_eq!(report.portal.stats().translations, 2);
}

#[test]
fn unreadable_category_list_is_an_error() {
    let (fake, ..) = seeded();
    fake.fail(Method::Get, "v2/solutions/categories*", 500, "boom");
    let client = HelpdeskClient::connect(&fake, &HelpdeskConfig::default());
    assert!(Hydrator::new(&client).hydrate("Help").is_err());
}

#[test]
fn null_translated_name_reads_as_empty() {
    let (fake, category, ..) = seeded();
    fake.seed_translation(ResourceKind::Category, category, Language::De, json!({"name": null}));
    let client = HelpdeskClient::connect(&fake, &HelpdeskConfig::default());
    let report = Hydrator::new(&client).hydrate("Help").unwrap();

    assert!(report.is_complete());
    let portal = report.portal;
    let billing = portal.category(portal.category_ids()[0]).unwrap();
    let de = portal.category(billing.translations()[&Language::De]).unwrap();
    assert_eq!(de.name, "");
    assert_eq!(billing.translations().len(), 2);
}
