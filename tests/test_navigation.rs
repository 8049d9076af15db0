//! End-to-end routing: raw tokens in, screens and persisted state out.

use airdrop_hunter::catalog::sample_airdrops;
use airdrop_hunter::router::{ListSource, Notice};
use airdrop_hunter::state::json_store::JsonStoreOptions;
use airdrop_hunter::state::{InMemoryUserStore, JsonUserStore};
use airdrop_hunter::types::Frequency;
use airdrop_hunter::{
    AirdropRecord, AppConfig, CatalogStore, NavigationRouter, Token, Transition, UserIdentity,
    UserStateStore, ViewDescriptor,
};
use std::sync::Arc;
use tempfile::TempDir;

fn record(id: &str, status: &str) -> AirdropRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": format!("Title {}", id),
        "description": "test record",
        "status": status,
    }))
    .expect("valid record")
}

fn router_with(records: Vec<AirdropRecord>) -> (NavigationRouter, Arc<InMemoryUserStore>) {
    let users = Arc::new(InMemoryUserStore::new());
    let config = AppConfig::default();
    let router = NavigationRouter::new(
        Arc::new(CatalogStore::from_records(records)),
        users.clone(),
        &config,
    );
    (router, users)
}

fn user() -> UserIdentity {
    UserIdentity::sanitize("tester")
}

async fn view(router: &NavigationRouter, raw: &str) -> ViewDescriptor {
    router
        .handle(&user(), raw)
        .await
        .expect("routing should succeed")
        .view
        .expect("token should produce a view")
}

fn item_ids(view: &ViewDescriptor) -> Vec<String> {
    match view {
        ViewDescriptor::DropsList { items, .. } => items.iter().map(|r| r.id.clone()).collect(),
        other => panic!("expected a drops list, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_catalog_shows_empty_list() {
    let (router, _) = router_with(Vec::new());

    for (raw, source) in [
        ("all_drops_1", ListSource::All),
        ("hot_drops_1", ListSource::Hot),
        ("my_drops_1", ListSource::Mine),
    ] {
        assert_eq!(view(&router, raw).await, ViewDescriptor::EmptyList { source });
    }
}

#[tokio::test]
async fn test_hot_list_single_page() {
    let records = vec![
        record("a", "active"),
        record("b", "hot"),
        record("c", "ending_soon"),
        record("d", "hot"),
    ];
    let (router, _) = router_with(records);

    let hot = view(&router, "hot_drops_1").await;
    assert_eq!(item_ids(&hot), vec!["b", "d"]);
    match &hot {
        ViewDescriptor::DropsList { page_info, .. } => {
            assert_eq!(page_info.current_page, 1);
            assert_eq!(page_info.total_pages, 1);
            assert!(!page_info.has_prev);
            assert!(!page_info.has_next);
        }
        other => panic!("expected a drops list, got {:?}", other),
    }
    assert_eq!(hot.page_tokens(), (None, None));
}

#[tokio::test]
async fn test_all_list_pages_and_clamps() {
    let records: Vec<_> = (1..=12).map(|i| record(&format!("r{:02}", i), "active")).collect();
    let (router, _) = router_with(records);

    let second = view(&router, "all_drops_2").await;
    assert_eq!(item_ids(&second), vec!["r06", "r07", "r08", "r09", "r10"]);
    assert_eq!(
        second.page_tokens(),
        (
            Some(Token::List { source: ListSource::All, page: 1 }),
            Some(Token::List { source: ListSource::All, page: 3 }),
        )
    );

    let past_end = view(&router, "all_drops_99").await;
    assert_eq!(item_ids(&past_end), vec!["r11", "r12"]);

    let before_start = view(&router, "all_drops_-4").await;
    assert_eq!(item_ids(&before_start), vec!["r01", "r02", "r03", "r04", "r05"]);

    let back = view(&router, "back_to_drops_3").await;
    assert_eq!(back, past_end);
}

#[tokio::test]
async fn test_wishlist_add_returns_to_detail() {
    let (router, users) = router_with(sample_airdrops());

    let transition = router.handle(&user(), "wishlist_airdrop_002").await.unwrap();
    match transition.view {
        Some(ViewDescriptor::AirdropDetail {
            record,
            is_wishlisted,
            ..
        }) => {
            assert_eq!(record.id, "airdrop_002");
            assert!(is_wishlisted);
        }
        other => panic!("expected the detail view, got {:?}", other),
    }
    assert_eq!(
        transition.notice,
        Some(Notice::AddedToWishlist {
            title: "Arbitrum ARB Tokens".to_string()
        })
    );

    // Adding again leaves a single entry
    router.handle(&user(), "wishlist_airdrop_002").await.unwrap();
    assert_eq!(users.load_wishlist(&user()).await.ids(), ["airdrop_002".to_string()]);

    let transition = router.handle(&user(), "remove_wishlist_airdrop_002").await.unwrap();
    match transition.view {
        Some(ViewDescriptor::AirdropDetail { is_wishlisted, .. }) => assert!(!is_wishlisted),
        other => panic!("expected the detail view, got {:?}", other),
    }
    assert!(users.load_wishlist(&user()).await.is_empty());
}

#[tokio::test]
async fn test_unknown_airdrop_changes_nothing() {
    let (router, users) = router_with(sample_airdrops());

    assert_eq!(view(&router, "airdrop_doesnotexist").await, ViewDescriptor::NotFound);

    for raw in [
        "wishlist_doesnotexist",
        "remove_wishlist_doesnotexist",
        "remind_doesnotexist",
        "set_reminder_doesnotexist_1_hour",
    ] {
        let transition = router.handle(&user(), raw).await.unwrap();
        assert_eq!(transition, Transition::notice(Notice::NotFound), "{}", raw);
    }

    assert!(users.load_wishlist(&user()).await.is_empty());
    assert!(users.load_reminders(&user()).await.is_empty());
}

#[tokio::test]
async fn test_my_drops_follow_wishlist_order() {
    let records = vec![record("a", "active"), record("b", "hot"), record("c", "expired")];
    let (router, users) = router_with(records);

    for id in ["c", "gone", "a"] {
        users.add_to_wishlist(&user(), id).await.unwrap();
    }

    // Stale ids are skipped in the view but stay in the wishlist
    let mine = view(&router, "my_drops_1").await;
    assert_eq!(item_ids(&mine), vec!["c", "a"]);
    assert_eq!(users.load_wishlist(&user()).await.len(), 3);

    users.remove_from_wishlist(&user(), "c").await.unwrap();
    users.remove_from_wishlist(&user(), "a").await.unwrap();
    assert_eq!(
        view(&router, "my_drops_1").await,
        ViewDescriptor::EmptyList {
            source: ListSource::Mine
        }
    );
}

#[tokio::test]
async fn test_reminder_flow() {
    let (router, users) = router_with(sample_airdrops());

    match view(&router, "remind_airdrop_001").await {
        ViewDescriptor::ReminderOptions { record, options } => {
            assert_eq!(record.id, "airdrop_001");
            assert_eq!(options.len(), 6);
            assert_eq!(options[1].token_label(), "1_hour");
        }
        other => panic!("expected reminder options, got {:?}", other),
    }

    let transition = router
        .handle(&user(), "set_reminder_airdrop_001_1_hour")
        .await
        .unwrap();
    assert!(matches!(
        transition.view,
        Some(ViewDescriptor::AirdropDetail { .. })
    ));
    assert_eq!(
        transition.notice,
        Some(Notice::ReminderSet {
            title: "MetaMask Airdrop".to_string(),
            remind_time: "1 hour".to_string(),
        })
    );

    let log = users.load_reminders(&user()).await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].airdrop_id, "airdrop_001");
    assert_eq!(log[0].remind_time, "1 hour");
    assert_eq!(log[0].frequency, Frequency::Once);
}

#[tokio::test]
async fn test_reminders_show_latest_window() {
    let (router, users) = router_with(sample_airdrops());

    for i in 0..12 {
        let id = match i {
            10 => "removed_airdrop",
            i if i % 2 == 0 => "airdrop_001",
            _ => "airdrop_002",
        };
        users
            .append_reminder(&user(), id, &format!("{} days", i), Frequency::Once)
            .await
            .unwrap();
    }

    match view(&router, "reminders").await {
        ViewDescriptor::RemindersList {
            entries,
            total_logged,
        } => {
            assert_eq!(total_logged, 12);
            let labels: Vec<_> = entries
                .iter()
                .map(|line| line.entry.remind_time.as_str())
                .collect();
            assert_eq!(
                labels,
                vec![
                    "2 days", "3 days", "4 days", "5 days", "6 days", "7 days", "8 days",
                    "9 days", "11 days",
                ]
            );
            assert_eq!(entries[0].title, "MetaMask Airdrop");
            assert_eq!(entries[1].title, "Arbitrum ARB Tokens");
        }
        other => panic!("expected the reminders list, got {:?}", other),
    }

    assert_eq!(users.load_reminders(&user()).await.len(), 12);
}

#[tokio::test]
async fn test_static_tokens() {
    let (router, _) = router_with(sample_airdrops());

    assert_eq!(view(&router, "help").await, ViewDescriptor::Help);
    assert_eq!(view(&router, "refresh").await, ViewDescriptor::MainMenu);
    assert_eq!(view(&router, "back_to_main").await, ViewDescriptor::MainMenu);
    assert_eq!(
        view(&router, "reminders").await,
        ViewDescriptor::RemindersList {
            entries: Vec::new(),
            total_logged: 0
        }
    );
}

#[tokio::test]
async fn test_malformed_tokens_leave_screen_unchanged() {
    let (router, users) = router_with(sample_airdrops());

    for raw in ["", "bogus", "all_drops_", "all_drops_x", "wishlist_", "set_reminder_"] {
        assert!(router.handle(&user(), raw).await.is_err(), "{}", raw);
        assert_eq!(router.dispatch(&user(), raw).await, Transition::unchanged(), "{}", raw);
    }
    assert!(users.load_wishlist(&user()).await.is_empty());
}

#[tokio::test]
async fn test_storage_failure_shows_error_screen() {
    let dir = TempDir::new().unwrap();
    let users = Arc::new(
        JsonUserStore::new(
            dir.path().join("UserDrops"),
            dir.path().join("Reminders"),
            JsonStoreOptions::default(),
        )
        .await
        .unwrap(),
    );
    let user = user();
    tokio::fs::write(users.wishlist_path(&user), b"{ not json")
        .await
        .unwrap();

    let router = NavigationRouter::new(
        Arc::new(CatalogStore::from_records(sample_airdrops())),
        users.clone(),
        &AppConfig::default(),
    );

    let transition = router.dispatch(&user, "wishlist_airdrop_001").await;
    assert_eq!(
        transition,
        Transition::with_notice(ViewDescriptor::ErrorGeneric, Notice::Failed)
    );

    let on_disk = tokio::fs::read(users.wishlist_path(&user)).await.unwrap();
    assert_eq!(on_disk, b"{ not json");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_users_are_isolated() {
    let (router, users) = router_with(sample_airdrops());
    let router = Arc::new(router);

    let mut handles = Vec::new();
    for i in 0..10 {
        let router = Arc::clone(&router);
        handles.push(tokio::spawn(async move {
            let user = UserIdentity::sanitize(&format!("user{}", i));
            let target = if i % 2 == 0 { "airdrop_001" } else { "airdrop_002" };
            router.dispatch(&user, &format!("wishlist_{}", target)).await;
            router.dispatch(&user, &format!("set_reminder_{}_1_day", target)).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for i in 0..10 {
        let user = UserIdentity::sanitize(&format!("user{}", i));
        let expected = if i % 2 == 0 { "airdrop_001" } else { "airdrop_002" };
        assert_eq!(users.load_wishlist(&user).await.ids(), [expected.to_string()]);
        assert_eq!(users.load_reminders(&user).await.len(), 1);
    }
}
