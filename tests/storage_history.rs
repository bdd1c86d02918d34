//! Persistence tests against an on-disk database.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use eco_web_analyzer::analysis::Analyzer;
use eco_web_analyzer::narrative::TemplateNarrator;
use eco_web_analyzer::provider::HeuristicProvider;
use eco_web_analyzer::storage::{
    init_db_pool_with_path, run_migrations, AnalysisStore, SqliteAnalysisStore,
};

async fn file_store(db_path: &std::path::Path) -> Arc<SqliteAnalysisStore> {
    let pool = init_db_pool_with_path(db_path)
        .await
        .expect("Failed to open database");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Arc::new(SqliteAnalysisStore::new(pool))
}

fn analyzer(store: Arc<SqliteAnalysisStore>) -> Analyzer {
    Analyzer::new(
        Arc::new(HeuristicProvider::offline()),
        Arc::new(TemplateNarrator),
        store,
        50,
    )
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("history.db");

    {
        let analyzer = analyzer(file_store(&db_path).await);
        for site in ["a.example", "b.example", "c.example"] {
            let report = analyzer
                .analyze(site, Some("alice".into()), &CancellationToken::new())
                .await
                .unwrap();
            assert!(report.saved);
        }
    }

    // Migrations are idempotent on an existing file.
    let store = file_store(&db_path).await;
    let mine = store.recent_for_owner("alice", 10).await.unwrap();
    let urls: Vec<&str> = mine.iter().map(|s| s.result.url()).collect();
    assert_eq!(
        urls,
        vec!["https://c.example/", "https://b.example/", "https://a.example/"]
    );
    assert!(mine.windows(2).all(|w| w[0].created_at_ms >= w[1].created_at_ms));
}

#[tokio::test]
async fn test_owner_history_is_isolated_and_limited() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir.path().join("owners.db")).await;
    let analyzer = analyzer(store.clone());
    let cancel = CancellationToken::new();

    for i in 0..12 {
        analyzer
            .analyze(&format!("site{i}.example"), Some("alice".into()), &cancel)
            .await
            .unwrap();
    }
    analyzer
        .analyze("bob.example", Some("bob".into()), &cancel)
        .await
        .unwrap();
    analyzer.analyze("anon.example", None, &cancel).await.unwrap();

    let alice = store.recent_for_owner("alice", 10).await.unwrap();
    assert_eq!(alice.len(), 10);
    assert_eq!(alice[0].result.url(), "https://site11.example/");
    assert!(alice.iter().all(|s| s.result.owner_id() == Some("alice")));

    let bob = store.recent_for_owner("bob", 10).await.unwrap();
    assert_eq!(bob.len(), 1);

    let global = store.recent_global(5).await.unwrap();
    assert_eq!(global.len(), 5);
    assert_eq!(global[0].result.url(), "https://anon.example/");
    assert_eq!(global[0].result.owner_id(), None);
}

#[tokio::test]
async fn test_warm_cache_from_existing_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("warm.db");
    {
        let analyzer = analyzer(file_store(&db_path).await);
        for site in ["one.example", "two.example"] {
            analyzer
                .analyze(site, None, &CancellationToken::new())
                .await
                .unwrap();
        }
    }

    let analyzer = analyzer(file_store(&db_path).await);
    assert_eq!(analyzer.warm_cache().await.unwrap(), 2);
    let recent = analyzer.cache().recent(2).unwrap();
    assert_eq!(recent[0].result.url(), "https://two.example/");
}
