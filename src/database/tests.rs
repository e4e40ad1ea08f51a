use tempfile::TempDir;

use super::*;

async fn create_test_database() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let url = format!("sqlite://{}/test.db", temp_dir.path().display());
    let database = Database::new(&url).await.expect("can create database");
    (database, temp_dir)
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let (database, _dir) = create_test_database().await;
    database
        .run_migrations()
        .await
        .expect("second run is a no-op");
}

#[tokio::test]
async fn insert_article_assigns_sequential_ids() {
    let (database, _dir) = create_test_database().await;

    let first = database
        .insert_article(NewArticle {
            title: "First".to_string(),
            content: "First content".to_string(),
        })
        .await
        .expect("can insert");
    let second = database
        .insert_article(NewArticle {
            title: "Second".to_string(),
            content: "Second content".to_string(),
        })
        .await
        .expect("can insert");

    assert_eq!(second.id, first.id + 1);
    assert_eq!(first.title, "First");
    assert_eq!(database.count_articles().await.expect("can count"), 2);
}

#[tokio::test]
async fn interaction_log_is_append_only_and_ordered() {
    let (database, _dir) = create_test_database().await;

    for i in 1..=3 {
        database
            .append_interaction(NewInteraction {
                session_id: "s1".to_string(),
                user_query: format!("q{i}"),
                llm_response: format!("a{i}"),
                response_time_ms: i * 10,
            })
            .await
            .expect("can append");
    }
    database
        .append_interaction(NewInteraction {
            session_id: "s2".to_string(),
            user_query: "other".to_string(),
            llm_response: "other".to_string(),
            response_time_ms: 1,
        })
        .await
        .expect("can append");

    let history = database.get_history("s1").await.expect("can fetch");
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].user_query, "q1");
    assert_eq!(history[2].user_query, "q3");
    assert_eq!(history[1].response_time_ms, 20);
}

#[tokio::test]
async fn delete_history_only_touches_one_session() {
    let (database, _dir) = create_test_database().await;

    for session in ["s1", "s1", "s2"] {
        database
            .append_interaction(NewInteraction {
                session_id: session.to_string(),
                user_query: "q".to_string(),
                llm_response: "a".to_string(),
                response_time_ms: 5,
            })
            .await
            .expect("can append");
    }

    let deleted = database.delete_history("s1").await.expect("can delete");
    assert_eq!(deleted, 2);
    assert!(database.get_history("s1").await.expect("can fetch").is_empty());
    assert_eq!(database.get_history("s2").await.expect("can fetch").len(), 1);
}

#[tokio::test]
async fn history_for_unknown_session_is_empty() {
    let (database, _dir) = create_test_database().await;
    assert!(
        database
            .get_history("nope")
            .await
            .expect("can fetch")
            .is_empty()
    );
}
