use super::*;
use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use server::AppState;
use server_api::ApiContext;
use shared::{
    domain::{BookDraft, BookId, UserDraft},
    resource::{Books, Users},
};
use storage::Storage;
use tokio::net::TcpListener;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_api() -> ClientConfig {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let app = server::build_router(
        Arc::new(AppState {
            api: ApiContext { storage },
        }),
        "/api",
    );
    let base = serve(app).await;
    ClientConfig::new(&format!("{base}/api")).expect("config")
}

fn gateway<R: Resource>(config: &ClientConfig) -> HttpGateway<R> {
    HttpGateway::new(config.http_client().expect("client"), config)
}

fn dune() -> BookDraft {
    BookDraft {
        title: "Dune".into(),
        author: "Herbert".into(),
        isbn: "9780441013593".into(),
        available: true,
    }
}

#[test]
fn urls_follow_collection_layout() {
    let config = ClientConfig::new("http://localhost:8000/api/").expect("config");
    let books = gateway::<Books>(&config);
    assert_eq!(books.collection_url(), "http://localhost:8000/api/books/");
    assert_eq!(
        books.member_url(BookId(3)),
        "http://localhost:8000/api/books/3/"
    );
}

#[tokio::test]
async fn create_list_update_delete_against_server() {
    let config = spawn_api().await;
    let books = gateway::<Books>(&config);

    let created = books.create(&dune()).await.expect("create");
    assert_eq!(created.title, "Dune");

    let listed = books.list(None).await.expect("list");
    assert_eq!(listed, vec![created.clone()]);

    let replacement = BookDraft {
        isbn: "1234567890123".into(),
        ..dune()
    };
    let updated = books
        .update(created.id, &replacement)
        .await
        .expect("update");
    assert_eq!(updated, Books::with_id(created.id, replacement));
    assert_eq!(books.get(created.id).await.expect("get"), updated);

    books.delete(created.id).await.expect("delete");
    assert!(books.list(None).await.expect("list").is_empty());
}

#[tokio::test]
async fn search_filter_is_sent_as_query_parameter() {
    let config = spawn_api().await;
    let users = gateway::<Users>(&config);
    for (name, email) in [("Ada Lovelace", "ada@example.org"), ("Bob", "bob@example.org")] {
        users
            .create(&UserDraft {
                name: name.into(),
                email: email.into(),
                is_librarian: false,
            })
            .await
            .expect("create");
    }

    let hits = users.list(Some("ada lovelace")).await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Ada Lovelace");

    assert_eq!(users.list(Some("")).await.expect("blank").len(), 2);
}

#[tokio::test]
async fn missing_ids_surface_server_message() {
    let config = spawn_api().await;
    let books = gateway::<Books>(&config);

    let err = books.update(BookId(99), &dune()).await.expect_err("missing");
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.server_message(), Some("Book not found"));

    let err = books.delete(BookId(99)).await.expect_err("missing");
    assert!(!err.is_validation());
}

#[tokio::test]
async fn validation_fails_before_any_request() {
    // Nothing listens here; a request would turn into a transport error.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let config = ClientConfig::new(&format!("http://{addr}/api")).expect("config");
    let books = gateway::<Books>(&config);
    let err = books
        .create(&BookDraft {
            title: "Dune".into(),
            ..BookDraft::default()
        })
        .await
        .expect_err("blank author");
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Author name cannot be empty!");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let config = ClientConfig::new(&format!("http://{addr}/api")).expect("config");
    let err = gateway::<Books>(&config)
        .list(None)
        .await
        .expect_err("refused");
    assert!(!err.is_validation());
    assert_eq!(err.status(), None);
    assert_eq!(err.server_message(), None);
}

#[tokio::test]
async fn error_field_is_accepted_as_server_message() {
    let app = Router::new().route(
        "/api/books/",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "error": "maintenance window" })),
            )
        }),
    );
    let base = serve(app).await;
    let config = ClientConfig::new(&format!("{base}/api")).expect("config");

    let err = gateway::<Books>(&config)
        .list(None)
        .await
        .expect_err("unavailable");
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.server_message(), Some("maintenance window"));
}

#[tokio::test]
async fn non_json_error_body_has_no_server_message() {
    let app = Router::new().route(
        "/api/users/",
        get(|| async { (StatusCode::BAD_GATEWAY, "upstream exploded") }),
    );
    let base = serve(app).await;
    let config = ClientConfig::new(&format!("{base}/api")).expect("config");

    let err = gateway::<Users>(&config)
        .list(None)
        .await
        .expect_err("bad gateway");
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.server_message(), None);
}

#[test]
fn server_message_prefers_message_over_error() {
    assert_eq!(
        server_message(r#"{"message":"a","error":"b"}"#).as_deref(),
        Some("a")
    );
    assert_eq!(server_message(r#"{"title":["required"]}"#), None);
    assert_eq!(server_message("<html>"), None);
}
