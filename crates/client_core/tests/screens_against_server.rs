use std::sync::Arc;

use client_core::{AdminConsole, ClientConfig, EditMode, Notice, ScreenStatus};
use server::AppState;
use server_api::ApiContext;
use shared::{
    domain::{BookDraft, UserDraft},
    isbn::is_isbn13_digits,
};
use storage::Storage;
use tokio::net::TcpListener;

async fn console() -> AdminConsole {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let app = server::build_router(
        Arc::new(AppState {
            api: ApiContext { storage },
        }),
        "/api",
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let config = ClientConfig::new(&format!("http://{addr}/api")).expect("config");
    let mut console = AdminConsole::connect(&config).expect("console");
    console.users.mount().await.expect("mount users");
    console.catalog.mount().await.expect("mount catalog");
    console
}

#[tokio::test]
async fn catalog_lifecycle_matches_server_state() {
    let mut console = console().await;
    let catalog = &mut console.catalog;
    assert!(catalog.items().is_empty());

    *catalog.working_mut() = BookDraft {
        title: "Dune".into(),
        author: "Herbert".into(),
        isbn: String::new(),
        available: true,
    };
    let created = catalog.submit().await.expect("create").item().clone();
    assert_eq!(catalog.items().len(), 1);
    let listed = &catalog.items()[0];
    assert_eq!(listed.id, created.id);
    assert!(is_isbn13_digits(&listed.isbn));
    assert!(listed.available);

    assert!(catalog.begin_edit(created.id));
    assert!(matches!(catalog.mode(), EditMode::Editing(_)));
    catalog.working_mut().isbn = "1234567890123".into();
    catalog.submit().await.expect("update");
    let listed = catalog.store().find(created.id).expect("still listed");
    assert_eq!(listed.isbn, "1234567890123");
    assert_eq!(listed.title, "Dune");
    assert_eq!(listed.author, "Herbert");

    assert!(catalog.delete(created.id, |_| true).await.expect("delete"));
    assert!(!catalog.store().contains(created.id));
    assert_eq!(catalog.status(), &ScreenStatus::Idle);

    let messages: Vec<_> = catalog
        .take_notices()
        .iter()
        .map(|notice| notice.message().to_string())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Book added successfully!",
            "Book updated successfully!",
            "Book deleted successfully!",
        ]
    );
}

#[tokio::test]
async fn deleted_item_vanishing_server_side_is_reported() {
    let mut console = console().await;
    *console.users.working_mut() = UserDraft {
        name: "Ada".into(),
        email: "ada@example.org".into(),
        is_librarian: false,
    };
    let created = console.users.submit().await.expect("create").item().clone();
    console.users.take_notices();

    console
        .users
        .delete(created.id, |_| true)
        .await
        .expect("first delete");
    console.users.take_notices();

    console
        .users
        .delete(created.id, |_| true)
        .await
        .expect_err("already gone");
    assert_eq!(
        console.users.take_notices(),
        vec![Notice::Failure("User not found".into())]
    );
}

#[tokio::test]
async fn screens_are_independent() {
    let mut console = console().await;
    *console.users.working_mut() = UserDraft {
        name: "Ada".into(),
        email: "ada@example.org".into(),
        is_librarian: false,
    };
    console.users.submit().await.expect("create user");
    console.catalog.search("dune").await.expect("search");

    assert_eq!(console.users.items().len(), 1);
    assert!(console.catalog.items().is_empty());
    assert_eq!(console.users.query(), "");
    assert_eq!(console.catalog.query(), "dune");
}

#[tokio::test]
async fn search_then_clear_matches_initial_listing() {
    let mut console = console().await;
    for (title, author) in [("Dune", "Herbert"), ("Emma", "Austen")] {
        *console.catalog.working_mut() = BookDraft {
            title: title.into(),
            author: author.into(),
            isbn: String::new(),
            available: true,
        };
        console.catalog.submit().await.expect("create");
    }
    console.catalog.relist().await.expect("relist");
    let initial = console.catalog.items().to_vec();

    console.catalog.search("emma").await.expect("search");
    assert_eq!(console.catalog.items().len(), 1);
    console.catalog.clear_search().await.expect("clear");
    assert_eq!(console.catalog.items(), initial.as_slice());
}
