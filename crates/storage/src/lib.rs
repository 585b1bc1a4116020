use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{
    domain::{Book, BookDraft, BookId, User, UserDraft, UserId},
    resource::{Books, Resource, Users},
};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// Persistence for one resource collection.
///
/// `list` matches `term` case-insensitively as a substring of any of the
/// resource's search fields and returns rows ordered by id.
#[async_trait]
pub trait ResourceStorage<R: Resource>: Send + Sync {
    async fn list(&self, term: Option<&str>) -> Result<Vec<R::Item>>;
    async fn get(&self, id: R::Id) -> Result<Option<R::Item>>;
    async fn insert(&self, draft: &R::Draft) -> Result<R::Item>;
    /// Replaces every non-id field. `None` when `id` does not exist.
    async fn replace(&self, id: R::Id, draft: &R::Draft) -> Result<Option<R::Item>>;
    /// `false` when `id` does not exist.
    async fn remove(&self, id: R::Id) -> Result<bool>;
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool_options = if database_url.starts_with("sqlite::memory:") {
            // The database lives only as long as its single connection.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_users(&self, term: Option<&str>) -> Result<Vec<User>> {
        let rows = match term {
            Some(term) => {
                let sql = filtered_select::<Users>(USER_COLUMNS, "users");
                sqlx::query(&sql)
                    .bind(term)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT id, name, email, is_librarian FROM users ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(user_from_row).collect()
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, is_librarian FROM users WHERE id = ?")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn create_user(&self, draft: &UserDraft) -> Result<User> {
        let row = sqlx::query(
            "INSERT INTO users (name, email, is_librarian) VALUES (?, ?, ?)
             RETURNING id, name, email, is_librarian",
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(draft.is_librarian)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert user")?;
        user_from_row(&row)
    }

    pub async fn update_user(&self, user_id: UserId, draft: &UserDraft) -> Result<Option<User>> {
        let row = sqlx::query(
            "UPDATE users SET name = ?, email = ?, is_librarian = ? WHERE id = ?
             RETURNING id, name, email, is_librarian",
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(draft.is_librarian)
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update user {user_id}"))?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn delete_user(&self, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_books(&self, term: Option<&str>) -> Result<Vec<Book>> {
        let rows = match term {
            Some(term) => {
                let sql = filtered_select::<Books>(BOOK_COLUMNS, "books");
                sqlx::query(&sql)
                    .bind(term)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT id, title, author, isbn, available FROM books ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(book_from_row).collect()
    }

    pub async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT id, title, author, isbn, available FROM books WHERE id = ?")
            .bind(book_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(book_from_row).transpose()
    }

    pub async fn create_book(&self, draft: &BookDraft) -> Result<Book> {
        let row = sqlx::query(
            "INSERT INTO books (title, author, isbn, available) VALUES (?, ?, ?, ?)
             RETURNING id, title, author, isbn, available",
        )
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(&draft.isbn)
        .bind(draft.available)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert book")?;
        book_from_row(&row)
    }

    pub async fn update_book(&self, book_id: BookId, draft: &BookDraft) -> Result<Option<Book>> {
        let row = sqlx::query(
            "UPDATE books SET title = ?, author = ?, isbn = ?, available = ? WHERE id = ?
             RETURNING id, title, author, isbn, available",
        )
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(&draft.isbn)
        .bind(draft.available)
        .bind(book_id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update book {book_id}"))?;
        row.as_ref().map(book_from_row).transpose()
    }

    pub async fn delete_book(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(book_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const USER_COLUMNS: &str = "id, name, email, is_librarian";
const BOOK_COLUMNS: &str = "id, title, author, isbn, available";

/// `SELECT` over `table` keeping rows where any of `R::SEARCH_FIELDS` contains
/// the bound term `?1`, ignoring case.
fn filtered_select<R: Resource>(columns: &str, table: &str) -> String {
    let matches: Vec<String> = R::SEARCH_FIELDS
        .iter()
        .map(|field| format!("instr(lower({field}), lower(?1)) > 0"))
        .collect();
    format!(
        "SELECT {columns} FROM {table} WHERE {} ORDER BY id",
        matches.join(" OR ")
    )
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: UserId(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        is_librarian: row.try_get("is_librarian")?,
    })
}

fn book_from_row(row: &SqliteRow) -> Result<Book> {
    Ok(Book {
        id: BookId(row.try_get("id")?),
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        isbn: row.try_get("isbn")?,
        available: row.try_get("available")?,
    })
}

#[async_trait]
impl ResourceStorage<Users> for Storage {
    async fn list(&self, term: Option<&str>) -> Result<Vec<User>> {
        self.list_users(term).await
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        self.get_user(id).await
    }

    async fn insert(&self, draft: &UserDraft) -> Result<User> {
        self.create_user(draft).await
    }

    async fn replace(&self, id: UserId, draft: &UserDraft) -> Result<Option<User>> {
        self.update_user(id, draft).await
    }

    async fn remove(&self, id: UserId) -> Result<bool> {
        self.delete_user(id).await
    }
}

#[async_trait]
impl ResourceStorage<Books> for Storage {
    async fn list(&self, term: Option<&str>) -> Result<Vec<Book>> {
        self.list_books(term).await
    }

    async fn get(&self, id: BookId) -> Result<Option<Book>> {
        self.get_book(id).await
    }

    async fn insert(&self, draft: &BookDraft) -> Result<Book> {
        self.create_book(draft).await
    }

    async fn replace(&self, id: BookId, draft: &BookDraft) -> Result<Option<Book>> {
        self.update_book(id, draft).await
    }

    async fn remove(&self, id: BookId) -> Result<bool> {
        self.delete_book(id).await
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
