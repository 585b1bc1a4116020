//! Capability set shared by the two managed resources.
//!
//! A [`Resource`] names a record shape, the draft that carries its working
//! values, the REST collection it lives under, the fields the server searches,
//! and the rule deciding whether a draft may be submitted. Client screens and
//! server handlers are both written once against this trait.

use std::{fmt, hash::Hash};

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    domain::{Book, BookDraft, BookId, User, UserDraft, UserId},
    error::{require_non_empty, ValidationError},
    isbn::generate_random_isbn,
};

pub trait Resource: Send + Sync + 'static {
    type Id: Copy
        + Eq
        + Hash
        + fmt::Debug
        + fmt::Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;
    type Item: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Draft: Clone
        + fmt::Debug
        + Default
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Lowercase singular noun, used in log fields and messages.
    const SINGULAR: &'static str;
    /// Capitalized singular noun, used at the start of notices.
    const LABEL: &'static str;
    /// Collection segment, e.g. `users` for `/users/`.
    const COLLECTION: &'static str;
    /// Text fields the server matches a search term against.
    const SEARCH_FIELDS: &'static [&'static str];

    fn id(item: &Self::Item) -> Self::Id;

    /// Editable fields of an existing record, used to seed the edit form.
    fn draft_of(item: &Self::Item) -> Self::Draft;

    fn with_id(id: Self::Id, draft: Self::Draft) -> Self::Item;

    fn validate(draft: &Self::Draft) -> Result<(), ValidationError>;

    /// Turns working values into the payload actually submitted.
    fn prepare(draft: Self::Draft) -> Self::Draft {
        draft
    }
}

pub struct Users;

impl Resource for Users {
    type Id = UserId;
    type Item = User;
    type Draft = UserDraft;

    const SINGULAR: &'static str = "user";
    const LABEL: &'static str = "User";
    const COLLECTION: &'static str = "users";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email"];

    fn id(item: &User) -> UserId {
        item.id
    }

    fn draft_of(item: &User) -> UserDraft {
        UserDraft {
            name: item.name.clone(),
            email: item.email.clone(),
            is_librarian: item.is_librarian,
        }
    }

    fn with_id(id: UserId, draft: UserDraft) -> User {
        User {
            id,
            name: draft.name,
            email: draft.email,
            is_librarian: draft.is_librarian,
        }
    }

    fn validate(draft: &UserDraft) -> Result<(), ValidationError> {
        require_non_empty(&draft.name, "name", "User name")?;
        require_non_empty(&draft.email, "email", "Email")
    }

    // The admin screens never grant librarian rights.
    fn prepare(draft: UserDraft) -> UserDraft {
        UserDraft {
            is_librarian: false,
            ..draft
        }
    }
}

pub struct Books;

impl Resource for Books {
    type Id = BookId;
    type Item = Book;
    type Draft = BookDraft;

    const SINGULAR: &'static str = "book";
    const LABEL: &'static str = "Book";
    const COLLECTION: &'static str = "books";
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "author", "isbn"];

    fn id(item: &Book) -> BookId {
        item.id
    }

    fn draft_of(item: &Book) -> BookDraft {
        BookDraft {
            title: item.title.clone(),
            author: item.author.clone(),
            isbn: item.isbn.clone(),
            available: item.available,
        }
    }

    fn with_id(id: BookId, draft: BookDraft) -> Book {
        Book {
            id,
            title: draft.title,
            author: draft.author,
            isbn: draft.isbn,
            available: draft.available,
        }
    }

    fn validate(draft: &BookDraft) -> Result<(), ValidationError> {
        require_non_empty(&draft.title, "title", "Book title")?;
        require_non_empty(&draft.author, "author", "Author name")
    }

    fn prepare(draft: BookDraft) -> BookDraft {
        let isbn = if draft.isbn.trim().is_empty() {
            generate_random_isbn()
        } else {
            draft.isbn
        };
        BookDraft {
            isbn,
            available: true,
            ..draft
        }
    }
}

#[cfg(test)]
#[path = "tests/resource_tests.rs"]
mod tests;
