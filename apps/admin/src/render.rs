//! Plain-text tables for the admin screens.

use client_core::{Notice, Resource};
use shared::domain::{Book, User};

/// A record that can be shown as one table row.
pub trait Tabular {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl Tabular for User {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Email"];

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.email.clone()]
    }
}

impl Tabular for Book {
    const HEADERS: &'static [&'static str] = &["ID", "Title", "Author", "ISBN"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.author.clone(),
            self.isbn.clone(),
        ]
    }
}

pub fn table<T: Tabular>(items: &[T]) -> String {
    let rows: Vec<Vec<String>> = items.iter().map(Tabular::cells).collect();
    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = T::HEADERS.iter().map(|h| h.to_string()).collect();
    let mut out = line(&header, &widths);
    out.push_str(&line(
        &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
        &widths,
    ));
    for row in &rows {
        out.push_str(&line(row, &widths));
    }
    out
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Text shown instead of a table when the snapshot is empty.
pub fn empty_listing<R: Resource>(query: &str) -> String {
    let hint = if query.is_empty() {
        ""
    } else {
        "Try a different search term or "
    };
    format!(
        "No {} found. {hint}Add a new {} to get started.",
        R::COLLECTION,
        R::SINGULAR
    )
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice {
            Notice::Success(message) => println!("{message}"),
            Notice::Failure(message) => eprintln!("{message}"),
        }
    }
}
