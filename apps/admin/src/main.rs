use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AdminConsole, Books, ClientConfig, CrudGateway, Resource, ResourceScreen, Users,
    DEFAULT_API_URL,
};
use shared::domain::{BookDraft, BookId, UserDraft, UserId};
use tracing_subscriber::EnvFilter;

mod render;

use render::{empty_listing, print_notices, table, Tabular};

#[derive(Parser, Debug)]
#[command(name = "bookhub-admin", about = "Administer library users and the book catalog")]
struct Args {
    /// Root of the REST API; collections live at `<api-url>/users/` and `<api-url>/books/`.
    #[arg(long, env = "BOOKHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Landing page with both screens and their sizes.
    Home,
    /// User management.
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Catalog management.
    Books {
        #[command(subcommand)]
        action: BookAction,
    },
}

#[derive(Subcommand, Debug)]
enum UserAction {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: i64,
    },
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum BookAction {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: i64,
    },
    Add {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        author: String,
        /// Thirteen random digits are used when left empty.
        #[arg(long, default_value = "")]
        isbn: String,
    },
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        isbn: Option<String>,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

/// One screen action, independent of the resource it targets.
enum Intent<R: Resource> {
    List(Option<String>),
    Show(R::Id),
    Add(R::Draft),
    Edit(R::Id, Box<dyn FnOnce(&mut R::Draft)>),
    Delete { id: R::Id, yes: bool },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut config = ClientConfig::new(&args.api_url)?;
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let mut console = AdminConsole::connect(&config).context("failed to set up HTTP client")?;

    let ok = match args.command.unwrap_or(Command::Home) {
        Command::Home => home(&mut console).await,
        Command::Users { action } => run(&mut console.users, user_intent(action)).await,
        Command::Books { action } => run(&mut console.catalog, book_intent(action)).await,
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn user_intent(action: UserAction) -> Intent<Users> {
    match action {
        UserAction::List { search } => Intent::List(search),
        UserAction::Show { id } => Intent::Show(UserId(id)),
        UserAction::Add { name, email } => Intent::Add(UserDraft {
            name,
            email,
            is_librarian: false,
        }),
        UserAction::Edit { id, name, email } => Intent::Edit(
            UserId(id),
            Box::new(move |draft: &mut UserDraft| {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(email) = email {
                    draft.email = email;
                }
            }),
        ),
        UserAction::Delete { id, yes } => Intent::Delete {
            id: UserId(id),
            yes,
        },
    }
}

fn book_intent(action: BookAction) -> Intent<Books> {
    match action {
        BookAction::List { search } => Intent::List(search),
        BookAction::Show { id } => Intent::Show(BookId(id)),
        BookAction::Add {
            title,
            author,
            isbn,
        } => Intent::Add(BookDraft {
            title,
            author,
            isbn,
            available: true,
        }),
        BookAction::Edit {
            id,
            title,
            author,
            isbn,
        } => Intent::Edit(
            BookId(id),
            Box::new(move |draft: &mut BookDraft| {
                if let Some(title) = title {
                    draft.title = title;
                }
                if let Some(author) = author {
                    draft.author = author;
                }
                if let Some(isbn) = isbn {
                    draft.isbn = isbn;
                }
            }),
        ),
        BookAction::Delete { id, yes } => Intent::Delete {
            id: BookId(id),
            yes,
        },
    }
}

async fn home(console: &mut AdminConsole) -> bool {
    println!("Book Hub");
    println!();
    let users = console.users.mount().await.is_ok();
    let books = console.catalog.mount().await.is_ok();
    print_notices(&console.users.take_notices());
    print_notices(&console.catalog.take_notices());

    println!(
        "  users  User Management     {} registered",
        count(users, console.users.items().len())
    );
    println!(
        "  books  Catalog Management  {} in catalog",
        count(books, console.catalog.items().len())
    );
    users && books
}

fn count(loaded: bool, len: usize) -> String {
    if loaded {
        len.to_string()
    } else {
        "?".to_string()
    }
}

/// Mounts the screen, performs `intent`, then prints notices and the
/// resulting listing. `false` when the action failed and was reported.
async fn run<R, G>(screen: &mut ResourceScreen<R, G>, intent: Intent<R>) -> bool
where
    R: Resource,
    R::Item: Tabular,
    G: CrudGateway<R>,
{
    if let Intent::Show(id) = intent {
        return match screen.gateway().get(id).await {
            Ok(item) => {
                print!("{}", table(std::slice::from_ref(&item)));
                true
            }
            Err(err) => {
                eprintln!("{}", err.server_message().unwrap_or(&err.to_string()));
                false
            }
        };
    }

    if screen.mount().await.is_err() {
        print_notices(&screen.take_notices());
        return false;
    }

    let ok = match intent {
        Intent::List(None) | Intent::Show(_) => true,
        Intent::List(Some(query)) => screen.search(query).await.is_ok(),
        Intent::Add(draft) => {
            *screen.working_mut() = draft;
            screen.submit().await.is_ok()
        }
        Intent::Edit(id, overlay) => {
            if !screen.begin_edit(id) {
                eprintln!("No {} with id {id} is listed.", R::SINGULAR);
                return false;
            }
            overlay(screen.working_mut());
            screen.submit().await.is_ok()
        }
        Intent::Delete { id, yes } => {
            match screen.delete(id, |prompt| yes || ask(prompt)).await {
                Ok(true) => true,
                Ok(false) => {
                    println!("Delete cancelled.");
                    true
                }
                Err(_) => false,
            }
        }
    };

    print_notices(&screen.take_notices());
    if screen.items().is_empty() {
        println!("{}", empty_listing::<R>(screen.query()));
    } else {
        print!("{}", table(screen.items()));
    }
    ok
}

/// y/N prompt on the terminal; anything but `y`/`yes` declines.
fn ask(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
