use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::{
    domain::{BookDraft, UserDraft},
    resource::{Books, Resource, Users},
};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/bookhub.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateUser {
        name: String,
        email: String,
        #[arg(long)]
        librarian: bool,
    },
    CreateBook {
        title: String,
        author: String,
        #[arg(long, default_value = "")]
        isbn: String,
    },
    ListBooks {
        #[arg(long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateUser {
            name,
            email,
            librarian,
        } => {
            // Operators may seed librarians; the admin UI never can.
            let draft = UserDraft {
                name,
                email,
                is_librarian: librarian,
            };
            Users::validate(&draft)?;
            let user = storage.create_user(&draft).await?;
            println!("created user_id={} librarian={}", user.id, user.is_librarian);
        }
        Command::CreateBook {
            title,
            author,
            isbn,
        } => {
            let draft = Books::prepare(BookDraft {
                title,
                author,
                isbn,
                available: true,
            });
            Books::validate(&draft)?;
            let book = storage.create_book(&draft).await?;
            println!("created book_id={} isbn={}", book.id, book.isbn);
        }
        Command::ListBooks { search } => {
            let term = search.as_deref().map(str::trim).filter(|t| !t.is_empty());
            for book in storage.list_books(term).await? {
                println!("{}\t{}\t{}\t{}", book.id, book.isbn, book.title, book.author);
            }
        }
    }

    Ok(())
}
