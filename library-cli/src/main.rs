//! Command-line interface for the Library gRPC service.
//!
//! Provides commands to register and rename authors, add and update books,
//! and stream the books of an author. Output is plain text or JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use tokio_stream::StreamExt;
use tonic::transport::Channel;

use library_api::{
    model::book::BookModel,
    v1::{
        AddBookRequest, Book, ChangeAuthorInfoRequest, GetAuthorBooksRequest,
        GetAuthorInfoRequest, GetBookInfoRequest, RegisterAuthorRequest, UpdateBookRequest,
        library_client::LibraryClient,
    },
};

/// Command-line interface configuration.
#[derive(Parser)]
#[command(name = "library-cli")]
#[command(about = "A CLI tool for interacting with the Library gRPC service")]
#[command(version)]
pub struct Cli {
    /// The gRPC server address
    #[arg(long, short, env = "LIBRARY_ADDRESS", default_value = "http://127.0.0.1:9000")]
    pub address: String,

    /// Output format (json or text)
    #[arg(long, short = 'J', env = "LIBRARY_JSON")]
    pub json: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Author operations
    Author {
        /// The author subcommand to execute
        #[command(subcommand)]
        command: AuthorCommands,
    },
    /// Book operations
    Book {
        /// The book subcommand to execute
        #[command(subcommand)]
        command: BookCommands,
    },
}

/// Author-related operations.
#[derive(Subcommand)]
pub enum AuthorCommands {
    /// Register a new author
    Register {
        /// Author name
        name: String,
    },
    /// Get an author by ID
    Get {
        /// Author ID
        id: String,
    },
    /// Rename an existing author
    Rename {
        /// Author ID
        id: String,
        /// New name
        name: String,
    },
    /// Stream all books of an author
    Books {
        /// Author ID
        id: String,
    },
}

/// Book-related operations.
#[derive(Subcommand)]
pub enum BookCommands {
    /// Add a new book
    Add {
        /// Book name
        name: String,
        /// Author IDs
        #[arg(required = true)]
        author_ids: Vec<String>,
    },
    /// Get a book by ID
    Get {
        /// Book ID
        id: String,
    },
    /// Rename a book and replace its authors
    Update {
        /// Book ID
        id: String,
        /// New name
        name: String,
        /// New author IDs
        #[arg(required = true)]
        author_ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = LibraryClient::connect(cli.address.clone())
        .await
        .with_context(|| format!("failed to connect to {}", cli.address))?;

    match cli.command {
        Commands::Author { command } => handle_author_command(client, command, cli.json).await?,
        Commands::Book { command } => handle_book_command(client, command, cli.json).await?,
    }

    Ok(())
}

/// Handles author-related CLI commands.
///
/// # Errors
///
/// Returns an error if the gRPC call fails or the response is invalid.
async fn handle_author_command(
    mut client: LibraryClient<Channel>,
    command: AuthorCommands,
    json: bool,
) -> Result<()> {
    match command {
        AuthorCommands::Register { name } => {
            let response = client
                .register_author(RegisterAuthorRequest { name })
                .await?
                .into_inner();
            if json {
                println!("{}", json!({ "id": response.id }));
            } else {
                println!("Registered author {}", response.id);
            }
        }
        AuthorCommands::Get { id } => {
            let author = client
                .get_author_info(GetAuthorInfoRequest { id })
                .await?
                .into_inner();
            if json {
                println!("{}", json!({ "id": author.id, "name": author.name }));
            } else {
                println!("ID: {}", author.id);
                println!("Name: {}", author.name);
            }
        }
        AuthorCommands::Rename { id, name } => {
            client
                .change_author_info(ChangeAuthorInfoRequest {
                    id: id.clone(),
                    name,
                })
                .await?;
            if json {
                println!("{}", json!({ "id": id }));
            } else {
                println!("Renamed author {id}");
            }
        }
        AuthorCommands::Books { id } => {
            let mut stream = client
                .get_author_books(GetAuthorBooksRequest { author_id: id })
                .await?
                .into_inner();
            while let Some(book) = stream.next().await {
                print_book(book?, json)?;
            }
        }
    }

    Ok(())
}

/// Handles book-related CLI commands.
///
/// # Errors
///
/// Returns an error if the gRPC call fails or the response is invalid.
async fn handle_book_command(
    mut client: LibraryClient<Channel>,
    command: BookCommands,
    json: bool,
) -> Result<()> {
    match command {
        BookCommands::Add { name, author_ids } => {
            let book = client
                .add_book(AddBookRequest { name, author_ids })
                .await?
                .into_inner()
                .book
                .context("response is missing the book")?;
            print_book(book, json)?;
        }
        BookCommands::Get { id } => {
            let book = client
                .get_book_info(GetBookInfoRequest { id })
                .await?
                .into_inner()
                .book
                .context("response is missing the book")?;
            print_book(book, json)?;
        }
        BookCommands::Update {
            id,
            name,
            author_ids,
        } => {
            client
                .update_book(UpdateBookRequest {
                    id: id.clone(),
                    name,
                    author_ids,
                })
                .await?;
            if json {
                println!("{}", json!({ "id": id }));
            } else {
                println!("Updated book {id}");
            }
        }
    }

    Ok(())
}

fn print_book(book: Book, json: bool) -> Result<()> {
    let book = BookModel::try_from(book).context("invalid book in response")?;
    let author_ids: Vec<String> = book.author_ids.iter().map(ToString::to_string).collect();
    let create_time = book.create_time.format(&Rfc3339)?;
    let update_time = book.update_time.format(&Rfc3339)?;

    if json {
        println!(
            "{}",
            json!({
                "id": book.id.to_string(),
                "name": book.name,
                "authorIds": author_ids,
                "createTime": create_time,
                "updateTime": update_time,
            })
        );
    } else {
        println!("ID: {}", book.id);
        println!("Name: {}", book.name);
        println!("Authors: {}", author_ids.join(", "));
        println!("Created: {create_time}");
        println!("Updated: {update_time}");
        println!();
    }

    Ok(())
}
