//! Rowmap mapping demo.
//!
//! Seeds an in-memory SQLite library and walks the mapping surface:
//! derived descriptors, naming conventions, symbolic enums, collection
//! accumulation, and untyped value rows.
//!
//! Run with: cargo run --release

use std::error::Error;

use rowmap::sqlite::{self, SqliteCursor};
use rowmap::{keyed_mapper, mapper, Mappable, RowMapper, Symbolic, ValueRowMapper};
use rusqlite::{params, Connection};

#[derive(Debug, Default, Clone, Copy, PartialEq, Symbolic)]
enum Shelf {
    #[default]
    Stacks,
    Reserve,
    Lost,
}

#[derive(Debug, Default, Mappable)]
#[row(naming = "snake", map_all)]
struct Book {
    id: i64,
    title: String,
    author: String,
    #[row(column = "year")]
    published: i32,
    #[row(symbolic)]
    shelf: Shelf,
}

fn seed(conn: &Connection) -> Result<(), Box<dyn Error>> {
    sqlite::execute(
        conn,
        "CREATE TABLE book (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            year INTEGER NOT NULL,
            shelf TEXT NOT NULL
        )",
        [],
    )?;

    let books = [
        (1_i64, "The Left Hand of Darkness", "Ursula K. Le Guin", 1969, "Stacks"),
        (2, "A Wizard of Earthsea", "Ursula K. Le Guin", 1968, "Reserve"),
        (3, "Solaris", "Stanislaw Lem", 1961, "Stacks"),
        (4, "Roadside Picnic", "Arkady Strugatsky", 1972, "Lost"),
    ];
    for (id, title, author, year, shelf) in books {
        sqlite::execute(
            conn,
            "INSERT INTO book (id, title, author, year, shelf) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, title, author, year, shelf],
        )?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let conn = Connection::open_in_memory()?;
    seed(&conn)?;

    // Typed mapping through the derived descriptor.
    let books: Vec<Book> = sqlite::query(
        &conn,
        "SELECT id, title, author, year, shelf FROM book ORDER BY year",
        [],
    )?;
    println!("library holds {} books:", books.len());
    for book in &books {
        println!(
            "  #{} {} - {} ({}) [{}]",
            book.id,
            book.title,
            book.author,
            book.published,
            book.shelf.symbol()
        );
    }

    // Single row, parameterized.
    let lost: Option<Book> = sqlite::query_first(
        &conn,
        "SELECT id, title, author, year, shelf FROM book WHERE shelf = ?1",
        ["Lost"],
    )?;
    match lost {
        Some(book) => println!("missing from the shelves: {}", book.title),
        None => println!("nothing is lost"),
    }

    // Keyed accumulation over a manual cursor.
    let mut stmt = conn.prepare("SELECT id, title, author, year, shelf FROM book")?;
    let mut cursor = SqliteCursor::query(&mut stmt, [])?;
    let by_id = keyed_mapper(mapper::<Book>()?, |book: &Book| book.id).collect(&mut cursor)?;
    println!("indexed {} books by id", by_id.len());

    // Untyped rows for ad-hoc shapes the descriptor does not know.
    let mut stmt =
        conn.prepare("SELECT author, COUNT(*) AS titles FROM book GROUP BY author ORDER BY author")?;
    let mut cursor = SqliteCursor::query(&mut stmt, [])?;
    let untyped = ValueRowMapper::new();
    while let Some(row) = untyped.map_row(&mut cursor)? {
        println!("  {:?} -> {:?}", row["author"], row["titles"]);
    }

    Ok(())
}
