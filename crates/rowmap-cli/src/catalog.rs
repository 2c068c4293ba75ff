//! Sample library catalog: authors, their books, and a per-year report.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use rowmap_orm::{persist_enum, Column, Record, Report, ReportDef, Table};
use rust_decimal::Decimal;
use serde::Serialize;

persist_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
    pub enum Genre {
        #[default]
        Fiction,
        Poetry,
        History,
        Science,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Author {
    pub id: Option<i64>,
    pub name: String,
    pub born: NaiveDate,
}

impl Record for Author {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", |a: &Author| &a.id, |a: &mut Author| &mut a.id),
            Column::new("name", |a: &Author| &a.name, |a: &mut Author| &mut a.name),
            Column::new("born", |a: &Author| &a.born, |a: &mut Author| &mut a.born),
        ]
    }

    fn table() -> Option<Table> {
        Some(Table::new("author", "id").auto_increment())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Book {
    pub id: Option<i64>,
    pub author_id: i64,
    pub title: String,
    pub genre: Genre,
    pub published: NaiveDate,
    pub price: Decimal,
    pub in_print: bool,
    pub added_at: DateTime<Utc>,
}

impl Record for Book {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", |b: &Book| &b.id, |b: &mut Book| &mut b.id),
            Column::new("author_id", |b: &Book| &b.author_id, |b: &mut Book| &mut b.author_id),
            Column::new("title", |b: &Book| &b.title, |b: &mut Book| &mut b.title),
            Column::new("genre", |b: &Book| &b.genre, |b: &mut Book| &mut b.genre),
            Column::new("published", |b: &Book| &b.published, |b: &mut Book| &mut b.published),
            Column::new("price", |b: &Book| &b.price, |b: &mut Book| &mut b.price),
            Column::new("in_print", |b: &Book| &b.in_print, |b: &mut Book| &mut b.in_print),
            Column::new("added_at", |b: &Book| &b.added_at, |b: &mut Book| &mut b.added_at),
        ]
    }

    fn table() -> Option<Table> {
        Some(Table::new("book", "id").auto_increment())
    }
}

/// One row of [`BooksPerYear`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearTally {
    pub year: i64,
    pub books: i64,
}

impl Record for YearTally {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("year", |t: &YearTally| &t.year, |t: &mut YearTally| &mut t.year),
            Column::new("books", |t: &YearTally| &t.books, |t: &mut YearTally| &mut t.books),
        ]
    }
}

/// Books published per year, from `since` onwards.
#[derive(Debug, Clone, Copy)]
pub struct BooksPerYear {
    pub since: i32,
}

impl Report for BooksPerYear {
    type Row = YearTally;

    fn definition() -> Option<ReportDef<Self>> {
        Some(
            ReportDef::new(
                "SELECT CAST(substr(published, 1, 4) AS INTEGER) AS year, COUNT(*) AS books \
                 FROM book \
                 WHERE CAST(substr(published, 1, 4) AS INTEGER) >= ?1 \
                 GROUP BY year ORDER BY year",
            )
            .param(1, |r: &BooksPerYear| &r.since),
        )
    }
}

/// Seed data: each author with the books to insert after them.
pub fn sample_library() -> Vec<(Author, Vec<Book>)> {
    // Stored instants keep whole milliseconds.
    let added_at = Utc::now().trunc_subsecs(3);
    let book = |title: &str, genre: Genre, published: NaiveDate, cents: i64, in_print: bool| Book {
        id: None,
        author_id: 0,
        title: title.to_string(),
        genre,
        published,
        price: Decimal::new(cents, 2),
        in_print,
        added_at,
    };
    let author = |name: &str, born: NaiveDate| Author {
        id: None,
        name: name.to_string(),
        born,
    };

    vec![
        (
            author("Jane Austen", ymd(1775, 12, 16)),
            vec![
                book("Pride and Prejudice", Genre::Fiction, ymd(1813, 1, 28), 899, true),
                book("Emma", Genre::Fiction, ymd(1815, 12, 23), 799, true),
            ],
        ),
        (
            author("Charles Darwin", ymd(1809, 2, 12)),
            vec![book(
                "On the Origin of Species",
                Genre::Science,
                ymd(1859, 11, 24),
                1_250,
                true,
            )],
        ),
        (
            author("Emily Dickinson", ymd(1830, 12, 10)),
            vec![book("Poems", Genre::Poetry, ymd(1890, 11, 12), 1_500, false)],
        ),
        (
            author("Edward Gibbon", ymd(1737, 5, 8)),
            vec![book(
                "The History of the Decline and Fall of the Roman Empire",
                Genre::History,
                ymd(1776, 2, 17),
                4_999,
                false,
            )],
        ),
    ]
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // Seed dates are literal and always valid.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
