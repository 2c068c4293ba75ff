#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rowmap_orm::{persist_enum, Column, DatabaseType, EntityManager, Record, Report, ReportDef, Table};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub type TestManager = EntityManager<Mutex<Connection>>;

/// A manager over a private in-memory database.
pub fn memory_manager() -> TestManager {
    let conn = Connection::open_in_memory().expect("failed to open in-memory db");
    EntityManager::new(Mutex::new(conn), DatabaseType::Sqlite)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

// ── Entities ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub id: Option<i64>,
    pub name: String,
    pub born: NaiveDate,
}

impl Person {
    pub fn new(name: &str, born: NaiveDate) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            born,
        }
    }
}

impl Record for Person {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", |p: &Person| &p.id, |p: &mut Person| &mut p.id),
            Column::new("name", |p: &Person| &p.name, |p: &mut Person| &mut p.name),
            Column::new("born", |p: &Person| &p.born, |p: &mut Person| &mut p.born),
        ]
    }

    fn table() -> Option<Table> {
        Some(Table::new("person", "id").auto_increment())
    }
}

persist_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Category {
        #[default]
        Groceries,
        Rent,
        Salary,
    }
}

/// Exercises every value kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    pub id: Option<i64>,
    pub memo: String,
    pub amount: Decimal,
    pub ratio: f64,
    pub settled: bool,
    pub posted_at: DateTime<Utc>,
    pub value_date: NaiveDate,
    pub category: Category,
    pub note: Option<String>,
    pub lines: i32,
}

impl Record for Entry {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", |e: &Entry| &e.id, |e: &mut Entry| &mut e.id),
            Column::new("memo", |e: &Entry| &e.memo, |e: &mut Entry| &mut e.memo),
            Column::new("amount", |e: &Entry| &e.amount, |e: &mut Entry| &mut e.amount),
            Column::new("ratio", |e: &Entry| &e.ratio, |e: &mut Entry| &mut e.ratio),
            Column::new("settled", |e: &Entry| &e.settled, |e: &mut Entry| &mut e.settled),
            Column::new("posted_at", |e: &Entry| &e.posted_at, |e: &mut Entry| &mut e.posted_at),
            Column::new("value_date", |e: &Entry| &e.value_date, |e: &mut Entry| &mut e.value_date),
            Column::new("category", |e: &Entry| &e.category, |e: &mut Entry| &mut e.category),
            Column::new("note", |e: &Entry| &e.note, |e: &mut Entry| &mut e.note),
            Column::new("lines", |e: &Entry| &e.lines, |e: &mut Entry| &mut e.lines),
        ]
    }

    fn table() -> Option<Table> {
        Some(Table::new("entry", "id").auto_increment())
    }
}

/// Primary key supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Country {
    pub code: String,
    pub name: String,
}

impl Record for Country {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("code", |c: &Country| &c.code, |c: &mut Country| &mut c.code),
            Column::new("name", |c: &Country| &c.name, |c: &mut Country| &mut c.name),
        ]
    }

    fn table() -> Option<Table> {
        Some(Table::new("country", "code"))
    }
}

// ── Reports ──────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
pub struct Birth {
    pub name: String,
    pub born: NaiveDate,
}

impl Record for Birth {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", |b: &Birth| &b.name, |b: &mut Birth| &mut b.name),
            Column::new("born", |b: &Birth| &b.born, |b: &mut Birth| &mut b.born),
        ]
    }
}

/// People born in or after `year`, oldest first.
pub struct BornSince {
    pub year: i64,
}

impl Report for BornSince {
    type Row = Birth;

    fn definition() -> Option<ReportDef<Self>> {
        Some(
            ReportDef::new(
                "SELECT name, born FROM person \
                 WHERE CAST(substr(born, 1, 4) AS INTEGER) >= ?1 ORDER BY born",
            )
            .param(1, |r: &BornSince| &r.year),
        )
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct YearCount {
    pub year: i64,
    pub total: i64,
}

impl Record for YearCount {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("year", |c: &YearCount| &c.year, |c: &mut YearCount| &mut c.year),
            Column::new("total", |c: &YearCount| &c.total, |c: &mut YearCount| &mut c.total),
        ]
    }
}

/// Births per year, in a closed year range.
pub struct BirthsPerYear {
    pub from: i32,
    pub to: i32,
}

impl Report for BirthsPerYear {
    type Row = YearCount;

    fn definition() -> Option<ReportDef<Self>> {
        // Declared out of order; binding follows the index.
        Some(
            ReportDef::new(
                "SELECT CAST(substr(born, 1, 4) AS INTEGER) AS year, COUNT(*) AS total \
                 FROM person GROUP BY year HAVING year BETWEEN ?1 AND ?2 ORDER BY year",
            )
            .param(2, |r: &BirthsPerYear| &r.to)
            .param(1, |r: &BirthsPerYear| &r.from),
        )
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Memo {
    pub memo: String,
}

impl Record for Memo {
    fn columns() -> Vec<Column<Self>> {
        vec![Column::new("memo", |m: &Memo| &m.memo, |m: &mut Memo| &mut m.memo)]
    }
}

/// Memos of entries whose ratio is at least `min_ratio`.
pub struct EntriesAbove {
    pub min_ratio: f64,
}

impl Report for EntriesAbove {
    type Row = Memo;

    fn definition() -> Option<ReportDef<Self>> {
        Some(
            ReportDef::new("SELECT memo FROM entry WHERE ratio >= ?1 ORDER BY ratio")
                .param(1, |r: &EntriesAbove| &r.min_ratio),
        )
    }
}
