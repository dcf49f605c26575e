//! SQLite backend for the FreightMatch engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
