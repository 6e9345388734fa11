//! bookshelf: a read-only HTTP API over a catalog of books and chapters.
//!
//! The catalog lives in a SQLite database with two tables, `books` and
//! `chapters`. The server answers three queries:
//!
//! - `GET /books`: books with their chapter counts
//! - `GET /chapters?book=<id>`: chapter numbers and names of a book
//! - `GET /chapter?book=<id>&chapter=<n>`: a single chapter with contents
//!
//! Errors are reported as `{"error": "<message>"}` with a matching status code.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Catalog entities and JSON encoding.
pub mod catalog;
/// Configuration and CLI.
pub mod config;
/// Catalog store access.
pub mod db;
/// Error types.
pub mod error;
/// HTTP server.
pub mod server;


pub use config::{Cli, Command, Config};
pub use db::{CatalogStore, Database};
pub use error::{AppError, Result};
pub use server::AppState;
