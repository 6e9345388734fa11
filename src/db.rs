mod sqlite;

pub use sqlite::Database;

use crate::catalog::{Book, Chapter, ChapterSummary};
use crate::error::Result;
use std::time::Instant;

/// Read access to the book catalog.
///
/// Every call carries an absolute deadline; implementations must give up
/// with [`AppError::Timeout`](crate::error::AppError::Timeout) once it has
/// passed instead of blocking the caller indefinitely.
pub trait CatalogStore: Send + Sync {
    /// Books that have at least one chapter, with their chapter counts.
    fn list_books(&self, deadline: Instant) -> Result<Vec<Book>>;

    /// Chapters of a book without their contents. Unknown books yield an empty list.
    fn list_chapters(&self, deadline: Instant, book_id: u32) -> Result<Vec<ChapterSummary>>;

    /// A single chapter with its contents, or `None` if no row matches.
    fn get_chapter(&self, deadline: Instant, book_id: u32, number: u32)
    -> Result<Option<Chapter>>;
}
