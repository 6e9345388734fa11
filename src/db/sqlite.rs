use crate::catalog::{Book, Chapter, ChapterSummary};
use crate::config::DatabaseConfig;
use crate::db::CatalogStore;
use crate::error::{AppError, Result};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, ErrorCode, OpenFlags, OptionalExtension, params};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// SQLite virtual machine steps between deadline checks.
const DEADLINE_CHECK_OPS: i32 = 1000;

const LIST_BOOKS: &str = "
    SELECT b.book_id, b.book_name, b.author_name, COUNT(c.chapter_no) AS chapter_count
    FROM books b
    INNER JOIN chapters c ON b.book_id = c.book_id
    GROUP BY b.book_id, b.book_name, b.author_name
    ORDER BY b.book_id";

const LIST_CHAPTERS: &str = "
    SELECT chapter_no, chapter_name
    FROM chapters
    WHERE book_id = ?1
    ORDER BY chapter_no";

const GET_CHAPTER: &str = "
    SELECT chapter_name, chapter_contents
    FROM chapters
    WHERE book_id = ?1 AND chapter_no = ?2";

/// Pool of read-only SQLite connections.
///
/// Connections are handed out round-robin; a busy slot is skipped in favour
/// of an idle one before the caller waits on it.
#[derive(Clone)]
pub struct Database {
    connections: Arc<Vec<Mutex<Connection>>>,
    cursor: Arc<AtomicUsize>,
}

impl Database {
    /// Open `pool_size` read-only connections to an existing catalog database.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        if config.pool_size == 0 {
            return Err(AppError::Config(
                "database.pool_size must be greater than zero".to_string(),
            ));
        }

        let mut connections = Vec::with_capacity(config.pool_size);
        for _ in 0..config.pool_size {
            connections.push(Mutex::new(Self::open_connection(config)?));
        }

        Ok(Self {
            connections: Arc::new(connections),
            cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of pooled connections.
    pub fn pool_size(&self) -> usize {
        self.connections.len()
    }

    fn open_connection(config: &DatabaseConfig) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&config.path, flags).map_err(|e| {
            AppError::Store(format!(
                "Failed to open database {}: {}",
                config.path.display(),
                e
            ))
        })?;

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(|e| AppError::Store(format!("Failed to set busy timeout: {}", e)))?;

        Self::verify_schema(&conn)?;
        Ok(conn)
    }

    /// Both catalog tables must already exist; the service never creates them.
    fn verify_schema(conn: &Connection) -> Result<()> {
        let tables: u32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('books', 'chapters')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Store(format!("Failed to inspect schema: {}", e)))?;

        if tables != 2 {
            return Err(AppError::Store(
                "Catalog schema missing: expected tables 'books' and 'chapters'".to_string(),
            ));
        }
        Ok(())
    }

    /// Borrow a connection, waiting no later than `deadline`.
    fn connection(&self, deadline: Instant) -> Result<MutexGuard<'_, Connection>> {
        let len = self.connections.len();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed);

        for offset in 0..len {
            if let Some(conn) = self.connections[(start + offset) % len].try_lock() {
                return Ok(conn);
            }
        }

        self.connections[start % len]
            .try_lock_until(deadline)
            .ok_or_else(|| {
                AppError::Timeout("Timed out waiting for a database connection".to_string())
            })
    }

    /// Run `query` on a pooled connection, interrupting it at `deadline`.
    fn with_connection<T>(
        &self,
        deadline: Instant,
        context: &str,
        query: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        if Instant::now() >= deadline {
            return Err(AppError::Timeout(format!(
                "{}: deadline passed before query",
                context
            )));
        }

        let conn = self.connection(deadline)?;
        conn.progress_handler(DEADLINE_CHECK_OPS, Some(move || Instant::now() >= deadline))
            .map_err(|e| {
                AppError::Store(format!(
                    "{}: failed to install deadline handler: {}",
                    context, e
                ))
            })?;
        let result = query(&*conn);
        if let Err(e) = conn.progress_handler(0, None::<fn() -> bool>) {
            tracing::warn!(error = %e, context, "Failed to clear deadline handler");
        }

        result.map_err(|e| {
            if e.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) {
                AppError::Timeout(format!("{}: query interrupted at deadline", context))
            } else {
                AppError::Store(format!("{}: {}", context, e))
            }
        })
    }
}

impl CatalogStore for Database {
    fn list_books(&self, deadline: Instant) -> Result<Vec<Book>> {
        self.with_connection(deadline, "Failed to fetch book list", |conn| {
            let mut stmt = conn.prepare_cached(LIST_BOOKS)?;
            let books = stmt
                .query_map([], Book::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>();
            books
        })
    }

    fn list_chapters(&self, deadline: Instant, book_id: u32) -> Result<Vec<ChapterSummary>> {
        self.with_connection(deadline, "Failed to fetch chapter list", |conn| {
            let mut stmt = conn.prepare_cached(LIST_CHAPTERS)?;
            let chapters = stmt
                .query_map(params![book_id], ChapterSummary::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>();
            chapters
        })
    }

    fn get_chapter(
        &self,
        deadline: Instant,
        book_id: u32,
        number: u32,
    ) -> Result<Option<Chapter>> {
        self.with_connection(deadline, "Failed to fetch chapter contents", |conn| {
            conn.query_row(GET_CHAPTER, params![book_id, number], |row| {
                Chapter::from_row(number, row)
            })
            .optional()
        })
    }
}
