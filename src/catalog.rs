//! Catalog entities and their row mappings.
//!
//! Every value here is a transient projection of one or more store rows,
//! built for a single request and serialized straight into the response.

use crate::config::ContentsFormat;
use crate::error::{AppError, Result};
use rusqlite::Row;
use serde::Serialize;
use serde_json::value::RawValue;

/// A book together with the number of chapters stored for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Primary key (`books.book_id`).
    pub id: u32,
    /// Book title.
    pub name: String,
    /// Author name.
    pub author: String,
    /// Count of associated chapter rows.
    pub chapter_count: u32,
}

impl Book {
    /// Map a `(book_id, book_name, author_name, chapter_count)` row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            author: row.get(2)?,
            chapter_count: row.get(3)?,
        })
    }
}

/// Chapter as it appears in a listing, without its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterSummary {
    /// Chapter number, unique within its book.
    pub number: u32,
    /// Chapter title.
    pub name: String,
}

impl ChapterSummary {
    /// Map a `(chapter_no, chapter_name)` row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            number: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

/// A single chapter including its contents.
#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    /// Chapter number, unique within its book.
    pub number: u32,
    /// Chapter title.
    pub name: String,
    /// Chapter body.
    pub contents: ChapterContents,
}

impl Chapter {
    /// Map a `(chapter_name, chapter_contents)` row for a known chapter number.
    pub fn from_row(number: u32, row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            number,
            name: row.get(0)?,
            contents: ChapterContents::Text(row.get(1)?),
        })
    }

    /// Reinterpret the stored contents according to `format`.
    pub fn with_contents_format(self, format: ContentsFormat) -> Result<Self> {
        Ok(Self {
            contents: self.contents.into_format(format)?,
            ..self
        })
    }
}

/// Stored chapter contents.
///
/// `Text` is always escaped by the encoder. `Json` holds a document that
/// has been checked to be valid JSON and is written into the response
/// unchanged.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChapterContents {
    /// Plain text, encoded as a JSON string.
    Text(String),
    /// Validated JSON document, embedded verbatim.
    Json(Box<RawValue>),
}

impl ChapterContents {
    /// Convert to the representation selected by `format`.
    pub fn into_format(self, format: ContentsFormat) -> Result<Self> {
        match (self, format) {
            (ChapterContents::Text(text), ContentsFormat::Json) => RawValue::from_string(text)
                .map(ChapterContents::Json)
                .map_err(|e| {
                    AppError::Encoding(format!("Stored chapter contents are not JSON: {}", e))
                }),
            (ChapterContents::Json(raw), ContentsFormat::Text) => {
                Ok(ChapterContents::Text(raw.get().to_string()))
            }
            (contents, _) => Ok(contents),
        }
    }
}

/// Encode a response body with two-space indentation and a trailing newline.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut body = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Encoding(format!("Failed to encode response: {}", e)))?;
    body.push('\n');
    Ok(body)
}
