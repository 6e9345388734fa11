//! HTTP request handlers.

use crate::catalog;
use crate::error::{AppError, Result};
use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Body of the homepage.
pub const WELCOME: &str = "Welcome to the homepage!";

/// Raw query pairs in request order.
type QueryPairs = Vec<(String, String)>;

/// Encode `value` as an indented JSON response.
fn json_response<T: Serialize + ?Sized>(value: &T) -> Result<Response> {
    let body = catalog::to_pretty_json(value)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// First value of `key`, as a browser form would submit it.
fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Parse a non-negative integer identifier.
fn parse_id(raw: Option<&str>) -> Option<u32> {
    raw?.parse().ok()
}

fn book_id(params: &[(String, String)]) -> Result<u32> {
    let raw = param(params, "book");
    parse_id(raw).ok_or_else(|| AppError::InvalidBookId(raw.unwrap_or_default().to_string()))
}

fn chapter_number(params: &[(String, String)]) -> Result<u32> {
    let raw = param(params, "chapter");
    parse_id(raw)
        .ok_or_else(|| AppError::InvalidChapterNumber(raw.unwrap_or_default().to_string()))
}

/// Homepage.
pub async fn index() -> &'static str {
    tracing::debug!("Endpoint: homepage");
    WELCOME
}

/// Books with at least one chapter, with chapter counts.
pub async fn list_books(State(state): State<AppState>) -> Result<Response> {
    let books = state
        .query(|store, deadline| store.list_books(deadline))
        .await?;

    json_response(&books)
}

/// Chapters of `?book=<id>`, without contents.
pub async fn list_chapters(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Response> {
    let book_id = book_id(&params)?;

    let chapters = state
        .query(move |store, deadline| store.list_chapters(deadline, book_id))
        .await?;

    json_response(&chapters)
}

/// Full contents of `?book=<id>&chapter=<n>`.
pub async fn get_chapter(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Response> {
    let book_id = book_id(&params)?;
    let number = chapter_number(&params)?;

    let chapter = state
        .query(move |store, deadline| store.get_chapter(deadline, book_id, number))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chapter {} of book {}", number, book_id)))?
        .with_contents_format(state.config.catalog.contents)?;

    json_response(&chapter)
}

/// Redirect `/path/` to `/path` with a 301, keeping the query string.
pub async fn strip_trailing_slash(uri: Uri) -> Response {
    let path = uri.path().trim_end_matches('/');
    let target = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &[(&str, &str)]) -> QueryPairs {
        query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_id_accepts_non_negative_integers() {
        assert_eq!(parse_id(Some("0")), Some(0));
        assert_eq!(parse_id(Some("42")), Some(42));
        assert_eq!(parse_id(Some("-1")), None);
        assert_eq!(parse_id(Some("abc")), None);
        assert_eq!(parse_id(Some("")), None);
        assert_eq!(parse_id(None), None);
    }

    #[test]
    fn parse_id_is_bounded_by_u32() {
        assert_eq!(parse_id(Some("4294967295")), Some(u32::MAX));
        assert_eq!(parse_id(Some("4294967296")), None);

        let params = pairs(&[("book", "4294967296")]);
        assert!(matches!(book_id(&params), Err(AppError::InvalidBookId(_))));
    }

    #[test]
    fn first_value_wins() {
        let params = pairs(&[("book", "3"), ("book", "9")]);
        assert_eq!(book_id(&params).unwrap(), 3);
    }

    #[test]
    fn missing_chapter_is_invalid() {
        let params = pairs(&[("book", "3")]);
        assert!(matches!(
            chapter_number(&params),
            Err(AppError::InvalidChapterNumber(_))
        ));
    }
}
