// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keyset pagination cursors.
//!
//! Every paged listing is ordered by `(created_at DESC, id DESC)`. A cursor
//! carries the position of the last item a client has seen; the next page is
//! everything strictly after it in that order. Rows inserted after the first
//! page was served always sort before the cursor, so they can never shift
//! later pages.

use crate::error::{AppError, Result};
use crate::time_utils::format_db_timestamp;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 50;
const CURSOR_PARTS: usize = 3;

/// Position in a `(created_at DESC, id DESC)` sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub id: i64,
}

impl FeedCursor {
    /// Opaque URL-safe representation handed to clients.
    pub fn encode(&self) -> String {
        let payload = format!(
            "{}:{}:{}",
            self.created_at.timestamp(),
            self.created_at.timestamp_subsec_nanos(),
            self.id
        );
        URL_SAFE_NO_PAD.encode(payload)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        let invalid_cursor = || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

        let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
        let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

        let parts: Vec<&str> = decoded_str.split(':').collect();
        if parts.len() != CURSOR_PARTS {
            return Err(invalid_cursor());
        }

        let seconds = parts[0].parse::<i64>().map_err(|_| invalid_cursor())?;
        let nanos = parts[1].parse::<u32>().map_err(|_| invalid_cursor())?;
        let id = parts[2].parse::<i64>().map_err(|_| invalid_cursor())?;
        let created_at = DateTime::from_timestamp(seconds, nanos).ok_or_else(invalid_cursor)?;

        Ok(Self { created_at, id })
    }
}

/// Clamp a requested page size into `[1, MAX_LIMIT]`.
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// `?cursor=&limit=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn into_request(self) -> Result<PageRequest> {
        let cursor = self
            .cursor
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(FeedCursor::decode)
            .transpose()?;

        Ok(PageRequest {
            cursor,
            limit: clamp_limit(self.limit),
        })
    }
}

/// A validated page request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub cursor: Option<FeedCursor>,
    pub limit: i64,
}

impl PageRequest {
    pub fn first(limit: i64) -> Self {
        Self {
            cursor: None,
            limit: clamp_limit(Some(limit)),
        }
    }

    /// Number of rows to fetch: one extra to learn whether another page exists.
    pub fn fetch_limit(&self) -> i64 {
        self.limit + 1
    }

    /// Cursor bind values for the keyset predicate
    /// `(?1 IS NULL OR created_at < ?1 OR (created_at = ?1 AND id < ?2))`.
    pub fn cursor_binds(&self) -> (Option<String>, i64) {
        match self.cursor {
            Some(c) => (Some(format_db_timestamp(c.created_at)), c.id),
            None => (None, i64::MAX),
        }
    }
}

/// Rows that can be paged by `(created_at, id)`.
pub trait Keyed {
    fn cursor_key(&self) -> FeedCursor;
}

/// One page of results plus the cursor for the next page.
///
/// `next_cursor` is `None` at the end of the sequence.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T: Keyed> Page<T> {
    /// Build a page from rows fetched with [`PageRequest::fetch_limit`].
    pub fn from_rows(mut rows: Vec<T>, request: &PageRequest) -> Self {
        let limit = request.limit as usize;
        let has_more = rows.len() > limit;
        if has_more {
            rows.truncate(limit);
        }

        let next_cursor = if has_more {
            rows.last().map(|r| r.cursor_key().encode())
        } else {
            None
        };

        Self {
            items: rows,
            next_cursor,
        }
    }
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(FeedCursor);

    impl Keyed for Row {
        fn cursor_key(&self) -> FeedCursor {
            self.0
        }
    }

    fn row(secs: i64, id: i64) -> Row {
        Row(FeedCursor {
            created_at: DateTime::from_timestamp(secs, 0).unwrap(),
            id,
        })
    }

    #[test]
    fn test_cursor_round_trip() {
        let cursor = FeedCursor {
            created_at: DateTime::from_timestamp(1_704_103_200, 123_000).unwrap(),
            id: 42,
        };

        let decoded = FeedCursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_cursor_rejects_invalid_input() {
        let err = FeedCursor::decode("not-base64!").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let two_parts = URL_SAFE_NO_PAD.encode("1:2");
        assert!(FeedCursor::decode(&two_parts).is_err());
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-7)), 1);
        assert_eq!(clamp_limit(Some(1)), 1);
        assert_eq!(clamp_limit(Some(37)), 37);
        assert_eq!(clamp_limit(Some(50)), 50);
        assert_eq!(clamp_limit(Some(51)), 50);
        assert_eq!(clamp_limit(Some(i64::MAX)), 50);
    }

    #[test]
    fn test_empty_cursor_means_first_page() {
        let req = PageQuery {
            cursor: Some(String::new()),
            limit: None,
        }
        .into_request()
        .unwrap();
        assert!(req.cursor.is_none());
        assert_eq!(req.cursor_binds().0, None);
    }

    #[test]
    fn test_page_from_rows_sets_cursor_only_when_more() {
        let req = PageRequest::first(2);

        let page = Page::from_rows(vec![row(30, 3), row(20, 2), row(10, 1)], &req);
        assert_eq!(page.items.len(), 2);
        let next = FeedCursor::decode(page.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!(next.id, 2);

        let last = Page::from_rows(vec![row(10, 1)], &req);
        assert_eq!(last.items.len(), 1);
        assert!(last.next_cursor.is_none());
    }
}
