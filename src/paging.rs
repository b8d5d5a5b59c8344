//! In-memory pagination over query results.
//!
//! A [`Page`] is a bounded, 1-based view over an already-fetched row set.
//! Page resolution never fails: a bad page parameter falls back to page 1
//! and an out-of-range one clamps to the last page.

use crate::db::Row;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// A single page of query result rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number, always within `[1, total_pages]`.
    pub number: usize,

    /// Total number of pages, at least 1.
    pub total_pages: usize,

    /// The rows belonging to this page.
    pub rows: Vec<Row>,
}

impl Page {
    /// Returns true if a page precedes this one.
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Returns true if a page follows this one.
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Returns the previous page number, if any.
    pub fn previous(&self) -> Option<usize> {
        self.has_previous().then(|| self.number - 1)
    }

    /// Returns the next page number, if any.
    pub fn next(&self) -> Option<usize> {
        self.has_next().then(|| self.number + 1)
    }
}

/// Parses a page parameter, falling back to page 1.
///
/// Accepts anything that parses as a positive integer; absent, non-numeric,
/// zero, or negative values all resolve to 1.
pub fn parse_page_param(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

/// Slices `rows` into the requested page.
///
/// `total_pages = max(1, ceil(N / page_size))`; a requested page beyond the
/// end clamps to the last page. An empty row set yields one empty page.
pub fn paginate(rows: Vec<Row>, requested: usize, page_size: usize) -> Page {
    debug_assert!(page_size > 0);

    let total_pages = std::cmp::max(1, rows.len().div_ceil(page_size));
    let number = requested.clamp(1, total_pages);

    let start = (number - 1) * page_size;
    let page_rows: Vec<Row> = rows.into_iter().skip(start).take(page_size).collect();

    Page {
        number,
        total_pages,
        rows: page_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Value;
    use pretty_assertions::assert_eq;

    fn rows(n: usize) -> Vec<Row> {
        (0..n).map(|i| vec![Value::Int(i as i64)]).collect()
    }

    #[test]
    fn test_parse_page_param() {
        assert_eq!(parse_page_param(None), 1);
        assert_eq!(parse_page_param(Some("3")), 3);
        assert_eq!(parse_page_param(Some(" 2 ")), 2);
        assert_eq!(parse_page_param(Some("0")), 1);
        assert_eq!(parse_page_param(Some("-4")), 1);
        assert_eq!(parse_page_param(Some("abc")), 1);
        assert_eq!(parse_page_param(Some("")), 1);
    }

    #[test]
    fn test_page_count_is_ceiling() {
        assert_eq!(paginate(rows(90), 1, 30).total_pages, 3);
        assert_eq!(paginate(rows(91), 1, 30).total_pages, 4);
        assert_eq!(paginate(rows(29), 1, 30).total_pages, 1);
        assert_eq!(paginate(rows(30), 1, 30).total_pages, 1);
        assert_eq!(paginate(rows(31), 1, 30).total_pages, 2);
    }

    #[test]
    fn test_page_slicing() {
        let page = paginate(rows(70), 2, 30);
        assert_eq!(page.number, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 30);
        assert_eq!(page.rows[0], vec![Value::Int(30)]);

        let last = paginate(rows(70), 3, 30);
        assert_eq!(last.rows.len(), 10);
        assert_eq!(last.rows[0], vec![Value::Int(60)]);
    }

    #[test]
    fn test_out_of_range_clamps_to_last_page() {
        let page = paginate(rows(70), 99, 30);
        assert_eq!(page.number, 3);
        assert_eq!(page.rows.len(), 10);
    }

    #[test]
    fn test_zero_request_clamps_to_first_page() {
        let page = paginate(rows(70), 0, 30);
        assert_eq!(page.number, 1);
        assert_eq!(page.rows.len(), 30);
    }

    #[test]
    fn test_empty_rows_yield_single_empty_page() {
        let page = paginate(Vec::new(), 5, 30);
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn test_navigation_helpers() {
        let first = paginate(rows(70), 1, 30);
        assert!(!first.has_previous());
        assert!(first.has_next());
        assert_eq!(first.previous(), None);
        assert_eq!(first.next(), Some(2));

        let last = paginate(rows(70), 3, 30);
        assert!(last.has_previous());
        assert!(!last.has_next());
        assert_eq!(last.previous(), Some(2));
        assert_eq!(last.next(), None);
    }
}
