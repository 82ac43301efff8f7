//! Pagination strategy implementations
//!
//! Each strategy handles one pagination signal the WooCommerce API (or a
//! proxy in front of it) can expose.

use super::types::{NextPage, PageToken, PaginationState, Paginator};
use crate::error::{Error, Result};
use crate::http::PageResponse;
use std::collections::HashMap;
use tracing::{debug, warn};
use url::Url;

// ============================================================================
// Counted Pagination
// ============================================================================

/// Page-number pagination bounded by a total-pages header.
///
/// WooCommerce reports `X-WP-Total` and `X-WP-TotalPages` on every
/// collection response. An error response does not end the loop: the
/// strategy moves on to the following page, up to `max_error_pages`
/// error responses in a row.
#[derive(Debug, Clone)]
pub struct CountedPaginator {
    /// Header carrying the total page count
    pub header: String,
    /// Error pages tolerated in a row
    pub max_error_pages: u32,
}

impl Default for CountedPaginator {
    fn default() -> Self {
        Self::new("X-WP-TotalPages")
    }
}

impl CountedPaginator {
    /// Create a new counted paginator reading the given header
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            max_error_pages: 3,
        }
    }

    /// Set the bound on consecutive error pages
    #[must_use]
    pub fn with_max_error_pages(mut self, max: u32) -> Self {
        self.max_error_pages = max;
        self
    }

    fn total_pages(&self, response: &PageResponse) -> u32 {
        response
            .header(&self.header)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

impl Paginator for CountedPaginator {
    fn name(&self) -> &'static str {
        "counted"
    }

    fn next_token(&self, response: &PageResponse, state: &mut PaginationState) -> Result<NextPage> {
        let current = state.current_page();

        if response.is_error() {
            state.consecutive_errors += 1;
            if state.consecutive_errors > self.max_error_pages {
                state.mark_exhausted();
                return Err(response.error_for_status());
            }
            warn!(
                "Page {current} failed with HTTP {} ({}/{} error pages), moving on to page {}",
                response.status,
                state.consecutive_errors,
                self.max_error_pages,
                current + 1
            );
            return Ok(state.advance(NextPage::Continue(PageToken::Page(current + 1))));
        }

        state.consecutive_errors = 0;
        let total = self.total_pages(response);
        debug!("Page {current} of {total}");

        let next = if total > current {
            NextPage::Continue(PageToken::Page(current + 1))
        } else {
            NextPage::Done
        };
        Ok(state.advance(next))
    }
}

// ============================================================================
// Link Header Pagination
// ============================================================================

/// Link header pagination (RFC 8288)
///
/// Format: `Link: <https://shop.example.com/wp-json/wc/v3/orders?page=3>; rel="next", ...`
#[derive(Debug, Clone)]
pub struct LinkHeaderPaginator {
    /// Rel value to follow
    pub rel: String,
}

impl Default for LinkHeaderPaginator {
    fn default() -> Self {
        Self::new("next")
    }
}

impl LinkHeaderPaginator {
    /// Create a new link header paginator
    pub fn new(rel: impl Into<String>) -> Self {
        Self { rel: rel.into() }
    }
}

impl Paginator for LinkHeaderPaginator {
    fn name(&self) -> &'static str {
        "link_header"
    }

    fn next_token(&self, response: &PageResponse, state: &mut PaginationState) -> Result<NextPage> {
        if response.is_error() {
            state.mark_exhausted();
            return Err(response.error_for_status());
        }

        let header = response
            .headers
            .get_all("link")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ");

        let Some(next) = parse_link_header(&header).remove(&self.rel) else {
            return Ok(state.advance(NextPage::Done));
        };

        let token = PageToken::Url(Url::parse(&next)?);
        ensure_progress(state, &token)?;
        Ok(state.advance(NextPage::Continue(token)))
    }
}

/// Parse a Link header into a map of relation name to URL.
///
/// A link with several space-separated relations is listed under each.
pub fn parse_link_header(header: &str) -> HashMap<String, String> {
    let mut links = HashMap::new();

    for part in header.split(',') {
        let mut url = None;
        let mut rels = Vec::new();

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some((key, value)) = segment.split_once('=') {
                if key.trim().eq_ignore_ascii_case("rel") {
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    rels.extend(value.split_whitespace().map(str::to_ascii_lowercase));
                }
            }
        }

        if let Some(url) = url {
            for rel in rels {
                links.entry(rel).or_insert_with(|| url.to_string());
            }
        }
    }

    links
}

// ============================================================================
// Simple Header Pagination
// ============================================================================

/// Next page taken verbatim from a single response header.
///
/// A numeric value is a page number, an absolute URL is followed for its
/// `page` parameter, anything else is passed through as the page parameter.
#[derive(Debug, Clone)]
pub struct SimpleHeaderPaginator {
    /// Header name
    pub header: String,
}

impl Default for SimpleHeaderPaginator {
    fn default() -> Self {
        Self::new("next")
    }
}

impl SimpleHeaderPaginator {
    /// Create a new simple header paginator
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl Paginator for SimpleHeaderPaginator {
    fn name(&self) -> &'static str {
        "simple_header"
    }

    fn next_token(&self, response: &PageResponse, state: &mut PaginationState) -> Result<NextPage> {
        if response.is_error() {
            state.mark_exhausted();
            return Err(response.error_for_status());
        }

        let value = match response.header(&self.header).map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => return Ok(state.advance(NextPage::Done)),
        };

        let token = if let Ok(page) = value.parse::<u32>() {
            PageToken::Page(page)
        } else if let Ok(url) = Url::parse(value) {
            PageToken::Url(url)
        } else {
            PageToken::Raw(value.to_string())
        };

        ensure_progress(state, &token)?;
        Ok(state.advance(NextPage::Continue(token)))
    }
}

/// A server handing back the token just fetched would loop forever.
fn ensure_progress(state: &mut PaginationState, token: &PageToken) -> Result<()> {
    if state.token.as_ref() == Some(token) {
        state.mark_exhausted();
        return Err(Error::pagination(format!(
            "server returned the current page again as next page ({token})"
        )));
    }
    Ok(())
}
