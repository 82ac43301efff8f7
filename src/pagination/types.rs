//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use super::strategies::{CountedPaginator, LinkHeaderPaginator, SimpleHeaderPaginator};
use crate::error::Result;
use crate::http::PageResponse;
use serde::{Deserialize, Serialize};
use url::Url;

/// Opaque continuation token produced by a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageToken {
    /// A page number
    Page(u32),
    /// A full "next" URL (Link header or URL-valued header)
    Url(Url),
    /// Any other header value, passed through as the page parameter
    Raw(String),
}

impl PageToken {
    /// The value to send as the `page` query parameter.
    ///
    /// URL tokens only contribute their `page` component.
    pub fn page_param(&self) -> Option<String> {
        match self {
            Self::Page(n) => Some(n.to_string()),
            Self::Url(url) => url
                .query_pairs()
                .find(|(k, _)| k == "page")
                .map(|(_, v)| v.into_owned()),
            Self::Raw(s) => Some(s.clone()),
        }
    }

    /// The page number this token points at, if it has one
    pub fn page_number(&self) -> Option<u32> {
        match self {
            Self::Page(n) => Some(*n),
            _ => self.page_param()?.parse().ok(),
        }
    }
}

impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Page(n) => write!(f, "page {n}"),
            Self::Url(url) => write!(f, "{url}"),
            Self::Raw(s) => write!(f, "{s}"),
        }
    }
}

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch the page identified by this token
    Continue(PageToken),
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The continuation token, if any
    pub fn token(&self) -> Option<&PageToken> {
        match self {
            Self::Continue(token) => Some(token),
            Self::Done => None,
        }
    }
}

/// Page fetch state of one partition's page loop
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Token of the page fetched last (`None` for the first page)
    pub token: Option<PageToken>,
    /// No further requests may be issued once set
    pub exhausted: bool,
    /// Pages fetched so far
    pub pages_fetched: u32,
    /// Records fetched so far
    pub records_fetched: u64,
    /// Error responses seen in a row
    pub consecutive_errors: u32,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// The page number of the page fetched last (1 for the first page)
    pub fn current_page(&self) -> u32 {
        self.token
            .as_ref()
            .and_then(PageToken::page_number)
            .unwrap_or(1)
    }

    /// Record a completed page fetch
    pub fn add_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.records_fetched += records as u64;
    }

    /// Mark pagination as complete
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }

    /// Apply a strategy decision and hand it back
    pub fn advance(&mut self, next: NextPage) -> NextPage {
        match &next {
            NextPage::Continue(token) => self.token = Some(token.clone()),
            NextPage::Done => self.mark_exhausted(),
        }
        next
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync + std::fmt::Debug {
    /// Strategy name for logs
    fn name(&self) -> &'static str;

    /// Decide the next page from the latest response.
    ///
    /// The previous token is `state.token`; implementations record their
    /// decision in `state` via [`PaginationState::advance`].
    fn next_token(&self, response: &PageResponse, state: &mut PaginationState) -> Result<NextPage>;
}

/// Pagination strategy selection, as written in the tap config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PaginationConfig {
    /// Page numbers bounded by a total-pages response header
    Counted {
        /// Header carrying the total page count
        #[serde(default = "default_total_pages_header")]
        header: String,
        /// Error pages tolerated in a row before the partition fails
        #[serde(default = "default_max_error_pages")]
        max_error_pages: u32,
    },

    /// RFC 8288 `Link` header
    LinkHeader {
        /// Relation to follow
        #[serde(default = "default_rel")]
        rel: String,
    },

    /// A single header holding the next page
    SimpleHeader {
        /// Header name
        #[serde(default = "default_next_header")]
        header: String,
    },
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self::counted()
    }
}

impl PaginationConfig {
    /// Counted pagination on `X-WP-TotalPages`
    pub fn counted() -> Self {
        Self::Counted {
            header: default_total_pages_header(),
            max_error_pages: default_max_error_pages(),
        }
    }

    /// Link header pagination following `rel="next"`
    pub fn link_header() -> Self {
        Self::LinkHeader { rel: default_rel() }
    }

    /// Simple header pagination on the `next` header
    pub fn simple_header() -> Self {
        Self::SimpleHeader {
            header: default_next_header(),
        }
    }

    /// Instantiate the configured strategy
    pub fn build(&self) -> Box<dyn Paginator> {
        match self {
            Self::Counted {
                header,
                max_error_pages,
            } => Box::new(CountedPaginator::new(header.clone()).with_max_error_pages(*max_error_pages)),
            Self::LinkHeader { rel } => Box::new(LinkHeaderPaginator::new(rel.clone())),
            Self::SimpleHeader { header } => Box::new(SimpleHeaderPaginator::new(header.clone())),
        }
    }
}

fn default_total_pages_header() -> String {
    "X-WP-TotalPages".to_string()
}

fn default_max_error_pages() -> u32 {
    3
}

fn default_rel() -> String {
    "next".to_string()
}

fn default_next_header() -> String {
    "next".to_string()
}
