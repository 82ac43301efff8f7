//! Pagination module
//!
//! Supports: Counted (total-pages header), Link header, Simple "next" header
//!
//! # Overview
//!
//! Each strategy turns the latest response plus the previous page token into
//! the next token or exhaustion. Exactly one strategy is active per stream;
//! the engine only sees the [`Paginator`] trait.

mod strategies;
mod types;

pub use strategies::{parse_link_header, CountedPaginator, LinkHeaderPaginator, SimpleHeaderPaginator};
pub use types::{NextPage, PageToken, PaginationConfig, PaginationState, Paginator};
