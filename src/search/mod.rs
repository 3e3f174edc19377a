//! Paged search.
//!
//! # Data Flow
//! ```text
//! Navigator::search
//!     → accumulator.rs (first page, then next links up to the limit)
//!     → ResourceCache (merge each page)
//!     → progress.rs (counts and latest links)
//! ```

pub mod accumulator;
pub mod progress;

pub use accumulator::{normalize_page_limiter, search_pages};
pub use progress::SearchProgress;
