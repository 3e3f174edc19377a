//! Search progress report.

use serde_json::Value;

use crate::model::Bundle;

/// State of a paged search after the most recent page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchProgress {
    /// `Bundle.total` of the latest page, if the server reported it.
    pub bundle_total: Option<u64>,
    /// Resources received across all pages.
    pub resource_total: usize,
    /// The latest page had a `next` link.
    pub has_next_page: bool,
    /// Pages fetched.
    pub pages: usize,
    /// Page limit in force; `None` for unbounded.
    pub page_limiter: Option<usize>,
    pub next_link: Option<String>,
    pub first_link: Option<String>,
    pub last_link: Option<String>,
    pub previous_link: Option<String>,
    pub self_link: Option<String>,
    pub identifier: Option<Value>,
    pub timestamp: Option<String>,
    pub signature: Option<Value>,
}

impl SearchProgress {
    /// Progress before the first page.
    pub fn starting(page_limiter: Option<usize>) -> Self {
        Self {
            page_limiter,
            ..Self::default()
        }
    }

    /// Fold in a freshly fetched page.
    pub(crate) fn record_page(&mut self, page: &Bundle, resources: usize) {
        self.pages += 1;
        self.resource_total += resources;
        self.bundle_total = page.total;
        self.has_next_page = page.next_link().is_some();
        self.next_link = page.next_link().map(str::to_string);
        self.first_link = page.first_link().map(str::to_string);
        self.last_link = page.last_link().map(str::to_string);
        self.previous_link = page.previous_link().map(str::to_string);
        self.self_link = page.self_link().map(str::to_string);
        self.identifier = page.identifier.clone();
        self.timestamp = page.timestamp.clone();
        self.signature = page.signature.clone();
    }

    /// Iteration stopped at the page limit while the server still had more.
    pub fn is_truncated(&self) -> bool {
        self.has_next_page && self.page_limiter.is_some_and(|limit| self.pages >= limit)
    }
}
