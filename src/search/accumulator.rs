//! Paged search accumulator.
//!
//! # Responsibilities
//! - Fetch the first page, then follow `next` links up to a page limit
//! - Merge each page into the resource cache before asking for the next
//! - Report progress after every page
//!
//! # Design Decisions
//! - Strictly sequential: each continuation depends on the previous page
//! - A page without a `next` link ends the search without another request
//! - A limit of zero or less means unbounded

use crate::cache::ResourceCache;
use crate::client::ResourceClient;
use crate::error::NavigatorResult;
use crate::model::SearchParams;
use crate::search::progress::SearchProgress;

/// Normalise a caller page limit: `None` or `<= 0` is unbounded.
pub fn normalize_page_limiter(page_limiter: Option<i32>) -> Option<usize> {
    page_limiter
        .filter(|limit| *limit > 0)
        .and_then(|limit| usize::try_from(limit).ok())
}

/// Run a search, caching every page's resources.
pub async fn search_pages(
    client: &dyn ResourceClient,
    cache: &mut ResourceCache,
    resource_type: &str,
    params: &SearchParams,
    page_limiter: Option<i32>,
) -> NavigatorResult<SearchProgress> {
    let limit = normalize_page_limiter(page_limiter);
    let mut progress = SearchProgress::starting(limit);

    let mut page = client.search(resource_type, params).await?;

    while let Some(bundle) = page {
        let resources = bundle.resources().count();
        cache.add_bundle(&bundle);
        progress.record_page(&bundle, resources);

        tracing::debug!(
            repository = %client.repository(),
            resource_type = %resource_type,
            page = progress.pages,
            resources,
            resource_total = progress.resource_total,
            has_next_page = progress.has_next_page,
            "Search page received"
        );

        if !progress.has_next_page || limit.is_some_and(|l| progress.pages >= l) {
            break;
        }
        page = client.continue_page(&bundle).await?;
    }

    if progress.is_truncated() {
        tracing::info!(
            repository = %client.repository(),
            resource_type = %resource_type,
            pages = progress.pages,
            "Search stopped at page limit with more results available"
        );
    }
    Ok(progress)
}
