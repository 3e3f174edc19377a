//! Per-repository navigator.
//!
//! # Responsibilities
//! - Search with paging into the session cache
//! - Read resources cache-first, by id or by reference
//! - Resolve contained references against a parent resource
//! - Create, update, delete and submit transactions
//!
//! # Design Decisions
//! - Type disagreements always raise; they are never coerced
//! - A contained id missing from its parent reads as absent
//! - Remote, urn, metadata and operation references are not fetched

use std::sync::Arc;

use crate::cache::ResourceCache;
use crate::client::ResourceClient;
use crate::error::{NavigatorError, NavigatorResult};
use crate::lifecycle::Cancellation;
use crate::model::{Bundle, BundleType, Resource, SearchParams, TypedResource};
use crate::reference::{is_container_capable, ParsedReference, ReferenceKind, ReferenceResolver};
use crate::search::{search_pages, SearchProgress};

/// Client facade for one repository with its own resource cache.
pub struct Navigator {
    repository: String,
    client: Arc<dyn ResourceClient>,
    resolver: Arc<ReferenceResolver>,
    cache: ResourceCache,
    cancel: Cancellation,
}

impl Navigator {
    pub fn new(
        repository: impl Into<String>,
        client: Arc<dyn ResourceClient>,
        resolver: Arc<ReferenceResolver>,
    ) -> Self {
        Self {
            repository: repository.into(),
            client,
            resolver,
            cache: ResourceCache::new(),
            cancel: Cancellation::new(),
        }
    }

    /// Use `cancel` as this navigator's signal. It must be the one its retry stages observe.
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// Signal that stops this navigator's pending retries, and no other navigator's.
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancel
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResourceCache {
        &mut self.cache
    }

    /// Search `T`, following up to `page_limiter` pages (`None` or `<= 0` for all).
    pub async fn search<T: TypedResource>(
        &mut self,
        params: &SearchParams,
        page_limiter: Option<i32>,
    ) -> NavigatorResult<SearchProgress> {
        self.search_by_type(T::RESOURCE_TYPE, params, page_limiter).await
    }

    /// Untyped form of [`search`](Self::search).
    pub async fn search_by_type(
        &mut self,
        resource_type: &str,
        params: &SearchParams,
        page_limiter: Option<i32>,
    ) -> NavigatorResult<SearchProgress> {
        search_pages(
            self.client.as_ref(),
            &mut self.cache,
            resource_type,
            params,
            page_limiter,
        )
        .await
    }

    /// Read `T` by id: from the cache, else from the repository (and cache it).
    pub async fn get_resource<T: TypedResource>(&mut self, id: &str) -> NavigatorResult<Option<T>> {
        if let Some(cached) = self.cache.get::<T>(id) {
            tracing::trace!(repository = %self.repository, resource_type = T::RESOURCE_TYPE, id, "Cache hit");
            return Ok(Some(cached));
        }
        match self.fetch(T::RESOURCE_TYPE, id).await? {
            Some(resource) => {
                let reference = format!("{}/{}", T::RESOURCE_TYPE, id);
                typed(resource, &reference).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Untyped read by type name and id, cache first.
    pub async fn get_by_type(&mut self, resource_type: &str, id: &str) -> NavigatorResult<Option<Resource>> {
        if let Some(cached) = self.cache.get_raw(resource_type, id) {
            return Ok(Some(cached.clone()));
        }
        self.fetch(resource_type, id).await
    }

    async fn fetch(&mut self, resource_type: &str, id: &str) -> NavigatorResult<Option<Resource>> {
        let fetched = self.client.get_by_id(resource_type, id).await?;
        if let Some(resource) = &fetched {
            if resource.resource_type() != resource_type {
                return Err(NavigatorError::TypeMismatch {
                    expected: resource_type.to_string(),
                    actual: resource.resource_type().to_string(),
                    reference: format!("{}/{}", resource_type, id),
                });
            }
            self.cache.add(resource.clone());
        }
        Ok(fetched)
    }

    /// Resolve a reference found at `location` to a `T`.
    ///
    /// Contained references (`#id`) are looked up in `parent`. Others are read
    /// cache-first from this repository.
    pub async fn resolve_reference<T: TypedResource>(
        &mut self,
        reference: Option<&str>,
        location: &str,
        parent: Option<&Resource>,
    ) -> NavigatorResult<Option<T>> {
        let parsed = self.resolver.get_required(&self.repository, reference, location)?;

        match parsed.kind() {
            ReferenceKind::Contained | ReferenceKind::Resource => {}
            kind => {
                return Err(NavigatorError::UnresolvableReference(format!(
                    "{}: {} reference '{}' cannot be read as a resource",
                    location, kind, parsed.original
                )))
            }
        }
        if let Some(root) = &parsed.remote_root {
            return Err(NavigatorError::UnresolvableReference(format!(
                "{}: '{}' points to another server ({})",
                location, parsed.original, root
            )));
        }
        if parsed.is_compartment() || parsed.is_form_data_search {
            return Err(NavigatorError::UnresolvableReference(format!(
                "{}: '{}' is not a single resource",
                location, parsed.original
            )));
        }

        let Some(id) = parsed.resource_id.clone() else {
            return Err(NavigatorError::UnresolvableReference(format!(
                "{}: unable to locate a resource id in '{}'",
                location, parsed.original
            )));
        };

        if let Some(name) = &parsed.resource_name {
            if name != T::RESOURCE_TYPE {
                return Err(NavigatorError::TypeMismatch {
                    expected: T::RESOURCE_TYPE.to_string(),
                    actual: name.clone(),
                    reference: parsed.original.clone(),
                });
            }
        }

        if parsed.is_contained {
            return resolve_contained(&parsed, &id, location, parent);
        }

        self.get_resource::<T>(&id).await
    }

    /// Create a resource. Returns what the server stored.
    pub async fn create_resource<T: TypedResource>(&self, resource: &T) -> NavigatorResult<T> {
        let created = self.client.create(resource.as_resource()).await?;
        typed(created, T::RESOURCE_TYPE)
    }

    /// Update a resource, conditional on its version when `version_aware`.
    pub async fn update_resource<T: TypedResource>(&self, resource: &T, version_aware: bool) -> NavigatorResult<T> {
        let updated = self.client.update(resource.as_resource(), version_aware).await?;
        let reference = resource
            .as_resource()
            .relative_reference()
            .unwrap_or_else(|| T::RESOURCE_TYPE.to_string());
        typed(updated, &reference)
    }

    pub async fn delete_resource<T: TypedResource>(&self, id: &str) -> NavigatorResult<()> {
        self.client.delete(T::RESOURCE_TYPE, id).await
    }

    /// Submit a `transaction` bundle. Any other bundle type is rejected unsent.
    pub async fn submit_transaction(&self, bundle: &Bundle) -> NavigatorResult<Bundle> {
        if bundle.bundle_type != BundleType::Transaction {
            return Err(NavigatorError::InvalidBundle(format!(
                "Bundle.type must be transaction, found {:?}",
                bundle.bundle_type
            )));
        }
        self.client.submit_transaction(bundle).await
    }
}

fn resolve_contained<T: TypedResource>(
    parsed: &ParsedReference,
    id: &str,
    location: &str,
    parent: Option<&Resource>,
) -> NavigatorResult<Option<T>> {
    let parent = parent.ok_or_else(|| {
        NavigatorError::ContainedReference(format!(
            "{}: '{}' is contained but no parent resource was provided",
            location, parsed.original
        ))
    })?;

    if !is_container_capable(parent.resource_type()) {
        return Err(NavigatorError::ContainedReference(format!(
            "{}: '{}' is contained but a {} cannot hold contained resources",
            location,
            parsed.original,
            parent.resource_type()
        )));
    }

    let contained = parent.contained();
    if contained.is_empty() {
        return Err(NavigatorError::ContainedReference(format!(
            "{}: '{}' is contained but the parent {} has no contained resources",
            location, parsed.original, parent
        )));
    }

    let Some(found) = contained.into_iter().find(|r| r.id() == Some(id)) else {
        tracing::debug!(location, reference = %parsed.original, "Contained resource not present in parent");
        return Ok(None);
    };

    typed(found, &parsed.original).map(Some)
}

fn typed<T: TypedResource>(resource: Resource, reference: &str) -> NavigatorResult<T> {
    let actual = resource.resource_type().to_string();
    T::from_resource(resource).ok_or_else(|| NavigatorError::TypeMismatch {
        expected: T::RESOURCE_TYPE.to_string(),
        actual,
        reference: reference.to_string(),
    })
}
