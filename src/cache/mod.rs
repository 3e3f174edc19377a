//! Per-session resource cache.
//!
//! # Responsibilities
//! - Keep the most recently seen resource per (type, id)
//! - Absorb whole bundles, skipping entries without a body
//! - Typed reads with a checked type tag
//!
//! # Design Decisions
//! - Last write wins; versions are not compared
//! - No eviction; callers clear between units of work
//! - Owned by one session, so no interior locking
//! - Missing or mismatched entries read as absent, never as errors

use std::collections::HashMap;

use crate::model::{Bundle, Resource, TypedResource};
use crate::observability::metrics;

/// Map from type name to id to resource.
#[derive(Debug, Clone, Default)]
pub struct ResourceCache {
    resources: HashMap<String, HashMap<String, Resource>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `resource`, replacing any previous value with the same type and id.
    ///
    /// Returns false (and stores nothing) if the resource has no id.
    pub fn add(&mut self, resource: Resource) -> bool {
        let Some(id) = resource.id().map(str::to_string) else {
            tracing::debug!(resource_type = %resource.resource_type(), "Skipping resource without id");
            return false;
        };
        self.resources
            .entry(resource.resource_type().to_string())
            .or_default()
            .insert(id, resource);
        metrics::record_cache_size(self.count());
        true
    }

    /// Add every entry of `bundle` that carries a resource. Returns the number added.
    pub fn add_bundle(&mut self, bundle: &Bundle) -> usize {
        self.extend(bundle.resources().cloned())
    }

    /// Add every resource of a collection. Returns the number added.
    pub fn extend(&mut self, resources: impl IntoIterator<Item = Resource>) -> usize {
        let mut added = 0;
        for resource in resources {
            if self.add(resource) {
                added += 1;
            }
        }
        added
    }

    /// Typed read. A stored resource of another type reads as absent.
    pub fn get<T: TypedResource>(&self, id: &str) -> Option<T> {
        self.get_raw(T::RESOURCE_TYPE, id)
            .cloned()
            .and_then(T::from_resource)
    }

    /// Untyped read by type name and id.
    pub fn get_raw(&self, resource_type: &str, id: &str) -> Option<&Resource> {
        self.resources.get(resource_type)?.get(id)
    }

    /// Every cached resource of type `T`.
    pub fn get_list<T: TypedResource>(&self) -> Vec<T> {
        self.resources
            .get(T::RESOURCE_TYPE)
            .map(|by_id| by_id.values().cloned().filter_map(T::from_resource).collect())
            .unwrap_or_default()
    }

    pub fn contains<T: TypedResource>(&self, id: &str) -> bool {
        self.get_raw(T::RESOURCE_TYPE, id).is_some()
    }

    /// Remove one resource. Returns true if it was cached.
    pub fn remove<T: TypedResource>(&mut self, id: &str) -> bool {
        self.remove_raw(T::RESOURCE_TYPE, id)
    }

    pub fn remove_raw(&mut self, resource_type: &str, id: &str) -> bool {
        let removed = self
            .resources
            .get_mut(resource_type)
            .is_some_and(|by_id| by_id.remove(id).is_some());
        if removed {
            metrics::record_cache_size(self.count());
        }
        removed
    }

    /// Total resources across all types.
    pub fn count(&self) -> usize {
        self.resources.values().map(HashMap::len).sum()
    }

    pub fn count_of<T: TypedResource>(&self) -> usize {
        self.count_of_type(T::RESOURCE_TYPE)
    }

    pub fn count_of_type(&self, resource_type: &str) -> usize {
        self.resources.get(resource_type).map_or(0, HashMap::len)
    }

    /// Type names with at least one cached resource, sorted.
    pub fn resource_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .resources
            .iter()
            .filter(|(_, by_id)| !by_id.is_empty())
            .map(|(t, _)| t.as_str())
            .collect();
        types.sort_unstable();
        types
    }

    pub fn clear(&mut self) {
        self.resources.clear();
        metrics::record_cache_size(0);
    }

    pub fn clear_of<T: TypedResource>(&mut self) {
        self.resources.remove(T::RESOURCE_TYPE);
        metrics::record_cache_size(self.count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BundleType, Organization, Patient};
    use serde_json::json;

    fn resource(resource_type: &str, id: &str, name: &str) -> Resource {
        Resource::from_value(json!({"resourceType": resource_type, "id": id, "name": name})).unwrap()
    }

    #[test]
    fn test_add_then_get() {
        let mut cache = ResourceCache::new();
        assert!(cache.add(resource("Patient", "1", "a")));

        let patient: Patient = cache.get("1").unwrap();
        assert_eq!(patient.get("name"), Some(&json!("a")));
        assert!(cache.get::<Organization>("1").is_none());
        assert!(cache.get::<Patient>("2").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let mut cache = ResourceCache::new();
        cache.add(resource("Patient", "1", "first"));
        cache.add(resource("Patient", "1", "second"));

        assert_eq!(cache.count_of::<Patient>(), 1);
        let patient: Patient = cache.get("1").unwrap();
        assert_eq!(patient.get("name"), Some(&json!("second")));
    }

    #[test]
    fn test_resource_without_id_skipped() {
        let mut cache = ResourceCache::new();
        assert!(!cache.add(Resource::new("Patient")));
        assert_eq!(cache.count(), 0);
    }

    #[test]
    fn test_add_bundle_skips_entries_without_resource() {
        let bundle: Bundle = serde_json::from_value(json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "1"}},
                {"fullUrl": "http://x/fhir/Patient/2"},
                {"resource": {"resourceType": "Organization", "id": "o1"}}
            ]
        }))
        .unwrap();

        let mut cache = ResourceCache::new();
        assert_eq!(cache.add_bundle(&bundle), 2);
        assert_eq!(cache.count(), 2);
        assert_eq!(cache.resource_types(), vec!["Organization", "Patient"]);
    }

    #[test]
    fn test_get_list_and_counts() {
        let mut cache = ResourceCache::new();
        cache.extend([
            resource("Patient", "1", "a"),
            resource("Patient", "2", "b"),
            resource("Organization", "o1", "org"),
        ]);

        let mut ids: Vec<_> = cache
            .get_list::<Patient>()
            .iter()
            .map(|p| p.id().unwrap().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(cache.count(), 3);
        assert_eq!(cache.count_of::<Organization>(), 1);
        assert!(cache.get_list::<crate::model::Task>().is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cache = ResourceCache::new();
        cache.extend([resource("Patient", "1", "a"), resource("Organization", "o1", "org")]);

        assert!(cache.remove::<Patient>("1"));
        assert!(!cache.remove::<Patient>("1"));
        assert!(!cache.contains::<Patient>("1"));

        cache.add(resource("Patient", "2", "b"));
        cache.clear_of::<Patient>();
        assert_eq!(cache.count(), 1);

        cache.clear();
        assert_eq!(cache.count(), 0);
        let empty = Bundle::new(BundleType::Collection);
        assert_eq!(cache.add_bundle(&empty), 0);
    }
}
