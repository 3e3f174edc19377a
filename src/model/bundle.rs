//! Bundles: search pages, transactions and collections.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NavigatorError, NavigatorResult};
use crate::model::resource::Resource;

/// `Bundle.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    History,
    Searchset,
    Collection,
}

/// A navigation link such as `next` or `self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

/// One bundle entry. The resource body is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,

    /// `search`, `request`, `response` and anything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BundleEntry {
    pub fn with_resource(resource: Resource) -> Self {
        Self {
            full_url: None,
            resource: Some(resource),
            extra: Map::new(),
        }
    }
}

fn bundle_resource_type() -> String {
    "Bundle".to_string()
}

/// A bundle of resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default = "bundle_resource_type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    /// Server-reported match count (search sets only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<BundleLink>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bundle {
    /// Empty bundle of the given type.
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            resource_type: bundle_resource_type(),
            id: None,
            bundle_type,
            total: None,
            link: Vec::new(),
            entry: Vec::new(),
            identifier: None,
            timestamp: None,
            signature: None,
            extra: Map::new(),
        }
    }

    /// Parse from JSON bytes; the body must be a `Bundle`.
    pub fn from_slice(bytes: &[u8]) -> NavigatorResult<Self> {
        let bundle: Bundle = serde_json::from_slice(bytes)
            .map_err(|e| NavigatorError::InvalidBundle(e.to_string()))?;
        bundle.checked()
    }

    /// Convert a generic resource into a bundle.
    pub fn from_resource(resource: Resource) -> NavigatorResult<Self> {
        let bundle: Bundle = serde_json::from_value(resource.into_value())
            .map_err(|e| NavigatorError::InvalidBundle(e.to_string()))?;
        bundle.checked()
    }

    fn checked(self) -> NavigatorResult<Self> {
        if self.resource_type != "Bundle" {
            return Err(NavigatorError::InvalidBundle(format!(
                "expected resourceType Bundle, found {}",
                self.resource_type
            )));
        }
        Ok(self)
    }

    pub fn to_bytes(&self) -> NavigatorResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Add an entry holding `resource`.
    pub fn push(&mut self, resource: Resource) {
        self.entry.push(BundleEntry::with_resource(resource));
    }

    /// URL of the link with the given relation.
    pub fn link(&self, relation: &str) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation == relation)
            .map(|l| l.url.as_str())
            .filter(|url| !url.is_empty())
    }

    pub fn next_link(&self) -> Option<&str> {
        self.link("next")
    }

    pub fn previous_link(&self) -> Option<&str> {
        self.link("previous").or_else(|| self.link("prev"))
    }

    pub fn first_link(&self) -> Option<&str> {
        self.link("first")
    }

    pub fn last_link(&self) -> Option<&str> {
        self.link("last")
    }

    pub fn self_link(&self) -> Option<&str> {
        self.link("self")
    }

    /// Entries that carry a resource body.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|e| e.resource.as_ref())
    }

    pub fn into_resources(self) -> impl Iterator<Item = Resource> {
        self.entry.into_iter().filter_map(|e| e.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn searchset() -> Value {
        json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "total": 3,
            "link": [
                {"relation": "self", "url": "http://x/fhir/Patient?name=a"},
                {"relation": "next", "url": "http://x/fhir?_getpages=abc&_offset=2"}
            ],
            "entry": [
                {"fullUrl": "http://x/fhir/Patient/1", "resource": {"resourceType": "Patient", "id": "1"}, "search": {"mode": "match"}},
                {"fullUrl": "http://x/fhir/Patient/2"},
                {"resource": {"resourceType": "Organization", "id": "o1"}}
            ],
            "meta": {"lastUpdated": "2024-01-01T00:00:00Z"}
        })
    }

    #[test]
    fn test_parse_searchset() {
        let bundle = Bundle::from_slice(searchset().to_string().as_bytes()).unwrap();
        assert_eq!(bundle.bundle_type, BundleType::Searchset);
        assert_eq!(bundle.total, Some(3));
        assert_eq!(bundle.next_link(), Some("http://x/fhir?_getpages=abc&_offset=2"));
        assert_eq!(bundle.self_link(), Some("http://x/fhir/Patient?name=a"));
        assert_eq!(bundle.previous_link(), None);
        assert_eq!(bundle.resources().count(), 2);
        assert!(bundle.entry[0].extra.contains_key("search"));
        assert!(bundle.extra.contains_key("meta"));
    }

    #[test]
    fn test_round_trip_keeps_unknown_fields() {
        let bundle: Bundle = serde_json::from_value(searchset()).unwrap();
        assert_eq!(serde_json::to_value(&bundle).unwrap(), searchset());
    }

    #[test]
    fn test_non_bundle_rejected() {
        let patient = Resource::from_value(json!({"resourceType": "Patient", "type": "searchset"})).unwrap();
        assert!(matches!(
            Bundle::from_resource(patient),
            Err(NavigatorError::InvalidBundle(_))
        ));
    }

    #[test]
    fn test_transaction_type_names() {
        let bundle = Bundle::new(BundleType::TransactionResponse);
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["type"], "transaction-response");
        assert_eq!(value["resourceType"], "Bundle");
    }
}
