//! Opaque resource model.
//!
//! # Responsibilities
//! - Hold any resource as a JSON object tagged with its `resourceType`
//! - Expose the few fields the navigator needs (id, version, contained)
//! - Convert to typed wrappers with a checked tag comparison
//!
//! # Design Decisions
//! - No schema validation; the server owns resource correctness
//! - A typed read of the wrong type yields `None`, never an error

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NavigatorError, NavigatorResult};

/// Any resource, as received from or sent to a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Resource {
    resource_type: String,
    body: Map<String, Value>,
}

impl Resource {
    /// Wrap a JSON value. It must be an object with a non-empty `resourceType`.
    pub fn from_value(value: Value) -> NavigatorResult<Self> {
        let Value::Object(body) = value else {
            return Err(NavigatorError::InvalidResource(
                "a resource must be a JSON object".into(),
            ));
        };
        let resource_type = body
            .get("resourceType")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NavigatorError::InvalidResource("missing resourceType".into()))?
            .to_string();
        Ok(Self { resource_type, body })
    }

    /// Parse from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> NavigatorResult<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// A new resource containing only `resourceType`.
    pub fn new(resource_type: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        let mut body = Map::new();
        body.insert("resourceType".into(), Value::String(resource_type.clone()));
        Self { resource_type, body }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn id(&self) -> Option<&str> {
        self.body.get("id").and_then(Value::as_str).filter(|id| !id.is_empty())
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.body.insert("id".into(), Value::String(id.into()));
    }

    /// `meta.versionId`, if present.
    pub fn version_id(&self) -> Option<&str> {
        self.body
            .get("meta")?
            .get("versionId")?
            .as_str()
            .filter(|v| !v.is_empty())
    }

    /// Top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// Set a top-level field. `resourceType` cannot be changed.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        if field != "resourceType" {
            self.body.insert(field, value);
        }
    }

    /// Resources in the `contained` list. Entries that are not resources are skipped.
    pub fn contained(&self) -> Vec<Resource> {
        match self.body.get("contained") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| Resource::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// `Type/id`, when the resource has an id.
    pub fn relative_reference(&self) -> Option<String> {
        self.id().map(|id| format!("{}/{}", self.resource_type, id))
    }

    pub fn as_json(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }

    pub fn to_bytes(&self) -> NavigatorResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.body)?)
    }

    /// Checked conversion to a typed wrapper.
    pub fn into_typed<T: TypedResource>(self) -> Option<T> {
        T::from_resource(self)
    }
}

impl TryFrom<Value> for Resource {
    type Error = NavigatorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Resource::from_value(value)
    }
}

impl From<Resource> for Value {
    fn from(resource: Resource) -> Self {
        resource.into_value()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "{}/{}", self.resource_type, id),
            None => write!(f, "{} (no id)", self.resource_type),
        }
    }
}

/// A resource wrapper bound to one resource type.
pub trait TypedResource: Sized + Send + Sync + 'static {
    const RESOURCE_TYPE: &'static str;

    /// Wrap `resource` if its type tag matches, otherwise `None`.
    fn from_resource(resource: Resource) -> Option<Self>;

    fn as_resource(&self) -> &Resource;

    fn into_resource(self) -> Resource;
}

macro_rules! typed_resources {
    ($($name:ident),+ $(,)?) => {
        $(
            #[doc = concat!("A `", stringify!($name), "` resource.")]
            #[derive(Debug, Clone, PartialEq)]
            pub struct $name(Resource);

            impl $name {
                pub fn new() -> Self {
                    Self(Resource::new(Self::RESOURCE_TYPE))
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl TypedResource for $name {
                const RESOURCE_TYPE: &'static str = stringify!($name);

                fn from_resource(resource: Resource) -> Option<Self> {
                    (resource.resource_type() == Self::RESOURCE_TYPE).then(|| Self(resource))
                }

                fn as_resource(&self) -> &Resource {
                    &self.0
                }

                fn into_resource(self) -> Resource {
                    self.0
                }
            }

            impl Deref for $name {
                type Target = Resource;

                fn deref(&self) -> &Resource {
                    &self.0
                }
            }

            impl std::ops::DerefMut for $name {
                fn deref_mut(&mut self) -> &mut Resource {
                    &mut self.0
                }
            }

            impl From<$name> for Resource {
                fn from(typed: $name) -> Resource {
                    typed.0
                }
            }
        )+
    };
}

typed_resources!(
    Patient,
    Practitioner,
    PractitionerRole,
    Organization,
    Location,
    Encounter,
    Observation,
    Condition,
    ServiceRequest,
    DiagnosticReport,
    Specimen,
    Task,
    Group,
    CapabilityStatement,
    OperationOutcome,
    Medication,
);
