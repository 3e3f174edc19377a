//! Structured form of a resource reference.

use std::fmt;

/// Namespace of a `urn:` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrnKind {
    Uuid,
    Oid,
}

/// A validated `urn:uuid:` or `urn:oid:` literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urn {
    pub kind: UrnKind,
    /// Full literal, e.g. `urn:uuid:...`.
    pub value: String,
}

/// Where an `$operation` applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationScope {
    #[default]
    None,
    /// `[base]/$op`
    Base,
    /// `[base]/Type/$op`
    Resource,
    /// `[base]/Type/id/$op`
    Instance,
}

/// An `$operation` segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub scope: OperationScope,
    /// Name without the leading `$`.
    pub name: String,
}

/// The single terminal classification of a parsed reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Contained,
    Urn,
    Metadata,
    Operation,
    /// Type, instance, history, compartment or search reference.
    Resource,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Contained => "contained",
            ReferenceKind::Urn => "urn",
            ReferenceKind::Metadata => "metadata",
            ReferenceKind::Operation => "operation",
            ReferenceKind::Resource => "resource",
        };
        f.write_str(name)
    }
}

/// Result of parsing a reference string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReference {
    /// URL-decoded input.
    pub original: String,
    /// Canonical resource type name.
    pub resource_name: Option<String>,
    pub resource_id: Option<String>,
    /// Version after `_history/`.
    pub version_id: Option<String>,
    /// Version after `|` on canonical references.
    pub canonical_version: Option<String>,
    pub is_contained: bool,
    pub urn: Option<Urn>,
    /// Resource type scoped under the compartment `resource_name/resource_id`.
    pub compartment: Option<String>,
    pub operation: Option<Operation>,
    pub is_relative_to_server: bool,
    pub is_history: bool,
    pub is_metadata: bool,
    /// `Type/_search` with parameters in the body.
    pub is_form_data_search: bool,
    /// Everything after `?`, verbatim.
    pub query: Option<String>,
    /// Service root of a reference to another server.
    pub remote_root: Option<String>,
}

impl ParsedReference {
    pub(crate) fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        if self.is_contained {
            ReferenceKind::Contained
        } else if self.urn.is_some() {
            ReferenceKind::Urn
        } else if self.is_metadata {
            ReferenceKind::Metadata
        } else if self.operation.is_some() {
            ReferenceKind::Operation
        } else {
            ReferenceKind::Resource
        }
    }

    pub fn is_compartment(&self) -> bool {
        self.compartment.is_some()
    }

    pub fn operation_scope(&self) -> OperationScope {
        self.operation.as_ref().map_or(OperationScope::None, |op| op.scope)
    }

    /// `Type/id` when both parts are known.
    pub fn relative_reference(&self) -> Option<String> {
        match (&self.resource_name, &self.resource_id) {
            (Some(name), Some(id)) => Some(format!("{}/{}", name, id)),
            _ => None,
        }
    }
}

impl fmt::Display for ParsedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind={}", self.kind())?;
        if let Some(root) = &self.remote_root {
            write!(f, " remote_root={}", root)?;
        }
        if let Some(name) = &self.resource_name {
            write!(f, " type={}", name)?;
        }
        if let Some(id) = &self.resource_id {
            write!(f, " id={}", id)?;
        }
        if let Some(v) = &self.version_id {
            write!(f, " version={}", v)?;
        }
        if let Some(v) = &self.canonical_version {
            write!(f, " canonical_version={}", v)?;
        }
        if let Some(c) = &self.compartment {
            write!(f, " compartment={}", c)?;
        }
        if let Some(op) = &self.operation {
            write!(f, " operation=${} ({:?})", op.name, op.scope)?;
        }
        if let Some(urn) = &self.urn {
            write!(f, " urn={}", urn.value)?;
        }
        if let Some(q) = &self.query {
            write!(f, " query={}", q)?;
        }
        write!(f, " relative_to_server={}", self.is_relative_to_server)
    }
}
