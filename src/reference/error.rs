//! Reference parse errors.

use thiserror::Error;

/// Why a reference string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("resource reference is blank")]
    Blank,

    #[error("no repository configured with code '{0}'")]
    UnknownRepository(String),

    #[error("unknown resource type '{name}': {hint}")]
    UnknownResourceType { name: String, hint: String },

    #[error("the urn:{namespace} value given is not valid: {value}")]
    InvalidUrn { namespace: &'static str, value: String },

    #[error("only urn:uuid and urn:oid references are supported, found: {0}")]
    UnsupportedUrn(String),

    #[error("unsupported scheme '{scheme}' in reference '{reference}'")]
    UnsupportedScheme { scheme: String, reference: String },

    #[error("'{0}' is not a valid URL")]
    InvalidUrl(String),

    #[error("the URL has no resource, metadata, _history or $operation segment: {0}")]
    NoResourceSegment(String),

    #[error("the reference has extra unknown content near the end: '{content}'. The full reference was: '{reference}'")]
    UnexpectedContent { content: String, reference: String },

    #[error("{location}: resource reference parse failure. {source}")]
    Located {
        location: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Attach the place the reference came from, e.g. `Encounter.subject`.
    pub fn at(self, location: &str) -> Self {
        if location.trim().is_empty() {
            return self;
        }
        ParseError::Located {
            location: location.to_string(),
            source: Box::new(self),
        }
    }

    /// The underlying error, without location wrappers.
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::Located { source, .. } => source.root(),
            other => other,
        }
    }
}
