//! Reference parsing.
//!
//! # Responsibilities
//! - Parse relative, absolute, contained, canonical and urn references
//! - Recognise references to the configured repository by base URL
//! - Explain unknown resource type names
//!
//! # Design Decisions
//! - A pipeline of pure stages: query split → root → relative segment → id/version/compartment
//! - Each stage takes the result so far plus the unconsumed remainder and
//!   returns both, or a terminal error
//! - Contained, metadata, urn and operation references close the pipeline;
//!   anything left over afterwards is an error

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::config::NavigatorConfig;
use crate::error::{NavigatorError, NavigatorResult};
use crate::reference::error::ParseError;
use crate::reference::parsed::{Operation, OperationScope, ParsedReference, Urn, UrnKind};
use crate::reference::resource_types::canonical_resource_type;

const METADATA: &str = "metadata";
const HISTORY: &str = "_history";
const SEARCH: &str = "_search";

/// Unconsumed input after a stage.
enum Remainder<'a> {
    /// Later stages may consume it.
    Open(&'a str),
    /// Parsing is finished; must be empty.
    Closed(&'a str),
}

type StageResult<T> = Result<(ParsedReference, T), ParseError>;

/// Host, port and path of a repository base URL.
#[derive(Debug, Clone)]
struct ServiceRoot {
    host: String,
    port: Option<u16>,
    /// Without trailing slash, e.g. `/fhir` (empty for a root base).
    path: String,
}

impl ServiceRoot {
    fn from_url(base: &Url) -> Option<Self> {
        Some(Self {
            host: base.host_str()?.to_ascii_lowercase(),
            port: base.port(),
            path: base.path().trim_end_matches('/').to_string(),
        })
    }

    /// Authority must be equal and the path must sit under the base path.
    /// The scheme is not compared.
    fn matches(&self, url: &Url, path: &str) -> bool {
        let same_authority = url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
            && url.port() == self.port;
        let under_base = self.path.is_empty()
            || path == self.path
            || path
                .strip_prefix(self.path.as_str())
                .is_some_and(|rest| rest.starts_with('/'));
        same_authority && under_base
    }
}

/// Parses reference strings against configured repositories.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    roots: HashMap<String, ServiceRoot>,
}

impl ReferenceResolver {
    /// Build from the repository set. Every base URL must have a host.
    pub fn new(config: &NavigatorConfig) -> NavigatorResult<Self> {
        let mut roots = HashMap::with_capacity(config.repositories.len());
        for repo in &config.repositories {
            let root = Url::parse(&repo.base_url)
                .ok()
                .and_then(|url| ServiceRoot::from_url(&url))
                .ok_or_else(|| {
                    NavigatorError::Configuration(format!(
                        "repository '{}' has an unusable base URL '{}'",
                        repo.code, repo.base_url
                    ))
                })?;
            roots.insert(repo.code.clone(), root);
        }
        Ok(Self { roots })
    }

    /// Parse `reference` relative to the repository `repository_code`.
    pub fn parse(&self, repository_code: &str, reference: &str) -> Result<ParsedReference, ParseError> {
        let root = self
            .roots
            .get(repository_code)
            .ok_or_else(|| ParseError::UnknownRepository(repository_code.to_string()))?;

        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Blank);
        }

        let decoded = urlencoding::decode(trimmed)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| trimmed.to_string());

        let result = run_stages(root, &decoded);
        if let Err(e) = &result {
            tracing::debug!(
                repository = %repository_code,
                reference = %decoded,
                error = %e,
                "Reference parse failure"
            );
        }
        result
    }

    /// Parse a reference that must be present and valid.
    ///
    /// `location` names where the reference came from and prefixes any error.
    /// A blank or unconfigured repository code is a configuration error.
    pub fn get_required(
        &self,
        repository_code: &str,
        reference: Option<&str>,
        location: &str,
    ) -> NavigatorResult<ParsedReference> {
        if repository_code.trim().is_empty() {
            return Err(NavigatorError::Configuration(
                "a repository code is required".to_string(),
            ));
        }
        if !self.roots.contains_key(repository_code) {
            return Err(NavigatorError::Configuration(format!(
                "no repository is configured with code '{}'",
                repository_code
            )));
        }
        let reference = reference
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ParseError::Blank.at(location))?;
        self.parse(repository_code, reference)
            .map_err(|e| NavigatorError::Parse(e.at(location)))
    }
}

fn run_stages(root: &ServiceRoot, decoded: &str) -> Result<ParsedReference, ParseError> {
    let parsed = ParsedReference::new(decoded);

    let (parsed, path) = split_query(parsed, decoded);
    let (parsed, rest) = resolve_root(root, parsed, path)?;
    let (parsed, rest) = match rest {
        Remainder::Open(rest) => resolve_relative(parsed, rest, path.contains('/'))?,
        closed => (parsed, closed),
    };
    let (parsed, leftover) = match rest {
        Remainder::Open(rest) => resolve_instance(parsed, rest)?,
        Remainder::Closed(rest) => (parsed, rest),
    };

    if !leftover.is_empty() {
        return Err(ParseError::UnexpectedContent {
            content: leftover.to_string(),
            reference: decoded.to_string(),
        });
    }
    Ok(parsed)
}

/// Capture everything after `?` verbatim.
fn split_query(mut parsed: ParsedReference, input: &str) -> (ParsedReference, &str) {
    match input.split_once('?') {
        Some((path, query)) => {
            parsed.query = Some(query.to_string());
            (parsed, path)
        }
        None => (parsed, input),
    }
}

/// Classify the root and strip it.
fn resolve_root<'a>(
    root: &ServiceRoot,
    mut parsed: ParsedReference,
    input: &'a str,
) -> StageResult<Remainder<'a>> {
    if starts_with_ignore_case(input, "urn:") {
        return resolve_urn(parsed, input);
    }

    let Some((scheme, after_scheme)) = split_scheme(input) else {
        parsed.is_relative_to_server = true;
        let relative = input.strip_prefix('/').unwrap_or(input);
        return Ok((parsed, Remainder::Open(relative)));
    };

    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(ParseError::UnsupportedScheme {
            scheme: scheme.to_string(),
            reference: input.to_string(),
        });
    }

    let url = Url::parse(input).map_err(|_| ParseError::InvalidUrl(input.to_string()))?;
    let (authority, path) = match after_scheme.find('/') {
        Some(i) => after_scheme.split_at(i),
        None => (after_scheme, ""),
    };

    if root.matches(&url, path) {
        parsed.is_relative_to_server = true;
        let relative = &path[root.path.len()..];
        return Ok((parsed, Remainder::Open(relative.strip_prefix('/').unwrap_or(relative))));
    }

    // Another server: the root ends before the first recognisable segment.
    let mut offset = 0;
    let mut found = None;
    for segment in path.split('/') {
        if is_root_terminator(segment) {
            found = Some(offset);
            break;
        }
        offset += segment.len() + 1;
    }
    let Some(start) = found else {
        return Err(ParseError::NoResourceSegment(input.to_string()));
    };

    parsed.is_relative_to_server = false;
    parsed.remote_root = Some(format!(
        "{}://{}{}",
        scheme.to_ascii_lowercase(),
        authority,
        path[..start].trim_end_matches('/')
    ));
    Ok((parsed, Remainder::Open(&path[start..])))
}

fn resolve_urn<'a>(mut parsed: ParsedReference, input: &'a str) -> StageResult<Remainder<'a>> {
    let kind = if starts_with_ignore_case(input, "urn:uuid:") {
        let value = &input["urn:uuid:".len()..];
        if value.len() != 36 || Uuid::parse_str(value).is_err() {
            return Err(ParseError::InvalidUrn {
                namespace: "uuid",
                value: input.to_string(),
            });
        }
        UrnKind::Uuid
    } else if starts_with_ignore_case(input, "urn:oid:") {
        if !oid_pattern().is_match(input) {
            return Err(ParseError::InvalidUrn {
                namespace: "oid",
                value: input.to_string(),
            });
        }
        UrnKind::Oid
    } else {
        return Err(ParseError::UnsupportedUrn(input.to_string()));
    };

    parsed.is_relative_to_server = false;
    parsed.urn = Some(Urn {
        kind,
        value: input.to_string(),
    });
    Ok((parsed, Remainder::Closed("")))
}

/// First segment: base operation, contained id, metadata, history or type name.
fn resolve_relative<'a>(
    mut parsed: ParsedReference,
    input: &'a str,
    has_slash: bool,
) -> StageResult<Remainder<'a>> {
    if input.is_empty() {
        return Ok((parsed, Remainder::Open(input)));
    }

    let (segment, tail) = split_segment(input);

    if let Some(name) = segment.strip_prefix('$') {
        parsed.operation = Some(Operation {
            scope: OperationScope::Base,
            name: name.to_string(),
        });
        return Ok((parsed, Remainder::Closed(tail)));
    }

    if let Some(id) = segment.strip_prefix('#') {
        parsed = contained(parsed, id, input)?;
        return Ok((parsed, Remainder::Closed(tail)));
    }

    if segment.eq_ignore_ascii_case(METADATA) {
        parsed.is_metadata = true;
        return Ok((parsed, Remainder::Closed(tail)));
    }

    if segment.eq_ignore_ascii_case(HISTORY) {
        parsed.is_history = true;
        return Ok((parsed, Remainder::Closed(tail)));
    }

    if has_slash {
        return match known_type(segment) {
            Some(name) => {
                parsed.resource_name = Some(name.to_string());
                Ok((parsed, Remainder::Open(tail)))
            }
            None => Err(unknown_type_error(segment)),
        };
    }

    // A single bare token: a type name, or an id handled downstream.
    match known_type(segment) {
        Some(name) => {
            parsed.resource_name = Some(name.to_string());
            Ok((parsed, Remainder::Open("")))
        }
        None => Ok((parsed, Remainder::Open(input))),
    }
}

/// Id (with optional canonical version), then history version,
/// instance operation or compartment.
fn resolve_instance(mut parsed: ParsedReference, input: &str) -> StageResult<&str> {
    if input.is_empty() {
        return Ok((parsed, input));
    }

    let (first, tail) = split_segment(input);
    if first.is_empty() {
        return Ok((parsed, input));
    }

    if let Some(id) = first.strip_prefix('#') {
        return Ok((contained(parsed, id, input)?, tail));
    }

    if first.eq_ignore_ascii_case(SEARCH) {
        // Parameters travel in the body, so nothing may follow.
        parsed.is_form_data_search = true;
        return Ok((parsed, tail));
    }

    if let Some(name) = first.strip_prefix('$') {
        parsed.operation = Some(Operation {
            scope: OperationScope::Resource,
            name: name.to_string(),
        });
        return Ok((parsed, tail));
    }

    match first.split_once('|') {
        Some((id, version)) => {
            parsed.resource_id = Some(id.to_string());
            parsed.canonical_version = Some(version.to_string());
        }
        None => parsed.resource_id = Some(first.to_string()),
    }
    if parsed.resource_name.is_none() {
        parsed.is_relative_to_server = false;
    }

    if tail.is_empty() {
        return Ok((parsed, tail));
    }

    let (segment, next) = split_segment(tail);

    if let Some(name) = segment.strip_prefix('$') {
        parsed.operation = Some(Operation {
            scope: OperationScope::Instance,
            name: name.to_string(),
        });
        return Ok((parsed, next));
    }

    if segment.eq_ignore_ascii_case(HISTORY) {
        parsed.is_history = true;
        if next.is_empty() {
            return Ok((parsed, next));
        }
        let (version, after) = split_segment(next);
        parsed.version_id = Some(version.to_string());
        return Ok((parsed, after));
    }

    if let Some(name) = known_type(segment) {
        parsed.compartment = Some(name.to_string());
        return Ok((parsed, next));
    }

    Ok((parsed, tail))
}

fn contained(mut parsed: ParsedReference, id: &str, input: &str) -> Result<ParsedReference, ParseError> {
    if id.is_empty() {
        return Err(ParseError::UnexpectedContent {
            content: input.to_string(),
            reference: parsed.original,
        });
    }
    parsed.is_contained = true;
    parsed.is_relative_to_server = false;
    parsed.resource_id = Some(id.to_string());
    Ok(parsed)
}

/// `("Patient", "123/_history/2")` from `"Patient/123/_history/2"`.
fn split_segment(input: &str) -> (&str, &str) {
    input.split_once('/').unwrap_or((input, ""))
}

/// `Some(("https", "host/path"))` for `https://host/path`.
fn split_scheme(input: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = input.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}

fn is_root_terminator(segment: &str) -> bool {
    segment.starts_with('$')
        || segment.eq_ignore_ascii_case(METADATA)
        || segment.eq_ignore_ascii_case(HISTORY)
        || known_type(segment).is_some()
}

/// Canonical type name for a segment that starts with a capital letter.
fn known_type(segment: &str) -> Option<&'static str> {
    if segment.starts_with(|c: char| c.is_ascii_uppercase()) {
        canonical_resource_type(segment)
    } else {
        None
    }
}

fn unknown_type_error(name: &str) -> ParseError {
    let hint = if name.eq_ignore_ascii_case("conformance") {
        "not supported in FHIR R4; the server's conformance statement is the \
         'CapabilityStatement' resource, available from [base]/metadata"
            .to_string()
    } else if name.starts_with(|c: char| c.is_ascii_lowercase()) {
        match canonical_resource_type(name) {
            Some(canonical) => format!(
                "resource and compartment names must begin with a capital letter, e.g. ({})",
                canonical
            ),
            None => "not a resource type supported by FHIR R4".to_string(),
        }
    } else {
        "not a resource type supported by FHIR R4; resource names are case sensitive".to_string()
    };
    ParseError::UnknownResourceType {
        name: name.to_string(),
        hint,
    }
}

fn starts_with_ignore_case(input: &str, prefix: &str) -> bool {
    input
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn oid_pattern() -> &'static Regex {
    static OID: OnceLock<Regex> = OnceLock::new();
    OID.get_or_init(|| {
        Regex::new(r"^(?i:urn:oid:)[0-2](\.(0|[1-9][0-9]*))+$").expect("oid regex must compile")
    })
}
