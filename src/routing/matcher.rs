//! Structural path matching.
//!
//! # Responsibilities
//! - Split a requested path into segments (query and fragment removed)
//! - Match a pattern against the front of a segment list
//! - Capture parameter values while matching
//!
//! # Design Decisions
//! - Literal matching is case-sensitive and compares the raw segment
//! - Captured values are percent-decoded, built paths re-encode them
//! - Empty segments are ignored (`/home/` matches `/home`)
//! - No regex, matching is a single linear pass over the pattern

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::routing::pattern::{PathPattern, Segment};

/// Bytes escaped when a value is written into one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Captured values keyed by parameter name.
pub type Params = BTreeMap<String, String>;

/// Splits `path?query#fragment` into the path and the optional query string.
pub fn split_request(request: &str) -> (&str, Option<&str>) {
    let without_fragment = request.split_once('#').map_or(request, |(head, _)| head);
    match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    }
}

/// Splits a path into its non-empty segments.
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Joins segments back into a normalized absolute path.
pub fn join_segments(segments: &[&str]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    segments.iter().fold(String::new(), |mut path, segment| {
        path.push('/');
        path.push_str(segment);
        path
    })
}

/// Parses a query string into key/value pairs. Later duplicates win.
pub fn parse_query(query: Option<&str>) -> Params {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// Percent-decodes one raw path segment. Invalid UTF-8 is replaced.
pub fn decode_segment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Percent-encodes a value so it occupies exactly one path segment.
pub fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Matches `pattern` against the beginning of `segments`.
///
/// On success returns the number of segments consumed and records captures in
/// `params`. A catch-all consumes every remaining segment. On failure `params`
/// may hold partial captures; callers pass a scratch copy.
pub fn match_prefix(pattern: &PathPattern, segments: &[&str], params: &mut Params) -> Option<usize> {
    let mut consumed = 0;

    for segment in pattern.segments() {
        match segment {
            Segment::CatchAll(name) => {
                let rest = &segments[consumed..];
                if let Some(name) = name {
                    let value = rest.iter().map(|s| decode_segment(s)).collect::<Vec<_>>();
                    params.insert(name.clone(), value.join("/"));
                }
                return Some(segments.len());
            }
            _ => {
                let candidate = segments.get(consumed)?;
                if !segment.matches(candidate) {
                    return None;
                }
                if let Segment::Param(name) = segment {
                    params.insert(name.clone(), decode_segment(candidate));
                }
                consumed += 1;
            }
        }
    }

    Some(consumed)
}

/// What a redirect target segment is known to expand to before any request
/// fills it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'a> {
    /// Exactly this text.
    Literal(&'a str),
    /// One non-empty segment of unknown text.
    One,
    /// Zero or more segments of unknown text.
    Many,
}

/// Matches `pattern` against the beginning of `shapes` for every possible
/// expansion of them.
///
/// Returns the number of shapes consumed only when each expansion would match
/// the same way. A literal pattern segment never accepts an unknown value and
/// only a catch-all accepts `Many`.
pub fn match_shape_prefix(pattern: &PathPattern, shapes: &[Shape<'_>]) -> Option<usize> {
    let mut consumed = 0;

    for segment in pattern.segments() {
        let fits = match (segment, shapes.get(consumed)) {
            (Segment::CatchAll(_), _) => return Some(shapes.len()),
            (Segment::Literal(literal), Some(Shape::Literal(text))) => literal.as_str() == *text,
            (Segment::Param(_), Some(Shape::Literal(_) | Shape::One)) => true,
            _ => false,
        };
        if !fits {
            return None;
        }
        consumed += 1;
    }

    Some(consumed)
}
