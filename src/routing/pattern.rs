//! Path pattern parsing.
//!
//! # Syntax
//! ```text
//!  /home                literal segments
//!  /exam/:exam_id       named parameter, captures exactly one non-empty segment
//!  /files/*rest         named catch-all, captures the remaining segments
//!  /*                   unnamed catch-all, matches anything, captures nothing
//! ```
//!
//! Empty segments are ignored, so `/home/` and `//home` parse like `/home`.

use std::fmt;

use thiserror::Error;

/// A single `/`-delimited piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
    CatchAll(Option<String>),
}

impl Segment {
    /// Name of the value this segment captures, if any.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Param(name) => Some(name),
            Segment::CatchAll(name) => name.as_deref(),
            Segment::Literal(_) => None,
        }
    }

    /// Returns true if this segment accepts a single path segment.
    /// Catch-alls are handled by the matcher since they span segments.
    pub fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == segment,
            Segment::Param(_) => !segment.is_empty(),
            Segment::CatchAll(_) => true,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(literal) => f.write_str(literal),
            Segment::Param(name) => write!(f, ":{}", name),
            Segment::CatchAll(Some(name)) => write!(f, "*{}", name),
            Segment::CatchAll(None) => f.write_str("*"),
        }
    }
}

/// Errors in pattern syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `:` segment with nothing after it.
    #[error("parameter at segment {index} has no name")]
    UnnamedParam { index: usize },

    /// The same name is captured twice in one pattern.
    #[error("parameter `{0}` is declared more than once")]
    DuplicateParam(String),

    /// A catch-all followed by further segments.
    #[error("catch-all segments are only allowed at the end of a path")]
    CatchAllNotLast,
}

/// An ordered sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a declared path such as `/exam/:exam_id`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(index, raw)| {
                if let Some(name) = raw.strip_prefix(':') {
                    if name.is_empty() {
                        return Err(PatternError::UnnamedParam { index });
                    }
                    Ok(Segment::Param(name.to_string()))
                } else if let Some(name) = raw.strip_prefix('*') {
                    let name = (!name.is_empty()).then(|| name.to_string());
                    Ok(Segment::CatchAll(name))
                } else {
                    Ok(Segment::Literal(raw.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_segments(segments)
    }

    fn from_segments(segments: Vec<Segment>) -> Result<Self, PatternError> {
        if let Some(pos) = segments.iter().position(|s| matches!(s, Segment::CatchAll(_))) {
            if pos + 1 != segments.len() {
                return Err(PatternError::CatchAllNotLast);
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for name in segments.iter().filter_map(Segment::param_name) {
            if seen.contains(&name) {
                return Err(PatternError::DuplicateParam(name.to_string()));
            }
            seen.push(name);
        }

        Ok(Self { segments })
    }

    /// Appends a nested pattern, re-checking the combined pattern.
    pub fn join(&self, child: &PathPattern) -> Result<PathPattern, PatternError> {
        let segments = self
            .segments
            .iter()
            .chain(child.segments.iter())
            .cloned()
            .collect();
        Self::from_segments(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Names captured by this pattern, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::param_name)
    }

    pub fn has_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
