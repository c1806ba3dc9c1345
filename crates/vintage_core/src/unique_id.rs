//! Segment-based unique identifiers.
//!
//! A [`UniqueId`] is an ordered list of `(kind, value)` segments, rendered as
//! `[engine:junit-vintage]/[runner:com.example.FooTest]/[test:ok(com.example.FooTest)]`.
//! Characters that would break that rendering are percent-encoded inside values, so
//! [`UniqueId::parse`] round-trips anything [`Display`](std::fmt::Display) produces.

use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use thiserror::Error;

/// Characters escaped inside a segment kind or value.
const RESERVED: &AsciiSet = &CONTROLS.add(b'%').add(b'/').add(b':').add(b'[').add(b']');

/// Errors produced while parsing a rendered unique id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniqueIdError {
    #[error("unique id is empty")]
    Empty,

    #[error("malformed segment `{0}`: expected `[kind:value]`")]
    MalformedSegment(String),

    #[error("segment `{0}` is not valid UTF-8 after decoding")]
    InvalidEncoding(String),
}

/// One `(kind, value)` pair of a [`UniqueId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub kind: String,
    pub value: String,
}

impl Segment {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}]",
            utf8_percent_encode(&self.kind, RESERVED),
            utf8_percent_encode(&self.value, RESERVED)
        )
    }
}

/// Stable identity of a node in a descriptor tree.
///
/// Ids are never empty: every id starts with the engine segment it was created from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniqueId {
    segments: Vec<Segment>,
}

impl UniqueId {
    /// Id of an engine root, e.g. `[engine:junit-vintage]`.
    pub fn for_engine(engine_id: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::new("engine", engine_id)],
        }
    }

    /// A new id with one more segment appended.
    pub fn append(&self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::new(kind, value));
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// The value of the leading `engine` segment, if this id has one.
    pub fn engine_id(&self) -> Option<&str> {
        self.segments
            .first()
            .filter(|s| s.kind == "engine")
            .map(|s| s.value.as_str())
    }

    /// Whether `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &UniqueId) -> bool {
        self.segments.len() < other.segments.len() && other.segments.starts_with(&self.segments)
    }

    /// Parse the rendered `[kind:value]/[kind:value]` form.
    pub fn parse(rendered: &str) -> Result<Self, UniqueIdError> {
        if rendered.is_empty() {
            return Err(UniqueIdError::Empty);
        }

        let segments = rendered
            .split('/')
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }
}

fn parse_segment(raw: &str) -> Result<Segment, UniqueIdError> {
    let inner = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| UniqueIdError::MalformedSegment(raw.to_string()))?;
    let (kind, value) = inner
        .split_once(':')
        .ok_or_else(|| UniqueIdError::MalformedSegment(raw.to_string()))?;

    let decode = |part: &str| {
        percent_decode_str(part)
            .decode_utf8()
            .map(|s| s.into_owned())
            .map_err(|_| UniqueIdError::InvalidEncoding(raw.to_string()))
    };

    Ok(Segment::new(decode(kind)?, decode(value)?))
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
