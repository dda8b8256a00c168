//! Hierarchical dotted identifiers.
//!
//! Every mission, objective, event and actor class is named by a [`Tag`]
//! such as `Electricity.Consumer.Light`. Tags compare by their full path;
//! [`Tag::matches`] additionally accepts descendants, so an objective
//! listening for `Enemy.Death` can opt into hearing `Enemy.Death.Rat`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::mission::errors::MissionError;

/// Separator between tag segments.
pub const TAG_SEPARATOR: char = '.';

/// Immutable dotted-path identifier.
///
/// The default value is the empty tag, which is *invalid*: engine calls
/// reject it at the boundary the same way they reject unknown ids.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(Option<Arc<str>>);

impl Tag {
    /// Parse and validate a dotted path.
    pub fn parse(path: &str) -> Result<Self, MissionError> {
        if path.is_empty() {
            return Err(MissionError::InvalidIdentifier("empty tag".to_string()));
        }
        for segment in path.split(TAG_SEPARATOR) {
            if segment.is_empty() {
                return Err(MissionError::InvalidIdentifier(format!(
                    "empty segment in tag '{}'",
                    path
                )));
            }
            if let Some(bad) = segment
                .chars()
                .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-'))
            {
                return Err(MissionError::InvalidIdentifier(format!(
                    "illegal character {:?} in tag '{}'",
                    bad, path
                )));
            }
        }
        Ok(Self(Some(Arc::from(path))))
    }

    /// The empty (invalid) tag.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0
            .as_deref()
            .into_iter()
            .flat_map(|path| path.split(TAG_SEPARATOR))
    }

    /// Number of segments; zero for the empty tag.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Tag one level up, or `None` for a root (or empty) tag.
    pub fn parent(&self) -> Option<Tag> {
        let path = self.0.as_deref()?;
        let (head, _) = path.rsplit_once(TAG_SEPARATOR)?;
        Some(Self(Some(Arc::from(head))))
    }

    /// Full-path equality. Invalid tags never match anything.
    pub fn matches_exact(&self, other: &Tag) -> bool {
        self.is_valid() && self == other
    }

    /// True when `self` equals `other` or is a descendant of it at a segment
    /// boundary: `A.B.C` matches `A.B`, `A.BC` does not.
    pub fn matches(&self, other: &Tag) -> bool {
        let (Some(mine), Some(theirs)) = (self.0.as_deref(), other.0.as_deref()) else {
            return false;
        };
        match mine.strip_prefix(theirs) {
            Some("") => true,
            Some(rest) => rest.starts_with(TAG_SEPARATOR),
            None => false,
        }
    }

    /// Match with an explicit policy.
    pub fn matches_with(&self, other: &Tag, policy: TagMatch) -> bool {
        match policy {
            TagMatch::Exact => self.matches_exact(other),
            TagMatch::Hierarchical => self.matches(other),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_deref() {
            Some(path) => f.write_str(path),
            None => f.write_str("<none>"),
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

impl FromStr for Tag {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Tag {
    type Error = MissionError;

    /// The empty string deserializes to the empty tag so optional links can
    /// be written as `""` in content files.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self::none());
        }
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Tag {
    type Error = MissionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.as_str().to_string()
    }
}

/// How a rule compares an incoming event tag with the tag it waits for.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TagMatch {
    #[default]
    Exact,
    /// Accept the target tag and any of its descendants.
    Hierarchical,
}
