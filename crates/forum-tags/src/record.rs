//! Core tag types.

use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// A unique tag identifier, assigned by the tag store on first persist.
pub type TagId = uuid::Uuid;

/// A unique content (post) identifier.
pub type ContentId = uuid::Uuid;

/// A tag produced by the builder, before the store has assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NestedTag {
    pub name: String,
    pub depth: u32,
    pub lft: i64,
    pub rgt: i64,
}

impl NestedTag {
    /// The interval this tag occupies.
    pub fn span(&self) -> TagSpan {
        TagSpan {
            lft: self.lft,
            rgt: self.rgt,
        }
    }
}

/// A persisted tag with its nested-set coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: TagId,
    pub name: String,
    pub depth: u32,
    pub lft: i64,
    pub rgt: i64,
}

impl TagRecord {
    /// Attach an identifier to a builder output.
    pub fn from_nested(id: TagId, tag: NestedTag) -> Self {
        Self {
            id,
            name: tag.name,
            depth: tag.depth,
            lft: tag.lft,
            rgt: tag.rgt,
        }
    }

    /// Reject records whose interval is empty or inverted.
    pub fn validate(&self) -> Result<(), TagError> {
        if self.lft >= self.rgt {
            return Err(TagError::InvalidSpan {
                name: self.name.clone(),
                lft: self.lft,
                rgt: self.rgt,
            });
        }
        Ok(())
    }

    /// The interval this tag occupies.
    pub fn span(&self) -> TagSpan {
        TagSpan {
            lft: self.lft,
            rgt: self.rgt,
        }
    }

    /// Whether `other` lies inside this tag's interval, counting the tag itself.
    pub fn covers(&self, other: &TagRecord) -> bool {
        self.span().contains(&other.span())
    }

    /// Whether this tag has no descendants.
    pub fn is_leaf(&self) -> bool {
        self.rgt == self.lft + 1
    }

    /// Number of descendants, derived from the interval width.
    pub fn descendant_count(&self) -> i64 {
        (self.rgt - self.lft - 1) / 2
    }
}

/// A closed `[lft, rgt]` interval, used as one facet of a content filter.
///
/// Always satisfies `lft < rgt`; deserialization goes through [`TagSpan::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SpanRepr", into = "SpanRepr")]
pub struct TagSpan {
    lft: i64,
    rgt: i64,
}

#[derive(Serialize, Deserialize)]
struct SpanRepr {
    lft: i64,
    rgt: i64,
}

impl TryFrom<SpanRepr> for TagSpan {
    type Error = TagError;

    fn try_from(repr: SpanRepr) -> Result<Self, Self::Error> {
        TagSpan::new(repr.lft, repr.rgt)
    }
}

impl From<TagSpan> for SpanRepr {
    fn from(span: TagSpan) -> Self {
        Self {
            lft: span.lft,
            rgt: span.rgt,
        }
    }
}

impl TagSpan {
    /// Create a span, rejecting `lft >= rgt`.
    pub fn new(lft: i64, rgt: i64) -> Result<Self, TagError> {
        if lft >= rgt {
            return Err(TagError::InvalidSpan {
                name: String::new(),
                lft,
                rgt,
            });
        }
        Ok(Self { lft, rgt })
    }

    pub fn lft(&self) -> i64 {
        self.lft
    }

    pub fn rgt(&self) -> i64 {
        self.rgt
    }

    /// Reflexive containment: `other` is this span or nested inside it.
    pub fn contains(&self, other: &TagSpan) -> bool {
        self.lft <= other.lft && other.rgt <= self.rgt
    }
}
