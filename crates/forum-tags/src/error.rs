//! Error types for forum-tags

use thiserror::Error;

/// Errors raised by taxonomy operations on malformed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// A record whose interval is empty or inverted (`lft >= rgt`)
    #[error("Invalid span for tag {name:?}: lft {lft} must be less than rgt {rgt}")]
    InvalidSpan { name: String, lft: i64, rgt: i64 },

    /// Two intervals that neither nest nor stay disjoint
    #[error("Tag {name:?} overlaps {other:?} without nesting inside it")]
    OverlappingSpans { name: String, other: String },

    /// A depth that disagrees with the number of enclosing intervals
    #[error("Tag {name:?} has depth {depth} but sits under {expected} ancestors")]
    DepthMismatch {
        name: String,
        depth: u32,
        expected: u32,
    },

    /// The same name appears more than once in a name tree
    #[error("Duplicate tag name: {0}")]
    DuplicateName(String),

    /// A name that does not resolve to any known tag
    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    /// A tag identifier that does not parse
    #[error("Invalid tag id: {0}")]
    InvalidTagId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TagError::InvalidSpan {
            name: "Rust".into(),
            lft: 5,
            rgt: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("Rust"));
        assert!(msg.contains("lft 5"));

        assert!(TagError::DuplicateName("Web".into()).to_string().contains("Web"));
    }
}
