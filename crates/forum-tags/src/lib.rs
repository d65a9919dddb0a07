//! forum-tags: Nested-set tag taxonomy for the forum.
//!
//! Tags form a tree encoded as `[lft, rgt]` intervals, so "is a descendant of"
//! becomes an interval containment check and "posts under this tag" becomes a
//! range filter instead of a recursive join.
//! This crate holds the pure parts: building intervals from a name tree,
//! containment and selection reduction, the interactive selector, keyboard
//! focus for option lists, and the store seams consumed by `forum-store`.

pub mod record;
pub mod tree;
pub mod builder;
pub mod containment;
pub mod hierarchy;
pub mod selector;
pub mod navigation;
pub mod facet;
pub mod search;
pub mod store;
pub mod error;

pub use record::*;
pub use tree::*;
pub use builder::*;
pub use containment::*;
pub use hierarchy::*;
pub use selector::*;
pub use navigation::*;
pub use facet::*;
pub use search::*;
pub use store::*;
pub use error::*;
