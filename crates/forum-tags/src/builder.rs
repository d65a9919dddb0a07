//! Nested-set builder: name tree to flat interval records.
//!
//! Siblings are laid out left to right in declaration order. Within each
//! sibling, descendants are emitted before the sibling itself. Every rebuild
//! assigns a fresh global layout, so inserting a name shifts the intervals of
//! everything to its right; consumers must not cache intervals across seeds.

use std::collections::HashSet;

use crate::error::TagError;
use crate::record::NestedTag;
use crate::tree::NameTree;

/// Build the nested-set records for a whole tree, starting at `lft = 0`.
pub fn build(tree: &NameTree) -> Vec<NestedTag> {
    build_from(tree, 0, 0)
}

/// Build the records for `tree` with its first child at `offset` and `depth`.
pub fn build_from(tree: &NameTree, offset: i64, depth: u32) -> Vec<NestedTag> {
    let mut result: Vec<NestedTag> = Vec::with_capacity(tree.node_count());

    for (name, subtree) in tree.iter() {
        // The last record emitted is always the previous sibling.
        let lft = result.last().map(|prev| prev.rgt + 1).unwrap_or(offset);
        let children = build_from(subtree, lft + 1, depth + 1);
        let rgt = lft + children.len() as i64 * 2 + 1;

        result.extend(children);
        result.push(NestedTag {
            name: name.to_string(),
            depth,
            lft,
            rgt,
        });
    }

    result
}

/// Reject builder output that repeats a name anywhere in the tree.
///
/// Names form a flat namespace in the store, so a repeat would otherwise be
/// silently collapsed by the upsert.
pub fn check_unique_names(tags: &[NestedTag]) -> Result<(), TagError> {
    let mut seen = HashSet::with_capacity(tags.len());
    for tag in tags {
        if !seen.insert(tag.name.as_str()) {
            return Err(TagError::DuplicateName(tag.name.clone()));
        }
    }
    Ok(())
}
