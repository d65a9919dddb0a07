//! Ancestor/descendant predicate and selection reduction.

use crate::error::TagError;
use crate::record::TagRecord;

/// Strict descendant check: `node` lies inside `ancestor` and is not `ancestor` itself.
pub fn is_descendant(node: &TagRecord, ancestor: &TagRecord) -> bool {
    node.id != ancestor.id && ancestor.lft <= node.lft && node.rgt <= ancestor.rgt
}

/// Drop every selected tag that has another selected tag as an ancestor.
///
/// Survivors keep their relative order. Fails if any record has a malformed
/// interval.
pub fn reduce(selection: &[TagRecord]) -> Result<Vec<TagRecord>, TagError> {
    for tag in selection {
        tag.validate()?;
    }
    Ok(reduce_refs(selection.iter()).into_iter().cloned().collect())
}

/// Check that `lft`-sorted records form a proper forest: every pair of
/// intervals nests strictly or is disjoint, and each depth equals the
/// number of enclosing intervals.
pub fn check_nesting(sorted: &[TagRecord]) -> Result<(), TagError> {
    let mut open: Vec<&TagRecord> = Vec::new();
    for tag in sorted {
        while open.last().is_some_and(|top| top.rgt < tag.lft) {
            open.pop();
        }
        if let Some(parent) = open.last() {
            if parent.lft == tag.lft || parent.rgt <= tag.rgt {
                return Err(TagError::OverlappingSpans {
                    name: tag.name.clone(),
                    other: parent.name.clone(),
                });
            }
        }
        let expected = open.len() as u32;
        if tag.depth != expected {
            return Err(TagError::DepthMismatch {
                name: tag.name.clone(),
                depth: tag.depth,
                expected,
            });
        }
        open.push(tag);
    }
    Ok(())
}

/// Reduction over already-validated records, borrowing instead of cloning.
pub(crate) fn reduce_refs<'a, I>(selection: I) -> Vec<&'a TagRecord>
where
    I: IntoIterator<Item = &'a TagRecord>,
    I::IntoIter: Clone,
{
    let selection = selection.into_iter();
    selection
        .clone()
        .filter(|tag| !selection.clone().any(|other| is_descendant(tag, other)))
        .collect()
}

/// Whether `tag` is already covered by one of the `reduced` selections.
pub(crate) fn is_covered(tag: &TagRecord, reduced: &[&TagRecord]) -> bool {
    reduced
        .iter()
        .any(|selected| selected.id == tag.id || is_descendant(tag, selected))
}
