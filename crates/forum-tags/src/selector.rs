//! Interactive tag selector for incremental search.
//!
//! Only `query` and `selected` are stored. The reduced selection, the candidate
//! list, and the visible tree context are recomputed from those two fields and
//! the full tag list on every read.

use crate::containment::{check_nesting, is_covered, reduce_refs};
use crate::error::TagError;
use crate::facet::FacetQuery;
use crate::record::{TagId, TagRecord};
use crate::search::SearchSubmission;

/// A state transition a presentation layer can bind to an option or chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorAction {
    Select(TagId),
    Deselect(TagId),
}

/// A tag in the reduced selection, with the action that removes it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTag<'a> {
    pub tag: &'a TagRecord,
    pub deselect: SelectorAction,
}

/// A tag shown in the option list, either as a match or as tree context.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleTag<'a> {
    pub tag: &'a TagRecord,
    pub disabled: bool,
    pub select: SelectorAction,
}

/// Selector state over a fixed tag list.
#[derive(Debug, Clone)]
pub struct TagSelector {
    tags: Vec<TagRecord>,
    query: String,
    selected: Vec<TagRecord>,
}

impl TagSelector {
    /// Create a selector over every known tag. Tags are validated and sorted by `lft`.
    pub fn new(mut tags: Vec<TagRecord>) -> Result<Self, TagError> {
        for tag in &tags {
            tag.validate()?;
        }
        tags.sort_by_key(|t| t.lft);
        check_nesting(&tags)?;
        Ok(Self {
            tags,
            query: String::new(),
            selected: Vec::new(),
        })
    }

    /// The full tag list in `lft` order.
    pub fn tags(&self) -> &[TagRecord] {
        &self.tags
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    /// Add a tag to the selection and clear the query.
    ///
    /// Unknown ids and tags already in the selection leave the selection as is.
    pub fn select(&mut self, id: TagId) {
        if !self.selected.iter().any(|t| t.id == id) {
            if let Some(tag) = self.tags.iter().find(|t| t.id == id) {
                self.selected.push(tag.clone());
            }
        }
        self.query.clear();
    }

    /// Remove a tag from the selection by id.
    pub fn deselect(&mut self, id: TagId) {
        self.selected.retain(|t| t.id != id);
    }

    /// Clear both the query and the selection.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.query.clear();
    }

    /// Apply a bound action.
    pub fn apply(&mut self, action: SelectorAction) {
        match action {
            SelectorAction::Select(id) => self.select(id),
            SelectorAction::Deselect(id) => self.deselect(id),
        }
    }

    /// The raw selection, in insertion order, possibly redundant.
    pub fn raw_selection(&self) -> &[TagRecord] {
        &self.selected
    }

    /// The selection with redundant descendants removed.
    pub fn selected(&self) -> Vec<SelectedTag<'_>> {
        reduce_refs(self.selected.iter())
            .into_iter()
            .map(|tag| SelectedTag {
                tag,
                deselect: SelectorAction::Deselect(tag.id),
            })
            .collect()
    }

    /// Tags matching the query that the selection does not already cover.
    pub fn candidates(&self) -> Vec<&TagRecord> {
        let reduced = reduce_refs(self.selected.iter());
        let needle = self.query.to_lowercase();
        self.tags
            .iter()
            .filter(|tag| !is_covered(tag, &reduced) && tag.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Candidates plus every ancestor needed to show them in tree context, in `lft` order.
    pub fn visible(&self) -> Vec<VisibleTag<'_>> {
        let candidates = self.candidates();
        self.tags
            .iter()
            .filter(|tag| candidates.iter().any(|c| tag.covers(c)))
            .map(|tag| VisibleTag {
                tag,
                disabled: self.selected.iter().any(|s| s.id == tag.id),
                select: SelectorAction::Select(tag.id),
            })
            .collect()
    }

    /// Capture the reduced selection as a facet query, detached from later edits.
    pub fn snapshot(&self) -> FacetQuery {
        FacetQuery::from_tags(reduce_refs(self.selected.iter()))
    }

    /// Capture the query text and reduced tag ids for a search request.
    pub fn submission(&self) -> SearchSubmission {
        SearchSubmission {
            query: self.query.clone(),
            tag_ids: reduce_refs(self.selected.iter())
                .into_iter()
                .map(|t| t.id)
                .collect(),
        }
    }
}
