//! In-memory tag hierarchy answered by interval arithmetic.

use std::collections::HashMap;

use crate::containment::{check_nesting, is_descendant};
use crate::error::TagError;
use crate::record::{TagId, TagRecord};
use crate::tree::NameTree;

/// A loaded tag tree, kept sorted by `lft` so every subtree is a contiguous run.
pub struct TagTree {
    tags: Vec<TagRecord>,
    by_id: HashMap<TagId, usize>,
    by_name: HashMap<String, usize>,
}

impl TagTree {
    /// Build from store output. Records are validated and re-sorted by `lft`;
    /// overlapping intervals or inconsistent depths are rejected.
    pub fn from_records(mut tags: Vec<TagRecord>) -> Result<Self, TagError> {
        for tag in &tags {
            tag.validate()?;
        }
        tags.sort_by_key(|t| t.lft);
        check_nesting(&tags)?;

        let mut by_id = HashMap::with_capacity(tags.len());
        let mut by_name = HashMap::with_capacity(tags.len());
        for (index, tag) in tags.iter().enumerate() {
            by_id.insert(tag.id, index);
            if by_name.insert(tag.name.clone(), index).is_some() {
                return Err(TagError::DuplicateName(tag.name.clone()));
            }
        }

        Ok(Self {
            tags,
            by_id,
            by_name,
        })
    }

    /// All tags in `lft` order.
    pub fn tags(&self) -> &[TagRecord] {
        &self.tags
    }

    /// Consume the tree, returning the sorted records.
    pub fn into_tags(self) -> Vec<TagRecord> {
        self.tags
    }

    /// Get a tag by id.
    pub fn get(&self, id: TagId) -> Option<&TagRecord> {
        self.by_id.get(&id).map(|&i| &self.tags[i])
    }

    /// Get a tag by its (globally unique) name.
    pub fn by_name(&self, name: &str) -> Option<&TagRecord> {
        self.by_name.get(name).map(|&i| &self.tags[i])
    }

    /// Resolve a list of names, failing on the first unknown one.
    pub fn resolve_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<TagRecord>, TagError> {
        names
            .iter()
            .map(|name| {
                self.by_name(name.as_ref())
                    .cloned()
                    .ok_or_else(|| TagError::UnknownTag(name.as_ref().to_string()))
            })
            .collect()
    }

    /// Top-level tags (depth 0).
    pub fn roots(&self) -> Vec<&TagRecord> {
        self.tags.iter().filter(|t| t.depth == 0).collect()
    }

    /// Direct children of a tag, in sibling order.
    pub fn children_of(&self, id: TagId) -> Vec<&TagRecord> {
        match self.get(id) {
            Some(parent) => self
                .descendants_of(id)
                .into_iter()
                .filter(|t| t.depth == parent.depth + 1)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every descendant of a tag, in `lft` order.
    pub fn descendants_of(&self, id: TagId) -> Vec<&TagRecord> {
        let Some(&index) = self.by_id.get(&id) else {
            return Vec::new();
        };
        let parent = &self.tags[index];
        self.tags[index + 1..]
            .iter()
            .take_while(|t| t.lft < parent.rgt)
            .collect()
    }

    /// Ancestors of a tag, from the root down to its parent.
    pub fn ancestors_of(&self, id: TagId) -> Vec<&TagRecord> {
        let Some(&index) = self.by_id.get(&id) else {
            return Vec::new();
        };
        let node = &self.tags[index];
        self.tags[..index]
            .iter()
            .filter(|t| is_descendant(node, t))
            .collect()
    }

    /// Total number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Reconstruct the source name tree. Building it again yields the same layout.
    pub fn to_name_tree(&self) -> NameTree {
        let mut root = NameTree::new();
        let mut path: Vec<&TagRecord> = Vec::new();

        for tag in &self.tags {
            while path.last().is_some_and(|open| open.rgt < tag.lft) {
                path.pop();
            }
            let mut node = &mut root;
            for open in &path {
                node = node.child(&open.name);
            }
            node.child(&tag.name);
            path.push(tag);
        }

        root
    }

    /// Format as a tree string for display.
    pub fn format_tree(&self) -> String {
        let mut output = String::new();
        for root in self.roots() {
            self.format_subtree(root, "", true, &mut output);
        }
        output
    }

    fn format_subtree(&self, tag: &TagRecord, prefix: &str, is_last: bool, output: &mut String) {
        let connector = if tag.depth == 0 {
            ""
        } else if is_last {
            "└── "
        } else {
            "├── "
        };

        output.push_str(&format!("{}{}{}\n", prefix, connector, tag.name));

        let child_prefix = if tag.depth == 0 {
            "".to_string()
        } else if is_last {
            format!("{}    ", prefix)
        } else {
            format!("{}│   ", prefix)
        };

        let children = self.children_of(tag.id);
        for (i, child) in children.iter().enumerate() {
            self.format_subtree(child, &child_prefix, i == children.len() - 1, output);
        }
    }
}
